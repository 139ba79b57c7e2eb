use common::HackathonStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hackathon")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: String, // in Markdown

    /// Schedule invariant, enforced on create and update:
    /// registration_start < registration_end <= start_date < end_date,
    /// start_date <= submission_deadline <= end_date.
    pub registration_start: DateTimeUtc,
    pub registration_end: DateTimeUtc,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub submission_deadline: DateTimeUtc,

    /// Mutated only through the lifecycle engine's compare-and-swap.
    pub status: HackathonStatus,
    /// Stamped on first entry into `Published`, never re-stamped.
    pub published_at: Option<DateTimeUtc>,

    pub organizer_id: i32,
    #[sea_orm(belongs_to, from = "organizer_id", to = "id")]
    pub organizer: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub teams: HasMany<super::team::Entity>,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    #[sea_orm(has_many, via = "hackathon_participant", relation_enum = "Participants")]
    pub participants: HasMany<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
