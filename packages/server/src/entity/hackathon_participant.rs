use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Explicit registration of a user for a hackathon.
///
/// The composite primary key makes registration idempotent at the data
/// layer: re-registering hits the unique constraint instead of duplicating.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hackathon_participant")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub hackathon_id: i32,
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: Option<super::hackathon::Entity>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: Option<super::user::Entity>,

    pub joined_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
