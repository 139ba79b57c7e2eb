use common::SubmissionStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A single uploaded file attached to a submission.
/// Stored as a JSON array in the database.
///
/// `storage_key` is the durable object-store locator. It is never handed to
/// a caller directly; the file-access resolver turns it into a signed or
/// unsigned URL depending on who is asking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FileRecord {
    pub name: String,
    pub storage_key: String,
    pub size: i64,
    pub mime_type: Option<String>,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: String,
    pub repository_url: Option<String>,

    /// Submission files stored as a JSON array of `FileRecord` objects.
    #[sea_orm(column_type = "JsonBinary")]
    pub files: serde_json::Value,

    pub status: SubmissionStatus,
    pub is_draft: bool,
    /// At most one final submission per (hackathon, submitter) and per
    /// (hackathon, team); backed by partial unique indexes.
    pub is_final: bool,
    /// NULL while the submission is a draft.
    pub submitted_at: Option<DateTimeUtc>,

    pub hackathon_id: i32,
    #[sea_orm(belongs_to, from = "hackathon_id", to = "id")]
    pub hackathon: HasOne<super::hackathon::Entity>,

    pub submitter_id: i32,
    #[sea_orm(belongs_to, from = "submitter_id", to = "id")]
    pub submitter: HasOne<super::user::Entity>,

    /// NULL for individual submissions.
    pub team_id: Option<i32>,
    #[sea_orm(belongs_to, from = "team_id", to = "id")]
    pub team: Option<super::team::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the JSON file list. Malformed payloads decode to empty rather
    /// than failing the read.
    pub fn file_records(&self) -> Vec<FileRecord> {
        serde_json::from_value(self.files.clone()).unwrap_or_default()
    }
}
