use chrono::{DateTime, Utc};
use common::SubmissionStatus;
use serde::{Deserialize, Serialize};

use super::shared::validate_title;
use crate::entity::submission::FileRecord;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubmissionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub repository_url: Option<String>,
    /// Submitting on behalf of a team; the team must belong to the hackathon
    /// and the caller must be a member.
    pub team_id: Option<i32>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    /// Drafts stay editable; a non-draft is final immediately.
    #[serde(default)]
    pub is_draft: bool,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateSubmissionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub files: Option<Vec<FileRecord>>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// File metadata as embedded in submission reads. The durable storage
/// locator is deliberately absent; URLs come only from the file-list
/// endpoint, which applies capability scoping.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FileMeta {
    pub name: String,
    pub size: i64,
    pub mime_type: Option<String>,
}

impl From<FileRecord> for FileMeta {
    fn from(f: FileRecord) -> Self {
        Self {
            name: f.name,
            size: f.size,
            mime_type: f.mime_type,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub id: i32,
    pub hackathon_id: i32,
    pub submitter_id: i32,
    pub team_id: Option<i32>,
    pub title: String,
    pub description: String,
    pub repository_url: Option<String>,
    pub status: SubmissionStatus,
    pub is_draft: bool,
    pub is_final: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub files: Vec<FileMeta>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::submission::Model> for SubmissionResponse {
    fn from(m: crate::entity::submission::Model) -> Self {
        let files = m.file_records().into_iter().map(FileMeta::from).collect();
        Self {
            id: m.id,
            hackathon_id: m.hackathon_id,
            submitter_id: m.submitter_id,
            team_id: m.team_id,
            title: m.title,
            description: m.description,
            repository_url: m.repository_url,
            status: m.status,
            is_draft: m.is_draft,
            is_final: m.is_final,
            submitted_at: m.submitted_at,
            files,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FileListResponse {
    pub files: Vec<crate::files::FileView>,
    pub total: u64,
}

const MAX_FILES: usize = 20;

fn validate_files(files: &[FileRecord]) -> Result<(), AppError> {
    if files.len() > MAX_FILES {
        return Err(AppError::Validation(format!(
            "At most {MAX_FILES} files per submission"
        )));
    }
    for file in files {
        if file.name.trim().is_empty() {
            return Err(AppError::Validation("File name must not be empty".into()));
        }
        if file.storage_key.trim().is_empty() {
            return Err(AppError::Validation(
                "File storage key must not be empty".into(),
            ));
        }
        if file.size < 0 {
            return Err(AppError::Validation("File size must be >= 0".into()));
        }
    }
    Ok(())
}

pub fn validate_create_submission(req: &CreateSubmissionRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_files(&req.files)
}

pub fn validate_update_submission(req: &UpdateSubmissionRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref files) = req.files {
        validate_files(files)?;
    }
    Ok(())
}
