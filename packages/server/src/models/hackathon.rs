use chrono::{DateTime, Utc};
use common::HackathonStatus;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_description, validate_title};
use crate::error::AppError;
use crate::lifecycle;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateHackathonRequest {
    pub title: String,
    pub description: String,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub submission_deadline: DateTime<Utc>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateHackathonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub submission_deadline: Option<DateTime<Utc>>,
}

impl UpdateHackathonRequest {
    pub fn touches_dates(&self) -> bool {
        self.registration_start.is_some()
            || self.registration_end.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.submission_deadline.is_some()
    }
}

/// Body of the status-transition endpoint.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct TransitionRequest {
    pub status: HackathonStatus,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct HackathonListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<HackathonStatus>,
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub submission_deadline: DateTime<Utc>,
    pub status: HackathonStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub organizer_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HackathonListResponse {
    pub data: Vec<HackathonResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RegistrationResponse {
    pub hackathon_id: i32,
    pub user_id: i32,
    /// True when the caller was already registered; the call is idempotent.
    pub already_registered: bool,
}

impl From<crate::entity::hackathon::Model> for HackathonResponse {
    fn from(m: crate::entity::hackathon::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            registration_start: m.registration_start,
            registration_end: m.registration_end,
            start_date: m.start_date,
            end_date: m.end_date,
            submission_deadline: m.submission_deadline,
            status: m.status,
            published_at: m.published_at,
            organizer_id: m.organizer_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_hackathon(req: &CreateHackathonRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_description(&req.description)?;
    lifecycle::validate_dates(
        req.registration_start,
        req.registration_end,
        req.start_date,
        req.end_date,
        req.submission_deadline,
    )
}

pub fn validate_update_hackathon(req: &UpdateHackathonRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    // Cross-field date validation happens in the handler against the merged
    // schedule; a partial update here could only see half the picture.
    Ok(())
}
