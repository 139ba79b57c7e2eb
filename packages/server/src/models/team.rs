use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTeamRequest {
    pub name: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamResponse {
    pub id: i32,
    pub hackathon_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::team::Model> for TeamResponse {
    fn from(m: crate::entity::team::Model) -> Self {
        Self {
            id: m.id,
            hackathon_id: m.hackathon_id,
            name: m.name,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_team(req: &CreateTeamRequest) -> Result<(), AppError> {
    let name = req.name.trim();
    if name.is_empty() || name.chars().count() > 64 {
        return Err(AppError::Validation(
            "Team name must be 1-64 characters".into(),
        ));
    }
    Ok(())
}
