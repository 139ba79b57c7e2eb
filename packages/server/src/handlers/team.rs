use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{team, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::hackathon::find_visible_hackathon;
use crate::models::team::{CreateTeamRequest, TeamResponse, validate_create_team};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/hackathons/{id}/teams",
    tag = "Teams",
    operation_id = "createTeam",
    summary = "Create a team under a hackathon",
    description = "Creates a team; the caller becomes its first member. \
        Team membership counts as participation for the roster even without \
        an explicit registration.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(hackathon_id))]
pub async fn create_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
    AppJson(payload): AppJson<CreateTeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_team(&payload)?;
    find_visible_hackathon(&state.db, &auth_user, hackathon_id).await?;

    let now = Utc::now();
    let txn = state.db.begin().await?;

    let new_team = team::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        hackathon_id: Set(hackathon_id),
        created_at: Set(now),
        ..Default::default()
    };
    let model = new_team.insert(&txn).await?;

    let founder = team_member::ActiveModel {
        team_id: Set(model.id),
        user_id: Set(auth_user.user_id),
        created_at: Set(now),
    };
    founder.insert(&txn).await?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/api/v1/teams/{id}/join",
    tag = "Teams",
    operation_id = "joinTeam",
    summary = "Join a team",
    responses(
        (status = 201, description = "Joined"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Team not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already a member (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(team_id))]
pub async fn join_team(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    team::Entity::find_by_id(team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    let new_member = team_member::ActiveModel {
        team_id: Set(team_id),
        user_id: Set(auth_user.user_id),
        created_at: Set(Utc::now()),
    };

    match new_member.insert(&state.db).await {
        Ok(_) => Ok(StatusCode::CREATED),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(AppError::Conflict("Already a team member".into()))
        }
        Err(e) => Err(e.into()),
    }
}
