use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::SubmissionStatus;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{hackathon_participant, submission, team, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::files::{self, Viewer};
use crate::handlers::hackathon::{find_hackathon, find_visible_hackathon};
use crate::models::submission::*;
use crate::state::AppState;
use crate::utils::window;

#[utoipa::path(
    post,
    path = "/api/v1/hackathons/{id}/submissions",
    tag = "Submissions",
    operation_id = "createSubmission",
    summary = "Create a submission",
    description = "Creates a draft or final submission. Requires prior \
        registration and an open submission window. A non-draft is final \
        immediately; at most one final submission may exist per submitter or \
        team, enforced by a data-layer uniqueness constraint.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission created", body = SubmissionResponse),
        (status = 400, description = "Timing or registration violation (SUBMISSION_WINDOW_NOT_OPEN, SUBMISSION_LOCKED, NOT_REGISTERED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Final submission exists (DUPLICATE_FINAL_SUBMISSION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(hackathon_id))]
pub async fn create_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
    AppJson(payload): AppJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_submission(&payload)?;

    let now = Utc::now();
    let event = find_visible_hackathon(&state.db, &auth_user, hackathon_id).await?;

    require_registered(&state.db, hackathon_id, auth_user.user_id).await?;
    window::check_submission_window(&event, now)?;

    if let Some(team_id) = payload.team_id {
        require_team_member(&state.db, hackathon_id, team_id, auth_user.user_id).await?;
    }

    let is_final = !payload.is_draft;
    if is_final {
        check_no_final_submission(&state.db, hackathon_id, auth_user.user_id, payload.team_id)
            .await?;
    }

    let new_submission = submission::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        repository_url: Set(payload.repository_url),
        files: Set(serde_json::to_value(&payload.files)
            .map_err(|e| AppError::Internal(format!("File list encoding failed: {e}")))?),
        status: Set(if is_final {
            SubmissionStatus::Submitted
        } else {
            SubmissionStatus::Draft
        }),
        is_draft: Set(payload.is_draft),
        is_final: Set(is_final),
        submitted_at: Set(is_final.then_some(now)),
        hackathon_id: Set(hackathon_id),
        submitter_id: Set(auth_user.user_id),
        team_id: Set(payload.team_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    // The pre-checks above are best-effort; the unique index is the
    // authoritative backstop against concurrent final submissions.
    let model = new_submission.insert(&state.db).await.map_err(|e| {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateFinalSubmission,
            _ => AppError::from(e),
        }
    })?;

    Ok((StatusCode::CREATED, Json(SubmissionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/hackathons/{id}/submissions",
    tag = "Submissions",
    operation_id = "listSubmissions",
    summary = "List submissions of a hackathon",
    description = "Reviewers (organizer, judge, admin) see every submission; \
        participants see only their own.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Submissions", body = Vec<SubmissionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(hackathon_id))]
pub async fn list_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(hackathon_id): Path<i32>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    find_visible_hackathon(&state.db, &auth_user, hackathon_id).await?;

    let mut select = submission::Entity::find()
        .filter(submission::Column::HackathonId.eq(hackathon_id))
        .order_by_asc(submission::Column::CreatedAt);

    if !auth_user.is_reviewer() {
        select = select.filter(submission::Column::SubmitterId.eq(auth_user.user_id));
    }

    let items = select
        .all(&state.db)
        .await?
        .into_iter()
        .map(SubmissionResponse::from)
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/submissions/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get a submission",
    description = "Accessible to the submitter and to reviewers.",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission", body = SubmissionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let model = find_submission(&state.db, id).await?;

    if !auth_user.is_reviewer() && model.submitter_id != auth_user.user_id {
        return Err(AppError::Forbidden);
    }

    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/submissions/{id}",
    tag = "Submissions",
    operation_id = "updateSubmission",
    summary = "Update a draft submission",
    description = "Owner-only. Finalized submissions are immutable; drafts \
        lock once the submission deadline passes.",
    params(("id" = i32, Path, description = "Submission ID")),
    request_body = UpdateSubmissionRequest,
    responses(
        (status = 200, description = "Submission updated", body = SubmissionResponse),
        (status = 400, description = "Deadline passed (SUBMISSION_LOCKED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already final (ALREADY_FINAL)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateSubmissionRequest>,
) -> Result<Json<SubmissionResponse>, AppError> {
    validate_update_submission(&payload)?;

    let existing = find_submission(&state.db, id).await?;
    if existing.submitter_id != auth_user.user_id {
        return Err(AppError::Forbidden);
    }

    let event = find_hackathon(&state.db, existing.hackathon_id).await?;
    window::check_submission_editable(&existing, &event, Utc::now())?;

    if payload == UpdateSubmissionRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: submission::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(repository_url) = payload.repository_url {
        active.repository_url = Set(Some(repository_url));
    }
    if let Some(ref files) = payload.files {
        active.files = Set(serde_json::to_value(files)
            .map_err(|e| AppError::Internal(format!("File list encoding failed: {e}")))?);
    }
    active.updated_at = Set(Utc::now());

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/submissions/{id}/submit",
    tag = "Submissions",
    operation_id = "finalizeSubmission",
    summary = "Hand in a draft as final",
    description = "Owner-only, inside the submission window. Marks the draft \
        final and stamps submitted_at. A concurrent duplicate is caught by \
        the data-layer uniqueness constraint.",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission finalized", body = SubmissionResponse),
        (status = 400, description = "Window violation (SUBMISSION_WINDOW_NOT_OPEN, SUBMISSION_LOCKED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already final or duplicate (ALREADY_FINAL, DUPLICATE_FINAL_SUBMISSION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn finalize_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let now = Utc::now();
    let existing = find_submission(&state.db, id).await?;

    if existing.submitter_id != auth_user.user_id {
        return Err(AppError::Forbidden);
    }
    if existing.is_final {
        return Err(AppError::AlreadyFinal);
    }

    let event = find_hackathon(&state.db, existing.hackathon_id).await?;
    window::check_submission_window(&event, now)?;
    check_no_final_submission(
        &state.db,
        existing.hackathon_id,
        existing.submitter_id,
        existing.team_id,
    )
    .await?;

    let mut active: submission::ActiveModel = existing.into();
    active.is_draft = Set(false);
    active.is_final = Set(true);
    active.status = Set(SubmissionStatus::Submitted);
    active.submitted_at = Set(Some(now));
    active.updated_at = Set(now);

    let model = active.update(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateFinalSubmission,
        _ => AppError::from(e),
    })?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/submissions/{id}",
    tag = "Submissions",
    operation_id = "deleteSubmission",
    summary = "Delete a draft submission",
    description = "Owner-only. Finalized submissions cannot be deleted.",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 204, description = "Submission deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already final (ALREADY_FINAL)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_submission(&state.db, id).await?;

    if existing.submitter_id != auth_user.user_id {
        return Err(AppError::Forbidden);
    }
    if existing.is_final {
        return Err(AppError::AlreadyFinal);
    }

    let active: submission::ActiveModel = existing.into();
    active.delete(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/submissions/{id}/files",
    tag = "Submissions",
    operation_id = "listSubmissionFiles",
    summary = "List a submission's files with capability-scoped URLs",
    description = "Reviewers receive signed, read-only URLs expiring at the \
        event's end date (unsigned fallback when signing is unavailable). \
        The submitter receives plain metadata. Everyone else receives an \
        empty list: unauthorized entries are omitted, not errored.",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Resolved file list", body = FileListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_submission_files(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FileListResponse>, AppError> {
    let model = find_submission(&state.db, id).await?;
    let event = find_hackathon(&state.db, model.hackathon_id).await?;

    let viewer = Viewer {
        user_id: auth_user.user_id,
        role: auth_user.role,
    };

    let views = files::resolve_submission_files(
        &model.file_records(),
        &viewer,
        model.submitter_id,
        Some(event.end_date),
        &*state.signer,
    )
    .await;

    let total = views.len() as u64;
    Ok(Json(FileListResponse {
        files: views,
        total,
    }))
}

async fn find_submission<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<submission::Model, AppError> {
    submission::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))
}

async fn require_registered<C: ConnectionTrait>(
    db: &C,
    hackathon_id: i32,
    user_id: i32,
) -> Result<(), AppError> {
    hackathon_participant::Entity::find_by_id((hackathon_id, user_id))
        .one(db)
        .await?
        .map(|_| ())
        .ok_or(AppError::NotRegistered)
}

/// Best-effort duplicate check. The partial unique indexes remain the
/// authoritative backstop; this only produces a friendlier early error.
async fn check_no_final_submission<C: ConnectionTrait>(
    db: &C,
    hackathon_id: i32,
    submitter_id: i32,
    team_id: Option<i32>,
) -> Result<(), AppError> {
    let mut condition = Condition::any().add(submission::Column::SubmitterId.eq(submitter_id));
    if let Some(team_id) = team_id {
        condition = condition.add(submission::Column::TeamId.eq(team_id));
    }

    let existing = submission::Entity::find()
        .filter(submission::Column::HackathonId.eq(hackathon_id))
        .filter(submission::Column::IsFinal.eq(true))
        .filter(condition)
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(AppError::DuplicateFinalSubmission);
    }
    Ok(())
}

/// Check that the team belongs to the hackathon and the caller is a member.
async fn require_team_member<C: ConnectionTrait>(
    db: &C,
    hackathon_id: i32,
    team_id: i32,
    user_id: i32,
) -> Result<(), AppError> {
    let team_row = team::Entity::find_by_id(team_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    if team_row.hackathon_id != hackathon_id {
        return Err(AppError::Validation(
            "Team does not belong to this hackathon".into(),
        ));
    }

    team_member::Entity::find_by_id((team_id, user_id))
        .one(db)
        .await?
        .map(|_| ())
        .ok_or(AppError::Forbidden)
}
