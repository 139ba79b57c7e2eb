use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::{HackathonStatus, UserRole};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{hackathon, hackathon_participant, submission, team, team_member};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::lifecycle;
use crate::models::hackathon::*;
use crate::models::shared::{Pagination, escape_like};
use crate::roster::{self, RosterEntry};
use crate::state::AppState;
use crate::utils::window;

#[utoipa::path(
    post,
    path = "/api/v1/hackathons",
    tag = "Hackathons",
    operation_id = "createHackathon",
    summary = "Create a new hackathon",
    description = "Creates a hackathon in DRAFT status owned by the caller. \
        Requires the organizer or admin role. The five schedule timestamps \
        must satisfy the ordering invariant.",
    request_body = CreateHackathonRequest,
    responses(
        (status = 201, description = "Hackathon created", body = HackathonResponse),
        (status = 400, description = "Schedule ordering violated (INVALID_SCHEDULE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateHackathonRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_organizer()?;
    validate_create_hackathon(&payload)?;

    let now = Utc::now();
    let new_hackathon = hackathon::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        registration_start: Set(payload.registration_start),
        registration_end: Set(payload.registration_end),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        submission_deadline: Set(payload.submission_deadline),
        status: Set(HackathonStatus::Draft),
        published_at: Set(None),
        organizer_id: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_hackathon.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(HackathonResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/hackathons",
    tag = "Hackathons",
    operation_id = "listHackathons",
    summary = "List hackathons with pagination and search",
    description = "Returns a paginated list, newest first, with optional \
        status filter and title search. Drafts are visible only to their \
        owning organizer and admins.",
    params(HackathonListQuery),
    responses(
        (status = 200, description = "List of hackathons", body = HackathonListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_hackathons(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<HackathonListQuery>,
) -> Result<Json<HackathonListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = hackathon::Entity::find();

    if auth_user.role != UserRole::Admin {
        select = select.filter(
            Condition::any()
                .add(hackathon::Column::Status.ne(HackathonStatus::Draft))
                .add(hackathon::Column::OrganizerId.eq(auth_user.user_id)),
        );
    }

    if let Some(status) = query.status {
        select = select.filter(hackathon::Column::Status.eq(status));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(hackathon::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(hackathon::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(HackathonResponse::from)
        .collect();

    Ok(Json(HackathonListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/hackathons/{id}",
    tag = "Hackathons",
    operation_id = "getHackathon",
    summary = "Get a hackathon by ID",
    description = "Returns the hackathon, lazily applying any clock-due \
        status moves first. Drafts return 404 (not 403) for everyone but \
        their owner to prevent enumeration.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Hackathon details", body = HackathonResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<HackathonResponse>, AppError> {
    let model = find_visible_hackathon(&state.db, &auth_user, id).await?;
    let model = lifecycle::advance_lazily(&state.db, model, Utc::now()).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/hackathons/{id}",
    tag = "Hackathons",
    operation_id = "updateHackathon",
    summary = "Update a hackathon",
    description = "Partial update by the owning organizer. Date fields are \
        re-validated as a merged schedule and may only change while the \
        hackathon is still editable (DRAFT or PUBLISHED).",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = UpdateHackathonRequest,
    responses(
        (status = 200, description = "Hackathon updated", body = HackathonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, INVALID_SCHEDULE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateHackathonRequest>,
) -> Result<Json<HackathonResponse>, AppError> {
    validate_update_hackathon(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;

    if existing.organizer_id != auth_user.user_id {
        return Err(AppError::Forbidden);
    }

    if payload == UpdateHackathonRequest::default() {
        return Ok(Json(existing.into()));
    }

    if payload.touches_dates() {
        // Timestamps freeze once the hackathon leaves its editable phase.
        if !matches!(
            existing.status,
            HackathonStatus::Draft | HackathonStatus::Published
        ) {
            return Err(AppError::Validation(
                "Dates can no longer be changed for this hackathon".into(),
            ));
        }

        // Validate the merged schedule so a partial date edit cannot slip
        // past the ordering invariant.
        lifecycle::validate_dates(
            payload.registration_start.unwrap_or(existing.registration_start),
            payload.registration_end.unwrap_or(existing.registration_end),
            payload.start_date.unwrap_or(existing.start_date),
            payload.end_date.unwrap_or(existing.end_date),
            payload.submission_deadline.unwrap_or(existing.submission_deadline),
        )?;
    }

    let mut active: hackathon::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(v) = payload.registration_start {
        active.registration_start = Set(v);
    }
    if let Some(v) = payload.registration_end {
        active.registration_end = Set(v);
    }
    if let Some(v) = payload.start_date {
        active.start_date = Set(v);
    }
    if let Some(v) = payload.end_date {
        active.end_date = Set(v);
    }
    if let Some(v) = payload.submission_deadline {
        active.submission_deadline = Set(v);
    }
    active.updated_at = Set(Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/hackathons/{id}",
    tag = "Hackathons",
    operation_id = "deleteHackathon",
    summary = "Delete a hackathon",
    description = "Owner-only. Refused once the event has started. Cascades \
        registrations, teams and submissions.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 204, description = "Hackathon deleted"),
        (status = 400, description = "Hackathon has started (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_hackathon_for_update(&txn, id).await?;

    if existing.organizer_id != auth_user.user_id {
        return Err(AppError::Forbidden);
    }
    if existing.status.has_started() {
        return Err(AppError::Validation(
            "Cannot delete a hackathon that has started".into(),
        ));
    }

    let team_ids: Vec<i32> = team::Entity::find()
        .filter(team::Column::HackathonId.eq(id))
        .select_only()
        .column(team::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;

    if !team_ids.is_empty() {
        team_member::Entity::delete_many()
            .filter(team_member::Column::TeamId.is_in(team_ids))
            .exec(&txn)
            .await?;
    }
    team::Entity::delete_many()
        .filter(team::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    hackathon_participant::Entity::delete_many()
        .filter(hackathon_participant::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    submission::Entity::delete_many()
        .filter(submission::Column::HackathonId.eq(id))
        .exec(&txn)
        .await?;
    hackathon::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/hackathons/{id}/status",
    tag = "Hackathons",
    operation_id = "transitionHackathon",
    summary = "Request a status transition",
    description = "Moves the hackathon to the target status. Only the owning \
        organizer may transition, and only along the fixed allow-list. \
        Entering PUBLISHED for the first time stamps published_at.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Status updated", body = HackathonResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owning organizer (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Transition not allowed (INVALID_TRANSITION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, target = %payload.status))]
pub async fn transition_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<TransitionRequest>,
) -> Result<Json<HackathonResponse>, AppError> {
    let model = find_hackathon(&state.db, id).await?;
    let updated =
        lifecycle::request_transition(&state.db, &model, auth_user.user_id, payload.status).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/hackathons/{id}/register",
    tag = "Hackathons",
    operation_id = "registerForHackathon",
    summary = "Register the caller for a hackathon",
    description = "Allowed only inside the registration window. Idempotent: \
        re-registering succeeds without creating a duplicate row.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Already registered", body = RegistrationResponse),
        (status = 201, description = "Registered", body = RegistrationResponse),
        (status = 400, description = "Window closed (REGISTRATION_CLOSED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn register_for_hackathon(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let model = find_visible_hackathon(&state.db, &auth_user, id).await?;

    window::check_registration_open(&model, now)?;

    let new_row = hackathon_participant::ActiveModel {
        hackathon_id: Set(id),
        user_id: Set(auth_user.user_id),
        joined_at: Set(now),
    };

    match new_row.insert(&state.db).await {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(RegistrationResponse {
                hackathon_id: id,
                user_id: auth_user.user_id,
                already_registered: false,
            }),
        )),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok((
            StatusCode::OK,
            Json(RegistrationResponse {
                hackathon_id: id,
                user_id: auth_user.user_id,
                already_registered: true,
            }),
        )),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/hackathons/{id}/participants",
    tag = "Hackathons",
    operation_id = "getRoster",
    summary = "Get the reconciled participant roster",
    description = "Merges registrations, team memberships and submissions \
        into one deduplicated roster, recomputed on every request. Requires \
        an elevated role (organizer, judge or admin). No filtering is \
        applied: submitted-but-unregistered users are included.",
    params(("id" = i32, Path, description = "Hackathon ID")),
    responses(
        (status = 200, description = "Roster", body = Vec<RosterEntry>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Hackathon not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_roster(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<RosterEntry>>, AppError> {
    auth_user.require_reviewer()?;
    find_hackathon(&state.db, id).await?;

    Ok(Json(roster::build_roster(&state.db, id).await?))
}

pub(crate) async fn find_hackathon<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    hackathon::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

/// Look up a hackathon, hiding drafts from everyone but their owner.
pub(crate) async fn find_visible_hackathon<C: ConnectionTrait>(
    db: &C,
    auth_user: &AuthUser,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    let model = find_hackathon(db, id).await?;
    if model.status == HackathonStatus::Draft
        && model.organizer_id != auth_user.user_id
        && auth_user.role != UserRole::Admin
    {
        return Err(AppError::NotFound("Hackathon not found".into())); // Prevent enumeration
    }
    Ok(model)
}

async fn find_hackathon_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<hackathon::Model, AppError> {
    use sea_orm::sea_query::LockType;
    hackathon::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}
