//! Hackathon lifecycle engine.
//!
//! Every status mutation goes through a compare-and-swap on the `status`
//! column (`UPDATE … WHERE status = <expected>`). Under concurrent writers
//! the last one whose expectation still holds wins; an update whose
//! expectation no longer matches is skipped, never retried.

use chrono::{DateTime, Utc};
use common::HackathonStatus;
use sea_orm::prelude::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::entity::hackathon;
use crate::error::AppError;

/// Validate the five-timestamp schedule ordering.
///
/// Applied identically on create and on any date-field update.
pub fn validate_dates(
    registration_start: DateTime<Utc>,
    registration_end: DateTime<Utc>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    submission_deadline: DateTime<Utc>,
) -> Result<(), AppError> {
    if registration_end <= registration_start {
        return Err(AppError::InvalidSchedule(
            "Registration end must be after registration start".into(),
        ));
    }
    if start_date < registration_end {
        return Err(AppError::InvalidSchedule(
            "Hackathon start must be after registration end".into(),
        ));
    }
    if end_date <= start_date {
        return Err(AppError::InvalidSchedule(
            "Hackathon end must be after start".into(),
        ));
    }
    if submission_deadline > end_date {
        return Err(AppError::InvalidSchedule(
            "Submission deadline must be before or on hackathon end date".into(),
        ));
    }
    if submission_deadline < start_date {
        return Err(AppError::InvalidSchedule(
            "Submission deadline must be after hackathon start".into(),
        ));
    }
    Ok(())
}

/// Organizer-initiated status transition.
///
/// Only the owning organizer may move a hackathon, and only along the
/// allow-list. On success the status is swapped atomically; `published_at`
/// is stamped on the first entry into `Published` and never re-stamped.
pub async fn request_transition(
    db: &DatabaseConnection,
    hackathon: &hackathon::Model,
    actor_id: i32,
    target: HackathonStatus,
) -> Result<hackathon::Model, AppError> {
    if hackathon.organizer_id != actor_id {
        return Err(AppError::Forbidden);
    }

    let from = hackathon.status;
    if !from.can_transition_to(target) {
        return Err(AppError::InvalidTransition { from, to: target });
    }

    let now = Utc::now();
    let mut update = hackathon::Entity::update_many()
        .col_expr(hackathon::Column::Status, Expr::value(target))
        .col_expr(hackathon::Column::UpdatedAt, Expr::value(now))
        .filter(hackathon::Column::Id.eq(hackathon.id))
        .filter(hackathon::Column::Status.eq(from));

    if target == HackathonStatus::Published && hackathon.published_at.is_none() {
        update = update.col_expr(hackathon::Column::PublishedAt, Expr::value(now));
    }

    let result = update.exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::Conflict(
            "Hackathon status changed concurrently".into(),
        ));
    }

    hackathon::Entity::find_by_id(hackathon.id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hackathon not found".into()))
}

/// The clock-gated move due for a single hackathon at `now`, if any.
///
/// Conditions are lower bounds only, so a row whose windows have all elapsed
/// catches up by applying this repeatedly instead of getting stuck between
/// polls. Organizer moves and cancellation are never produced here.
pub fn scheduled_transition(
    hackathon: &hackathon::Model,
    now: DateTime<Utc>,
) -> Option<HackathonStatus> {
    use HackathonStatus::*;

    match hackathon.status {
        Published if now >= hackathon.registration_start => Some(RegistrationOpen),
        RegistrationOpen if now >= hackathon.registration_end => Some(RegistrationClosed),
        RegistrationClosed if now >= hackathon.start_date => Some(InProgress),
        InProgress if now >= hackathon.submission_deadline => Some(SubmissionOpen),
        SubmissionOpen if now > hackathon.submission_deadline => Some(SubmissionClosed),
        _ => None,
    }
}

/// Clock-driven bulk sweep over all hackathons.
///
/// Each move is a single set-based `UPDATE … WHERE status = <source>`, so the
/// sweep is idempotent, stateless and safe to run concurrently with
/// organizer-initiated transitions. Applied in lifecycle order so a row that
/// missed several polls advances all the way within one sweep.
pub async fn advance_by_clock<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> Result<u64, DbErr> {
    use HackathonStatus::*;

    let moves: &[(HackathonStatus, HackathonStatus, hackathon::Column, bool)] = &[
        (Published, RegistrationOpen, hackathon::Column::RegistrationStart, false),
        (RegistrationOpen, RegistrationClosed, hackathon::Column::RegistrationEnd, false),
        (RegistrationClosed, InProgress, hackathon::Column::StartDate, false),
        (InProgress, SubmissionOpen, hackathon::Column::SubmissionDeadline, false),
        // The deadline instant itself still belongs to the open window.
        (SubmissionOpen, SubmissionClosed, hackathon::Column::SubmissionDeadline, true),
    ];

    let mut moved = 0;
    for &(source, target, gate_column, strict) in moves {
        let gate = if strict {
            gate_column.lt(now)
        } else {
            gate_column.lte(now)
        };

        let result = hackathon::Entity::update_many()
            .col_expr(hackathon::Column::Status, Expr::value(target))
            .col_expr(hackathon::Column::UpdatedAt, Expr::value(now))
            .filter(hackathon::Column::Status.eq(source))
            .filter(gate)
            .exec(db)
            .await?;
        moved += result.rows_affected;
    }

    Ok(moved)
}

/// Lazy variant of the sweep for a single just-read row.
///
/// Applies due moves one CAS at a time; losing a race to another writer
/// re-reads and stops rather than retrying.
pub async fn advance_lazily(
    db: &DatabaseConnection,
    mut hackathon: hackathon::Model,
    now: DateTime<Utc>,
) -> Result<hackathon::Model, AppError> {
    while let Some(next) = scheduled_transition(&hackathon, now) {
        let result = hackathon::Entity::update_many()
            .col_expr(hackathon::Column::Status, Expr::value(next))
            .col_expr(hackathon::Column::UpdatedAt, Expr::value(now))
            .filter(hackathon::Column::Id.eq(hackathon.id))
            .filter(hackathon::Column::Status.eq(hackathon.status))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return hackathon::Entity::find_by_id(hackathon.id)
                .one(db)
                .await?
                .ok_or_else(|| AppError::NotFound("Hackathon not found".into()));
        }

        hackathon.status = next;
        hackathon.updated_at = now;
    }
    Ok(hackathon)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn fixture(status: HackathonStatus) -> hackathon::Model {
        hackathon::Model {
            id: 1,
            title: "Test Hackathon".into(),
            description: "desc".into(),
            registration_start: utc("2025-01-01T00:00:00Z"),
            registration_end: utc("2025-01-10T00:00:00Z"),
            start_date: utc("2025-01-15T00:00:00Z"),
            end_date: utc("2025-01-20T00:00:00Z"),
            submission_deadline: utc("2025-01-19T00:00:00Z"),
            status,
            published_at: None,
            organizer_id: 1,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            updated_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    #[test]
    fn valid_schedule_passes() {
        assert!(
            validate_dates(
                utc("2025-01-01T00:00:00Z"),
                utc("2025-01-10T00:00:00Z"),
                utc("2025-01-10T00:00:00Z"), // start may equal registration end
                utc("2025-01-20T00:00:00Z"),
                utc("2025-01-19T00:00:00Z"),
            )
            .is_ok()
        );
    }

    #[test]
    fn schedule_orderings_are_enforced() {
        // Registration end before start.
        assert!(matches!(
            validate_dates(
                utc("2025-01-10T00:00:00Z"),
                utc("2025-01-01T00:00:00Z"),
                utc("2025-01-15T00:00:00Z"),
                utc("2025-01-20T00:00:00Z"),
                utc("2025-01-19T00:00:00Z"),
            ),
            Err(AppError::InvalidSchedule(_))
        ));
        // Event starting inside the registration window.
        assert!(matches!(
            validate_dates(
                utc("2025-01-01T00:00:00Z"),
                utc("2025-01-10T00:00:00Z"),
                utc("2025-01-09T00:00:00Z"),
                utc("2025-01-20T00:00:00Z"),
                utc("2025-01-19T00:00:00Z"),
            ),
            Err(AppError::InvalidSchedule(_))
        ));
        // Deadline past the event end.
        assert!(matches!(
            validate_dates(
                utc("2025-01-01T00:00:00Z"),
                utc("2025-01-10T00:00:00Z"),
                utc("2025-01-15T00:00:00Z"),
                utc("2025-01-20T00:00:00Z"),
                utc("2025-01-21T00:00:00Z"),
            ),
            Err(AppError::InvalidSchedule(_))
        ));
        // Deadline before the event start.
        assert!(matches!(
            validate_dates(
                utc("2025-01-01T00:00:00Z"),
                utc("2025-01-10T00:00:00Z"),
                utc("2025-01-15T00:00:00Z"),
                utc("2025-01-20T00:00:00Z"),
                utc("2025-01-14T00:00:00Z"),
            ),
            Err(AppError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn published_waits_for_registration_start() {
        let h = fixture(HackathonStatus::Published);
        assert_eq!(scheduled_transition(&h, utc("2024-12-31T00:00:00Z")), None);
        assert_eq!(
            scheduled_transition(&h, utc("2025-01-01T00:00:00Z")),
            Some(HackathonStatus::RegistrationOpen)
        );
    }

    #[test]
    fn skipped_polls_catch_up_instead_of_sticking() {
        // Poll arrives after registration already ended, with the row still
        // in Published: it must advance and then advance again, not stall.
        let mut h = fixture(HackathonStatus::Published);
        let now = utc("2025-01-12T00:00:00Z");

        let first = scheduled_transition(&h, now).unwrap();
        assert_eq!(first, HackathonStatus::RegistrationOpen);
        h.status = first;

        let second = scheduled_transition(&h, now).unwrap();
        assert_eq!(second, HackathonStatus::RegistrationClosed);
        h.status = second;

        assert_eq!(scheduled_transition(&h, now), None);
    }

    #[test]
    fn deadline_boundary_between_open_and_closed() {
        let at_deadline = utc("2025-01-19T00:00:00Z");
        let past_deadline = utc("2025-01-19T00:00:01Z");

        let in_progress = fixture(HackathonStatus::InProgress);
        assert_eq!(
            scheduled_transition(&in_progress, at_deadline),
            Some(HackathonStatus::SubmissionOpen)
        );

        // The deadline instant itself keeps submissions open.
        let open = fixture(HackathonStatus::SubmissionOpen);
        assert_eq!(scheduled_transition(&open, at_deadline), None);
        assert_eq!(
            scheduled_transition(&open, past_deadline),
            Some(HackathonStatus::SubmissionClosed)
        );
    }

    #[test]
    fn terminal_and_manual_states_never_move() {
        let far_future = utc("2030-01-01T00:00:00Z");
        for status in [
            HackathonStatus::Draft,
            HackathonStatus::SubmissionClosed,
            HackathonStatus::Judging,
            HackathonStatus::Completed,
            HackathonStatus::Cancelled,
        ] {
            assert_eq!(scheduled_transition(&fixture(status), far_future), None);
        }
    }
}
