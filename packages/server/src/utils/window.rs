use chrono::{DateTime, Utc};

use crate::entity::{hackathon, submission};
use crate::error::AppError;

/// Time-window preconditions for participant actions.
///
/// These are advisory checks evaluated at the moment of the request; no lock
/// is held between check and act. Uniqueness races are caught by the
/// data-layer constraints, not here.

/// Registration is allowed in `[registration_start, registration_end)`.
pub fn check_registration_open(
    hackathon: &hackathon::Model,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if now < hackathon.registration_start || now >= hackathon.registration_end {
        return Err(AppError::RegistrationClosed);
    }
    Ok(())
}

/// Submitting is allowed in `[start_date, submission_deadline]`.
pub fn check_submission_window(
    hackathon: &hackathon::Model,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if now < hackathon.start_date {
        return Err(AppError::SubmissionWindowNotOpen);
    }
    if now > hackathon.submission_deadline {
        return Err(AppError::SubmissionLocked);
    }
    Ok(())
}

/// Editing shares the submit window's upper bound and additionally refuses
/// submissions already handed in as final.
pub fn check_submission_editable(
    target: &submission::Model,
    hackathon: &hackathon::Model,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if target.is_final && !target.is_draft {
        return Err(AppError::AlreadyFinal);
    }
    if now > hackathon.submission_deadline {
        return Err(AppError::SubmissionLocked);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use common::{HackathonStatus, SubmissionStatus};

    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn fixture() -> hackathon::Model {
        hackathon::Model {
            id: 1,
            title: "Test Hackathon".into(),
            description: "desc".into(),
            registration_start: utc("2025-01-01T00:00:00Z"),
            registration_end: utc("2025-01-10T00:00:00Z"),
            start_date: utc("2025-01-15T00:00:00Z"),
            end_date: utc("2025-01-20T00:00:00Z"),
            submission_deadline: utc("2025-01-19T00:00:00Z"),
            status: HackathonStatus::RegistrationOpen,
            published_at: None,
            organizer_id: 1,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            updated_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    fn draft_submission(is_final: bool) -> submission::Model {
        submission::Model {
            id: 1,
            title: "entry".into(),
            description: String::new(),
            repository_url: None,
            files: serde_json::json!([]),
            status: if is_final {
                SubmissionStatus::Submitted
            } else {
                SubmissionStatus::Draft
            },
            is_draft: !is_final,
            is_final,
            submitted_at: None,
            hackathon_id: 1,
            submitter_id: 2,
            team_id: None,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            updated_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    #[test]
    fn registration_window_is_half_open() {
        let h = fixture();
        // One second before the close boundary succeeds.
        assert!(check_registration_open(&h, utc("2025-01-09T23:59:59Z")).is_ok());
        // The boundary itself is closed.
        assert!(matches!(
            check_registration_open(&h, utc("2025-01-10T00:00:00Z")),
            Err(AppError::RegistrationClosed)
        ));
        // The open boundary is inclusive.
        assert!(check_registration_open(&h, utc("2025-01-01T00:00:00Z")).is_ok());
        assert!(matches!(
            check_registration_open(&h, utc("2024-12-31T23:59:59Z")),
            Err(AppError::RegistrationClosed)
        ));
    }

    #[test]
    fn submission_window_is_closed_on_both_ends() {
        let h = fixture();
        assert!(matches!(
            check_submission_window(&h, utc("2025-01-14T23:59:59Z")),
            Err(AppError::SubmissionWindowNotOpen)
        ));
        assert!(check_submission_window(&h, utc("2025-01-15T00:00:00Z")).is_ok());
        assert!(check_submission_window(&h, utc("2025-01-19T00:00:00Z")).is_ok());
        assert!(matches!(
            check_submission_window(&h, utc("2025-01-19T00:00:01Z")),
            Err(AppError::SubmissionLocked)
        ));
    }

    #[test]
    fn final_submissions_are_not_editable() {
        let h = fixture();
        let now = utc("2025-01-16T00:00:00Z");
        assert!(check_submission_editable(&draft_submission(false), &h, now).is_ok());
        assert!(matches!(
            check_submission_editable(&draft_submission(true), &h, now),
            Err(AppError::AlreadyFinal)
        ));
    }

    #[test]
    fn drafts_lock_after_the_deadline() {
        let h = fixture();
        assert!(matches!(
            check_submission_editable(&draft_submission(false), &h, utc("2025-01-19T00:00:01Z")),
            Err(AppError::SubmissionLocked)
        ));
    }
}
