#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a hackathon over its lifecycle.
///
/// Transitions are restricted to a fixed allow-list (see
/// [`HackathonStatus::allowed_transitions`]). `Completed` and `Cancelled` are
/// terminal. When the `sea-orm` feature is enabled, this enum can be used
/// directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HackathonStatus {
    /// Being edited by its organizer; invisible to everyone else.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "DRAFT"))]
    Draft,
    /// Announced, registration not yet open.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PUBLISHED"))]
    Published,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "REGISTRATION_OPEN"))]
    RegistrationOpen,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "REGISTRATION_CLOSED"))]
    RegistrationClosed,
    /// The event is running but submissions have not opened.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "IN_PROGRESS"))]
    InProgress,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "SUBMISSION_OPEN"))]
    SubmissionOpen,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "SUBMISSION_CLOSED"))]
    SubmissionClosed,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "JUDGING"))]
    Judging,
    /// Terminal.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "COMPLETED"))]
    Completed,
    /// Terminal. Reachable from every state except `Judging` and `Completed`.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "CANCELLED"))]
    Cancelled,
}

impl HackathonStatus {
    /// All status values, in lifecycle order.
    pub const ALL: &'static [HackathonStatus] = &[
        Self::Draft,
        Self::Published,
        Self::RegistrationOpen,
        Self::RegistrationClosed,
        Self::InProgress,
        Self::SubmissionOpen,
        Self::SubmissionClosed,
        Self::Judging,
        Self::Completed,
        Self::Cancelled,
    ];

    /// The organizer-initiated transitions permitted from this status.
    pub fn allowed_transitions(&self) -> &'static [HackathonStatus] {
        match self {
            Self::Draft => &[Self::Published, Self::Cancelled],
            Self::Published => &[Self::RegistrationOpen, Self::Draft, Self::Cancelled],
            Self::RegistrationOpen => &[Self::RegistrationClosed, Self::Cancelled],
            Self::RegistrationClosed => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::SubmissionOpen, Self::Cancelled],
            Self::SubmissionOpen => &[Self::SubmissionClosed, Self::Cancelled],
            Self::SubmissionClosed => &[Self::Judging, Self::Cancelled],
            Self::Judging => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Returns true if `target` is a permitted transition from this status.
    pub fn can_transition_to(&self, target: HackathonStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Returns true if the event has started (dates can no longer be edited
    /// and the hackathon can no longer be deleted).
    pub fn has_started(&self) -> bool {
        matches!(
            self,
            Self::InProgress
                | Self::SubmissionOpen
                | Self::SubmissionClosed
                | Self::Judging
                | Self::Completed
        )
    }

    /// Returns the string representation (SCREAMING_SNAKE_CASE).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::RegistrationOpen => "REGISTRATION_OPEN",
            Self::RegistrationClosed => "REGISTRATION_CLOSED",
            Self::InProgress => "IN_PROGRESS",
            Self::SubmissionOpen => "SUBMISSION_OPEN",
            Self::SubmissionClosed => "SUBMISSION_CLOSED",
            Self::Judging => "JUDGING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for HackathonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for HackathonStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            HackathonStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for HackathonStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "PUBLISHED" => Ok(Self::Published),
            "REGISTRATION_OPEN" => Ok(Self::RegistrationOpen),
            "REGISTRATION_CLOSED" => Ok(Self::RegistrationClosed),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "SUBMISSION_OPEN" => Ok(Self::SubmissionOpen),
            "SUBMISSION_CLOSED" => Ok(Self::SubmissionClosed),
            "JUDGING" => Ok(Self::Judging),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_roundtrip() {
        for status in HackathonStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            let parsed: HackathonStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*status, parsed);
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "REGISTRATION_OPEN".parse::<HackathonStatus>().unwrap(),
            HackathonStatus::RegistrationOpen
        );
        assert!("Invalid".parse::<HackathonStatus>().is_err());
    }

    #[test]
    fn terminal_states_allow_nothing() {
        assert!(HackathonStatus::Completed.is_terminal());
        assert!(HackathonStatus::Cancelled.is_terminal());
        for status in HackathonStatus::ALL {
            if !status.is_terminal() {
                assert!(!status.allowed_transitions().is_empty(), "{status}");
            }
        }
    }

    #[test]
    fn cancellation_reachable_except_from_judging_and_completed() {
        for status in HackathonStatus::ALL {
            let expected = !matches!(
                status,
                HackathonStatus::Judging
                    | HackathonStatus::Completed
                    | HackathonStatus::Cancelled
            );
            assert_eq!(
                status.can_transition_to(HackathonStatus::Cancelled),
                expected,
                "{status}"
            );
        }
    }

    #[test]
    fn disallowed_pairs_are_rejected() {
        // Every (source, target) pair outside the allow-list must be refused.
        for from in HackathonStatus::ALL {
            for to in HackathonStatus::ALL {
                let allowed = from.allowed_transitions().contains(to);
                assert_eq!(from.can_transition_to(*to), allowed, "{from} -> {to}");
            }
        }
        // Spot-check a few pairs that look plausible but are not allowed.
        assert!(!HackathonStatus::Draft.can_transition_to(HackathonStatus::RegistrationOpen));
        assert!(!HackathonStatus::Judging.can_transition_to(HackathonStatus::Cancelled));
        assert!(!HackathonStatus::SubmissionOpen.can_transition_to(HackathonStatus::Judging));
    }
}
