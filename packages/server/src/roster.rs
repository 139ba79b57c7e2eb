//! Participant reconciliation.
//!
//! Registration rows, team memberships and submissions are three
//! independently-writable participation signals; real usage drifts (a user
//! can join a team or submit without an explicit registration row), and the
//! roster must surface every identity exactly once regardless of which
//! signals exist. The merge is recomputed on every request and never cached.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::HashMap;

use crate::entity::{hackathon_participant, submission, team, team_member, user};
use crate::error::AppError;

/// One reconciled participant. Derived, never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct RosterEntry {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
    pub has_submission: bool,
    pub submission_id: Option<i32>,
}

/// A participation signal from any of the three sources.
#[derive(Clone, Debug)]
pub struct Signal {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub seen_at: DateTime<Utc>,
    pub submission_id: Option<i32>,
}

/// Merge the three signal sources into one deduplicated roster.
///
/// Passes run in trust order. A later pass may add a new identity or upgrade
/// the submission flag on an existing one, but never overwrites an earlier
/// pass's `registered_at`. Output order is insertion order (registrations
/// first, then team-only members, then submit-only users) so pagination
/// stays stable; the order carries no further meaning.
pub fn merge_signals(
    registrations: Vec<Signal>,
    memberships: Vec<Signal>,
    submissions: Vec<Signal>,
) -> Vec<RosterEntry> {
    let mut roster: Vec<RosterEntry> = Vec::new();
    let mut index: HashMap<i32, usize> = HashMap::new();

    // Pass 1: explicit registrations, the canonical signal.
    for reg in registrations {
        if index.contains_key(&reg.user_id) {
            continue;
        }
        index.insert(reg.user_id, roster.len());
        roster.push(RosterEntry {
            user_id: reg.user_id,
            name: reg.name,
            email: reg.email,
            registered_at: reg.seen_at,
            has_submission: false,
            submission_id: None,
        });
    }

    // Pass 2: team members missing a registration row.
    for member in memberships {
        if index.contains_key(&member.user_id) {
            continue;
        }
        index.insert(member.user_id, roster.len());
        roster.push(RosterEntry {
            user_id: member.user_id,
            name: member.name,
            email: member.email,
            registered_at: member.seen_at,
            has_submission: false,
            submission_id: None,
        });
    }

    // Pass 3: submitters. Upgrades the flag on known identities without
    // touching their timestamp; unknown submitters are added outright.
    for sub in submissions {
        match index.get(&sub.user_id) {
            Some(&i) => {
                roster[i].has_submission = true;
                roster[i].submission_id = sub.submission_id;
            }
            None => {
                index.insert(sub.user_id, roster.len());
                roster.push(RosterEntry {
                    user_id: sub.user_id,
                    name: sub.name,
                    email: sub.email,
                    registered_at: sub.seen_at,
                    has_submission: true,
                    submission_id: sub.submission_id,
                });
            }
        }
    }

    roster
}

/// Build the authoritative roster for a hackathon.
///
/// Best-effort by design: no filtering is applied and the merge itself
/// cannot fail, so the result is always a (possibly empty) list.
pub async fn build_roster(
    db: &DatabaseConnection,
    hackathon_id: i32,
) -> Result<Vec<RosterEntry>, AppError> {
    let registrations = hackathon_participant::Entity::find()
        .filter(hackathon_participant::Column::HackathonId.eq(hackathon_id))
        .find_also_related(user::Entity)
        .order_by_asc(hackathon_participant::Column::JoinedAt)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(row, usr)| {
            let usr = usr?;
            Some(Signal {
                user_id: row.user_id,
                name: usr.display_name,
                email: usr.email,
                seen_at: row.joined_at,
                submission_id: None,
            })
        })
        .collect();

    let team_ids: Vec<i32> = team::Entity::find()
        .filter(team::Column::HackathonId.eq(hackathon_id))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    let memberships = if team_ids.is_empty() {
        Vec::new()
    } else {
        team_member::Entity::find()
            .filter(team_member::Column::TeamId.is_in(team_ids))
            .find_also_related(user::Entity)
            .order_by_asc(team_member::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(row, usr)| {
                let usr = usr?;
                Some(Signal {
                    user_id: row.user_id,
                    name: usr.display_name,
                    email: usr.email,
                    seen_at: row.created_at,
                    submission_id: None,
                })
            })
            .collect()
    };

    let submissions = submission::Entity::find()
        .filter(submission::Column::HackathonId.eq(hackathon_id))
        .find_also_related(user::Entity)
        .order_by_asc(submission::Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(row, usr)| {
            let usr = usr?;
            Some(Signal {
                user_id: row.submitter_id,
                name: usr.display_name,
                email: usr.email,
                seen_at: row.created_at,
                submission_id: Some(row.id),
            })
        })
        .collect();

    Ok(merge_signals(registrations, memberships, submissions))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn signal(user_id: i32, seen_at: &str) -> Signal {
        Signal {
            user_id,
            name: format!("User {user_id}"),
            email: format!("user{user_id}@example.com"),
            seen_at: utc(seen_at),
            submission_id: None,
        }
    }

    fn submission_signal(user_id: i32, submission_id: i32, seen_at: &str) -> Signal {
        Signal {
            submission_id: Some(submission_id),
            ..signal(user_id, seen_at)
        }
    }

    #[test]
    fn covers_the_union_of_all_sources() {
        let roster = merge_signals(
            vec![signal(1, "2025-01-02T00:00:00Z"), signal(2, "2025-01-03T00:00:00Z")],
            vec![signal(2, "2025-01-04T00:00:00Z"), signal(3, "2025-01-05T00:00:00Z")],
            vec![submission_signal(4, 40, "2025-01-06T00:00:00Z")],
        );

        let ids: Vec<i32> = roster.iter().map(|e| e.user_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(roster.iter().filter(|e| e.has_submission).count() == 1);
    }

    #[test]
    fn is_deterministic_and_idempotent() {
        let regs = vec![signal(1, "2025-01-02T00:00:00Z")];
        let members = vec![signal(2, "2025-01-03T00:00:00Z")];
        let subs = vec![submission_signal(1, 10, "2025-01-04T00:00:00Z")];

        let first = merge_signals(regs.clone(), members.clone(), subs.clone());
        let second = merge_signals(regs, members, subs);
        assert_eq!(first, second);
    }

    #[test]
    fn registration_timestamp_wins_over_submission() {
        let roster = merge_signals(
            vec![signal(1, "2025-01-02T00:00:00Z")],
            vec![],
            vec![submission_signal(1, 10, "2025-01-08T00:00:00Z")],
        );

        assert_eq!(roster.len(), 1);
        let entry = &roster[0];
        // Submission upgrades the flag but must not touch registered_at.
        assert_eq!(entry.registered_at, utc("2025-01-02T00:00:00Z"));
        assert!(entry.has_submission);
        assert_eq!(entry.submission_id, Some(10));
    }

    #[test]
    fn team_membership_does_not_overwrite_registration() {
        let roster = merge_signals(
            vec![signal(1, "2025-01-02T00:00:00Z")],
            vec![signal(1, "2025-01-05T00:00:00Z")],
            vec![],
        );

        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].registered_at, utc("2025-01-02T00:00:00Z"));
        assert!(!roster[0].has_submission);
    }

    #[test]
    fn submit_only_users_are_kept_not_filtered() {
        let roster = merge_signals(
            vec![],
            vec![],
            vec![submission_signal(9, 90, "2025-01-06T00:00:00Z")],
        );

        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].registered_at, utc("2025-01-06T00:00:00Z"));
        assert!(roster[0].has_submission);
        assert_eq!(roster[0].submission_id, Some(90));
    }

    #[test]
    fn empty_sources_yield_an_empty_roster() {
        assert!(merge_signals(vec![], vec![], vec![]).is_empty());
    }
}
