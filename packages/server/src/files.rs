//! Capability-scoped file access.
//!
//! A submission's files carry durable storage locators that must never reach
//! a caller as-is. Depending on who is asking, each file resolves to a
//! signed time-limited URL (reviewers), unsigned metadata (the owner), or
//! nothing at all (everyone else — a silent omission, not an error).

use chrono::{DateTime, Duration, Utc};
use common::UserRole;
use common::storage::UrlSigner;
use serde::Serialize;

use crate::entity::submission::FileRecord;

/// The requesting actor, as far as file access is concerned.
#[derive(Clone, Copy, Debug)]
pub struct Viewer {
    pub user_id: i32,
    pub role: UserRole,
}

/// One resolved file entry. `storage_key` never appears here.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct FileView {
    pub name: String,
    pub size: i64,
    pub mime_type: Option<String>,
    /// Signed capability URL for reviewers; unsigned fallback URL when
    /// signing is degraded; absent for the owner.
    pub download_url: Option<String>,
    /// False means the URL (if any) is not a time-limited capability and the
    /// UI should warn accordingly.
    pub is_signed: bool,
}

/// Expiry for a signed read: the event's own end date, or now + 7 days when
/// that date is missing or already behind us. Bounded by the event rather
/// than an arbitrary long horizon because the URL is bearer-readable until
/// it expires.
pub fn read_expiry(hackathon_end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match hackathon_end {
        Some(end) if end > now => end,
        _ => now + Duration::days(7),
    }
}

/// Resolve a single file for a viewer. Returns `None` when the viewer has
/// neither an elevated role nor ownership.
pub async fn resolve_file(
    file: &FileRecord,
    viewer: &Viewer,
    owner_id: i32,
    expires_at: DateTime<Utc>,
    signer: &dyn UrlSigner,
) -> Option<FileView> {
    if viewer.role.is_reviewer() {
        let (download_url, is_signed) = match signer.presign_read(&file.storage_key, expires_at).await
        {
            Ok(url) => (Some(url), true),
            Err(e) => {
                // Degraded delivery beats losing visibility of a valid
                // submission; the caller sees is_signed = false.
                tracing::warn!("Signed URL unavailable for '{}': {e}", file.name);
                (Some(signer.unsigned_url(&file.storage_key)), false)
            }
        };
        return Some(FileView {
            name: file.name.clone(),
            size: file.size,
            mime_type: file.mime_type.clone(),
            download_url,
            is_signed,
        });
    }

    if viewer.user_id == owner_id {
        // Owners keep their metadata but gain no privileged URL.
        return Some(FileView {
            name: file.name.clone(),
            size: file.size,
            mime_type: file.mime_type.clone(),
            download_url: None,
            is_signed: false,
        });
    }

    None
}

/// Resolve a submission's whole file list for a viewer. Unauthorized entries
/// vanish from the result rather than erroring.
pub async fn resolve_submission_files(
    files: &[FileRecord],
    viewer: &Viewer,
    owner_id: i32,
    hackathon_end: Option<DateTime<Utc>>,
    signer: &dyn UrlSigner,
) -> Vec<FileView> {
    let expires_at = read_expiry(hackathon_end, Utc::now());

    let mut views = Vec::with_capacity(files.len());
    for file in files {
        if let Some(view) = resolve_file(file, viewer, owner_id, expires_at, signer).await {
            views.push(view);
        }
    }
    views
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use common::storage::SigningError;

    use super::*;

    const OWNER: i32 = 10;
    const OTHER: i32 = 11;

    /// Deterministic signer standing in for the shared-key backend.
    struct FakeSigner {
        fail: bool,
    }

    #[async_trait]
    impl UrlSigner for FakeSigner {
        async fn presign_read(
            &self,
            key: &str,
            expires_at: DateTime<Utc>,
        ) -> Result<String, SigningError> {
            if self.fail {
                return Err(SigningError::Backend("credential rejected".into()));
            }
            Ok(format!(
                "https://store.example.com/{key}?sig=stub&expiry={}",
                expires_at.format("%Y-%m-%d")
            ))
        }

        fn unsigned_url(&self, key: &str) -> String {
            format!("https://store.example.com/{key}")
        }
    }

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn files() -> Vec<FileRecord> {
        vec![FileRecord {
            name: "report.pdf".into(),
            storage_key: "submissions/10/report.pdf".into(),
            size: 2048,
            mime_type: Some("application/pdf".into()),
        }]
    }

    fn viewer(user_id: i32, role: UserRole) -> Viewer {
        Viewer { user_id, role }
    }

    #[tokio::test]
    async fn reviewers_get_a_signed_url_bounded_by_the_event_end() {
        let end = Some(utc("2025-06-01T00:00:00Z"));
        let signer = FakeSigner { fail: false };

        for role in [UserRole::Organizer, UserRole::Judge, UserRole::Admin] {
            let views =
                resolve_submission_files(&files(), &viewer(99, role), OWNER, end, &signer).await;
            assert_eq!(views.len(), 1);
            assert!(views[0].is_signed);
            let url = views[0].download_url.as_deref().unwrap();
            assert!(url.contains("expiry=2025-06-01"), "{url}");
        }
    }

    #[tokio::test]
    async fn owner_sees_metadata_without_a_privileged_url() {
        let views = resolve_submission_files(
            &files(),
            &viewer(OWNER, UserRole::Participant),
            OWNER,
            Some(utc("2025-06-01T00:00:00Z")),
            &FakeSigner { fail: false },
        )
        .await;

        assert_eq!(views.len(), 1);
        assert!(!views[0].is_signed);
        assert!(views[0].download_url.is_none());
        assert_eq!(views[0].name, "report.pdf");
    }

    #[tokio::test]
    async fn strangers_see_nothing_at_all() {
        let signer = FakeSigner { fail: false };
        let organizer_view = resolve_submission_files(
            &files(),
            &viewer(99, UserRole::Organizer),
            OWNER,
            None,
            &signer,
        )
        .await;
        let stranger_view = resolve_submission_files(
            &files(),
            &viewer(OTHER, UserRole::Participant),
            OWNER,
            None,
            &signer,
        )
        .await;

        // The unauthorized list is shorter, not an error.
        assert_eq!(organizer_view.len(), 1);
        assert!(stranger_view.is_empty());
    }

    #[tokio::test]
    async fn signing_failure_degrades_to_an_unsigned_url() {
        let views = resolve_submission_files(
            &files(),
            &viewer(99, UserRole::Judge),
            OWNER,
            Some(utc("2025-06-01T00:00:00Z")),
            &FakeSigner { fail: true },
        )
        .await;

        assert_eq!(views.len(), 1);
        assert!(!views[0].is_signed);
        assert_eq!(
            views[0].download_url.as_deref(),
            Some("https://store.example.com/submissions/10/report.pdf")
        );
    }

    #[test]
    fn expiry_falls_back_when_the_end_date_is_unusable() {
        let now = utc("2025-05-01T00:00:00Z");

        // Future end date is used as-is.
        let end = utc("2025-06-01T00:00:00Z");
        assert_eq!(read_expiry(Some(end), now), end);

        // Past end date and no end date both fall back to now + 7 days.
        let fallback = now + Duration::days(7);
        assert_eq!(read_expiry(Some(utc("2025-01-01T00:00:00Z")), now), fallback);
        assert_eq!(read_expiry(None, now), fallback);
    }
}
