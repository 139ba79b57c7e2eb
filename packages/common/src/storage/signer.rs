use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::SigningError;

/// Mints short-lived, read-only capability URLs over durable storage keys.
///
/// The signature is computed locally from a shared key; implementations must
/// not perform network I/O. The credential stays behind this trait so the
/// gating logic can be exercised against a mock.
#[async_trait]
pub trait UrlSigner: Send + Sync {
    /// Produce a read-only URL for `key`, valid until `expires_at`.
    ///
    /// Anyone holding the returned URL can read the object until expiry with
    /// no further authorization check.
    async fn presign_read(
        &self,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, SigningError>;

    /// The durable, unsigned URL for `key`. Used for degraded delivery when
    /// signing is unavailable.
    fn unsigned_url(&self, key: &str) -> String;
}

/// Signer used when no storage credential is configured.
///
/// `presign_read` always fails with [`SigningError::NotConfigured`]; callers
/// translate that into unsigned degraded delivery rather than a request
/// failure.
pub struct NoopSigner {
    base_url: Option<String>,
}

impl NoopSigner {
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }
}

#[async_trait]
impl UrlSigner for NoopSigner {
    async fn presign_read(
        &self,
        _key: &str,
        _expires_at: DateTime<Utc>,
    ) -> Result<String, SigningError> {
        Err(SigningError::NotConfigured)
    }

    fn unsigned_url(&self, key: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_signer_never_signs() {
        let signer = NoopSigner::new(None);
        let err = signer
            .presign_read("submissions/42/report.pdf", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, SigningError::NotConfigured));
    }

    #[test]
    fn unsigned_url_joins_base() {
        let signer = NoopSigner::new(Some("https://files.example.com/".into()));
        assert_eq!(
            signer.unsigned_url("submissions/42/report.pdf"),
            "https://files.example.com/submissions/42/report.pdf"
        );

        let bare = NoopSigner::new(None);
        assert_eq!(bare.unsigned_url("a/b.txt"), "a/b.txt");
    }
}
