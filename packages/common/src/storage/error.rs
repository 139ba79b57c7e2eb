use thiserror::Error;

/// Errors that can occur while minting a capability URL.
///
/// None of these are fatal to a request: callers fall back to unsigned
/// delivery and surface `is_signed = false` instead.
#[derive(Debug, Error)]
pub enum SigningError {
    /// No signing credential is configured.
    #[error("signing credential is not configured")]
    NotConfigured,
    /// The configured credential could not be parsed or loaded.
    #[error("invalid signing credential: {0}")]
    Credentials(String),
    /// The signing backend rejected the request.
    #[error("signing backend error: {0}")]
    Backend(String),
}
