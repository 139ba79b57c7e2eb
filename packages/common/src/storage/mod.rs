mod error;
mod signer;

#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::SigningError;
pub use signer::{NoopSigner, UrlSigner};
