use async_trait::async_trait;
use chrono::{DateTime, Utc};
use s3::creds::Credentials;
use s3::{Bucket, Region};

use super::error::SigningError;
use super::signer::UrlSigner;

/// Presigned GETs are capped by the protocol at 7 days.
const MAX_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;
const MIN_EXPIRY_SECS: i64 = 60;

/// Capability-URL signer backed by an S3-compatible object store.
///
/// Presigning is a pure HMAC computation over the bucket, object path,
/// permitted method and validity window; no request leaves the process.
pub struct S3Signer {
    bucket: Box<Bucket>,
    public_base: String,
}

impl S3Signer {
    pub fn new(
        bucket_name: &str,
        region: &str,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, SigningError> {
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| SigningError::Credentials(e.to_string()))?;
        let endpoint = endpoint.trim_end_matches('/');
        let region = Region::Custom {
            region: region.to_string(),
            endpoint: endpoint.to_string(),
        };
        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| SigningError::Backend(e.to_string()))?
            .with_path_style();

        Ok(Self {
            bucket,
            public_base: format!("{endpoint}/{bucket_name}"),
        })
    }
}

#[async_trait]
impl UrlSigner for S3Signer {
    async fn presign_read(
        &self,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, SigningError> {
        let secs = (expires_at - Utc::now())
            .num_seconds()
            .clamp(MIN_EXPIRY_SECS, MAX_EXPIRY_SECS) as u32;

        self.bucket
            .presign_get(key, secs, None)
            .await
            .map_err(|e| SigningError::Backend(e.to_string()))
    }

    fn unsigned_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}
