//! Object storage for catalogue images
//!
//! Talks to an S3-compatible bucket (Cloudflare R2 in production) for
//! product, gallery and review photos: direct upload, deletion alongside
//! row deletion, and presigned PUT URLs for client-side uploads.

use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use rand::RngExt;
use strum::{AsRefStr, EnumString};
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::errors::{FinituraError, Result};

/// Upload content types the pipeline accepts
pub const ALLOWED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "image/avif"];

/// 10 MiB upload cap
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Bucket prefix an image lands under
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum MediaFolder {
    Products,
    Gallery,
    Reviews,
}

pub fn is_allowed_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// `{folder}/{epoch-millis}-{6 random alphanumerics}.{ext}`; the extension
/// comes from the original filename, defaulting to webp.
pub fn unique_key(original_name: &str, folder: MediaFolder) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    let suffix: String = (0..6)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();
    let extension = original_name
        .rsplit('.')
        .next()
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| "webp".to_string());
    format!("{}/{}-{}.{}", folder.as_ref(), timestamp, suffix, extension)
}

/// S3-compatible media store
pub struct MediaStore {
    client: Client,
    bucket: String,
    public_url: String,
    presign_expiry: Duration,
}

impl MediaStore {
    /// Build the client from configuration. Credentials come from the
    /// environment (AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY).
    pub async fn from_config(config: &MediaConfig) -> Self {
        let loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(ref endpoint) = config.endpoint {
            // Path-style addressing for R2/MinIO compatibility
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        info!("Media store ready (bucket: {})", config.bucket);

        Self {
            client,
            bucket: config.bucket.clone(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
            presign_expiry: Duration::from_secs(config.presign_expiry_secs),
        }
    }

    pub fn presign_expiry_secs(&self) -> u64 {
        self.presign_expiry.as_secs()
    }

    /// Public URL an uploaded key is served from
    pub fn public_url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }

    /// Recover the object key from a stored public URL
    fn key_from_url<'a>(&self, url: &'a str) -> &'a str {
        url.strip_prefix(&format!("{}/", self.public_url))
            .unwrap_or(url)
    }

    /// Upload image bytes; returns the public URL.
    /// Type and size must already be validated by the caller.
    pub async fn upload(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> Result<String> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .cache_control("public, max-age=31536000, immutable")
            .send()
            .await
            .map_err(|e| FinituraError::media_storage(format!("Upload failed: {}", e)))?;

        debug!("Uploaded {} bytes to {}", size, key);
        Ok(self.public_url_for(key))
    }

    /// Delete a stored image by its public URL (or raw key)
    pub async fn delete_by_url(&self, url: &str) -> Result<()> {
        let key = self.key_from_url(url);
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| FinituraError::media_storage(format!("Delete failed: {}", e)))?;

        debug!("Deleted media object {}", key);
        Ok(())
    }

    /// Presigned PUT URL for a direct client-side upload
    pub async fn presign_put(&self, key: &str, content_type: &str) -> Result<String> {
        let presigning = PresigningConfig::expires_in(self.presign_expiry)
            .map_err(|e| FinituraError::media_storage(format!("Presign config failed: {}", e)))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| FinituraError::media_storage(format!("Presign failed: {}", e)))?;

        Ok(request.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_is_allowed_type() {
        assert!(is_allowed_type("image/jpeg"));
        assert!(is_allowed_type("image/webp"));
        assert!(!is_allowed_type("image/gif"));
        assert!(!is_allowed_type("application/pdf"));
    }

    #[test]
    fn test_unique_key_shape() {
        let key = unique_key("kitchen-wall.JPG", MediaFolder::Gallery);
        assert!(key.starts_with("gallery/"));
        assert!(key.ends_with(".jpg"));

        let rest = key.strip_prefix("gallery/").unwrap();
        let (stem, _ext) = rest.rsplit_once('.').unwrap();
        let (timestamp, suffix) = stem.split_once('-').unwrap();
        assert!(timestamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), 6);
    }

    #[test]
    fn test_unique_key_defaults_extension() {
        let key = unique_key("no-extension", MediaFolder::Products);
        assert!(key.starts_with("products/"));
        assert!(key.ends_with(".webp"));
    }

    #[test]
    fn test_unique_keys_do_not_collide() {
        let a = unique_key("a.png", MediaFolder::Reviews);
        let b = unique_key("a.png", MediaFolder::Reviews);
        assert_ne!(a, b);
    }

    #[test]
    fn test_media_folder_parse() {
        assert_eq!(
            MediaFolder::from_str("products").unwrap(),
            MediaFolder::Products
        );
        assert!(MediaFolder::from_str("attachments").is_err());
    }
}
