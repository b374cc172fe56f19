//! Remote asset host integration
//!
//! Handles pushing media files to Cloudinary and destroying them again.
//! [`CdnService`] is the seam the facade talks through, so tests can swap
//! the HTTP client for [`MockCdnClient`].

pub mod cloudinary;
pub mod mock;

pub use cloudinary::CloudinaryClient;
pub use mock::MockCdnClient;

use crate::models::{ResourceType, UploadOptions, UploadSource, UploadedAsset};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CdnService: Send + Sync {
    /// Uploads with overwrite and cache invalidation always on.
    async fn upload(&self, source: &UploadSource, options: &UploadOptions)
        -> Result<UploadedAsset>;

    /// Returns the service's raw destroy response (`{"result": "ok"}` and
    /// friends) without interpreting it.
    async fn destroy(&self, public_id: &str, resource_type: ResourceType)
        -> Result<serde_json::Value>;
}
