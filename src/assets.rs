//! Upload/delete facade handed to callers such as HTTP route handlers.
//!
//! Every call returns an [`OperationResult`]; faults from the remote host,
//! the filesystem or bad arguments are logged and turned into the failure
//! variant instead of being propagated.

use crate::cdn::{CdnService, CloudinaryClient};
use crate::config::Config;
use crate::models::{
    DeletedAsset, OperationResult, ResourceType, UploadOptions, UploadSource, UploadedAsset,
};
use std::path::Path;
use tracing::{error, info};

pub struct AssetManager {
    cdn: Box<dyn CdnService>,
}

impl AssetManager {
    pub fn new(cdn: Box<dyn CdnService>) -> Self {
        Self { cdn }
    }

    pub fn from_config(config: &Config) -> Self {
        info!(
            "Configured Cloudinary account '{}' (secure: {})",
            config.cloud_name, config.secure
        );
        Self::new(Box::new(CloudinaryClient::new(config.clone())))
    }

    /// Reads the environment once and builds a manager around the real client.
    pub fn from_env() -> Self {
        Self::from_config(&Config::from_env())
    }

    pub async fn upload(
        &self,
        source: impl Into<UploadSource>,
        options: &UploadOptions,
    ) -> OperationResult<UploadedAsset> {
        let source = source.into();

        match self.cdn.upload(&source, options).await {
            Ok(asset) => {
                info!(
                    "Uploaded {} as {}",
                    source.describe(),
                    asset.public_id.as_deref().unwrap_or("<unknown>")
                );
                OperationResult::Success(asset)
            }
            Err(e) => {
                error!("Upload of {} failed: {}", source.describe(), e);
                OperationResult::failure(e.to_string())
            }
        }
    }

    /// Uploads into the default folder as an image.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> OperationResult<UploadedAsset> {
        self.upload(path.as_ref(), &UploadOptions::default()).await
    }

    /// A `"not found"` response is still a success; only transport or API
    /// errors produce the failure variant.
    pub async fn delete(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> OperationResult<DeletedAsset> {
        match self.cdn.destroy(public_id, resource_type).await {
            Ok(result) => {
                let deleted = DeletedAsset { result };
                info!(
                    "Delete of {} ({}) returned {}",
                    public_id,
                    resource_type,
                    deleted.status().unwrap_or("<no status>")
                );
                OperationResult::Success(deleted)
            }
            Err(e) => {
                error!("Delete of {} failed: {}", public_id, e);
                OperationResult::failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdn::MockCdnClient;
    use serde_json::json;

    fn manager(mock: &MockCdnClient) -> AssetManager {
        AssetManager::new(Box::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_upload_success_has_url_and_public_id() {
        let mock = MockCdnClient::new();
        let assets = manager(&mock);

        let result = assets
            .upload(
                UploadSource::bytes(b"scan".to_vec(), "xray.png"),
                &UploadOptions::default(),
            )
            .await;

        let asset = result.success().expect("upload should succeed");
        assert!(!asset.url.as_deref().unwrap_or_default().is_empty());
        assert_eq!(asset.public_id.as_deref(), Some("healthcare/xray"));
        assert_eq!(asset.resource_type.as_deref(), Some("image"));
    }

    #[tokio::test]
    async fn test_upload_failure_is_contained() {
        let mock = MockCdnClient::new().with_failure("Must supply api_key");
        let assets = manager(&mock);

        let result = assets.upload_file("/tmp/xray.png").await;

        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("Must supply api_key"));
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_failure() {
        let assets = manager(&MockCdnClient::new());

        let result = assets.upload_file("/no/such/dir/scan.png").await;

        assert!(result.error().unwrap().starts_with("IO error"));
    }

    #[tokio::test]
    async fn test_delete_not_found_is_success() {
        let assets = manager(&MockCdnClient::new());

        let result = assets.delete("healthcare/missing", ResourceType::Image).await;

        let deleted = result.success().expect("not found is not a failure");
        assert_eq!(deleted.result, json!({ "result": "not found" }));
    }

    #[tokio::test]
    async fn test_delete_failure_is_contained() {
        let mock = MockCdnClient::new().with_failure("Service unavailable (status 503)");
        let assets = manager(&mock);

        let result = assets.delete("healthcare/xray", ResourceType::Image).await;

        assert_eq!(
            result.error(),
            Some("Cloudinary API error: Service unavailable (status 503)")
        );
        assert_eq!(mock.get_destroy_count(), 1);
    }
}
