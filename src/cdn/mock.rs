use super::CdnService;
use crate::models::{ResourceType, UploadOptions, UploadSource, UploadedAsset};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// In-memory stand-in for the remote host.
///
/// Public IDs are `folder/<file stem>`, so re-uploading the same file
/// replaces the earlier asset under the same ID.
#[derive(Clone)]
pub struct MockCdnClient {
    assets: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
    base_url: String,
    failure: Option<String>,
    upload_count: Arc<Mutex<usize>>,
    destroy_count: Arc<Mutex<usize>>,
}

impl MockCdnClient {
    pub fn new() -> Self {
        Self {
            assets: Arc::new(Mutex::new(HashMap::new())),
            base_url: "https://res.mock-cdn.example.com/demo".to_string(),
            failure: None,
            upload_count: Arc::new(Mutex::new(0)),
            destroy_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_asset(self, resource_type: ResourceType, public_id: &str, data: Vec<u8>) -> Self {
        self.assets
            .lock()
            .unwrap()
            .insert((resource_type.to_string(), public_id.to_string()), data);
        self
    }

    /// Every call fails with this message, as if the service rejected it.
    pub fn with_failure(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn get_upload_count(&self) -> usize {
        *self.upload_count.lock().unwrap()
    }

    pub fn get_destroy_count(&self) -> usize {
        *self.destroy_count.lock().unwrap()
    }

    /// Snapshot keyed by `(resource_type, public_id)`.
    pub fn get_assets(&self) -> HashMap<(String, String), Vec<u8>> {
        self.assets.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(Error::Api(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockCdnClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a source into (file stem, extension, bytes).
async fn read_source(source: &UploadSource) -> Result<(String, Option<String>, Vec<u8>)> {
    let (name, data) = match source {
        UploadSource::Path(path) => {
            let data = tokio::fs::read(path).await?;
            (path.to_string_lossy().to_string(), data)
        }
        UploadSource::Url(url) => (url.clone(), url.as_bytes().to_vec()),
        UploadSource::Bytes { data, file_name } => (file_name.clone(), data.clone()),
    };

    let path = Path::new(&name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "asset".to_string());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    Ok((stem, extension, data))
}

#[async_trait]
impl CdnService for MockCdnClient {
    async fn upload(
        &self,
        source: &UploadSource,
        options: &UploadOptions,
    ) -> Result<UploadedAsset> {
        *self.upload_count.lock().unwrap() += 1;
        self.check_failure()?;

        let (stem, extension, data) = read_source(source).await?;
        let public_id = if options.folder.is_empty() {
            stem
        } else {
            format!("{}/{}", options.folder, stem)
        };

        let resource_type = match options.resource_type {
            ResourceType::Auto => match extension.as_deref() {
                Some("mp4" | "mov" | "webm") => ResourceType::Video,
                Some("png" | "jpg" | "jpeg" | "gif" | "webp") => ResourceType::Image,
                _ => ResourceType::Raw,
            },
            other => other,
        };

        // Raw assets keep their extension in the ID and report no format.
        let (public_id, format) = match (resource_type, extension) {
            (ResourceType::Raw, Some(ext)) => (format!("{}.{}", public_id, ext), None),
            (_, ext) => (public_id, ext),
        };

        let url = match &format {
            Some(ext) => format!(
                "{}/{}/upload/{}.{}",
                self.base_url, resource_type, public_id, ext
            ),
            None => format!("{}/{}/upload/{}", self.base_url, resource_type, public_id),
        };

        self.assets
            .lock()
            .unwrap()
            .insert((resource_type.to_string(), public_id.clone()), data);

        Ok(UploadedAsset {
            url: Some(url),
            public_id: Some(public_id),
            format,
            resource_type: Some(resource_type.to_string()),
        })
    }

    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<serde_json::Value> {
        *self.destroy_count.lock().unwrap() += 1;
        self.check_failure()?;

        let removed = self
            .assets
            .lock()
            .unwrap()
            .remove(&(resource_type.to_string(), public_id.to_string()));

        match removed {
            Some(_) => Ok(json!({ "result": "ok" })),
            None => Ok(json!({ "result": "not found" })),
        }
    }
}
