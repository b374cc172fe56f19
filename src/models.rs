//! Data models and structures
//!
//! Defines the result record handed back to callers, the upload inputs, and
//! the wire shapes returned by the Cloudinary upload API.

use crate::{Error, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_FOLDER: &str = "healthcare";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    #[default]
    Image,
    Raw,
    Video,
    Auto,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Raw => "raw",
            ResourceType::Video => "video",
            ResourceType::Auto => "auto",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(ResourceType::Image),
            "raw" => Ok(ResourceType::Raw),
            "video" => Ok(ResourceType::Video),
            "auto" => Ok(ResourceType::Auto),
            _ => Err(Error::InvalidResourceType(s.to_string())),
        }
    }
}

/// Content to upload.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadSource {
    /// Local file, read fully into memory.
    Path(PathBuf),
    /// Remote or `data:` URL the service fetches itself.
    Url(String),
    Bytes { data: Vec<u8>, file_name: String },
}

const REMOTE_PREFIXES: &[&str] = &["http://", "https://", "ftp://", "s3://", "gs://", "data:"];

impl UploadSource {
    pub fn bytes(data: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        UploadSource::Bytes {
            data: data.into(),
            file_name: file_name.into(),
        }
    }

    /// Short label used in log lines; never includes buffer contents.
    pub fn describe(&self) -> String {
        match self {
            UploadSource::Path(path) => path.display().to_string(),
            UploadSource::Url(url) if url.starts_with("data:") => "data URI".to_string(),
            UploadSource::Url(url) => url.clone(),
            UploadSource::Bytes { data, file_name } => {
                format!("{} ({} bytes in memory)", file_name, data.len())
            }
        }
    }
}

impl From<&str> for UploadSource {
    fn from(value: &str) -> Self {
        let lowered = value.to_ascii_lowercase();
        if REMOTE_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
            UploadSource::Url(value.to_string())
        } else {
            UploadSource::Path(PathBuf::from(value))
        }
    }
}

impl From<String> for UploadSource {
    fn from(value: String) -> Self {
        UploadSource::from(value.as_str())
    }
}

impl From<PathBuf> for UploadSource {
    fn from(value: PathBuf) -> Self {
        UploadSource::Path(value)
    }
}

impl From<&Path> for UploadSource {
    fn from(value: &Path) -> Self {
        UploadSource::Path(value.to_path_buf())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: String,
    pub resource_type: ResourceType,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            folder: DEFAULT_FOLDER.to_string(),
            resource_type: ResourceType::Image,
        }
    }
}

impl UploadOptions {
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn with_resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = resource_type;
        self
    }
}

/// Success payload of an upload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UploadedAsset {
    pub url: Option<String>,
    pub public_id: Option<String>,
    pub format: Option<String>,
    pub resource_type: Option<String>,
}

impl UploadedAsset {
    pub fn from_response(response: UploadResponse, secure: bool) -> Self {
        let url = if secure {
            response.secure_url
        } else {
            response.url
        };

        Self {
            url,
            public_id: response.public_id,
            format: response.format,
            resource_type: response.resource_type,
        }
    }
}

/// Success payload of a delete: the service response, uninterpreted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeletedAsset {
    pub result: serde_json::Value,
}

impl DeletedAsset {
    /// The `result` status string, e.g. `"ok"` or `"not found"`.
    pub fn status(&self) -> Option<&str> {
        self.result.get("result").and_then(|v| v.as_str())
    }
}

/// Outcome of a facade call. Serializes as `{"success": true, ..payload}`
/// or `{"success": false, "error": ".."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult<T> {
    Success(T),
    Failure { error: String },
}

impl<T> OperationResult<T> {
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        if error.trim().is_empty() {
            OperationResult::Failure {
                error: "Unknown error".to_string(),
            }
        } else {
            OperationResult::Failure { error }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            OperationResult::Success(value) => Some(value),
            OperationResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OperationResult::Success(_) => None,
            OperationResult::Failure { error } => Some(error),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => OperationResult::Success(value),
            Err(e) => OperationResult::failure(e.to_string()),
        }
    }
}

impl<T: Serialize> Serialize for OperationResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Tagged<'a, T> {
            success: bool,
            #[serde(flatten)]
            payload: &'a T,
        }

        match self {
            OperationResult::Success(payload) => Tagged {
                success: true,
                payload,
            }
            .serialize(serializer),
            OperationResult::Failure { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

// Cloudinary API response models
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub public_id: Option<String>,
    pub version: Option<u64>,
    pub format: Option<String>,
    pub resource_type: Option<String>,
    pub url: Option<String>,
    pub secure_url: Option<String>,
    pub bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_type_parsing() {
        assert_eq!("image".parse::<ResourceType>().unwrap(), ResourceType::Image);
        assert_eq!("RAW".parse::<ResourceType>().unwrap(), ResourceType::Raw);
        assert_eq!(" video ".parse::<ResourceType>().unwrap(), ResourceType::Video);
        assert_eq!("auto".parse::<ResourceType>().unwrap(), ResourceType::Auto);

        let err = "audio".parse::<ResourceType>().unwrap_err();
        assert!(matches!(err, Error::InvalidResourceType(_)));
    }

    #[test]
    fn test_resource_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ResourceType::Video).unwrap(),
            "\"video\""
        );
        assert_eq!(ResourceType::default(), ResourceType::Image);
    }

    #[test]
    fn test_upload_source_from_str() {
        assert_eq!(
            UploadSource::from("/tmp/xray.png"),
            UploadSource::Path(PathBuf::from("/tmp/xray.png"))
        );
        assert_eq!(
            UploadSource::from("https://example.com/scan.jpg"),
            UploadSource::Url("https://example.com/scan.jpg".to_string())
        );
        assert!(matches!(
            UploadSource::from("data:image/png;base64,iVBORw0KGgo="),
            UploadSource::Url(_)
        ));
    }

    #[test]
    fn test_describe_hides_data_uri() {
        let source = UploadSource::from("data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(source.describe(), "data URI");

        let source = UploadSource::bytes(vec![1, 2, 3], "ecg.pdf");
        assert_eq!(source.describe(), "ecg.pdf (3 bytes in memory)");
    }

    #[test]
    fn test_upload_options_defaults() {
        let options = UploadOptions::default();
        assert_eq!(options.folder, "healthcare");
        assert_eq!(options.resource_type, ResourceType::Image);

        let options = options
            .with_folder("scans")
            .with_resource_type(ResourceType::Raw);
        assert_eq!(options.folder, "scans");
        assert_eq!(options.resource_type, ResourceType::Raw);
    }

    #[test]
    fn test_uploaded_asset_prefers_secure_url() {
        let response: UploadResponse = serde_json::from_value(json!({
            "public_id": "scans/xray",
            "format": "png",
            "resource_type": "image",
            "url": "http://res.cloudinary.com/demo/image/upload/v1/scans/xray.png",
            "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/scans/xray.png"
        }))
        .unwrap();

        let secure = UploadedAsset::from_response(response.clone(), true);
        assert_eq!(
            secure.url.as_deref(),
            Some("https://res.cloudinary.com/demo/image/upload/v1/scans/xray.png")
        );

        let plain = UploadedAsset::from_response(response, false);
        assert!(plain.url.unwrap().starts_with("http://"));
    }

    #[test]
    fn test_success_serialization_flattens_payload() {
        let result = OperationResult::Success(UploadedAsset {
            url: Some("https://res.cloudinary.com/demo/raw/upload/v1/docs/report".to_string()),
            public_id: Some("docs/report".to_string()),
            format: None,
            resource_type: Some("raw".to_string()),
        });

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": true,
                "url": "https://res.cloudinary.com/demo/raw/upload/v1/docs/report",
                "public_id": "docs/report",
                "format": null,
                "resource_type": "raw"
            })
        );
    }

    #[test]
    fn test_failure_serialization() {
        let result: OperationResult<DeletedAsset> = OperationResult::failure("boom");

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "success": false, "error": "boom" })
        );
    }

    #[test]
    fn test_failure_never_has_empty_message() {
        let result: OperationResult<DeletedAsset> = OperationResult::failure("  ");
        assert_eq!(result.error(), Some("Unknown error"));
    }

    #[test]
    fn test_from_result_collapses_errors() {
        let result: OperationResult<u32> = Err(Error::Api("Invalid Signature".into())).into();
        assert!(!result.is_success());
        assert_eq!(result.error(), Some("Cloudinary API error: Invalid Signature"));

        let result: OperationResult<u32> = Ok(7).into();
        assert_eq!(result.success(), Some(&7));
    }

    #[test]
    fn test_deleted_asset_status() {
        let deleted = DeletedAsset {
            result: json!({ "result": "not found" }),
        };
        assert_eq!(deleted.status(), Some("not found"));
    }
}
