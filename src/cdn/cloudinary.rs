use super::CdnService;
use crate::config::Config;
use crate::models::{
    ApiErrorResponse, ResourceType, UploadOptions, UploadResponse, UploadSource, UploadedAsset,
};
use crate::signing::sign_params;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

/// Signed REST client for the Cloudinary upload API.
pub struct CloudinaryClient {
    client: Client,
    config: Config,
}

impl CloudinaryClient {
    pub fn new(config: Config) -> Self {
        Self::new_with_client(config, Client::new())
    }

    pub fn new_with_client(config: Config, client: Client) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn endpoint(&self, resource_type: ResourceType, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.upload_prefix, self.config.cloud_name, resource_type, action
        )
    }

    /// Adds `timestamp`, `signature` and `api_key` to the request params.
    fn sign(
        &self,
        mut params: BTreeMap<&'static str, String>,
        timestamp: i64,
    ) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", timestamp.to_string());
        let signature = sign_params(
            &params,
            &self.config.api_secret,
            self.config.signature_algorithm,
        );
        params.insert("signature", signature);
        params.insert("api_key", self.config.api_key.clone());
        params
    }

    fn signed_form(&self, params: BTreeMap<&'static str, String>) -> Form {
        let timestamp = chrono::Utc::now().timestamp();
        self.sign(params, timestamp)
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value))
    }

    async fn post<Resp: DeserializeOwned>(&self, url: &str, form: Form) -> Result<Resp> {
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Cloudinary: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Cloudinary API error (status {}): {}", status, error_text);
            return Err(Error::Api(format!(
                "{} (status {})",
                api_error_message(&error_text, status),
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Cloudinary response: {}\nBody: {}", e, body);
            Error::Api(format!("Failed to parse Cloudinary response: {}", e))
        })
    }
}

/// Pulls `error.message` out of an error body, falling back to the raw text.
fn api_error_message(body: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    }
}

fn upload_params(options: &UploadOptions) -> BTreeMap<&'static str, String> {
    let mut params = BTreeMap::new();
    params.insert("folder", options.folder.clone());
    params.insert("overwrite", "true".to_string());
    params.insert("invalidate", "true".to_string());
    params
}

fn file_part(data: Vec<u8>, file_name: &str) -> Result<Part> {
    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
    Ok(Part::bytes(data)
        .file_name(file_name.to_string())
        .mime_str(mime.as_ref())?)
}

async fn attach_file(form: Form, source: &UploadSource) -> Result<Form> {
    match source {
        UploadSource::Url(url) => Ok(form.text("file", url.clone())),
        UploadSource::Bytes { data, file_name } => {
            Ok(form.part("file", file_part(data.clone(), file_name)?))
        }
        UploadSource::Path(path) => {
            let data = tokio::fs::read(path).await.map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("{}: {}", path.display(), e),
                ))
            })?;
            Ok(form.part("file", file_part(data, &file_name_of(path))?))
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string())
}

#[async_trait]
impl CdnService for CloudinaryClient {
    async fn upload(
        &self,
        source: &UploadSource,
        options: &UploadOptions,
    ) -> Result<UploadedAsset> {
        let url = self.endpoint(options.resource_type, "upload");
        tracing::debug!("Uploading {} to {}", source.describe(), url);

        let form = self.signed_form(upload_params(options));
        let form = attach_file(form, source).await?;

        let response: UploadResponse = self.post(&url, form).await?;
        Ok(UploadedAsset::from_response(response, self.config.secure))
    }

    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<serde_json::Value> {
        let url = self.endpoint(resource_type, "destroy");
        tracing::debug!("Destroying {} via {}", public_id, url);

        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());

        self.post(&url, self.signed_form(params)).await
    }
}
