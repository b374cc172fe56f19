//! Environment-derived client configuration
//!
//! Built once at startup and handed to [`crate::assets::AssetManager`].
//! Credentials are not validated here; bad or missing values only show up
//! as authentication failures on the first remote call.

use crate::signing::SignatureAlgorithm;
use reqwest::Url;
use std::fmt;
use tracing::warn;

pub const DEFAULT_UPLOAD_PREFIX: &str = "https://api.cloudinary.com";

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub secure: bool,
    pub upload_prefix: String,
    pub signature_algorithm: SignatureAlgorithm,
}

#[derive(Debug, PartialEq, Eq)]
struct UrlCredentials {
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl Config {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            cloud_name,
            api_key,
            api_secret,
            secure: true,
            upload_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
            signature_algorithm: SignatureAlgorithm::default(),
        }
    }

    pub fn with_upload_prefix(mut self, upload_prefix: String) -> Self {
        self.upload_prefix = upload_prefix;
        self
    }

    /// Reads the process environment (after loading `.env`, if any).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY` and
    /// `CLOUDINARY_API_SECRET` take precedence; `CLOUDINARY_URL` fills in
    /// whichever of them is unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let from_url = get("CLOUDINARY_URL").and_then(|raw| match parse_cloudinary_url(&raw) {
            Some(creds) => Some(creds),
            None => {
                warn!("Ignoring malformed CLOUDINARY_URL");
                None
            }
        });

        let cloud_name = get("CLOUDINARY_CLOUD_NAME")
            .or_else(|| from_url.as_ref().map(|c| c.cloud_name.clone()));
        let api_key =
            get("CLOUDINARY_API_KEY").or_else(|| from_url.as_ref().map(|c| c.api_key.clone()));
        let api_secret = get("CLOUDINARY_API_SECRET")
            .or_else(|| from_url.as_ref().map(|c| c.api_secret.clone()));

        let upload_prefix = get("CLOUDINARY_UPLOAD_PREFIX")
            .map(|prefix| prefix.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_UPLOAD_PREFIX.to_string());

        let signature_algorithm = match get("CLOUDINARY_SIGNATURE_ALGORITHM") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{}; falling back to sha1", e);
                SignatureAlgorithm::default()
            }),
            None => SignatureAlgorithm::default(),
        };

        Self {
            cloud_name: required(cloud_name, "CLOUDINARY_CLOUD_NAME"),
            api_key: required(api_key, "CLOUDINARY_API_KEY"),
            api_secret: required(api_secret, "CLOUDINARY_API_SECRET"),
            secure: true,
            upload_prefix,
            signature_algorithm,
        }
    }
}

fn required(value: Option<String>, name: &str) -> String {
    value.unwrap_or_else(|| {
        warn!("{} not set; remote calls will fail to authenticate", name);
        String::new()
    })
}

/// Parses `cloudinary://<api_key>:<api_secret>@<cloud_name>`.
fn parse_cloudinary_url(raw: &str) -> Option<UrlCredentials> {
    let url = Url::parse(raw).ok()?;
    if url.scheme() != "cloudinary" {
        return None;
    }

    let cloud_name = url.host_str()?.to_string();
    let api_key = url.username().to_string();
    let api_secret = url.password()?.to_string();
    if api_key.is_empty() {
        return None;
    }

    Some(UrlCredentials {
        cloud_name,
        api_key,
        api_secret,
    })
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("secure", &self.secure)
            .field("upload_prefix", &self.upload_prefix)
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}
