//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror. The
//! facade in [`crate::assets`] is the only place these are flattened into
//! plain strings.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cloudinary API error: {0}")]
    Api(String),

    #[error("Invalid resource type '{0}'. Expected one of: image, raw, video, auto")]
    InvalidResourceType(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
