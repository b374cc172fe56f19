//! Media asset helper for a Cloudinary account
//!
//! Reads account credentials from the environment once at startup and
//! exposes two calls, upload and delete, that always hand back a uniform
//! success/failure record instead of propagating errors.

pub mod assets;
pub mod cdn;
pub mod config;
pub mod error;
pub mod models;
pub mod signing;

pub use assets::AssetManager;
pub use config::Config;
pub use error::{Error, Result};
pub use models::{OperationResult, ResourceType, UploadOptions, UploadSource};
