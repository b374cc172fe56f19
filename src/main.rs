use anyhow::Result;
use clap::{Parser, Subcommand};
use cloudinary_assets::models::{DEFAULT_FOLDER, ResourceType, UploadOptions};
use cloudinary_assets::{AssetManager, OperationResult};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "cloudinary-assets")]
#[command(about = "Upload or delete media assets on Cloudinary")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload a local file, remote URL or data URI.
    Upload {
        #[arg(value_name = "SOURCE")]
        source: String,

        #[arg(long, default_value = DEFAULT_FOLDER)]
        folder: String,

        #[arg(long, default_value = "image", value_parser = parse_resource_type)]
        resource_type: ResourceType,
    },
    /// Delete an asset by public ID.
    Delete {
        #[arg(value_name = "PUBLIC_ID")]
        public_id: String,

        #[arg(long, default_value = "image", value_parser = parse_resource_type)]
        resource_type: ResourceType,
    },
}

fn parse_resource_type(input: &str) -> std::result::Result<ResourceType, String> {
    input.parse().map_err(|e: cloudinary_assets::Error| e.to_string())
}

fn emit<T: Serialize>(result: &OperationResult<T>) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(result.is_success())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudinary_assets=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let assets = AssetManager::from_env();

    let succeeded = match args.command {
        Command::Upload {
            source,
            folder,
            resource_type,
        } => {
            info!("Uploading {} into '{}' as {}", source, folder, resource_type);
            let options = UploadOptions::default()
                .with_folder(folder)
                .with_resource_type(resource_type);
            emit(&assets.upload(source, &options).await)?
        }
        Command::Delete {
            public_id,
            resource_type,
        } => {
            info!("Deleting {} ({})", public_id, resource_type);
            emit(&assets.delete(&public_id, resource_type).await)?
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
