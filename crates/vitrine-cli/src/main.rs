//! Vitrine CLI — derive and manage catalog image variants from the shell.
//!
//! Storage configuration comes from the environment: STORAGE_BACKEND plus
//! LOCAL_STORAGE_PATH/LOCAL_STORAGE_BASE_URL or S3_BUCKET/S3_REGION.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use vitrine_cli::{content_type_for_extension, init_tracing};
use vitrine_core::MediaStoreConfig;
use vitrine_processing::{DeletionCoordinator, ImagePipeline, PipelineError, UploadedAsset};
use vitrine_storage::{create_storage, Storage};

#[derive(Parser)]
#[command(name = "vitrine", about = "Catalog image variant pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive and store all variants for one image
    Process {
        /// Path to the image file
        file: PathBuf,
        /// Target namespace (e.g. products, brands, categories, qualities)
        #[arg(long)]
        namespace: String,
        /// Original path of the image being replaced, if any
        #[arg(long)]
        replace: Option<String>,
    },
    /// Derive and store variants for several images (whole batch or nothing)
    ProcessMany {
        /// Paths to the image files
        files: Vec<PathBuf>,
        #[arg(long)]
        namespace: String,
    },
    /// Delete an image and all of its variants
    Delete {
        /// Stored path of the image's original variant
        original_path: String,
    },
    /// Print the public URL for a stored path
    Url {
        /// Stored path, e.g. products/thumbnail/<name>.webp
        path: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn read_asset(file: &Path) -> anyhow::Result<UploadedAsset> {
    let data = std::fs::read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let content_type = file
        .extension()
        .and_then(|e| e.to_str())
        .map(content_type_for_extension)
        .unwrap_or("application/octet-stream");
    Ok(UploadedAsset::new(data, content_type))
}

/// Purge whatever a failed pipeline run already wrote, then surface the
/// failure.
async fn compensate_and_bail(
    deleter: &DeletionCoordinator,
    err: PipelineError,
) -> anyhow::Result<()> {
    let written = err.written_paths().to_vec();
    if !written.is_empty() {
        if let Err(cleanup_err) = deleter.delete_paths(&written).await {
            tracing::warn!(error = %cleanup_err, "compensating cleanup failed");
        }
    }
    Err(anyhow::Error::new(err).context("Image processing failed"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = MediaStoreConfig::from_env()?;
    config.validate()?;
    let storage = create_storage(&config)
        .await
        .context("Failed to create storage backend")?;

    let pipeline = ImagePipeline::with_default_sizes(storage.clone());
    let deleter = DeletionCoordinator::with_default_sizes(storage.clone());

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            file,
            namespace,
            replace,
        } => {
            let asset = read_asset(&file)?;
            match pipeline
                .process_single(asset, &namespace, replace.as_deref())
                .await
            {
                Ok(processed) => print_json(&processed.manifest)?,
                Err(err) => return compensate_and_bail(&deleter, err).await,
            }
        }
        Commands::ProcessMany { files, namespace } => {
            let assets = files
                .iter()
                .map(|f| read_asset(f))
                .collect::<anyhow::Result<Vec<_>>>()?;
            match pipeline.process_many(assets, &namespace).await {
                Ok(processed) => {
                    let manifests: Vec<_> = processed.iter().map(|p| &p.manifest).collect();
                    print_json(&manifests)?;
                }
                Err(err) => return compensate_and_bail(&deleter, err).await,
            }
        }
        Commands::Delete { original_path } => {
            deleter
                .delete_all(&original_path)
                .await
                .context("Failed to delete image variants")?;
            print_json(&serde_json::json!({
                "success": true,
                "message": format!("Deleted {} and its variants", original_path),
            }))?;
        }
        Commands::Url { path } => {
            print_json(&serde_json::json!({ "url": storage.public_url(&path) }))?;
        }
    }

    Ok(())
}
