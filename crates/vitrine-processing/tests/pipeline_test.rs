//! End-to-end pipeline tests against local storage.

use std::io::Cursor;
use std::sync::Arc;

use image::{GenericImageView, ImageFormat, ImageReader, Rgb, RgbImage};
use tempfile::TempDir;
use vitrine_core::sizes::{SizeSpec, SizeTable};
use vitrine_core::VariantManifest;
use vitrine_processing::{
    DeletionCoordinator, ImagePipeline, PipelineErrorKind, UploadedAsset,
};
use vitrine_storage::{LocalStorage, Storage};

async fn test_storage() -> (TempDir, Arc<dyn Storage>) {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::new(dir.path(), "http://localhost:3000/media".to_string())
        .await
        .unwrap();
    (dir, Arc::new(storage))
}

fn jpeg_asset(width: u32, height: u32) -> UploadedAsset {
    let img = RgbImage::from_pixel(width, height, Rgb([90, 120, 200]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .unwrap();
    UploadedAsset::new(buffer, "image/jpeg")
}

fn png_asset(width: u32, height: u32) -> UploadedAsset {
    let img = RgbImage::from_pixel(width, height, Rgb([20, 200, 90]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    UploadedAsset::new(buffer, "image/png")
}

async fn stored_dimensions(storage: &Arc<dyn Storage>, path: &str) -> (u32, u32) {
    let bytes = storage.read(path).await.unwrap();
    let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .unwrap();
    assert_eq!(reader.format(), Some(ImageFormat::WebP));
    let img = reader.decode().unwrap();
    (img.width(), img.height())
}

#[tokio::test]
async fn process_single_produces_complete_manifest() {
    let (_dir, storage) = test_storage().await;
    let pipeline = ImagePipeline::with_default_sizes(storage.clone());

    let processed = pipeline
        .process_single(jpeg_asset(800, 600), "products", None)
        .await
        .unwrap();

    let manifest = &processed.manifest;
    // Four configured sizes plus original.
    assert_eq!(manifest.len(), 5);
    for label in ["thumbnail", "small", "medium", "large", "original"] {
        let path = manifest.path(label).unwrap();
        assert!(path.starts_with("products/"));
        assert!(path.ends_with(".webp"));
        assert!(storage.exists(path).await.unwrap());
        // Every stored variant must decode as the fixed output codec.
        stored_dimensions(&storage, path).await;
    }
}

#[tokio::test]
async fn wide_jpeg_scenario_preserves_aspect_ratio() {
    let (_dir, storage) = test_storage().await;
    let pipeline = ImagePipeline::with_default_sizes(storage.clone());

    let processed = pipeline
        .process_single(jpeg_asset(2000, 1000), "products", None)
        .await
        .unwrap();
    let manifest = &processed.manifest;

    assert_eq!(
        stored_dimensions(&storage, manifest.path("thumbnail").unwrap()).await,
        (150, 75)
    );
    assert_eq!(
        stored_dimensions(&storage, manifest.path("large").unwrap()).await,
        (1200, 600)
    );
    // Original is re-encoded at full resolution.
    assert_eq!(
        stored_dimensions(&storage, manifest.original()).await,
        (2000, 1000)
    );
}

#[tokio::test]
async fn small_input_is_never_upscaled() {
    let (_dir, storage) = test_storage().await;
    let pipeline = ImagePipeline::with_default_sizes(storage.clone());

    let processed = pipeline
        .process_single(png_asset(100, 80), "brands", None)
        .await
        .unwrap();

    for label in ["thumbnail", "small", "medium", "large", "original"] {
        let path = processed.manifest.path(label).unwrap();
        let dims = stored_dimensions(&storage, path).await;
        // 100x80 fits inside every box, so nothing is resized.
        assert_eq!(dims, (100, 80), "{} was rescaled", label);
    }
}

#[tokio::test]
async fn stored_paths_have_size_label_as_second_to_last_segment() {
    let (_dir, storage) = test_storage().await;
    let sizes = SizeTable::default();
    let pipeline = ImagePipeline::new(storage.clone(), sizes.clone());

    let processed = pipeline
        .process_single(png_asset(300, 300), "qualities", None)
        .await
        .unwrap();

    for (_, path) in processed.manifest.iter() {
        let segments: Vec<&str> = path.split('/').collect();
        let size_segment = segments[segments.len() - 2];
        assert!(sizes.contains_label(size_segment), "{}", path);
    }
}

#[tokio::test]
async fn replace_deletes_old_variants_after_new_ones_exist() {
    let (_dir, storage) = test_storage().await;
    let pipeline = ImagePipeline::with_default_sizes(storage.clone());

    let first = pipeline
        .process_single(jpeg_asset(640, 480), "categories", None)
        .await
        .unwrap();
    let old_paths = first.cleanup_paths();

    let second = pipeline
        .process_single(
            jpeg_asset(800, 800),
            "categories",
            Some(first.manifest.original()),
        )
        .await
        .unwrap();

    for path in &old_paths {
        assert!(
            !storage.exists(path).await.unwrap(),
            "old variant {} survived the replace",
            path
        );
    }
    for (_, path) in second.manifest.iter() {
        assert!(storage.exists(path).await.unwrap());
    }
}

#[tokio::test]
async fn deletion_is_idempotent_and_complete() {
    let (_dir, storage) = test_storage().await;
    let pipeline = ImagePipeline::with_default_sizes(storage.clone());
    let deleter = DeletionCoordinator::with_default_sizes(storage.clone());

    let processed = pipeline
        .process_single(png_asset(500, 500), "products", None)
        .await
        .unwrap();
    let original = processed.manifest.original().to_string();

    deleter.delete_all(&original).await.unwrap();
    for (_, path) in processed.manifest.iter() {
        assert!(!storage.exists(path).await.unwrap());
        assert!(storage.read(path).await.is_err());
    }

    // A second pass over the same manifest must not raise.
    deleter.delete_all(&original).await.unwrap();
}

#[tokio::test]
async fn process_many_returns_manifests_in_input_order() {
    let (_dir, storage) = test_storage().await;
    let pipeline = ImagePipeline::with_default_sizes(storage.clone());

    let assets = vec![png_asset(300, 300), png_asset(400, 200), png_asset(120, 90)];
    let processed = pipeline.process_many(assets, "products").await.unwrap();

    assert_eq!(processed.len(), 3);
    // Originals keep source dimensions, which identifies each input.
    let expected = [(300, 300), (400, 200), (120, 90)];
    for (result, dims) in processed.iter().zip(expected) {
        assert_eq!(
            stored_dimensions(&storage, result.manifest.original()).await,
            dims
        );
    }
}

#[tokio::test]
async fn process_many_aborts_whole_batch_on_decode_failure() {
    let (_dir, storage) = test_storage().await;
    let pipeline = ImagePipeline::with_default_sizes(storage.clone());
    let deleter = DeletionCoordinator::with_default_sizes(storage.clone());

    let assets = vec![
        png_asset(300, 300),
        png_asset(200, 200),
        UploadedAsset::new(b"corrupt bytes".to_vec(), "image/png"),
        png_asset(100, 100),
    ];

    let err = pipeline
        .process_many(assets, "products")
        .await
        .expect_err("batch with a corrupt asset must fail");

    assert!(matches!(err.kind(), PipelineErrorKind::Render(_)));

    // Two completed assets, five variants each; the corrupt asset fails
    // before anything of its own is written.
    assert_eq!(err.written_paths().len(), 10);
    for path in err.written_paths() {
        assert!(storage.exists(path).await.unwrap());
    }

    // Compensation removes every orphaned blob.
    let written = err.into_written_paths();
    deleter.delete_paths(&written).await.unwrap();
    for path in &written {
        assert!(!storage.exists(path).await.unwrap());
    }
}

#[tokio::test]
async fn decode_failure_on_single_asset_writes_nothing() {
    let (_dir, storage) = test_storage().await;
    let pipeline = ImagePipeline::with_default_sizes(storage.clone());

    let err = pipeline
        .process_single(
            UploadedAsset::new(b"not an image".to_vec(), "image/jpeg"),
            "brands",
            None,
        )
        .await
        .expect_err("corrupt upload must fail");

    assert!(matches!(err.kind(), PipelineErrorKind::Render(_)));
    assert!(err.written_paths().is_empty());
}

#[tokio::test]
async fn manifest_round_trips_through_json() {
    let (_dir, storage) = test_storage().await;
    let pipeline = ImagePipeline::with_default_sizes(storage);

    let processed = pipeline
        .process_single(jpeg_asset(256, 256), "products", None)
        .await
        .unwrap();

    let json = serde_json::to_string(&processed.manifest).unwrap();
    let restored: VariantManifest = serde_json::from_str(&json).unwrap();
    assert_eq!(processed.manifest, restored);
    assert_eq!(restored.original(), processed.manifest.original());
}

#[tokio::test]
async fn injected_size_table_drives_the_variant_set() {
    let (_dir, storage) = test_storage().await;
    let sizes = SizeTable::new(vec![SizeSpec::new("preview", 64, 64)]);
    let pipeline = ImagePipeline::new(storage.clone(), sizes);

    let processed = pipeline
        .process_single(png_asset(512, 512), "products", None)
        .await
        .unwrap();

    assert_eq!(processed.manifest.len(), 2);
    assert_eq!(
        stored_dimensions(&storage, processed.manifest.path("preview").unwrap()).await,
        (64, 64)
    );
    assert_eq!(
        stored_dimensions(&storage, processed.manifest.original()).await,
        (512, 512)
    );
}
