//! One menu-visualization cycle, run strictly sequentially.
//!
//! Upload, extraction, and per-dish generation happen one call at a time in
//! list order; only one request is ever in flight. Components are built
//! once from configuration and injected here; the pipeline owns no state
//! beyond them, so every cycle is independent.

use menulens_config::Config;
use menulens_core::{DishRecord, ExtractionResult, GeneratedImageRef};
use menulens_extraction::VisionClient;
use menulens_imagegen::ImageGenClient;
use menulens_storage::{ObjectStore, store_from_config};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

/// Prefix grouping archived menu uploads inside the bucket.
const UPLOAD_PREFIX: &str = "menu_uploads/";

/// One dish with its (possibly absent) rendered image.
#[derive(Debug, Clone, Serialize)]
pub struct DishVisualization {
    #[serde(flatten)]
    pub dish: DishRecord,
    /// Locator of the generated image; `None` when generation failed.
    pub image: Option<GeneratedImageRef>,
}

/// Full report for one uploaded menu image.
#[derive(Debug, Serialize)]
pub struct MenuVisualization {
    /// Public URL of the archived upload, when storage is configured and
    /// the upload succeeded. Archival only; later stages never read it.
    pub menu_image_url: Option<String>,
    /// Raw model response, kept so callers can fall back to showing
    /// unstructured text when no records were usable.
    pub raw_text: Option<String>,
    pub dishes: Vec<DishVisualization>,
    /// Structurally valid records dropped for an empty or placeholder name.
    pub skipped: usize,
}

pub struct Pipeline {
    vision: VisionClient,
    imagegen: ImageGenClient,
    store: Option<Box<dyn ObjectStore>>,
}

impl Pipeline {
    pub fn from_config(config: &Config) -> Self {
        Self {
            vision: VisionClient::new(&config.vision),
            imagegen: ImageGenClient::new(&config.imagegen),
            store: store_from_config(&config.storage),
        }
    }

    /// Extraction only: no upload, no image generation.
    pub async fn extract(&self, image_bytes: &[u8]) -> ExtractionResult {
        self.vision.extract(image_bytes).await
    }

    /// Run one full upload, extract, generate cycle.
    pub async fn run(&self, image_bytes: &[u8], original_filename: &str) -> MenuVisualization {
        let menu_image_url = self.archive_upload(image_bytes, original_filename).await;

        let ExtractionResult {
            raw_text,
            items,
            failure,
        } = self.vision.extract(image_bytes).await;
        if let Some(failure) = failure {
            warn!(%failure, "menu extraction produced no records");
        }

        let (renderable, skipped) = split_renderable(items);
        let mut dishes = Vec::with_capacity(renderable.len());
        for dish in renderable {
            let image = match self.imagegen.generate(&dish.name, &dish.description).await {
                Ok(image) => Some(image),
                Err(failure) => {
                    warn!(dish = %dish.name, %failure, "could not generate dish image");
                    None
                }
            };
            dishes.push(DishVisualization { dish, image });
        }

        MenuVisualization {
            menu_image_url,
            raw_text,
            dishes,
            skipped,
        }
    }

    /// Keys of previously archived menu uploads, newest last as the store
    /// returns them. Empty when storage is not configured.
    pub async fn archived_uploads(&self) -> Vec<String> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        match store.list(UPLOAD_PREFIX).await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "could not list archived uploads");
                Vec::new()
            }
        }
    }

    async fn archive_upload(&self, image_bytes: &[u8], original_filename: &str) -> Option<String> {
        let store = self.store.as_ref()?;
        let key = upload_key(original_filename);
        match store.upload(image_bytes.to_vec(), &key, "image/jpeg").await {
            Ok(url) => Some(url),
            Err(err) => {
                // The archive is not an input to later stages; keep going.
                warn!(error = %err, "menu image upload failed");
                None
            }
        }
    }
}

/// Unique storage key for one upload session.
fn upload_key(original_filename: &str) -> String {
    format!("{UPLOAD_PREFIX}{}_{original_filename}", Uuid::new_v4())
}

/// Consumption-time validation: drop records whose name is empty or the
/// literal placeholder, preserving survivor order.
fn split_renderable(items: Vec<DishRecord>) -> (Vec<DishRecord>, usize) {
    let mut keep = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for (index, dish) in items.into_iter().enumerate() {
        if dish.is_renderable() {
            keep.push(dish);
        } else {
            warn!(index, name = %dish.name, "skipping dish with invalid name");
            skipped += 1;
        }
    }
    (keep, skipped)
}
