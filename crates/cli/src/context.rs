//! Shared services for subcommands

use anyhow::{Context, Result};
use catalog::SupabaseCatalog;
use common::AppConfig;
use domain::PhotoRef;
use llm::GeminiClient;
use recognition::{normalize_to_jpeg, JPEG_MIME};
use std::path::Path;

pub const CREDENTIAL_HINT: &str =
    "Set a valid key in GEMINI_API_KEY (or API_KEY), e.g. in .env, and try again.";

pub struct AppContext {
    pub config: AppConfig,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn catalog(&self) -> Result<SupabaseCatalog> {
        Ok(SupabaseCatalog::from_config(&self.config)?)
    }

    /// Client with the single-attempt policy used for recognition
    pub fn gemini(&self) -> Result<GeminiClient> {
        Ok(GeminiClient::from_config(&self.config)?)
    }
}

/// Read an image file and turn it into an inline JPEG photo reference.
/// The catalog uploads inline photos to storage when the part is saved.
pub async fn load_photo(path: &Path) -> Result<String> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read photo {}", path.display()))?;
    let jpeg = normalize_to_jpeg(&raw)
        .with_context(|| format!("{} is not a readable image", path.display()))?;
    Ok(PhotoRef::inline(JPEG_MIME, &jpeg).to_url_string())
}

pub async fn load_photos<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<String>> {
    let mut photos = Vec::with_capacity(paths.len());
    for path in paths {
        photos.push(load_photo(path.as_ref()).await?);
    }
    Ok(photos)
}
