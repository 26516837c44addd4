//! Similarity-matching workflow: pick references, build one multimodal
//! request, validate the structured answer

use crate::error::RecognitionError;
use crate::photo::{normalize_to_jpeg, HttpImageSource, ImageSource, JPEG_MIME};
use crate::prompt::{
    reference_label, response_schema, system_instruction, REFERENCES_HEADER, TARGET_HEADER,
};
use common::{AppConfig, OperationTimer};
use domain::{PartRecord, RecognitionResult};
use futures::future::join_all;
use llm::{GenerateContentRequest, GenerationConfig, GenerativeModel, Part};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_MAX_REFERENCES: usize = 8;
pub const MAX_REFERENCES_LIMIT: usize = 20;
pub const NO_REFERENCES_MESSAGE: &str = "No reference images available in the catalog.";

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionReport {
    pub result: RecognitionResult,
    /// Reference images actually included in the request
    pub references_sent: usize,
}

#[derive(Debug, Clone)]
pub struct RecognizerSettings {
    pub model: String,
    pub max_references: usize,
    pub language: String,
}

impl RecognizerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.gemini.recognition_model.clone(),
            max_references: config.recognition.max_references,
            language: config.recognition.language.clone(),
        }
    }
}

pub struct Recognizer {
    model: Arc<dyn GenerativeModel>,
    images: Arc<dyn ImageSource>,
    settings: RecognizerSettings,
}

impl Recognizer {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        images: Arc<dyn ImageSource>,
        mut settings: RecognizerSettings,
    ) -> Self {
        settings.max_references = settings.max_references.clamp(1, MAX_REFERENCES_LIMIT);
        Self {
            model,
            images,
            settings,
        }
    }

    /// Recognizer that fetches reference photos over HTTP
    pub fn with_http_images(
        model: Arc<dyn GenerativeModel>,
        config: &AppConfig,
    ) -> Result<Self, RecognitionError> {
        let images = HttpImageSource::new(Duration::from_secs(config.gemini.timeout_secs.max(1)))?;
        Ok(Self::new(
            model,
            Arc::new(images),
            RecognizerSettings::from_config(config),
        ))
    }

    pub fn max_references(&self) -> usize {
        self.settings.max_references
    }

    /// Compare `target` against the photographed records of `catalog`.
    ///
    /// A catalog without photos yields an empty result and makes no remote
    /// call. The model call is made once, without retries.
    pub async fn analyze(
        &self,
        target: &[u8],
        catalog: &[PartRecord],
    ) -> Result<RecognitionReport, RecognitionError> {
        let candidates: Vec<&PartRecord> = catalog
            .iter()
            .filter(|p| p.has_photos())
            .take(self.settings.max_references)
            .collect();

        if candidates.is_empty() {
            info!("No photographed parts in catalog, skipping analysis");
            return Ok(RecognitionReport {
                result: RecognitionResult::empty(NO_REFERENCES_MESSAGE),
                references_sent: 0,
            });
        }

        let target = normalize_to_jpeg(target).map_err(|e| {
            RecognitionError::Analysis(format!("captured image could not be decoded: {e}"))
        })?;

        let mut timer = OperationTimer::new("recognize");
        timer.add_field("candidates", candidates.len());

        let loaded = join_all(candidates.iter().map(|part| async move {
            let photo = part.first_photo()?;
            self.images.load(photo).await.map(|jpeg| (*part, jpeg))
        }))
        .await;
        let references: Vec<(&PartRecord, Vec<u8>)> = loaded.into_iter().flatten().collect();

        debug!(
            candidates = candidates.len(),
            loaded = references.len(),
            "Reference photos loaded"
        );
        timer.add_field("references", references.len());

        let request = self.build_request(&target, &references);
        let outcome = self.call_model(&request).await;
        timer.finish_with_result(&outcome);

        Ok(RecognitionReport {
            result: outcome?,
            references_sent: references.len(),
        })
    }

    fn build_request(
        &self,
        target: &[u8],
        references: &[(&PartRecord, Vec<u8>)],
    ) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(3 + references.len() * 2);
        parts.push(Part::text(TARGET_HEADER));
        parts.push(Part::inline_bytes(JPEG_MIME, target));
        parts.push(Part::text(REFERENCES_HEADER));
        for (part, jpeg) in references {
            parts.push(Part::text(reference_label(part)));
            parts.push(Part::inline_bytes(JPEG_MIME, jpeg));
        }

        GenerateContentRequest::from_parts(parts)
            .with_system_instruction(system_instruction(&self.settings.language))
            .with_generation_config(GenerationConfig::json_schema(response_schema()))
    }

    async fn call_model(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<RecognitionResult, RecognitionError> {
        let text = self
            .model
            .generate_text(&self.settings.model, request)
            .await?;
        parse_result(&text)
    }
}

/// Strict parse: a body missing `matches` or `detectedFeatures` is an error,
/// never an empty success
pub fn parse_result(text: &str) -> Result<RecognitionResult, RecognitionError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).map_err(|e| {
        RecognitionError::Analysis(format!("model response did not match the schema: {e}"))
    })
}
