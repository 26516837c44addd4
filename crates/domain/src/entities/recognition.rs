//! Recognition results returned by the similarity-matching workflow

use crate::entities::PartRecord;
use serde::{Deserialize, Serialize};

/// Scores at or above this value are flagged as high confidence
pub const HIGH_CONFIDENCE_SCORE: f32 = 70.0;

/// One candidate returned by the model, `id` references a catalog record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub id: String,
    pub score: f32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    pub matches: Vec<SimilarityMatch>,
    pub detected_features: String,
}

impl RecognitionResult {
    /// Terminal result that carries no matches, only an explanation
    pub fn empty(detected_features: impl Into<String>) -> Self {
        Self {
            matches: Vec::new(),
            detected_features: detected_features.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// A match joined with the catalog record it refers to
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMatch<'a> {
    pub part: &'a PartRecord,
    pub score: f32,
    pub reason: &'a str,
}

impl ResolvedMatch<'_> {
    pub fn is_high_confidence(&self) -> bool {
        self.score >= HIGH_CONFIDENCE_SCORE
    }
}
