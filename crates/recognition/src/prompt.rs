//! Instruction text and response schema for the similarity request

use domain::PartRecord;
use serde_json::{json, Value};

pub const TARGET_HEADER: &str = "TARGET:";
pub const REFERENCES_HEADER: &str = "REFERENCES:";

pub fn system_instruction(language: &str) -> String {
    format!(
        "You are an industrial vision specialist for an automotive parts catalog. \
         Compare the TARGET image with each REFERENCE image. \
         Look for similarity in overall shape and geometry, holes, reliefs, surface \
         features and proportions. Ignore differences in lighting, background, \
         camera angle and image quality. \
         Give each reference a score from 0 to 100 for how likely it is the same part, \
         using the ID exactly as written in its [ID: ...] label. \
         Explain each score in `reason` and describe the technical features you \
         detected in the target in `detectedFeatures`. \
         Write all text in {language}."
    )
}

/// Label placed in front of a reference image
pub fn reference_label(part: &PartRecord) -> String {
    format!("[ID: {}] {} ({})", part.id, part.part_name, part.part_number)
}

/// Structured-output schema; every field is required
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "matches": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": {"type": "STRING"},
                        "score": {"type": "NUMBER"},
                        "reason": {"type": "STRING"}
                    },
                    "required": ["id", "score", "reason"]
                }
            },
            "detectedFeatures": {"type": "STRING"}
        },
        "required": ["matches", "detectedFeatures"]
    })
}
