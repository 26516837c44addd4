//! Domain Entities - Core business objects

pub mod part_record;
mod photo_ref;
mod recognition;

pub use part_record::{PartDraft, PartRecord, MAX_CAPTURE_ANGLES};
pub use photo_ref::PhotoRef;
pub use recognition::{RecognitionResult, ResolvedMatch, SimilarityMatch, HIGH_CONFIDENCE_SCORE};
