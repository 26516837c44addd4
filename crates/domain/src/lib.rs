//! Domain Layer - AIdentify parts catalog
//!
//! Contains ONLY business rules for the catalog, without dependencies on:
//! - Infrastructure (hosted database, object storage, HTTP)
//! - Frameworks (CLI, logging setup)
//! - External systems (generative AI services)
//!
//! Layout:
//! - Entities: `PartRecord`, `PartDraft`, `PhotoRef`, recognition results
//! - Value Objects: `PartColor`, `PartModel`
//! - Repository Abstractions: `PartRepository`
//! - Services: catalog search, match resolution, spreadsheet row mapping

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::{
    PartDraft, PartRecord, PhotoRef, RecognitionResult, ResolvedMatch, SimilarityMatch,
    HIGH_CONFIDENCE_SCORE, MAX_CAPTURE_ANGLES,
};
pub use errors::{DomainError, DomainResult, ErrorCategory};
pub use repositories::PartRepository;
pub use services::{resolve_matches, search_parts, ImportRow};
pub use value_objects::{PartColor, PartModel};

/// Milliseconds since the unix epoch, as stored in `PartRecord::timestamp`
pub type TimestampMs = i64;

/// Current wall-clock time in unix milliseconds
pub fn now_ms() -> TimestampMs {
    chrono::Utc::now().timestamp_millis()
}
