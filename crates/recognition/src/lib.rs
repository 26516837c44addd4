//! Visual part recognition: compares a captured photo with the catalog's
//! reference photos through a multimodal Gemini request.

pub mod analyzer;
pub mod error;
pub mod photo;
pub mod prompt;

pub use analyzer::{
    parse_result, RecognitionReport, Recognizer, RecognizerSettings, DEFAULT_MAX_REFERENCES,
    MAX_REFERENCES_LIMIT, NO_REFERENCES_MESSAGE,
};
pub use error::RecognitionError;
pub use photo::{
    cache_busted, is_jpeg, normalize_to_jpeg, HttpImageSource, ImageSource, JPEG_MIME, JPEG_QUALITY,
};
