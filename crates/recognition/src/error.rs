use llm::GeminiError;
use thiserror::Error;

/// Failure of one recognition run.
///
/// Credential problems are separated so callers can ask for a new API key
/// instead of showing a generic analysis error.
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("API key missing or invalid: {0}")]
    Credential(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),
}

impl RecognitionError {
    pub fn is_credential(&self) -> bool {
        matches!(self, RecognitionError::Credential(_))
    }
}

impl From<GeminiError> for RecognitionError {
    fn from(error: GeminiError) -> Self {
        if error.is_credential_error() {
            RecognitionError::Credential(error.to_string())
        } else {
            RecognitionError::Analysis(error.to_string())
        }
    }
}
