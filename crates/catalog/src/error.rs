use domain::DomainError;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Cloud catalog is not configured: {0} is missing (set SUPABASE_URL and SUPABASE_KEY)")]
    NotConfigured(&'static str),

    #[error("Invalid catalog configuration: {0}")]
    InvalidConfig(String),

    #[error("Catalog request failed (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode catalog response: {0}")]
    Decode(String),

    #[error("Photo error: {0}")]
    Image(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error bodies of PostgREST (`message`, `details`, `hint`) and Storage
/// (`error`, `message`)
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl CatalogError {
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let mut message = parsed
            .message
            .or(parsed.error)
            .unwrap_or_else(|| body.trim().to_string());
        if let Some(details) = parsed.details.filter(|d| !d.is_empty()) {
            message = format!("{message} ({details})");
        }
        if let Some(hint) = parsed.hint.filter(|h| !h.is_empty()) {
            message = format!("{message}; hint: {hint}");
        }
        if message.is_empty() {
            message = "empty response body".to_string();
        }
        CatalogError::Http { status, message }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            CatalogError::Decode(error.to_string())
        } else {
            CatalogError::Network(error.to_string())
        }
    }
}

impl From<csv::Error> for CatalogError {
    fn from(error: csv::Error) -> Self {
        CatalogError::Import(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgrest_message_extracted() {
        let body = r#"{"code":"42P01","details":null,"hint":null,"message":"relation \"public.parts\" does not exist"}"#;
        let err = CatalogError::from_status(404, body);
        assert_eq!(
            err.to_string(),
            "Catalog request failed (HTTP 404): relation \"public.parts\" does not exist"
        );
    }

    #[test]
    fn test_storage_error_and_plain_body() {
        let storage = CatalogError::from_status(400, r#"{"statusCode":"400","error":"Bucket not found"}"#);
        assert!(storage.to_string().contains("Bucket not found"));

        let plain = CatalogError::from_status(502, "Bad Gateway\n");
        assert!(matches!(plain, CatalogError::Http { status: 502, ref message } if message == "Bad Gateway"));
    }
}
