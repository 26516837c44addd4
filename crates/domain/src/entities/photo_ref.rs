//! PhotoRef - One entry of `PartRecord::image_urls`
//!
//! Stored photos are public storage URLs; freshly captured photos travel as
//! `data:<mime>;base64,<payload>` URLs until the catalog uploads them.

use crate::errors::{DomainError, DomainResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoRef {
    /// Remote http(s) URL
    Remote(String),
    /// Inline image, `data` is the base64 payload
    Inline { mime: String, data: String },
}

impl PhotoRef {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();

        if let Some(rest) = raw.strip_prefix("data:") {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| DomainError::InvalidPhoto(truncate(raw)))?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| DomainError::InvalidPhoto(truncate(raw)))?;
            let mime = if mime.is_empty() {
                "application/octet-stream"
            } else {
                mime
            };
            return Ok(PhotoRef::Inline {
                mime: mime.to_string(),
                data: data.to_string(),
            });
        }

        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(PhotoRef::Remote(raw.to_string()));
        }

        Err(DomainError::InvalidPhoto(truncate(raw)))
    }

    /// Build an inline reference for raw image bytes
    pub fn inline(mime: &str, bytes: &[u8]) -> Self {
        PhotoRef::Inline {
            mime: mime.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, PhotoRef::Inline { .. })
    }

    /// Decoded bytes of an inline photo; `None` for remote photos
    pub fn inline_bytes(&self) -> Option<DomainResult<Vec<u8>>> {
        match self {
            PhotoRef::Remote(_) => None,
            PhotoRef::Inline { data, .. } => Some(
                STANDARD
                    .decode(data.trim())
                    .map_err(|e| DomainError::InvalidPhoto(format!("bad base64 payload: {e}"))),
            ),
        }
    }

    /// String form suitable for `PartRecord::image_urls`
    pub fn to_url_string(&self) -> String {
        match self {
            PhotoRef::Remote(url) => url.clone(),
            PhotoRef::Inline { mime, data } => format!("data:{mime};base64,{data}"),
        }
    }
}

fn truncate(raw: &str) -> String {
    raw.chars().take(48).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote() {
        let photo = PhotoRef::parse("https://cdn.example.com/a.jpg").unwrap();
        assert_eq!(
            photo,
            PhotoRef::Remote("https://cdn.example.com/a.jpg".to_string())
        );
        assert!(!photo.is_inline());
        assert!(photo.inline_bytes().is_none());
    }

    #[test]
    fn test_inline_roundtrip_through_url_string() {
        let photo = PhotoRef::inline("image/jpeg", &[0xFF, 0xD8, 0xFF]);
        let url = photo.to_url_string();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let parsed = PhotoRef::parse(&url).unwrap();
        assert_eq!(parsed.inline_bytes().unwrap().unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(PhotoRef::parse("ftp://nope").is_err());
        assert!(PhotoRef::parse("data:image/png,notbase64marker").is_err());
        assert!(PhotoRef::parse("").is_err());
    }
}
