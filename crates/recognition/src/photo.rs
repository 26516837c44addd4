//! Photo loading and JPEG normalization for target and reference images

use crate::error::RecognitionError;
use async_trait::async_trait;
use domain::{now_ms, PhotoRef};
use image::codecs::jpeg::JpegEncoder;
use image::ImageResult;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const JPEG_QUALITY: u8 = 80;
pub const JPEG_MIME: &str = "image/jpeg";

pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xff, 0xd8, 0xff])
}

/// JPEG input is passed through untouched; anything else the `image` crate
/// can decode is re-encoded as JPEG
pub fn normalize_to_jpeg(bytes: &[u8]) -> ImageResult<Vec<u8>> {
    if is_jpeg(bytes) {
        return Ok(bytes.to_vec());
    }

    let decoded = image::load_from_memory(bytes)?;
    let rgb = decoded.to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;
    Ok(out)
}

/// Loads a stored photo reference as JPEG bytes.
///
/// `None` means the photo is unusable; the reference is then left out of the
/// comparison rather than failing the whole run.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn load(&self, photo: &str) -> Option<Vec<u8>>;
}

/// Fetches remote photos over HTTP and decodes inline `data:` photos
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    pub fn new(timeout: Duration) -> Result<Self, RecognitionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecognitionError::Analysis(format!("HTTP client setup failed: {e}")))?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let busted = cache_busted(url, now_ms())?;
        let response = match self.client.get(&busted).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "Reference photo fetch failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Reference photo unavailable");
            return None;
        }

        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                warn!(url, error = %e, "Reference photo body could not be read");
                None
            }
        }
    }
}

/// Append `t=<unix ms>` so intermediaries never serve a stale copy
pub fn cache_busted(url: &str, now: i64) -> Option<String> {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().append_pair("t", &now.to_string());
            Some(parsed.into())
        }
        Err(e) => {
            warn!(url, error = %e, "Reference photo URL is invalid");
            None
        }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn load(&self, photo: &str) -> Option<Vec<u8>> {
        let raw = match PhotoRef::parse(photo) {
            Ok(PhotoRef::Remote(url)) => self.fetch(&url).await?,
            Ok(inline) => match inline.inline_bytes()? {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, "Inline reference photo is invalid");
                    return None;
                }
            },
            Err(e) => {
                warn!(error = %e, "Unsupported reference photo");
                return None;
            }
        };

        if raw.is_empty() {
            warn!("Reference photo is empty");
            return None;
        }

        match normalize_to_jpeg(&raw) {
            Ok(jpeg) => {
                debug!(bytes = jpeg.len() as u64, "Reference photo loaded");
                Some(jpeg)
            }
            Err(e) => {
                warn!(error = %e, "Reference photo could not be decoded");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn test_jpeg_passes_through() {
        let bytes = vec![0xff, 0xd8, 0xff, 0xe0, 1, 2, 3];
        assert_eq!(normalize_to_jpeg(&bytes).unwrap(), bytes);
    }

    #[test]
    fn test_png_is_reencoded() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 128]));
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        assert!(!is_jpeg(&png));

        let jpeg = normalize_to_jpeg(&png).unwrap();
        assert!(is_jpeg(&jpeg));
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn test_cache_busting_keeps_existing_query() {
        assert_eq!(
            cache_busted("https://cdn.example.com/a.jpg", 42).as_deref(),
            Some("https://cdn.example.com/a.jpg?t=42")
        );
        assert_eq!(
            cache_busted("https://cdn.example.com/a.jpg?v=2", 42).as_deref(),
            Some("https://cdn.example.com/a.jpg?v=2&t=42")
        );
        assert!(cache_busted("not a url", 1).is_none());
    }

    #[tokio::test]
    async fn test_inline_photo_loads_without_network() {
        let source = HttpImageSource::new(Duration::from_secs(1)).unwrap();
        let jpeg = [0xff, 0xd8, 0xff, 0xdb, 0x00];
        let photo = PhotoRef::inline("image/jpeg", &jpeg).to_url_string();

        assert_eq!(source.load(&photo).await, Some(jpeg.to_vec()));
        assert_eq!(source.load("data:image/jpeg;base64,@@@").await, None);
        assert_eq!(source.load("ftp://nope").await, None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(normalize_to_jpeg(b"definitely not an image").is_err());
        assert!(normalize_to_jpeg(&[]).is_err());
    }
}
