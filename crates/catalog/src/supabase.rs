//! Supabase-backed catalog: `parts` table over PostgREST plus the photo bucket

use crate::error::{CatalogError, CatalogResult};
use crate::rows::PartRow;
use async_trait::async_trait;
use common::AppConfig;
use domain::{now_ms, PartRecord, PartRepository, PhotoRef};
use futures::future::try_join_all;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

const PARTS_TABLE: &str = "parts";
/// Folder used when a part has no number yet
pub const UNNAMED_FOLDER: &str = "unnamed_part";
const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct SupabaseCatalog {
    base_url: String,
    bucket: String,
    client: Client,
}

/// Outcome of [`SupabaseCatalog::ensure_bucket`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketStatus {
    Exists,
    Created,
    /// Bootstrap failed; the bucket has to be created in the dashboard
    Unavailable(String),
}

#[derive(Debug, Deserialize)]
struct BucketInfo {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateBucket<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
    allowed_mime_types: [&'static str; 2],
    file_size_limit: u64,
}

impl SupabaseCatalog {
    pub fn new(url: &str, key: &str, bucket: &str) -> CatalogResult<Self> {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(CatalogError::NotConfigured("SUPABASE_URL"));
        }
        let key = key.trim();
        if key.is_empty() {
            return Err(CatalogError::NotConfigured("SUPABASE_KEY"));
        }

        let mut headers = HeaderMap::new();
        let invalid_key = |e: reqwest::header::InvalidHeaderValue| {
            CatalogError::InvalidConfig(format!("SUPABASE_KEY is not a valid header value: {e}"))
        };
        headers.insert("apikey", HeaderValue::from_str(key).map_err(invalid_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(invalid_key)?,
        );

        let client = Client::builder()
            .user_agent(concat!("aidentify/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: url.to_string(),
            bucket: bucket.to_string(),
            client,
        })
    }

    pub fn from_config(config: &AppConfig) -> CatalogResult<Self> {
        let url = config
            .supabase
            .url
            .as_deref()
            .ok_or(CatalogError::NotConfigured("SUPABASE_URL"))?;
        let key = config
            .supabase
            .key
            .as_deref()
            .ok_or(CatalogError::NotConfigured("SUPABASE_KEY"))?;
        Self::new(url, key, &config.supabase.bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.base_url, path)
    }

    async fn check(response: Response) -> CatalogResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(CatalogError::from_status(status.as_u16(), &body))
    }

    /// All parts, most recent first
    pub async fn list_parts(&self) -> CatalogResult<Vec<PartRecord>> {
        let response = self
            .client
            .get(self.rest_url(PARTS_TABLE))
            .query(&[("select", "*"), ("order", "timestamp.desc")])
            .send()
            .await?;
        let rows: Vec<PartRow> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        debug!(items_count = rows.len() as u64, "Catalog rows fetched");
        Ok(rows.into_iter().map(PartRow::into_record).collect())
    }

    /// Insert or replace by id
    pub async fn upsert_part(&self, part: &PartRecord) -> CatalogResult<()> {
        let response = self
            .client
            .post(self.rest_url(PARTS_TABLE))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[PartRow::from(part)])
            .send()
            .await?;
        Self::check(response).await?;
        debug!(part_id = %part.id, "Part upserted");
        Ok(())
    }

    pub async fn delete_part(&self, id: &str) -> CatalogResult<()> {
        let response = self
            .client
            .delete(self.rest_url(PARTS_TABLE))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        Self::check(response).await?;
        info!(part_id = %id, "Part deleted");
        Ok(())
    }

    /// Upload inline photos, then upsert.
    ///
    /// Returns the record as stored: inline photos replaced by their public
    /// URLs and a zero timestamp replaced by now.
    pub async fn save_part(&self, part: &PartRecord) -> CatalogResult<PartRecord> {
        let folder = if part.part_number.trim().is_empty() {
            UNNAMED_FOLDER
        } else {
            part.part_number.as_str()
        };

        let image_urls = try_join_all(
            part.image_urls
                .iter()
                .map(|raw| self.persist_photo(raw, folder)),
        )
        .await?;

        let mut stored = part.clone();
        stored.image_urls = image_urls;
        if stored.timestamp == 0 {
            stored.timestamp = now_ms();
        }

        self.upsert_part(&stored).await?;
        info!(
            part_id = %stored.id,
            photos = stored.image_urls.len() as u64,
            "Part saved"
        );
        Ok(stored)
    }

    /// Remote URLs are kept, inline photos are uploaded
    async fn persist_photo(&self, raw: &str, folder: &str) -> CatalogResult<String> {
        match PhotoRef::parse(raw) {
            Ok(photo) => match photo.inline_bytes() {
                Some(bytes) => self.upload_image(bytes?, folder).await,
                None => Ok(photo.to_url_string()),
            },
            Err(e) if raw.trim_start().starts_with("data:") => Err(e.into()),
            // keep whatever another client stored
            Err(_) => Ok(raw.to_string()),
        }
    }

    /// Make sure the photo bucket exists. Never fails: problems are logged
    /// and reported as [`BucketStatus::Unavailable`].
    pub async fn ensure_bucket(&self) -> BucketStatus {
        match self.try_ensure_bucket().await {
            Ok(status) => status,
            Err(e) => {
                warn!(
                    bucket = %self.bucket,
                    error = %e,
                    "Bucket bootstrap failed; create it manually in the Supabase dashboard"
                );
                BucketStatus::Unavailable(e.to_string())
            }
        }
    }

    async fn try_ensure_bucket(&self) -> CatalogResult<BucketStatus> {
        let response = self.client.get(self.storage_url("bucket")).send().await?;
        let buckets: Vec<BucketInfo> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        if buckets.iter().any(|b| b.id == self.bucket) {
            debug!(bucket = %self.bucket, "Bucket present");
            return Ok(BucketStatus::Exists);
        }

        let response = self
            .client
            .post(self.storage_url("bucket"))
            .json(&CreateBucket {
                id: &self.bucket,
                name: &self.bucket,
                public: true,
                allowed_mime_types: ["image/jpeg", "image/png"],
                file_size_limit: MAX_UPLOAD_BYTES,
            })
            .send()
            .await?;
        Self::check(response).await?;
        info!(bucket = %self.bucket, "Bucket created");
        Ok(BucketStatus::Created)
    }

    /// Store a JPEG under `<folder>/<uuid>.jpg` and return its public URL
    pub async fn upload_image(&self, bytes: Vec<u8>, folder: &str) -> CatalogResult<String> {
        if bytes.is_empty() {
            return Err(CatalogError::Image("empty image payload".to_string()));
        }
        let path = format!("{}/{}.jpg", sanitize_path(folder), Uuid::new_v4());
        let size = bytes.len() as u64;

        let response = self
            .client
            .post(self.storage_url(&format!("object/{}/{}", self.bucket, path)))
            .header("content-type", "image/jpeg")
            .header("cache-control", "3600")
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;

        debug!(path = %path, bytes = size, "Photo uploaded");
        Ok(self.public_url(&path))
    }

    pub fn public_url(&self, path: &str) -> String {
        self.storage_url(&format!("object/public/{}/{}", self.bucket, path))
    }
}

/// Storage folder name: ASCII letters and digits kept, everything else `_`,
/// lowercased
pub fn sanitize_path(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl PartRepository for SupabaseCatalog {
    type Error = CatalogError;

    async fn list_parts(&self) -> CatalogResult<Vec<PartRecord>> {
        SupabaseCatalog::list_parts(self).await
    }

    async fn save_part(&self, part: &PartRecord) -> CatalogResult<()> {
        SupabaseCatalog::save_part(self, part).await.map(|_| ())
    }

    async fn delete_part(&self, id: &str) -> CatalogResult<()> {
        SupabaseCatalog::delete_part(self, id).await
    }
}
