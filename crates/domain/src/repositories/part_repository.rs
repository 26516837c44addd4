//! PartRepository - Domain abstraction for catalog persistence

use crate::entities::PartRecord;
use async_trait::async_trait;

/// Repository abstraction for part records
///
/// Implementations own their error type so infrastructure failures keep
/// their detail (HTTP status, storage messages) all the way to the caller.
#[async_trait]
pub trait PartRepository: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All records, most recent first
    async fn list_parts(&self) -> Result<Vec<PartRecord>, Self::Error>;

    /// Insert or update by id. Inline photos are persisted by the implementation.
    async fn save_part(&self, part: &PartRecord) -> Result<(), Self::Error>;

    async fn delete_part(&self, id: &str) -> Result<(), Self::Error>;

    /// Lookup by id; default implementation scans `list_parts`
    async fn find_part(&self, id: &str) -> Result<Option<PartRecord>, Self::Error> {
        Ok(self.list_parts().await?.into_iter().find(|p| p.id == id))
    }
}
