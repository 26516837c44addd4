//! Hosted catalog persistence: Supabase PostgREST for part records, Supabase
//! Storage for photos, CSV bulk import.

pub mod error;
pub mod import;
pub mod rows;
pub mod supabase;

pub use error::{CatalogError, CatalogResult};
pub use import::{import_csv, read_import_rows};
pub use rows::PartRow;
pub use supabase::{sanitize_path, BucketStatus, SupabaseCatalog, UNNAMED_FOLDER};
