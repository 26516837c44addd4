//! Domain Services - Stateless catalog rules

mod catalog_search;
mod import;

pub use catalog_search::{resolve_matches, search_parts};
pub use import::ImportRow;
