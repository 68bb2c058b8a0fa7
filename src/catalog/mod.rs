//! Catalog adapter abstractions and concrete implementations.

pub mod notion;

/// One catalog entry as read from the record store.
#[derive(Debug, Clone)]
pub struct CatalogRecord {
    pub id: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub artwork_file_count: usize,
    pub release_year: Option<i64>,
}

/// Partial field update applied to one catalog record.
///
/// Only the fields present here are touched; everything else on the record
/// stays owned by the catalog.
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    pub artist: String,
    pub album: String,
    pub hosted_artwork_url: Option<String>,
    pub release_year: Option<String>,
}

/// Interface implemented by concrete catalog adapters.
pub trait CatalogAdapter {
    /// Fetches every record in the catalog, following cursor pagination.
    fn fetch_all_records(&self) -> Result<Vec<CatalogRecord>, String>;
    /// Applies a partial update to one record.
    fn update_record(&self, record_id: &str, update: &RecordUpdate) -> Result<(), String>;
}
