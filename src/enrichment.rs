//! Enrichment pass over the catalog.
//!
//! Walks every record once in traversal order, fills in missing artwork and
//! release year, and isolates failures so one bad record never aborts the run.

use log::{debug, info, warn};

use crate::catalog::{CatalogAdapter, CatalogRecord, RecordUpdate};
use crate::metadata::MetadataSource;
use crate::rehost::ArtworkHost;

/// Outcome of processing one catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordOutcome {
    SkippedHasArtwork,
    SkippedMissingInfo,
    NothingFound,
    Updated,
}

/// End-of-run counters reported after a full pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records_seen: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Drives the per-record enrichment pipeline over the whole catalog.
pub struct EnrichmentManager<'a> {
    catalog: &'a dyn CatalogAdapter,
    primary_source: &'a dyn MetadataSource,
    fallback_source: &'a dyn MetadataSource,
    artwork_host: &'a dyn ArtworkHost,
}

impl<'a> EnrichmentManager<'a> {
    pub fn new(
        catalog: &'a dyn CatalogAdapter,
        primary_source: &'a dyn MetadataSource,
        fallback_source: &'a dyn MetadataSource,
        artwork_host: &'a dyn ArtworkHost,
    ) -> Self {
        Self {
            catalog,
            primary_source,
            fallback_source,
            artwork_host,
        }
    }

    /// Runs one full enrichment pass.
    ///
    /// Only a catalog listing failure is fatal; every per-record failure is
    /// logged with the record id and the pass continues.
    pub fn run(&self) -> Result<RunSummary, String> {
        let records = self.catalog.fetch_all_records()?;
        info!("Fetched {} catalog records", records.len());

        let mut summary = RunSummary::default();
        for record in &records {
            summary.records_seen += 1;
            match self.process_record(record) {
                Ok(RecordOutcome::Updated) => summary.updated += 1,
                Ok(RecordOutcome::NothingFound) => summary.not_found += 1,
                Ok(RecordOutcome::SkippedHasArtwork | RecordOutcome::SkippedMissingInfo) => {
                    summary.skipped += 1
                }
                Err(reason) => {
                    summary.failed += 1;
                    warn!("Record {} failed: {reason}", record.id);
                }
            }
        }

        info!(
            "Enrichment pass complete: {} seen, {} updated, {} skipped, {} not found, {} failed",
            summary.records_seen, summary.updated, summary.skipped, summary.not_found,
            summary.failed
        );
        Ok(summary)
    }

    fn process_record(&self, record: &CatalogRecord) -> Result<RecordOutcome, String> {
        let (artist, album) = match (record.artist.as_deref(), record.album.as_deref()) {
            (Some(artist), Some(album)) => (artist, album),
            _ => {
                info!(
                    "Skipping record {}: missing artist or album information",
                    record.id
                );
                return Ok(RecordOutcome::SkippedMissingInfo);
            }
        };

        // Idempotence gate: a record with artwork was enriched earlier.
        if record.artwork_file_count > 0 {
            info!("Skipping {artist} - {album}: already have album art");
            return Ok(RecordOutcome::SkippedHasArtwork);
        }

        let mut candidate = self.primary_source.resolve(artist, album);
        if !candidate.is_complete() {
            // The fallback candidate replaces the primary one entirely;
            // fields are never merged across sources.
            debug!(
                "{} result incomplete for {artist} - {album}, trying {}",
                self.primary_source.source_name(),
                self.fallback_source.source_name()
            );
            candidate = self.fallback_source.resolve(artist, album);
        }

        if candidate.is_empty() {
            info!("Couldn't find information for {artist} - {album}");
            return Ok(RecordOutcome::NothingFound);
        }

        let hosted_artwork_url = candidate
            .artwork_url
            .as_deref()
            .and_then(|source_url| self.artwork_host.rehost(source_url));

        let update = RecordUpdate {
            artist: artist.to_string(),
            album: album.to_string(),
            hosted_artwork_url,
            release_year: candidate.release_year,
        };
        self.catalog.update_record(&record.id, &update)?;
        info!("Updated {artist} - {album} (record {})", record.id);
        Ok(RecordOutcome::Updated)
    }
}
