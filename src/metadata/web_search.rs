//! Fallback metadata source scraping a web image-search results page.
//!
//! Best-effort by design: the page structure is not contractually stable, so
//! every extraction miss comes back as an absent field, never an error.

use std::time::Duration;

use log::debug;
use regex::Regex;

use crate::metadata::{MetadataCandidate, MetadataSource};

const SEARCH_URL: &str = "https://www.google.com/search";
// The search provider rejects clients that do not identify as a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";
const SOURCE_NAME: &str = "web search";

/// Low-confidence metadata source parsing an image-search results page.
pub struct WebSearchMetadataSource {
    http_client: ureq::Agent,
    image_src_pattern: Regex,
    released_year_pattern: Regex,
}

impl WebSearchMetadataSource {
    pub fn new() -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .timeout_write(Duration::from_secs(15))
            .build();
        Self {
            http_client,
            image_src_pattern: Regex::new(r#"<img[^>]+src=["']([^"']+)["']"#)
                .expect("valid image pattern"),
            released_year_pattern: Regex::new(
                r#"(?i)<span[^>]*>[^<]*released[^<]*</span>\s*<span[^>]*>\s*([^<]+?)\s*</span>"#,
            )
            .expect("valid year pattern"),
        }
    }

    fn fetch_results_page(&self, artist: &str, album: &str) -> Result<String, String> {
        let query = format!("{artist} {album} album");
        let url = format!(
            "{SEARCH_URL}?q={}&tbm=isch",
            urlencoding::encode(&query)
        );
        let response = self
            .http_client
            .get(&url)
            .set("User-Agent", BROWSER_USER_AGENT)
            .call()
            .map_err(|err| format!("Image search request failed: {err}"))?;
        response
            .into_string()
            .map_err(|err| format!("Image search response read failed: {err}"))
    }

    fn extract_artwork_url(&self, page: &str) -> Option<String> {
        // The first image on the results page is the provider's own logo.
        self.image_src_pattern
            .captures_iter(page)
            .nth(1)
            .and_then(|captures| captures.get(1))
            .map(|src| src.as_str().to_string())
    }

    fn extract_release_year(&self, page: &str) -> Option<String> {
        self.released_year_pattern
            .captures(page)
            .and_then(|captures| captures.get(1))
            .map(|year| year.as_str().to_string())
    }
}

impl Default for WebSearchMetadataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataSource for WebSearchMetadataSource {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn resolve(&self, artist: &str, album: &str) -> MetadataCandidate {
        let page = match self.fetch_results_page(artist, album) {
            Ok(page) => page,
            Err(reason) => {
                debug!("{SOURCE_NAME} lookup failed for {artist} - {album}: {reason}");
                return MetadataCandidate::default();
            }
        };
        MetadataCandidate {
            artwork_url: self.extract_artwork_url(&page),
            release_year: self.extract_release_year(&page),
        }
    }
}
