//! Structured metadata source backed by the Spotify search API.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use serde_json::Value;

use crate::config::Config;
use crate::metadata::{MetadataCandidate, MetadataSource};

const TOKEN_EXCHANGE_URL: &str = "https://accounts.spotify.com/api/token";
const SEARCH_URL: &str = "https://api.spotify.com/v1/search";
const SOURCE_NAME: &str = "Spotify";

/// Client-credentials token provider for the structured search API.
///
/// Every call performs a fresh exchange; tokens are never cached across
/// calls or runs.
pub struct SpotifyTokenProvider {
    http_client: ureq::Agent,
    client_id: String,
    client_secret: String,
}

impl SpotifyTokenProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: build_agent(),
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
        }
    }

    /// Exchanges the configured client credentials for an access token.
    pub fn acquire(&self) -> Result<String, String> {
        let credentials = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        let response = self
            .http_client
            .post(TOKEN_EXCHANGE_URL)
            .set("Authorization", &format!("Basic {credentials}"))
            .send_form(&[("grant_type", "client_credentials")])
            .map_err(|err| format!("Token exchange failed: {err}"))?;
        let parsed: Value = response
            .into_json()
            .map_err(|err| format!("Token exchange response parse failed: {err}"))?;
        parsed["access_token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| "Token exchange response had no access_token".to_string())
    }
}

/// Primary metadata source querying the structured album search endpoint.
pub struct SpotifyMetadataSource {
    http_client: ureq::Agent,
    token_provider: SpotifyTokenProvider,
}

impl SpotifyMetadataSource {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: build_agent(),
            token_provider: SpotifyTokenProvider::new(config),
        }
    }

    fn search_top_album(&self, artist: &str, album: &str) -> Result<MetadataCandidate, String> {
        let token = self.token_provider.acquire()?;
        let query = format!("album:{album} artist:{artist}");
        let url = format!(
            "{SEARCH_URL}?q={}&type=album&limit=1",
            urlencoding::encode(&query)
        );
        let response = self
            .http_client
            .get(&url)
            .set("Authorization", &format!("Bearer {token}"))
            .call()
            .map_err(|err| format!("Album search failed: {err}"))?;
        let parsed: Value = response
            .into_json()
            .map_err(|err| format!("Album search response parse failed: {err}"))?;
        Ok(extract_candidate(&parsed))
    }
}

impl MetadataSource for SpotifyMetadataSource {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn resolve(&self, artist: &str, album: &str) -> MetadataCandidate {
        match self.search_top_album(artist, album) {
            Ok(candidate) => candidate,
            Err(reason) => {
                debug!("{SOURCE_NAME} lookup failed for {artist} - {album}: {reason}");
                MetadataCandidate::default()
            }
        }
    }
}

fn build_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(15))
        .timeout_write(Duration::from_secs(15))
        .build()
}

/// Pulls artwork and year out of a search response; an empty result set
/// yields an empty candidate.
fn extract_candidate(value: &Value) -> MetadataCandidate {
    let top_match = match value["albums"]["items"]
        .as_array()
        .and_then(|items| items.first())
    {
        Some(top_match) => top_match,
        None => return MetadataCandidate::default(),
    };

    // The image list is ordered largest first.
    let artwork_url = top_match["images"]
        .as_array()
        .and_then(|images| images.first())
        .and_then(|image| image["url"].as_str())
        .map(str::to_string);

    let release_year = top_match["release_date"]
        .as_str()
        .and_then(|date| date.get(..4))
        .map(str::to_string);

    MetadataCandidate {
        artwork_url,
        release_year,
    }
}

#[cfg(test)]
mod tests {
    use super::extract_candidate;
    use serde_json::json;

    #[test]
    fn test_extract_candidate_takes_largest_image_and_year_prefix() {
        let payload = json!({
            "albums": {
                "items": [{
                    "name": "Abbey Road",
                    "images": [
                        { "url": "http://img/large.jpg", "width": 640 },
                        { "url": "http://img/small.jpg", "width": 64 },
                    ],
                    "release_date": "1969-09-26",
                }]
            }
        });

        let candidate = extract_candidate(&payload);
        assert_eq!(candidate.artwork_url.as_deref(), Some("http://img/large.jpg"));
        assert_eq!(candidate.release_year.as_deref(), Some("1969"));
    }

    #[test]
    fn test_extract_candidate_returns_empty_for_no_matches() {
        let payload = json!({ "albums": { "items": [] } });
        assert!(extract_candidate(&payload).is_empty());
    }

    #[test]
    fn test_extract_candidate_returns_empty_for_unexpected_shape() {
        let payload = json!({ "error": { "status": 429 } });
        assert!(extract_candidate(&payload).is_empty());
    }

    #[test]
    fn test_extract_candidate_tolerates_partial_match() {
        let payload = json!({
            "albums": {
                "items": [{
                    "name": "Obscure Bootleg",
                    "images": [],
                    "release_date": "196",
                }]
            }
        });

        let candidate = extract_candidate(&payload);
        assert_eq!(candidate.artwork_url, None);
        assert_eq!(candidate.release_year, None);
    }
}
