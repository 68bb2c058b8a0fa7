//! Artwork re-hosting onto the public image host.

use std::io::Read;
use std::time::Duration;

use log::warn;
use serde_json::Value;

use crate::config::Config;

const IMGBB_UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";
// The host rejects uploads above 32 MB; anything near that is not album art.
const MAX_ARTWORK_BYTES: u64 = 16 * 1024 * 1024;

/// Interface implemented by concrete artwork hosts.
pub trait ArtworkHost {
    /// Downloads `source_url` and re-uploads it to stable hosting.
    ///
    /// `None` means the artwork could not be rehosted; the caller omits the
    /// field from the write instead of failing the record.
    fn rehost(&self, source_url: &str) -> Option<String>;
}

/// imgbb host backed by `ureq`.
pub struct ImgbbArtworkHost {
    http_client: ureq::Agent,
    api_key: String,
}

impl ImgbbArtworkHost {
    pub fn new(config: &Config) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(30))
            .timeout_write(Duration::from_secs(30))
            .build();
        Self {
            http_client,
            api_key: config.imgbb_api_key.clone(),
        }
    }

    fn download(&self, source_url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .http_client
            .get(source_url)
            .call()
            .map_err(|err| format!("Artwork download failed for {source_url}: {err}"))?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_ARTWORK_BYTES)
            .read_to_end(&mut bytes)
            .map_err(|err| format!("Artwork read failed for {source_url}: {err}"))?;
        if bytes.is_empty() {
            return Err(format!("Artwork download returned no content: {source_url}"));
        }
        Ok(bytes)
    }

    fn upload(&self, image_bytes: &[u8]) -> Result<String, String> {
        let boundary = make_boundary();
        let body = build_multipart_image_body(&boundary, "image", image_bytes);
        let url = format!(
            "{IMGBB_UPLOAD_URL}?key={}",
            urlencoding::encode(&self.api_key)
        );
        let response = self
            .http_client
            .post(&url)
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .send_bytes(&body)
            .map_err(|err| format!("Artwork upload failed: {err}"))?;
        let parsed: Value = response
            .into_json()
            .map_err(|err| format!("Artwork upload response parse failed: {err}"))?;
        parsed["data"]["url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| "Artwork upload response had no hosted url".to_string())
    }
}

impl ArtworkHost for ImgbbArtworkHost {
    fn rehost(&self, source_url: &str) -> Option<String> {
        let bytes = match self.download(source_url) {
            Ok(bytes) => bytes,
            Err(reason) => {
                warn!("{reason}");
                return None;
            }
        };
        match self.upload(&bytes) {
            Ok(hosted_url) => Some(hosted_url),
            Err(reason) => {
                warn!("{reason}");
                None
            }
        }
    }
}

fn make_boundary() -> String {
    let mut bytes = [0u8; 16];
    let _ = getrandom::fill(&mut bytes);
    bytes.iter().map(|value| format!("{value:02x}")).collect()
}

fn build_multipart_image_body(boundary: &str, field_name: &str, image_bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(image_bytes.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{field_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(image_bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::{build_multipart_image_body, make_boundary};

    #[test]
    fn test_make_boundary_is_hex_and_unique_per_call() {
        let first = make_boundary();
        let second = make_boundary();
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_multipart_body_wraps_bytes_in_boundary_markers() {
        let body = build_multipart_image_body("feedface", "image", b"JPEGDATA");
        let text = String::from_utf8(body).expect("body is ascii for this fixture");

        assert!(text.starts_with("--feedface\r\n"));
        assert!(text.contains("Content-Disposition: form-data; name=\"image\""));
        assert!(text.contains("\r\n\r\nJPEGDATA\r\n"));
        assert!(text.ends_with("--feedface--\r\n"));
    }

    #[test]
    fn test_multipart_body_preserves_binary_payload() {
        let payload = [0u8, 159, 146, 150, 13, 10];
        let body = build_multipart_image_body("00ff", "image", &payload);
        let needle = &payload[..];
        assert!(body
            .windows(needle.len())
            .any(|window| window == needle));
    }
}
