//! Metadata source abstractions and concrete implementations.

pub mod spotify;
pub mod web_search;

/// Best-effort metadata produced by one source for an (artist, album) pair.
///
/// Both fields are independently optional; a source signals "not found" by
/// returning both absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataCandidate {
    pub artwork_url: Option<String>,
    pub release_year: Option<String>,
}

impl MetadataCandidate {
    pub fn is_empty(&self) -> bool {
        self.artwork_url.is_none() && self.release_year.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.artwork_url.is_some() && self.release_year.is_some()
    }
}

/// Interface implemented by concrete metadata sources.
pub trait MetadataSource {
    /// Human-readable label used in status lines.
    fn source_name(&self) -> &'static str;

    /// Resolves a best-effort candidate for one record.
    ///
    /// Lookup failure is not an error here; it comes back as an empty
    /// candidate so the caller can consult the next source.
    fn resolve(&self, artist: &str, album: &str) -> MetadataCandidate;
}

#[cfg(test)]
mod tests {
    use super::MetadataCandidate;

    #[test]
    fn test_candidate_default_is_empty_and_not_complete() {
        let candidate = MetadataCandidate::default();
        assert!(candidate.is_empty());
        assert!(!candidate.is_complete());
    }

    #[test]
    fn test_candidate_with_one_field_is_neither_empty_nor_complete() {
        let candidate = MetadataCandidate {
            artwork_url: Some("http://img/x.jpg".to_string()),
            release_year: None,
        };
        assert!(!candidate.is_empty());
        assert!(!candidate.is_complete());
    }

    #[test]
    fn test_candidate_with_both_fields_is_complete() {
        let candidate = MetadataCandidate {
            artwork_url: Some("http://img/x.jpg".to_string()),
            release_year: Some("1969".to_string()),
        };
        assert!(!candidate.is_empty());
        assert!(candidate.is_complete());
    }
}
