use serde::{Deserialize, Serialize};

/// Wire shape of a feed source, selecting which adapter handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Rss,
    Api,
}

impl SourceKind {
    /// Classify a source URL when the caller did not specify a kind.
    /// JSON-API endpoints are the minority, so anything that doesn't look
    /// like one is treated as a syndication feed.
    pub fn classify(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        if lower.contains("//api.") || lower.contains("/api/") || lower.ends_with(".json") {
            SourceKind::Api
        } else {
            SourceKind::Rss
        }
    }
}

/// A configured feed origin, built-in or user-added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    pub id: String,
    pub name: String,
    pub url: String,
    pub kind: SourceKind,
    pub enabled: bool,
}

impl FeedSource {
    pub fn new(id: &str, name: &str, url: &str, kind: SourceKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            kind,
            enabled: true,
        }
    }
}

/// Parameters for adding a user feed; `kind` is classified from the URL
/// when not given.
#[derive(Debug, Clone)]
pub struct NewFeedRequest {
    pub name: String,
    pub url: String,
    pub kind: Option<SourceKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_api_host() {
        assert_eq!(
            SourceKind::classify("https://api.example.org/v2/top-headlines"),
            SourceKind::Api
        );
    }

    #[test]
    fn test_classify_api_path() {
        assert_eq!(
            SourceKind::classify("https://example.org/api/articles"),
            SourceKind::Api
        );
        assert_eq!(
            SourceKind::classify("https://example.org/feed.json"),
            SourceKind::Api
        );
    }

    #[test]
    fn test_classify_defaults_to_rss() {
        assert_eq!(
            SourceKind::classify("https://dev.to/feed"),
            SourceKind::Rss
        );
        assert_eq!(
            SourceKind::classify("https://techcrunch.com/feed/"),
            SourceKind::Rss
        );
    }
}
