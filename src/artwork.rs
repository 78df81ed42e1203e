//! Background-art lookup against the iTunes song search.
//!
//! The query is the audio file's name with its extension stripped. Every
//! failure path (network, HTTP status, body shape, empty result set)
//! degrades to a fixed fallback image URL and is logged, never surfaced.

use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Substituted whenever the search fails or comes back empty.
pub const FALLBACK_ARTWORK_URL: &str =
    "https://c.pxhere.com/photos/0a/e8/disk_music_sound_turntable_vinyl-1268072.jpg!d";

// Shared HTTP client with reasonable defaults for timeouts
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("karaplay/0.1")
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client")
});

#[derive(Error, Debug)]
pub enum ArtworkError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Option<Vec<SearchResult>>,
}

#[derive(Deserialize)]
#[allow(non_snake_case)]
struct SearchResult {
    artworkUrl100: Option<String>,
}

/// Query the song search for artwork matching `query`.
/// `Ok(None)` means the search succeeded but had no usable result.
pub async fn search_artwork(query: &str) -> Result<Option<String>, ArtworkError> {
    let url = build_search_url(query);
    let resp = HTTP_CLIENT.get(&url).send().await?;
    if !resp.status().is_success() {
        return Err(ArtworkError::Api(format!("itunes: HTTP {}", resp.status())));
    }
    let body = resp.text().await?;
    parse_artwork_response(&body)
}

/// Artwork URL for `query`, or the fixed fallback on any failure.
pub async fn lookup_or_fallback(query: &str) -> String {
    match search_artwork(query).await {
        Ok(Some(url)) => url,
        Ok(None) => FALLBACK_ARTWORK_URL.to_string(),
        Err(e) => {
            tracing::warn!(query, error = %e, "artwork lookup failed, using fallback");
            FALLBACK_ARTWORK_URL.to_string()
        }
    }
}

fn build_search_url(query: &str) -> String {
    format!(
        "https://itunes.apple.com/search?term={}&entity=song&limit=1",
        urlencoding::encode(query)
    )
}

/// The search returns 100x100 thumbnails; swap in the large rendition.
fn parse_artwork_response(body: &str) -> Result<Option<String>, ArtworkError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let url = response
        .results
        .unwrap_or_default()
        .into_iter()
        .find_map(|r| r.artworkUrl100)
        .map(|u| u.replace("100x100bb", "1000x1000bb"));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_artwork_response_upscales() {
        let body = r#"{"resultCount":1,"results":[{"artworkUrl100":"https://x/100x100bb.jpg"}]}"#;
        assert_eq!(
            parse_artwork_response(body).unwrap(),
            Some("https://x/1000x1000bb.jpg".to_string())
        );
    }

    #[test]
    fn test_parse_artwork_response_empty_results() {
        assert_eq!(parse_artwork_response(r#"{"results":[]}"#).unwrap(), None);
        assert_eq!(parse_artwork_response(r#"{}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_artwork_response_malformed() {
        assert!(matches!(
            parse_artwork_response("not json"),
            Err(ArtworkError::Serde(_))
        ));
    }

    #[test]
    fn test_build_search_url_encodes_query() {
        let url = build_search_url("Song Title & More");
        assert_eq!(
            url,
            "https://itunes.apple.com/search?term=Song%20Title%20%26%20More&entity=song&limit=1"
        );
    }
}
