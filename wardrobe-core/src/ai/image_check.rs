//! Cheap reachability check for garment image URLs.

use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;

/// Timeout for the HEAD request.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// True if the content type names an image (e.g. "image/jpeg; charset=binary").
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Check that `url` answers a HEAD request with 200 and an image content type.
///
/// Any network error counts as "not an image".
pub async fn is_valid_image_url(client: &reqwest::Client, url: &str) -> bool {
    let response = match client.head(url).timeout(CHECK_TIMEOUT).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(url, error = %e, "Image check failed");
            return false;
        }
    };

    accepts_response(response.status(), response.headers())
}

/// A check passes on 200 with an image content type.
fn accepts_response(status: StatusCode, headers: &HeaderMap) -> bool {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    status == StatusCode::OK && is_image_content_type(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_content_types() {
        assert!(is_image_content_type("image/jpeg"));
        assert!(is_image_content_type("Image/PNG"));
        assert!(!is_image_content_type("text/html; charset=utf-8"));
        assert!(!is_image_content_type(""));
    }

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    #[test]
    fn test_ok_image_response_is_accepted() {
        assert!(accepts_response(StatusCode::OK, &headers("image/jpeg")));
        let webp = headers("image/webp; charset=binary");
        assert!(accepts_response(StatusCode::OK, &webp));
    }

    #[test]
    fn test_non_image_or_non_ok_response_is_rejected() {
        assert!(!accepts_response(StatusCode::OK, &headers("text/html")));
        let png = headers("image/png");
        assert!(!accepts_response(StatusCode::NOT_FOUND, &png));
        assert!(!accepts_response(StatusCode::NO_CONTENT, &png));
        assert!(!accepts_response(StatusCode::OK, &HeaderMap::new()));
    }

    #[tokio::test]
    async fn test_unreachable_url_is_invalid() {
        let client = reqwest::Client::new();
        assert!(!is_valid_image_url(&client, "not a url").await);
    }
}
