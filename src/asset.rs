//! Captured asset payloads and image classification.

use url::Url;

/// Substring markers that classify a URL as an image asset.
///
/// The match is deliberately an unanchored, case-sensitive substring test:
/// an extension appearing anywhere in the URL, even mid-path, triggers image
/// handling (so `/foo.pngx/bar.js` is treated as an image). This mirrors the
/// observed capture behavior and is covered by tests below.
pub const IMAGE_MARKERS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp"];

pub fn is_image_url(url: &str) -> bool {
    IMAGE_MARKERS.iter().any(|marker| url.contains(marker))
}

/// Host component of a URL, including the port when present.
///
/// `url::Url::host_str` drops the port; same-host filtering must keep it so
/// that `localhost:8080` and `localhost:9090` count as different hosts.
pub fn url_host(url: &Url) -> Option<String> {
    url.host_str().map(|host| match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Response body, classified at capture time.
///
/// Image URLs keep their raw bytes; everything else is decoded as UTF-8 text
/// (lossily, so a stray invalid byte cannot fail the capture).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetPayload {
    Binary(Vec<u8>),
    Text(String),
}

impl AssetPayload {
    /// Classifies raw body bytes by the source URL.
    pub fn classify(source_url: &str, bytes: Vec<u8>) -> Self {
        if is_image_url(source_url) {
            AssetPayload::Binary(bytes)
        } else {
            AssetPayload::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AssetPayload::Binary(bytes) => bytes,
            AssetPayload::Text(text) => text.as_bytes(),
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, AssetPayload::Binary(_))
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// One same-host response ready to be written; discarded after the write.
#[derive(Debug, Clone)]
pub struct CapturedAsset {
    pub source_url: Url,
    pub host: String,
    pub payload: AssetPayload,
}

impl CapturedAsset {
    pub fn new(source_url: Url, host: impl Into<String>, payload: AssetPayload) -> Self {
        Self {
            source_url,
            host: host.into(),
            payload,
        }
    }

    pub fn pathname(&self) -> &str {
        self.source_url.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions_classify_as_binary() {
        for url in [
            "https://example.com/a.png",
            "https://example.com/b.jpg",
            "https://example.com/c.jpeg",
            "https://example.com/d.gif",
            "https://example.com/e.svg",
            "https://example.com/f.webp",
        ] {
            assert!(is_image_url(url), "{url} should classify as image");
        }
    }

    #[test]
    fn non_images_classify_as_text() {
        assert!(!is_image_url("https://example.com/style.css"));
        assert!(!is_image_url("https://example.com/app.js"));
        assert!(!is_image_url("https://example.com/"));
    }

    #[test]
    fn match_is_unanchored_substring() {
        // Known quirk, preserved: a marker anywhere in the URL wins.
        assert!(is_image_url("https://example.com/foo.pngx/bar.js"));
        assert!(is_image_url("https://example.com/img.svg?v=2"));
    }

    #[test]
    fn match_is_case_sensitive() {
        assert!(!is_image_url("https://example.com/a.PNG"));
    }

    #[test]
    fn classify_keeps_image_bytes_raw() {
        let bytes = vec![0x89, 0x50, 0x4e, 0x47];
        let payload = AssetPayload::classify("https://example.com/a.png", bytes.clone());
        assert_eq!(payload, AssetPayload::Binary(bytes));
    }

    #[test]
    fn classify_decodes_text_as_utf8() {
        let payload =
            AssetPayload::classify("https://example.com/style.css", b"body { color: red; }".to_vec());
        assert_eq!(
            payload,
            AssetPayload::Text("body { color: red; }".to_string())
        );
        assert!(!payload.is_binary());
    }

    #[test]
    fn url_host_includes_port() {
        let url = Url::parse("http://localhost:8080/a.css").unwrap();
        assert_eq!(url_host(&url).as_deref(), Some("localhost:8080"));

        let url = Url::parse("https://example.com/a.css").unwrap();
        assert_eq!(url_host(&url).as_deref(), Some("example.com"));
    }
}
