//! Request routing policy.

use bridge_traits::http::{HttpMethod, HttpRequest};
use serde::{Deserialize, Serialize};

/// Which serving policy applies to an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    /// Audio: current-generation lookup, fetch and store on miss.
    Media,
    /// Everything else: lookup across all generations, fetch without storing on miss.
    Static,
    /// Not cacheable (non-GET); forwarded to the network untouched.
    Bypass,
}

impl RequestClass {
    /// Classify a request.
    ///
    /// Media matching is a case-sensitive suffix match of `.<ext>` against
    /// the full URL, so a query string or fragment makes a request static.
    pub fn classify(request: &HttpRequest, media_extensions: &[String]) -> Self {
        if request.method != HttpMethod::Get {
            return RequestClass::Bypass;
        }

        if is_media_url(&request.url, media_extensions) {
            RequestClass::Media
        } else {
            RequestClass::Static
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestClass::Media => "media",
            RequestClass::Static => "static",
            RequestClass::Bypass => "bypass",
        }
    }
}

/// `true` if `url` ends with `.<ext>` for one of `extensions`.
pub fn is_media_url(url: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| {
        url.strip_suffix(ext.as_str())
            .is_some_and(|rest| rest.ends_with('.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extensions() -> Vec<String> {
        ["mp3", "m4a", "wav", "ogg", "opus"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_media_urls() {
        let ext = extensions();
        for url in [
            "/songs/amma1.mp3",
            "https://lullaby.example/songs/thaththa1.m4a",
            "/a.wav",
            "/a.ogg",
            "/a.opus",
        ] {
            assert_eq!(
                RequestClass::classify(&HttpRequest::get(url), &ext),
                RequestClass::Media,
                "{url}"
            );
        }
    }

    #[test]
    fn test_static_urls() {
        let ext = extensions();
        for url in [
            "/",
            "/index.html",
            "/images/cover.jpeg",
            "/songs/amma1.MP3",
            "/songs/amma1.mp3?v=2",
            "/songs/mp3",
            "/songs/amma1.xmp3",
        ] {
            assert_eq!(
                RequestClass::classify(&HttpRequest::get(url), &ext),
                RequestClass::Static,
                "{url}"
            );
        }
    }

    #[test]
    fn test_non_get_bypasses() {
        let request = HttpRequest::new(HttpMethod::Post, "/songs/amma1.mp3");
        assert_eq!(
            RequestClass::classify(&request, &extensions()),
            RequestClass::Bypass
        );
        assert_eq!(RequestClass::Bypass.as_str(), "bypass");
    }
}
