//! Request classification.
//!
//! Decides, per intercepted request, which caching policy applies. The
//! decision depends only on the method, the URL scheme and the URL path,
//! so identical requests always land in the same class.

use regex::Regex;
use reqwest::Method;
use vidshell_core::{Error, RouterConfig};

use crate::fetch::Request;

/// Policy class of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Not intercepted: non-GET or browser-extension requests.
    Passthrough,
    /// Video/audio segments and manifests: network only, never cached.
    Streaming,
    /// Everything else: network first with cache fallback.
    Cacheable,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::Passthrough => "passthrough",
            RequestClass::Streaming => "streaming",
            RequestClass::Cacheable => "cacheable",
        }
    }
}

/// Compiled request classifier.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    extensions: Option<Regex>,
    path_segments: Vec<String>,
    passthrough_schemes: Vec<String>,
}

impl RequestRouter {
    /// Compile the classifier from configuration.
    pub fn new(config: &RouterConfig) -> Result<Self, Error> {
        let alternatives: Vec<String> = config
            .streaming_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(regex::escape)
            .collect();

        let extensions = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\.(?:{})$", alternatives.join("|"));
            Some(Regex::new(&pattern).map_err(|e| Error::InvalidInput(format!("streaming extensions: {e}")))?)
        };

        Ok(Self {
            extensions,
            path_segments: config
                .streaming_path_segments
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_lowercase())
                .collect(),
            passthrough_schemes: config.passthrough_schemes.iter().map(|s| s.to_lowercase()).collect(),
        })
    }

    /// Classify a request. Passthrough wins over streaming.
    pub fn classify(&self, request: &Request) -> RequestClass {
        if request.method != Method::GET {
            return RequestClass::Passthrough;
        }

        if self.passthrough_schemes.iter().any(|s| s == request.url.scheme()) {
            return RequestClass::Passthrough;
        }

        if self.is_streaming(request.url.path()) {
            return RequestClass::Streaming;
        }

        RequestClass::Cacheable
    }

    /// Whether a URL path targets streaming media.
    pub fn is_streaming(&self, path: &str) -> bool {
        if self.extensions.as_ref().is_some_and(|re| re.is_match(path)) {
            return true;
        }

        let lowered = path.to_lowercase();
        self.path_segments.iter().any(|segment| lowered.contains(segment.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    fn router() -> RequestRouter {
        RequestRouter::new(&RouterConfig::default()).unwrap()
    }

    fn get(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap()).unwrap()
    }

    #[test]
    fn test_static_assets_cacheable() {
        let router = router();
        for url in [
            "http://localhost:8080/",
            "http://localhost:8080/index.html",
            "http://localhost:8080/app.js",
            "https://unpkg.com/cloudinary-video-player@1.9.5/dist/cld-video-player.min.css",
        ] {
            assert_eq!(router.classify(&get(url)), RequestClass::Cacheable, "{url}");
        }
    }

    #[test]
    fn test_streaming_extensions() {
        let router = router();
        for url in [
            "https://cdn.example.com/clip.mp4",
            "https://cdn.example.com/clip.WEBM",
            "https://cdn.example.com/live/master.m3u8?token=abc",
            "https://cdn.example.com/dash/manifest.mpd",
        ] {
            assert_eq!(router.classify(&get(url)), RequestClass::Streaming, "{url}");
        }
    }

    #[test]
    fn test_streaming_path_segment() {
        let router = router();
        let request = get("https://res.cloudinary.com/demo/video/upload/sample");
        assert_eq!(router.classify(&request), RequestClass::Streaming);
    }

    #[test]
    fn test_extension_must_be_suffix() {
        let router = router();
        assert_eq!(router.classify(&get("https://example.com/mp4-guide.html")), RequestClass::Cacheable);
        assert_eq!(router.classify(&get("https://example.com/clip.mp4.html")), RequestClass::Cacheable);
    }

    #[test]
    fn test_non_get_passthrough() {
        let router = router();
        let url = Url::parse("https://example.com/clip.mp4").unwrap();
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            let request = Request::new(method.clone(), url.clone()).unwrap();
            assert_eq!(router.classify(&request), RequestClass::Passthrough, "{method}");
        }
    }

    #[test]
    fn test_extension_scheme_passthrough() {
        let router = router();
        let request = get("chrome-extension://abcdef/inject.js");
        assert_eq!(router.classify(&request), RequestClass::Passthrough);
        let request = get("moz-extension://1234/video.mp4");
        assert_eq!(router.classify(&request), RequestClass::Passthrough);
    }

    #[test]
    fn test_classification_deterministic() {
        let router = router();
        let request = get("https://cdn.example.com/clip.mp4");
        let first = router.classify(&request);
        for _ in 0..10 {
            assert_eq!(router.classify(&request), first);
        }
    }

    #[test]
    fn test_custom_extensions() {
        let config = RouterConfig {
            streaming_extensions: vec![".ts".into(), "".into()],
            streaming_path_segments: Vec::new(),
            passthrough_schemes: Vec::new(),
        };
        let router = RequestRouter::new(&config).unwrap();
        assert!(router.is_streaming("/seg/00001.ts"));
        assert!(!router.is_streaming("/clip.mp4"));
    }

    #[test]
    fn test_no_patterns_never_streaming() {
        let config = RouterConfig {
            streaming_extensions: Vec::new(),
            streaming_path_segments: Vec::new(),
            passthrough_schemes: Vec::new(),
        };
        let router = RequestRouter::new(&config).unwrap();
        assert_eq!(router.classify(&get("https://cdn.example.com/clip.mp4")), RequestClass::Cacheable);
    }
}
