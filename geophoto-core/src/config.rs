/// Default backend origin, the API listens on port 8080.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

/// Where the backend lives. All API paths hang off `<origin>/api`, uploaded
/// images are served relative to the bare origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    origin: String,
}

impl BackendConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Full URL for an API path such as `/photos/with-gps`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.origin, path)
    }

    /// Resolve a server-relative image path (`/uploads/abc.jpg`) against the
    /// backend origin. Empty input resolves to an empty string.
    pub fn photo_url(&self, relative: &str) -> String {
        if relative.is_empty() {
            return String::new();
        }
        if relative.starts_with("http://") || relative.starts_with("https://") {
            return relative.to_string();
        }
        if relative.starts_with('/') {
            format!("{}{}", self.origin, relative)
        } else {
            format!("{}/{}", self.origin, relative)
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}
