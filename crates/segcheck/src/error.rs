use reqwest::StatusCode;

/// Errors raised while fetching playlists and segments
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Network error while fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server returned status code {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("Response from {url} is not valid UTF-8: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),
}

impl CheckError {
    /// The URL the failing request targeted, when there was one
    pub fn url(&self) -> Option<&str> {
        match self {
            CheckError::Network { url, .. }
            | CheckError::Status { url, .. }
            | CheckError::Decode { url, .. }
            | CheckError::InvalidUrl { url, .. } => Some(url),
            CheckError::Client(_) | CheckError::Tls(_) => None,
        }
    }

    /// Whether the server answered with a non-success status
    pub fn is_status(&self) -> bool {
        matches!(self, CheckError::Status { .. })
    }
}
