use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("load cancelled")]
    Cancelled,

    #[error("invalid URL `{input}`: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("request failed with HTTP {status} for {url}")]
    HttpStatus { status: StatusCode, url: String },

    #[error("invalid content from {url}: {reason}")]
    InvalidContent { url: String, reason: String },

    #[error("operation timed out: {reason}")]
    Timeout { reason: String },

    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl LoaderError {
    pub fn invalid_url(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn http_status(status: StatusCode, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Cancelled | Self::InvalidUrl { .. } | Self::InvalidContent { .. } => false,
            Self::HttpStatus { status, .. } => {
                status.is_server_error()
                    || matches!(
                        *status,
                        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
                    )
            }
            // Builder and redirect-loop errors repeat identically.
            Self::Network { source } => {
                source.is_connect() || source.is_timeout() || source.is_request() || source.is_body()
            }
            Self::Timeout { .. } | Self::Internal { .. } => true,
        }
    }
}
