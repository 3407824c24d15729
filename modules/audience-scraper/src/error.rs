use browserless_client::BrowserlessError;

/// Result type alias for scrape operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Access restricted or login required: {0}")]
    AccessRestricted(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Data elements not found: {0}")]
    ElementNotFound(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Browser session failed: {0}")]
    Browser(#[from] BrowserlessError),

    #[error("Session pool unavailable: {0}")]
    Pool(String),

    #[error("Extraction panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScrapeError::Timeout(err.to_string())
        } else {
            ScrapeError::Network(err.to_string())
        }
    }
}
