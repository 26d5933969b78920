//! Error types for the page fetcher.

/// Errors that can occur when fetching a page.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The request never produced a response (connection, DNS, timeout, or body read failure).
    #[error("Transport failure: {message}")]
    Transport { message: String },
    /// The site answered with a non-success status. `body` is a bounded excerpt.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The base URL and path did not combine into a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The underlying HTTP client could not be built from the given settings.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl Error {
    /// Whether another attempt could plausibly succeed. Only transport failures qualify;
    /// a status response means the parameters or the site logic are at fault.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport {
            message: e.to_string(),
        }
    }
}
