//! Error type for forge API calls

use thiserror::Error;

/// Failure of a single forge API call
#[derive(Debug, Error)]
pub enum ForgeError {
    /// The forge rejected the access token (HTTP 401)
    #[error("authentication failed, check the access token")]
    Authentication,

    /// The requested resource does not exist or is not visible to the token
    #[error("{what} not found")]
    NotFound { what: String },

    /// Any other non-success HTTP status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Connection, timeout or body read failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured forge URL cannot be used to build API URLs
    #[error("invalid forge URL: {0}")]
    InvalidUrl(String),

    /// A response body or file payload could not be decoded
    #[error("could not decode {what}: {reason}")]
    Decode { what: String, reason: String },
}

impl ForgeError {
    pub fn decode(what: impl Into<String>, reason: impl ToString) -> Self {
        ForgeError::Decode {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the error means the token itself is unusable
    pub fn is_authentication(&self) -> bool {
        matches!(self, ForgeError::Authentication)
    }
}
