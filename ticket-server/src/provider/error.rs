//! Ticket provider client error types.

use std::fmt;

/// Errors from the ticket provider HTTP client.
#[derive(Debug)]
pub enum ProviderError {
    /// HTTP transport failed (network error).
    Http(reqwest::Error),

    /// The provider did not answer within the request budget.
    Unavailable,

    /// Response body could not be decoded.
    Json {
        message: String,
        body: Option<String>,
    },

    /// Provider answered with an error status or error envelope code.
    Api { status: u16, message: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Http(e) => write!(f, "HTTP error: {e}"),
            ProviderError::Unavailable => write!(f, "ticket source unavailable (timed out)"),
            ProviderError::Json { message, body } => {
                write!(f, "response parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            ProviderError::Api { status, message } => {
                write!(f, "ticket source error {status}: {message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Unavailable
        } else {
            ProviderError::Http(err)
        }
    }
}
