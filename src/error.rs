//! Error types and handling for `RouteBoard`

use thiserror::Error;

/// Main error type for the `RouteBoard` application
#[derive(Error, Debug)]
pub enum BoardError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API communication errors
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Malformed data in an upstream response
    #[error("Parse error: {message}")]
    Parse { message: String },
}

impl BoardError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error with an optional HTTP status
    pub fn api<S: Into<String>>(message: S, status: Option<u16>) -> Self {
        Self::Api {
            message: message.into(),
            status,
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// HTTP status of the failed upstream call, when one was received
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            BoardError::Api { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BoardError {
    fn from(error: reqwest::Error) -> Self {
        Self::Api {
            message: error.to_string(),
            status: error.status().map(|s| s.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = BoardError::config("missing webhook URL");
        assert!(matches!(config_err, BoardError::Config { .. }));

        let api_err = BoardError::api("connection failed", Some(503));
        assert!(matches!(api_err, BoardError::Api { .. }));
        assert_eq!(api_err.status(), Some(503));

        let parse_err = BoardError::parse("bad timestamp");
        assert!(matches!(parse_err, BoardError::Parse { .. }));
        assert_eq!(parse_err.status(), None);
    }

    #[test]
    fn test_error_messages() {
        let api_err = BoardError::api("route query timed out", None);
        assert!(api_err.to_string().contains("route query timed out"));

        let config_err = BoardError::config("test");
        assert!(config_err.to_string().contains("Configuration error"));
    }
}
