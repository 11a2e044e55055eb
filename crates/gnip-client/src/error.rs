//! Error types for the Gnip client

use std::fmt;

/// Errors that can occur when talking to the Gnip rules and stream endpoints
#[derive(Debug)]
pub enum GnipError {
    /// Rule set could not be serialized; raised before any request is sent
    Encode(serde_json::Error),
    /// Request could not be built or the network call failed
    Transport(Box<reqwest::Error>),
    /// Response body was not a rules envelope
    Decode(serde_json::Error),
    /// Remote service answered with a non-success status
    Api { status: u16, body: String },
}

impl GnipError {
    /// HTTP status of an `Api` error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for GnipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "Rule encoding error: {}", e),
            Self::Transport(e) => write!(f, "Transport error: {}", e),
            Self::Decode(e) => write!(f, "Rules decode error: {}", e),
            Self::Api { status, body } => {
                write!(f, "Gnip API returned status {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for GnipError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(e) | Self::Decode(e) => Some(e),
            Self::Transport(e) => Some(e.as_ref()),
            Self::Api { .. } => None,
        }
    }
}

impl From<reqwest::Error> for GnipError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}

/// Result type for Gnip client operations
pub type Result<T> = std::result::Result<T, GnipError>;
