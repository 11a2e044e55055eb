//! Error types for the Gnip consumer

use gnip_client::GnipError;
use std::fmt;

#[derive(Debug)]
pub enum ConsumerError {
    Gnip(GnipError),
    Config(String),
    Io(std::io::Error),
    Task(tokio::task::JoinError),
    MaxReconnectAttempts,
}

impl fmt::Display for ConsumerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumerError::Gnip(err) => write!(f, "Gnip error: {}", err),
            ConsumerError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ConsumerError::Io(err) => write!(f, "I/O error: {}", err),
            ConsumerError::Task(err) => write!(f, "Consumer task failed: {}", err),
            ConsumerError::MaxReconnectAttempts => write!(f, "Max reconnection attempts reached"),
        }
    }
}

impl std::error::Error for ConsumerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConsumerError::Gnip(err) => Some(err),
            ConsumerError::Io(err) => Some(err),
            ConsumerError::Task(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GnipError> for ConsumerError {
    fn from(err: GnipError) -> Self {
        ConsumerError::Gnip(err)
    }
}

impl From<std::io::Error> for ConsumerError {
    fn from(err: std::io::Error) -> Self {
        ConsumerError::Io(err)
    }
}

impl From<tokio::task::JoinError> for ConsumerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ConsumerError::Task(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for ConsumerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ConsumerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConsumerError>;
