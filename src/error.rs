use crate::delivery::Destination;
use http::Method;
use std::{error::Error as StdError, io};
use thiserror::Error;
use url::Url;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error type request handlers fail with.
pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    Handler,
    Transport,
    Output,
    InvalidConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

/// All errors surfaced by a performed call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The request handler failed or produced an unusable response.
    #[error("Request handler failed during {method} {url}: {source}")]
    Handler {
        method: Method,
        /// Sanitized URL: no query/fragment/userinfo.
        url: Box<Url>,
        #[source]
        source: BoxError,
    },

    #[error("Transport error during {method} {path}: {source}")]
    Transport {
        method: Method,
        path: Box<str>,
        kind: TransportErrorKind,
        #[source]
        source: BoxError,
    },

    /// The response body could not be written to its destination.
    #[error("Failed to deliver response body to {destination}: {source}")]
    Output {
        destination: Destination,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: Box<str>,
        #[source]
        source: Option<BoxError>,
    },
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Handler { .. } => ErrorKind::Handler,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Output { .. } => ErrorKind::Output,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }

    #[must_use]
    pub fn is_handler_failure(&self) -> bool {
        matches!(self, Self::Handler { .. })
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                kind: TransportErrorKind::Timeout,
                ..
            }
        )
    }

    pub(crate) fn invalid_config(message: impl Into<Box<str>>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_message_names_the_call() {
        let err = Error::Handler {
            method: Method::GET,
            url: Box::new(Url::parse("https://example.com/a").unwrap()),
            source: "cassette exhausted".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Handler);
        assert!(err.is_handler_failure());
        assert_eq!(
            err.to_string(),
            "Request handler failed during GET https://example.com/a: cassette exhausted"
        );
    }

    #[test]
    fn output_error_reports_destination() {
        let err = Error::Output {
            destination: Destination::Stdout,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "closed"),
        };
        assert_eq!(err.kind(), ErrorKind::Output);
        assert_eq!(
            err.to_string(),
            "Failed to deliver response body to stdout: closed"
        );
    }
}
