//! Error types for the `meeting-broker` crate.
//!
//! Follows a root Error struct holding an error kind plus an optional source
//! for error chaining.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for meeting-broker.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in meeting-broker.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    Exchange(ExchangeErrorKind),
    Token(TokenErrorKind),
    Http(HttpErrorKind),
}

/// Errors from static configuration.
///
/// Fatal to the requested operation, never to the process.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    /// One or more required configuration values are absent. The message
    /// names every missing variable.
    MissingValue,
    InvalidUrl,
}

/// Errors from a token exchange with the provider.
#[derive(Debug, PartialEq)]
pub enum ExchangeErrorKind {
    /// The provider answered with a non-2xx status. The message carries the
    /// provider's status code and error payload.
    Denied,
    /// The exchange did not complete within the configured timeout. Stored
    /// credential state is left untouched.
    Timeout,
    Network,
    /// The provider answered 2xx but the payload did not parse.
    InvalidResponse,
}

/// Errors from credential state.
#[derive(Debug, PartialEq)]
pub enum TokenErrorKind {
    /// No credential record exists yet; the caller must initiate authorization.
    NotConnected,
    /// The stored record has no refresh token. Terminal for the delegated
    /// flow until a human repeats authorization.
    MissingRefreshToken,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config(kind) => write!(f, "configuration error: {:?}", kind),
            ErrorKind::Exchange(kind) => write!(f, "token exchange error: {:?}", kind),
            ErrorKind::Token(kind) => write!(f, "token error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_timeout() {
            ErrorKind::Exchange(ExchangeErrorKind::Timeout)
        } else if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Config(ConfigErrorKind::InvalidUrl),
        }
    }
}

/// Helper function to create a config error naming the missing variables.
pub fn missing_config(variables: &[&str]) -> Error {
    Error {
        source: Some(
            format!("missing configuration: {}", variables.join(", ")).into(),
        ),
        error_kind: ErrorKind::Config(ConfigErrorKind::MissingValue),
    }
}

/// Helper function to create exchange errors.
pub fn exchange_error(kind: ExchangeErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Exchange(kind),
    }
}

/// Helper function to create a denied-exchange error carrying the provider's
/// status and error payload.
pub fn exchange_denied(status: u16, body: &str) -> Error {
    Error {
        source: Some(format!("provider returned {status}: {body}").into()),
        error_kind: ErrorKind::Exchange(ExchangeErrorKind::Denied),
    }
}

/// Helper function to create token errors.
pub fn token_error(kind: TokenErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Token(kind),
    }
}
