//! Error types shared by the mapping layer and the station.

use std::fmt;

use thiserror::Error;

/// What is wrong with a mandatory section of a provider payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect {
    Missing,
    WrongType,
    Empty,
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Defect::Missing => "is missing",
            Defect::WrongType => "has an unexpected type",
            Defect::Empty => "is empty",
        })
    }
}

/// Error raised while mapping a raw object into domain records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A mandatory key of the payload could not be used.
    #[error("malformed payload: `{key}` {defect}")]
    MalformedPayload { key: String, defect: Defect },
}

impl ModelError {
    pub(crate) fn malformed(key: impl Into<String>, defect: Defect) -> Self {
        ModelError::MalformedPayload { key: key.into(), defect }
    }

    /// Key that made the payload unusable.
    pub fn key(&self) -> &str {
        match self {
            ModelError::MalformedPayload { key, .. } => key,
        }
    }
}

/// The HTTP collaborator failed before a status code was received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transport failure: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Failed fetch. Returned by every station operation that talks to the provider.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FetchError {
    /// The provider answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body could not be decoded as JSON at all.
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error(transparent)]
    Payload(#[from] ModelError),

    /// Neither the call nor the station supplied a latitude/longitude.
    #[error("no position: pass coordinates or call `set_position` first")]
    MissingPosition,
}

impl FetchError {
    /// HTTP status code, when the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_payload_names_the_key() {
        let err = ModelError::malformed("weather", Defect::Empty);
        assert_eq!(err.key(), "weather");
        assert_eq!(err.to_string(), "malformed payload: `weather` is empty");
    }

    #[test]
    fn status_only_reported_for_status_errors() {
        let err = FetchError::Status { status: 404, body: "city not found".into() };
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("404"));

        let err = FetchError::from(TransportError::new("connection refused"));
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "transport failure: connection refused");
    }
}
