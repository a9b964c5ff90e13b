//! Error types for request construction, transport and decoding.

use thiserror::Error;

use crate::task::TaskState;

/// Top-level routing error.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The request violated a construction-time invariant. Never reaches the network.
    #[error("invalid routing configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),

    /// The HTTP exchange itself failed.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The service answered but reported a non-OK status.
    #[error("service returned status {status}{}", format_message(.message))]
    ServiceStatus {
        status: String,
        message: Option<String>,
    },

    /// The body did not match the expected document shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A task lifecycle operation was invoked from the wrong state.
    #[error("cannot {action} a task in state {state:?}")]
    IllegalState {
        action: &'static str,
        state: TaskState,
    },
}

impl From<serde_json::Error> for RoutingError {
    fn from(err: serde_json::Error) -> Self {
        RoutingError::MalformedResponse(err.to_string())
    }
}

impl From<PolylineError> for RoutingError {
    fn from(err: PolylineError) -> Self {
        RoutingError::MalformedResponse(err.to_string())
    }
}

fn format_message(message: &Option<String>) -> String {
    match message {
        Some(text) => format!(": {}", text),
        None => String::new(),
    }
}

/// Invariant violated while building a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("at least two waypoints are required to route between, got {count}")]
    TooFewWaypoints { count: usize },

    #[error("optimize needs at least three waypoints, got {count}")]
    OptimizeNeedsViaPoints { count: usize },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Failure reported by a non-reqwest transport.
    #[error("{0}")]
    Other(String),
}

/// Failure decoding an encoded polyline string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolylineError {
    #[error("invalid polyline character {character:?} at byte {index}")]
    InvalidCharacter { character: char, index: usize },

    #[error("polyline ended inside a coordinate chunk")]
    Truncated,

    #[error("polyline has a latitude without a longitude")]
    UnpairedCoordinate,

    #[error("polyline value at byte {index} is too long")]
    Overflow { index: usize },

    #[error("polyline point ({lat}, {lng}) is outside valid coordinates")]
    OutOfRange { lat: f64, lng: f64 },

    #[error("polyline could not be decoded: {0}")]
    Invalid(String),
}
