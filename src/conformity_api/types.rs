use crate::conformity_api::transport::{ApiRequest, TransportError};
use serde_json::Value;
use std::fmt;

/// Cloud Conformity client error type
///
/// Represents everything that can go wrong when building a client or
/// calling the Cloud Conformity API.
#[derive(Debug)]
pub enum ConformityError {
    /// API request failed (remote rejection, no response, setup or parse failure)
    Api(ApiError),
    /// Configuration error
    Config(String),
}

impl ConformityError {
    /// The API failure behind this error, if any
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            ConformityError::Api(err) => Some(err),
            ConformityError::Config(_) => None,
        }
    }
}

impl fmt::Display for ConformityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConformityError::Api(err) => write!(f, "API error: {}", err),
            ConformityError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ConformityError {}

impl From<ApiError> for ConformityError {
    fn from(err: ApiError) -> Self {
        ConformityError::Api(err)
    }
}

/// API-specific errors
///
/// The first three variants mirror the ways a call can fail on the wire:
/// the server rejected it, nothing came back, or it never left the client.
#[derive(Debug)]
pub enum ApiError {
    /// Server answered with a non-2xx status. `body` is the server's
    /// error document, unchanged.
    Remote { status: u16, body: Value },
    /// The request was dispatched but no response was received
    NoResponse {
        request: Box<ApiRequest>,
        reason: String,
    },
    /// The request could not be built or dispatched
    Setup(String),
    /// A 2xx document lacked the member the operation unwraps
    Parse(String),
}

impl ApiError {
    /// HTTP status of a remote rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build the error for a failed transport call, keeping the outbound
    /// request as the payload when nothing came back.
    pub(crate) fn from_transport(err: TransportError, request: ApiRequest) -> Self {
        match err {
            TransportError::NoResponse(reason) => ApiError::NoResponse {
                request: Box::new(request),
                reason,
            },
            TransportError::Setup(msg) => ApiError::Setup(msg),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Remote { status, body } => write!(f, "HTTP {} error: {}", status, body),
            ApiError::NoResponse { request, reason } => write!(
                f,
                "No response for {} {}: {}",
                request.method,
                request.joined_url(),
                reason
            ),
            ApiError::Setup(msg) => write!(f, "Request error: {}", msg),
            ApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
