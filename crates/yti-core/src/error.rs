use thiserror::Error;

/// Errors from standup gateway providers.
///
/// The parsing, normalization and rendering pipeline is total and has no
/// error type of its own; only the network edge can fail.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Failed(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
