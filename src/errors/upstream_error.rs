use serde_json::Value;
use thiserror::Error;

/// Status reported for failures that never produced an HTTP response.
pub const TRANSPORT_STATUS: u16 = 0;

/// Outcome of a single upstream GET.
pub type UpstreamResult = Result<Value, UpstreamError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    /// Non-200 response. The body is kept verbatim.
    #[error("Finnhub Error {status}: {body}")]
    Status { status: u16, body: String },

    /// DNS, connect, reset or timeout: no response was received.
    #[error("Finnhub request failed: {message}")]
    Transport { message: String, timed_out: bool },

    /// 200 with a body that is not JSON or not the expected shape.
    #[error("Finnhub returned an unreadable response ({status}): {message}")]
    Decode { status: u16, message: String },
}

impl UpstreamError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn decode(status: u16, message: impl Into<String>) -> Self {
        Self::Decode {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Status { status, .. } | Self::Decode { status, .. } => *status,
            Self::Transport { .. } => TRANSPORT_STATUS,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        let timed_out = err.is_timeout();
        Self::Transport {
            message: err.without_url().to_string(),
            timed_out,
        }
    }
}
