use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackerErrorCode {
    InvalidArgument,
    Network,
    SinkUnavailable,
    Internal,
}

impl TrackerErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerErrorCode::InvalidArgument => "erralytics/invalid-argument",
            TrackerErrorCode::Network => "erralytics/network",
            TrackerErrorCode::SinkUnavailable => "erralytics/sink-unavailable",
            TrackerErrorCode::Internal => "erralytics/internal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerError {
    pub code: TrackerErrorCode,
    message: String,
}

impl TrackerError {
    pub fn new(code: TrackerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for TrackerError {}

pub type TrackerResult<T> = Result<T, TrackerError>;

pub fn invalid_argument(message: impl Into<String>) -> TrackerError {
    TrackerError::new(TrackerErrorCode::InvalidArgument, message)
}

pub fn network_error(message: impl Into<String>) -> TrackerError {
    TrackerError::new(TrackerErrorCode::Network, message)
}

pub fn sink_unavailable(message: impl Into<String>) -> TrackerError {
    TrackerError::new(TrackerErrorCode::SinkUnavailable, message)
}

pub fn internal_error(message: impl Into<String>) -> TrackerError {
    TrackerError::new(TrackerErrorCode::Internal, message)
}
