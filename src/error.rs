//! Error types for SEULA

use thiserror::Error;

/// Result type alias for SEULA operations
pub type Result<T> = std::result::Result<T, SeulaError>;

/// Main error type for SEULA
#[derive(Error, Debug)]
#[allow(clippy::result_large_err)]
pub enum SeulaError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Stream message carried no recognizable processing phase
    #[error("message carried no recognizable processing phase")]
    InvalidPhase,

    /// Mutation attempted after the request was cancelled or completed
    #[error("request context is finished, mutation rejected")]
    ContextFinished,

    /// Processor callback error
    #[error("processor '{processor}' error: {message}")]
    Processor { processor: String, message: String },

    /// gRPC transport error
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// gRPC status error
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SeulaError> for tonic::Status {
    fn from(err: SeulaError) -> Self {
        match err {
            SeulaError::Config(msg) => tonic::Status::invalid_argument(msg),
            SeulaError::InvalidPhase => {
                tonic::Status::internal("message carried no recognizable processing phase")
            }
            SeulaError::ContextFinished => {
                tonic::Status::internal("request context is finished")
            }
            SeulaError::Processor { processor, message } => {
                tonic::Status::internal(format!("processor '{processor}' failed: {message}"))
            }
            SeulaError::Transport(e) => tonic::Status::unavailable(e.to_string()),
            SeulaError::Grpc(status) => status,
            SeulaError::Io(e) => tonic::Status::internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_error_display() {
        let err = SeulaError::Processor {
            processor: "dedup".to_string(),
            message: "digest collision".to_string(),
        };
        assert_eq!(err.to_string(), "processor 'dedup' error: digest collision");
    }

    #[test]
    fn test_status_mapping() {
        let status: tonic::Status = SeulaError::InvalidPhase.into();
        assert_eq!(status.code(), tonic::Code::Internal);

        let status: tonic::Status = SeulaError::Config("bad port".to_string()).into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert_eq!(status.message(), "bad port");
    }
}
