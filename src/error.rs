use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{endpoint} returned status {status}")]
    Status {
        endpoint: String,
        status: StatusCode,
    },

    #[error("Malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Whether offering the user a retry makes sense
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Status { status, .. } => status.is_server_error(),
            ClientError::Decode { .. } => false,
        }
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_server_errors_are_retryable() {
        let server = ClientError::Status {
            endpoint: "/api/properties".into(),
            status: StatusCode::BAD_GATEWAY,
        };
        let client = ClientError::Status {
            endpoint: "/api/properties".into(),
            status: StatusCode::BAD_REQUEST,
        };

        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert_eq!(server.to_string(), "/api/properties returned status 502 Bad Gateway");
    }
}
