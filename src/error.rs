use thiserror::Error;

/// Every failure the client core can surface to the presentation layer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// Bad local input; never reaches the network.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("email already registered")]
    EmailInUse,

    /// No token held, or the held token is known to be expired.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Backend answered 401; the session has been torn down.
    #[error("authentication rejected by backend")]
    AuthRejected,

    #[error("{mode} scans hold at most {max} image(s)")]
    CapacityExceeded { mode: &'static str, max: usize },

    #[error("an upload is already in progress")]
    AlreadyInProgress,

    #[error("operation not allowed now: {0}")]
    InvalidState(&'static str),

    /// Transport failure, no response received.
    #[error("network error: {0}")]
    Network(String),

    #[error("backend error {status}: {body}")]
    Backend { status: u16, body: String },

    /// 2xx with a payload that cannot be used.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    /// Only a backend rejection forces re-authentication; everything else
    /// leaves local state usable for a retry.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ClientError::AuthRejected)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Backend { status, .. } => Some(*status),
            ClientError::AuthRejected => Some(401),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
