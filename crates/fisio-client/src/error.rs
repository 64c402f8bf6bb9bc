use fisio_core::error::CoreError;
use thiserror::Error;

/// Coarse classification of a failure, fixed where the failure originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The network could not be reached. Routed to the offline store.
    Connectivity,
    /// The server rejected the credential (401/403).
    Auth,
    /// Validation or server-reported errors, shown verbatim.
    Application,
    /// The owning request scope was cancelled.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network unreachable: {0}")]
    Connectivity(String),

    #[error("session expired (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("{message}")]
    Application { status: Option<u16>, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid data: {0}")]
    Core(#[from] CoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connectivity(_) => ErrorKind::Connectivity,
            Self::Unauthorized { .. } => ErrorKind::Auth,
            Self::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::Application,
        }
    }

    /// The front end must drop back to the login screen.
    pub fn requires_login(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            status: None,
            message: message.into(),
        }
    }
}
