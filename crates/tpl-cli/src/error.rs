//! Error types for tpl-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from tpl-fs
    #[error(transparent)]
    Fs(#[from] tpl_fs::Error),

    /// Error from tpl-transfer
    #[error(transparent)]
    Transfer(#[from] tpl_transfer::Error),

    /// Registry construction error
    #[error(transparent)]
    Registry(#[from] tpl_actions::RegistryError),

    /// Failure raised by an action body
    #[error("action failed: {0}")]
    Action(#[from] tpl_actions::ActionError),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Interactive prompt error
    #[error("Interactive prompt error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    /// JSON output error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
