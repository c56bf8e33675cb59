//! Error types for tpl-actions

/// Result type for registry construction
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that abort registry construction.
///
/// Registration errors are configuration mistakes, not runtime conditions:
/// the build fails as a whole and no partial tree is handed out.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate action {name:?} under category {path:?}")]
    DuplicateAction { path: String, name: String },

    #[error("action {name:?} registered with an empty category path")]
    EmptyCategoryPath { name: String },
}

/// Opaque failure raised by an action body.
///
/// The registry and runner treat it as a rendered message plus an optional
/// source; what went wrong inside the action stays the action's business.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
