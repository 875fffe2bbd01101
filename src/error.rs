use thiserror::Error;

/// Errors raised by the recurrence core and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// A recurrence or task setting violates its invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Calendar arithmetic left the representable date range.
    #[error("computed instant is out of the supported date range")]
    OutOfRange,

    #[error("task '{0}' not found")]
    TaskNotFound(String),

    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    #[error("'{0}' already exists")]
    DuplicateName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }
}
