use thiserror::Error;

/// Top-level error type for todo.
#[derive(Debug, Error)]
pub enum TodoError {
    /// A date that is not a valid `YYYYMMDD` calendar date.
    #[error("invalid date format: {0}")]
    InvalidDate(String),

    /// A repeat rule with a known kind but malformed parameters.
    #[error("invalid repeat rule: {0}")]
    InvalidRepeat(String),

    /// A repeat rule whose kind is not supported.
    #[error("unsupported repeat type: {0}")]
    UnsupportedRepeat(String),

    /// A request that fails field validation (e.g. missing title).
    #[error("{0}")]
    Validation(String),

    /// No task with the given id.
    #[error("task not found: {0}")]
    NotFound(i64),

    /// Storage read/write error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

impl TodoError {
    /// Whether the error was caused by bad caller input rather than the system.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidDate(_)
                | Self::InvalidRepeat(_)
                | Self::UnsupportedRepeat(_)
                | Self::Validation(_)
        )
    }
}
