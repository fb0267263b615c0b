use thiserror::Error;

/// Caller defects reported by the engine and the wizard.
///
/// Neither variant is retryable: the presentation layer should never produce
/// them when its sliders and buttons are wired to the documented ranges.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("no transition from step '{step}' for option '{option}'")]
    InvalidTransition { step: String, option: String },
}

impl EngineError {
    pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
