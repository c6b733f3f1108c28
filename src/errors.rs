//! Shared error types for pipeline orchestration.
//!
//! Every fatal condition the engine can hit falls into one of three
//! categories: tokenization (bad quoting in the raw argument list),
//! addressing (a `@target.option` reference that cannot be resolved), and
//! registry (a stage name no loader knows). Stage-local failures surfaced by
//! collaborator implementations are wrapped in [`PipelineError::StageFailure`].
//!
//! All of these abort the run immediately; the distinct, non-fatal
//! "do not proceed" signal is [`crate::stage::Proceed::Stop`], which is not
//! an error at all.

use thiserror::Error;

/// Main error type for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Unbalanced double quote in the raw argument list.
    #[error("unmatched double quote in argument list")]
    UnmatchedQuote,

    /// An explicit pipe reference that is not `target.option`.
    #[error("invalid option piping '{reference}': expected [name[-id]].option")]
    InvalidPipeSyntax { reference: String },

    /// No earlier stage matches the referenced name (and id, if given).
    #[error("cannot resolve stage '{reference}' piped into '{consumer}'")]
    UnresolvedStage { reference: String, consumer: String },

    /// The referenced stage exists but exposes no such option.
    #[error("stage '{stage}' has no option named '{option}'")]
    UnresolvedOption { stage: String, option: String },

    /// The registry cannot instantiate a stage by this name.
    #[error("unknown stage '{0}'")]
    UnknownStage(String),

    /// A collaborator stage reported a failure from one of its hooks.
    #[error("stage '{stage}': {message}")]
    StageFailure { stage: String, message: String },

    /// IO errors from stage hooks that touch the filesystem.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapped external errors.
    #[error(transparent)]
    External(#[from] anyhow::Error),
}

impl PipelineError {
    /// Create an invalid-piping error from the offending reference.
    pub fn invalid_pipe(reference: impl Into<String>) -> Self {
        Self::InvalidPipeSyntax {
            reference: reference.into(),
        }
    }

    /// Create an unresolved-stage error.
    pub fn unresolved_stage(reference: impl Into<String>, consumer: impl Into<String>) -> Self {
        Self::UnresolvedStage {
            reference: reference.into(),
            consumer: consumer.into(),
        }
    }

    /// Create an unresolved-option error.
    pub fn unresolved_option(stage: impl Into<String>, option: impl Into<String>) -> Self {
        Self::UnresolvedOption {
            stage: stage.into(),
            option: option.into(),
        }
    }

    /// Create a stage-local failure.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageFailure {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Coarse category name, used when reporting to the operator.
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnmatchedQuote => "tokenization",
            Self::InvalidPipeSyntax { .. }
            | Self::UnresolvedStage { .. }
            | Self::UnresolvedOption { .. } => "addressing",
            Self::UnknownStage(_) => "registry",
            Self::StageFailure { .. } => "stage",
            Self::Io(_) | Self::External(_) => "io",
        }
    }
}

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(PipelineError::UnmatchedQuote.category(), "tokenization");
        assert_eq!(PipelineError::invalid_pipe("x").category(), "addressing");
        assert_eq!(
            PipelineError::unresolved_stage("r-0", "viewer").category(),
            "addressing"
        );
        assert_eq!(
            PipelineError::UnknownStage("nope".into()).category(),
            "registry"
        );
        assert_eq!(PipelineError::stage("reader", "boom").category(), "stage");
    }

    #[test]
    fn test_display_messages() {
        let err = PipelineError::unresolved_option("reader-0", "ofile");
        assert!(err.to_string().contains("reader-0"));
        assert!(err.to_string().contains("ofile"));

        let err = PipelineError::invalid_pipe("reader-0");
        assert!(err.to_string().contains("invalid option piping"));
    }
}
