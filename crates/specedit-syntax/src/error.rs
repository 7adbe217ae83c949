//! Error taxonomy shared by the tokenizer, parser, model and renderer.

use crate::model::StatementKind;

/// Errors raised while reading, querying or writing a spec model.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// An unexpected token was found where a specific one was required.
    #[error("Unexpected token '{token}' on line {line}: {message}")]
    BadToken {
        token: String,
        line: usize,
        message: String,
    },

    /// An unterminated or malformed `%if`.
    #[error("Unterminated conditional starting on line {line}: {message}")]
    BadIf { line: usize, message: String },

    /// A requested section, package or definition does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The operation is accepted by the API but not supported for this construct.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A buffer or stream pointer moved out of bounds.
    #[error("Index out of bounds: {0}")]
    BadIndex(String),

    /// No renderer is registered for a statement kind.
    #[error("No renderer registered for {0}")]
    MissingRenderer(StatementKind),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl SpecError {
    pub(crate) fn bad_token(token: &crate::Token, message: impl Into<String>) -> Self {
        SpecError::BadToken {
            token: token.to_string(),
            line: token.line,
            message: message.into(),
        }
    }

    /// Source line the error points at, if it refers to a token.
    pub fn line(&self) -> Option<usize> {
        match self {
            SpecError::BadToken { line, .. } | SpecError::BadIf { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// `BadIf` is a specialization of `BadToken`.
    pub fn is_bad_token(&self) -> bool {
        matches!(self, SpecError::BadToken { .. } | SpecError::BadIf { .. })
    }
}

pub type Result<T, E = SpecError> = std::result::Result<T, E>;
