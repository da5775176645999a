use dotkit_codec::CodecError;
use dotkit_primitives::PrimitivesError;
use thiserror::Error;

/// A field failed its local or holistic check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(field, "is required")
    }

    pub fn negative(field: &str) -> Self {
        Self::new(field, "Value cannot be less than zero")
    }

    pub fn mismatch(field: &str, expected: impl std::fmt::Display, actual: impl std::fmt::Display) -> Self {
        Self::new(field, format!("expected {}, got {}", expected, actual))
    }
}

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Decode error: {0}")]
    Decode(CodecError),

    #[error("Unsupported transaction type: {0}")]
    UnsupportedTransactionType(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Registry error: {0}")]
    Registry(#[from] PrimitivesError),
}

impl From<CodecError> for BuilderError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::UnsupportedCall { pallet, method } => {
                BuilderError::UnsupportedTransactionType(format!("{}.{}", pallet, method))
            }
            CodecError::Registry(err) => BuilderError::Registry(err),
            other => BuilderError::Decode(other),
        }
    }
}
