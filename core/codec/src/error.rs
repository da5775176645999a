use dotkit_primitives::PrimitivesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unknown call index {pallet_index}:{call_index}")]
    UnknownCallIndex { pallet_index: u8, call_index: u8 },

    #[error("Unsupported call: {pallet}.{method}")]
    UnsupportedCall { pallet: String, method: String },

    #[error("Call layout mismatch for {pallet}.{method}: expected fields {expected:?}, found {found:?}")]
    LayoutMismatch {
        pallet: String,
        method: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Unsupported signed extension: {0}")]
    UnsupportedExtension(String),

    #[error("Unsupported extrinsic version: {0}")]
    UnsupportedExtrinsicVersion(u8),

    #[error("Unsupported signature scheme: {0}")]
    UnsupportedSignature(u8),

    #[error("Call nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("Trailing bytes after {context}: {remaining}")]
    TrailingBytes { context: &'static str, remaining: usize },

    #[error("Registry error: {0}")]
    Registry(#[from] PrimitivesError),
}

impl From<parity_scale_codec::Error> for CodecError {
    fn from(err: parity_scale_codec::Error) -> Self {
        CodecError::Decode(err.to_string())
    }
}
