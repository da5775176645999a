use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrimitivesError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Metadata decode error: {0}")]
    MetadataDecode(String),

    #[error("Unsupported metadata version: {0}")]
    UnsupportedMetadataVersion(u32),

    #[error("Pallet not found: {0}")]
    PalletNotFound(String),

    #[error("Call not found: {pallet}.{method}")]
    CallNotFound { pallet: String, method: String },

    #[error("Constant not found: {pallet}.{name}")]
    ConstantNotFound { pallet: String, name: String },

    #[error("Constant {name} does not fit in u128 ({len} bytes)")]
    ConstantTooWide { name: String, len: usize },

    #[error("Unknown proxy type: {0}")]
    UnknownProxyType(String),
}
