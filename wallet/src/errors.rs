use dotkit_builder::BuilderError;
use dotkit_codec::CodecError;
use dotkit_primitives::PrimitivesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Primitives error: {0}")]
    Primitives(#[from] PrimitivesError),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Key derivation error: {0}")]
    Derivation(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Did not find address with funds to recover in [{start}, {end})")]
    NoFundedAddressFound { start: u32, end: u32 },

    #[error("Invalid scan range: start {start}, end {end}")]
    InvalidScanRange { start: u32, end: u32 },

    #[error("Scan cancelled at index {0}")]
    Cancelled(u32),

    #[error("Invalid sweep: {0}")]
    InvalidSweep(String),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
