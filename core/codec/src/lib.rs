//! SCALE codec for calls and extrinsics, driven by a [`TypeRegistry`].
//!
//! [`TypeRegistry`]: dotkit_primitives::TypeRegistry

pub mod call;
pub mod era;
pub mod error;
pub mod extrinsic;
pub mod intent;

pub use call::{methods, pallets, Call, MAX_CALL_DEPTH};
pub use era::Era;
pub use error::CodecError;
pub use extrinsic::{
    attach_signature, decode_extrinsic, signable_payload, signing_payload, transaction_id, BaseTxInfo,
    DecodedExtrinsic, ExtrinsicBody, EXTRINSIC_VERSION,
};
pub use intent::{decode_call, encode_call, DecodedCall, TransactionIntent};
