//! Chain-level primitives shared by the codec, the builders and the wallet:
//! account identifiers and SS58 addresses, ed25519 keys, chain material and
//! the type registry parsed from runtime metadata.

pub mod address;
pub mod cache;
pub mod error;
pub mod keypair;
pub mod material;
pub mod registry;
pub mod runtime;
pub mod types;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use address::{decode_address, encode_address, is_valid_address, parse_account, AddressFormat};
pub use cache::RegistryCache;
pub use error::PrimitivesError;
pub use keypair::{verify_signature, KeyPair};
pub use material::{Material, RegistryKey};
pub use registry::{CallInfo, PalletInfo, SignedExtensionInfo, TypeRegistry};
pub use runtime::{ProxyType, RewardDestination};
pub use types::{blake2_256, decode_hex, AccountId, Hash};
