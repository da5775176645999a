// core/primitives/src/types.rs

use crate::error::PrimitivesError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 256-bit blake2b digest, the hash used for block hashes, transaction ids
/// and oversized signing payloads.
pub fn blake2_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Strips an optional `0x` prefix and decodes the remaining hex.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, PrimitivesError> {
    let trimmed = value.strip_prefix("0x").unwrap_or(value);
    Ok(hex::decode(trimmed)?)
}

/// Block or genesis hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Encode, Decode)]
pub struct Hash([u8; 32]);

impl Hash {
    pub fn new(data: [u8; 32]) -> Self {
        Self(data)
    }

    pub fn from_hex(value: &str) -> Result<Self, PrimitivesError> {
        let bytes = decode_hex(value).map_err(|_| PrimitivesError::InvalidHash(value.to_string()))?;
        let data: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PrimitivesError::InvalidHash(value.to_string()))?;
        Ok(Self(data))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// `0x` prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Hash::from_hex(&value).map_err(serde::de::Error::custom)
    }
}

/// Raw 32-byte account identifier (an ed25519 public key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub fn new(data: [u8; 32]) -> Self {
        Self(data)
    }

    pub fn from_hex(value: &str) -> Result<Self, PrimitivesError> {
        let bytes =
            decode_hex(value).map_err(|_| PrimitivesError::InvalidPublicKey(value.to_string()))?;
        let data: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PrimitivesError::InvalidPublicKey(value.to_string()))?;
        Ok(Self(data))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(data: [u8; 32]) -> Self {
        Self(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_hex_round_trip() {
        let hex = "0xe143f23803ac50e8f6f8e62695d1ce9e4e1d68aa36c1cd2cfd15340213f3423e";
        let hash = Hash::from_hex(hex).unwrap();
        assert_eq!(hash.to_hex(), hex);
        assert_eq!(Hash::from_hex(&hex[2..]).unwrap(), hash);
    }

    #[test]
    fn test_hash_rejects_wrong_length() {
        assert!(Hash::from_hex("0x1234").is_err());
        assert!(Hash::from_hex("not hex").is_err());
    }

    #[test]
    fn test_hash_serde_uses_prefixed_hex() {
        let hash = Hash::new([0xab; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_blake2_256_empty_input() {
        assert_eq!(
            hex::encode(blake2_256(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }
}
