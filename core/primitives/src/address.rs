//! SS58 account addresses.
//!
//! An address is `base58(prefix ++ public_key ++ checksum)` where the checksum
//! is the first two bytes of `blake2b_512("SS58PRE" ++ prefix ++ public_key)`.
//! Prefixes below 64 take one byte, larger ones take two.

use crate::error::PrimitivesError;
use crate::types::{decode_hex, AccountId};
use blake2::{Blake2b512, Digest};
use serde::{Deserialize, Serialize};

const SS58_CONTEXT: &[u8] = b"SS58PRE";
const CHECKSUM_LEN: usize = 2;
const MAX_PREFIX: u16 = 16383;

/// Network version byte(s) of an SS58 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFormat {
    Polkadot,
    Kusama,
    Substrate,
}

impl AddressFormat {
    pub fn prefix(&self) -> u16 {
        match self {
            AddressFormat::Polkadot => 0,
            AddressFormat::Kusama => 2,
            AddressFormat::Substrate => 42,
        }
    }

    /// Address format a runtime is known by. Test networks and unknown
    /// runtimes use the generic substrate format.
    pub fn for_spec_name(spec_name: &str) -> Self {
        match spec_name.to_ascii_lowercase().as_str() {
            "polkadot" | "statemint" | "asset-hub-polkadot" => AddressFormat::Polkadot,
            "kusama" | "statemine" | "asset-hub-kusama" => AddressFormat::Kusama,
            _ => AddressFormat::Substrate,
        }
    }
}

fn ss58_checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Blake2b512::new();
    hasher.update(SS58_CONTEXT);
    hasher.update(data);
    let hash = hasher.finalize();
    [hash[0], hash[1]]
}

/// Encodes a public key as an SS58 address under `prefix`.
pub fn encode_address(account: &AccountId, prefix: u16) -> String {
    let mut data = Vec::with_capacity(36);
    if prefix < 64 {
        data.push(prefix as u8);
    } else {
        data.push(((prefix & 0x00FC) >> 2) as u8 | 0x40);
        data.push(((prefix >> 8) as u8) | ((prefix & 0x0003) << 6) as u8);
    }
    data.extend_from_slice(account.as_bytes());
    let checksum = ss58_checksum(&data);
    data.extend_from_slice(&checksum);
    bs58::encode(data).into_string()
}

/// Decodes an SS58 address into its public key and network prefix.
pub fn decode_address(address: &str) -> Result<(AccountId, u16), PrimitivesError> {
    let invalid = || PrimitivesError::InvalidAddress(address.to_string());
    let data = bs58::decode(address).into_vec().map_err(|_| invalid())?;
    if data.is_empty() {
        return Err(invalid());
    }

    let (prefix, prefix_len) = match data[0] {
        0..=63 => (data[0] as u16, 1),
        64..=127 => {
            if data.len() < 2 {
                return Err(invalid());
            }
            let lower = ((data[0] << 2) | (data[1] >> 6)) as u16;
            let upper = (data[1] & 0b0011_1111) as u16;
            (lower | (upper << 8), 2)
        }
        _ => return Err(invalid()),
    };
    if prefix > MAX_PREFIX || data.len() != prefix_len + 32 + CHECKSUM_LEN {
        return Err(invalid());
    }

    let body_len = prefix_len + 32;
    let checksum = ss58_checksum(&data[..body_len]);
    if data[body_len..] != checksum {
        return Err(invalid());
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&data[prefix_len..body_len]);
    Ok((AccountId::new(key), prefix))
}

/// Resolves either an SS58 address or a hex encoded public key.
pub fn parse_account(value: &str) -> Result<AccountId, PrimitivesError> {
    if let Ok((account, _)) = decode_address(value) {
        return Ok(account);
    }
    let bytes = decode_hex(value).map_err(|_| PrimitivesError::InvalidAddress(value.to_string()))?;
    let key: [u8; 32] = bytes
        .try_into()
        .map_err(|_| PrimitivesError::InvalidAddress(value.to_string()))?;
    Ok(AccountId::new(key))
}

pub fn is_valid_address(value: &str) -> bool {
    parse_account(value).is_ok()
}
