//! Key collaborators used by recovery.
//!
//! Recovery never holds a whole private key. Child public keys come from a
//! [`KeyDeriver`], encrypted key shares are opened by a [`KeyDecryptor`] and
//! the final signature is produced by a [`ThresholdSigner`].

use crate::errors::WalletError;
use async_trait::async_trait;
use dotkit_primitives::{parse_account, AccountId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Derivation path of receive address `index`.
pub fn derivation_path(index: u32) -> String {
    format!("m/{}", index)
}

/// Non-hardened child public key derivation from a shared root key.
pub trait KeyDeriver: Send + Sync {
    fn derive_public(&self, root_key: &str, path: &str) -> Result<AccountId, WalletError>;
}

/// Opens encrypted key material with a passphrase.
pub trait KeyDecryptor: Send + Sync {
    fn decrypt(&self, input: &str, passphrase: &str) -> Result<Vec<u8>, WalletError>;
}

/// Combines two decrypted key shares into one ed25519 signature over
/// `message` for the child key at `path`.
#[async_trait]
pub trait ThresholdSigner: Send + Sync {
    async fn sign(
        &self,
        user_share: &[u8],
        backup_share: &[u8],
        path: &str,
        message: &[u8],
    ) -> Result<[u8; 64], WalletError>;
}

/// Child keys exported ahead of time by the signing ceremony tooling.
///
/// File format:
/// ```json
/// { "rootKey": "...", "keys": { "m/0": "5F...", "m/1": "0x61b1..." } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecomputedDeriver {
    root_key: String,
    keys: BTreeMap<String, String>,
}

impl PrecomputedDeriver {
    pub fn new(root_key: impl Into<String>) -> Self {
        Self {
            root_key: root_key.into(),
            keys: BTreeMap::new(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let data = std::fs::read(path.as_ref())?;
        let deriver: Self = serde_json::from_slice(&data)?;
        for key in deriver.keys.values() {
            parse_account(key).map_err(|_| WalletError::InvalidAddress(key.clone()))?;
        }
        Ok(deriver)
    }

    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    pub fn insert(&mut self, path: impl Into<String>, key: &AccountId) {
        self.keys.insert(path.into(), key.to_hex());
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyDeriver for PrecomputedDeriver {
    fn derive_public(&self, root_key: &str, path: &str) -> Result<AccountId, WalletError> {
        if root_key != self.root_key {
            return Err(WalletError::Derivation("unknown root key".to_string()));
        }
        let key = self
            .keys
            .get(path)
            .ok_or_else(|| WalletError::Derivation(format!("no key exported for {}", path)))?;
        Ok(parse_account(key)?)
    }
}
