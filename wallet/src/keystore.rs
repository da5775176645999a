use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::Argon2;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::WalletError;
use crate::keys::KeyDecryptor;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Key material sealed with a passphrase (argon2id key derivation,
/// AES-256-GCM encryption).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedKey {
    /// Hex encoded ciphertext including the GCM tag
    pub ciphertext: String,
    /// Hex encoded argon2 salt
    pub salt: String,
    /// Hex encoded AES-GCM nonce
    pub nonce: String,
}

fn derive_cipher(passphrase: &str, salt: &[u8]) -> Result<Aes256Gcm, WalletError> {
    let mut aes_key = [0u8; 32];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut aes_key)
        .map_err(|e| WalletError::Encryption(e.to_string()))?;
    Aes256Gcm::new_from_slice(&aes_key).map_err(|e| WalletError::Encryption(e.to_string()))
}

impl EncryptedKey {
    pub fn seal(plaintext: &[u8], passphrase: &str) -> Result<Self, WalletError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let cipher = derive_cipher(passphrase, &salt)?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| WalletError::Encryption(e.to_string()))?;

        Ok(Self {
            ciphertext: hex::encode(ciphertext),
            salt: hex::encode(salt),
            nonce: hex::encode(nonce_bytes),
        })
    }

    /// A wrong passphrase fails authentication and surfaces as
    /// [`WalletError::InvalidPassword`].
    pub fn open(&self, passphrase: &str) -> Result<Vec<u8>, WalletError> {
        let salt = hex::decode(&self.salt)?;
        let nonce = hex::decode(&self.nonce)?;
        if nonce.len() != NONCE_LEN {
            return Err(WalletError::Decryption(format!(
                "nonce must be {} bytes, got {}",
                NONCE_LEN,
                nonce.len()
            )));
        }
        let ciphertext = hex::decode(&self.ciphertext)?;

        let cipher = derive_cipher(passphrase, &salt)
            .map_err(|e| WalletError::Decryption(e.to_string()))?;
        cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|_| WalletError::InvalidPassword)
    }

    pub fn to_json(&self) -> Result<String, WalletError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Opens key shares serialized as [`EncryptedKey`] JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeystoreDecryptor;

impl KeyDecryptor for KeystoreDecryptor {
    fn decrypt(&self, input: &str, passphrase: &str) -> Result<Vec<u8>, WalletError> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        let key: EncryptedKey = serde_json::from_str(&compact)
            .map_err(|e| WalletError::Decryption(format!("malformed key material: {}", e)))?;
        key.open(passphrase)
    }
}

/// Named encrypted key shares persisted as one JSON file.
pub struct KeyStore {
    path: PathBuf,
    keys: BTreeMap<String, EncryptedKey>,
}

impl KeyStore {
    /// Opens the keystore at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref().to_path_buf();

        let keys = if path.exists() {
            let data = std::fs::read(&path)?;
            serde_json::from_slice(&data)?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, keys })
    }

    /// Seals `material` under `alias` and writes the file.
    pub fn import(&mut self, alias: &str, material: &[u8], passphrase: &str) -> Result<(), WalletError> {
        let sealed = EncryptedKey::seal(material, passphrase)?;
        self.keys.insert(alias.to_string(), sealed);
        self.save()?;
        debug!(alias, "stored key share");
        Ok(())
    }

    pub fn get(&self, alias: &str) -> Result<&EncryptedKey, WalletError> {
        self.keys
            .get(alias)
            .ok_or_else(|| WalletError::KeyNotFound(alias.to_string()))
    }

    pub fn decrypt(&self, alias: &str, passphrase: &str) -> Result<Vec<u8>, WalletError> {
        self.get(alias)?.open(passphrase)
    }

    pub fn aliases(&self) -> Vec<&str> {
        self.keys.keys().map(String::as_str).collect()
    }

    fn save(&self) -> Result<(), WalletError> {
        let data = serde_json::to_vec_pretty(&self.keys)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}
