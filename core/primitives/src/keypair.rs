// core/primitives/src/keypair.rs

use crate::address::encode_address;
use crate::error::PrimitivesError;
use crate::types::{decode_hex, AccountId};
use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};

/// Ed25519 key pair. The private half is optional so watch-only keys can
/// still produce addresses and verify signatures.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: Option<SigningKey>,
    public: AccountId,
}

impl KeyPair {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let public = AccountId::new(signing_key.verifying_key().to_bytes());
        Self {
            signing_key: Some(signing_key),
            public,
        }
    }

    /// Accepts a 32-byte seed, or a 64-byte `seed ++ public` secret key, in hex.
    pub fn from_private_hex(value: &str) -> Result<Self, PrimitivesError> {
        let bytes = decode_hex(value).map_err(|_| PrimitivesError::InvalidPrivateKey("not hex".to_string()))?;
        if bytes.len() != 32 && bytes.len() != 64 {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected 32 or 64 bytes, got {}",
                bytes.len()
            )));
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[..32]);
        let pair = Self::from_seed(&seed);
        if bytes.len() == 64 && bytes[32..] != pair.public.as_bytes()[..] {
            return Err(PrimitivesError::InvalidPrivateKey(
                "public half does not match seed".to_string(),
            ));
        }
        Ok(pair)
    }

    pub fn from_public(public: AccountId) -> Result<Self, PrimitivesError> {
        VerifyingKey::from_bytes(public.as_bytes())
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(Self {
            signing_key: None,
            public,
        })
    }

    pub fn public(&self) -> &AccountId {
        &self.public
    }

    pub fn has_private(&self) -> bool {
        self.signing_key.is_some()
    }

    pub fn address(&self, prefix: u16) -> String {
        encode_address(&self.public, prefix)
    }

    /// Returns `None` for watch-only keys.
    pub fn sign(&self, message: &[u8]) -> Option<[u8; 64]> {
        self.signing_key
            .as_ref()
            .map(|key| key.sign(message).to_bytes())
    }

    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        verify_signature(&self.public, message, signature)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public.to_hex())
            .field("has_private", &self.has_private())
            .finish()
    }
}

pub fn verify_signature(public: &AccountId, message: &[u8], signature: &[u8; 64]) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(public.as_bytes()) else {
        return false;
    };
    key.verify(message, &DalekSignature::from_bytes(signature)).is_ok()
}
