//! Generic builder core.
//!
//! [`TransactionBuilder`] owns the fields every transaction carries (sender,
//! validity window, reference block, nonce, tip, signature). The call itself
//! comes from a [`CallBuilder`] kind, one per transaction family.

use crate::error::{BuilderError, ValidationError};
use crate::transaction::{Transaction, TransactionType};
use crate::validation::{parse_address, parse_amount, parse_hash, parse_signature, parse_u32, parse_u64, require};
use dotkit_codec::{BaseTxInfo, Call, DecodedExtrinsic, ExtrinsicBody, TransactionIntent};
use dotkit_primitives::{encode_address, AccountId, Hash, KeyPair, TypeRegistry};
use std::fmt::{self, Display};
use std::sync::Arc;
use tracing::{debug, info};

/// Call-specific half of a builder.
pub trait CallBuilder: Default + Clone + fmt::Debug {
    fn transaction_type(&self) -> TransactionType;

    /// Cross-field checks, run at build time and after decoding.
    fn validate(&self, registry: &TypeRegistry) -> Result<(), BuilderError>;

    fn intent(&self) -> Result<TransactionIntent, BuilderError>;

    /// Replays a decoded call through the kind's own setters.
    fn load_call(&mut self, call: &Call, registry: &TypeRegistry) -> Result<(), BuilderError>;
}

#[derive(Debug, Clone)]
pub struct TransactionBuilder<K: CallBuilder> {
    registry: Arc<TypeRegistry>,
    sender: Option<AccountId>,
    block_number: Option<u64>,
    era_period: Option<u64>,
    reference_block: Option<Hash>,
    nonce: Option<u32>,
    tip: u128,
    signature: Option<(AccountId, [u8; 64])>,
    signer: Option<KeyPair>,
    pub(crate) kind: K,
}

impl<K: CallBuilder> TransactionBuilder<K> {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            sender: None,
            block_number: None,
            era_period: None,
            reference_block: None,
            nonce: None,
            tip: 0,
            signature: None,
            signer: None,
            kind: K::default(),
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    /// Whether a signature or signing key is staged for `build()`.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some() || self.signer.is_some()
    }

    pub fn sender(&mut self, address: &str) -> Result<&mut Self, BuilderError> {
        self.sender = Some(parse_address("sender", address)?);
        Ok(self)
    }

    pub fn sequence_id(&mut self, nonce: impl Display) -> Result<&mut Self, BuilderError> {
        self.nonce = Some(parse_u32("nonce", nonce)?);
        Ok(self)
    }

    pub fn fee(&mut self, tip: impl Display) -> Result<&mut Self, BuilderError> {
        self.tip = parse_amount("tip", tip)?;
        Ok(self)
    }

    /// First valid block and window length. A zero length is immortal.
    pub fn validity(
        &mut self,
        first_valid: impl Display,
        max_duration: impl Display,
    ) -> Result<&mut Self, BuilderError> {
        let first_valid = parse_u64("firstValid", first_valid)?;
        let max_duration = parse_u64("maxDuration", max_duration)?;
        self.block_number = Some(first_valid);
        self.era_period = Some(max_duration);
        Ok(self)
    }

    pub fn reference_block(&mut self, hash: &str) -> Result<&mut Self, BuilderError> {
        self.reference_block = Some(parse_hash("referenceBlock", hash)?);
        Ok(self)
    }

    /// Stages a signature made elsewhere; checked against the sender at build.
    pub fn add_signature(&mut self, public_key: &str, signature: &[u8]) -> Result<&mut Self, BuilderError> {
        let public = parse_address("publicKey", public_key)?;
        let signature = parse_signature("signature", signature)?;
        self.signature = Some((public, signature));
        self.signer = None;
        Ok(self)
    }

    /// Stages a local key; the transaction is signed at build.
    pub fn sign(&mut self, key: &KeyPair) -> Result<&mut Self, BuilderError> {
        if !key.has_private() {
            return Err(BuilderError::Signing("key has no private half".to_string()));
        }
        self.signer = Some(key.clone());
        self.signature = None;
        Ok(self)
    }

    fn base_tx_info(&self) -> Result<BaseTxInfo, ValidationError> {
        Ok(BaseTxInfo {
            sender: require("sender", &self.sender)?,
            block_number: require("firstValid", &self.block_number)?,
            block_hash: require("referenceBlock", &self.reference_block)?,
            era_period: require("maxDuration", &self.era_period)?,
            nonce: require("nonce", &self.nonce)?,
            tip: self.tip,
        })
    }

    /// All base fields present and the call consistent.
    pub fn validate_transaction(&self) -> Result<(), BuilderError> {
        self.base_tx_info()?;
        self.kind.validate(&self.registry)
    }

    pub fn build(&self) -> Result<Transaction, BuilderError> {
        let base = self.base_tx_info()?;
        self.kind.validate(&self.registry)?;

        let call = self.kind.intent()?.to_call(&self.registry)?;
        let call_data = call.encode_with(&self.registry)?;
        let mut tx = Transaction::new(
            self.kind.transaction_type(),
            self.registry.clone(),
            call,
            call_data,
            base,
        )?;

        if let Some((public, signature)) = &self.signature {
            tx.add_signature(public, *signature)?;
        } else if let Some(key) = &self.signer {
            tx.sign(key)?;
        }

        info!(
            tx_type = %tx.transaction_type(),
            signed = tx.is_signed(),
            nonce = tx.base().nonce,
            "built transaction"
        );
        Ok(tx)
    }

    /// Back-fills the builder from a decoded extrinsic or signing payload.
    pub(crate) fn load(&mut self, decoded: &DecodedExtrinsic) -> Result<(), BuilderError> {
        // the phase reproduces the same era bytes on rebuild
        self.validity(decoded.era.phase(), decoded.era.period())?;
        self.sequence_id(decoded.nonce)?;
        self.fee(decoded.tip)?;

        match &decoded.body {
            ExtrinsicBody::SigningPayload {
                spec_version,
                tx_version,
                genesis_hash,
                block_hash,
            } => {
                self.validate_decoded_context(*spec_version, *tx_version, genesis_hash)?;
                self.reference_block(&block_hash.to_hex())?;
            }
            ExtrinsicBody::Signed { signer, signature } => {
                let address = encode_address(signer, self.registry.ss58_prefix());
                self.sender(&address)?;
                self.add_signature(&address, signature)?;
            }
        }

        let registry = self.registry.clone();
        self.kind.load_call(&decoded.call, &registry)?;
        self.kind.validate(&registry)?;
        debug!(tx_type = %self.kind.transaction_type(), "loaded raw transaction");
        Ok(())
    }

    fn validate_decoded_context(
        &self,
        spec_version: u32,
        tx_version: u32,
        genesis_hash: &Hash,
    ) -> Result<(), ValidationError> {
        if spec_version != self.registry.spec_version() {
            return Err(ValidationError::mismatch(
                "specVersion",
                self.registry.spec_version(),
                spec_version,
            ));
        }
        if tx_version != self.registry.tx_version() {
            return Err(ValidationError::mismatch(
                "transactionVersion",
                self.registry.tx_version(),
                tx_version,
            ));
        }
        if genesis_hash != self.registry.genesis_hash() {
            return Err(ValidationError::mismatch(
                "genesisHash",
                self.registry.genesis_hash(),
                genesis_hash,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::TransferBuilder;
    use dotkit_primitives::fixtures;

    fn builder() -> TransferBuilder {
        let registry = Arc::new(TypeRegistry::from_material(&fixtures::westend_material()).unwrap());
        let mut builder = TransferBuilder::new(registry);
        builder
            .to(fixtures::ACCOUNT_2.address)
            .unwrap()
            .amount("1000")
            .unwrap();
        builder
    }

    #[test]
    fn test_base_setters_validate_eagerly() {
        let mut builder = builder();
        assert!(builder.sender("5Ffp1wJCPu4hzVDTo7XaMLqZSvSadyUQmxWPDw74CBjECSox").is_err());
        assert!(builder.reference_block("0x1234").is_err());
        assert!(builder.validity(-1, 64).is_err());
        assert!(builder.validity(3933, "-64").is_err());
        assert!(builder.sequence_id(-200).is_err());
        assert!(builder.fee("-1").is_err());
    }

    #[test]
    fn test_missing_base_fields_are_named() {
        let mut builder = builder();
        let err = builder.build().unwrap_err();
        assert!(matches!(err, BuilderError::Validation(ref v) if v.field == "sender"));

        builder.sender(fixtures::ACCOUNT_1.address).unwrap();
        builder.validity(3933, 64).unwrap();
        builder.reference_block(fixtures::REFERENCE_BLOCK).unwrap();
        let err = builder.build().unwrap_err();
        assert!(matches!(err, BuilderError::Validation(ref v) if v.field == "nonce"));

        builder.sequence_id(200).unwrap();
        assert!(builder.validate_transaction().is_ok());
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_staged_signature_must_match_sender() {
        let mut builder = builder();
        builder
            .sender(fixtures::ACCOUNT_1.address)
            .unwrap()
            .validity(3933, 64)
            .unwrap()
            .reference_block(fixtures::REFERENCE_BLOCK)
            .unwrap()
            .sequence_id(200)
            .unwrap()
            .add_signature(fixtures::ACCOUNT_2.public_key, &[7u8; 64])
            .unwrap();
        assert!(builder.is_signed());
        assert!(matches!(builder.build(), Err(BuilderError::Signing(_))));
    }

    #[test]
    fn test_watch_only_key_cannot_be_staged() {
        let mut builder = builder();
        let public = AccountId::from_hex(fixtures::ACCOUNT_1.public_key).unwrap();
        let key = KeyPair::from_public(public).unwrap();
        assert!(matches!(builder.sign(&key), Err(BuilderError::Signing(_))));
    }
}
