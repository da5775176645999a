//! Builder construction and raw transaction classification.

use crate::builder::TransactionBuilder;
use crate::builders::*;
use crate::error::BuilderError;
use crate::transaction::{Transaction, TransactionType};
use dotkit_codec::{decode_extrinsic, methods, pallets, Call, CodecError};
use dotkit_primitives::{decode_hex, KeyPair, Material, RegistryCache, TypeRegistry};
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

pub struct TransactionBuilderFactory {
    registry: Arc<TypeRegistry>,
}

impl TransactionBuilderFactory {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// Resolves the registry for `material` through `cache`.
    pub fn from_material(material: &Material, cache: &RegistryCache) -> Result<Self, BuilderError> {
        Ok(Self::new(cache.get_or_parse(material)?))
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    fn builder<K: crate::builder::CallBuilder>(&self) -> TransactionBuilder<K> {
        TransactionBuilder::new(self.registry.clone())
    }

    pub fn get_transfer_builder(&self) -> TransferBuilder {
        self.builder()
    }

    pub fn get_staking_builder(&self) -> StakingBuilder {
        self.builder()
    }

    pub fn get_unstake_builder(&self) -> UnstakeBuilder {
        self.builder()
    }

    pub fn get_withdraw_unstaked_builder(&self) -> WithdrawUnstakedBuilder {
        self.builder()
    }

    pub fn get_claim_builder(&self) -> ClaimBuilder {
        self.builder()
    }

    pub fn get_unnominate_builder(&self) -> UnnominateBuilder {
        self.builder()
    }

    pub fn get_address_initialization_builder(&self) -> AddressInitializationBuilder {
        self.builder()
    }

    pub fn get_batch_builder(&self) -> BatchTransactionBuilder {
        self.builder()
    }

    /// Decodes a signed extrinsic or signing payload and returns the
    /// matching builder, already populated.
    pub fn from(&self, raw: &str) -> Result<AnyBuilder, BuilderError> {
        let bytes = decode_hex(raw).map_err(|e| CodecError::Decode(e.to_string()))?;
        let decoded = decode_extrinsic(&bytes, &self.registry)?;
        let mut builder = self.classify(&decoded.call)?;
        builder.load(&decoded)?;
        Ok(builder)
    }

    fn classify(&self, call: &Call) -> Result<AnyBuilder, BuilderError> {
        let builder = match (call.pallet(), call.method()) {
            (pallets::BALANCES, methods::TRANSFER_KEEP_ALIVE | methods::TRANSFER_ALL)
            | (pallets::PROXY, methods::PROXY) => AnyBuilder::Transfer(self.get_transfer_builder()),
            (pallets::STAKING, methods::BOND | methods::BOND_EXTRA) => {
                AnyBuilder::Staking(self.get_staking_builder())
            }
            (pallets::STAKING, methods::UNBOND) => AnyBuilder::Unstake(self.get_unstake_builder()),
            (pallets::STAKING, methods::WITHDRAW_UNBONDED) => {
                AnyBuilder::WithdrawUnstaked(self.get_withdraw_unstaked_builder())
            }
            (pallets::STAKING, methods::PAYOUT_STAKERS) => AnyBuilder::Claim(self.get_claim_builder()),
            (pallets::STAKING, methods::CHILL) => AnyBuilder::Unnominate(self.get_unnominate_builder()),
            (pallets::PROXY, methods::ADD_PROXY | methods::REMOVE_PROXY | methods::CREATE_PURE) => {
                AnyBuilder::AddressInitialization(self.get_address_initialization_builder())
            }
            (pallets::UTILITY, methods::BATCH | methods::BATCH_ALL) => {
                AnyBuilder::Batch(self.get_batch_builder())
            }
            (pallet, method) => {
                return Err(BuilderError::UnsupportedTransactionType(format!(
                    "{}.{}",
                    pallet, method
                )))
            }
        };
        debug!(
            pallet = call.pallet(),
            method = call.method(),
            tx_type = %builder.transaction_type(),
            "classified raw transaction"
        );
        Ok(builder)
    }
}

/// A builder of any family, as produced by [`TransactionBuilderFactory::from`].
#[derive(Debug, Clone)]
pub enum AnyBuilder {
    Transfer(TransferBuilder),
    Staking(StakingBuilder),
    Unstake(UnstakeBuilder),
    WithdrawUnstaked(WithdrawUnstakedBuilder),
    Claim(ClaimBuilder),
    Unnominate(UnnominateBuilder),
    AddressInitialization(AddressInitializationBuilder),
    Batch(BatchTransactionBuilder),
}

macro_rules! dispatch {
    ($value:expr, $builder:ident => $body:expr) => {
        match $value {
            AnyBuilder::Transfer($builder) => $body,
            AnyBuilder::Staking($builder) => $body,
            AnyBuilder::Unstake($builder) => $body,
            AnyBuilder::WithdrawUnstaked($builder) => $body,
            AnyBuilder::Claim($builder) => $body,
            AnyBuilder::Unnominate($builder) => $body,
            AnyBuilder::AddressInitialization($builder) => $body,
            AnyBuilder::Batch($builder) => $body,
        }
    };
}

impl AnyBuilder {
    pub fn transaction_type(&self) -> TransactionType {
        dispatch!(self, b => b.transaction_type())
    }

    pub fn is_signed(&self) -> bool {
        dispatch!(self, b => b.is_signed())
    }

    pub fn sender(&mut self, address: &str) -> Result<&mut Self, BuilderError> {
        dispatch!(self, b => { b.sender(address)?; });
        Ok(self)
    }

    pub fn sequence_id(&mut self, nonce: impl Display) -> Result<&mut Self, BuilderError> {
        dispatch!(self, b => { b.sequence_id(nonce)?; });
        Ok(self)
    }

    pub fn fee(&mut self, tip: impl Display) -> Result<&mut Self, BuilderError> {
        dispatch!(self, b => { b.fee(tip)?; });
        Ok(self)
    }

    pub fn validity(&mut self, first_valid: impl Display, max_duration: impl Display) -> Result<&mut Self, BuilderError> {
        dispatch!(self, b => { b.validity(first_valid, max_duration)?; });
        Ok(self)
    }

    pub fn reference_block(&mut self, hash: &str) -> Result<&mut Self, BuilderError> {
        dispatch!(self, b => { b.reference_block(hash)?; });
        Ok(self)
    }

    pub fn add_signature(&mut self, public_key: &str, signature: &[u8]) -> Result<&mut Self, BuilderError> {
        dispatch!(self, b => { b.add_signature(public_key, signature)?; });
        Ok(self)
    }

    pub fn sign(&mut self, key: &KeyPair) -> Result<&mut Self, BuilderError> {
        dispatch!(self, b => { b.sign(key)?; });
        Ok(self)
    }

    pub fn validate_transaction(&self) -> Result<(), BuilderError> {
        dispatch!(self, b => b.validate_transaction())
    }

    pub fn build(&self) -> Result<Transaction, BuilderError> {
        dispatch!(self, b => b.build())
    }

    fn load(&mut self, decoded: &dotkit_codec::DecodedExtrinsic) -> Result<(), BuilderError> {
        dispatch!(self, b => b.load(decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotkit_primitives::fixtures;

    #[test]
    fn test_factory_shares_cached_registry() {
        let cache = RegistryCache::new();
        let material = fixtures::westend_material();
        let a = TransactionBuilderFactory::from_material(&material, &cache).unwrap();
        let b = TransactionBuilderFactory::from_material(&material, &cache).unwrap();
        assert!(Arc::ptr_eq(a.registry(), b.registry()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_from_rejects_non_hex() {
        let factory = TransactionBuilderFactory::new(Arc::new(
            TypeRegistry::from_material(&fixtures::westend_material()).unwrap(),
        ));
        assert!(matches!(factory.from("0xnothex"), Err(BuilderError::Decode(_))));
    }
}
