//! Built transactions.
//!
//! A [`Transaction`] is unsigned or signed, never both, and only moves from
//! the first state to the second. Unsigned transactions serialize to the
//! signing payload; signed ones to the final extrinsic.

use crate::error::BuilderError;
use dotkit_codec::{
    attach_signature, signable_payload, signing_payload, transaction_id, BaseTxInfo, Call,
};
use dotkit_primitives::{
    encode_address, verify_signature, AccountId, KeyPair, RewardDestination, TypeRegistry,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Address of the zero account on generic Substrate chains. Bonded funds are
/// reported as sent here: they leave free balance but stay with the stash.
pub const STAKING_DESTINATION: &str = "5C4hrfjw9DjXZTzV3MwzrrAr9P1MJhSrvWGWqi1eSuyUpnhM";

const STAKING_SINK: AccountId = AccountId([0u8; 32]);
const FAKE_SIGNATURE: [u8; 64] = [1u8; 64];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Send,
    StakingActivate,
    StakingUnlock,
    StakingWithdraw,
    StakingClaim,
    StakingUnvote,
    AddressInitialization,
    Batch,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One side of a balance movement. Values are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub address: String,
    pub value: String,
    pub coin: String,
}

/// Decoded view of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxData {
    pub id: String,
    pub sender: String,
    pub reference_block: String,
    /// First valid block. For a transaction decoded by `from()` this is the
    /// era phase, since the era bytes do not carry the original block.
    pub block_number: u64,
    pub genesis_hash: String,
    pub nonce: u32,
    pub tip: String,
    pub era_period: u64,
    pub spec_version: u32,
    pub transaction_version: u32,
    pub chain_name: String,
    pub pallet: String,
    pub method: String,
    pub args: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_proxy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_slashing_spans: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_stash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_era: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_calls: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationOutput {
    pub address: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeInfo {
    pub fee: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// User-facing summary, one projection per transaction type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionExplanation {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub sender: String,
    pub nonce: u32,
    pub block_number: u64,
    pub outputs: Vec<ExplanationOutput>,
    pub output_amount: String,
    pub change_outputs: Vec<ExplanationOutput>,
    pub change_amount: String,
    pub fee: FeeInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_proxy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_stash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_era: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    transaction_type: TransactionType,
    registry: Arc<TypeRegistry>,
    call: Call,
    call_data: Vec<u8>,
    base: BaseTxInfo,
    signature: Option<[u8; 64]>,
    inputs: Vec<Entry>,
    outputs: Vec<Entry>,
    broadcast: OnceCell<String>,
}

impl Transaction {
    pub fn new(
        transaction_type: TransactionType,
        registry: Arc<TypeRegistry>,
        call: Call,
        call_data: Vec<u8>,
        base: BaseTxInfo,
    ) -> Result<Self, BuilderError> {
        let mut tx = Self {
            transaction_type,
            registry,
            call,
            call_data,
            base,
            signature: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            broadcast: OnceCell::new(),
        };
        tx.load_inputs_and_outputs()?;
        Ok(tx)
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn call(&self) -> &Call {
        &self.call
    }

    pub fn call_data(&self) -> &[u8] {
        &self.call_data
    }

    pub fn base(&self) -> &BaseTxInfo {
        &self.base
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn sender(&self) -> &AccountId {
        &self.base.sender
    }

    pub fn signature(&self) -> Option<&[u8; 64]> {
        self.signature.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn inputs(&self) -> &[Entry] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Entry] {
        &self.outputs
    }

    fn address(&self, account: &AccountId) -> String {
        encode_address(account, self.registry.ss58_prefix())
    }

    /// Bytes an external signer must sign.
    pub fn signable_payload(&self) -> Result<Vec<u8>, BuilderError> {
        Ok(signable_payload(&self.call_data, &self.base, &self.registry)?)
    }

    /// Signed extrinsic when a signature is attached, signing payload otherwise.
    pub fn to_broadcast_format(&self) -> Result<String, BuilderError> {
        self.broadcast
            .get_or_try_init(|| -> Result<String, BuilderError> {
                let bytes = match &self.signature {
                    Some(signature) => attach_signature(&self.call_data, signature, &self.base, &self.registry)?,
                    None => signing_payload(&self.call_data, &self.base, &self.registry)?,
                };
                Ok(format!("0x{}", hex::encode(bytes)))
            })
            .cloned()
    }

    /// Length in bytes of the broadcast format.
    pub fn transaction_size(&self) -> Result<usize, BuilderError> {
        Ok((self.to_broadcast_format()?.len() - 2) / 2)
    }

    /// blake2-256 of the broadcast bytes.
    pub fn id(&self) -> Result<String, BuilderError> {
        let broadcast = self.to_broadcast_format()?;
        let bytes = hex::decode(&broadcast[2..])
            .map_err(|e| BuilderError::InvalidTransaction(e.to_string()))?;
        Ok(transaction_id(&bytes).to_hex())
    }

    /// Signed form with a dummy signature, for fee queries. Leaves the
    /// transaction itself untouched.
    pub fn fake_sign(&self) -> Result<String, BuilderError> {
        let bytes = attach_signature(&self.call_data, &FAKE_SIGNATURE, &self.base, &self.registry)?;
        Ok(format!("0x{}", hex::encode(bytes)))
    }

    pub fn can_sign(&self, key: &KeyPair) -> bool {
        key.has_private() && key.public() == self.sender()
    }

    pub fn sign(&mut self, key: &KeyPair) -> Result<(), BuilderError> {
        if self.is_signed() {
            return Err(BuilderError::Signing("transaction is already signed".to_string()));
        }
        if !self.can_sign(key) {
            return Err(BuilderError::Signing(format!(
                "key {} cannot sign for sender {}",
                self.address(key.public()),
                self.address(self.sender())
            )));
        }
        let payload = self.signable_payload()?;
        let signature = key
            .sign(&payload)
            .ok_or_else(|| BuilderError::Signing("key has no private half".to_string()))?;
        self.set_signature(signature);
        Ok(())
    }

    /// Attaches a signature produced elsewhere, e.g. by a threshold ceremony.
    pub fn add_signature(&mut self, public_key: &AccountId, signature: [u8; 64]) -> Result<(), BuilderError> {
        if self.is_signed() {
            return Err(BuilderError::Signing("transaction is already signed".to_string()));
        }
        if public_key != self.sender() {
            return Err(BuilderError::Signing(format!(
                "signer {} does not match sender {}",
                self.address(public_key),
                self.address(self.sender())
            )));
        }
        self.set_signature(signature);
        Ok(())
    }

    fn set_signature(&mut self, signature: [u8; 64]) {
        self.signature = Some(signature);
        self.broadcast.take();
        debug!(sender = %self.address(self.sender()), "signature attached");
    }

    /// Checks the attached signature against the signable payload.
    pub fn verify_signature(&self) -> bool {
        let Some(signature) = &self.signature else {
            return false;
        };
        match self.signable_payload() {
            Ok(payload) => verify_signature(self.sender(), &payload, signature),
            Err(_) => false,
        }
    }

    fn entry(&self, account: &AccountId, value: u128) -> Entry {
        Entry {
            address: self.address(account),
            value: value.to_string(),
            coin: self.registry.spec_name().to_string(),
        }
    }

    fn proxy_deposit(&self) -> Result<u128, BuilderError> {
        let base = self.registry.constant_u128("Proxy", "ProxyDepositBase")?;
        let factor = self.registry.constant_u128("Proxy", "ProxyDepositFactor")?;
        Ok(base.saturating_add(factor))
    }

    fn load_inputs_and_outputs(&mut self) -> Result<(), BuilderError> {
        let sender = self.base.sender;
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();

        match &self.call {
            Call::TransferKeepAlive { dest, value } => {
                inputs.push(self.entry(&sender, *value));
                outputs.push(self.entry(dest, *value));
            }
            // the amount is only known once the runtime executes the call
            Call::TransferAll { dest, .. } => {
                inputs.push(self.entry(&sender, 0));
                outputs.push(self.entry(dest, 0));
            }
            Call::Proxy { real, call, .. } => {
                if let Call::TransferKeepAlive { dest, value } = call.as_ref() {
                    inputs.push(self.entry(real, *value));
                    outputs.push(self.entry(dest, *value));
                }
            }
            Call::Bond { value, .. } | Call::BondExtra { max_additional: value } => {
                inputs.push(self.entry(&sender, *value));
                outputs.push(self.entry(&STAKING_SINK, *value));
            }
            Call::Batch { calls } | Call::BatchAll { calls } => match calls.as_slice() {
                [Call::Bond { value, .. } | Call::BondExtra { max_additional: value }, Call::AddProxy { delegate, .. }] =>
                {
                    let deposit = self.proxy_deposit()?;
                    inputs.push(self.entry(&sender, *value));
                    outputs.push(self.entry(&STAKING_SINK, *value));
                    inputs.push(self.entry(&sender, deposit));
                    outputs.push(self.entry(delegate, deposit));
                }
                [Call::RemoveProxy { delegate, .. }, Call::Chill, Call::Unbond { .. }] => {
                    let deposit = self.proxy_deposit()?;
                    inputs.push(self.entry(delegate, deposit));
                    outputs.push(self.entry(&sender, deposit));
                }
                _ => {}
            },
            _ => {}
        }

        self.inputs = inputs;
        self.outputs = outputs;
        Ok(())
    }

    pub fn to_json(&self) -> Result<TxData, BuilderError> {
        let call_json = self.call.to_json(&self.registry)?;
        let mut data = TxData {
            id: self.id()?,
            sender: self.address(self.sender()),
            reference_block: self.base.block_hash.to_hex(),
            block_number: self.base.block_number,
            genesis_hash: self.registry.genesis_hash().to_hex(),
            nonce: self.base.nonce,
            tip: self.base.tip.to_string(),
            era_period: self.base.era_period,
            spec_version: self.registry.spec_version(),
            transaction_version: self.registry.tx_version(),
            chain_name: self.registry.chain_name().to_string(),
            pallet: self.call.pallet().to_string(),
            method: self.call.method().to_string(),
            args: call_json["args"].clone(),
            ..TxData::default()
        };

        match &self.call {
            Call::TransferKeepAlive { dest, value } => {
                data.to = Some(self.address(dest));
                data.amount = Some(value.to_string());
            }
            Call::TransferAll { dest, keep_alive } => {
                data.to = Some(self.address(dest));
                data.keep_alive = Some(*keep_alive);
            }
            Call::Proxy {
                real,
                force_proxy_type,
                call,
            } => {
                data.owner = Some(self.address(real));
                data.force_proxy_type = force_proxy_type.map(|p| p.to_string());
                if let Call::TransferKeepAlive { dest, value } = call.as_ref() {
                    data.to = Some(self.address(dest));
                    data.amount = Some(value.to_string());
                }
            }
            Call::Bond { value, payee } => {
                data.amount = Some(value.to_string());
                data.payee = Some(match payee {
                    RewardDestination::Account(account) => self.address(account),
                    other => other.variant_name().unwrap_or_default().to_string(),
                });
            }
            Call::BondExtra { max_additional } => data.amount = Some(max_additional.to_string()),
            Call::Unbond { value } => data.amount = Some(value.to_string()),
            Call::WithdrawUnbonded { num_slashing_spans } => {
                data.num_slashing_spans = Some(*num_slashing_spans)
            }
            Call::Chill => {}
            Call::PayoutStakers { validator_stash, era } => {
                data.validator_stash = Some(self.address(validator_stash));
                data.claim_era = Some(*era);
            }
            Call::AddProxy {
                delegate,
                proxy_type,
                delay,
            }
            | Call::RemoveProxy {
                delegate,
                proxy_type,
                delay,
            } => {
                data.owner = Some(self.address(delegate));
                data.proxy_type = Some(proxy_type.to_string());
                data.delay = Some(*delay);
            }
            Call::CreatePure {
                proxy_type,
                delay,
                index,
            } => {
                data.proxy_type = Some(proxy_type.to_string());
                data.delay = Some(*delay);
                data.index = Some(*index);
            }
            Call::Batch { .. } | Call::BatchAll { .. } => {
                data.batch_calls = call_json["args"]["calls"].as_array().cloned();
            }
        }
        Ok(data)
    }

    pub fn explain_transaction(&self) -> Result<TransactionExplanation, BuilderError> {
        let data = self.to_json()?;
        let outputs: Vec<ExplanationOutput> = self
            .outputs
            .iter()
            .map(|o| ExplanationOutput {
                address: o.address.clone(),
                amount: o.value.clone(),
            })
            .collect();
        let output_amount = outputs
            .iter()
            .filter_map(|o| o.amount.parse::<u128>().ok())
            .fold(0u128, |acc, v| acc.saturating_add(v))
            .to_string();

        let mut explanation = TransactionExplanation {
            id: data.id.clone(),
            transaction_type: self.transaction_type,
            sender: data.sender.clone(),
            nonce: data.nonce,
            block_number: data.block_number,
            outputs,
            output_amount,
            change_outputs: Vec::new(),
            change_amount: "0".to_string(),
            fee: FeeInfo {
                fee: data.tip.clone(),
                kind: "tip".to_string(),
            },
            owner: None,
            force_proxy_type: None,
            payee: None,
            proxy_type: None,
            delay: None,
            validator_stash: None,
            claim_era: None,
            methods: None,
        };

        match self.transaction_type {
            TransactionType::Send => explain_send(&mut explanation, &data),
            TransactionType::StakingActivate => explain_staking_activate(&mut explanation, &data),
            TransactionType::StakingUnlock => explain_amount_only(&mut explanation, &data),
            TransactionType::StakingWithdraw | TransactionType::StakingUnvote => {}
            TransactionType::StakingClaim => explain_claim(&mut explanation, &data),
            TransactionType::AddressInitialization => explain_address_initialization(&mut explanation, &data),
            TransactionType::Batch => explain_batch(&mut explanation, &data)?,
        }
        Ok(explanation)
    }
}

fn explain_send(explanation: &mut TransactionExplanation, data: &TxData) {
    explanation.owner = data.owner.clone();
    explanation.force_proxy_type = data.force_proxy_type.clone();
}

fn explain_staking_activate(explanation: &mut TransactionExplanation, data: &TxData) {
    explanation.payee = data.payee.clone();
}

/// Unbonding moves nothing between accounts; the amount is still shown.
fn explain_amount_only(explanation: &mut TransactionExplanation, data: &TxData) {
    if let Some(amount) = &data.amount {
        explanation.output_amount = amount.clone();
    }
}

fn explain_claim(explanation: &mut TransactionExplanation, data: &TxData) {
    explanation.validator_stash = data.validator_stash.clone();
    explanation.claim_era = data.claim_era;
}

fn explain_address_initialization(explanation: &mut TransactionExplanation, data: &TxData) {
    explanation.owner = data.owner.clone();
    explanation.proxy_type = data.proxy_type.clone();
    explanation.delay = data.delay;
}

fn explain_batch(explanation: &mut TransactionExplanation, data: &TxData) -> Result<(), BuilderError> {
    let calls = data
        .batch_calls
        .as_ref()
        .ok_or_else(|| BuilderError::InvalidTransaction("batch without calls".to_string()))?;
    let methods = calls
        .iter()
        .map(|c| match (c["pallet"].as_str(), c["method"].as_str()) {
            (Some(pallet), Some(method)) => Ok(format!("{}.{}", pallet, method)),
            _ => Err(BuilderError::InvalidTransaction(format!("batch call without a name: {}", c))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    explanation.methods = Some(methods);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotkit_primitives::{fixtures, Hash, ProxyType};

    fn registry() -> Arc<TypeRegistry> {
        Arc::new(TypeRegistry::from_material(&fixtures::westend_material()).unwrap())
    }

    fn account(hex: &str) -> AccountId {
        AccountId::from_hex(hex).unwrap()
    }

    fn base() -> BaseTxInfo {
        BaseTxInfo {
            sender: account(fixtures::ACCOUNT_1.public_key),
            block_number: 3933,
            block_hash: fixtures::reference_block(),
            era_period: 64,
            nonce: 200,
            tip: 0,
        }
    }

    fn transaction(tx_type: TransactionType, call: Call) -> Transaction {
        let registry = registry();
        let call_data = call.encode_with(&registry).unwrap();
        Transaction::new(tx_type, registry, call, call_data, base()).unwrap()
    }

    fn transfer() -> Transaction {
        transaction(
            TransactionType::Send,
            Call::TransferKeepAlive {
                dest: account(fixtures::ACCOUNT_2.public_key),
                value: 90_034_235_235_322,
            },
        )
    }

    #[test]
    fn test_staking_destination_is_zero_account() {
        assert_eq!(encode_address(&STAKING_SINK, 42), STAKING_DESTINATION);
    }

    #[test]
    fn test_signing_is_one_way() {
        let mut tx = transfer();
        let unsigned = tx.to_broadcast_format().unwrap();
        let key = KeyPair::from_private_hex(fixtures::ACCOUNT_1.seed).unwrap();
        assert!(tx.can_sign(&key));
        tx.sign(&key).unwrap();
        assert!(tx.verify_signature());
        assert_ne!(tx.to_broadcast_format().unwrap(), unsigned);
        assert!(matches!(tx.sign(&key), Err(BuilderError::Signing(_))));
        assert!(matches!(
            tx.add_signature(&account(fixtures::ACCOUNT_1.public_key), [0u8; 64]),
            Err(BuilderError::Signing(_))
        ));
    }

    #[test]
    fn test_wrong_key_cannot_sign() {
        let mut tx = transfer();
        let other = KeyPair::from_private_hex(fixtures::ACCOUNT_2.seed).unwrap();
        assert!(!tx.can_sign(&other));
        assert!(matches!(tx.sign(&other), Err(BuilderError::Signing(_))));
        assert!(!tx.is_signed());
    }

    #[test]
    fn test_fake_sign_leaves_state_alone() {
        let tx = transfer();
        let fake = tx.fake_sign().unwrap();
        assert!(fake.contains(&"01".repeat(64)));
        assert!(!tx.is_signed());
        assert!(tx.to_broadcast_format().unwrap().starts_with("0xa8"));
        assert_eq!(tx.transaction_size().unwrap(), 1 + 42 + 5 + 72);
    }

    #[test]
    fn test_transfer_inputs_and_outputs() {
        let tx = transfer();
        assert_eq!(tx.inputs()[0].address, fixtures::ACCOUNT_1.address);
        assert_eq!(tx.outputs()[0].address, fixtures::ACCOUNT_2.address);
        assert_eq!(tx.outputs()[0].value, "90034235235322");
        assert_eq!(tx.outputs()[0].coin, "westend");
    }

    #[test]
    fn test_sweep_output_is_zero() {
        let tx = transaction(
            TransactionType::Send,
            Call::TransferAll {
                dest: account(fixtures::ACCOUNT_2.public_key),
                keep_alive: false,
            },
        );
        assert_eq!(tx.outputs()[0].value, "0");
        assert_eq!(tx.to_json().unwrap().keep_alive, Some(false));
    }

    #[test]
    fn test_proxy_transfer_input_comes_from_owner() {
        let tx = transaction(
            TransactionType::Send,
            Call::Proxy {
                real: account(fixtures::ACCOUNT_3.public_key),
                force_proxy_type: Some(ProxyType::Any),
                call: Box::new(Call::TransferKeepAlive {
                    dest: account(fixtures::ACCOUNT_2.public_key),
                    value: 10,
                }),
            },
        );
        assert_eq!(tx.inputs()[0].address, fixtures::ACCOUNT_3.address);
        let explanation = tx.explain_transaction().unwrap();
        assert_eq!(explanation.owner.as_deref(), Some(fixtures::ACCOUNT_3.address));
        assert_eq!(explanation.force_proxy_type.as_deref(), Some("Any"));
    }

    #[test]
    fn test_bond_goes_to_staking_destination() {
        let tx = transaction(
            TransactionType::StakingActivate,
            Call::Bond {
                value: 500_000_000_000,
                payee: RewardDestination::Staked,
            },
        );
        assert_eq!(tx.outputs()[0].address, STAKING_DESTINATION);
        let explanation = tx.explain_transaction().unwrap();
        assert_eq!(explanation.output_amount, "500000000000");
        assert_eq!(explanation.payee.as_deref(), Some("Staked"));
    }

    #[test]
    fn test_unlisted_batch_has_no_movements() {
        let tx = transaction(
            TransactionType::Batch,
            Call::Batch {
                calls: vec![Call::Chill, Call::Unbond { value: 5 }],
            },
        );
        assert!(tx.inputs().is_empty() && tx.outputs().is_empty());
        let explanation = tx.explain_transaction().unwrap();
        assert_eq!(
            explanation.methods.unwrap(),
            vec!["Staking.chill".to_string(), "Staking.unbond".to_string()]
        );
    }

    #[test]
    fn test_json_carries_chain_context() {
        let data = transfer().to_json().unwrap();
        assert_eq!(data.reference_block, fixtures::REFERENCE_BLOCK);
        assert_eq!(data.genesis_hash, fixtures::GENESIS_HASH);
        assert_eq!(data.spec_version, fixtures::SPEC_VERSION);
        assert_eq!(data.amount.as_deref(), Some("90034235235322"));
        assert_eq!(data.args["value"], "90034235235322");
        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("referenceBlock").is_some());
        assert!(value.get("payee").is_none());
        assert_ne!(Hash::from_hex(&data.id).unwrap(), Hash::default());
    }

    #[test]
    fn test_batch_call_without_name_is_rejected() {
        let tx = transaction(
            TransactionType::Batch,
            Call::Batch {
                calls: vec![Call::Chill, Call::Unbond { value: 5 }],
            },
        );
        let mut explanation = tx.explain_transaction().unwrap();
        let mut data = tx.to_json().unwrap();
        data.batch_calls = Some(vec![serde_json::json!({ "method": "chill" })]);
        assert!(matches!(
            explain_batch(&mut explanation, &data),
            Err(BuilderError::InvalidTransaction(_))
        ));
    }
}
