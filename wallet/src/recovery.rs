//! Funds recovery without the custodian.
//!
//! A [`RecoveryScanner`] walks receive address indices, asks the node for
//! each address's balance, and sweeps the first funded one. With the user
//! and backup key shares it signs the sweep itself; without them it returns
//! the unsigned sweep plus what an offline signing ceremony needs, which
//! [`RecoveryScanner::create_broadcastable_sweep`] later turns into a
//! broadcastable extrinsic.

use crate::config::{DEFAULT_SCAN_FACTOR, MAX_SCAN_RANGE};
use crate::errors::WalletError;
use crate::keys::{derivation_path, KeyDecryptor, KeyDeriver, ThresholdSigner};
use crate::node::NodeRpc;
use dotkit_builder::{Entry, Transaction, TransactionBuilderFactory};
use dotkit_primitives::{encode_address, is_valid_address, verify_signature, AccountId};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default mortality of a sweep, in blocks.
pub const MAX_VALIDITY_DURATION: u64 = 2400;

/// Encrypted user and backup key shares with the passphrase that opens them.
#[derive(Clone)]
pub struct RecoveryKeys {
    pub user_key: String,
    pub backup_key: String,
    pub passphrase: String,
}

impl std::fmt::Debug for RecoveryKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryKeys").finish_non_exhaustive()
    }
}

struct SigningContext {
    keys: RecoveryKeys,
    decryptor: Arc<dyn KeyDecryptor>,
    signer: Arc<dyn ThresholdSigner>,
}

impl SigningContext {
    fn open(&self, share: &str, input: &str) -> Result<Vec<u8>, WalletError> {
        if input.trim().is_empty() {
            return Err(WalletError::KeyNotFound(format!("missing {} key", share)));
        }
        self.decryptor
            .decrypt(input, &self.keys.passphrase)
            .map_err(|e| match e {
                WalletError::InvalidPassword => WalletError::InvalidPassword,
                other => WalletError::Decryption(format!("{} keychain: {}", share, other)),
            })
    }

    async fn sign(&self, account: &AccountId, path: &str, message: &[u8]) -> Result<[u8; 64], WalletError> {
        if self.keys.passphrase.is_empty() {
            return Err(WalletError::KeyNotFound("missing wallet passphrase".to_string()));
        }
        let user = self.open("user", &self.keys.user_key)?;
        let backup = self.open("backup", &self.keys.backup_key)?;
        let signature = self.signer.sign(&user, &backup, path, message).await?;
        if !verify_signature(account, message, &signature) {
            return Err(WalletError::Signing(format!(
                "threshold signature does not verify for {}",
                path
            )));
        }
        Ok(signature)
    }
}

/// A sweep ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedSweep {
    pub serialized_tx: String,
    pub scan_index: u32,
}

/// Validity window and key context an offline signer hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepContext {
    pub first_valid: u64,
    pub max_duration: u64,
    pub common_keychain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scan_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSweep {
    pub inputs: Vec<Entry>,
    pub outputs: Vec<Entry>,
    pub spend_amount: String,
}

/// An unsigned sweep waiting for an offline signature over `signable_hex`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedSweep {
    pub serialized_tx: String,
    pub scan_index: u32,
    pub coin: String,
    pub signable_hex: String,
    pub derivation_path: String,
    pub parsed_tx: ParsedSweep,
    pub fee: String,
    pub coin_specific: SweepContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecoveredSweep {
    // must stay first: an unsigned sweep also matches `SignedSweep`
    Unsigned(UnsignedSweep),
    Signed(SignedSweep),
}

impl RecoveredSweep {
    pub fn scan_index(&self) -> u32 {
        match self {
            RecoveredSweep::Signed(tx) => tx.scan_index,
            RecoveredSweep::Unsigned(tx) => tx.scan_index,
        }
    }

    pub fn serialized_tx(&self) -> &str {
        match self {
            RecoveredSweep::Signed(tx) => &tx.serialized_tx,
            RecoveredSweep::Unsigned(tx) => &tx.serialized_tx,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationResult {
    pub transactions: Vec<RecoveredSweep>,
    pub last_scan_index: u32,
}

/// An unsigned sweep with the signature produced for it offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSignature {
    pub unsigned: UnsignedSweep,
    /// Hex encoded 64-byte ed25519 signature
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastableSweeps {
    pub transactions: Vec<SignedSweep>,
    pub last_scan_index: u32,
}

pub struct RecoveryScanner {
    factory: Arc<TransactionBuilderFactory>,
    node: Arc<dyn NodeRpc>,
    deriver: Arc<dyn KeyDeriver>,
    root_key: String,
    max_validity_duration: u64,
    signing: Option<SigningContext>,
    cancelled: Arc<AtomicBool>,
}

impl RecoveryScanner {
    pub fn new(
        factory: Arc<TransactionBuilderFactory>,
        node: Arc<dyn NodeRpc>,
        deriver: Arc<dyn KeyDeriver>,
        root_key: &str,
    ) -> Self {
        Self {
            factory,
            node,
            deriver,
            root_key: root_key.chars().filter(|c| !c.is_whitespace()).collect(),
            max_validity_duration: MAX_VALIDITY_DURATION,
            signing: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_max_validity_duration(mut self, blocks: u64) -> Self {
        self.max_validity_duration = blocks;
        self
    }

    /// Sign sweeps locally instead of returning them unsigned.
    pub fn with_signing(
        mut self,
        keys: RecoveryKeys,
        decryptor: Arc<dyn KeyDecryptor>,
        signer: Arc<dyn ThresholdSigner>,
    ) -> Self {
        self.signing = Some(SigningContext {
            keys,
            decryptor,
            signer,
        });
        self
    }

    /// Setting the flag stops a running scan before its next index.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_signing(&self) -> bool {
        self.signing.is_some()
    }

    fn check_cancelled(&self, index: u32) -> Result<(), WalletError> {
        if self.cancelled.load(Ordering::SeqCst) {
            warn!(index, "recovery scan cancelled");
            return Err(WalletError::Cancelled(index));
        }
        Ok(())
    }

    fn address_of(&self, account: &AccountId) -> String {
        encode_address(account, self.factory.registry().ss58_prefix())
    }

    /// Address of receive index `index`.
    pub fn derive_address(&self, index: u32) -> Result<String, WalletError> {
        let account = self.deriver.derive_public(&self.root_key, &derivation_path(index))?;
        Ok(self.address_of(&account))
    }

    /// Sweeps the first funded address in `[start, start + count)` to
    /// `destination`. Each index costs one balance query.
    pub async fn scan(&self, destination: &str, start: u32, count: u32) -> Result<RecoveredSweep, WalletError> {
        if !is_valid_address(destination) {
            return Err(WalletError::InvalidAddress(destination.to_string()));
        }
        let end = start
            .checked_add(count)
            .filter(|_| count > 0)
            .ok_or(WalletError::InvalidScanRange {
                start,
                end: start.saturating_add(count),
            })?;

        info!(start, end, signing = self.is_signing(), "starting recovery scan");
        for index in start..end {
            self.check_cancelled(index)?;
            if let Some(sweep) = self.recover_index(destination, index).await? {
                return Ok(sweep);
            }
        }
        Err(WalletError::NoFundedAddressFound { start, end })
    }

    /// Sweeps every funded receive address in `[start, end)` into the base
    /// address (index 0). `start` defaults to 1 and `end` to
    /// `start + DEFAULT_SCAN_FACTOR`.
    pub async fn recover_consolidations(
        &self,
        start: Option<u32>,
        end: Option<u32>,
    ) -> Result<ConsolidationResult, WalletError> {
        let start = start.unwrap_or(1);
        let end = end.unwrap_or_else(|| start.saturating_add(DEFAULT_SCAN_FACTOR));
        if start < 1 || end <= start || end - start > MAX_SCAN_RANGE {
            return Err(WalletError::InvalidScanRange { start, end });
        }

        let base_address = self.derive_address(0)?;
        info!(start, end, base = %base_address, "starting consolidation recovery");

        let mut transactions = Vec::new();
        let mut last_scan_index = start;
        for index in start..end {
            self.check_cancelled(index)?;
            if let Some(sweep) = self.recover_index(&base_address, index).await? {
                transactions.push(sweep);
            }
            last_scan_index = index;
        }

        if transactions.is_empty() {
            return Err(WalletError::NoFundedAddressFound { start, end });
        }

        // the next run resumes after the last index this one covered
        if let Some(RecoveredSweep::Unsigned(last)) = transactions.last_mut() {
            last.coin_specific.last_scan_index = Some(last_scan_index);
        }

        Ok(ConsolidationResult {
            transactions,
            last_scan_index,
        })
    }

    /// Builds a sweep of address `index` if it holds funds.
    pub async fn recover_index(&self, destination: &str, index: u32) -> Result<Option<RecoveredSweep>, WalletError> {
        let path = derivation_path(index);
        let account = self.deriver.derive_public(&self.root_key, &path)?;
        let sender = self.address_of(&account);

        let info = self.node.get_account_info(&sender).await?;
        debug!(index, address = %sender, free = %info.free_balance, nonce = info.nonce, "scanned address");
        if info.free_balance == 0 {
            return Ok(None);
        }

        let header = self.node.get_header_info().await?;
        let mut builder = self.factory.get_transfer_builder();
        builder
            .sweep(false)?
            .to(destination)?
            .sender(&sender)?
            .validity(header.block_number, self.max_validity_duration)?
            .reference_block(&header.block_hash.to_hex())?
            .sequence_id(info.nonce)?
            .fee(0)?;
        let unsigned = builder.build()?;

        let Some(signing) = &self.signing else {
            info!(index, address = %sender, "built unsigned sweep");
            return Ok(Some(RecoveredSweep::Unsigned(self.unsigned_sweep(
                &unsigned,
                index,
                path,
                info.free_balance,
                header.block_number,
            )?)));
        };

        let signature = signing
            .sign(&account, &path, &unsigned.signable_payload()?)
            .await?;
        builder.add_signature(&account.to_hex(), &signature)?;
        let signed = builder.build()?;
        let id = signed.id()?;
        info!(index, address = %sender, id = %id, "built signed sweep");

        Ok(Some(RecoveredSweep::Signed(SignedSweep {
            serialized_tx: signed.to_broadcast_format()?,
            scan_index: index,
        })))
    }

    fn unsigned_sweep(
        &self,
        tx: &Transaction,
        index: u32,
        path: String,
        free_balance: u128,
        first_valid: u64,
    ) -> Result<UnsignedSweep, WalletError> {
        let value = free_balance.to_string();
        let coin = self.factory.registry().spec_name().to_string();
        let with_balance = |entries: &[Entry]| -> Vec<Entry> {
            entries
                .iter()
                .map(|e| Entry {
                    value: value.clone(),
                    ..e.clone()
                })
                .collect()
        };

        Ok(UnsignedSweep {
            serialized_tx: tx.to_broadcast_format()?,
            scan_index: index,
            coin,
            signable_hex: hex::encode(tx.signable_payload()?),
            derivation_path: path,
            parsed_tx: ParsedSweep {
                inputs: with_balance(tx.inputs()),
                outputs: with_balance(tx.outputs()),
                spend_amount: value.clone(),
            },
            fee: "0".to_string(),
            coin_specific: SweepContext {
                first_valid,
                max_duration: self.max_validity_duration,
                common_keychain: self.root_key.clone(),
                last_scan_index: None,
            },
        })
    }

    /// Attaches offline signatures to unsigned sweeps.
    ///
    /// Each signature is checked against the recorded signable payload and
    /// again against the rebuilt transaction before it is accepted.
    pub fn create_broadcastable_sweep(&self, signed: &[SweepSignature]) -> Result<BroadcastableSweeps, WalletError> {
        let mut transactions = Vec::with_capacity(signed.len());
        let mut last_scan_index = 0;

        for (i, item) in signed.iter().enumerate() {
            let tx = &item.unsigned;
            let signature: [u8; 64] = hex::decode(item.signature.trim_start_matches("0x"))?
                .try_into()
                .map_err(|_| WalletError::InvalidSweep("signature must be 64 bytes".to_string()))?;
            if tx.signable_hex.is_empty() {
                return Err(WalletError::InvalidSweep("missing signable hex".to_string()));
            }
            if tx.coin_specific.max_duration == 0 {
                return Err(WalletError::InvalidSweep("missing validity window".to_string()));
            }
            if tx.coin_specific.common_keychain.is_empty() {
                return Err(WalletError::InvalidSweep("missing common keychain".to_string()));
            }
            if tx.derivation_path.is_empty() {
                return Err(WalletError::InvalidSweep("missing derivation path".to_string()));
            }

            let message = hex::decode(&tx.signable_hex)?;
            let account = self
                .deriver
                .derive_public(&tx.coin_specific.common_keychain, &tx.derivation_path)?;
            if !verify_signature(&account, &message, &signature) {
                return Err(WalletError::Signing("invalid signature".to_string()));
            }

            let mut builder = self.factory.from(&tx.serialized_tx)?;
            builder
                .sender(&self.address_of(&account))?
                .validity(tx.coin_specific.first_valid, tx.coin_specific.max_duration)?
                .add_signature(&account.to_hex(), &signature)?;
            let rebuilt = builder.build()?;
            if !rebuilt.verify_signature() {
                return Err(WalletError::Signing(format!(
                    "signature does not match the rebuilt sweep at index {}",
                    tx.scan_index
                )));
            }

            transactions.push(SignedSweep {
                serialized_tx: rebuilt.to_broadcast_format()?,
                scan_index: tx.scan_index,
            });

            if i == signed.len() - 1 {
                last_scan_index = tx.coin_specific.last_scan_index.unwrap_or(0);
            }
        }

        Ok(BroadcastableSweeps {
            transactions,
            last_scan_index,
        })
    }
}
