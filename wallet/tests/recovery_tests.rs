use async_trait::async_trait;
use dotkit_builder::{TransactionBuilderFactory, TransactionType};
use dotkit_primitives::{encode_address, fixtures, AccountId, KeyPair, TypeRegistry};
use dotkit_wallet::{
    AccountInfo, EncryptedKey, HeaderInfo, KeystoreDecryptor, NodeRpc, PrecomputedDeriver, RecoveredSweep,
    RecoveryKeys, RecoveryScanner, SweepSignature, ThresholdSigner, WalletError,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

const ROOT_KEY: &str = "common-keychain";
const PASSPHRASE: &str = "recovery passphrase";
const FUNDED: u128 = 1_000_000_000_000;
const FUNDED_INDEX: u32 = 5;
const BLOCK_NUMBER: u64 = 3933;

/// Balances keyed by address; records every query.
#[derive(Default)]
struct MockNode {
    balances: HashMap<String, u128>,
    queried: Mutex<Vec<String>>,
    header_queries: AtomicUsize,
    /// Raises the flag once this many accounts have been queried
    cancel_after: Mutex<Option<(usize, Arc<AtomicBool>)>>,
}

impl MockNode {
    fn funded(addresses: &[String]) -> Self {
        Self {
            balances: addresses.iter().map(|a| (a.clone(), FUNDED)).collect(),
            ..Self::default()
        }
    }

    fn account_queries(&self) -> usize {
        self.queried.lock().len()
    }
}

#[async_trait]
impl NodeRpc for MockNode {
    async fn get_account_info(&self, address: &str) -> Result<AccountInfo, WalletError> {
        let count = {
            let mut queried = self.queried.lock();
            queried.push(address.to_string());
            queried.len()
        };
        if let Some((after, flag)) = &*self.cancel_after.lock() {
            if count >= *after {
                flag.store(true, Ordering::SeqCst);
            }
        }
        Ok(AccountInfo {
            nonce: 7,
            free_balance: self.balances.get(address).copied().unwrap_or(0),
        })
    }

    async fn get_header_info(&self) -> Result<HeaderInfo, WalletError> {
        self.header_queries.fetch_add(1, Ordering::SeqCst);
        Ok(HeaderInfo {
            block_number: BLOCK_NUMBER,
            block_hash: fixtures::reference_block(),
        })
    }
}

/// Stands in for the two-party ceremony: the user share is the child seed.
struct SeedSigner;

#[async_trait]
impl ThresholdSigner for SeedSigner {
    async fn sign(
        &self,
        user_share: &[u8],
        _backup_share: &[u8],
        _path: &str,
        message: &[u8],
    ) -> Result<[u8; 64], WalletError> {
        let seed: [u8; 32] = user_share
            .try_into()
            .map_err(|_| WalletError::Signing("bad share".to_string()))?;
        KeyPair::from_seed(&seed)
            .sign(message)
            .ok_or_else(|| WalletError::Signing("no private key".to_string()))
    }
}

fn factory() -> Arc<TransactionBuilderFactory> {
    Arc::new(TransactionBuilderFactory::new(Arc::new(
        TypeRegistry::from_material(&fixtures::westend_material()).unwrap(),
    )))
}

fn child_key(index: u32) -> AccountId {
    match index {
        0 => AccountId::from_hex(fixtures::ACCOUNT_3.public_key).unwrap(),
        FUNDED_INDEX => AccountId::from_hex(fixtures::ACCOUNT_1.public_key).unwrap(),
        i => *KeyPair::from_seed(&[i as u8 + 100; 32]).public(),
    }
}

fn address(index: u32) -> String {
    encode_address(&child_key(index), 42)
}

fn deriver() -> Arc<PrecomputedDeriver> {
    let mut deriver = PrecomputedDeriver::new(ROOT_KEY);
    for i in 0..40 {
        deriver.insert(format!("m/{}", i), &child_key(i));
    }
    Arc::new(deriver)
}

fn scanner(node: Arc<MockNode>) -> RecoveryScanner {
    RecoveryScanner::new(factory(), node, deriver(), ROOT_KEY)
}

fn recovery_keys(user_seed: &str, passphrase: &str) -> RecoveryKeys {
    let seed = hex::decode(user_seed).unwrap();
    RecoveryKeys {
        user_key: EncryptedKey::seal(&seed, PASSPHRASE).unwrap().to_json().unwrap(),
        backup_key: EncryptedKey::seal(b"backup share", PASSPHRASE).unwrap().to_json().unwrap(),
        passphrase: passphrase.to_string(),
    }
}

fn signing_scanner(node: Arc<MockNode>, keys: RecoveryKeys) -> RecoveryScanner {
    scanner(node).with_signing(keys, Arc::new(KeystoreDecryptor), Arc::new(SeedSigner))
}

// ============================================================================
// Scanning
// ============================================================================

#[tokio::test]
async fn test_scan_stops_at_first_funded_index() {
    let node = Arc::new(MockNode::funded(&[address(FUNDED_INDEX)]));
    let scanner = scanner(node.clone());

    let sweep = scanner.scan(fixtures::ACCOUNT_2.address, 0, 20).await.unwrap();

    assert_eq!(sweep.scan_index(), FUNDED_INDEX);
    assert_eq!(node.account_queries(), 6);
    assert_eq!(node.header_queries.load(Ordering::SeqCst), 1);
    assert_eq!(
        *node.queried.lock(),
        (0..=FUNDED_INDEX).map(address).collect::<Vec<_>>()
    );

    let RecoveredSweep::Unsigned(unsigned) = sweep else {
        panic!("expected an unsigned sweep");
    };
    assert_eq!(unsigned.derivation_path, "m/5");
    assert_eq!(unsigned.coin, "westend");
    assert_eq!(unsigned.fee, "0");
    assert_eq!(unsigned.parsed_tx.spend_amount, FUNDED.to_string());
    assert_eq!(unsigned.parsed_tx.inputs[0].address, address(FUNDED_INDEX));
    assert_eq!(unsigned.parsed_tx.outputs[0].address, fixtures::ACCOUNT_2.address);
    assert_eq!(unsigned.parsed_tx.outputs[0].value, FUNDED.to_string());
    assert_eq!(unsigned.coin_specific.first_valid, BLOCK_NUMBER);
    assert_eq!(unsigned.coin_specific.max_duration, 2400);
    assert_eq!(unsigned.coin_specific.common_keychain, ROOT_KEY);
}

#[tokio::test]
async fn test_unsigned_sweep_is_a_keep_alive_false_transfer_all() {
    let node = Arc::new(MockNode::funded(&[address(FUNDED_INDEX)]));
    let sweep = scanner(node).scan(fixtures::ACCOUNT_2.address, 0, 20).await.unwrap();

    let factory = factory();
    let mut builder = factory.from(sweep.serialized_tx()).unwrap();
    assert_eq!(builder.transaction_type(), TransactionType::Send);
    builder.sender(&address(FUNDED_INDEX)).unwrap();
    let tx = builder.build().unwrap();

    assert_eq!(tx.call().method(), "transfer_all");
    let data = tx.to_json().unwrap();
    assert_eq!(data.keep_alive, Some(false));
    assert_eq!(data.nonce, 7);
    assert_eq!(data.tip, "0");
    assert_eq!(tx.to_broadcast_format().unwrap(), sweep.serialized_tx());
}

#[tokio::test]
async fn test_no_funded_address_is_terminal() {
    let node = Arc::new(MockNode::default());
    let result = scanner(node.clone()).scan(fixtures::ACCOUNT_2.address, 3, 10).await;

    assert!(matches!(
        result,
        Err(WalletError::NoFundedAddressFound { start: 3, end: 13 })
    ));
    assert_eq!(node.account_queries(), 10);
    assert_eq!(node.header_queries.load(Ordering::SeqCst), 0);
}

#[test]
fn test_invalid_destination_and_range() {
    let node = Arc::new(MockNode::default());
    let scanner = scanner(node.clone());
    assert!(matches!(
        tokio_test::block_on(scanner.scan("not-an-address", 0, 20)),
        Err(WalletError::InvalidAddress(_))
    ));
    assert!(matches!(
        tokio_test::block_on(scanner.scan(fixtures::ACCOUNT_2.address, 0, 0)),
        Err(WalletError::InvalidScanRange { .. })
    ));
    assert_eq!(node.account_queries(), 0);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_before_scan() {
    let node = Arc::new(MockNode::funded(&[address(FUNDED_INDEX)]));
    let scanner = scanner(node.clone());
    scanner.cancel();

    assert!(matches!(
        scanner.scan(fixtures::ACCOUNT_2.address, 0, 20).await,
        Err(WalletError::Cancelled(0))
    ));
    assert_eq!(node.account_queries(), 0);
}

#[tokio::test]
async fn test_cancel_between_iterations() {
    let node = Arc::new(MockNode::funded(&[address(FUNDED_INDEX)]));
    let scanner = scanner(node.clone());
    *node.cancel_after.lock() = Some((3, scanner.cancel_handle()));

    // the third query raises the flag; index 3 is never scanned
    assert!(matches!(
        scanner.scan(fixtures::ACCOUNT_2.address, 0, 20).await,
        Err(WalletError::Cancelled(3))
    ));
    assert_eq!(node.account_queries(), 3);
}

// ============================================================================
// Signing
// ============================================================================

#[tokio::test]
async fn test_signed_sweep_with_key_shares() {
    let node = Arc::new(MockNode::funded(&[address(FUNDED_INDEX)]));
    let scanner = signing_scanner(node.clone(), recovery_keys(fixtures::ACCOUNT_1.seed, PASSPHRASE));

    let sweep = scanner.scan(fixtures::ACCOUNT_2.address, 0, 20).await.unwrap();
    let RecoveredSweep::Signed(signed) = &sweep else {
        panic!("expected a signed sweep");
    };
    assert_eq!(signed.scan_index, FUNDED_INDEX);
    assert_eq!(node.account_queries(), 6);

    let factory = factory();
    let mut builder = factory.from(&signed.serialized_tx).unwrap();
    builder.reference_block(fixtures::REFERENCE_BLOCK).unwrap();
    let tx = builder.build().unwrap();
    assert!(tx.is_signed());
    assert!(tx.verify_signature());
    assert_eq!(tx.to_json().unwrap().sender, address(FUNDED_INDEX));
    assert_eq!(tx.to_broadcast_format().unwrap(), signed.serialized_tx);
}

#[tokio::test]
async fn test_wrong_passphrase_is_reported() {
    let node = Arc::new(MockNode::funded(&[address(FUNDED_INDEX)]));
    let scanner = signing_scanner(node, recovery_keys(fixtures::ACCOUNT_1.seed, "wrong"));
    assert!(matches!(
        scanner.scan(fixtures::ACCOUNT_2.address, 0, 20).await,
        Err(WalletError::InvalidPassword)
    ));
}

#[tokio::test]
async fn test_signature_for_another_key_is_rejected() {
    let node = Arc::new(MockNode::funded(&[address(FUNDED_INDEX)]));
    let scanner = signing_scanner(node, recovery_keys(fixtures::ACCOUNT_2.seed, PASSPHRASE));
    assert!(matches!(
        scanner.scan(fixtures::ACCOUNT_2.address, 0, 20).await,
        Err(WalletError::Signing(_))
    ));
}

// ============================================================================
// Offline signing round trip
// ============================================================================

#[tokio::test]
async fn test_offline_signature_matches_local_signing() {
    let node = Arc::new(MockNode::funded(&[address(FUNDED_INDEX)]));
    let RecoveredSweep::Unsigned(unsigned) = scanner(node.clone())
        .scan(fixtures::ACCOUNT_2.address, 0, 20)
        .await
        .unwrap()
    else {
        panic!("expected an unsigned sweep");
    };

    let key = KeyPair::from_private_hex(fixtures::ACCOUNT_1.seed).unwrap();
    let signature = key.sign(&hex::decode(&unsigned.signable_hex).unwrap()).unwrap();
    let broadcastable = scanner(node.clone())
        .create_broadcastable_sweep(&[SweepSignature {
            unsigned: unsigned.clone(),
            signature: hex::encode(signature),
        }])
        .unwrap();
    assert_eq!(broadcastable.transactions.len(), 1);
    assert_eq!(broadcastable.transactions[0].scan_index, FUNDED_INDEX);

    let signed = signing_scanner(node, recovery_keys(fixtures::ACCOUNT_1.seed, PASSPHRASE))
        .scan(fixtures::ACCOUNT_2.address, 0, 20)
        .await
        .unwrap();
    assert_eq!(broadcastable.transactions[0].serialized_tx, signed.serialized_tx());
}

#[tokio::test]
async fn test_broadcastable_sweep_rejects_bad_input() {
    let node = Arc::new(MockNode::funded(&[address(FUNDED_INDEX)]));
    let scanner = scanner(node);
    let RecoveredSweep::Unsigned(unsigned) = scanner.scan(fixtures::ACCOUNT_2.address, 0, 20).await.unwrap() else {
        panic!("expected an unsigned sweep");
    };

    let other = KeyPair::from_private_hex(fixtures::ACCOUNT_2.seed).unwrap();
    let forged = other.sign(&hex::decode(&unsigned.signable_hex).unwrap()).unwrap();
    assert!(matches!(
        scanner.create_broadcastable_sweep(&[SweepSignature {
            unsigned: unsigned.clone(),
            signature: hex::encode(forged),
        }]),
        Err(WalletError::Signing(_))
    ));

    assert!(matches!(
        scanner.create_broadcastable_sweep(&[SweepSignature {
            unsigned: unsigned.clone(),
            signature: "abcd".to_string(),
        }]),
        Err(WalletError::InvalidSweep(_))
    ));

    let mut no_window = unsigned;
    no_window.coin_specific.max_duration = 0;
    assert!(matches!(
        scanner.create_broadcastable_sweep(&[SweepSignature {
            unsigned: no_window,
            signature: hex::encode([0u8; 64]),
        }]),
        Err(WalletError::InvalidSweep(_))
    ));
}

// ============================================================================
// Consolidation
// ============================================================================

#[tokio::test]
async fn test_consolidation_sweeps_into_base_address() {
    let node = Arc::new(MockNode::funded(&[address(3), address(7)]));
    let result = scanner(node.clone())
        .recover_consolidations(Some(1), Some(10))
        .await
        .unwrap();

    assert_eq!(node.account_queries(), 9);
    assert_eq!(result.last_scan_index, 9);
    assert_eq!(
        result.transactions.iter().map(|t| t.scan_index()).collect::<Vec<_>>(),
        vec![3, 7]
    );

    let unsigned: Vec<_> = result
        .transactions
        .iter()
        .map(|t| match t {
            RecoveredSweep::Unsigned(u) => u,
            RecoveredSweep::Signed(_) => panic!("expected unsigned sweeps"),
        })
        .collect();
    assert!(unsigned.iter().all(|u| u.parsed_tx.outputs[0].address == address(0)));
    assert_eq!(unsigned[0].coin_specific.last_scan_index, None);
    assert_eq!(unsigned[1].coin_specific.last_scan_index, Some(9));
}

#[tokio::test]
async fn test_consolidation_defaults_and_limits() {
    let node = Arc::new(MockNode::funded(&[address(20)]));
    let scanner = scanner(node.clone());

    let result = scanner.recover_consolidations(None, None).await.unwrap();
    assert_eq!(node.account_queries(), 20);
    assert_eq!(result.last_scan_index, 20);

    assert!(matches!(
        scanner.recover_consolidations(Some(0), None).await,
        Err(WalletError::InvalidScanRange { start: 0, .. })
    ));
    assert!(matches!(
        scanner.recover_consolidations(Some(5), Some(5)).await,
        Err(WalletError::InvalidScanRange { .. })
    ));
    assert!(matches!(
        scanner.recover_consolidations(Some(1), Some(202)).await,
        Err(WalletError::InvalidScanRange { .. })
    ));
}

#[tokio::test]
async fn test_consolidation_without_funds() {
    let node = Arc::new(MockNode::default());
    assert!(matches!(
        scanner(node).recover_consolidations(Some(1), Some(4)).await,
        Err(WalletError::NoFundedAddressFound { start: 1, end: 4 })
    ));
}
