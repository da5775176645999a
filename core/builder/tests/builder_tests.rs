use dotkit_builder::{
    AnyBuilder, BuilderError, ProxyAction, TransactionBuilderFactory, TransactionType,
    STAKING_DESTINATION,
};
use dotkit_primitives::{fixtures, KeyPair, ProxyType, TypeRegistry};
use proptest::prelude::*;
use std::sync::Arc;

const AMOUNT: &str = "90034235235322";

const SIGNATURE: &str = "b6d868a11d202b56df1959f5d5f81f44ce1f95c8e70424b17080ea869d1c39d4\
                         53f16c38fbef600a636c9a62a49ede5ee695a1822faf2f94fcfbb184a4254009";

const SIGNED_TRANSFER: &str = "0x4902840061b18c6dc02ddcabdeac56cb4f21a971cc41cc97640f6f85b073480008c53a0d\
                               00b6d868a11d202b56df1959f5d5f81f44ce1f95c8e70424b17080ea869d1c39d4\
                               53f16c38fbef600a636c9a62a49ede5ee695a1822faf2f94fcfbb184a4254009\
                               d5012103000403009f7b0675db59d19b4bd9c8c72eaabba75a9863d02b30115b8b3c3ca5c20f0254\
                               0bfadb9bbae251";

const SIGNED_TRANSFER_ID: &str = "0x1bfc5e4d800c4382548ed7128c16a44cf865b62ed816a061657abf3327ba92bf";

const UNSIGNED_TRANSFER: &str = "0xa80403009f7b0675db59d19b4bd9c8c72eaabba75a9863d02b30115b8b3c3ca5c20f0254\
                                 0bfadb9bbae251d501210300be23000008000000\
                                 e143f23803ac50e8f6f8e62695d1ce9e4e1d68aa36c1cd2cfd15340213f3423e\
                                 149799bc9602cb5cf201f3425fb8d253b2d4e61fc119dcab3249f307f594754d";

fn factory() -> TransactionBuilderFactory {
    TransactionBuilderFactory::new(Arc::new(
        TypeRegistry::from_material(&fixtures::westend_material()).unwrap(),
    ))
}

fn signature() -> Vec<u8> {
    hex::decode(SIGNATURE).unwrap()
}

fn transfer(factory: &TransactionBuilderFactory, amount: &str, nonce: u32) -> dotkit_builder::TransferBuilder {
    let mut builder = factory.get_transfer_builder();
    builder
        .sender(fixtures::ACCOUNT_1.address)
        .unwrap()
        .validity(3933, 64)
        .unwrap()
        .reference_block(fixtures::REFERENCE_BLOCK)
        .unwrap()
        .sequence_id(nonce)
        .unwrap()
        .fee(0)
        .unwrap()
        .to(fixtures::ACCOUNT_2.address)
        .unwrap()
        .amount(amount)
        .unwrap();
    builder
}

fn with_base(builder: &mut AnyBuilder) {
    builder
        .sender(fixtures::ACCOUNT_1.address)
        .unwrap()
        .reference_block(fixtures::REFERENCE_BLOCK)
        .unwrap();
}

// ============================================================================
// Golden vectors
// ============================================================================

#[test]
fn test_signed_transfer_golden_vector() {
    let factory = factory();
    let mut builder = transfer(&factory, AMOUNT, 200);
    builder
        .add_signature(fixtures::ACCOUNT_1.public_key, &signature())
        .unwrap();

    let tx = builder.build().unwrap();
    assert_eq!(tx.to_broadcast_format().unwrap(), SIGNED_TRANSFER);
    assert_eq!(tx.id().unwrap(), SIGNED_TRANSFER_ID);
    assert!(tx.verify_signature());
}

#[test]
fn test_unsigned_transfer_golden_vector() {
    let factory = factory();
    let tx = transfer(&factory, AMOUNT, 200).build().unwrap();
    assert_eq!(tx.to_broadcast_format().unwrap(), UNSIGNED_TRANSFER);
    assert_eq!(
        hex::encode(tx.signable_payload().unwrap()),
        UNSIGNED_TRANSFER[4..]
    );
}

#[test]
fn test_local_key_matches_external_signature() {
    let factory = factory();
    let key = KeyPair::from_private_hex(fixtures::ACCOUNT_1.seed).unwrap();
    let mut builder = transfer(&factory, AMOUNT, 200);
    builder.sign(&key).unwrap();
    assert_eq!(builder.build().unwrap().to_broadcast_format().unwrap(), SIGNED_TRANSFER);
}

#[test]
fn test_single_field_changes_change_bytes() {
    let factory = factory();
    let reference = transfer(&factory, AMOUNT, 200).build().unwrap().to_broadcast_format().unwrap();

    let amount = transfer(&factory, "90034235235323", 200).build().unwrap();
    let nonce = transfer(&factory, AMOUNT, 201).build().unwrap();
    let mut other_sender = transfer(&factory, AMOUNT, 200);
    other_sender
        .sender(fixtures::ACCOUNT_3.address)
        .unwrap()
        .add_signature(fixtures::ACCOUNT_3.public_key, &signature())
        .unwrap();
    let mut signed = transfer(&factory, AMOUNT, 200);
    signed
        .add_signature(fixtures::ACCOUNT_1.public_key, &signature())
        .unwrap();

    assert_ne!(amount.to_broadcast_format().unwrap(), reference);
    assert_ne!(nonce.to_broadcast_format().unwrap(), reference);
    assert_ne!(
        other_sender.build().unwrap().to_broadcast_format().unwrap(),
        signed.build().unwrap().to_broadcast_format().unwrap()
    );
}

// ============================================================================
// Idempotence and decode-then-rebuild
// ============================================================================

#[test]
fn test_build_is_idempotent() {
    let factory = factory();
    let mut builder = transfer(&factory, AMOUNT, 200);
    builder
        .add_signature(fixtures::ACCOUNT_1.public_key, &signature())
        .unwrap();
    let first = builder.build().unwrap().to_broadcast_format().unwrap();
    let second = builder.build().unwrap().to_broadcast_format().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_signed_bytes_rebuild_identically() {
    let factory = factory();
    let mut builder = factory.from(SIGNED_TRANSFER).unwrap();
    assert_eq!(builder.transaction_type(), TransactionType::Send);
    // a signed extrinsic does not carry its reference block
    assert!(builder.build().is_err());

    builder.reference_block(fixtures::REFERENCE_BLOCK).unwrap();
    let tx = builder.build().unwrap();
    assert!(tx.is_signed());
    assert_eq!(tx.to_broadcast_format().unwrap(), SIGNED_TRANSFER);

    let data = tx.to_json().unwrap();
    assert_eq!(data.sender, fixtures::ACCOUNT_1.address);
    assert_eq!(data.to.as_deref(), Some(fixtures::ACCOUNT_2.address));
    assert_eq!(data.amount.as_deref(), Some(AMOUNT));
    assert_eq!(data.nonce, 200);
    assert_eq!(data.era_period, 64);
}

#[test]
fn test_signing_payload_rebuilds_identically() {
    let factory = factory();
    let mut builder = factory.from(UNSIGNED_TRANSFER).unwrap();
    builder.sender(fixtures::ACCOUNT_1.address).unwrap();
    let tx = builder.build().unwrap();
    assert!(!tx.is_signed());
    assert_eq!(tx.to_broadcast_format().unwrap(), UNSIGNED_TRANSFER);

    // attach the external signature and get the golden extrinsic
    builder
        .add_signature(fixtures::ACCOUNT_1.public_key, &signature())
        .unwrap();
    assert_eq!(builder.build().unwrap().to_broadcast_format().unwrap(), SIGNED_TRANSFER);
}

#[test]
fn test_every_type_rebuilds_from_its_payload() {
    let factory = factory();
    let mut unsigned = Vec::new();

    let mut sweep = factory.get_transfer_builder();
    sweep.to(fixtures::ACCOUNT_2.address).unwrap().sweep(false).unwrap();
    unsigned.push((TransactionType::Send, AnyBuilder::Transfer(sweep)));

    let mut proxied = factory.get_transfer_builder();
    proxied
        .owner(fixtures::ACCOUNT_3.address)
        .unwrap()
        .force_proxy_type(ProxyType::Any)
        .unwrap()
        .to(fixtures::ACCOUNT_2.address)
        .unwrap()
        .amount(AMOUNT)
        .unwrap();
    unsigned.push((TransactionType::Send, AnyBuilder::Transfer(proxied)));

    let mut bond = factory.get_staking_builder();
    bond.amount("500000000000").unwrap().payee(fixtures::ACCOUNT_2.address).unwrap();
    unsigned.push((TransactionType::StakingActivate, AnyBuilder::Staking(bond)));

    let mut bond_extra = factory.get_staking_builder();
    bond_extra.amount(7).unwrap().add_to_stake(true).unwrap();
    unsigned.push((TransactionType::StakingActivate, AnyBuilder::Staking(bond_extra)));

    let mut unstake = factory.get_unstake_builder();
    unstake.amount(12).unwrap();
    unsigned.push((TransactionType::StakingUnlock, AnyBuilder::Unstake(unstake)));

    let mut withdraw = factory.get_withdraw_unstaked_builder();
    withdraw.slashing_spans(0).unwrap();
    unsigned.push((TransactionType::StakingWithdraw, AnyBuilder::WithdrawUnstaked(withdraw)));

    let mut claim = factory.get_claim_builder();
    claim.validator_stash(fixtures::ACCOUNT_3.address).unwrap().claim_era(1204).unwrap();
    unsigned.push((TransactionType::StakingClaim, AnyBuilder::Claim(claim)));

    unsigned.push((
        TransactionType::StakingUnvote,
        AnyBuilder::Unnominate(factory.get_unnominate_builder()),
    ));

    let mut pure = factory.get_address_initialization_builder();
    pure.create_pure().unwrap().proxy_type(ProxyType::Any).unwrap().delay(0).unwrap().index(0).unwrap();
    unsigned.push((TransactionType::AddressInitialization, AnyBuilder::AddressInitialization(pure)));

    for (expected_type, mut builder) in unsigned {
        with_base(&mut builder);
        builder.validity(3933, 64).unwrap().sequence_id(3).unwrap().fee(10).unwrap();
        let payload = builder.build().unwrap().to_broadcast_format().unwrap();

        let mut decoded = factory.from(&payload).unwrap();
        assert_eq!(decoded.transaction_type(), expected_type);
        decoded.sender(fixtures::ACCOUNT_1.address).unwrap();
        let rebuilt = decoded.build().unwrap();
        assert_eq!(rebuilt.to_broadcast_format().unwrap(), payload);
        assert_eq!(rebuilt.base().tip, 10);
    }
}

#[test]
fn test_immortal_transaction_round_trip() {
    let factory = factory();
    let mut builder = transfer(&factory, AMOUNT, 0);
    builder.validity(0, 0).unwrap();
    let payload = builder.build().unwrap().to_broadcast_format().unwrap();
    assert!(payload.ends_with(&fixtures::GENESIS_HASH[2..]));

    let mut decoded = factory.from(&payload).unwrap();
    decoded.sender(fixtures::ACCOUNT_1.address).unwrap();
    assert_eq!(decoded.build().unwrap().to_broadcast_format().unwrap(), payload);
}

// ============================================================================
// Batches
// ============================================================================

fn call_hex(builder_payload: &str) -> String {
    // payload = compact(len) ++ call ++ ...; every call used here is < 64 bytes
    let bytes = hex::decode(&builder_payload[2..]).unwrap();
    let len = (bytes[0] >> 2) as usize;
    format!("0x{}", hex::encode(&bytes[1..1 + len]))
}

fn bond_and_add_proxy(factory: &TransactionBuilderFactory) -> Vec<String> {
    let mut bond = factory.get_staking_builder();
    bond.amount("500000000000").unwrap().payee("Staked").unwrap();
    let mut bond = AnyBuilder::Staking(bond);
    with_base(&mut bond);
    bond.validity(3933, 64).unwrap().sequence_id(0).unwrap();

    let mut proxy = factory.get_address_initialization_builder();
    proxy
        .owner(fixtures::ACCOUNT_2.address)
        .unwrap()
        .proxy_type(ProxyType::Staking)
        .unwrap()
        .delay(0)
        .unwrap();
    let mut proxy = AnyBuilder::AddressInitialization(proxy);
    with_base(&mut proxy);
    proxy.validity(3933, 64).unwrap().sequence_id(0).unwrap();

    vec![
        call_hex(&bond.build().unwrap().to_broadcast_format().unwrap()),
        call_hex(&proxy.build().unwrap().to_broadcast_format().unwrap()),
    ]
}

fn batch(factory: &TransactionBuilderFactory, calls: &[String]) -> dotkit_builder::BatchTransactionBuilder {
    let mut builder = factory.get_batch_builder();
    builder
        .sender(fixtures::ACCOUNT_1.address)
        .unwrap()
        .validity(3933, 64)
        .unwrap()
        .reference_block(fixtures::REFERENCE_BLOCK)
        .unwrap()
        .sequence_id(0)
        .unwrap()
        .atomic(true)
        .unwrap()
        .calls(calls)
        .unwrap();
    builder
}

#[test]
fn test_stake_batch_deposit_comes_from_chain_constants() {
    let factory = factory();
    let registry = factory.registry().clone();
    let deposit = registry.constant_u128("Proxy", "ProxyDepositBase").unwrap()
        + registry.constant_u128("Proxy", "ProxyDepositFactor").unwrap();

    let tx = batch(&factory, &bond_and_add_proxy(&factory)).build().unwrap();
    assert_eq!(tx.outputs().len(), 2);
    assert_eq!(tx.outputs()[0].address, STAKING_DESTINATION);
    assert_eq!(tx.outputs()[0].value, "500000000000");
    assert_eq!(tx.outputs()[1].address, fixtures::ACCOUNT_2.address);
    assert_eq!(tx.outputs()[1].value, deposit.to_string());

    // same decomposition after a trip through the wire format
    let mut decoded = factory.from(&tx.to_broadcast_format().unwrap()).unwrap();
    decoded.sender(fixtures::ACCOUNT_1.address).unwrap();
    let rebuilt = decoded.build().unwrap();
    assert_eq!(rebuilt.outputs(), tx.outputs());
    assert_eq!(rebuilt.transaction_type(), TransactionType::Batch);

    let explanation = rebuilt.explain_transaction().unwrap();
    assert_eq!(
        explanation.output_amount,
        (500_000_000_000u128 + deposit).to_string()
    );
}

#[test]
fn test_unstake_batch_returns_deposit() {
    let factory = factory();
    let registry = factory.registry().clone();
    let deposit = fixtures::PROXY_DEPOSIT_BASE + fixtures::PROXY_DEPOSIT_FACTOR;
    let staking = registry.call("Staking", "chill").unwrap().0.index;
    let proxy = registry.call("Proxy", "remove_proxy").unwrap();

    let calls = vec![
        format!(
            "0x{:02x}{:02x}00{}0200000000",
            proxy.0.index,
            proxy.1.index,
            fixtures::ACCOUNT_2.public_key
        ),
        format!("0x{:02x}06", staking),
        format!("0x{:02x}0204", staking),
    ];
    let tx = batch(&factory, &calls).build().unwrap();
    assert_eq!(tx.inputs()[0].address, fixtures::ACCOUNT_2.address);
    assert_eq!(tx.outputs()[0].address, fixtures::ACCOUNT_1.address);
    assert_eq!(tx.outputs()[0].value, deposit.to_string());
}

#[test]
fn test_batch_preserves_call_order() {
    let factory = factory();
    let mut calls = bond_and_add_proxy(&factory);
    calls.reverse();
    let tx = batch(&factory, &calls).build().unwrap();
    // not an allowlisted pattern
    assert!(tx.outputs().is_empty());

    let data = tx.to_json().unwrap();
    let methods: Vec<_> = data
        .batch_calls
        .unwrap()
        .iter()
        .map(|c| c["method"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(methods, vec!["add_proxy", "bond"]);
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_unknown_call_index_is_decode_error() {
    let factory = factory();
    // replace the call with an index pair the runtime does not know
    let payload = format!("0x08{}{}", "6300", &UNSIGNED_TRANSFER[2 + 2 + 84..]);
    assert!(matches!(factory.from(&payload), Err(BuilderError::Decode(_))));
}

#[test]
fn test_known_but_unsupported_call() {
    let factory = factory();
    // Staking.nominate with no targets
    let payload = format!(
        "0x0c{:02x}0500{}",
        fixtures::STAKING_INDEX,
        &UNSIGNED_TRANSFER[2 + 2 + 84..]
    );
    assert!(matches!(
        factory.from(&payload),
        Err(BuilderError::UnsupportedTransactionType(ref t)) if t == "Staking.nominate"
    ));
}

#[test]
fn test_tampered_spec_version_fails_validation() {
    let factory = factory();
    let tampered = UNSIGNED_TRANSFER.replace("be230000", "bf230000");
    assert!(matches!(
        factory.from(&tampered),
        Err(BuilderError::Validation(ref v)) if v.field == "specVersion"
    ));
}

#[test]
fn test_proxy_type_resolution_follows_runtime() {
    let factory = factory();
    let mut builder = factory.get_address_initialization_builder();
    builder
        .sender(fixtures::ACCOUNT_1.address)
        .unwrap()
        .validity(1, 64)
        .unwrap()
        .reference_block(fixtures::REFERENCE_BLOCK)
        .unwrap()
        .sequence_id(0)
        .unwrap()
        .owner(fixtures::ACCOUNT_2.address)
        .unwrap()
        .proxy_type(ProxyType::Staking)
        .unwrap()
        .delay(0)
        .unwrap();
    let data = builder.build().unwrap().to_json().unwrap();
    assert_eq!(data.args["proxy_type"], "Staking");
    assert_eq!(ProxyAction::default(), ProxyAction::Add);
}

#[test]
fn test_metadata_hash_runtime_round_trip() {
    let registry = Arc::new(
        TypeRegistry::from_material(&fixtures::westend_material_with_metadata_hash()).unwrap(),
    );
    let factory = TransactionBuilderFactory::new(registry);
    let mut builder = transfer(&factory, AMOUNT, 200);
    let key = KeyPair::from_private_hex(fixtures::ACCOUNT_1.seed).unwrap();
    builder.sign(&key).unwrap();
    let tx = builder.build().unwrap();
    assert!(tx.verify_signature());

    let mut decoded = factory.from(&tx.to_broadcast_format().unwrap()).unwrap();
    decoded.reference_block(fixtures::REFERENCE_BLOCK).unwrap();
    assert_eq!(
        decoded.build().unwrap().to_broadcast_format().unwrap(),
        tx.to_broadcast_format().unwrap()
    );
}

proptest! {
    #[test]
    fn prop_negative_values_always_rejected(value in i64::MIN..0) {
        let factory = factory();
        let mut transfer = factory.get_transfer_builder();
        prop_assert!(matches!(transfer.amount(value), Err(BuilderError::Validation(_))));
        prop_assert!(matches!(transfer.sequence_id(value), Err(BuilderError::Validation(_))));
        prop_assert!(matches!(transfer.fee(value), Err(BuilderError::Validation(_))));
        prop_assert!(matches!(transfer.validity(value, 64), Err(BuilderError::Validation(_))));
        prop_assert!(matches!(transfer.validity(0, value), Err(BuilderError::Validation(_))));

        let mut stake = factory.get_staking_builder();
        prop_assert!(stake.amount(value).is_err());
        let mut unstake = factory.get_unstake_builder();
        prop_assert!(unstake.amount(value).is_err());
        let mut withdraw = factory.get_withdraw_unstaked_builder();
        prop_assert!(withdraw.slashing_spans(value).is_err());
        let mut claim = factory.get_claim_builder();
        prop_assert!(claim.claim_era(value).is_err());
        let mut proxy = factory.get_address_initialization_builder();
        prop_assert!(proxy.delay(value).is_err());
        prop_assert!(proxy.index(value).is_err());
    }
}
