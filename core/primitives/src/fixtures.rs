//! Deterministic Westend-like runtime metadata and well known accounts.
//!
//! The call enums below mirror the argument layout of the live runtime so
//! that metadata built from them drives the same encoding paths as metadata
//! fetched from a node.

#![allow(non_camel_case_types, dead_code)]

use crate::material::Material;
use crate::types::Hash;
use frame_metadata::v14::{
    ExtrinsicMetadata, PalletCallMetadata, PalletConstantMetadata, PalletMetadata,
    RuntimeMetadataV14, SignedExtensionMetadata,
};
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed, META_RESERVED};
use parity_scale_codec::{Compact, Encode};
use scale_info::{meta_type, TypeInfo};

pub const GENESIS_HASH: &str = "0xe143f23803ac50e8f6f8e62695d1ce9e4e1d68aa36c1cd2cfd15340213f3423e";
pub const REFERENCE_BLOCK: &str = "0x149799bc9602cb5cf201f3425fb8d253b2d4e61fc119dcab3249f307f594754d";
pub const SPEC_VERSION: u32 = 9150;
pub const TX_VERSION: u32 = 8;
/// Spec version of the runtime that also runs `CheckMetadataHash`.
pub const METADATA_HASH_SPEC_VERSION: u32 = 1_011_000;

pub const PROXY_DEPOSIT_BASE: u128 = 1_000_400_000_000;
pub const PROXY_DEPOSIT_FACTOR: u128 = 1_650_000_000;
pub const EXISTENTIAL_DEPOSIT: u128 = 10_000_000_000;

pub const BALANCES_INDEX: u8 = 4;
pub const STAKING_INDEX: u8 = 6;
pub const UTILITY_INDEX: u8 = 16;
pub const PROXY_INDEX: u8 = 22;

#[derive(Debug, Clone, Copy)]
pub struct TestAccount {
    pub seed: &'static str,
    pub public_key: &'static str,
    pub address: &'static str,
}

pub const ACCOUNT_1: TestAccount = TestAccount {
    seed: "874578010603af8e93b44bfc1d13b32830d0dbca6c89f28ccdc662afd3cdc824",
    public_key: "61b18c6dc02ddcabdeac56cb4f21a971cc41cc97640f6f85b073480008c53a0d",
    address: "5EGoFA95omzemRssELLDjVenNZ68aXyUeqtKQScXSEBvVJkr",
};

pub const ACCOUNT_2: TestAccount = TestAccount {
    seed: "6f850d17c2bf64478a2aac860fe9c23a48d322f12932c43fe90704553b7b84fd",
    public_key: "9f7b0675db59d19b4bd9c8c72eaabba75a9863d02b30115b8b3c3ca5c20f0254",
    address: "5Ffp1wJCPu4hzVDTo7XaMLqZSvSadyUQmxWPDw74CBjECSoq",
};

pub const ACCOUNT_3: TestAccount = TestAccount {
    seed: "ff2f0c73e7e8a34ba80401efa06f16cbb3406ca1f04b4fc618bc937643eef498",
    public_key: "d472bd6e0f1f92297631938e30edb682208c2cd2698d80cf678c53a69979eb9f",
    address: "5GsG6P9EqkbmTrM1GE5bcQx9nsSq74KueiLa1kNZiwagFxW4",
};

pub const DEFAULT_ACCOUNT: TestAccount = TestAccount {
    seed: "0000000000000000000000000000000000000000000000000000000000000000",
    public_key: "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29",
    address: "5DQcDYQ3wwobcrJ5aE5CzGp34ZWYNeYfYZ1yLbPiU2RcSvwm",
};

// ===== Runtime shape =====

#[derive(TypeInfo)]
enum MultiAddress {
    Id([u8; 32]),
    Index(#[codec(compact)] u32),
    Raw(Vec<u8>),
    Address32([u8; 32]),
    Address20([u8; 20]),
}

#[derive(TypeInfo)]
enum RewardDestination {
    Staked,
    Stash,
    Controller,
    Account([u8; 32]),
    None,
}

#[derive(TypeInfo)]
enum ProxyType {
    Any,
    NonTransfer,
    Staking,
    SudoBalances,
    IdentityJudgement,
    CancelProxy,
    Auction,
    NominationPools,
}

#[derive(TypeInfo)]
enum SystemCall {
    #[codec(index = 0)]
    remark { remark: Vec<u8> },
}

#[derive(TypeInfo)]
enum BalancesCall {
    #[codec(index = 0)]
    transfer_allow_death {
        dest: MultiAddress,
        #[codec(compact)]
        value: u128,
    },
    #[codec(index = 3)]
    transfer_keep_alive {
        dest: MultiAddress,
        #[codec(compact)]
        value: u128,
    },
    #[codec(index = 4)]
    transfer_all { dest: MultiAddress, keep_alive: bool },
}

#[derive(TypeInfo)]
enum StakingCall {
    #[codec(index = 0)]
    bond {
        #[codec(compact)]
        value: u128,
        payee: RewardDestination,
    },
    #[codec(index = 1)]
    bond_extra {
        #[codec(compact)]
        max_additional: u128,
    },
    #[codec(index = 2)]
    unbond {
        #[codec(compact)]
        value: u128,
    },
    #[codec(index = 3)]
    withdraw_unbonded { num_slashing_spans: u32 },
    #[codec(index = 5)]
    nominate { targets: Vec<MultiAddress> },
    #[codec(index = 6)]
    chill,
    #[codec(index = 18)]
    payout_stakers { validator_stash: [u8; 32], era: u32 },
}

#[derive(TypeInfo)]
enum UtilityCall {
    #[codec(index = 0)]
    batch { calls: Vec<RuntimeCall> },
    #[codec(index = 1)]
    as_derivative { index: u16, call: Box<RuntimeCall> },
    #[codec(index = 2)]
    batch_all { calls: Vec<RuntimeCall> },
}

#[derive(TypeInfo)]
enum ProxyCall {
    #[codec(index = 0)]
    proxy {
        real: MultiAddress,
        force_proxy_type: Option<ProxyType>,
        call: Box<RuntimeCall>,
    },
    #[codec(index = 1)]
    add_proxy {
        delegate: MultiAddress,
        proxy_type: ProxyType,
        delay: u32,
    },
    #[codec(index = 2)]
    remove_proxy {
        delegate: MultiAddress,
        proxy_type: ProxyType,
        delay: u32,
    },
    #[codec(index = 4)]
    create_pure {
        proxy_type: ProxyType,
        delay: u32,
        index: u16,
    },
}

#[derive(TypeInfo)]
enum RuntimeCall {
    #[codec(index = 0)]
    System(SystemCall),
    #[codec(index = 4)]
    Balances(BalancesCall),
    #[codec(index = 6)]
    Staking(StakingCall),
    #[codec(index = 16)]
    Utility(UtilityCall),
    #[codec(index = 22)]
    Proxy(ProxyCall),
}

#[derive(TypeInfo)]
struct UncheckedExtrinsic(Vec<u8>);

#[derive(TypeInfo)]
struct Runtime;

#[derive(TypeInfo)]
enum Era {
    Immortal,
    Mortal(u8, u8),
}

#[derive(TypeInfo)]
enum MetadataHashMode {
    Disabled,
    Enabled,
}

fn extension<E: TypeInfo + 'static, A: TypeInfo + 'static>(
    identifier: &'static str,
) -> SignedExtensionMetadata {
    SignedExtensionMetadata {
        identifier,
        ty: meta_type::<E>(),
        additional_signed: meta_type::<A>(),
    }
}

fn constant(name: &'static str, value: Vec<u8>) -> PalletConstantMetadata {
    PalletConstantMetadata {
        name,
        ty: meta_type::<u128>(),
        value,
        docs: vec![],
    }
}

fn pallet<C: TypeInfo + 'static>(
    name: &'static str,
    index: u8,
    constants: Vec<PalletConstantMetadata>,
) -> PalletMetadata {
    PalletMetadata {
        name,
        storage: None,
        calls: Some(PalletCallMetadata {
            ty: meta_type::<C>(),
        }),
        event: None,
        constants,
        error: None,
        index,
    }
}

/// SCALE encoded `RuntimeMetadataPrefixed` (V14).
pub fn metadata_bytes(with_metadata_hash: bool) -> Vec<u8> {
    let pallets = vec![
        pallet::<SystemCall>(
            "System",
            0,
            vec![PalletConstantMetadata {
                name: "SS58Prefix",
                ty: meta_type::<u16>(),
                value: 42u16.encode(),
                docs: vec![],
            }],
        ),
        pallet::<BalancesCall>(
            "Balances",
            BALANCES_INDEX,
            vec![constant("ExistentialDeposit", EXISTENTIAL_DEPOSIT.encode())],
        ),
        pallet::<StakingCall>("Staking", STAKING_INDEX, vec![]),
        pallet::<UtilityCall>("Utility", UTILITY_INDEX, vec![]),
        pallet::<ProxyCall>(
            "Proxy",
            PROXY_INDEX,
            vec![
                constant("ProxyDepositBase", PROXY_DEPOSIT_BASE.encode()),
                constant("ProxyDepositFactor", PROXY_DEPOSIT_FACTOR.encode()),
            ],
        ),
    ];

    let mut signed_extensions = vec![
        extension::<(), ()>("CheckNonZeroSender"),
        extension::<(), u32>("CheckSpecVersion"),
        extension::<(), u32>("CheckTxVersion"),
        extension::<(), [u8; 32]>("CheckGenesis"),
        extension::<Era, [u8; 32]>("CheckMortality"),
        extension::<Compact<u32>, ()>("CheckNonce"),
        extension::<(), ()>("CheckWeight"),
        extension::<Compact<u128>, ()>("ChargeTransactionPayment"),
    ];
    if with_metadata_hash {
        signed_extensions.push(extension::<MetadataHashMode, Option<[u8; 32]>>("CheckMetadataHash"));
    }

    let extrinsic = ExtrinsicMetadata {
        ty: meta_type::<UncheckedExtrinsic>(),
        version: 4,
        signed_extensions,
    };

    let metadata = RuntimeMetadataV14::new(pallets, extrinsic, meta_type::<Runtime>());
    RuntimeMetadataPrefixed(META_RESERVED, RuntimeMetadata::V14(metadata)).encode()
}

pub fn westend_material() -> Material {
    Material {
        genesis_hash: genesis_hash(),
        chain_name: "Westend".to_string(),
        spec_name: "westend".to_string(),
        spec_version: SPEC_VERSION,
        tx_version: TX_VERSION,
        metadata: format!("0x{}", hex::encode(metadata_bytes(false))),
    }
}

/// Same chain after a runtime upgrade that enabled `CheckMetadataHash`.
pub fn westend_material_with_metadata_hash() -> Material {
    Material {
        spec_version: METADATA_HASH_SPEC_VERSION,
        metadata: format!("0x{}", hex::encode(metadata_bytes(true))),
        ..westend_material()
    }
}

pub fn genesis_hash() -> Hash {
    Hash::new(hex_array(GENESIS_HASH))
}

pub fn reference_block() -> Hash {
    Hash::new(hex_array(REFERENCE_BLOCK))
}

fn hex_array(value: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    let bytes = hex::decode(value.trim_start_matches("0x")).unwrap_or_default();
    if bytes.len() == 32 {
        out.copy_from_slice(&bytes);
    }
    out
}
