//! High level intents and their call bytes.

use crate::call::{pallets, Call};
use crate::error::CodecError;
use dotkit_primitives::{AccountId, ProxyType, RewardDestination, TypeRegistry};

/// One transaction family with only the arguments it needs.
///
/// Batch sub-calls are already encoded call bytes; they are checked against
/// the registry when the batch itself is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionIntent {
    Transfer {
        dest: AccountId,
        amount: u128,
    },
    ProxyTransfer {
        real: AccountId,
        force_proxy_type: Option<ProxyType>,
        dest: AccountId,
        amount: u128,
    },
    Sweep {
        dest: AccountId,
        keep_alive: bool,
    },
    Bond {
        value: u128,
        payee: RewardDestination,
    },
    BondExtra {
        value: u128,
    },
    Unbond {
        value: u128,
    },
    WithdrawUnbonded {
        num_slashing_spans: u32,
    },
    Chill,
    PayoutStakers {
        validator_stash: AccountId,
        era: u32,
    },
    AddProxy {
        delegate: AccountId,
        proxy_type: ProxyType,
        delay: u32,
    },
    RemoveProxy {
        delegate: AccountId,
        proxy_type: ProxyType,
        delay: u32,
    },
    CreatePureProxy {
        proxy_type: ProxyType,
        delay: u32,
        index: u16,
    },
    Batch {
        calls: Vec<Vec<u8>>,
        atomic: bool,
    },
}

impl TransactionIntent {
    pub fn to_call(&self, registry: &TypeRegistry) -> Result<Call, CodecError> {
        let call = match self {
            TransactionIntent::Transfer { dest, amount } => Call::TransferKeepAlive {
                dest: *dest,
                value: *amount,
            },
            TransactionIntent::ProxyTransfer {
                real,
                force_proxy_type,
                dest,
                amount,
            } => Call::Proxy {
                real: *real,
                force_proxy_type: *force_proxy_type,
                call: Box::new(Call::TransferKeepAlive {
                    dest: *dest,
                    value: *amount,
                }),
            },
            TransactionIntent::Sweep { dest, keep_alive } => Call::TransferAll {
                dest: *dest,
                keep_alive: *keep_alive,
            },
            TransactionIntent::Bond { value, payee } => Call::Bond {
                value: *value,
                payee: *payee,
            },
            TransactionIntent::BondExtra { value } => Call::BondExtra {
                max_additional: *value,
            },
            TransactionIntent::Unbond { value } => Call::Unbond { value: *value },
            TransactionIntent::WithdrawUnbonded { num_slashing_spans } => Call::WithdrawUnbonded {
                num_slashing_spans: *num_slashing_spans,
            },
            TransactionIntent::Chill => Call::Chill,
            TransactionIntent::PayoutStakers {
                validator_stash,
                era,
            } => Call::PayoutStakers {
                validator_stash: *validator_stash,
                era: *era,
            },
            TransactionIntent::AddProxy {
                delegate,
                proxy_type,
                delay,
            } => Call::AddProxy {
                delegate: *delegate,
                proxy_type: *proxy_type,
                delay: *delay,
            },
            TransactionIntent::RemoveProxy {
                delegate,
                proxy_type,
                delay,
            } => Call::RemoveProxy {
                delegate: *delegate,
                proxy_type: *proxy_type,
                delay: *delay,
            },
            TransactionIntent::CreatePureProxy {
                proxy_type,
                delay,
                index,
            } => Call::CreatePure {
                proxy_type: *proxy_type,
                delay: *delay,
                index: *index,
            },
            TransactionIntent::Batch { calls, atomic } => {
                let calls = calls
                    .iter()
                    .map(|bytes| Call::decode_with(bytes, registry))
                    .collect::<Result<Vec<_>, _>>()?;
                if *atomic {
                    Call::BatchAll { calls }
                } else {
                    Call::Batch { calls }
                }
            }
        };
        Ok(call)
    }

    /// Inverse of [`TransactionIntent::to_call`]. Proxy calls wrapping
    /// anything but a keep-alive transfer have no intent.
    pub fn from_call(call: &Call, registry: &TypeRegistry) -> Result<Self, CodecError> {
        let intent = match call {
            Call::TransferKeepAlive { dest, value } => TransactionIntent::Transfer {
                dest: *dest,
                amount: *value,
            },
            Call::TransferAll { dest, keep_alive } => TransactionIntent::Sweep {
                dest: *dest,
                keep_alive: *keep_alive,
            },
            Call::Bond { value, payee } => TransactionIntent::Bond {
                value: *value,
                payee: *payee,
            },
            Call::BondExtra { max_additional } => TransactionIntent::BondExtra {
                value: *max_additional,
            },
            Call::Unbond { value } => TransactionIntent::Unbond { value: *value },
            Call::WithdrawUnbonded { num_slashing_spans } => TransactionIntent::WithdrawUnbonded {
                num_slashing_spans: *num_slashing_spans,
            },
            Call::Chill => TransactionIntent::Chill,
            Call::PayoutStakers {
                validator_stash,
                era,
            } => TransactionIntent::PayoutStakers {
                validator_stash: *validator_stash,
                era: *era,
            },
            Call::Proxy {
                real,
                force_proxy_type,
                call,
            } => match call.as_ref() {
                Call::TransferKeepAlive { dest, value } => TransactionIntent::ProxyTransfer {
                    real: *real,
                    force_proxy_type: *force_proxy_type,
                    dest: *dest,
                    amount: *value,
                },
                inner => {
                    return Err(CodecError::UnsupportedCall {
                        pallet: pallets::PROXY.to_string(),
                        method: format!("proxy({}.{})", inner.pallet(), inner.method()),
                    })
                }
            },
            Call::AddProxy {
                delegate,
                proxy_type,
                delay,
            } => TransactionIntent::AddProxy {
                delegate: *delegate,
                proxy_type: *proxy_type,
                delay: *delay,
            },
            Call::RemoveProxy {
                delegate,
                proxy_type,
                delay,
            } => TransactionIntent::RemoveProxy {
                delegate: *delegate,
                proxy_type: *proxy_type,
                delay: *delay,
            },
            Call::CreatePure {
                proxy_type,
                delay,
                index,
            } => TransactionIntent::CreatePureProxy {
                proxy_type: *proxy_type,
                delay: *delay,
                index: *index,
            },
            Call::Batch { calls } | Call::BatchAll { calls } => TransactionIntent::Batch {
                calls: calls
                    .iter()
                    .map(|c| c.encode_with(registry))
                    .collect::<Result<Vec<_>, _>>()?,
                atomic: matches!(call, Call::BatchAll { .. }),
            },
        };
        Ok(intent)
    }
}

/// A call classified by name, with its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall {
    pub pallet: String,
    pub method: String,
    pub call: Call,
}

pub fn encode_call(intent: &TransactionIntent, registry: &TypeRegistry) -> Result<Vec<u8>, CodecError> {
    intent.to_call(registry)?.encode_with(registry)
}

pub fn decode_call(bytes: &[u8], registry: &TypeRegistry) -> Result<DecodedCall, CodecError> {
    let call = Call::decode_with(bytes, registry)?;
    Ok(DecodedCall {
        pallet: call.pallet().to_string(),
        method: call.method().to_string(),
        call,
    })
}
