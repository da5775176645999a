//! Runtime calls understood by this crate.
//!
//! Pallet and call indices are never hard coded: they are looked up by name
//! in the registry, and the argument names recorded in metadata must match
//! the layout encoded here. A runtime that reshapes one of these calls is
//! rejected instead of being encoded with stale assumptions.

use crate::error::CodecError;
use dotkit_primitives::{encode_address, AccountId, CallInfo, ProxyType, RewardDestination, TypeRegistry};
use parity_scale_codec::{Compact, Decode, Encode};
use serde_json::{json, Value};

/// Proxy and batch calls may nest; anything deeper is rejected.
pub const MAX_CALL_DEPTH: usize = 4;

const MULTI_ADDRESS_ID: u8 = 0x00;

pub mod pallets {
    pub const BALANCES: &str = "Balances";
    pub const STAKING: &str = "Staking";
    pub const PROXY: &str = "Proxy";
    pub const UTILITY: &str = "Utility";
}

pub mod methods {
    pub const TRANSFER_KEEP_ALIVE: &str = "transfer_keep_alive";
    pub const TRANSFER_ALL: &str = "transfer_all";
    pub const BOND: &str = "bond";
    pub const BOND_EXTRA: &str = "bond_extra";
    pub const UNBOND: &str = "unbond";
    pub const WITHDRAW_UNBONDED: &str = "withdraw_unbonded";
    pub const CHILL: &str = "chill";
    pub const PAYOUT_STAKERS: &str = "payout_stakers";
    pub const PROXY: &str = "proxy";
    pub const ADD_PROXY: &str = "add_proxy";
    pub const REMOVE_PROXY: &str = "remove_proxy";
    pub const CREATE_PURE: &str = "create_pure";
    pub const BATCH: &str = "batch";
    pub const BATCH_ALL: &str = "batch_all";
}

use methods::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    TransferKeepAlive {
        dest: AccountId,
        value: u128,
    },
    TransferAll {
        dest: AccountId,
        keep_alive: bool,
    },
    Bond {
        value: u128,
        payee: RewardDestination,
    },
    BondExtra {
        max_additional: u128,
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
    Proxy {
        real: AccountId,
        force_proxy_type: Option<ProxyType>,
        call: Box<Call>,
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
    CreatePure {
        proxy_type: ProxyType,
        delay: u32,
        index: u16,
    },
    Batch {
        calls: Vec<Call>,
    },
    BatchAll {
        calls: Vec<Call>,
    },
}

/// Argument names of each supported call, in encoding order.
fn expected_fields(pallet: &str, method: &str) -> Option<&'static [&'static str]> {
    let fields: &'static [&'static str] = match (pallet, method) {
        (pallets::BALANCES, TRANSFER_KEEP_ALIVE) => &["dest", "value"],
        (pallets::BALANCES, TRANSFER_ALL) => &["dest", "keep_alive"],
        (pallets::STAKING, BOND) => &["value", "payee"],
        (pallets::STAKING, BOND_EXTRA) => &["max_additional"],
        (pallets::STAKING, UNBOND) => &["value"],
        (pallets::STAKING, WITHDRAW_UNBONDED) => &["num_slashing_spans"],
        (pallets::STAKING, CHILL) => &[],
        (pallets::STAKING, PAYOUT_STAKERS) => &["validator_stash", "era"],
        (pallets::PROXY, methods::PROXY) => &["real", "force_proxy_type", "call"],
        (pallets::PROXY, ADD_PROXY) | (pallets::PROXY, REMOVE_PROXY) => {
            &["delegate", "proxy_type", "delay"]
        }
        (pallets::PROXY, CREATE_PURE) => &["proxy_type", "delay", "index"],
        (pallets::UTILITY, BATCH) | (pallets::UTILITY, BATCH_ALL) => &["calls"],
        _ => return None,
    };
    Some(fields)
}

fn check_layout(pallet: &str, call: &CallInfo, expected: &[&str]) -> Result<(), CodecError> {
    let found = call.field_names();
    if found != expected {
        return Err(CodecError::LayoutMismatch {
            pallet: pallet.to_string(),
            method: call.name.clone(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
            found: found.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(())
}

impl Call {
    pub fn pallet(&self) -> &'static str {
        match self {
            Call::TransferKeepAlive { .. } | Call::TransferAll { .. } => pallets::BALANCES,
            Call::Bond { .. }
            | Call::BondExtra { .. }
            | Call::Unbond { .. }
            | Call::WithdrawUnbonded { .. }
            | Call::Chill
            | Call::PayoutStakers { .. } => pallets::STAKING,
            Call::Proxy { .. }
            | Call::AddProxy { .. }
            | Call::RemoveProxy { .. }
            | Call::CreatePure { .. } => pallets::PROXY,
            Call::Batch { .. } | Call::BatchAll { .. } => pallets::UTILITY,
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Call::TransferKeepAlive { .. } => TRANSFER_KEEP_ALIVE,
            Call::TransferAll { .. } => TRANSFER_ALL,
            Call::Bond { .. } => BOND,
            Call::BondExtra { .. } => BOND_EXTRA,
            Call::Unbond { .. } => UNBOND,
            Call::WithdrawUnbonded { .. } => WITHDRAW_UNBONDED,
            Call::Chill => CHILL,
            Call::PayoutStakers { .. } => PAYOUT_STAKERS,
            Call::Proxy { .. } => methods::PROXY,
            Call::AddProxy { .. } => ADD_PROXY,
            Call::RemoveProxy { .. } => REMOVE_PROXY,
            Call::CreatePure { .. } => CREATE_PURE,
            Call::Batch { .. } => BATCH,
            Call::BatchAll { .. } => BATCH_ALL,
        }
    }

    /// `[pallet_index, call_index]` on the registry's runtime.
    pub fn call_index(&self, registry: &TypeRegistry) -> Result<[u8; 2], CodecError> {
        let (pallet, call) = registry.call(self.pallet(), self.method())?;
        Ok([pallet.index, call.index])
    }

    pub fn encode_with(&self, registry: &TypeRegistry) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.write_to(registry, &mut out, 0)?;
        Ok(out)
    }

    fn write_to(&self, registry: &TypeRegistry, out: &mut Vec<u8>, depth: usize) -> Result<(), CodecError> {
        if depth > MAX_CALL_DEPTH {
            return Err(CodecError::NestingTooDeep(MAX_CALL_DEPTH));
        }
        let (pallet_info, call_info) = registry.call(self.pallet(), self.method())?;
        let expected = expected_fields(self.pallet(), self.method()).unwrap_or(&[]);
        check_layout(&pallet_info.name, call_info, expected)?;

        out.push(pallet_info.index);
        out.push(call_info.index);
        match self {
            Call::TransferKeepAlive { dest, value } => {
                write_multi_address(dest, out);
                Compact(*value).encode_to(out);
            }
            Call::TransferAll { dest, keep_alive } => {
                write_multi_address(dest, out);
                keep_alive.encode_to(out);
            }
            Call::Bond { value, payee } => {
                Compact(*value).encode_to(out);
                payee.encode_to(out);
            }
            Call::BondExtra { max_additional } => Compact(*max_additional).encode_to(out),
            Call::Unbond { value } => Compact(*value).encode_to(out),
            Call::WithdrawUnbonded { num_slashing_spans } => num_slashing_spans.encode_to(out),
            Call::Chill => {}
            Call::PayoutStakers { validator_stash, era } => {
                validator_stash.encode_to(out);
                era.encode_to(out);
            }
            Call::Proxy {
                real,
                force_proxy_type,
                call,
            } => {
                write_multi_address(real, out);
                match force_proxy_type {
                    None => out.push(0),
                    Some(proxy_type) => {
                        out.push(1);
                        out.push(registry.proxy_type_index(*proxy_type)?);
                    }
                }
                call.write_to(registry, out, depth + 1)?;
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
                write_multi_address(delegate, out);
                out.push(registry.proxy_type_index(*proxy_type)?);
                delay.encode_to(out);
            }
            Call::CreatePure {
                proxy_type,
                delay,
                index,
            } => {
                out.push(registry.proxy_type_index(*proxy_type)?);
                delay.encode_to(out);
                index.encode_to(out);
            }
            Call::Batch { calls } | Call::BatchAll { calls } => {
                Compact(calls.len() as u32).encode_to(out);
                for call in calls {
                    call.write_to(registry, out, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    /// Decodes exactly one call; trailing bytes are an error.
    pub fn decode_with(bytes: &[u8], registry: &TypeRegistry) -> Result<Self, CodecError> {
        let mut input = bytes;
        let call = Self::read_from(&mut input, registry, 0)?;
        if !input.is_empty() {
            return Err(CodecError::TrailingBytes {
                context: "call",
                remaining: input.len(),
            });
        }
        Ok(call)
    }

    fn read_from(input: &mut &[u8], registry: &TypeRegistry, depth: usize) -> Result<Self, CodecError> {
        if depth > MAX_CALL_DEPTH {
            return Err(CodecError::NestingTooDeep(MAX_CALL_DEPTH));
        }
        let pallet_index = u8::decode(input)?;
        let call_index = u8::decode(input)?;
        let (pallet_info, call_info) =
            registry
                .find_call(pallet_index, call_index)
                .ok_or(CodecError::UnknownCallIndex {
                    pallet_index,
                    call_index,
                })?;
        let pallet = pallet_info.name.as_str();
        let method = call_info.name.as_str();
        let expected =
            expected_fields(pallet, method).ok_or_else(|| CodecError::UnsupportedCall {
                pallet: pallet.to_string(),
                method: method.to_string(),
            })?;
        check_layout(pallet, call_info, expected)?;

        let call = match (pallet, method) {
            (pallets::BALANCES, TRANSFER_KEEP_ALIVE) => Call::TransferKeepAlive {
                dest: read_multi_address(input)?,
                value: Compact::<u128>::decode(input)?.0,
            },
            (pallets::BALANCES, TRANSFER_ALL) => Call::TransferAll {
                dest: read_multi_address(input)?,
                keep_alive: bool::decode(input)?,
            },
            (pallets::STAKING, BOND) => Call::Bond {
                value: Compact::<u128>::decode(input)?.0,
                payee: RewardDestination::decode(input)?,
            },
            (pallets::STAKING, BOND_EXTRA) => Call::BondExtra {
                max_additional: Compact::<u128>::decode(input)?.0,
            },
            (pallets::STAKING, UNBOND) => Call::Unbond {
                value: Compact::<u128>::decode(input)?.0,
            },
            (pallets::STAKING, WITHDRAW_UNBONDED) => Call::WithdrawUnbonded {
                num_slashing_spans: u32::decode(input)?,
            },
            (pallets::STAKING, CHILL) => Call::Chill,
            (pallets::STAKING, PAYOUT_STAKERS) => Call::PayoutStakers {
                validator_stash: AccountId::decode(input)?,
                era: u32::decode(input)?,
            },
            (pallets::PROXY, methods::PROXY) => {
                let real = read_multi_address(input)?;
                let force_proxy_type = match u8::decode(input)? {
                    0 => None,
                    1 => Some(read_proxy_type(input, registry)?),
                    tag => {
                        return Err(CodecError::Decode(format!(
                            "invalid Option tag {} for force_proxy_type",
                            tag
                        )))
                    }
                };
                let call = Box::new(Self::read_from(input, registry, depth + 1)?);
                Call::Proxy {
                    real,
                    force_proxy_type,
                    call,
                }
            }
            (pallets::PROXY, ADD_PROXY) => Call::AddProxy {
                delegate: read_multi_address(input)?,
                proxy_type: read_proxy_type(input, registry)?,
                delay: u32::decode(input)?,
            },
            (pallets::PROXY, REMOVE_PROXY) => Call::RemoveProxy {
                delegate: read_multi_address(input)?,
                proxy_type: read_proxy_type(input, registry)?,
                delay: u32::decode(input)?,
            },
            (pallets::PROXY, CREATE_PURE) => Call::CreatePure {
                proxy_type: read_proxy_type(input, registry)?,
                delay: u32::decode(input)?,
                index: u16::decode(input)?,
            },
            (pallets::UTILITY, BATCH) | (pallets::UTILITY, BATCH_ALL) => {
                let len = Compact::<u32>::decode(input)?.0 as usize;
                // every call is at least its two index bytes
                if len > input.len() / 2 {
                    return Err(CodecError::Decode(format!(
                        "batch declares {} calls but only {} bytes remain",
                        len,
                        input.len()
                    )));
                }
                let mut calls = Vec::with_capacity(len);
                for _ in 0..len {
                    calls.push(Self::read_from(input, registry, depth + 1)?);
                }
                if method == BATCH {
                    Call::Batch { calls }
                } else {
                    Call::BatchAll { calls }
                }
            }
            _ => {
                return Err(CodecError::UnsupportedCall {
                    pallet: pallet.to_string(),
                    method: method.to_string(),
                })
            }
        };
        Ok(call)
    }

    /// Structured view of the arguments. Balances are decimal strings and
    /// accounts are SS58 addresses in the registry's format.
    pub fn args_json(&self, registry: &TypeRegistry) -> Result<Value, CodecError> {
        let prefix = registry.ss58_prefix();
        let address = |account: &AccountId| encode_address(account, prefix);
        let multi = |account: &AccountId| json!({ "id": encode_address(account, prefix) });

        let value = match self {
            Call::TransferKeepAlive { dest, value } => {
                json!({ "dest": multi(dest), "value": value.to_string() })
            }
            Call::TransferAll { dest, keep_alive } => {
                json!({ "dest": multi(dest), "keep_alive": keep_alive })
            }
            Call::Bond { value, payee } => {
                json!({ "value": value.to_string(), "payee": payee_json(payee, prefix) })
            }
            Call::BondExtra { max_additional } => {
                json!({ "max_additional": max_additional.to_string() })
            }
            Call::Unbond { value } => json!({ "value": value.to_string() }),
            Call::WithdrawUnbonded { num_slashing_spans } => {
                json!({ "num_slashing_spans": num_slashing_spans })
            }
            Call::Chill => json!({}),
            Call::PayoutStakers { validator_stash, era } => {
                json!({ "validator_stash": address(validator_stash), "era": era })
            }
            Call::Proxy {
                real,
                force_proxy_type,
                call,
            } => json!({
                "real": multi(real),
                "force_proxy_type": force_proxy_type.map(|p| p.to_string()),
                "call": call.to_json(registry)?,
            }),
            Call::AddProxy {
                delegate,
                proxy_type,
                delay,
            }
            | Call::RemoveProxy {
                delegate,
                proxy_type,
                delay,
            } => json!({
                "delegate": multi(delegate),
                "proxy_type": proxy_type.to_string(),
                "delay": delay,
            }),
            Call::CreatePure {
                proxy_type,
                delay,
                index,
            } => json!({
                "proxy_type": proxy_type.to_string(),
                "delay": delay,
                "index": index,
            }),
            Call::Batch { calls } | Call::BatchAll { calls } => {
                let calls = calls
                    .iter()
                    .map(|c| c.to_json(registry))
                    .collect::<Result<Vec<_>, _>>()?;
                json!({ "calls": calls })
            }
        };
        Ok(value)
    }

    /// `{ callIndex, pallet, method, args }`
    pub fn to_json(&self, registry: &TypeRegistry) -> Result<Value, CodecError> {
        let index = self.call_index(registry)?;
        Ok(json!({
            "callIndex": format!("0x{}", hex::encode(index)),
            "pallet": self.pallet(),
            "method": self.method(),
            "args": self.args_json(registry)?,
        }))
    }
}

fn payee_json(payee: &RewardDestination, prefix: u16) -> Value {
    match payee {
        RewardDestination::Account(account) => json!({ "account": encode_address(account, prefix) }),
        other => {
            let name = other.variant_name().unwrap_or_default().to_ascii_lowercase();
            let mut map = serde_json::Map::new();
            map.insert(name, Value::Null);
            Value::Object(map)
        }
    }
}

fn write_multi_address(account: &AccountId, out: &mut Vec<u8>) {
    out.push(MULTI_ADDRESS_ID);
    out.extend_from_slice(account.as_bytes());
}

fn read_multi_address(input: &mut &[u8]) -> Result<AccountId, CodecError> {
    match u8::decode(input)? {
        MULTI_ADDRESS_ID => Ok(AccountId::decode(input)?),
        tag => Err(CodecError::Decode(format!(
            "unsupported MultiAddress variant {}",
            tag
        ))),
    }
}

fn read_proxy_type(input: &mut &[u8], registry: &TypeRegistry) -> Result<ProxyType, CodecError> {
    let index = u8::decode(input)?;
    registry
        .proxy_type_from_index(index)
        .ok_or_else(|| CodecError::Decode(format!("unknown proxy type index {}", index)))
}
