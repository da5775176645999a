use crate::builder::{CallBuilder, TransactionBuilder};
use crate::error::{BuilderError, ValidationError};
use crate::transaction::TransactionType;
use crate::validation::{parse_address, parse_amount, require};
use dotkit_codec::{Call, TransactionIntent};
use dotkit_primitives::{encode_address, AccountId, ProxyType, TypeRegistry};
use std::fmt::Display;

/// Plain, proxied, or sweeping balance transfer.
#[derive(Debug, Clone, Default)]
pub struct TransferCall {
    to: Option<AccountId>,
    amount: Option<u128>,
    owner: Option<AccountId>,
    force_proxy_type: Option<ProxyType>,
    /// `Some(keep_alive)` turns the transfer into a `transfer_all`.
    sweep: Option<bool>,
}

pub type TransferBuilder = TransactionBuilder<TransferCall>;

impl TransferCall {
    pub fn set_to(&mut self, address: &str) -> Result<(), ValidationError> {
        self.to = Some(parse_address("to", address)?);
        Ok(())
    }

    pub fn set_amount(&mut self, amount: impl Display) -> Result<(), ValidationError> {
        self.amount = Some(parse_amount("amount", amount)?);
        Ok(())
    }

    pub fn set_owner(&mut self, address: &str) -> Result<(), ValidationError> {
        self.owner = Some(parse_address("owner", address)?);
        Ok(())
    }

    pub fn set_force_proxy_type(&mut self, proxy_type: ProxyType) {
        self.force_proxy_type = Some(proxy_type);
    }

    pub fn set_sweep(&mut self, keep_alive: bool) {
        self.sweep = Some(keep_alive);
    }
}

impl CallBuilder for TransferCall {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::Send
    }

    fn validate(&self, registry: &TypeRegistry) -> Result<(), BuilderError> {
        require("to", &self.to)?;
        match self.sweep {
            Some(_) => {
                if self.amount.is_some() {
                    return Err(ValidationError::new("amount", "a sweep transfers the whole balance").into());
                }
                if self.owner.is_some() {
                    return Err(ValidationError::new("owner", "a sweep cannot be proxied").into());
                }
            }
            None => {
                require("amount", &self.amount)?;
            }
        }
        if let Some(proxy_type) = self.force_proxy_type {
            if self.owner.is_none() {
                return Err(ValidationError::new("forceProxyType", "requires an owner").into());
            }
            registry.proxy_type_index(proxy_type)?;
        }
        Ok(())
    }

    fn intent(&self) -> Result<TransactionIntent, BuilderError> {
        let dest = require("to", &self.to)?;
        if let Some(keep_alive) = self.sweep {
            return Ok(TransactionIntent::Sweep { dest, keep_alive });
        }
        let amount = require("amount", &self.amount)?;
        Ok(match self.owner {
            Some(real) => TransactionIntent::ProxyTransfer {
                real,
                force_proxy_type: self.force_proxy_type,
                dest,
                amount,
            },
            None => TransactionIntent::Transfer { dest, amount },
        })
    }

    fn load_call(&mut self, call: &Call, registry: &TypeRegistry) -> Result<(), BuilderError> {
        let prefix = registry.ss58_prefix();
        match call {
            Call::TransferKeepAlive { dest, value } => {
                self.set_to(&encode_address(dest, prefix))?;
                self.set_amount(value)?;
            }
            Call::TransferAll { dest, keep_alive } => {
                self.set_to(&encode_address(dest, prefix))?;
                self.set_sweep(*keep_alive);
            }
            Call::Proxy {
                real,
                force_proxy_type,
                call: inner,
            } => {
                let Call::TransferKeepAlive { dest, value } = inner.as_ref() else {
                    return Err(BuilderError::UnsupportedTransactionType(format!(
                        "Proxy.proxy({}.{})",
                        inner.pallet(),
                        inner.method()
                    )));
                };
                self.set_owner(&encode_address(real, prefix))?;
                if let Some(proxy_type) = force_proxy_type {
                    self.set_force_proxy_type(*proxy_type);
                }
                self.set_to(&encode_address(dest, prefix))?;
                self.set_amount(value)?;
            }
            other => {
                return Err(BuilderError::InvalidTransaction(format!(
                    "{}.{} is not a transfer",
                    other.pallet(),
                    other.method()
                )))
            }
        }
        Ok(())
    }
}

impl TransactionBuilder<TransferCall> {
    pub fn to(&mut self, address: &str) -> Result<&mut Self, BuilderError> {
        self.kind.set_to(address)?;
        Ok(self)
    }

    pub fn amount(&mut self, amount: impl Display) -> Result<&mut Self, BuilderError> {
        self.kind.set_amount(amount)?;
        Ok(self)
    }

    /// Account the transfer is made on behalf of, through `Proxy.proxy`.
    pub fn owner(&mut self, address: &str) -> Result<&mut Self, BuilderError> {
        self.kind.set_owner(address)?;
        Ok(self)
    }

    pub fn force_proxy_type(&mut self, proxy_type: ProxyType) -> Result<&mut Self, BuilderError> {
        self.kind.set_force_proxy_type(proxy_type);
        Ok(self)
    }

    /// Sends the whole free balance with `transfer_all`.
    pub fn sweep(&mut self, keep_alive: bool) -> Result<&mut Self, BuilderError> {
        self.kind.set_sweep(keep_alive);
        Ok(self)
    }
}
