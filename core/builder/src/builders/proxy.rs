//! Proxy relationships: add, remove, and pure proxy creation.

use crate::builder::{CallBuilder, TransactionBuilder};
use crate::error::{BuilderError, ValidationError};
use crate::transaction::TransactionType;
use crate::validation::{parse_address, parse_u16, parse_u32, require};
use dotkit_codec::{Call, TransactionIntent};
use dotkit_primitives::{encode_address, AccountId, ProxyType, TypeRegistry};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProxyAction {
    #[default]
    Add,
    Remove,
    CreatePure,
}

#[derive(Debug, Clone, Default)]
pub struct AddressInitializationCall {
    action: ProxyAction,
    delegate: Option<AccountId>,
    proxy_type: Option<ProxyType>,
    delay: Option<u32>,
    index: Option<u16>,
}

pub type AddressInitializationBuilder = TransactionBuilder<AddressInitializationCall>;

impl AddressInitializationCall {
    pub fn set_action(&mut self, action: ProxyAction) {
        self.action = action;
    }

    pub fn set_owner(&mut self, address: &str) -> Result<(), ValidationError> {
        self.delegate = Some(parse_address("owner", address)?);
        Ok(())
    }

    pub fn set_proxy_type(&mut self, proxy_type: ProxyType) {
        self.proxy_type = Some(proxy_type);
    }

    pub fn set_delay(&mut self, delay: impl Display) -> Result<(), ValidationError> {
        self.delay = Some(parse_u32("delay", delay)?);
        Ok(())
    }

    pub fn set_index(&mut self, index: impl Display) -> Result<(), ValidationError> {
        self.index = Some(parse_u16("index", index)?);
        Ok(())
    }

    fn validate_delegate_schema(&self) -> Result<(), ValidationError> {
        require("owner", &self.delegate)?;
        require("proxyType", &self.proxy_type)?;
        require("delay", &self.delay)?;
        if self.index.is_some() {
            return Err(ValidationError::new("index", "only applies to pure proxy creation"));
        }
        Ok(())
    }

    fn validate_pure_schema(&self) -> Result<(), ValidationError> {
        require("proxyType", &self.proxy_type)?;
        require("delay", &self.delay)?;
        require("index", &self.index)?;
        if self.delegate.is_some() {
            return Err(ValidationError::new("owner", "a pure proxy has no delegate yet"));
        }
        Ok(())
    }
}

impl CallBuilder for AddressInitializationCall {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::AddressInitialization
    }

    fn validate(&self, registry: &TypeRegistry) -> Result<(), BuilderError> {
        match self.action {
            ProxyAction::Add | ProxyAction::Remove => self.validate_delegate_schema()?,
            ProxyAction::CreatePure => self.validate_pure_schema()?,
        }
        if let Some(proxy_type) = self.proxy_type {
            registry.proxy_type_index(proxy_type)?;
        }
        Ok(())
    }

    fn intent(&self) -> Result<TransactionIntent, BuilderError> {
        let proxy_type = require("proxyType", &self.proxy_type)?;
        let delay = require("delay", &self.delay)?;
        let intent = match self.action {
            ProxyAction::Add => TransactionIntent::AddProxy {
                delegate: require("owner", &self.delegate)?,
                proxy_type,
                delay,
            },
            ProxyAction::Remove => TransactionIntent::RemoveProxy {
                delegate: require("owner", &self.delegate)?,
                proxy_type,
                delay,
            },
            ProxyAction::CreatePure => TransactionIntent::CreatePureProxy {
                proxy_type,
                delay,
                index: require("index", &self.index)?,
            },
        };
        Ok(intent)
    }

    fn load_call(&mut self, call: &Call, registry: &TypeRegistry) -> Result<(), BuilderError> {
        match call {
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
                self.set_action(if matches!(call, Call::AddProxy { .. }) {
                    ProxyAction::Add
                } else {
                    ProxyAction::Remove
                });
                self.set_owner(&encode_address(delegate, registry.ss58_prefix()))?;
                self.set_proxy_type(*proxy_type);
                self.set_delay(delay)?;
            }
            Call::CreatePure {
                proxy_type,
                delay,
                index,
            } => {
                self.set_action(ProxyAction::CreatePure);
                self.set_proxy_type(*proxy_type);
                self.set_delay(delay)?;
                self.set_index(index)?;
            }
            other => {
                return Err(BuilderError::InvalidTransaction(format!(
                    "{}.{} is not a proxy change",
                    other.pallet(),
                    other.method()
                )))
            }
        }
        Ok(())
    }
}

impl TransactionBuilder<AddressInitializationCall> {
    /// The delegate account for add/remove.
    pub fn owner(&mut self, address: &str) -> Result<&mut Self, BuilderError> {
        self.kind.set_owner(address)?;
        Ok(self)
    }

    pub fn proxy_type(&mut self, proxy_type: ProxyType) -> Result<&mut Self, BuilderError> {
        self.kind.set_proxy_type(proxy_type);
        Ok(self)
    }

    pub fn delay(&mut self, delay: impl Display) -> Result<&mut Self, BuilderError> {
        self.kind.set_delay(delay)?;
        Ok(self)
    }

    /// Disambiguation index for `create_pure`.
    pub fn index(&mut self, index: impl Display) -> Result<&mut Self, BuilderError> {
        self.kind.set_index(index)?;
        Ok(self)
    }

    pub fn remove_proxy(&mut self) -> Result<&mut Self, BuilderError> {
        self.kind.set_action(ProxyAction::Remove);
        Ok(self)
    }

    pub fn create_pure(&mut self) -> Result<&mut Self, BuilderError> {
        self.kind.set_action(ProxyAction::CreatePure);
        Ok(self)
    }
}
