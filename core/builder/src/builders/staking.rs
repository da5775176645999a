//! Staking pallet builders: bond, unbond, withdraw, payout and chill.

use crate::builder::{CallBuilder, TransactionBuilder};
use crate::error::{BuilderError, ValidationError};
use crate::transaction::TransactionType;
use crate::validation::{parse_address, parse_amount, parse_u32, require};
use dotkit_codec::{Call, TransactionIntent};
use dotkit_primitives::{encode_address, AccountId, RewardDestination, TypeRegistry};
use std::fmt::Display;

fn unexpected(call: &Call, expected: &str) -> BuilderError {
    BuilderError::InvalidTransaction(format!(
        "{}.{} is not {}",
        call.pallet(),
        call.method(),
        expected
    ))
}

// ===== Bond / bond extra =====

#[derive(Debug, Clone, Default)]
pub struct StakeCall {
    amount: Option<u128>,
    payee: Option<RewardDestination>,
    add_to_stake: bool,
}

pub type StakingBuilder = TransactionBuilder<StakeCall>;

impl StakeCall {
    pub fn set_amount(&mut self, amount: impl Display) -> Result<(), ValidationError> {
        self.amount = Some(parse_amount("amount", amount)?);
        Ok(())
    }

    /// `Staked`, `Stash`, `Controller`, `None`, or an account address.
    pub fn set_payee(&mut self, payee: &str) -> Result<(), ValidationError> {
        let destination = match RewardDestination::from_variant_name(payee) {
            Some(destination) => destination,
            None => RewardDestination::Account(parse_address("payee", payee)?),
        };
        self.payee = Some(destination);
        Ok(())
    }

    pub fn set_add_to_stake(&mut self, add_to_stake: bool) {
        self.add_to_stake = add_to_stake;
    }
}

impl CallBuilder for StakeCall {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::StakingActivate
    }

    fn validate(&self, _registry: &TypeRegistry) -> Result<(), BuilderError> {
        require("amount", &self.amount)?;
        match (self.add_to_stake, self.payee.is_some()) {
            (true, true) => Err(ValidationError::new(
                "payee",
                "cannot be set when adding to an existing bond",
            )
            .into()),
            (false, false) => Err(ValidationError::required("payee").into()),
            _ => Ok(()),
        }
    }

    fn intent(&self) -> Result<TransactionIntent, BuilderError> {
        let value = require("amount", &self.amount)?;
        if self.add_to_stake {
            Ok(TransactionIntent::BondExtra { value })
        } else {
            Ok(TransactionIntent::Bond {
                value,
                payee: require("payee", &self.payee)?,
            })
        }
    }

    fn load_call(&mut self, call: &Call, registry: &TypeRegistry) -> Result<(), BuilderError> {
        match call {
            Call::Bond { value, payee } => {
                self.set_amount(value)?;
                let payee = match payee {
                    RewardDestination::Account(account) => encode_address(account, registry.ss58_prefix()),
                    other => other.variant_name().unwrap_or_default().to_string(),
                };
                self.set_payee(&payee)?;
            }
            Call::BondExtra { max_additional } => {
                self.set_amount(max_additional)?;
                self.set_add_to_stake(true);
            }
            other => return Err(unexpected(other, "a bond")),
        }
        Ok(())
    }
}

impl TransactionBuilder<StakeCall> {
    pub fn amount(&mut self, amount: impl Display) -> Result<&mut Self, BuilderError> {
        self.kind.set_amount(amount)?;
        Ok(self)
    }

    pub fn payee(&mut self, payee: &str) -> Result<&mut Self, BuilderError> {
        self.kind.set_payee(payee)?;
        Ok(self)
    }

    /// Bond more funds on an existing stash (`bond_extra`).
    pub fn add_to_stake(&mut self, add_to_stake: bool) -> Result<&mut Self, BuilderError> {
        self.kind.set_add_to_stake(add_to_stake);
        Ok(self)
    }
}

// ===== Unbond =====

#[derive(Debug, Clone, Default)]
pub struct UnstakeCall {
    amount: Option<u128>,
}

pub type UnstakeBuilder = TransactionBuilder<UnstakeCall>;

impl UnstakeCall {
    pub fn set_amount(&mut self, amount: impl Display) -> Result<(), ValidationError> {
        self.amount = Some(parse_amount("amount", amount)?);
        Ok(())
    }
}

impl CallBuilder for UnstakeCall {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::StakingUnlock
    }

    fn validate(&self, _registry: &TypeRegistry) -> Result<(), BuilderError> {
        require("amount", &self.amount)?;
        Ok(())
    }

    fn intent(&self) -> Result<TransactionIntent, BuilderError> {
        Ok(TransactionIntent::Unbond {
            value: require("amount", &self.amount)?,
        })
    }

    fn load_call(&mut self, call: &Call, _registry: &TypeRegistry) -> Result<(), BuilderError> {
        match call {
            Call::Unbond { value } => Ok(self.set_amount(value)?),
            other => Err(unexpected(other, "an unbond")),
        }
    }
}

impl TransactionBuilder<UnstakeCall> {
    pub fn amount(&mut self, amount: impl Display) -> Result<&mut Self, BuilderError> {
        self.kind.set_amount(amount)?;
        Ok(self)
    }
}

// ===== Withdraw unbonded =====

#[derive(Debug, Clone, Default)]
pub struct WithdrawUnbondedCall {
    slashing_spans: Option<u32>,
}

pub type WithdrawUnstakedBuilder = TransactionBuilder<WithdrawUnbondedCall>;

impl WithdrawUnbondedCall {
    pub fn set_slashing_spans(&mut self, spans: impl Display) -> Result<(), ValidationError> {
        self.slashing_spans = Some(parse_u32("slashingSpans", spans)?);
        Ok(())
    }
}

impl CallBuilder for WithdrawUnbondedCall {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::StakingWithdraw
    }

    fn validate(&self, _registry: &TypeRegistry) -> Result<(), BuilderError> {
        require("slashingSpans", &self.slashing_spans)?;
        Ok(())
    }

    fn intent(&self) -> Result<TransactionIntent, BuilderError> {
        Ok(TransactionIntent::WithdrawUnbonded {
            num_slashing_spans: require("slashingSpans", &self.slashing_spans)?,
        })
    }

    fn load_call(&mut self, call: &Call, _registry: &TypeRegistry) -> Result<(), BuilderError> {
        match call {
            Call::WithdrawUnbonded { num_slashing_spans } => Ok(self.set_slashing_spans(num_slashing_spans)?),
            other => Err(unexpected(other, "a withdrawal")),
        }
    }
}

impl TransactionBuilder<WithdrawUnbondedCall> {
    pub fn slashing_spans(&mut self, spans: impl Display) -> Result<&mut Self, BuilderError> {
        self.kind.set_slashing_spans(spans)?;
        Ok(self)
    }
}

// ===== Payout stakers =====

#[derive(Debug, Clone, Default)]
pub struct ClaimCall {
    validator_stash: Option<AccountId>,
    claim_era: Option<u32>,
}

pub type ClaimBuilder = TransactionBuilder<ClaimCall>;

impl ClaimCall {
    pub fn set_validator_stash(&mut self, address: &str) -> Result<(), ValidationError> {
        self.validator_stash = Some(parse_address("validatorStash", address)?);
        Ok(())
    }

    pub fn set_claim_era(&mut self, era: impl Display) -> Result<(), ValidationError> {
        self.claim_era = Some(parse_u32("claimEra", era)?);
        Ok(())
    }
}

impl CallBuilder for ClaimCall {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::StakingClaim
    }

    fn validate(&self, _registry: &TypeRegistry) -> Result<(), BuilderError> {
        require("validatorStash", &self.validator_stash)?;
        require("claimEra", &self.claim_era)?;
        Ok(())
    }

    fn intent(&self) -> Result<TransactionIntent, BuilderError> {
        Ok(TransactionIntent::PayoutStakers {
            validator_stash: require("validatorStash", &self.validator_stash)?,
            era: require("claimEra", &self.claim_era)?,
        })
    }

    fn load_call(&mut self, call: &Call, registry: &TypeRegistry) -> Result<(), BuilderError> {
        match call {
            Call::PayoutStakers { validator_stash, era } => {
                self.set_validator_stash(&encode_address(validator_stash, registry.ss58_prefix()))?;
                self.set_claim_era(era)?;
                Ok(())
            }
            other => Err(unexpected(other, "a payout")),
        }
    }
}

impl TransactionBuilder<ClaimCall> {
    pub fn validator_stash(&mut self, address: &str) -> Result<&mut Self, BuilderError> {
        self.kind.set_validator_stash(address)?;
        Ok(self)
    }

    pub fn claim_era(&mut self, era: impl Display) -> Result<&mut Self, BuilderError> {
        self.kind.set_claim_era(era)?;
        Ok(self)
    }
}

// ===== Chill =====

#[derive(Debug, Clone, Default)]
pub struct UnnominateCall;

pub type UnnominateBuilder = TransactionBuilder<UnnominateCall>;

impl CallBuilder for UnnominateCall {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::StakingUnvote
    }

    fn validate(&self, _registry: &TypeRegistry) -> Result<(), BuilderError> {
        Ok(())
    }

    fn intent(&self) -> Result<TransactionIntent, BuilderError> {
        Ok(TransactionIntent::Chill)
    }

    fn load_call(&mut self, call: &Call, _registry: &TypeRegistry) -> Result<(), BuilderError> {
        match call {
            Call::Chill => Ok(()),
            other => Err(unexpected(other, "a chill")),
        }
    }
}
