//! Runtime enums shared by call encoding and transaction builders.

use crate::error::PrimitivesError;
use crate::types::AccountId;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Proxy permission classes. Variant indices differ between runtimes, so
/// they are resolved by name against the metadata of the target chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyType {
    Any,
    NonTransfer,
    Governance,
    Staking,
    IdentityJudgement,
    CancelProxy,
    Auction,
    NominationPools,
}

impl ProxyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyType::Any => "Any",
            ProxyType::NonTransfer => "NonTransfer",
            ProxyType::Governance => "Governance",
            ProxyType::Staking => "Staking",
            ProxyType::IdentityJudgement => "IdentityJudgement",
            ProxyType::CancelProxy => "CancelProxy",
            ProxyType::Auction => "Auction",
            ProxyType::NominationPools => "NominationPools",
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProxyType {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Any" => Ok(ProxyType::Any),
            "NonTransfer" => Ok(ProxyType::NonTransfer),
            "Governance" => Ok(ProxyType::Governance),
            "Staking" => Ok(ProxyType::Staking),
            "IdentityJudgement" => Ok(ProxyType::IdentityJudgement),
            "CancelProxy" => Ok(ProxyType::CancelProxy),
            "Auction" => Ok(ProxyType::Auction),
            "NominationPools" => Ok(ProxyType::NominationPools),
            other => Err(PrimitivesError::UnknownProxyType(other.to_string())),
        }
    }
}

/// Where staking rewards are paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum RewardDestination {
    #[codec(index = 0)]
    Staked,
    #[codec(index = 1)]
    Stash,
    #[codec(index = 2)]
    Controller,
    #[codec(index = 3)]
    Account(AccountId),
    #[codec(index = 4)]
    None,
}

impl RewardDestination {
    /// Variant name, or `None` for the explicit account form.
    pub fn variant_name(&self) -> Option<&'static str> {
        match self {
            RewardDestination::Staked => Some("Staked"),
            RewardDestination::Stash => Some("Stash"),
            RewardDestination::Controller => Some("Controller"),
            RewardDestination::Account(_) => None,
            RewardDestination::None => Some("None"),
        }
    }

    /// Parses a unit variant name, case-insensitively.
    pub fn from_variant_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "staked" => Some(RewardDestination::Staked),
            "stash" => Some(RewardDestination::Stash),
            "controller" => Some(RewardDestination::Controller),
            "none" => Some(RewardDestination::None),
            _ => None,
        }
    }
}
