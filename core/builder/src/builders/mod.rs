//! One call kind per transaction family.

mod batch;
mod proxy;
mod staking;
mod transfer;

pub use batch::{BatchCall, BatchTransactionBuilder};
pub use proxy::{AddressInitializationBuilder, AddressInitializationCall, ProxyAction};
pub use staking::{
    ClaimBuilder, ClaimCall, StakeCall, StakingBuilder, UnnominateBuilder, UnnominateCall, UnstakeBuilder,
    UnstakeCall, WithdrawUnbondedCall, WithdrawUnstakedBuilder,
};
pub use transfer::{TransferBuilder, TransferCall};
