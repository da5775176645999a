//! Transaction builders for Substrate chains.
//!
//! Builders are created by a [`TransactionBuilderFactory`], either empty for
//! manual construction or populated from raw bytes via
//! [`TransactionBuilderFactory::from`]. Both paths end in `build()`, which
//! yields a [`Transaction`].

pub mod builder;
pub mod builders;
pub mod error;
pub mod factory;
pub mod transaction;
pub mod validation;

pub use builder::{CallBuilder, TransactionBuilder};
pub use builders::*;
pub use error::{BuilderError, ValidationError};
pub use factory::{AnyBuilder, TransactionBuilderFactory};
pub use transaction::{
    Entry, ExplanationOutput, FeeInfo, Transaction, TransactionExplanation, TransactionType, TxData,
    STAKING_DESTINATION,
};
