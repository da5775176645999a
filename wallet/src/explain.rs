use crate::errors::WalletError;
use dotkit_builder::{BuilderError, Transaction, TransactionBuilderFactory, ValidationError};

/// Rebuilds a raw signed extrinsic or signing payload so it can be explained.
///
/// A signing payload commits to its reference block but not to its sender,
/// so `sender` is required for one. A signed extrinsic carries its sender
/// but not its reference block, which falls back to the genesis hash.
pub fn load_raw_transaction(
    factory: &TransactionBuilderFactory,
    raw: &str,
    sender: Option<&str>,
    reference_block: Option<&str>,
) -> Result<Transaction, WalletError> {
    let mut builder = factory.from(raw)?;

    if builder.is_signed() {
        let genesis = factory.registry().genesis_hash().to_hex();
        builder.reference_block(reference_block.unwrap_or(&genesis))?;
    } else {
        let sender = sender.ok_or_else(|| {
            BuilderError::Validation(ValidationError::new(
                "sender",
                "is required to explain a signing payload",
            ))
        })?;
        builder.sender(sender)?;
        if let Some(hash) = reference_block {
            builder.reference_block(hash)?;
        }
    }

    Ok(builder.build()?)
}
