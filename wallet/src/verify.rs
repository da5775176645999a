use crate::errors::WalletError;
use dotkit_builder::TransactionBuilderFactory;
use dotkit_codec::{decode_extrinsic, TransactionIntent};
use dotkit_primitives::{decode_hex, parse_account};
use serde::{Deserialize, Serialize};

/// Expected destination and amount of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    /// Base units; a sweep is expected as `"0"`
    pub amount: String,
}

/// Checks a prebuilt transfer, signed or not, against what the caller asked
/// for. Only one recipient per transaction is supported.
pub fn verify_transaction(
    factory: &TransactionBuilderFactory,
    raw: &str,
    recipients: &[Recipient],
) -> Result<bool, WalletError> {
    if recipients.len() > 1 {
        return Err(WalletError::VerificationFailed(
            "sending to more than 1 destination address within a single transaction is not supported"
                .to_string(),
        ));
    }
    if raw.trim().is_empty() {
        return Err(WalletError::VerificationFailed("missing required transaction hex".to_string()));
    }

    let registry = factory.registry();
    let decoded = decode_extrinsic(&decode_hex(raw)?, registry)?;
    let Some(recipient) = recipients.first() else {
        return Ok(true);
    };

    let (dest, amount) = match TransactionIntent::from_call(&decoded.call, registry)? {
        TransactionIntent::Transfer { dest, amount }
        | TransactionIntent::ProxyTransfer { dest, amount, .. } => (dest, amount),
        TransactionIntent::Sweep { dest, .. } => (dest, 0),
        _ => {
            return Err(WalletError::VerificationFailed(format!(
                "{}.{} is not a transfer",
                decoded.call.pallet(),
                decoded.call.method()
            )))
        }
    };

    let expected = parse_account(&recipient.address)
        .map_err(|_| WalletError::InvalidAddress(recipient.address.clone()))?;
    if expected != dest {
        return Err(WalletError::VerificationFailed(
            "transaction recipient address does not match expected address".to_string(),
        ));
    }
    let expected_amount: u128 = recipient
        .amount
        .parse()
        .map_err(|_| WalletError::VerificationFailed(format!("invalid amount {}", recipient.amount)))?;
    if expected_amount != amount {
        return Err(WalletError::VerificationFailed(
            "transaction amount does not match expected amount".to_string(),
        ));
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotkit_primitives::{fixtures, TypeRegistry};
    use std::sync::Arc;

    fn factory() -> TransactionBuilderFactory {
        TransactionBuilderFactory::new(Arc::new(
            TypeRegistry::from_material(&fixtures::westend_material()).unwrap(),
        ))
    }

    fn transfer_hex(factory: &TransactionBuilderFactory) -> String {
        let mut builder = factory.get_transfer_builder();
        builder
            .sender(fixtures::ACCOUNT_1.address)
            .unwrap()
            .validity(3933, 64)
            .unwrap()
            .reference_block(fixtures::REFERENCE_BLOCK)
            .unwrap()
            .sequence_id(200)
            .unwrap()
            .to(fixtures::ACCOUNT_2.address)
            .unwrap()
            .amount("90034235235322")
            .unwrap();
        builder.build().unwrap().to_broadcast_format().unwrap()
    }

    fn recipient(address: &str, amount: &str) -> Recipient {
        Recipient {
            address: address.to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn test_matching_recipient() {
        let factory = factory();
        let raw = transfer_hex(&factory);
        assert!(verify_transaction(&factory, &raw, &[recipient(fixtures::ACCOUNT_2.address, "90034235235322")]).unwrap());
        // hex public key is the same recipient
        assert!(verify_transaction(&factory, &raw, &[recipient(fixtures::ACCOUNT_2.public_key, "90034235235322")]).unwrap());
        assert!(verify_transaction(&factory, &raw, &[]).unwrap());
    }

    #[test]
    fn test_mismatches_are_rejected() {
        let factory = factory();
        let raw = transfer_hex(&factory);
        assert!(matches!(
            verify_transaction(&factory, &raw, &[recipient(fixtures::ACCOUNT_3.address, "90034235235322")]),
            Err(WalletError::VerificationFailed(_))
        ));
        assert!(matches!(
            verify_transaction(&factory, &raw, &[recipient(fixtures::ACCOUNT_2.address, "1")]),
            Err(WalletError::VerificationFailed(_))
        ));
        let two = [
            recipient(fixtures::ACCOUNT_2.address, "1"),
            recipient(fixtures::ACCOUNT_3.address, "1"),
        ];
        assert!(verify_transaction(&factory, &raw, &two).is_err());
        assert!(verify_transaction(&factory, "", &[]).is_err());
    }
}
