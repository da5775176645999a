//! Field parsers used by every builder setter.
//!
//! Numbers arrive as anything `Display` (integers or decimal strings) so
//! amounts wider than 53 bits never pass through a float.

use crate::error::ValidationError;
use dotkit_primitives::{parse_account, AccountId, Hash};
use std::fmt::Display;
use std::str::FromStr;

fn parse_unsigned<T: FromStr>(field: &str, value: impl Display) -> Result<T, ValidationError> {
    let text = value.to_string();
    let text = text.trim();
    if text.starts_with('-') {
        return Err(ValidationError::negative(field));
    }
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::new(
            field,
            format!("expected an unsigned integer, got '{}'", text),
        ));
    }
    text.parse::<T>()
        .map_err(|_| ValidationError::new(field, format!("value {} is out of range", text)))
}

pub fn parse_amount(field: &str, value: impl Display) -> Result<u128, ValidationError> {
    parse_unsigned(field, value)
}

pub fn parse_u64(field: &str, value: impl Display) -> Result<u64, ValidationError> {
    parse_unsigned(field, value)
}

pub fn parse_u32(field: &str, value: impl Display) -> Result<u32, ValidationError> {
    parse_unsigned(field, value)
}

pub fn parse_u16(field: &str, value: impl Display) -> Result<u16, ValidationError> {
    parse_unsigned(field, value)
}

/// SS58 address or hex public key.
pub fn parse_address(field: &str, value: &str) -> Result<AccountId, ValidationError> {
    parse_account(value)
        .map_err(|_| ValidationError::new(field, format!("invalid address '{}'", value)))
}

pub fn parse_hash(field: &str, value: &str) -> Result<Hash, ValidationError> {
    Hash::from_hex(value).map_err(|_| ValidationError::new(field, format!("invalid block hash '{}'", value)))
}

pub fn parse_signature(field: &str, value: &[u8]) -> Result<[u8; 64], ValidationError> {
    <[u8; 64]>::try_from(value)
        .map_err(|_| ValidationError::mismatch(field, "64 bytes", format!("{} bytes", value.len())))
}

pub fn require<T: Clone>(field: &str, value: &Option<T>) -> Result<T, ValidationError> {
    value.clone().ok_or_else(|| ValidationError::required(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotkit_primitives::fixtures;

    #[test]
    fn test_negative_values_rejected() {
        let err = parse_amount("amount", "-1").unwrap_err();
        assert_eq!(err.message, "Value cannot be less than zero");
        assert!(parse_u32("nonce", -5i64).is_err());
    }

    #[test]
    fn test_wide_amounts_are_exact() {
        assert_eq!(
            parse_amount("amount", "340282366920938463463374607431768211455").unwrap(),
            u128::MAX
        );
        assert_eq!(parse_amount("amount", 90_034_235_235_322u64).unwrap(), 90_034_235_235_322);
    }

    #[test]
    fn test_malformed_numbers() {
        assert!(parse_amount("amount", "1.5").is_err());
        assert!(parse_amount("amount", "").is_err());
        assert!(parse_u16("index", 70_000).is_err());
        assert!(parse_u32("nonce", "0x10").is_err());
    }

    #[test]
    fn test_addresses() {
        let from_ss58 = parse_address("to", fixtures::ACCOUNT_1.address).unwrap();
        let from_hex = parse_address("to", fixtures::ACCOUNT_1.public_key).unwrap();
        assert_eq!(from_ss58, from_hex);
        assert_eq!(parse_address("to", "not-an-address").unwrap_err().field, "to");
    }

    #[test]
    fn test_signature_length() {
        assert!(parse_signature("signature", &[0u8; 64]).is_ok());
        assert!(parse_signature("signature", &[0u8; 63]).is_err());
    }
}
