//! Extrinsic assembly and decoding.
//!
//! Wire formats handled here:
//!
//! * signing payload: `Compact(len(call)) ++ call ++ extra ++ additional`,
//!   the unsigned form handed to external signers;
//! * signable payload: `call ++ extra ++ additional`, hashed with
//!   blake2-256 when longer than 256 bytes. These are the bytes signed;
//! * signed extrinsic: `Compact(len) ++ 0x84 ++ MultiAddress::Id(sender) ++
//!   MultiSignature::Ed25519(sig) ++ extra ++ call`.
//!
//! `extra` and `additional` are produced by walking the runtime's signed
//! extensions in metadata order.

use crate::call::Call;
use crate::era::Era;
use crate::error::CodecError;
use dotkit_primitives::{blake2_256, AccountId, Hash, TypeRegistry};
use parity_scale_codec::{Compact, Decode, Encode};
use tracing::trace;

pub const EXTRINSIC_VERSION: u8 = 4;
const SIGNED_FLAG: u8 = 0b1000_0000;
const SIGNED_V4: u8 = SIGNED_FLAG | EXTRINSIC_VERSION;
const MULTI_ADDRESS_ID: u8 = 0x00;
const SIGNATURE_ED25519: u8 = 0x00;
const MAX_UNHASHED_PAYLOAD: usize = 256;

/// Signed extensions that contribute bytes. Everything else must be
/// zero-sized in both positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extension {
    SpecVersion,
    TxVersion,
    Genesis,
    Mortality,
    Nonce,
    Tip,
    AssetTip,
    MetadataHash,
}

/// Pipeline used when metadata does not list its extensions.
const DEFAULT_PIPELINE: &[Extension] = &[
    Extension::SpecVersion,
    Extension::TxVersion,
    Extension::Genesis,
    Extension::Mortality,
    Extension::Nonce,
    Extension::Tip,
];

fn pipeline(registry: &TypeRegistry) -> Result<Vec<Extension>, CodecError> {
    if registry.extrinsic_version() != EXTRINSIC_VERSION {
        return Err(CodecError::UnsupportedExtrinsicVersion(registry.extrinsic_version()));
    }
    let listed = registry.signed_extensions();
    if listed.is_empty() {
        return Ok(DEFAULT_PIPELINE.to_vec());
    }
    let mut pipeline = Vec::with_capacity(listed.len());
    for ext in listed {
        let known = match ext.identifier.as_str() {
            "CheckSpecVersion" => Some(Extension::SpecVersion),
            "CheckTxVersion" => Some(Extension::TxVersion),
            "CheckGenesis" => Some(Extension::Genesis),
            "CheckMortality" | "CheckEra" => Some(Extension::Mortality),
            "CheckNonce" => Some(Extension::Nonce),
            "ChargeTransactionPayment" => Some(Extension::Tip),
            "ChargeAssetTxPayment" => Some(Extension::AssetTip),
            "CheckMetadataHash" => Some(Extension::MetadataHash),
            _ => None,
        };
        match known {
            Some(extension) => pipeline.push(extension),
            None if ext.extra_is_empty && ext.additional_is_empty => {}
            None => return Err(CodecError::UnsupportedExtension(ext.identifier.clone())),
        }
    }
    Ok(pipeline)
}

/// Chain-independent fields of a transaction, as accumulated by a builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTxInfo {
    pub sender: AccountId,
    /// First block of the validity window.
    pub block_number: u64,
    /// Block the validity window is anchored to.
    pub block_hash: Hash,
    /// Window length in blocks; zero makes the transaction immortal.
    pub era_period: u64,
    pub nonce: u32,
    pub tip: u128,
}

impl BaseTxInfo {
    pub fn era(&self) -> Era {
        Era::from_window(self.block_number, self.era_period)
    }
}

fn write_extra(pipeline: &[Extension], base: &BaseTxInfo, out: &mut Vec<u8>) {
    for extension in pipeline {
        match extension {
            Extension::Mortality => base.era().encode_to(out),
            Extension::Nonce => Compact(base.nonce).encode_to(out),
            Extension::Tip => Compact(base.tip).encode_to(out),
            Extension::AssetTip => {
                Compact(base.tip).encode_to(out);
                None::<u32>.encode_to(out);
            }
            // mode: disabled
            Extension::MetadataHash => out.push(0),
            Extension::SpecVersion | Extension::TxVersion | Extension::Genesis => {}
        }
    }
}

fn write_additional(pipeline: &[Extension], base: &BaseTxInfo, registry: &TypeRegistry, out: &mut Vec<u8>) {
    for extension in pipeline {
        match extension {
            Extension::SpecVersion => registry.spec_version().encode_to(out),
            Extension::TxVersion => registry.tx_version().encode_to(out),
            Extension::Genesis => out.extend_from_slice(registry.genesis_hash().as_bytes()),
            Extension::Mortality => {
                if base.era().is_immortal() {
                    out.extend_from_slice(registry.genesis_hash().as_bytes());
                } else {
                    out.extend_from_slice(base.block_hash.as_bytes());
                }
            }
            Extension::MetadataHash => None::<[u8; 32]>.encode_to(out),
            Extension::Nonce | Extension::Tip | Extension::AssetTip => {}
        }
    }
}

/// `call ++ extra ++ additional`, before any hashing.
fn payload_body(call: &[u8], base: &BaseTxInfo, registry: &TypeRegistry) -> Result<Vec<u8>, CodecError> {
    let pipeline = pipeline(registry)?;
    let mut out = Vec::with_capacity(call.len() + 128);
    out.extend_from_slice(call);
    write_extra(&pipeline, base, &mut out);
    write_additional(&pipeline, base, registry, &mut out);
    Ok(out)
}

/// The unsigned wire form: the call is length prefixed so the payload
/// can be decoded without a signature.
pub fn signing_payload(call: &[u8], base: &BaseTxInfo, registry: &TypeRegistry) -> Result<Vec<u8>, CodecError> {
    let pipeline = pipeline(registry)?;
    let mut out = Vec::with_capacity(call.len() + 132);
    Compact(call.len() as u32).encode_to(&mut out);
    out.extend_from_slice(call);
    write_extra(&pipeline, base, &mut out);
    write_additional(&pipeline, base, registry, &mut out);
    Ok(out)
}

/// The exact bytes a signer signs over.
pub fn signable_payload(call: &[u8], base: &BaseTxInfo, registry: &TypeRegistry) -> Result<Vec<u8>, CodecError> {
    let body = payload_body(call, base, registry)?;
    if body.len() > MAX_UNHASHED_PAYLOAD {
        Ok(blake2_256(&body).to_vec())
    } else {
        Ok(body)
    }
}

pub fn attach_signature(
    call: &[u8],
    signature: &[u8; 64],
    base: &BaseTxInfo,
    registry: &TypeRegistry,
) -> Result<Vec<u8>, CodecError> {
    let pipeline = pipeline(registry)?;
    let mut body = Vec::with_capacity(call.len() + 160);
    body.push(SIGNED_V4);
    body.push(MULTI_ADDRESS_ID);
    body.extend_from_slice(base.sender.as_bytes());
    body.push(SIGNATURE_ED25519);
    body.extend_from_slice(signature);
    write_extra(&pipeline, base, &mut body);
    body.extend_from_slice(call);

    let mut out = Compact(body.len() as u32).encode();
    out.extend_from_slice(&body);
    trace!(len = out.len(), "assembled signed extrinsic");
    Ok(out)
}

pub fn transaction_id(extrinsic: &[u8]) -> Hash {
    Hash::new(blake2_256(extrinsic))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtrinsicBody {
    /// Unsigned signing payload, with the additional data it commits to.
    SigningPayload {
        spec_version: u32,
        tx_version: u32,
        genesis_hash: Hash,
        block_hash: Hash,
    },
    Signed {
        signer: AccountId,
        signature: [u8; 64],
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedExtrinsic {
    pub call: Call,
    pub call_data: Vec<u8>,
    pub era: Era,
    pub nonce: u32,
    pub tip: u128,
    pub body: ExtrinsicBody,
}

impl DecodedExtrinsic {
    pub fn is_signed(&self) -> bool {
        matches!(self.body, ExtrinsicBody::Signed { .. })
    }
}

struct Extra {
    era: Era,
    nonce: u32,
    tip: u128,
}

fn read_extra(pipeline: &[Extension], input: &mut &[u8]) -> Result<Extra, CodecError> {
    let mut extra = Extra {
        era: Era::Immortal,
        nonce: 0,
        tip: 0,
    };
    for extension in pipeline {
        match extension {
            Extension::Mortality => extra.era = Era::decode(input)?,
            Extension::Nonce => extra.nonce = Compact::<u32>::decode(input)?.0,
            Extension::Tip => extra.tip = Compact::<u128>::decode(input)?.0,
            Extension::AssetTip => {
                extra.tip = Compact::<u128>::decode(input)?.0;
                if Option::<u32>::decode(input)?.is_some() {
                    return Err(CodecError::UnsupportedExtension(
                        "ChargeAssetTxPayment with asset id".to_string(),
                    ));
                }
            }
            Extension::MetadataHash => {
                let mode = u8::decode(input)?;
                if mode != 0 {
                    return Err(CodecError::UnsupportedExtension(format!(
                        "CheckMetadataHash mode {}",
                        mode
                    )));
                }
            }
            Extension::SpecVersion | Extension::TxVersion | Extension::Genesis => {}
        }
    }
    Ok(extra)
}

fn read_hash(input: &mut &[u8]) -> Result<Hash, CodecError> {
    Ok(Hash::new(<[u8; 32]>::decode(input)?))
}

fn read_additional(pipeline: &[Extension], input: &mut &[u8]) -> Result<ExtrinsicBody, CodecError> {
    let mut spec_version = 0;
    let mut tx_version = 0;
    let mut genesis_hash = Hash::default();
    let mut block_hash = Hash::default();
    for extension in pipeline {
        match extension {
            Extension::SpecVersion => spec_version = u32::decode(input)?,
            Extension::TxVersion => tx_version = u32::decode(input)?,
            Extension::Genesis => genesis_hash = read_hash(input)?,
            Extension::Mortality => block_hash = read_hash(input)?,
            Extension::MetadataHash => {
                if Option::<[u8; 32]>::decode(input)?.is_some() {
                    return Err(CodecError::UnsupportedExtension(
                        "CheckMetadataHash with a metadata hash".to_string(),
                    ));
                }
            }
            Extension::Nonce | Extension::Tip | Extension::AssetTip => {}
        }
    }
    Ok(ExtrinsicBody::SigningPayload {
        spec_version,
        tx_version,
        genesis_hash,
        block_hash,
    })
}

/// Decodes either a signed extrinsic or a signing payload.
///
/// Bytes are treated as signed when the leading compact length covers the
/// rest of the input and the version byte is `0x84`.
pub fn decode_extrinsic(bytes: &[u8], registry: &TypeRegistry) -> Result<DecodedExtrinsic, CodecError> {
    let pipeline = pipeline(registry)?;
    let mut input = bytes;
    let len = Compact::<u32>::decode(&mut input)?.0 as usize;

    if len == input.len() && input.first() == Some(&SIGNED_V4) {
        decode_signed(&pipeline, &input[1..], registry)
    } else {
        decode_signing_payload(&pipeline, len, input, registry)
    }
}

fn decode_signed(pipeline: &[Extension], mut input: &[u8], registry: &TypeRegistry) -> Result<DecodedExtrinsic, CodecError> {
    let address_tag = u8::decode(&mut input)?;
    if address_tag != MULTI_ADDRESS_ID {
        return Err(CodecError::Decode(format!(
            "unsupported signer address variant {}",
            address_tag
        )));
    }
    let signer = AccountId::decode(&mut input)?;
    let scheme = u8::decode(&mut input)?;
    if scheme != SIGNATURE_ED25519 {
        return Err(CodecError::UnsupportedSignature(scheme));
    }
    let signature = <[u8; 64]>::decode(&mut input)?;
    let extra = read_extra(pipeline, &mut input)?;
    let call = Call::decode_with(input, registry)?;
    Ok(DecodedExtrinsic {
        call,
        call_data: input.to_vec(),
        era: extra.era,
        nonce: extra.nonce,
        tip: extra.tip,
        body: ExtrinsicBody::Signed { signer, signature },
    })
}

fn decode_signing_payload(
    pipeline: &[Extension],
    call_len: usize,
    input: &[u8],
    registry: &TypeRegistry,
) -> Result<DecodedExtrinsic, CodecError> {
    if call_len > input.len() {
        return Err(CodecError::Decode(format!(
            "call length {} exceeds payload of {} bytes",
            call_len,
            input.len()
        )));
    }
    let (call_data, mut rest) = input.split_at(call_len);
    let call = Call::decode_with(call_data, registry)?;
    let extra = read_extra(pipeline, &mut rest)?;
    let body = read_additional(pipeline, &mut rest)?;
    if !rest.is_empty() {
        return Err(CodecError::TrailingBytes {
            context: "signing payload",
            remaining: rest.len(),
        });
    }
    Ok(DecodedExtrinsic {
        call,
        call_data: call_data.to_vec(),
        era: extra.era,
        nonce: extra.nonce,
        tip: extra.tip,
        body,
    })
}
