//! Chain type registry derived from runtime metadata.
//!
//! Only the parts needed to build and read transactions are kept: pallet and
//! call indices with their field layout, pallet constants, the proxy type
//! variants, and the signed extension pipeline.

use crate::address::AddressFormat;
use crate::error::PrimitivesError;
use crate::material::{Material, RegistryKey};
use crate::runtime::ProxyType;
use crate::types::{decode_hex, Hash};
use frame_metadata::v14::RuntimeMetadataV14;
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed, META_RESERVED};
use parity_scale_codec::Decode;
use scale_info::{form::PortableForm, PortableRegistry, TypeDef};
use tracing::debug;

const MAX_TYPE_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: Option<String>,
    pub type_id: u32,
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    pub name: String,
    pub index: u8,
    pub fields: Vec<FieldInfo>,
}

impl CallInfo {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|f| f.name.as_deref().unwrap_or(""))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantInfo {
    pub name: String,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalletInfo {
    pub name: String,
    pub index: u8,
    pub calls: Vec<CallInfo>,
    pub constants: Vec<ConstantInfo>,
}

/// One entry of the runtime's signed extension pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedExtensionInfo {
    pub identifier: String,
    /// The extension adds no bytes to the extrinsic body.
    pub extra_is_empty: bool,
    /// The extension adds no bytes to the signed payload.
    pub additional_is_empty: bool,
}

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    key: RegistryKey,
    genesis_hash: Hash,
    tx_version: u32,
    ss58_prefix: u16,
    extrinsic_version: u8,
    pallets: Vec<PalletInfo>,
    proxy_types: Vec<(ProxyType, u8)>,
    signed_extensions: Vec<SignedExtensionInfo>,
}

impl TypeRegistry {
    pub fn from_material(material: &Material) -> Result<Self, PrimitivesError> {
        let bytes = decode_hex(&material.metadata)
            .map_err(|e| PrimitivesError::MetadataDecode(e.to_string()))?;
        let prefixed = RuntimeMetadataPrefixed::decode(&mut &bytes[..])
            .map_err(|e| PrimitivesError::MetadataDecode(e.to_string()))?;
        if prefixed.0 != META_RESERVED {
            return Err(PrimitivesError::MetadataDecode(format!(
                "bad magic number {:#x}",
                prefixed.0
            )));
        }
        let metadata = match prefixed.1 {
            RuntimeMetadata::V14(metadata) => metadata,
            other => return Err(PrimitivesError::UnsupportedMetadataVersion(other.version())),
        };

        let registry = Self::from_v14(material, &metadata)?;
        debug!(
            key = %registry.key,
            pallets = registry.pallets.len(),
            extensions = registry.signed_extensions.len(),
            "parsed runtime metadata"
        );
        Ok(registry)
    }

    fn from_v14(material: &Material, metadata: &RuntimeMetadataV14) -> Result<Self, PrimitivesError> {
        let types = &metadata.types;

        let mut pallets = Vec::with_capacity(metadata.pallets.len());
        for pallet in &metadata.pallets {
            let calls = match &pallet.calls {
                Some(calls) => variants_of(types, calls.ty.id)?
                    .iter()
                    .map(|variant| CallInfo {
                        name: variant.name.clone(),
                        index: variant.index,
                        fields: variant
                            .fields
                            .iter()
                            .map(|field| FieldInfo {
                                name: field.name.clone(),
                                type_id: field.ty.id,
                                type_name: field.type_name.clone(),
                            })
                            .collect(),
                    })
                    .collect(),
                None => Vec::new(),
            };
            let constants = pallet
                .constants
                .iter()
                .map(|c| ConstantInfo {
                    name: c.name.clone(),
                    value: c.value.clone(),
                })
                .collect();
            pallets.push(PalletInfo {
                name: pallet.name.clone(),
                index: pallet.index,
                calls,
                constants,
            });
        }

        let signed_extensions = metadata
            .extrinsic
            .signed_extensions
            .iter()
            .map(|ext| SignedExtensionInfo {
                identifier: ext.identifier.clone(),
                extra_is_empty: is_zero_sized(types, ext.ty.id, 0),
                additional_is_empty: is_zero_sized(types, ext.additional_signed.id, 0),
            })
            .collect();

        let mut registry = Self {
            key: material.registry_key(),
            genesis_hash: material.genesis_hash,
            tx_version: material.tx_version,
            ss58_prefix: AddressFormat::for_spec_name(&material.spec_name).prefix(),
            extrinsic_version: metadata.extrinsic.version,
            pallets,
            proxy_types: Vec::new(),
            signed_extensions,
        };

        if let Ok(value) = registry.constant("System", "SS58Prefix") {
            if let Ok(prefix) = u16::decode(&mut &value[..]) {
                registry.ss58_prefix = prefix;
            }
        }
        registry.proxy_types = resolve_proxy_types(types, &registry)?;

        Ok(registry)
    }

    pub fn key(&self) -> &RegistryKey {
        &self.key
    }

    pub fn chain_name(&self) -> &str {
        &self.key.chain_name
    }

    pub fn spec_name(&self) -> &str {
        &self.key.spec_name
    }

    pub fn spec_version(&self) -> u32 {
        self.key.spec_version
    }

    pub fn tx_version(&self) -> u32 {
        self.tx_version
    }

    pub fn genesis_hash(&self) -> &Hash {
        &self.genesis_hash
    }

    pub fn ss58_prefix(&self) -> u16 {
        self.ss58_prefix
    }

    pub fn extrinsic_version(&self) -> u8 {
        self.extrinsic_version
    }

    pub fn pallets(&self) -> &[PalletInfo] {
        &self.pallets
    }

    pub fn signed_extensions(&self) -> &[SignedExtensionInfo] {
        &self.signed_extensions
    }

    pub fn has_signed_extension(&self, identifier: &str) -> bool {
        self.signed_extensions
            .iter()
            .any(|ext| ext.identifier == identifier)
    }

    pub fn pallet(&self, name: &str) -> Result<&PalletInfo, PrimitivesError> {
        self.pallets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PrimitivesError::PalletNotFound(name.to_string()))
    }

    pub fn call(&self, pallet: &str, method: &str) -> Result<(&PalletInfo, &CallInfo), PrimitivesError> {
        let pallet_info = self.pallet(pallet)?;
        let call = pallet_info
            .calls
            .iter()
            .find(|c| c.name == method)
            .ok_or_else(|| PrimitivesError::CallNotFound {
                pallet: pallet.to_string(),
                method: method.to_string(),
            })?;
        Ok((pallet_info, call))
    }

    /// Looks up a call by its two index bytes.
    pub fn find_call(&self, pallet_index: u8, call_index: u8) -> Option<(&PalletInfo, &CallInfo)> {
        let pallet = self.pallets.iter().find(|p| p.index == pallet_index)?;
        let call = pallet.calls.iter().find(|c| c.index == call_index)?;
        Some((pallet, call))
    }

    pub fn constant(&self, pallet: &str, name: &str) -> Result<&[u8], PrimitivesError> {
        self.pallet(pallet)?
            .constants
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_slice())
            .ok_or_else(|| PrimitivesError::ConstantNotFound {
                pallet: pallet.to_string(),
                name: name.to_string(),
            })
    }

    /// Reads a little-endian unsigned constant of up to 16 bytes.
    pub fn constant_u128(&self, pallet: &str, name: &str) -> Result<u128, PrimitivesError> {
        let value = self.constant(pallet, name)?;
        if value.len() > 16 {
            return Err(PrimitivesError::ConstantTooWide {
                name: name.to_string(),
                len: value.len(),
            });
        }
        let mut buf = [0u8; 16];
        buf[..value.len()].copy_from_slice(value);
        Ok(u128::from_le_bytes(buf))
    }

    pub fn proxy_type_index(&self, proxy_type: ProxyType) -> Result<u8, PrimitivesError> {
        self.proxy_types
            .iter()
            .find(|(p, _)| *p == proxy_type)
            .map(|(_, index)| *index)
            .ok_or_else(|| PrimitivesError::UnknownProxyType(proxy_type.to_string()))
    }

    pub fn proxy_type_from_index(&self, index: u8) -> Option<ProxyType> {
        self.proxy_types
            .iter()
            .find(|(_, i)| *i == index)
            .map(|(p, _)| *p)
    }
}

fn variants_of(
    types: &PortableRegistry,
    id: u32,
) -> Result<&[scale_info::Variant<PortableForm>], PrimitivesError> {
    let ty = types
        .resolve(id)
        .ok_or_else(|| PrimitivesError::MetadataDecode(format!("type {} not in registry", id)))?;
    match &ty.type_def {
        TypeDef::Variant(def) => Ok(&def.variants),
        _ => Err(PrimitivesError::MetadataDecode(format!(
            "type {} is not a variant",
            id
        ))),
    }
}

fn is_zero_sized(types: &PortableRegistry, id: u32, depth: usize) -> bool {
    if depth > MAX_TYPE_DEPTH {
        return false;
    }
    let Some(ty) = types.resolve(id) else {
        return false;
    };
    match &ty.type_def {
        TypeDef::Composite(def) => def
            .fields
            .iter()
            .all(|f| is_zero_sized(types, f.ty.id, depth + 1)),
        TypeDef::Tuple(def) => def
            .fields
            .iter()
            .all(|f| is_zero_sized(types, f.id, depth + 1)),
        TypeDef::Array(def) => def.len == 0,
        _ => false,
    }
}

/// Reads the `ProxyType` variants from the type of `Proxy.add_proxy`'s
/// `proxy_type` argument. Runtimes without a proxy pallet have none.
fn resolve_proxy_types(
    types: &PortableRegistry,
    registry: &TypeRegistry,
) -> Result<Vec<(ProxyType, u8)>, PrimitivesError> {
    let Ok((_, add_proxy)) = registry.call("Proxy", "add_proxy") else {
        return Ok(Vec::new());
    };
    let Some(field) = add_proxy
        .fields
        .iter()
        .find(|f| f.name.as_deref() == Some("proxy_type"))
    else {
        return Ok(Vec::new());
    };
    Ok(variants_of(types, field.type_id)?
        .iter()
        .filter_map(|v| v.name.parse::<ProxyType>().ok().map(|p| (p, v.index)))
        .collect())
}
