use crate::types::Hash;
use serde::{Deserialize, Serialize};

/// Chain parameters required to encode or decode anything for one runtime.
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub genesis_hash: Hash,
    pub chain_name: String,
    pub spec_name: String,
    pub spec_version: u32,
    pub tx_version: u32,
    /// `0x` hex of a SCALE encoded `RuntimeMetadataPrefixed`.
    pub metadata: String,
}

impl Material {
    /// Identity of the runtime this material describes.
    pub fn registry_key(&self) -> RegistryKey {
        RegistryKey {
            chain_name: self.chain_name.clone(),
            spec_name: self.spec_name.clone(),
            spec_version: self.spec_version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryKey {
    pub chain_name: String,
    pub spec_name: String,
    pub spec_version: u32,
}

impl std::fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.chain_name, self.spec_name, self.spec_version)
    }
}
