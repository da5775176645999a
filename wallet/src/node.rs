use crate::errors::WalletError;
use async_trait::async_trait;
use dotkit_primitives::Hash;
use serde::{Deserialize, Serialize};

/// Nonce and spendable balance of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub nonce: u32,
    pub free_balance: u128,
}

/// Best block as seen by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderInfo {
    pub block_number: u64,
    pub block_hash: Hash,
}

/// Chain state queries needed by recovery.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn get_account_info(&self, address: &str) -> Result<AccountInfo, WalletError>;

    async fn get_header_info(&self) -> Result<HeaderInfo, WalletError>;
}
