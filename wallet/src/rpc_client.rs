use crate::errors::WalletError;
use crate::node::{AccountInfo, HeaderInfo, NodeRpc};
use async_trait::async_trait;
use dotkit_primitives::{parse_account, AccountId, Hash, Material};
use parity_scale_codec::Decode;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sp_crypto_hashing::{blake2_128, twox_128};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// JSON-RPC request
#[derive(Debug, Serialize)]
struct RpcRequest {
    jsonrpc: String,
    method: String,
    params: Value,
    id: u64,
}

/// JSON-RPC response
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RpcResponse {
    jsonrpc: String,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcError>,
    id: u64,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RpcError {
    code: i32,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeVersion {
    spec_name: String,
    spec_version: u32,
    transaction_version: u32,
}

/// `frame_system::AccountInfo` with `pallet_balances::AccountData`.
#[derive(Debug, Decode)]
#[allow(dead_code)]
struct StoredAccount {
    nonce: u32,
    consumers: u32,
    providers: u32,
    sufficients: u32,
    free: u128,
    reserved: u128,
    frozen: u128,
    flags: u128,
}

/// Storage key of `System.Account(account)`.
pub fn account_storage_key(account: &AccountId) -> String {
    let mut key = Vec::with_capacity(80);
    key.extend_from_slice(&twox_128(b"System"));
    key.extend_from_slice(&twox_128(b"Account"));
    key.extend_from_slice(&blake2_128(account.as_bytes()));
    key.extend_from_slice(account.as_bytes());
    format!("0x{}", hex::encode(key))
}

fn parse_hex_number(value: &str) -> Result<u64, WalletError> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16)
        .map_err(|e| WalletError::Rpc(format!("Failed to parse number {}: {}", value, e)))
}

fn as_str<'a>(value: &'a Value, what: &str) -> Result<&'a str, WalletError> {
    value
        .as_str()
        .ok_or_else(|| WalletError::Rpc(format!("Invalid {} response", what)))
}

/// Substrate node JSON-RPC client
pub struct RpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, WalletError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::Rpc(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            client,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        debug!(method, id, "rpc call");

        let request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))?;

        let rpc_response: RpcResponse = response
            .json()
            .await
            .map_err(|e| WalletError::Rpc(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(WalletError::Rpc(format!("{}: {}", error.code, error.message)));
        }

        Ok(rpc_response.result)
    }

    /// Hash of block `number`, or of the best block when `None`.
    pub async fn get_block_hash(&self, number: Option<u64>) -> Result<Hash, WalletError> {
        let params = match number {
            Some(n) => json!([n]),
            None => json!([]),
        };
        let result = self.call("chain_getBlockHash", params).await?;
        Ok(Hash::from_hex(as_str(&result, "block hash")?)?)
    }

    pub async fn get_genesis_hash(&self) -> Result<Hash, WalletError> {
        self.get_block_hash(Some(0)).await
    }

    /// Number and hash of the best block.
    pub async fn get_header(&self) -> Result<HeaderInfo, WalletError> {
        let block_hash = self.get_block_hash(None).await?;
        let header = self.call("chain_getHeader", json!([block_hash.to_hex()])).await?;
        let number = as_str(&header["number"], "header number")?;
        Ok(HeaderInfo {
            block_number: parse_hex_number(number)?,
            block_hash,
        })
    }

    pub async fn get_chain_name(&self) -> Result<String, WalletError> {
        let result = self.call("system_chain", json!([])).await?;
        Ok(as_str(&result, "chain name")?.to_string())
    }

    async fn get_runtime_version(&self) -> Result<RuntimeVersion, WalletError> {
        let result = self.call("state_getRuntimeVersion", json!([])).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// `0x` hex of the SCALE encoded runtime metadata.
    pub async fn get_metadata(&self) -> Result<String, WalletError> {
        let result = self.call("state_getMetadata", json!([])).await?;
        Ok(as_str(&result, "metadata")?.to_string())
    }

    /// Next nonce including transactions waiting in the pool.
    pub async fn get_next_index(&self, address: &str) -> Result<u32, WalletError> {
        let result = self.call("system_accountNextIndex", json!([address])).await?;
        result
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| WalletError::Rpc("Invalid account index response".to_string()))
    }

    /// Reads `System.Account`. An account that was never funded reads as zero.
    pub async fn get_account(&self, account: &AccountId) -> Result<AccountInfo, WalletError> {
        let key = account_storage_key(account);
        let result = self.call("state_getStorage", json!([key])).await?;
        if result.is_null() {
            return Ok(AccountInfo::default());
        }
        let bytes = hex::decode(as_str(&result, "storage")?.trim_start_matches("0x"))?;
        let stored = StoredAccount::decode(&mut bytes.as_slice())
            .map_err(|e| WalletError::Rpc(format!("Failed to decode account: {}", e)))?;
        Ok(AccountInfo {
            nonce: stored.nonce,
            free_balance: stored.free,
        })
    }

    /// Submits a signed extrinsic and returns its hash.
    pub async fn submit_extrinsic(&self, extrinsic: &str) -> Result<Hash, WalletError> {
        let result = self.call("author_submitExtrinsic", json!([extrinsic])).await?;
        let hash = Hash::from_hex(as_str(&result, "extrinsic hash")?)?;
        info!(hash = %hash, "submitted extrinsic");
        Ok(hash)
    }

    /// Everything needed to build transactions against the node's runtime.
    pub async fn fetch_material(&self) -> Result<Material, WalletError> {
        let genesis_hash = self.get_genesis_hash().await?;
        let chain_name = self.get_chain_name().await?;
        let version = self.get_runtime_version().await?;
        let metadata = self.get_metadata().await?;
        info!(
            chain = %chain_name,
            spec_name = %version.spec_name,
            spec_version = version.spec_version,
            "fetched chain material"
        );
        Ok(Material {
            genesis_hash,
            chain_name,
            spec_name: version.spec_name,
            spec_version: version.spec_version,
            tx_version: version.transaction_version,
            metadata,
        })
    }
}

#[async_trait]
impl NodeRpc for RpcClient {
    async fn get_account_info(&self, address: &str) -> Result<AccountInfo, WalletError> {
        let account = parse_account(address).map_err(|_| WalletError::InvalidAddress(address.to_string()))?;
        self.get_account(&account).await
    }

    async fn get_header_info(&self) -> Result<HeaderInfo, WalletError> {
        self.get_header().await
    }
}
