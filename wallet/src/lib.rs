pub mod config;
pub mod errors;
pub mod explain;
pub mod keys;
pub mod keystore;
pub mod logging;
pub mod node;
pub mod recovery;
pub mod rpc_client;
pub mod verify;

pub use config::WalletConfig;
pub use errors::WalletError;
pub use explain::load_raw_transaction;
pub use keys::{derivation_path, KeyDecryptor, KeyDeriver, PrecomputedDeriver, ThresholdSigner};
pub use keystore::{EncryptedKey, KeyStore, KeystoreDecryptor};
pub use node::{AccountInfo, HeaderInfo, NodeRpc};
pub use recovery::{
    BroadcastableSweeps, ConsolidationResult, RecoveredSweep, RecoveryKeys, RecoveryScanner, SignedSweep,
    SweepContext, SweepSignature, UnsignedSweep,
};
pub use rpc_client::RpcClient;
pub use verify::{verify_transaction, Recipient};
