use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dotkit_builder::TransactionBuilderFactory;
use dotkit_primitives::{encode_address, parse_account, AddressFormat, Material, RegistryCache};
use dotkit_wallet::logging::{init_logging, LogConfig};
use dotkit_wallet::{load_raw_transaction, PrecomputedDeriver, RecoveryScanner, RpcClient, WalletConfig};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "dotkit")]
#[command(about = "Substrate transaction construction and funds recovery")]
struct Cli {
    /// Wallet config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RPC URL, overrides the config file
    #[arg(short, long)]
    rpc: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Network {
    Polkadot,
    Kusama,
    Substrate,
}

impl From<Network> for AddressFormat {
    fn from(network: Network) -> Self {
        match network {
            Network::Polkadot => AddressFormat::Polkadot,
            Network::Kusama => AddressFormat::Kusama,
            Network::Substrate => AddressFormat::Substrate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a public key as an SS58 address
    Address {
        /// Hex encoded ed25519 public key
        public_key: String,

        #[arg(short, long, value_enum, default_value = "substrate")]
        format: Network,
    },

    /// Decode and explain a raw transaction
    Explain {
        /// Chain material JSON file
        #[arg(short, long)]
        material: PathBuf,

        /// Reference block of a signed extrinsic, defaults to the genesis hash
        #[arg(long)]
        reference_block: Option<String>,

        /// Sender address, required for a signing payload
        #[arg(short, long)]
        sender: Option<String>,

        /// Hex encoded signed extrinsic or signing payload
        raw: String,
    },

    /// Scan receive addresses and build an unsigned sweep of the first funded one
    Recover {
        /// Exported child keys (see `PrecomputedDeriver`)
        #[arg(short, long)]
        keys: PathBuf,

        /// Address receiving the recovered funds
        #[arg(short, long)]
        destination: String,

        #[arg(long, default_value_t = 0)]
        start: u32,

        /// Addresses to scan, defaults to the configured scan factor
        #[arg(long)]
        count: Option<u32>,
    },
}

fn load_config(cli: &Cli) -> Result<WalletConfig> {
    let mut config = match &cli.config {
        Some(path) => WalletConfig::load(path)?,
        None => WalletConfig::default(),
    };
    if let Some(rpc) = &cli.rpc {
        config.rpc_url = rpc.clone();
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid config: {}", e))?;
    Ok(config)
}

fn explain(material: &Path, sender: Option<&str>, reference_block: Option<&str>, raw: &str) -> Result<()> {
    let data = std::fs::read(material).with_context(|| format!("reading {}", material.display()))?;
    let material: Material = serde_json::from_slice(&data)?;
    let cache = RegistryCache::new();
    let factory = TransactionBuilderFactory::from_material(&material, &cache)?;

    let tx = load_raw_transaction(&factory, raw, sender, reference_block)?;
    let explanation = tx.explain_transaction()?;
    println!("{}", serde_json::to_string_pretty(&explanation)?);
    Ok(())
}

async fn recover(config: &WalletConfig, keys: &Path, destination: &str, start: u32, count: u32) -> Result<()> {
    let deriver = PrecomputedDeriver::load(keys)?;
    let client = Arc::new(RpcClient::new(
        &config.rpc_url,
        Duration::from_secs(config.request_timeout_secs),
    )?);

    let material = client.fetch_material().await?;
    let cache = RegistryCache::new();
    let factory = Arc::new(TransactionBuilderFactory::from_material(&material, &cache)?);

    let root_key = deriver.root_key().to_string();
    let scanner = RecoveryScanner::new(factory, client, Arc::new(deriver), &root_key)
        .with_max_validity_duration(config.max_validity_duration);

    let cancel = scanner.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current address");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let sweep = scanner.scan(destination, start, count).await?;
    info!(index = sweep.scan_index(), "found funded address");
    println!("{}", serde_json::to_string_pretty(&sweep)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(&LogConfig::from_env())?;
    let cli = Cli::parse();

    match &cli.command {
        Commands::Address { public_key, format } => {
            let account = parse_account(public_key)?;
            let format: AddressFormat = (*format).into();
            println!("{}", encode_address(&account, format.prefix()));
        }
        Commands::Explain {
            material,
            reference_block,
            sender,
            raw,
        } => explain(material, sender.as_deref(), reference_block.as_deref(), raw)?,
        Commands::Recover {
            keys,
            destination,
            start,
            count,
        } => {
            let config = load_config(&cli)?;
            let count = count.unwrap_or(config.scan_factor);
            recover(&config, keys, destination, *start, count).await?;
        }
    }

    Ok(())
}
