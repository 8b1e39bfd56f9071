//! kettle-cli: send confidential compute requests from the command line.
//!
//! ```text
//! kettle-cli kettle
//! kettle-cli send --to 0x.. --sig "newBid(uint64,address[])" --args 10 --args "[0x..]" \
//!     --confidential-input 0xdeadbeef
//! kettle-cli receipt 0x<tx-hash>
//! ```

use alloy::primitives::{hex, Address, Bytes, TxHash};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use kettle_client::abi::artifacts::{load_dir, Artifact};
use kettle_client::abi::encoder::{coerce_args, resolve_function, CallEncoder};
use kettle_client::abi::EventRegistry;
use kettle_client::blockchain::wallet::PRIVATE_KEY_ENV_VAR;
use kettle_client::blockchain::{
    resolve_kettle, ConfidentialSession, DevModeKey, ExecutionReport, KettleClient, KettleError,
    ReceiptPoller, SessionOptions,
};
use kettle_client::config::loader::ConfigError;
use kettle_client::config::validation::validate_config;
use kettle_client::config::{load_config, ClientConfig};
use kettle_client::lifecycle::{signals::spawn_signal_listener, Shutdown};
use kettle_client::observability::init_logging;

#[derive(Parser)]
#[command(name = "kettle-cli")]
#[command(about = "Send confidential compute requests to a kettle", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint, overrides `[rpc] url`.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Kettle address, overrides `[kettle] address`.
    #[arg(long)]
    kettle: Option<Address>,

    /// Hex private key for signing.
    #[arg(long, env = PRIVATE_KEY_ENV_VAR, hide_env_values = true)]
    private_key: Option<String>,

    /// Artifact directory, repeatable. Replaces `[artifacts] dirs`.
    #[arg(long)]
    artifacts: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved kettle address
    Kettle,
    /// Send a confidential call and wait for its receipt
    Send {
        /// Contract to call
        #[arg(long)]
        to: Address,
        /// Function name or signature, e.g. "newBid(uint64,address[])"
        #[arg(long)]
        sig: String,
        /// Call arguments in declared order
        #[arg(long)]
        args: Vec<String>,
        /// 0x-prefixed hex, or literal text
        #[arg(long)]
        confidential_input: Option<String>,
    },
    /// Wait for an existing transaction and decode its events
    Receipt {
        tx_hash: TxHash,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&cli)?;
    init_logging(&config.observability);

    tracing::debug!(
        rpc_url = %config.rpc.url,
        kettle = ?config.kettle.address,
        dev_mode = config.kettle.dev_mode,
        "Configuration loaded"
    );

    let client = KettleClient::new(config.rpc.clone())?;
    let configured_kettle = config
        .kettle
        .address
        .as_deref()
        .map(str::parse::<Address>)
        .transpose()?;

    let shutdown = Shutdown::new();
    let listener = spawn_signal_listener(shutdown.clone());

    let result = match cli.command {
        Commands::Kettle => {
            let kettle = resolve_kettle(&client, configured_kettle).await?;
            println!("{}", kettle);
            Ok(())
        }
        Commands::Send {
            to,
            sig,
            args,
            confidential_input,
        } => {
            let artifacts = load_artifacts(&config)?;
            let function = resolve_function(&artifacts, &sig)?;
            let call_data = function.encode(&coerce_args(&function, &args)?)?;
            let confidential = confidential_input
                .as_deref()
                .map(parse_confidential_input)
                .transpose()?
                .unwrap_or_default();

            let options = SessionOptions {
                kettle: configured_kettle,
                private_key: cli.private_key.clone(),
                dev_key: if config.kettle.dev_mode {
                    Some(DevModeKey::well_known()?)
                } else {
                    None
                },
                chain_id: config.rpc.chain_id,
                receipt_timeout: Duration::from_secs(config.receipts.timeout_secs),
                poll_interval: Duration::from_millis(config.receipts.poll_interval_ms),
            };
            let events = Arc::new(EventRegistry::from_artifacts(&artifacts));
            let session = ConfidentialSession::connect(client, options, events).await?;

            println!("kettle: {}", session.kettle());
            println!("signer: {}", session.signer());
            session
                .send(to, call_data, confidential, Some(shutdown.subscribe()))
                .await
                .map(|report| print_report(&report))
        }
        Commands::Receipt { tx_hash } => {
            let artifacts = load_artifacts(&config)?;
            let events = EventRegistry::from_artifacts(&artifacts);
            let receipt = ReceiptPoller::new(&client)
                .timeout(Duration::from_secs(config.receipts.timeout_secs))
                .interval(Duration::from_millis(config.receipts.poll_interval_ms))
                .cancel_on(shutdown.subscribe())
                .wait(tx_hash)
                .await?;

            println!("status: {}", if receipt.succeeded() { "success" } else { "failed" });
            if let Some(block) = receipt.block_number() {
                println!("block: {}", block);
            }
            for log in &receipt.logs {
                println!("  {}", events.render(log));
            }
            Ok(())
        }
    };

    listener.abort();
    Ok(result?)
}

/// Load the config file, apply flag overrides and re-validate.
fn resolve_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };

    if let Some(url) = &cli.rpc_url {
        config.rpc.url = url.clone();
    }
    if let Some(kettle) = cli.kettle {
        config.kettle.address = Some(kettle.to_string());
    }
    if !cli.artifacts.is_empty() {
        config.artifacts.dirs = cli
            .artifacts
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load every configured artifact directory. Missing directories are skipped.
fn load_artifacts(config: &ClientConfig) -> Result<Vec<Artifact>, KettleError> {
    let mut artifacts = Vec::new();
    for dir in &config.artifacts.dirs {
        let dir = Path::new(dir);
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "Artifact directory not found");
            continue;
        }
        artifacts.extend(load_dir(dir)?);
    }
    Ok(artifacts)
}

/// `0x`-prefixed input is hex, anything else is taken as UTF-8 text.
fn parse_confidential_input(input: &str) -> Result<Bytes, KettleError> {
    if input.starts_with("0x") {
        hex::decode(input)
            .map(Bytes::from)
            .map_err(|e| KettleError::InvalidRequest(format!("confidential input: {}", e)))
    } else {
        Ok(Bytes::copy_from_slice(input.as_bytes()))
    }
}

fn print_report(report: &ExecutionReport) {
    println!("tx: {}", report.tx_hash);
    println!("status: success");
    if let Some(block) = report.receipt.block_number() {
        println!("block: {}", block);
    }
    println!("events: {} ({} decoded)", report.rendered.len(), report.decoded_count());
    for line in &report.rendered {
        println!("  {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidential_input_hex_or_text() {
        assert_eq!(
            parse_confidential_input("0xdeadbeef").unwrap(),
            Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef])
        );
        assert_eq!(parse_confidential_input("bid").unwrap(), Bytes::from_static(b"bid"));
        assert!(parse_confidential_input("0xzz").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "kettle-cli",
            "--rpc-url",
            "http://127.0.0.1:9000",
            "--artifacts",
            "build",
            "--artifacts",
            "vendor/out",
            "kettle",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.rpc.url, "http://127.0.0.1:9000");
        assert_eq!(config.artifacts.dirs, vec!["build", "vendor/out"]);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cli = Cli::parse_from(["kettle-cli", "--rpc-url", "not a url", "kettle"]);
        assert!(matches!(resolve_config(&cli), Err(ConfigError::Validation(_))));
    }
}
