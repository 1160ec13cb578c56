//! hmy-transfer command line.
//!
//! Sends single or batched transfers, prints the shard directory and reads
//! node error sinks. Output is JSON on stdout; logs go to stderr.

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use hmy_transfer::batch::{BatchDriver, SignerProvider, TransferEntry};
use hmy_transfer::common::ChainId;
use hmy_transfer::config::{load_config, ClientConfig};
use hmy_transfer::lifecycle::{signals, Shutdown};
use hmy_transfer::observability::logging::init_logging;
use hmy_transfer::rpc::{
    reply_result, Connector, DebugHook, HttpConnector, Method, Namespace, RpcTrace,
};
use hmy_transfer::sharding::ShardDirectory;
use hmy_transfer::signer::{KeystoreDir, LocalSigner};
use hmy_transfer::transaction::{Behavior, TxErrorRecord, TxVariant};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "hmy-transfer")]
#[command(about = "Sign, send and confirm transfers on a sharded ledger", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RPC endpoint used to discover shards.
    #[arg(short, long)]
    node: Option<String>,

    /// Chain name or numeric chain id.
    #[arg(long)]
    chain: Option<String>,

    /// Transaction shape: cross-shard or eth.
    #[arg(long)]
    variant: Option<TxVariant>,

    /// RPC namespace: hmy, hmyv2 or eth.
    #[arg(long)]
    namespace: Option<Namespace>,

    /// Log raw RPC requests and responses.
    #[arg(long)]
    debug_rpc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one transfer, or every transfer listed in --file
    Transfer(TransferArgs),
    /// Print the network's shard directory
    Shards,
    /// Print the node's current error sink
    Failures {
        #[arg(value_enum, default_value_t = SinkKind::Plain)]
        kind: SinkKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SinkKind {
    Plain,
    Staking,
}

#[derive(clap::Args)]
struct TransferArgs {
    /// JSON array of transfers; replaces the single-transfer flags.
    #[arg(long)]
    file: Option<PathBuf>,

    #[arg(long, required_unless_present = "file")]
    from: Option<String>,

    #[arg(long, required_unless_present = "file")]
    to: Option<String>,

    /// Amount in ONE.
    #[arg(long, required_unless_present = "file")]
    amount: Option<String>,

    #[arg(long, default_value = "0")]
    from_shard: String,

    #[arg(long, default_value = "0")]
    to_shard: String,

    /// Gas price in Gwei.
    #[arg(long)]
    gas_price: Option<String>,

    #[arg(long)]
    gas_limit: Option<String>,

    #[arg(long)]
    nonce: Option<String>,

    /// Use the mined nonce instead of the pending one.
    #[arg(long)]
    true_nonce: bool,

    #[arg(long)]
    passphrase: Option<String>,

    #[arg(long)]
    passphrase_file: Option<String>,

    /// Sign without broadcasting.
    #[arg(long)]
    dry_run: bool,

    /// Seconds to wait for a receipt.
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(load_config).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.observability.log_level);

    match run(cli, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the selected command; `Ok(false)` means it ran but reported failures.
async fn run(cli: Cli, mut config: ClientConfig) -> CliResult<bool> {
    if let Some(node) = cli.node {
        config.node.url = node;
    }
    if let Some(chain) = cli.chain {
        config.chain = chain;
    }
    if let Some(variant) = cli.variant {
        config.transfer.variant = variant;
    }
    if cli.namespace.is_some() {
        config.node.namespace = cli.namespace;
    }
    config.observability.debug_rpc |= cli.debug_rpc;

    let chain: ChainId = config.chain.parse()?;
    let namespace = config
        .node
        .namespace
        .unwrap_or_else(|| config.transfer.variant.default_namespace());

    let mut connector = HttpConnector::new(Duration::from_secs(config.node.rpc_timeout_secs))?;
    if config.observability.debug_rpc {
        connector = connector.with_debug_hook(debug_hook());
    }
    let connector: Arc<dyn Connector> = Arc::new(connector);

    tracing::info!(
        node = %config.node.url,
        chain = %chain,
        variant = %config.transfer.variant,
        %namespace,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Transfer(args) => transfer(args, &config, chain, namespace, connector).await,
        Commands::Shards => {
            let messenger = connector.connect(&config.node.url)?;
            let directory = ShardDirectory::resolve(messenger.as_ref(), namespace).await?;
            print_json(&json!(directory.routes()))?;
            Ok(true)
        }
        Commands::Failures { kind } => {
            let method = match kind {
                SinkKind::Plain => Method::GetCurrentTransactionErrorSink,
                SinkKind::Staking => Method::GetCurrentStakingErrorSink,
            }
            .qualified(namespace);
            let messenger = connector.connect(&config.node.url)?;
            let reply = messenger.send_rpc(&method, vec![]).await?;
            let records: Vec<TxErrorRecord> = match reply_result(&reply, &method)? {
                Value::Null => Vec::new(),
                result => serde_json::from_value(result.clone())?,
            };
            print_json(&json!(records))?;
            Ok(true)
        }
    }
}

async fn transfer(
    args: TransferArgs,
    config: &ClientConfig,
    chain: ChainId,
    namespace: Namespace,
    connector: Arc<dyn Connector>,
) -> CliResult<bool> {
    let mut entries = match &args.file {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<Vec<TransferEntry>>(&content)?
        }
        None => vec![TransferEntry {
            from: args.from.clone(),
            to: args.to.clone(),
            amount: args.amount.clone(),
            from_shard: Some(args.from_shard.clone()),
            to_shard: Some(args.to_shard.clone()),
            passphrase_string: args.passphrase.clone(),
            passphrase_file: args.passphrase_file.clone(),
            nonce: args.nonce.clone(),
            gas_price: args.gas_price.clone(),
            gas_limit: args.gas_limit.clone(),
            stop_on_error: false,
            true_nonce: args.true_nonce,
        }],
    };
    for entry in &mut entries {
        entry
            .gas_price
            .get_or_insert_with(|| config.transfer.gas_price.clone());
    }

    let behavior = Behavior {
        dry_run: args.dry_run || config.transfer.dry_run,
        confirmation_wait: Duration::from_secs(
            args.timeout
                .unwrap_or(config.transfer.confirmation_timeout_secs),
        ),
        poll_interval: None,
    };

    let shutdown = Shutdown::new();
    signals::shutdown_on_ctrl_c(shutdown.clone());

    let mut driver = BatchDriver::new(
        connector,
        config.node.url.clone(),
        chain,
        config.transfer.variant,
        signer_provider(config)?,
    )
    .with_behavior(behavior)
    .with_namespace(namespace)
    .with_shutdown(shutdown);

    let report = driver.run(&entries).await;
    if args.file.is_some() {
        print_json(&json!(report.logs))?;
    } else if let Some(log) = report.logs.first() {
        print_json(&json!(log))?;
    }
    Ok(!report.has_error)
}

fn signer_provider(config: &ClientConfig) -> CliResult<SignerProvider> {
    if std::env::var_os(&config.signing.private_key_env).is_some() {
        let signer = LocalSigner::from_env(&config.signing.private_key_env)?;
        return Ok(SignerProvider::Unlocked(signer));
    }
    match &config.signing.keystore_dir {
        Some(dir) => Ok(SignerProvider::Keystore(Arc::new(KeystoreDir::new(dir)))),
        None => Err(format!(
            "no signing key: set {} or signing.keystore_dir",
            config.signing.private_key_env
        )
        .into()),
    }
}

fn debug_hook() -> DebugHook {
    Arc::new(|trace: RpcTrace<'_>| match trace {
        RpcTrace::Request { endpoint, body } => {
            tracing::info!(target: "hmy_transfer::rpc", endpoint, body, "RPC request")
        }
        RpcTrace::Response { endpoint, body } => {
            tracing::info!(target: "hmy_transfer::rpc", endpoint, body, "RPC response")
        }
    })
}

fn print_json(value: &Value) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
