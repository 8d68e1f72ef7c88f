use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use tzkit::blockchain::{Limits, NodeClient, Tez, TezosRpc, TransferRequest};
use tzkit::config::load_or_default;
use tzkit::lifecycle::{signals, Cancellation};
use tzkit::observability::logging::init_logging;
use tzkit::{check_address, wallet};

#[derive(Parser)]
#[command(name = "tzkit")]
#[command(about = "Derive Tezos accounts and send operations to a node", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `node.provider_url`.
    #[arg(short, long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List wallet addresses derived from the environment secrets
    Addresses {
        #[arg(long, default_value_t = 0)]
        from: u32,
        #[arg(long, default_value_t = 5)]
        count: u32,
    },
    /// Check an address's Base58Check encoding
    Validate { address: String },
    /// Show the current head block
    Head,
    /// Show an address's balance in tez
    Balance { address: String },
    /// Transfer tez from a wallet account
    Send {
        /// Destination address
        to: String,
        /// Amount in tez, e.g. 1.5
        amount: String,
        #[arg(long, default_value_t = 0)]
        index: u32,
        /// Fee in tez
        #[arg(long, default_value = "0")]
        fee: String,
        #[arg(long)]
        gas_limit: Option<u64>,
        #[arg(long)]
        storage_limit: Option<u64>,
        /// Michelson parameters as JSON
        #[arg(long)]
        parameters: Option<String>,
        /// Build the batch and print it without forging or injecting
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.node.provider_url = url;
    }
    init_logging(&config.observability.log_level)?;

    match cli.command {
        Commands::Validate { address } => {
            let valid = check_address(&address);
            println!("{address}: {}", if valid { "valid" } else { "invalid" });
            if !valid {
                std::process::exit(1);
            }
        }
        Commands::Addresses { from, count } => {
            let wallet = wallet::from_env(config.wallet.scheme)?;
            for entry in wallet.addresses(from, count)? {
                println!("{}\t{}", entry.index, entry.address);
            }
        }
        Commands::Head => {
            let client = NodeClient::new(&config.node)?;
            print_json(&client.get_head().await?)?;
        }
        Commands::Balance { address } => {
            let client = NodeClient::new(&config.node)?;
            println!("{} tez", client.get_balance(&address).await?);
        }
        Commands::Send {
            to,
            amount,
            index,
            fee,
            gas_limit,
            storage_limit,
            parameters,
            dry_run,
        } => {
            let mut transfer = TransferRequest::new(to, amount.parse::<Tez>()?).with_fee(fee.parse()?);
            transfer.limits = Limits {
                gas_limit,
                storage_limit,
            };
            if let Some(raw) = parameters {
                transfer = transfer.with_parameters(serde_json::from_str(&raw)?);
            }

            let cancellation = Cancellation::new();
            let token = cancellation.token();
            signals::cancel_on_ctrl_c(cancellation);

            let wallet = wallet::from_env(config.wallet.scheme)?;
            let rpc = TezosRpc::from_config(&config, Some(wallet))?.with_cancel_token(token);

            if dry_run {
                let batch = rpc.prepare_transaction(index, &transfer).await?;
                print_json(&serde_json::to_value(&batch.operations)?)?;
                return Ok(());
            }

            let outcome = rpc.send_transaction(index, &transfer).await?;
            for result in &outcome.results {
                println!(
                    "{}\t{}\tgas={}",
                    result.kind(),
                    result.status,
                    result.consumed_gas().unwrap_or("-")
                );
            }
            match outcome.operation_hash {
                Some(hash) => println!("injected {hash}"),
                None => {
                    eprintln!("Error: preapply rejected the batch, nothing injected");
                    for result in outcome.results.iter().filter(|r| !r.succeeded) {
                        print_json(&result.data)?;
                    }
                    std::process::exit(2);
                }
            }
        }
    }

    Ok(())
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
