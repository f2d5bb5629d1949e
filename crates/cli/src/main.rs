//! Command Line Interface for the token-sale client.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use rust_decimal::Decimal;
use sale_domain::constants::ETHER_DECIMALS;
use sale_domain::entities::ChartPoint;
use sale_domain::value_objects::{Amount, checksum_address, parse_address};
use sale_execution::prelude::*;
use std::env;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "sale-cli")]
#[command(about = "Token sale chart synchronizer and purchase client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backfill the contribution chart and print it
    Chart {
        /// Keep following live events for this many seconds
        #[arg(short, long, default_value_t = 0)]
        follow: u64,

        /// Print the series as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign and submit a purchase (key read from SALE_PRIVATE_KEY)
    Purchase {
        /// Buyer address
        #[arg(short, long)]
        address: String,

        /// Amount to spend in ether (e.g. 1.5)
        #[arg(long)]
        amount: Decimal,
    },
    /// Show the next nonce of an address
    Nonce {
        /// Account address
        #[arg(short, long)]
        address: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = SaleConfig::from_env().context("loading SALE_* configuration")?;
    let context = SaleContext::connect(config);

    match &cli.command {
        Commands::Chart { follow, json } => {
            let chart = context.chart();

            let handle = if *follow > 0 {
                Some(chart.start().await?)
            } else {
                chart.backfill().await?;
                None
            };

            if let Some(handle) = handle {
                info!(seconds = follow, "Following live events");
                tokio::time::sleep(Duration::from_secs(*follow)).await;
                handle.stop().await;
            }

            let points = chart.chart_data().await;
            if *json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                print_chart(&points);
            }

            let stats = chart.stats().await;
            if let Some(error) = stats.last_error {
                eprintln!(
                    "{} batch(es) failed, last error: {}",
                    stats.batches_failed, error
                );
            }
        }
        Commands::Purchase { address, amount } => {
            let private_key =
                env::var("SALE_PRIVATE_KEY").context("SALE_PRIVATE_KEY must be set")?;
            let spending = Amount::from_decimal(*amount, ETHER_DECIMALS)?;
            let max_gas = Amount::wei(context.config().transaction_config().max_gas_cost());

            let buyer = parse_address(address)
                .map(|a| checksum_address(&a))
                .unwrap_or_else(|_| address.clone());

            println!(
                "Buying for {} ETH from {} (max gas cost {} ETH)",
                spending, buyer, max_gas
            );

            let hash = context
                .purchase(address, spending.raw, &private_key)
                .await?;

            println!("Submitted purchase: {hash:?}");
        }
        Commands::Nonce { address } => {
            let nonce = context.nonce(address).await?;
            println!("{nonce}");
        }
    }

    Ok(())
}

fn print_chart(points: &[ChartPoint]) {
    println!("{:<25} | {:>30}", "Time", "Total accounted (ETH)");
    println!("{}", "-".repeat(58));

    for point in points {
        println!(
            "{:<25} | {:>30}",
            point.time.format("%Y-%m-%d %H:%M:%S"),
            Amount::wei(point.total_accounted).to_string()
        );
    }

    println!("{} point(s)", points.len());
}
