//! Billing run binary
//!
//! Exits with status 0 when a run completes, including runs with declined
//! payments, and non-zero when it aborts.

use anyhow::Context;

use interface_cli::cli::{CommandLine, Commands};
use interface_cli::commands::{format_report, run_billing, write_fixtures};
use interface_cli::config::BillingConfig;
use interface_cli::init_tracing;
use interface_cli::progress::ProgressObserver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = BillingConfig::from_env().context("Could not load configuration")?;
    config.validate()?;
    init_tracing(&config.log_level);

    match commands.command {
        Commands::Run { period, seed } => {
            println!("Start billing run for {}", period);
            let observer = ProgressObserver::new();
            let report = run_billing(&config, period, seed, &observer).await?;
            print!("{}", format_report(&report));
            println!("Done.");
        }
        Commands::Fixtures {
            count,
            inactive_ratio,
        } => {
            let subscribers = write_fixtures(&config, count, inactive_ratio).await?;
            println!(
                "Wrote {} subscribers to {}",
                subscribers.len(),
                config.subscribers_file.display()
            );
        }
    }

    Ok(())
}
