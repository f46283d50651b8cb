use clap::{Parser, Subcommand};

use core_kernel::BillingPeriod;

#[derive(Debug, Parser)]
#[command(name = "billing-run")]
#[command(about = "Monthly billing for all active subscribers.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bill every active subscriber for a period
    Run {
        /// Billing period as MM-YYYY or YYYY-MM
        period: BillingPeriod,
        /// Seed for the simulated payment provider, overrides the configuration
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Write a listing of random subscribers to the configured subscribers file
    Fixtures {
        /// Number of subscribers to generate
        #[arg(long, default_value_t = 100)]
        count: usize,
        /// Share of generated subscribers that are inactive
        #[arg(long, default_value_t = 0.1)]
        inactive_ratio: f64,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
