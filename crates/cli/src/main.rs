//! Celekt Store-Ops CLI - operator tools over the CRM sync layer.
//!
//! # Usage
//!
//! ```bash
//! # Verify credentials and connectivity
//! store-ops check
//!
//! # Leads
//! store-ops leads list --status New
//! store-ops leads show 00Q5g00000AbCdEFGH
//! store-ops leads create -f Rajesh -l Kumar -p "+91 98765 43210" -e rajesh@example.com
//! store-ops leads set-status 00Q5g00000AbCdEFGH Converted
//!
//! # Issues
//! store-ops issues list --open
//! store-ops issues raise -s "AC not cooling" -d "Main hall AC unit" -c "Air Conditioning"
//! store-ops issues close 5005g00000XyZaBCDE
//!
//! # Demo requests and approved sales
//! store-ops demos list --stage Scheduled
//! store-ops demos set-stage 0065g00000DemoABCD Completed
//! store-ops sales list
//! store-ops sales record-bill 0065g00000SaleABCD -b CLK-2024-0042 -a 121410
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "store-ops")]
#[command(author, version, about = "Celekt store-ops CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify CRM credentials and connectivity
    Check,
    /// Work with sales leads
    Leads {
        #[command(subcommand)]
        action: commands::leads::LeadAction,
    },
    /// Work with store issues
    Issues {
        #[command(subcommand)]
        action: commands::issues::IssueAction,
    },
    /// Work with demo requests
    Demos {
        #[command(subcommand)]
        action: commands::demos::DemoAction,
    },
    /// Work with approved sales and billing
    Sales {
        #[command(subcommand)]
        action: commands::sales::SaleAction,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; defaults to info for our crates
    // if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "store_ops=info,celekt_crm=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = commands::client_from_env()?;

    match cli.command {
        Commands::Check => commands::check(&client).await?,
        Commands::Leads { action } => commands::leads::run(client, action).await?,
        Commands::Issues { action } => commands::issues::run(client, action).await?,
        Commands::Demos { action } => commands::demos::run(client, action).await?,
        Commands::Sales { action } => commands::sales::run(client, action).await?,
    }
    Ok(())
}
