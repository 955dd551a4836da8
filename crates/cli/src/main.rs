//! Solar Portal CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply the site schema (key-value records and sessions)
//! sp-cli migrate
//!
//! # Write the default formations if the catalogue is empty
//! sp-cli seed formations
//!
//! # Overwrite the catalogue with the default formations
//! sp-cli seed formations --reset
//!
//! # Grant or revoke the admin panel for an existing account
//! sp-cli admin grant -e jean@example.com
//! sp-cli admin revoke -e jean@example.com
//!
//! # Produce a value for SITE_ADMIN_PASSWORD_HASH
//! sp-cli admin hash-password
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sp-cli")]
#[command(author, version, about = "Solar portal CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the datastore
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage admin access
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed the formation catalogue
    Formations {
        /// Replace the existing catalogue
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Give an account access to the admin panel
    Grant {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Remove admin panel access from an account
    Revoke {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Hash a password read from stdin for `SITE_ADMIN_PASSWORD_HASH`
    HashPassword,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Formations { reset } => commands::seed::formations(reset).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Grant { email } => commands::admin::set_admin(&email, true).await?,
            AdminAction::Revoke { email } => commands::admin::set_admin(&email, false).await?,
            AdminAction::HashPassword => commands::admin::hash_password().await?,
        },
    }
    Ok(())
}
