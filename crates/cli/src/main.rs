//! Fresh Shine CLI - Operational tools.
//!
//! # Usage
//!
//! ```bash
//! # Bootstrap the first super admin (password read from FS_ADMIN_PASSWORD if omitted)
//! fs-cli admin create -e owner@freshshine.co.uk -n "Owner" -r super_admin
//!
//! # List admin users
//! fs-cli admin list
//!
//! # List quotes, optionally by status, with summary counts
//! fs-cli quotes list --status pending
//! ```
//!
//! # Commands
//!
//! - `admin create` - Create an auth identity and its `admin_users` row
//! - `admin list` - List admin users
//! - `quotes list` - List quotes with summary stats
//!
//! All commands use `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "fs-cli")]
#[command(author, version, about = "Fresh Shine CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect quote requests
    Quotes {
        #[command(subcommand)]
        action: QuotesAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Login password
        #[arg(short, long, env = "FS_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        /// Admin display name
        #[arg(short, long)]
        name: Option<String>,

        /// Admin role (`super_admin`, `admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
    /// List admin users
    List,
}

#[derive(Subcommand)]
enum QuotesAction {
    /// List quotes, newest first
    List {
        /// Only show quotes with this status
        #[arg(short, long)]
        status: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                name,
                role,
            } => {
                let password = SecretString::from(password);
                commands::admin::create_user(&email, &password, name.as_deref(), &role).await?;
            }
            AdminAction::List => commands::admin::list_users().await?,
        },
        Commands::Quotes { action } => match action {
            QuotesAction::List { status } => commands::quotes::list(status.as_deref()).await?,
        },
    }
    Ok(())
}
