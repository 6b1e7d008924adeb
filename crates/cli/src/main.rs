//! Maru CLI - database migrations, catalog seeding and admin edits.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! maru-cli migrate
//!
//! # Seed products from a YAML catalog
//! maru-cli seed crates/cli/seed/catalog.yaml
//!
//! # Move an order along and attach a tracking number
//! maru-cli order status 12 shipped --tracking 1234-5678-9012
//!
//! # Grant admin rights
//! maru-cli user update 3 --admin true
//!
//! # Restock a size
//! maru-cli stock adjust 7 M --delta 10
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use maru_core::{OrderId, OrderStatus, ProductId, UserId};

mod commands;

#[derive(Parser)]
#[command(name = "maru-cli")]
#[command(author, version, about = "Maru shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load products from a YAML catalog file
    Seed {
        /// Path to the catalog file
        file: PathBuf,
    },
    /// Manage orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage stock counters
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Set an order's status (any status may follow any other)
    Status {
        order: OrderId,
        status: OrderStatus,
        /// Tracking number; "-" clears it
        #[arg(short, long)]
        tracking: Option<String>,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List accounts with their orders
    List,
    /// Edit an account. Omitted fields keep their current value.
    Update {
        user: UserId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        admin: Option<bool>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address1: Option<String>,
        #[arg(long)]
        address2: Option<String>,
        #[arg(long)]
        zipcode: Option<String>,
        /// Replace the credential with the value of `MARU_NEW_CREDENTIAL`
        #[arg(long)]
        reset_credential: bool,
    },
    /// Delete an account; its orders are kept
    Delete { user: UserId },
}

#[derive(Subcommand)]
enum StockAction {
    /// Restock (positive delta) or write off (negative delta) one size
    Adjust {
        product: ProductId,
        size: String,
        #[arg(short, long, allow_hyphen_values = true)]
        delta: i64,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::catalog(&file).await?,
        Commands::Order { action } => match action {
            OrderAction::Status {
                order,
                status,
                tracking,
            } => commands::admin::set_order_status(order, status, tracking.as_deref()).await?,
        },
        Commands::User { action } => match action {
            UserAction::List => commands::admin::list_users().await?,
            UserAction::Update {
                user,
                name,
                admin,
                phone,
                address1,
                address2,
                zipcode,
                reset_credential,
            } => {
                let edits = commands::admin::ProfileEdits {
                    name,
                    is_admin: admin,
                    phone,
                    address1,
                    address2,
                    zipcode,
                };
                commands::admin::update_user(user, edits, reset_credential).await?;
            }
            UserAction::Delete { user } => commands::admin::delete_user(user).await?,
        },
        Commands::Stock { action } => match action {
            StockAction::Adjust {
                product,
                size,
                delta,
            } => commands::admin::adjust_stock(product, &size, delta).await?,
        },
    }
    Ok(())
}
