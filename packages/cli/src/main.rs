#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Operator CLI for the parking spot service.
//!
//! ```text
//! parking_spot_cli serve
//! parking_spot_cli issue-token [--ttl-secs 3600] [key=value ...]
//! parking_spot_cli import-lots lots.json
//! parking_spot_cli record-occupancy "25.0262,121.5276" 42
//! ```
//!
//! Paths to the store and key files come from the same environment
//! variables the server reads (see [`ServerConfig`]).

mod claims;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use parking_spot_auth::{KeyMaterial, TokenService};
use parking_spot_database::sqlite::SqliteParkingStore;
use parking_spot_database::{ParkingStore as _, read_lot_definitions};
use parking_spot_server::ServerConfig;

#[derive(Parser)]
#[command(name = "parking_spot_cli", about = "Operate the parking spot service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Issue an access token bound to the current shared secret
    IssueToken {
        /// Expire the token after this many seconds (default: never)
        #[arg(long)]
        ttl_secs: Option<u64>,
        /// Extra claims as key=value pairs
        claims: Vec<String>,
    },
    /// Import or update lots from a JSON array of {name, loc, capacity}
    ImportLots {
        /// Path to the JSON file
        path: PathBuf,
    },
    /// Record a vehicle count for a lot
    RecordOccupancy {
        /// Lot location as "lat,long"
        loc: String,
        /// Number of vehicles currently parked
        count: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();
    let config = ServerConfig::from_env();

    match cli.command {
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(parking_spot_server::run_server(config))
            })
            .await??;
        }
        Commands::IssueToken {
            ttl_secs,
            claims: pairs,
        } => {
            let claims = claims::parse_claims(&pairs)?;
            let keys = KeyMaterial::load(&config.signing_key_path, &config.secret_path)?;
            let tokens = TokenService::new(&keys);
            let token = match ttl_secs {
                Some(secs) => tokens.issue_with_ttl(claims, Duration::from_secs(secs))?,
                None => tokens.issue(claims)?,
            };
            println!("{token}");
        }
        Commands::ImportLots { path } => {
            let lots = read_lot_definitions(&path)?;
            let store = SqliteParkingStore::open(&config.db_path).await?;
            let count = store.import_lots(&lots).await?;
            println!("Imported {count} lots into {}", config.db_path.display());
        }
        Commands::RecordOccupancy { loc, count } => {
            let store = SqliteParkingStore::open(&config.db_path).await?;
            if store.get_parking_volume(&loc).await?.is_none() {
                log::warn!("No lot is registered at {loc}; recording anyway");
            }
            store.record_occupancy(&loc, count).await?;
            println!("Recorded {count} vehicles at {loc}");
        }
    }

    Ok(())
}
