//! `biolink`: command-line front end for biolink sessions and hub reads.
//!
//! Hub reads, theme selection and activity claims work without a wallet.
//! `status` and `logout` operate on the persisted session record, which
//! lives in the SQLite file named by `BIOLINK_STORE` (in memory otherwise).
//!
//! Configuration comes from the `BIOLINK_*` environment variables; see
//! [`SessionConfig`].

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use biolink::{to_checksum_address, Asset, AssetKind};
use biolink_claim::ClaimClient;
use biolink_session::{
    MemoryStore, SessionConfig, SessionManager, SessionStore, SqliteStore, TracingPrompt, Wallets,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

/// biolink: session, hub and claim CLI
#[derive(Parser)]
#[command(name = "biolink", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the asset profile of an address.
    ///
    /// TYPE is the asset type as the hub names it: NFT, Gitcoin-Donation,
    /// POAP.
    Profile {
        address: String,

        #[arg(value_name = "TYPE")]
        kind: String,

        /// Bypass the cache and fetch again.
        #[arg(long)]
        refresh: bool,
    },

    /// Print the details of one NFT.
    Nft(DetailArgs),

    /// Print the details of one Gitcoin donation.
    Donation(DetailArgs),

    /// Print the details of one footprint (POAP).
    Footprint(DetailArgs),

    /// List the themes unlocked by a JSON array of assets.
    ///
    /// Pass `-` as FILE to read from stdin.
    Themes {
        file: PathBuf,
    },

    /// Print the EIP-55 checksummed form of an address.
    Checksum {
        address: String,
    },

    /// Restore the persisted session and print it.
    Status,

    /// Forget the persisted session.
    Logout,

    /// Claim the activity token for an address.
    Claim {
        address: String,

        /// Captcha token issued to the claimant.
        captcha: String,
    },
}

#[derive(Args)]
struct DetailArgs {
    /// Address whose profile holds the asset.
    address: String,

    #[arg(long)]
    platform: String,

    #[arg(long)]
    identity: String,

    #[arg(long)]
    id: String,
}

#[derive(Serialize)]
struct Status<'a> {
    active: bool,
    method: Option<&'a str>,
    address: Option<&'a str>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biolink_session=info,biolink=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = SessionConfig::try_from_env().unwrap_or_else(|e| fatal(&e.to_string()));

    match cli.command {
        Command::Checksum { address } => {
            let checksummed = to_checksum_address(&address).unwrap_or_else(|e| fatal(&e.to_string()));
            println!("{checksummed}");
        }

        Command::Themes { file } => {
            let json = read_input(&file);
            let assets: Vec<Asset> = serde_json::from_str(&json)
                .unwrap_or_else(|e| fatal(&format!("failed to parse assets: {e}")));
            let manager = open_manager(config);
            print_json(&manager.available_themes(&assets));
        }

        Command::Profile {
            address,
            kind,
            refresh,
        } => {
            let manager = open_manager(config);
            let kind = AssetKind::from(kind);
            match manager.get_asset_profile(&address, &kind, refresh).await {
                Some(profile) => print_json(&profile),
                None => fatal(&format!("no {kind} profile for {address}")),
            }
        }

        Command::Nft(args) => {
            let manager = open_manager(config);
            let res = manager
                .get_nft_detail(&args.address, &args.platform, &args.identity, &args.id)
                .await;
            print_found(res, "NFT");
        }

        Command::Donation(args) => {
            let manager = open_manager(config);
            let res = manager
                .get_gitcoin_donation(&args.address, &args.platform, &args.identity, &args.id)
                .await;
            print_found(res, "donation");
        }

        Command::Footprint(args) => {
            let manager = open_manager(config);
            let res = manager
                .get_footprint_detail(&args.address, &args.platform, &args.identity, &args.id)
                .await;
            print_found(res, "footprint");
        }

        Command::Status => {
            let manager = open_manager(config);
            let active = manager.reconnect().await;
            let session = manager.current();
            print_json(&Status {
                active,
                method: session
                    .as_ref()
                    .and_then(|s| s.method())
                    .map(|m| m.as_str()),
                address: session.as_ref().and_then(|s| s.address()),
            });
        }

        Command::Logout => {
            let manager = open_manager(config);
            manager.disconnect().await;
            println!("logged out");
        }

        Command::Claim { address, captcha } => {
            let client = ClaimClient::new(config.http_client(), &config.activity_endpoint);
            match client.mint(&address, &captcha).await {
                Ok(Some(res)) => print_json(&res),
                Ok(None) => fatal("activity service returned an empty response"),
                Err(e) => fatal(&e.to_string()),
            }
        }
    }
}

/// A manager with no wallets attached, backed by the configured store.
fn open_manager(config: SessionConfig) -> SessionManager {
    let store: Arc<dyn SessionStore> = match &config.store_path {
        Some(path) => {
            tracing::info!("store: SQLite at {path}");
            Arc::new(
                SqliteStore::open(path)
                    .unwrap_or_else(|e| fatal(&format!("failed to open session store at {path}: {e}"))),
            )
        }
        None => {
            tracing::info!("store: in-memory (session will not survive exit)");
            Arc::new(MemoryStore::new())
        }
    };
    SessionManager::init(config, Wallets::none(), store, Arc::new(TracingPrompt))
}

fn print_found<T: Serialize>(value: Option<T>, what: &str) {
    match value {
        Some(v) => print_json(&v),
        None => fatal(&format!("{what} not found")),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => fatal(&format!("failed to serialise output: {e}")),
    }
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {e}")));
        buf
    } else {
        fs::read_to_string(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {e}", path.display())))
    }
}

/// Print an error message to stderr and exit with code 1.
fn fatal(msg: &str) -> ! {
    eprintln!("biolink: {msg}");
    process::exit(1);
}
