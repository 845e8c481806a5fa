//! Offer Desk CLI
//!
//! Commands: houses, items, quote, compress, describe
//! Outputs JSON to stdout, logs to stderr
//! Returns non-zero on failure

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use offerdesk_core::{
    builtin::DEFAULT_HOUSE_ID,
    images::{BatchDriver, BatchTiming, HttpFetcher, ImageSource, RunOutcome},
    images::TracingEvents,
    narrative::config_summary,
    Catalog, Config, FinishState, ItemValue, NarrativeService, OfferSession,
};

#[derive(Parser)]
#[command(name = "offerdesk-cli")]
#[command(about = "Offer Desk CLI - house offer pricing and print preparation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON catalog file (built-in catalog when omitted)
    #[arg(short, long)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List houses
    Houses,

    /// List the priceable items of a house
    Items {
        #[arg(long, default_value = DEFAULT_HOUSE_ID)]
        house: String,
    },

    /// Price a configuration
    Quote {
        #[arg(long, default_value = DEFAULT_HOUSE_ID)]
        house: String,

        /// Use the developer finish price
        #[arg(long)]
        developer: bool,

        /// Item value, CODE=VALUE (repeatable)
        #[arg(short, long = "set")]
        set: Vec<String>,

        #[arg(long)]
        client: Option<String>,
    },

    /// Compress the offer's images for print
    Compress {
        #[arg(long, default_value = DEFAULT_HOUSE_ID)]
        house: String,

        /// Slot override, NAME=URL or NAME=data URL (repeatable)
        #[arg(long = "slot")]
        slots: Vec<String>,

        /// Include the embedded data URLs in the output
        #[arg(long)]
        full: bool,
    },

    /// Generate the sales paragraph for a configuration
    Describe {
        #[arg(long, default_value = DEFAULT_HOUSE_ID)]
        house: String,

        #[arg(short, long = "set")]
        set: Vec<String>,
    },
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap());
}

fn fail(message: impl std::fmt::Display) -> ExitCode {
    print_json(&serde_json::json!({ "success": false, "error": message.to_string() }));
    ExitCode::FAILURE
}

fn split_pair(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("Expected NAME=VALUE, got {:?}", raw))
}

fn configure(catalog: Catalog, house: &str, pairs: &[String]) -> Result<OfferSession, String> {
    let mut session = OfferSession::new(catalog, house).map_err(|e| e.to_string())?;
    for raw in pairs {
        let (code, value) = split_pair(raw)?;
        session.set_item(code, ItemValue::parse(value)).map_err(|e| e.to_string())?;
    }
    Ok(session)
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => return fail(format!("Invalid configuration: {}", e)),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("offerdesk_core={0},offerdesk_cli={0}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let catalog = match &cli.catalog {
        Some(path) => match Catalog::load_from_file(path) {
            Ok(c) => c,
            Err(e) => return fail(format!("Failed to load catalog: {}", e)),
        },
        None => Catalog::builtin(),
    };

    match cli.command {
        Commands::Houses => {
            let houses: Vec<_> = catalog
                .list()
                .iter()
                .map(|h| serde_json::json!({
                    "id": h.id,
                    "name": h.name,
                    "status": h.status,
                    "basePrice": h.base_price,
                    "developerPrice": h.developer_price,
                    "details": h.details,
                }))
                .collect();
            print_json(&serde_json::json!(houses));
            ExitCode::SUCCESS
        }

        Commands::Items { house } => {
            if catalog.get(&house).is_none() {
                return fail(format!("House not found: {}", house));
            }
            print_json(&serde_json::json!(catalog.items_for(&house)));
            ExitCode::SUCCESS
        }

        Commands::Quote { house, developer, set, client } => {
            let mut session = match configure(catalog, &house, &set) {
                Ok(s) => s,
                Err(e) => return fail(e),
            };
            if developer {
                session.set_finish(FinishState::Developer);
            }
            if let Some(name) = client {
                session.set_client_name(name);
            }

            match session.manifest() {
                Ok(manifest) => {
                    print_json(&serde_json::json!({ "success": true, "offer": manifest }));
                    ExitCode::SUCCESS
                }
                Err(e) => fail(e),
            }
        }

        Commands::Compress { house, slots, full } => {
            let mut session = match OfferSession::new(catalog, &house) {
                Ok(s) => s,
                Err(e) => return fail(e),
            };

            let mut images = session.images().clone();
            for raw in &slots {
                match split_pair(raw) {
                    Ok((name, reference)) => images.insert(name, ImageSource::parse(reference)),
                    Err(e) => return fail(e),
                }
            }

            let fetcher = match HttpFetcher::new() {
                Ok(f) => f,
                Err(e) => return fail(e),
            };

            let mut driver = BatchDriver::new(config.prepare_context(), BatchTiming::default());
            let cancel = driver.cancel_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling after the current image");
                    cancel.cancel();
                }
            });

            let outcome = match driver.run(&images, &fetcher, &TracingEvents).await {
                Ok(o) => o,
                Err(e) => return fail(e),
            };

            match outcome {
                RunOutcome::Completed { images, stats } => {
                    session.apply_images(images);
                    let slots: Vec<_> = session
                        .images()
                        .iter()
                        .map(|slot| match (&slot.source, full) {
                            (ImageSource::Embedded(e), false) => serde_json::json!({
                                "name": slot.name,
                                "embedded": true,
                                "mime": e.mime,
                                "bytes": e.estimated_size(),
                            }),
                            (source, _) => serde_json::json!({
                                "name": slot.name,
                                "embedded": source.is_embedded(),
                                "source": source,
                            }),
                        })
                        .collect();

                    info!(saved_percent = stats.saved_percent(), "Images ready for print");
                    print_json(&serde_json::json!({
                        "success": true,
                        "stats": {
                            "originalMb": stats.original_mb(),
                            "compressedMb": stats.compressed_mb(),
                            "savedPercent": stats.saved_percent(),
                        },
                        "logs": driver.logs(),
                        "slots": slots,
                    }));
                    ExitCode::SUCCESS
                }
                RunOutcome::Cancelled => {
                    print_json(&serde_json::json!({
                        "success": false,
                        "cancelled": true,
                        "logs": driver.logs(),
                    }));
                    ExitCode::from(130)
                }
            }
        }

        Commands::Describe { house, set } => {
            let session = match configure(catalog, &house, &set) {
                Ok(s) => s,
                Err(e) => return fail(e),
            };

            let summary = config_summary(session.items(), session.selection());
            let service = NarrativeService::new(config.gemini_api_key.clone());
            let text = service.describe(&summary).await;

            print_json(&serde_json::json!({
                "success": true,
                "summary": summary,
                "description": text,
            }));
            ExitCode::SUCCESS
        }
    }
}
