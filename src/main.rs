//! Redirect resolver CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   rules.toml ──▶ config::load_config ──▶ RedirectConfig::build_index
//!                        ▲                          │
//!                        │ (watch mode)             ▼
//!                 ConfigWatcher ──────────▶ RedirectTable (ArcSwap)
//!                                                   │
//!   not-found URL ──▶ MatchResolver::find ◀─────────┘
//!                        │
//!                        ▼
//!                 UrlRewriter::build ──▶ redirect target / no redirect
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use redirect_resolver::config::{load_config, watcher::ConfigWatcher};
use redirect_resolver::lifecycle::{RedirectTable, Shutdown};
use redirect_resolver::observability::init_logging;
use redirect_resolver::routing::RequestUrl;

#[derive(Parser)]
#[command(name = "redirect-resolver")]
#[command(about = "Resolve not-found URLs against configured redirect rules", long_about = None)]
struct Cli {
    /// Rules file (TOML).
    #[arg(short, long, default_value = "redirects.toml")]
    config: PathBuf,

    /// Print one JSON object per URL.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the given URLs and exit
    Resolve {
        urls: Vec<String>,

        /// Use the legacy absolute-URL lookup
        #[arg(long)]
        legacy: bool,
    },
    /// Load and validate the rules file
    Check,
    /// Resolve URLs read from stdin, reloading rules when the file changes
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(&config.observability);

    tracing::info!(
        path = %cli.config.display(),
        rules = config.rules.len(),
        "Configuration loaded"
    );

    let table = Arc::new(RedirectTable::from_config(&config));

    match cli.command {
        Commands::Resolve { urls, legacy } => {
            let resolver = table.current();
            for raw in urls {
                let outcome = RequestUrl::parse(&raw).map(|url| {
                    let resolved = if legacy {
                        resolver.find_old(&url)
                    } else {
                        resolver.find(&url)
                    };
                    resolved.map(|r| r.into_new_url())
                });
                print_outcome(&raw, outcome, cli.json)?;
            }
        }
        Commands::Check => {
            let index = table.current().index().clone();
            println!(
                "{}: {} rules loaded, {} ignored, {} shadowed by duplicate old URLs",
                cli.config.display(),
                index.len(),
                index.ignored_count(),
                index.duplicate_count()
            );
        }
        Commands::Watch => watch(cli.config, table, cli.json).await?,
    }

    Ok(())
}

async fn watch(
    path: PathBuf,
    table: Arc<RedirectTable>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Arc::new(Shutdown::new());
    let (watcher, updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run()?;

    let reload = tokio::spawn(table.clone().run_updates(updates, shutdown.subscribe()));
    let signal = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { shutdown.trigger_on_ctrl_c().await })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stop = shutdown.subscribe();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(raw) if raw.trim().is_empty() => continue,
                Some(raw) => {
                    let outcome = table.resolve(raw.trim());
                    print_outcome(raw.trim(), outcome, json)?;
                }
                None => break,
            },
            _ = stop.recv() => break,
        }
    }

    shutdown.trigger();
    signal.abort();
    let _ = reload.await;
    Ok(())
}

fn print_outcome(
    raw: &str,
    outcome: Result<Option<String>, redirect_resolver::ResolveError>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let value = match &outcome {
            Ok(redirect) => serde_json::json!({ "url": raw, "redirect": redirect }),
            Err(e) => serde_json::json!({ "url": raw, "error": e.to_string() }),
        };
        println!("{}", serde_json::to_string(&value)?);
        return Ok(());
    }

    match outcome {
        Ok(Some(target)) => println!("{} -> {}", raw, target),
        Ok(None) => println!("{} -> -", raw),
        Err(e) => eprintln!("{}: {}", raw, e),
    }
    Ok(())
}
