//! Swipedeck - flashcard decks with completed, important and review ledgers.
//!
//! Decks live only as long as the process; use `export` to dump them.

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use swipedeck::config::Config;
use swipedeck::shell::Shell;
use swipedeck::store::DeckStore;
use swipedeck::transfer;

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "swipedeck")]
#[command(author, version, about = "Swipe-driven flashcard decks", long_about = None)]
struct Args {
    /// Read shell commands from a file instead of stdin
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON snapshot of all decks here on exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write the default config file and exit
    #[arg(long)]
    write_config: bool,
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(Config::default_path);

    if args.write_config {
        Config::default().save_to(&config_path)?;
        println!("✓ Wrote default config to {}", config_path.display());
        return Ok(());
    }

    let config = Config::load_from(&config_path)?;
    init_logging(&config);

    let mut store = DeckStore::new();
    store.subscribe(|command, state| {
        tracing::trace!(?command, decks = state.decks.len(), "state changed");
    });

    let stdout = io::stdout().lock();
    match args.script {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open script: {:?}", path))?;
            Shell::new(&mut store, &config, stdout).run(BufReader::new(file))?;
        }
        None => {
            let interactive = io::stdin().is_terminal();
            Shell::new(&mut store, &config, stdout)
                .with_prompt(interactive)
                .run(io::stdin().lock())?;
        }
    }

    if let Some(path) = args.export {
        let count = transfer::export_snapshot(&store, &path)?;
        eprintln!("✓ Exported {} decks to {}", count, path.display());
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
