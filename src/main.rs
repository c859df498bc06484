//! Strongs-Graph main entry point
//!
//! This is the command-line interface for the Strong's lexicon importer.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use strongs_graph::config::{load_config_with_hash, Config};
use strongs_graph::crawler::import;
use strongs_graph::output::print_result;
use strongs_graph::{normalize_seed, Language, LocalStore, StrongsId};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Strongs-Graph: imports Strong's lexicon entries into a linked note vault
///
/// Starting from one seed entry, Strongs-Graph fetches entry pages, extracts
/// fields, sections and cross-references, and writes one note per entry. It
/// follows cross-references breadth-first within the configured budgets.
#[derive(Parser, Debug)]
#[command(name = "strongs-graph")]
#[command(version = "1.0.0")]
#[command(about = "A Strong's lexicon importer for note vaults", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed entry: an id (G3056), a number with --language, or an entry page URL
    #[arg(value_name = "SEED")]
    seed: String,

    /// Language for a bare numeric seed (greek or hebrew)
    #[arg(short, long)]
    language: Option<Language>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and seed and show what would be imported without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Malformed seeds are rejected before any network activity
    let seed = normalize_seed(&cli.seed, cli.language)
        .with_context(|| format!("Invalid seed '{}'", cli.seed))?;

    if cli.dry_run {
        handle_dry_run(&config, seed);
        return Ok(());
    }

    handle_import(&config, seed).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("strongs_graph=info,warn"),
            1 => EnvFilter::new("strongs_graph=debug,info"),
            2 => EnvFilter::new("strongs_graph=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the plan for a validated config and seed
fn handle_dry_run(config: &Config, seed: StrongsId) {
    let recipe = &config.recipe;
    println!("=== Strongs-Graph Dry Run ===\n");

    println!("Seed: {}", seed);
    println!("Source: {}", config.source.base_url);
    println!("Vault: {}", config.output.vault_path);

    println!("\nRecipe '{}':", recipe.id);
    println!("  Max depth: {}", recipe.max_depth);
    println!("  Max nodes: {}", recipe.max_nodes);
    println!("  Rate limit: {}ms", recipe.rate_limit_ms);
    println!("  Skip existing: {}", recipe.skip_existing);
    println!("  Root folder: {}", recipe.root_folder);
    println!("  Scripture folder: {}", recipe.scripture_root_folder);
    println!("  Title pattern: {}", recipe.note_title_pattern);
    println!(
        "  Term linking: {} (aliases: {:?})",
        recipe.link_greek_hebrew, recipe.lemma_alias_mode
    );

    println!("\nSections ({}):", recipe.include_sections.len());
    for key in recipe.sections() {
        println!("  - {}", key);
    }

    println!("\nFollowed edges:");
    for edge in &recipe.follow_edges {
        println!("  - {:?}", edge);
    }

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start importing from {}", seed);
}

/// Handles the main import operation
async fn handle_import(config: &Config, seed: StrongsId) -> anyhow::Result<()> {
    let store = LocalStore::new(&config.output.vault_path);

    // Stop before the next queue item on Ctrl-C
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current entry");
            on_interrupt.cancel();
        }
    });

    let result = import(config, &store, seed, cancel)
        .await
        .context("Import could not start")?;

    print_result(&result);
    if result.has_errors() {
        tracing::warn!("{} entries failed to import", result.errors.len());
    }
    Ok(())
}
