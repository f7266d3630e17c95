//! SiteBlock CLI
//!
//! CLI tool for managing a blocked-site list and the rules derived from it.

mod rules;
mod state;

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sb_compiler::builder::DEFAULT_REDIRECT_PATH;
use sb_compiler::{build_update, parse_pattern_list, SyncConfig, Synchronizer};
use sb_core::protocol::Message;
use sb_core::store::{AddOutcome, DefaultList, PatternStore};
use sb_core::{is_url_blocked, pattern_for_url};

use crate::rules::FileRuleHost;
use crate::state::FileBackend;

#[derive(Parser)]
#[command(name = "sb-cli")]
#[command(about = "SiteBlock blocked-site list and rule tools")]
struct Cli {
    /// Pattern store file
    #[arg(long, global = true, default_value = "siteblock.json")]
    state: PathBuf,

    /// Rule table file the rules are installed into
    #[arg(long, global = true, default_value = "dynamic_rules.json")]
    rules: PathBuf,

    /// Extension ID excluded from initiator matching
    #[arg(long, global = true, default_value = "siteblock-cli")]
    extension_id: String,

    /// Blocked page path inside the extension
    #[arg(long, global = true, default_value = DEFAULT_REDIRECT_PATH)]
    redirect_path: String,

    /// Default list ({"blocked": [...]}) used when the store is empty
    #[arg(long, global = true)]
    defaults: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the blocked-site list
    List,

    /// Block a pattern (e.g. *.example.com)
    Add {
        pattern: String,

        /// Only update the list, leave the rules alone
        #[arg(long)]
        no_sync: bool,
    },

    /// Block every page on the host of a URL
    AddUrl {
        url: String,

        #[arg(long)]
        no_sync: bool,
    },

    /// Unblock the pattern at an index shown by `list`
    Remove {
        index: usize,

        #[arg(long)]
        no_sync: bool,
    },

    /// Add every pattern from a text file, one per line
    Import {
        input: PathBuf,

        #[arg(long)]
        no_sync: bool,
    },

    /// Print the rule update for the current list
    Rules {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Install rules for the current list into the rule file
    Sync,

    /// Check whether a URL would be sent to the blocked page
    Check { url: String },

    /// Answer one protocol message read from stdin
    Handle,
}

struct Context {
    state: PathBuf,
    rules: PathBuf,
    defaults: Option<PathBuf>,
    config: SyncConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context {
        state: cli.state,
        rules: cli.rules,
        defaults: cli.defaults,
        config: SyncConfig::new(cli.extension_id).with_redirect_path(cli.redirect_path),
    };

    let result = match cli.command {
        Commands::List => cmd_list(&ctx).await,
        Commands::Add { pattern, no_sync } => cmd_add(&ctx, &pattern, !no_sync).await,
        Commands::AddUrl { url, no_sync } => cmd_add_url(&ctx, &url, !no_sync).await,
        Commands::Remove { index, no_sync } => cmd_remove(&ctx, index, !no_sync).await,
        Commands::Import { input, no_sync } => cmd_import(&ctx, &input, !no_sync).await,
        Commands::Rules { output } => cmd_rules(&ctx, output.as_deref()).await,
        Commands::Sync => cmd_sync(&ctx).await,
        Commands::Check { url } => cmd_check(&ctx, &url).await,
        Commands::Handle => cmd_handle(&ctx).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Open the pattern store. A first run seeds the defaults and installs
/// their rules, so the rule file never lags behind the list.
async fn open_store(ctx: &Context) -> Result<PatternStore<FileBackend>, String> {
    let defaults = match &ctx.defaults {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
            DefaultList::from_json(&text)
        }
        None => DefaultList::bundled(),
    }
    .map_err(|e| e.to_string())?;

    let store = PatternStore::load(FileBackend::new(&ctx.state), defaults).map_err(|e| e.to_string())?;
    if store.seeded() {
        let installed = sync_rules(ctx, store.patterns()).await?;
        log::info!("Installed {} rule(s) for the default list", installed);
    }
    Ok(store)
}

async fn sync_rules(ctx: &Context, patterns: &[String]) -> Result<usize, String> {
    let mut synchronizer = Synchronizer::new(FileRuleHost::new(&ctx.rules), ctx.config.clone());
    synchronizer
        .synchronize(patterns)
        .await
        .map_err(|e| format!("Pattern list saved but rule update failed: {}", e))
}

/// Sync after a mutation, if it changed anything and syncing is wanted.
async fn after_mutation(ctx: &Context, patterns: &[String], changed: bool, sync: bool) -> Result<(), String> {
    if changed && sync {
        let installed = sync_rules(ctx, patterns).await?;
        println!("Installed {} rule(s) into '{}'", installed, ctx.rules.display());
    }
    Ok(())
}

fn print_outcome(pattern: &str, outcome: AddOutcome) {
    match outcome {
        AddOutcome::Added => println!("Blocked '{}'", pattern),
        AddOutcome::Duplicate => println!("'{}' is already blocked", pattern),
        AddOutcome::Empty => println!("Nothing to add"),
    }
}

async fn cmd_list(ctx: &Context) -> Result<(), String> {
    let store = open_store(ctx).await?;
    if store.is_empty() {
        println!("No blocked sites");
        return Ok(());
    }
    for (index, pattern) in store.patterns().iter().enumerate() {
        println!("  [{}] {}", index, pattern);
    }
    Ok(())
}

async fn cmd_add(ctx: &Context, pattern: &str, sync: bool) -> Result<(), String> {
    let mut store = open_store(ctx).await?;
    let outcome = store.add(pattern).map_err(|e| e.to_string())?;
    print_outcome(pattern.trim(), outcome);
    after_mutation(ctx, store.patterns(), outcome.changed(), sync).await
}

async fn cmd_add_url(ctx: &Context, url: &str, sync: bool) -> Result<(), String> {
    let pattern = pattern_for_url(url).ok_or_else(|| format!("Invalid URL '{}'", url))?;
    cmd_add(ctx, &pattern, sync).await
}

async fn cmd_remove(ctx: &Context, index: usize, sync: bool) -> Result<(), String> {
    let mut store = open_store(ctx).await?;
    let removed = store.remove(index).map_err(|e| e.to_string())?;
    println!("Unblocked '{}'", removed);
    after_mutation(ctx, store.patterns(), true, sync).await
}

async fn cmd_import(ctx: &Context, input: &std::path::Path, sync: bool) -> Result<(), String> {
    let text = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input.display(), e))?;
    let patterns = parse_pattern_list(&text);

    let mut store = open_store(ctx).await?;
    let mut added = 0usize;
    for pattern in &patterns {
        if store.add(pattern).map_err(|e| e.to_string())?.changed() {
            added += 1;
        }
    }

    println!(
        "Imported {} of {} pattern(s) from '{}' ({} already blocked)",
        added,
        patterns.len(),
        input.display(),
        patterns.len() - added
    );
    after_mutation(ctx, store.patterns(), added > 0, sync).await
}

async fn cmd_rules(ctx: &Context, output: Option<&std::path::Path>) -> Result<(), String> {
    let store = open_store(ctx).await?;
    let update = build_update(store.patterns(), &ctx.config).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&update).map_err(|e| e.to_string())?;

    match output {
        Some(path) => {
            state::write_atomic(path, json.as_bytes())
                .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
            println!("Wrote {} rule(s) to '{}'", update.add_rules.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn cmd_sync(ctx: &Context) -> Result<(), String> {
    let store = open_store(ctx).await?;
    let installed = sync_rules(ctx, store.patterns()).await?;
    println!("Installed {} rule(s) into '{}'", installed, ctx.rules.display());
    Ok(())
}

async fn cmd_check(ctx: &Context, url: &str) -> Result<(), String> {
    let store = open_store(ctx).await?;
    if is_url_blocked(url, store.patterns()) {
        println!("Blocked: '{}' redirects to {}", url, ctx.config.redirect_path);
    } else {
        println!("Allowed: '{}'", url);
    }
    Ok(())
}

async fn cmd_handle(ctx: &Context) -> Result<(), String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| format!("Failed to read stdin: {}", e))?;

    let response = match Message::parse(&input) {
        Ok(message) => {
            let mut synchronizer = Synchronizer::new(FileRuleHost::new(&ctx.rules), ctx.config.clone());
            synchronizer.handle(message).await
        }
        Err(response) => response,
    };

    println!("{}", response.to_json());
    Ok(())
}
