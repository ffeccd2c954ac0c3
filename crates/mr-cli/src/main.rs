//! CLI entry point for the meta-react code generator.
//!
//! `meta-react` keeps the generated regions of annotated component sources in
//! sync with their `[ReactProp]` / `[ReactState]` declarations.
//!
//! # Usage
//!
//! ```bash
//! meta-react [OPTIONS] <COMMAND>
//!
//! # Regenerate every annotated file in ./scenes once
//! meta-react check --path ./scenes
//!
//! # Fail (for CI) if any generated region is out of date
//! meta-react check --dry-run
//!
//! # Regenerate, then keep regenerating on every save until Ctrl-C
//! meta-react watch --path ./scenes
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use mr_core::Config;
use mr_scanner::{BatchDriver, BatchReport, FileRewriter, StatsSnapshot};
use mr_watcher::{
    CoalescingWorker, CompositeFilter, ExtensionFilter, FileWatcher, ScratchFileFilter,
};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Regenerates the boilerplate regions of annotated component sources.
#[derive(Parser)]
#[command(name = "meta-react", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the annotated sources.
    ///
    /// Overrides `root_path` from the configuration file. Defaults to `.`.
    #[arg(short, long, global = true, env = "META_REACT_PATH")]
    path: Option<Utf8PathBuf>,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "META_REACT_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run one batch pass over the root directory and print a summary.
    Check {
        /// Report stale files without writing them; fail if any are found.
        #[arg(long)]
        dry_run: bool,

        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a batch pass, then regenerate files as they are saved.
    Watch {
        /// Keep running when stdin is closed.
        #[arg(long)]
        ignore_stdin: bool,
    },
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},mio=warn,notify=warn"))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the optional configuration file and CLI flags.
///
/// Precedence for the root directory: `--path` / `META_REACT_PATH`, then the
/// file's `root_path`, then `.`.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            debug!(path = %path, "Loading configuration");
            Config::load(path)?
        }
        None => Config::default(),
    };

    if let Some(path) = &cli.path {
        config.root_path.clone_from(path);
    } else if config.root_path.as_str().is_empty() {
        config.root_path = Utf8PathBuf::from(".");
    }

    config.validate()?;
    config.validate_root()?;

    Ok(config)
}

/// Runs the batch pass on the blocking pool.
async fn run_batch(root: &Utf8Path, rewriter: FileRewriter) -> color_eyre::Result<BatchReport> {
    let driver = BatchDriver::new(root, rewriter)?;
    let report = tokio::task::spawn_blocking(move || driver.run()).await?;
    Ok(report)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs one batch pass and prints a summary.
///
/// Fails if any file could not be validated, or, in dry-run mode, if any file
/// has stale generated regions.
async fn run_check(config: &Config, dry_run: bool, json: bool) -> color_eyre::Result<()> {
    info!(root = %config.root_path, dry_run, "Starting check");

    let rewriter = FileRewriter::new(config.protocol.clone()).with_dry_run(dry_run);
    let report = run_batch(&config.root_path, rewriter).await?;

    if json {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, &report.stats)?;
        writeln!(handle)?;
    } else {
        print_stats_summary(&report.stats);
    }

    if !report.stale.is_empty() {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        writeln!(handle)?;
        writeln!(handle, "Stale ({}):", report.stale.len())?;
        for path in &report.stale {
            writeln!(handle, "  {path}")?;
        }
    }

    if !report.errors.is_empty() {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        writeln!(handle)?;
        writeln!(handle, "Errors ({}):", report.errors.len())?;
        for error in &report.errors {
            writeln!(handle, "  {error}")?;
        }
    }

    match (report.errors.len(), report.stale.len()) {
        (0, 0) => Ok(()),
        (0, stale) => Err(eyre!("{stale} file(s) have stale generated regions")),
        (failed, _) => Err(eyre!("{failed} file(s) failed validation")),
    }
}

/// Runs the batch pass, then watches the root until a shutdown request.
///
/// Shutdown order: stop the watcher, stop the worker, wait for both, report.
async fn run_watch(config: &Config, ignore_stdin: bool) -> color_eyre::Result<()> {
    info!(root = %config.root_path, "Starting watch");

    let rewriter = FileRewriter::new(config.protocol.clone());
    let report = run_batch(&config.root_path, rewriter.clone()).await?;
    info!(summary = %report.stats, "Initial batch pass done");

    let handler_rewriter = rewriter.clone();
    let revalidate = move |path: &Utf8Path| -> anyhow::Result<()> {
        let outcome = handler_rewriter.validate(path)?;
        debug!(path = %path, outcome = %outcome, "Revalidated");
        Ok(())
    };
    let worker = CoalescingWorker::spawn(&config.worker, revalidate)?;

    let filter = CompositeFilter::new()
        .and(ExtensionFilter::for_protocol(&config.protocol))
        .and(ScratchFileFilter);
    let mut watcher = FileWatcher::new(&config.root_path, &config.watch, filter).await?;

    let shutdown = shutdown_signal(ignore_stdin);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = watcher.recv() => {
                let Some(event) = event else {
                    warn!("Watcher stopped unexpectedly");
                    break;
                };
                if worker.enqueue(event.path) {
                    debug!("Queued modified file");
                }
            }
            reason = &mut shutdown => {
                let reason = reason?;
                info!(reason, "Shutting down");
                break;
            }
        }
    }

    watcher.shutdown().await?;
    let handle = tokio::task::spawn_blocking(move || worker.shutdown());
    handle.await??;

    let stats = rewriter.stats().snapshot();
    if stats.is_clean() {
        info!(summary = %stats, "Stopped");
    } else {
        warn!(summary = %stats, "Stopped with failed files");
    }
    print_stats_summary(&stats);

    Ok(())
}

/// Resolves on Ctrl-C, SIGTERM (unix) or stdin EOF, with a short reason.
async fn shutdown_signal(ignore_stdin: bool) -> color_eyre::Result<&'static str> {
    let stdin_rx = (!ignore_stdin).then(stdin_eof);
    // `false` disables the branch: stdin is ignored or could not be read.
    let stdin_closed = async move {
        match stdin_rx {
            Some(rx) => rx.await.is_ok(),
            None => std::future::pending().await,
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                Ok("interrupt")
            }
            _ = sigterm.recv() => Ok("SIGTERM"),
            true = stdin_closed => Ok("stdin closed"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                Ok("interrupt")
            }
            true = stdin_closed => Ok("stdin closed"),
        }
    }
}

/// Signals once stdin reaches end of file.
///
/// The read runs on a detached thread: a pending blocking read would keep the
/// tokio blocking pool from shutting down.
fn stdin_eof() -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();

    let spawned = std::thread::Builder::new()
        .name("mr-stdin".to_owned())
        .spawn(move || {
            let _ = std::io::copy(&mut std::io::stdin().lock(), &mut std::io::sink());
            let _ = tx.send(());
        });

    if let Err(e) = spawned {
        warn!(error = %e, "Cannot watch stdin; use Ctrl-C to stop");
    }

    rx
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints a summary of validation statistics.
fn print_stats_summary(stats: &StatsSnapshot) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let _ = writeln!(handle);
    let _ = writeln!(handle, "Validation Summary");
    let _ = writeln!(handle, "==================");
    let _ = writeln!(handle);
    let _ = writeln!(handle, "Files validated:  {}", stats.total);
    let _ = writeln!(handle, "  Annotated:      {}", stats.annotated());
    let _ = writeln!(handle, "  Rewritten:      {}", stats.rewritten);
    let _ = writeln!(handle, "  Up to date:     {}", stats.unchanged);
    let _ = writeln!(handle, "  Stale:          {}", stats.stale);
    let _ = writeln!(handle, "  Not annotated:  {}", stats.skipped);
    let _ = writeln!(handle, "  Failed:         {}", stats.failed);
    let _ = writeln!(handle, "Advisories:       {}", stats.advisories);
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // color-eyre goes first so it sees any later panic.
    color_eyre::install()?;

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.no_color);

    let config = build_config(&cli)?;

    match cli.command {
        Commands::Check { dry_run, json } => run_check(&config, dry_run, json).await,
        Commands::Watch { ignore_stdin } => run_watch(&config, ignore_stdin).await,
    }
}
