//! Watcher CLI for a remote archive listing.
//!
//! Usage: mirror-watcher <COMMAND>
//!
//! Commands:
//!   dump   Print the inventory recorded in the stored snapshot
//!   diff   Compare the stored snapshot against the live listing
//!   get    Download changed files and commit the fresh listing
//!   init   Fetch the listing and store it as the first snapshot

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use mirror_engine::{
    FetchSettings, GetOutcome, ReqwestFetcher, WatchError, WatchEvent, WatchSettings, WatchSink,
    Watcher,
};

/// Watch a remote directory listing and mirror changed files.
#[derive(Parser, Debug)]
#[command(name = "mirror-watcher")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every file recorded in the stored snapshot
    Dump,
    /// Print one line per difference between the snapshot and the live
    /// listing, without touching any state
    Diff {
        /// Base URL of the listing page
        url: String,
    },
    /// Download new and modified files into a timestamped batch directory,
    /// then commit the fresh listing as the new snapshot
    Get {
        /// Base URL of the listing page
        url: String,
    },
    /// Store the current listing as the first snapshot, downloading nothing
    Init {
        /// Base URL of the listing page
        url: String,
    },
}

/// Prints progress on stdout as the engine works through a `get` run.
struct StdoutSink;

impl WatchSink for StdoutSink {
    fn emit(&self, event: WatchEvent) {
        match event {
            WatchEvent::Changed(infos) => {
                println!("Changed files:");
                for info in &infos {
                    println!("{info:?}");
                }
            }
            WatchEvent::Downloading { url } => println!("Downloading {url}"),
        }
    }
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                // --help and --version are not usage errors.
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };
    watch_logging::initialize_cli(level_for(cli.verbose));

    let watcher = Watcher::new(
        ReqwestFetcher::new(FetchSettings::default()),
        WatchSettings::default(),
    );

    let result = match &cli.command {
        Commands::Dump => run_dump(&watcher),
        Commands::Diff { url } => run_diff(&watcher, url).await,
        Commands::Get { url } => run_get(&watcher, url).await,
        Commands::Init { url } => run_init(&watcher, url).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(WatchError::NoState) => {
            eprintln!("ERROR: No state available");
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::from(1)
        }
    }
}

fn run_dump(watcher: &Watcher<ReqwestFetcher>) -> Result<(), WatchError> {
    for info in watcher.dump()? {
        println!("{info:?}");
    }
    Ok(())
}

async fn run_diff(watcher: &Watcher<ReqwestFetcher>, url: &str) -> Result<(), WatchError> {
    for entry in watcher.diff(url).await? {
        println!("{} {}", entry.change.code(), entry.name);
    }
    Ok(())
}

async fn run_get(watcher: &Watcher<ReqwestFetcher>, url: &str) -> Result<(), WatchError> {
    match watcher.get(url, &StdoutSink).await? {
        // Nothing changed: no output at all.
        GetOutcome::Unchanged => {}
        GetOutcome::Applied(batch) => {
            log::info!(
                "applied {} downloads in {:?}",
                batch.downloaded.len(),
                batch.batch_dir
            );
        }
    }
    Ok(())
}

async fn run_init(watcher: &Watcher<ReqwestFetcher>, url: &str) -> Result<(), WatchError> {
    let count = watcher.init(url).await?;
    println!("Stored listing with {count} files");
    Ok(())
}
