// CLI-specific lint overrides
#![allow(clippy::print_stdout, reason = "CLI tools print to stdout")]
#![allow(clippy::print_stderr, reason = "CLI tools print to stderr")]
#![allow(clippy::unwrap_used, reason = "CLI can unwrap for user-facing errors")]
#![allow(clippy::expect_used, reason = "CLI can expect for user-facing errors")]

mod abi_dir;
mod address_book;
mod chain_info;
mod cli;
mod config;
mod output;
mod terminal;

use abi_dir::AbiDir;
use address_book::FileAddressBook;
use chain_info::ChainList;
use clap::Parser;
use cli::Cli;
use color_eyre::eyre::{bail, Result, WrapErr};
use config::{ConfigFile, Home};
use output::{ConfigSummary, SessionSummary};
use solizard::{HttpClient, HttpConnection, InterfaceRegistry, LegacySigner, Session, SessionContext};
use terminal::{confirm_prompt, Console};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status after Ctrl+C
const INTERRUPTED: i32 = 130;

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let home = Home::new(cli.home.clone().unwrap_or_else(Home::default_root));
    home.ensure()?;
    debug!(home = %home.root().display(), "Using home directory");

    // Bundled ABIs only go into the home directory, never into a user-supplied one
    let abis = match &cli.abi_dir {
        Some(dir) => AbiDir::new(dir),
        None => {
            let abis = AbiDir::new(home.abi_dir());
            abis.seed()?;
            abis
        }
    };
    let registry = InterfaceRegistry::load(&abis)
        .wrap_err_with(|| format!("Failed to load ABIs from {}", abis.path().display()))?;
    if registry.is_empty() {
        bail!("No ABI files found in {}", abis.path().display());
    }
    info!(interfaces = registry.len(), "Loaded ABIs");

    let chains = ChainList::load_or_seed(home.chains_path())?;
    debug!(chains = chains.len(), "Loaded chain list");

    let config_path = home.config_path();
    let config = ConfigFile::load_or_default(&config_path)?;

    let mut context: SessionContext<HttpConnection> = SessionContext::new();
    let mut surface = Console::new(cli.json);
    if !cli.no_config {
        if config.has_session_values() {
            ConfigSummary::from_config(&config, &chains).print(cli.json);
            if confirm_prompt("Apply config?", true) {
                context = SessionContext::from_settings(&config.to_settings());
            }
        }
        surface = surface.persist_to(config_path, config.clone());
    }

    let book = FileAddressBook::load(home.address_book_path())
        .wrap_err("Failed to load the address book")?;
    debug!(
        path = %book.path().display(),
        entries = book.entries().len(),
        "Loaded address book"
    );
    let wait_time = config.wait_time();

    // Prompts block, so the session runs on its own thread and Ctrl+C is watched here
    let handle = tokio::runtime::Handle::current();
    let session = tokio::task::spawn_blocking(move || {
        handle.block_on(async move {
            Session::new(&registry, surface, HttpClient, LegacySigner)
                .with_context(context)
                .with_address_book(book)
                .with_wait_time(wait_time)
                .run()
                .await
        })
    });

    let exit = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!(error = %e, "Failed to wait for Ctrl+C");
            }
            let _ = console::Term::stderr().show_cursor();
            eprintln!();
            eprintln!("Interrupted");
            std::process::exit(INTERRUPTED);
        }
        joined = session => joined.wrap_err("Session task failed")??,
    };

    SessionSummary {
        executions: exit.executions,
    }
    .print(cli.json);

    Ok(())
}
