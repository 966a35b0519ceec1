use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(name = "solizard")]
#[command(version)]
#[command(
    about = "Interactively call and transact with EVM contracts from their ABI files",
    long_about = None
)]
pub struct Cli {
    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding config.toml, contract_infos.json and abis/
    #[arg(long, env = "SOLIZARD_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Read ABI files from this directory instead of <home>/abis
    #[arg(long, value_name = "DIR")]
    pub abi_dir: Option<PathBuf>,

    /// Ignore config.toml and ask for everything
    #[arg(long)]
    pub no_config: bool,
}
