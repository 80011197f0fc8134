use clap::Parser;
use std::path::PathBuf;

use crate::commands::WbsCommands;
use crate::shared::file_config::CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(name = "wbs-tracker")]
#[command(version)]
#[command(about = "Track construction schedules: WBS import, weighted progress and S-curves")]
pub struct Cli {
    #[command(subcommand)]
    pub command: WbsCommands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,
}
