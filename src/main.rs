use clap::Parser;

use wbs_tracker::cli::Cli;
use wbs_tracker::commands;
use wbs_tracker::shared::file_config::FileConfig;
use wbs_tracker::shared::logging;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = FileConfig::load_from_path(&cli.config).and_then(|file_config| {
        if !file_config.ui.color {
            crossterm::style::force_color_output(false);
        }
        commands::execute(cli.command, &file_config)
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
