mod split;
mod ui;

use clap::Parser;

use crate::split::SplitCommands;
use crate::ui::prelude::{Level, OutputFormat, emit};

/// Split recordings into named parts with ffmpeg
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Activate debug mode (prints probe results and ffmpeg arguments)
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format for messages and reports
    #[arg(long, value_enum, default_value = "text", global = true)]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: SplitCommands,
}

fn main() {
    let cli = Cli::parse();
    ui::init(cli.output, !cli.no_color);

    if let Err(err) = split::handle_split_command(cli.command, cli.debug) {
        emit(Level::Error, "vidsplit.error", &format!("Error: {err:#}"), None);
        std::process::exit(1);
    }
}
