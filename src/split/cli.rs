use clap::{Args, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone)]
pub enum SplitCommands {
    /// Probe the sources, plan the parts and write one file per segment
    Run(RunArgs),
    /// Validate a project file and report missing inputs
    Check(CheckArgs),
    /// Plan against durations given on the command line (no ffprobe, no files)
    Plan(PlanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Project file (TOML)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Only show the planned segments, do not run ffmpeg
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Continue with the next project when one fails
    #[arg(long)]
    pub keep_going: bool,

    /// Only process projects with this name (repeatable)
    #[arg(short, long = "project", value_name = "NAME")]
    pub projects: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Project file (TOML)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Also probe durations and run the planner
    #[arg(long)]
    pub probe: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Project file (TOML)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Duration of each source file in order, as [H:]M:S[.ms]
    #[arg(short = 't', long = "duration", value_name = "TIME", required = true)]
    pub durations: Vec<String>,

    /// Project to plan; defaults to the first one
    #[arg(short, long, value_name = "NAME")]
    pub project: Option<String>,
}
