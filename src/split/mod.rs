pub mod cli;
pub mod commands;
mod config;
mod error;
mod ffmpeg;
mod part;
mod pipeline;
mod planner;
mod remux;
mod report;
mod resolve;
mod subdivide;
mod timecode;
mod timeline;

pub use cli::SplitCommands;
pub use commands::handle_split_command;
