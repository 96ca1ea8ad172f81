use std::path::PathBuf;

use thiserror::Error;

/// Failures of the segmentation planner. Every variant aborts the project.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("Part '{part}' has no end time specified; only the last part may omit it")]
    MissingEnd { part: String },

    #[error("Part '{part}' is placed after video {video} but the project only has {videos} video(s)")]
    VideoOutOfRange {
        part: String,
        video: usize,
        videos: usize,
    },

    #[error("Part '{part}' is defined incorrectly: length is {seconds}s, it must be greater than 0s")]
    NonPositiveLength { part: String, seconds: f64 },
}

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Source video {} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("Failed to run {program} for {}: {source}", path.display())]
    Spawn {
        program: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed for {}: {stderr}", path.display())]
    Failed {
        program: String,
        path: PathBuf,
        stderr: String,
    },

    #[error("Unable to parse duration '{raw}' reported for {}", path.display())]
    InvalidDuration { path: PathBuf, raw: String },
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to feed the concat list to {program}: {source}")]
    ConcatInput {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read the output of {program}: {source}")]
    ReadOutput {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?} while writing {output}: {message}")]
    Failed {
        program: String,
        code: Option<i32>,
        output: String,
        message: String,
    },

    #[error("Encode job for {0} has no input files")]
    NoInputs(String),
}
