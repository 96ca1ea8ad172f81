use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::ui::prelude::{Level, emit};

use super::ffmpeg::{EncodeJob, Encoder, OutputSpec};

/// Stable file name for the concatenation of `inputs`, so reruns reuse it.
pub fn remux_file_name(inputs: &[PathBuf]) -> String {
    let joined = inputs
        .iter()
        .map(|input| input.to_string_lossy())
        .collect::<Vec<_>>()
        .join("\n");
    let digest = Sha256::digest(joined.as_bytes());
    format!("{:x}.mp4", digest)
}

/// Stream-copy every input into one file inside `workdir`.
pub fn remux_inputs(workdir: &Path, inputs: &[PathBuf], encoder: &dyn Encoder) -> Result<PathBuf> {
    let target = workdir.join(remux_file_name(inputs));
    if target.is_file() {
        emit(
            Level::Info,
            "split.remux.reuse",
            &format!("Reusing re-muxed input {}", target.display()),
            None,
        );
        return Ok(target);
    }

    emit(
        Level::Info,
        "split.remux",
        &format!("Re-muxing {} input(s) into {}", inputs.len(), target.display()),
        None,
    );
    let job = EncodeJob {
        inputs: inputs.to_vec(),
        outputs: vec![OutputSpec {
            path: target.clone(),
            start: None,
            end: None,
            extra_args: BTreeMap::from([("c".to_string(), "copy".to_string())]),
        }],
        concatenate: true,
    };
    encoder
        .encode(&job)
        .with_context(|| format!("Failed to re-mux inputs into {}", target.display()))?;
    Ok(target)
}

pub fn remove_remuxed(path: &Path) -> Result<()> {
    fs::remove_file(path)
        .with_context(|| format!("Failed to remove re-muxed input {}", path.display()))
}
