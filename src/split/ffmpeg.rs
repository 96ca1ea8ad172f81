use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::error::{EncodeError, ProbeError};
use super::timecode::format_ffmpeg_time;

pub trait Prober {
    fn probe(&self, path: &Path) -> Result<Duration, ProbeError>;
}

pub trait Encoder {
    fn encode(&self, job: &EncodeJob) -> Result<(), EncodeError>;
}

#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: String,
}

impl FfprobeProber {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Prober for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<Duration, ProbeError> {
        if !path.exists() {
            return Err(ProbeError::Missing(path.to_path_buf()));
        }

        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .map_err(|source| ProbeError::Spawn {
                program: self.program.clone(),
                path: path.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                program: self.program.clone(),
                path: path.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
        parse_duration_seconds(&raw).ok_or_else(|| ProbeError::InvalidDuration {
            path: path.to_path_buf(),
            raw,
        })
    }
}

fn parse_duration_seconds(raw: &str) -> Option<Duration> {
    let seconds: f64 = raw.lines().next()?.trim().parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

/// One output file of an encode job. `start`/`end` are absolute offsets on the
/// (possibly concatenated) input.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    pub path: PathBuf,
    pub start: Option<Duration>,
    pub end: Option<Duration>,
    pub extra_args: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<OutputSpec>,
    /// Feed the inputs through the concat demuxer instead of reading the first.
    pub concatenate: bool,
}

impl EncodeJob {
    pub fn new(inputs: Vec<PathBuf>, outputs: Vec<OutputSpec>) -> Self {
        let concatenate = inputs.len() > 1;
        Self {
            inputs,
            outputs,
            concatenate,
        }
    }

    fn describe(&self) -> String {
        self.outputs
            .iter()
            .map(|output| output.path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn expected_duration(&self) -> Option<Duration> {
        self.outputs
            .iter()
            .map(|output| match (output.start, output.end) {
                (start, Some(end)) => Some(end.saturating_sub(start.unwrap_or_default())),
                _ => None,
            })
            .sum()
    }

    pub fn args(&self) -> Result<Vec<String>, EncodeError> {
        let Some(first) = self.inputs.first() else {
            return Err(EncodeError::NoInputs(self.describe()));
        };

        let mut args: Vec<String> = vec!["-y".into(), "-hide_banner".into()];
        if self.concatenate {
            args.extend(
                [
                    "-protocol_whitelist",
                    "file,pipe",
                    "-auto_convert",
                    "0",
                    "-f",
                    "concat",
                    "-safe",
                    "0",
                    "-i",
                    "-",
                ]
                .map(String::from),
            );
        } else {
            args.push("-i".into());
            args.push(first.to_string_lossy().into_owned());
        }

        for output in &self.outputs {
            if let Some(start) = output.start {
                args.push("-ss".into());
                args.push(format_ffmpeg_time(start));
            }
            if let Some(end) = output.end {
                args.push("-to".into());
                args.push(format_ffmpeg_time(end));
            }
            for (key, value) in &output.extra_args {
                args.push(format!("-{}", key.replace('-', "_")));
                if !value.is_empty() {
                    args.push(value.clone());
                }
            }
            args.push(output.path.to_string_lossy().into_owned());
        }

        Ok(args)
    }

    /// Concat demuxer script listing every input.
    pub fn concat_list(&self) -> String {
        self.inputs
            .iter()
            .map(|input| {
                let escaped = input.to_string_lossy().replace('\'', r"'\''");
                format!("file 'file:{escaped}'\n")
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Echo ffmpeg's own output instead of drawing a progress bar.
    pub verbose: bool,
    pub progress: bool,
}

#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: String,
    options: EncodeOptions,
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<String>, options: EncodeOptions) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }

    fn progress_bar(&self, job: &EncodeJob) -> Option<ProgressBar> {
        if self.options.verbose || !self.options.progress {
            return None;
        }
        let duration = job.expected_duration()?;
        let pb = ProgressBar::new(duration.as_millis() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(job.describe());
        Some(pb)
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, job: &EncodeJob) -> Result<(), EncodeError> {
        let args = job.args()?;
        let spawn_error = |source: std::io::Error| EncodeError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(if job.concatenate {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // Feed and drain before surfacing either error so the child is always
        // reaped.
        let fed = match child.stdin.take() {
            Some(mut stdin) if job.concatenate => stdin.write_all(job.concat_list().as_bytes()),
            _ => Ok(()),
        };

        let pb = self.progress_bar(job);
        let mut summary = StderrSummary::default();
        let drained = match child.stderr.take() {
            Some(stderr) => read_ffmpeg_stderr(stderr, self.options.verbose, pb.as_ref(), &mut summary),
            None => Ok(()),
        };

        let status = child.wait().map_err(|source| EncodeError::Wait {
            program: self.program.clone(),
            source,
        })?;
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        if !status.success() {
            return Err(EncodeError::Failed {
                program: self.program.clone(),
                code: status.code(),
                output: job.describe(),
                message: summary.message(),
            });
        }
        fed.map_err(|source| EncodeError::ConcatInput {
            program: self.program.clone(),
            source,
        })?;
        drained.map_err(|source| EncodeError::ReadOutput {
            program: self.program.clone(),
            source,
        })?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct StderrSummary {
    last_line: String,
    error_lines: Vec<String>,
}

impl StderrSummary {
    fn message(&self) -> String {
        if self.error_lines.is_empty() {
            self.last_line.trim().to_string()
        } else {
            self.error_lines.join("\n").trim().to_string()
        }
    }
}

fn read_ffmpeg_stderr<R: Read>(
    mut stderr: R,
    verbose: bool,
    pb: Option<&ProgressBar>,
    summary: &mut StderrSummary,
) -> std::io::Result<()> {
    let mut buffer = [0u8; 4096];
    let mut accumulated = String::new();

    loop {
        let bytes_read = stderr.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        accumulated.push_str(&String::from_utf8_lossy(&buffer[..bytes_read]));

        // ffmpeg rewrites its status line with \r, so split on both.
        while let Some(pos) = accumulated.find(['\r', '\n']) {
            let line = accumulated[..pos].to_string();
            accumulated.drain(..=pos);
            if line.is_empty() {
                continue;
            }

            if verbose {
                eprintln!("{}", line);
            }
            if line.to_ascii_lowercase().contains("error") {
                summary.error_lines.push(line.clone());
            }
            if let (Some(pb), Some(position)) = (pb, parse_ffmpeg_progress(&line)) {
                pb.set_position(position.as_millis() as u64);
            }
            summary.last_line = line;
        }
    }

    Ok(())
}

fn parse_ffmpeg_progress(line: &str) -> Option<Duration> {
    let time_start = line.find("time=")?;
    let rest = &line[time_start + 5..];
    let value = rest.split_whitespace().next()?;

    let mut parts = value.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Duration::try_from_secs_f64(hours * 3600.0 + minutes * 60.0 + seconds).ok()
}
