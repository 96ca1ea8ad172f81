use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::part::{Boundary, DeclaredPart};
use super::subdivide::{SplitLimits, TailPolicy};
use super::timecode;

/// Top level of a split project file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SplitConfig {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    #[serde(with = "timecode::serde_opt", skip_serializing_if = "Option::is_none")]
    pub max_part_length: Option<Duration>,
    #[serde(alias = "greedy", skip_serializing_if = "Option::is_none")]
    pub latest_part_greedy: Option<f64>,
    pub re_mux_at_first: bool,
    /// Keep going with the next project after one fails.
    pub continue_on_error: bool,
    /// Stream raw ffmpeg output instead of a progress bar.
    pub verbose: bool,
    pub tail_policy: TailPolicy,
    pub projects: Vec<ProjectSpec>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            max_part_length: None,
            latest_part_greedy: None,
            re_mux_at_first: false,
            continue_on_error: false,
            verbose: false,
            tail_policy: TailPolicy::default(),
            projects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub workdir: PathBuf,
    pub files: Vec<String>,
    pub parts: Vec<PartSpec>,
    #[serde(default = "ProjectSpec::default_ffmpeg_args")]
    pub ffmpeg_args: BTreeMap<String, String>,
    #[serde(default = "ProjectSpec::default_output_extension")]
    pub output_extension: String,
}

/// A part as written in the project file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartSpec {
    pub name: String,
    #[serde(default, with = "timecode::serde_opt", skip_serializing_if = "Option::is_none")]
    pub start: Option<Duration>,
    #[serde(default, alias = "startRef", skip_serializing_if = "Option::is_none")]
    pub start_idx: Option<u32>,
    #[serde(default, with = "timecode::serde_opt", skip_serializing_if = "Option::is_none")]
    pub end: Option<Duration>,
    #[serde(default, alias = "endRef", skip_serializing_if = "Option::is_none")]
    pub end_idx: Option<u32>,
}

impl PartSpec {
    pub fn to_declared(&self) -> DeclaredPart {
        let mut part = DeclaredPart::new(self.name.clone());
        if let Some(start) = self.start {
            part = part.starting(Boundary::from_index(start, self.start_idx));
        }
        if let Some(end) = self.end {
            part = part.ending(Boundary::from_index(end, self.end_idx));
        }
        part
    }
}

impl SplitConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading split config from {}", path.display()))?;
        let mut config = Self::from_toml_str(&contents)
            .with_context(|| format!("parsing split config {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for project in &mut config.projects {
            if project.workdir.is_relative() {
                project.workdir = base.join(&project.workdir);
            }
        }
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_part_length.is_some_and(|max| max.is_zero()) {
            bail!("maxPartLength must be greater than zero");
        }
        if let Some(greedy) = self.latest_part_greedy {
            if !greedy.is_finite() || greedy < 0.0 {
                bail!("latestPartGreedy must be a non-negative number, got {greedy}");
            }
        }
        if self.projects.is_empty() {
            bail!("No [[projects]] defined");
        }
        Ok(())
    }

    pub fn limits(&self) -> SplitLimits {
        SplitLimits {
            max_part_length: self.max_part_length,
            greedy: self.latest_part_greedy,
            tail: self.tail_policy,
        }
    }
}

impl ProjectSpec {
    fn default_ffmpeg_args() -> BTreeMap<String, String> {
        BTreeMap::from([("c".to_string(), "copy".to_string())])
    }

    fn default_output_extension() -> String {
        "mp4".to_string()
    }

    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.workdir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.workdir.display().to_string())
    }

    pub fn declared_parts(&self) -> Vec<DeclaredPart> {
        self.parts.iter().map(PartSpec::to_declared).collect()
    }

    pub fn input_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|file| self.workdir.join(file)).collect()
    }

    pub fn output_path(&self, segment_name: &str) -> PathBuf {
        self.workdir
            .join(format!("{segment_name}.{}", self.output_extension))
    }

    /// Structural checks that do not need durations. Run per project so one
    /// broken project does not stop the others from being processed.
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            bail!("project has no files");
        }
        if self.parts.is_empty() {
            bail!("project has no parts");
        }
        let last = self.parts.len() - 1;
        for (idx, part) in self.parts.iter().enumerate() {
            if part.name.trim().is_empty() {
                bail!("part #{} has an empty name", idx + 1);
            }
            if part.end.is_none() && idx != last {
                bail!(
                    "part '{}' has no end time specified; only the last part may omit it",
                    part.name
                );
            }
        }
        Ok(())
    }
}
