use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::ui::prelude::{Level, emit};

use super::config::{ProjectSpec, SplitConfig};
use super::ffmpeg::{EncodeJob, Encoder, OutputSpec, Prober};
use super::part::{Segment, SourceVideo};
use super::planner::plan_segments;
use super::remux::{remove_remuxed, remux_inputs};
use super::report::emit_segment_report;
use super::timeline::Timeline;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub debug: bool,
    pub continue_on_error: bool,
}

#[derive(Debug, Clone)]
pub struct ProjectOutcome {
    pub name: String,
    pub segments: Vec<Segment>,
    pub written: Vec<PathBuf>,
}

pub struct ProjectRunner<'a> {
    config: &'a SplitConfig,
    prober: &'a dyn Prober,
    encoder: &'a dyn Encoder,
    options: RunOptions,
}

impl<'a> ProjectRunner<'a> {
    pub fn new(
        config: &'a SplitConfig,
        prober: &'a dyn Prober,
        encoder: &'a dyn Encoder,
        options: RunOptions,
    ) -> Self {
        Self {
            config,
            prober,
            encoder,
            options,
        }
    }

    fn debug(&self, code: &str, message: impl AsRef<str>) {
        if self.options.debug {
            emit(Level::Debug, code, message.as_ref(), None);
        }
    }

    pub fn probe_videos(&self, inputs: &[PathBuf]) -> Result<Vec<SourceVideo>> {
        inputs
            .iter()
            .map(|path| -> Result<SourceVideo> {
                let duration = self.prober.probe(path)?;
                self.debug(
                    "split.probe",
                    format!("{} lasts {:.3}s", path.display(), duration.as_secs_f64()),
                );
                Ok(SourceVideo::new(path.to_string_lossy(), duration))
            })
            .collect()
    }

    /// Probe, plan, report and encode one project.
    pub fn run_project(&self, project: &ProjectSpec) -> Result<ProjectOutcome> {
        let name = project.display_name();
        project.validate()?;

        let mut inputs = project.input_paths();
        let mut videos = self.probe_videos(&inputs)?;

        let remuxed = if self.config.re_mux_at_first && !self.options.dry_run {
            let path = remux_inputs(&project.workdir, &inputs, self.encoder)?;
            videos = self.probe_videos(std::slice::from_ref(&path))?;
            inputs = vec![path.clone()];
            Some(path)
        } else {
            None
        };

        let timeline = Timeline::from_videos(&videos);
        self.debug(
            "split.plan.timeline",
            videos
                .iter()
                .zip(timeline.ends())
                .map(|(video, end)| format!("{} ends at {:.3}s", video.identifier, end.as_secs_f64()))
                .collect::<Vec<_>>()
                .join("; "),
        );

        let segments = plan_segments(&project.declared_parts(), &videos, &self.config.limits())
            .with_context(|| format!("Failed to plan segments for {name}"))?;
        emit_segment_report(&name, &segments);

        if self.options.dry_run {
            return Ok(ProjectOutcome {
                name,
                segments,
                written: Vec::new(),
            });
        }

        let mut written = Vec::with_capacity(segments.len());
        for (idx, segment) in segments.iter().enumerate() {
            let output = project.output_path(&segment.name);
            let job = EncodeJob::new(
                inputs.clone(),
                vec![OutputSpec {
                    path: output.clone(),
                    start: Some(segment.start),
                    end: Some(segment.end),
                    extra_args: project.ffmpeg_args.clone(),
                }],
            );
            if self.options.debug {
                self.debug("split.encode.args", job.args()?.join(" "));
            }

            emit(
                Level::Info,
                "split.encode.segment",
                &format!(
                    "Encoding {} ({}/{})",
                    segment.name,
                    idx + 1,
                    segments.len()
                ),
                None,
            );
            self.encoder
                .encode(&job)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            written.push(output);
        }

        if let Some(path) = remuxed {
            remove_remuxed(&path)?;
        }

        emit(
            Level::Success,
            "split.project.done",
            &format!("Wrote {} file(s) for {name}", written.len()),
            None,
        );
        Ok(ProjectOutcome {
            name,
            segments,
            written,
        })
    }

    /// Run projects in order. A failure stops the batch unless
    /// `continue_on_error` is set; earlier outputs are left in place either way.
    pub fn run_all(&self, projects: &[&ProjectSpec]) -> Result<Vec<ProjectOutcome>> {
        let mut outcomes = Vec::with_capacity(projects.len());
        let mut failed = Vec::new();

        for project in projects {
            let name = project.display_name();
            match self.run_project(project) {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) if self.options.continue_on_error => {
                    emit(
                        Level::Error,
                        "split.project.failed",
                        &format!("Project {name} failed: {err:#}"),
                        None,
                    );
                    failed.push(name);
                }
                Err(err) => return Err(err.context(format!("Project {name} failed"))),
            }
        }

        if !failed.is_empty() {
            bail!(
                "{} of {} project(s) failed: {}",
                failed.len(),
                projects.len(),
                failed.join(", ")
            );
        }
        Ok(outcomes)
    }
}
