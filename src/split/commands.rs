use anyhow::{Context, Result, bail};

use crate::ui::prelude::{Level, OutputFormat, emit, get_output_format, separator};

use super::cli::{CheckArgs, PlanArgs, RunArgs, SplitCommands};
use super::config::{ProjectSpec, SplitConfig};
use super::ffmpeg::{EncodeOptions, FfmpegEncoder, FfprobeProber, Prober};
use super::part::SourceVideo;
use super::pipeline::{ProjectRunner, RunOptions};
use super::planner::plan_segments;
use super::report::{ReportLine, emit_report, emit_segment_report};
use super::timecode::parse_timecode;

pub fn handle_split_command(command: SplitCommands, debug: bool) -> Result<()> {
    match command {
        SplitCommands::Run(args) => handle_run(args, debug),
        SplitCommands::Check(args) => handle_check(args),
        SplitCommands::Plan(args) => handle_plan(args),
    }
}

fn select_projects<'a>(config: &'a SplitConfig, names: &[String]) -> Result<Vec<&'a ProjectSpec>> {
    if names.is_empty() {
        return Ok(config.projects.iter().collect());
    }
    for name in names {
        if !config.projects.iter().any(|p| &p.display_name() == name) {
            bail!("No project named '{name}' in the project file");
        }
    }
    Ok(config
        .projects
        .iter()
        .filter(|p| names.contains(&p.display_name()))
        .collect())
}

fn handle_run(args: RunArgs, debug: bool) -> Result<()> {
    let config = SplitConfig::load_from_path(&args.file)?;
    let projects = select_projects(&config, &args.projects)?;

    let prober = FfprobeProber::new(&config.ffprobe_bin);
    let encoder = FfmpegEncoder::new(
        &config.ffmpeg_bin,
        EncodeOptions {
            verbose: config.verbose || debug,
            progress: matches!(get_output_format(), OutputFormat::Text),
        },
    );
    let options = RunOptions {
        dry_run: args.dry_run,
        debug,
        continue_on_error: args.keep_going || config.continue_on_error,
    };

    let runner = ProjectRunner::new(&config, &prober, &encoder, options);
    let outcomes = runner.run_all(&projects)?;

    let segments: usize = outcomes.iter().map(|o| o.segments.len()).sum();
    let written: usize = outcomes.iter().map(|o| o.written.len()).sum();
    separator();
    for outcome in &outcomes {
        emit(
            Level::Info,
            "split.run.project",
            &format!(
                "{}: {} segment(s), {} file(s) written",
                outcome.name,
                outcome.segments.len(),
                outcome.written.len()
            ),
            None,
        );
    }
    if args.dry_run {
        emit(
            Level::Success,
            "split.run.dry",
            &format!(
                "Dry run: planned {segments} segment(s) across {} project(s)",
                outcomes.len()
            ),
            None,
        );
    } else {
        emit(
            Level::Success,
            "split.run.done",
            &format!("Wrote {written} file(s) across {} project(s)", outcomes.len()),
            None,
        );
    }
    Ok(())
}

fn handle_check(args: CheckArgs) -> Result<()> {
    let config = SplitConfig::load_from_path(&args.file)?;
    let prober = FfprobeProber::new(&config.ffprobe_bin);
    let mut lines = Vec::new();

    for project in &config.projects {
        let project_lines =
            check_project(project, &config, args.probe.then_some(&prober as &dyn Prober));
        let clean = project_lines.iter().all(|line| line.level != Level::Error);
        lines.extend(project_lines);
        if clean {
            lines.push(ReportLine::new(
                Level::Success,
                "split.check.project",
                format!("Project {} looks good", project.display_name()),
            ));
        }
    }

    emit_report(&lines);

    let problems = lines.iter().filter(|l| l.level == Level::Error).count();
    if problems > 0 {
        bail!("Check found {problems} problem(s) in {}", args.file.display());
    }
    Ok(())
}

fn check_project(project: &ProjectSpec, config: &SplitConfig, prober: Option<&dyn Prober>) -> Vec<ReportLine> {
    let name = project.display_name();
    let mut lines = Vec::new();

    if let Err(err) = project.validate() {
        lines.push(ReportLine::new(
            Level::Error,
            "split.check.definition",
            format!("Project {name}: {err:#}"),
        ));
        return lines;
    }

    if !project.workdir.is_dir() {
        lines.push(ReportLine::new(
            Level::Error,
            "split.check.workdir",
            format!("Project {name}: workdir {} does not exist", project.workdir.display()),
        ));
        return lines;
    }

    let inputs = project.input_paths();
    let mut missing = false;
    for input in &inputs {
        if input.is_file() {
            lines.push(ReportLine::new(
                Level::Info,
                "split.check.file",
                format!("Found {}", input.display()),
            ));
        } else {
            missing = true;
            lines.push(ReportLine::new(
                Level::Error,
                "split.check.file",
                format!("Missing {}", input.display()),
            ));
        }
    }

    let Some(prober) = prober else {
        return lines;
    };
    if missing {
        lines.push(ReportLine::new(
            Level::Warn,
            "split.check.probe",
            format!("Project {name}: not probing, some inputs are missing"),
        ));
        return lines;
    }

    let videos: Result<Vec<SourceVideo>> = inputs
        .iter()
        .map(|path| -> Result<SourceVideo> {
            let duration = prober.probe(path)?;
            Ok(SourceVideo::new(path.to_string_lossy(), duration))
        })
        .collect();
    let plan = videos.and_then(|videos| {
        plan_segments(&project.declared_parts(), &videos, &config.limits()).map_err(Into::into)
    });
    match plan {
        Ok(segments) => lines.push(ReportLine::new(
            Level::Info,
            "split.check.plan",
            format!("Project {name} plans {} segment(s)", segments.len()),
        )),
        Err(err) => lines.push(ReportLine::new(
            Level::Error,
            "split.check.plan",
            format!("Project {name}: {err:#}"),
        )),
    }
    lines
}

fn handle_plan(args: PlanArgs) -> Result<()> {
    let config = SplitConfig::load_from_path(&args.file)?;
    let project = match &args.project {
        Some(name) => *select_projects(&config, std::slice::from_ref(name))?
            .first()
            .context("Project selection came back empty")?,
        None => config
            .projects
            .first()
            .context("No [[projects]] defined")?,
    };
    project.validate()?;

    if args.durations.len() != project.files.len() {
        bail!(
            "Project {} lists {} file(s) but {} duration(s) were given",
            project.display_name(),
            project.files.len(),
            args.durations.len()
        );
    }

    let videos = project
        .files
        .iter()
        .zip(&args.durations)
        .map(|(file, raw)| -> Result<SourceVideo> {
            let duration = parse_timecode(raw)
                .with_context(|| format!("Invalid duration for {file}"))?;
            Ok(SourceVideo::new(file.as_str(), duration))
        })
        .collect::<Result<Vec<_>>>()?;

    let segments = plan_segments(&project.declared_parts(), &videos, &config.limits())?;
    emit_segment_report(&project.display_name(), &segments);
    Ok(())
}
