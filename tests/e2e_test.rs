#![cfg(unix)]

mod common;

use anyhow::Result;
use common::{TestEnvironment, run_vidsplit};
use serde_json::Value;

/// Two recordings of 21:30 and 15:00, an intro and an open-ended talk.
fn lecture_env() -> Result<(TestEnvironment, String)> {
    let env = TestEnvironment::new()?;
    env.touch(&["a.mp4", "b.mp4"])?;
    let ffprobe = env.fake_ffprobe(&[("a.mp4", "1290.0"), ("b.mp4", "900.0")])?;
    let ffmpeg = env.fake_ffmpeg()?;

    let config = env.write_config(&format!(
        r#"
ffprobeBin = '{}'
ffmpegBin = '{}'
maxPartLength = "10:00"
latestPartGreedy = 0.1

[[projects]]
name = "lecture"
workdir = "."
files = ["a.mp4", "b.mp4"]

[[projects.parts]]
name = "intro"
end = "5:00"

[[projects.parts]]
name = "talk"
"#,
        ffprobe.display(),
        ffmpeg.display()
    ))?;

    Ok((env, config.to_string_lossy().into_owned()))
}

#[test]
fn dry_run_prints_plan_without_writing() -> Result<()> {
    let (env, config) = lecture_env()?;

    let output = run_vidsplit(&["run", &config, "--dry-run"])?;
    assert_eq!(output.exit_code, 0, "stderr: {}", output.stderr);

    for expected in ["intro", "talk_part1", "talk_part3", "0:24:55.000", "0:36:30.000"] {
        assert!(
            output.stdout.contains(expected),
            "missing {expected} in\n{}",
            output.stdout
        );
    }
    assert!(!env.join("intro.mp4").exists());
    assert!(!env.join("talk_part1.mp4").exists());
    assert!(!env.join("ffmpeg-args.log").exists());
    Ok(())
}

#[test]
fn json_output_attaches_segment_rows() -> Result<()> {
    let (_env, config) = lecture_env()?;

    let output = run_vidsplit(&["--output", "json", "run", &config, "--dry-run"])?;
    assert_eq!(output.exit_code, 0, "stderr: {}", output.stderr);

    let report = output
        .stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .find(|event| event["code"] == "split.plan.report")
        .expect("plan report event");

    let segments = report["data"]["segments"].as_array().expect("segments array");
    assert_eq!(segments.len(), 4);
    assert_eq!(report["data"]["project"], "lecture");
    assert_eq!(segments[0]["name"], "intro");
    assert_eq!(segments[3]["name"], "talk_part3");
    assert_eq!(segments[3]["start"], "0:24:55.000");
    Ok(())
}

#[test]
fn plan_uses_given_durations_for_relative_starts() -> Result<()> {
    let env = TestEnvironment::new()?;
    let config = env.write_config(
        r#"
[[projects]]
name = "relative"
workdir = "."
files = ["a.mp4", "b.mp4"]

[[projects.parts]]
name = "second"
start = "5:00"
startIdx = 2
"#,
    )?;
    let config = config.to_string_lossy().into_owned();

    let output = run_vidsplit(&["plan", &config, "-t", "10:00", "-t", "15:00"])?;
    assert_eq!(output.exit_code, 0, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("second"), "{}", output.stdout);
    assert!(output.stdout.contains("0:15:00.000"), "{}", output.stdout);
    assert!(output.stdout.contains("0:25:00.000"), "{}", output.stdout);

    let mismatch = run_vidsplit(&["plan", &config, "-t", "10:00"])?;
    assert_eq!(mismatch.exit_code, 1);
    assert!(mismatch.stderr.contains("duration(s) were given"), "{}", mismatch.stderr);
    Ok(())
}

#[test]
fn check_reports_open_end_before_last_part() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.touch(&["a.mp4"])?;
    let config = env.write_config(
        r#"
[[projects]]
name = "broken"
workdir = "."
files = ["a.mp4"]

[[projects.parts]]
name = "first"

[[projects.parts]]
name = "second"
"#,
    )?;

    let output = run_vidsplit(&["check", &config.to_string_lossy()])?;
    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("'first' has no end time"), "{}", output.stderr);
    assert!(output.stderr.contains("1 problem(s)"), "{}", output.stderr);
    Ok(())
}

#[test]
fn run_cuts_every_segment_from_concatenated_inputs() -> Result<()> {
    let (env, config) = lecture_env()?;

    let output = run_vidsplit(&["run", &config])?;
    assert_eq!(output.exit_code, 0, "stderr: {}", output.stderr);

    for name in ["intro", "talk_part1", "talk_part2", "talk_part3"] {
        assert!(env.join(&format!("{name}.mp4")).exists(), "{name}.mp4 not written");
    }

    let args = env.read("ffmpeg-args.log")?;
    assert_eq!(args.lines().count(), 4);
    assert!(args.contains("-f concat"), "{args}");
    assert!(args.contains("-ss 0:14:55.000000 -to 0:25:00.000000 -c copy"), "{args}");

    let list = env.read("ffmpeg-stdin.txt")?;
    assert!(list.contains("file 'file:"), "{list}");
    assert!(list.contains("a.mp4'"), "{list}");
    assert!(list.contains("b.mp4'"), "{list}");
    assert!(output.stdout.contains("Wrote 4 file(s)"), "{}", output.stdout);
    Ok(())
}

#[test]
fn missing_input_fails_the_run() -> Result<()> {
    let (env, config) = lecture_env()?;
    std::fs::remove_file(env.join("b.mp4"))?;

    let output = run_vidsplit(&["run", &config, "--dry-run"])?;
    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("Project lecture failed"), "{}", output.stderr);
    Ok(())
}
