use anyhow::Result;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// A scratch project directory with stub `ffprobe`/`ffmpeg` scripts.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    /// Create empty media files; the stub prober only needs them to exist.
    pub fn touch(&self, names: &[&str]) -> Result<()> {
        for name in names {
            fs::write(self.join(name), b"")?;
        }
        Ok(())
    }

    pub fn write_script(&self, name: &str, body: &str) -> Result<PathBuf> {
        let path = self.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    /// ffprobe stand-in answering with a fixed duration per file name suffix.
    pub fn fake_ffprobe(&self, durations: &[(&str, &str)]) -> Result<PathBuf> {
        let mut body = String::from("for last; do :; done\ncase \"$last\" in\n");
        for (suffix, seconds) in durations {
            body.push_str(&format!("  *{suffix}) echo {seconds} ;;\n"));
        }
        body.push_str("  *) echo \"unknown input $last\" >&2; exit 1 ;;\nesac\n");
        self.write_script("fake-ffprobe", &body)
    }

    /// ffmpeg stand-in that logs its arguments, saves stdin and creates the
    /// output file named by its last argument.
    pub fn fake_ffmpeg(&self) -> Result<PathBuf> {
        let log = self.join("ffmpeg-args.log");
        let stdin = self.join("ffmpeg-stdin.txt");
        let body = format!(
            "echo \"$@\" >> '{}'\ncat > '{}'\nfor last; do :; done\n: > \"$last\"\n",
            log.display(),
            stdin.display()
        );
        self.write_script("fake-ffmpeg", &body)
    }

    pub fn write_config(&self, contents: &str) -> Result<PathBuf> {
        let path = self.join("split.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.join(name))?)
    }
}

pub fn run_vidsplit(args: &[&str]) -> Result<CommandOutput> {
    let output = Command::new(env!("CARGO_BIN_EXE_vidsplit"))
        .args(args)
        .arg("--no-color")
        .output()?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}
