//! Shared test helpers for checkpoint integration tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use acft::checkpoints::Checkpoint;
use acft::commands::new;
use acft::config::AcftContext;
use acft::fs::{read_checkpoint, write_checkpoint};
use acft::paths::{CHECKPOINT_FILE, PROJECT_MARKER, WORK_MARKER};

/// A temporary project whose project and work roots are the same directory.
pub struct TestProject {
    _temp: TempDir,
    pub root: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        let project = Self::bare();
        fs::write(project.root.join(PROJECT_MARKER), "").expect("Failed to write project marker");
        fs::write(project.root.join(WORK_MARKER), "").expect("Failed to write work marker");
        project
    }

    /// A directory without any root markers.
    pub fn bare() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp directory");
        Self { _temp: temp, root }
    }

    /// Context anchored at the project root.
    pub fn ctx(&self) -> AcftContext {
        self.ctx_in(&self.root)
    }

    /// Context anchored at `dir`, as if the shell were there.
    pub fn ctx_in(&self, dir: &Path) -> AcftContext {
        AcftContext::discover(dir).with_actor("tester")
    }

    pub fn checkpoint_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create a checkpoint the way `acft new` does.
    pub fn create(&self, name: &str, delegate_of: Option<&str>) -> PathBuf {
        new::execute(&self.ctx(), name, delegate_of, &[], false)
            .expect("Failed to create checkpoint");
        self.checkpoint_dir(name)
    }

    pub fn load(&self, name: &str) -> Checkpoint {
        read_checkpoint(&self.checkpoint_dir(name)).expect("Failed to read checkpoint")
    }

    pub fn read_text(&self, name: &str) -> String {
        fs::read_to_string(self.checkpoint_dir(name).join(CHECKPOINT_FILE))
            .expect("Failed to read CHECKPOINT.md")
    }

    /// Replace one section body of an existing checkpoint.
    pub fn set_section(&self, name: &str, section: &str, body: &str) {
        let mut checkpoint = self.load(name);
        checkpoint.document.set_section(section, body);
        write_checkpoint(&mut checkpoint).expect("Failed to write checkpoint");
    }

    pub fn write_artifact(&self, name: &str, relative: &str, content: &str) {
        let path = self.checkpoint_dir(name).join(relative);
        fs::create_dir_all(path.parent().expect("Artifact path has no parent"))
            .expect("Failed to create artifact directory");
        fs::write(path, content).expect("Failed to write artifact");
    }

    /// Parsed lines of the event log, empty when nothing was emitted yet.
    pub fn events(&self) -> Vec<serde_json::Value> {
        let Ok(text) = fs::read_to_string(self.root.join("checkpoints_events.log")) else {
            return Vec::new();
        };
        text.lines()
            .map(|line| serde_json::from_str(line).expect("Event line is not JSON"))
            .collect()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|event| event["TYPE"].as_str().map(str::to_string))
            .collect()
    }

    /// Run the compiled binary with `dir` as its working directory.
    pub fn run_in(&self, dir: &Path, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_acft"))
            .args(args)
            .current_dir(dir)
            .env("PWD", dir)
            .env("ACFT_ACTOR", "cli-tester")
            .env_remove("ACFT_LOG")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run acft")
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.run_in(&self.root, args)
    }
}

/// MANIFEST body with a single rooted ledger entry and a passing harness.
pub const LEDGER_MANIFEST: &str = "## MANIFEST LEDGER
- Report -> ::THIS/ARTIFACTS/report.md -> Final output

## Harness
```sh
true
```";

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
