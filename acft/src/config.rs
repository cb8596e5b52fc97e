//! Explicit runtime context threaded through every operation.
//!
//! `AcftContext` carries the discovered roots, the working directory, the
//! actor recorded on events, the clock and the optional work configuration
//! read from `checkpoints_work.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::error::{AcftError, Result};
use crate::paths::{self, Roots, CHECKPOINT_FILE, WORK_MARKER};

/// Default event log file name under the work root
pub const EVENT_LOG_FILE: &str = "checkpoints_events.log";

/// Default harness log directory under the work root
pub const HARNESS_LOG_DIR: &str = "logs";

/// Optional settings stored in `checkpoints_work.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkConfig {
    /// Actor recorded on events when `ACFT_ACTOR` is unset
    #[serde(default)]
    pub actor: Option<String>,
    /// Event log location, relative to the work root
    #[serde(default)]
    pub event_log: Option<PathBuf>,
    /// Harness log directory, relative to the work root
    #[serde(default)]
    pub harness_logs: Option<PathBuf>,
    /// Per-command harness timeout; unset means no timeout
    #[serde(default)]
    pub harness_timeout_secs: Option<u64>,
}

impl WorkConfig {
    /// Load from the work marker. A missing or unparsable file yields defaults.
    pub fn load(work_root: &Path) -> Self {
        let path = work_root.join(WORK_MARKER);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };

        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unparsable work configuration");
                Self::default()
            }
        }
    }
}

/// Source of "now" for timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AcftContext {
    pub roots: Roots,
    pub cwd: PathBuf,
    pub actor: String,
    pub clock: Clock,
    pub config: WorkConfig,
}

impl AcftContext {
    /// Discover roots from the shell's working directory.
    pub fn from_env() -> Result<Self> {
        let cwd = paths::symlink_aware_cwd().map_err(|e| AcftError::io(Path::new("."), e))?;
        Ok(Self::discover(&cwd))
    }

    /// Discover roots starting at `cwd`, which also anchors relative paths.
    pub fn discover(cwd: &Path) -> Self {
        let roots = Roots::discover(cwd);
        let config = roots
            .work
            .as_deref()
            .map(WorkConfig::load)
            .unwrap_or_default();
        let actor = resolve_actor(&config);

        Self {
            roots,
            cwd: cwd.to_path_buf(),
            actor,
            clock: Clock::System,
            config,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// ISO-8601 UTC with microseconds and a trailing `Z`.
    pub fn timestamp(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn expand(&self, raw: &str) -> Result<PathBuf> {
        self.roots.expand(raw, &self.cwd, false)
    }

    pub fn expand_with(&self, raw: &str, resolve_symlinks: bool) -> Result<PathBuf> {
        self.roots.expand(raw, &self.cwd, resolve_symlinks)
    }

    pub fn to_rooted(&self, target: &Path) -> String {
        self.roots.to_rooted(target)
    }

    pub fn require_work(&self, action: &str) -> Result<&Path> {
        self.roots.require_work(action)
    }

    /// Resolve a command's checkpoint argument (default `::THIS`) to a
    /// checkpoint directory.
    pub fn checkpoint_dir(&self, raw: Option<&str>) -> Result<PathBuf> {
        let raw = raw.unwrap_or("::THIS");
        let mut path = self.expand(raw)?;

        if path.is_file() {
            let is_checkpoint_file = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.eq_ignore_ascii_case(CHECKPOINT_FILE));
            if !is_checkpoint_file {
                return Err(AcftError::path(format!(
                    "Checkpoint argument must resolve to a directory: {raw}"
                )));
            }
            path.pop();
        }

        if !path.join(CHECKPOINT_FILE).exists() {
            return Err(AcftError::path(format!(
                "No CHECKPOINT.md found at {}",
                path.display()
            )));
        }
        Ok(path)
    }

    pub fn event_log_path(&self) -> Result<PathBuf> {
        let work = self.require_work("access event log")?;
        let relative = self
            .config
            .event_log
            .clone()
            .unwrap_or_else(|| PathBuf::from(EVENT_LOG_FILE));
        Ok(paths::normalize_lexically(&work.join(relative)))
    }

    pub fn harness_log_dir(&self, checkpoint_name: &str) -> Result<PathBuf> {
        let work = self.require_work("create log directory")?;
        let relative = self
            .config
            .harness_logs
            .clone()
            .unwrap_or_else(|| PathBuf::from(HARNESS_LOG_DIR));
        Ok(paths::normalize_lexically(
            &work.join(relative).join(checkpoint_name),
        ))
    }

    pub fn harness_timeout(&self) -> Option<Duration> {
        self.config.harness_timeout_secs.map(Duration::from_secs)
    }
}

/// `ACFT_ACTOR`, then the configured actor, then the login name.
fn resolve_actor(config: &WorkConfig) -> String {
    let from_env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

    from_env("ACFT_ACTOR")
        .or_else(|| config.actor.clone().filter(|a| !a.trim().is_empty()))
        .or_else(|| from_env("USER"))
        .or_else(|| from_env("USERNAME"))
        .or_else(|| from_env("LOGNAME"))
        .unwrap_or_else(|| "unknown".to_string())
}
