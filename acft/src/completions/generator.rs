use anyhow::{anyhow, Result};
use clap::Command;
use clap_complete::{generate, shells};
use std::fmt;
use std::str::FromStr;

/// Shells `acft completions` can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    pub const ALL: [Shell; 3] = [Shell::Bash, Shell::Zsh, Shell::Fish];

    pub fn as_str(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shell {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Shell::ALL
            .into_iter()
            .find(|shell| shell.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Shell::ALL.iter().map(|shell| shell.as_str()).collect();
                anyhow!("Unknown shell '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Render the completion script for the `acft` command tree.
///
/// ```
/// use acft::completions::{completion_script, Shell};
/// use clap::Command;
///
/// let mut cmd = Command::new("acft")
///     .subcommand(Command::new("orient"))
///     .subcommand(Command::new("manifest"));
/// let script = completion_script(&mut cmd, Shell::Zsh);
/// assert!(script.contains("#compdef acft"));
/// ```
pub fn completion_script(cmd: &mut Command, shell: Shell) -> String {
    let bin_name = cmd.get_name().to_string();
    let mut rendered = Vec::new();
    match shell {
        Shell::Bash => generate(shells::Bash, cmd, bin_name, &mut rendered),
        Shell::Zsh => generate(shells::Zsh, cmd, bin_name, &mut rendered),
        Shell::Fish => generate(shells::Fish, cmd, bin_name, &mut rendered),
    }
    String::from_utf8_lossy(&rendered).into_owned()
}
