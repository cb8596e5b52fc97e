use std::io::{self, Write};
use std::str::FromStr;

use anyhow::Result;
use clap::CommandFactory;

use acft::commands::{close, events, expand, init, log, manifest, new, orient, validate, verify};
use acft::completions::{completion_script, Shell};
use acft::config::AcftContext;

use super::types::{Cli, Commands, EventsCommands};

/// Run one command. `Ok(false)` means the command reported a failure.
pub fn dispatch(command: Commands) -> Result<bool> {
    let ctx = &AcftContext::from_env()?;
    match command {
        Commands::Init => init::execute(ctx),
        Commands::New {
            name,
            delegate_of,
            tags,
            no_open,
        } => new::execute(ctx, &name, delegate_of.as_deref(), &tags, no_open),
        Commands::Close {
            path,
            status,
            signal,
            lifecycle,
            message,
        } => close::execute(
            ctx,
            path.as_deref(),
            status == "true",
            signal,
            lifecycle,
            message.as_deref(),
        ),
        Commands::Log { message, path } => log::execute(ctx, &message, path.as_deref()),
        Commands::Expand {
            paths,
            resolve_symlinks,
            allow_future,
        } => expand::execute(ctx, &paths, resolve_symlinks, allow_future),
        Commands::Validate { path, strict, json } => {
            validate::execute(ctx, path.as_deref(), strict, json)
        }
        Commands::Manifest {
            path,
            mode,
            json,
            emit,
        } => manifest::execute(ctx, path.as_deref(), mode, json, emit),
        Commands::Orient {
            path,
            json,
            sections,
            depth,
        } => orient::execute(ctx, path.as_deref(), json, &sections, depth),
        Commands::Verify {
            path,
            section,
            dry_run,
            record,
        } => verify::execute(ctx, path.as_deref(), section.as_deref(), dry_run, record),
        Commands::Events { command } => match command {
            Some(EventsCommands::Tail {
                since,
                types,
                follow,
            }) => events::tail_events(ctx, since.as_deref(), types.as_deref(), follow),
            None => {
                let mut cmd = Cli::command();
                if let Some(events) = cmd.find_subcommand_mut("events") {
                    events.print_help()?;
                }
                Ok(false)
            }
        },
        Commands::Completions { shell } => {
            let shell = Shell::from_str(&shell)?;
            let mut cmd = Cli::command();
            io::stdout().write_all(completion_script(&mut cmd, shell).as_bytes())?;
            Ok(true)
        }
    }
}
