//! Console commands: parsing the typed line and applying it to the router.
use crate::logging::record::ParseSeverityError;
use crate::logging::{LogRouter, RenderSink, Severity};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

pub const HELP: &str = "Log commands: level <debug|info|warning|error|critical>, show <source>, \
hide <source>, timestamps on|off, autoscroll on|off, rerender, clear, tips, sources, \
export <file>, help, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogCommand {
    Level(Severity),
    Show(String),
    Hide(String),
    Timestamps(bool),
    Autoscroll(bool),
    Rerender,
    Clear,
    Tips,
    Sources,
    Export(PathBuf),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown command: {0}. Type 'help' for available commands.")]
    Unknown(String),
    #[error(transparent)]
    Severity(#[from] ParseSeverityError),
}

/// What the console should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Keep running, showing this feedback in the status line.
    Continue(String),
    Quit,
}

pub fn parse(input: &str) -> Result<LogCommand, CommandError> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return Err(CommandError::Usage(HELP));
    };

    match command.to_lowercase().as_str() {
        "level" => match args {
            [level] => Ok(LogCommand::Level(level.parse()?)),
            _ => Err(CommandError::Usage(
                "level <debug|info|warning|error|critical>",
            )),
        },
        "show" | "hide" => {
            if args.is_empty() {
                return Err(CommandError::Usage("show|hide <source>"));
            }
            let name = args.join(" ");
            if command.eq_ignore_ascii_case("show") {
                Ok(LogCommand::Show(name))
            } else {
                Ok(LogCommand::Hide(name))
            }
        }
        "timestamps" => Ok(LogCommand::Timestamps(parse_switch(
            args,
            "timestamps on|off",
        )?)),
        "autoscroll" => Ok(LogCommand::Autoscroll(parse_switch(
            args,
            "autoscroll on|off",
        )?)),
        "rerender" | "refresh" => Ok(LogCommand::Rerender),
        "clear" => Ok(LogCommand::Clear),
        "tips" => Ok(LogCommand::Tips),
        "sources" => Ok(LogCommand::Sources),
        "export" => match args {
            [path] => Ok(LogCommand::Export(PathBuf::from(path))),
            _ => Err(CommandError::Usage("export <file>")),
        },
        "help" => Ok(LogCommand::Help),
        "quit" | "exit" => Ok(LogCommand::Quit),
        _ => Err(CommandError::Unknown(command.to_string())),
    }
}

fn parse_switch(args: &[&str], usage: &'static str) -> Result<bool, CommandError> {
    match args {
        [value] => match value.to_lowercase().as_str() {
            "on" | "true" | "yes" => Ok(true),
            "off" | "false" | "no" => Ok(false),
            _ => Err(CommandError::Usage(usage)),
        },
        _ => Err(CommandError::Usage(usage)),
    }
}

pub fn execute<S: RenderSink>(router: &mut LogRouter<S>, command: LogCommand) -> Flow {
    let feedback = match command {
        LogCommand::Level(level) => {
            let shown = router.set_severity_threshold(level);
            format!("Log level set to {} ({} records shown)", level, shown)
        }
        LogCommand::Show(name) | LogCommand::Hide(name) if router.registry().get(&name).is_none() => {
            format!("No source named '{}'", name)
        }
        LogCommand::Show(name) => {
            router.toggle_source_visibility(&name, true);
            format!("Showing '{}'; type 'rerender' to refresh the view", name)
        }
        LogCommand::Hide(name) => {
            router.toggle_source_visibility(&name, false);
            format!("Hiding '{}'; type 'rerender' to refresh the view", name)
        }
        LogCommand::Timestamps(show) => {
            router.toggle_timestamps(show);
            format!("Timestamps {}", if show { "shown" } else { "hidden" })
        }
        LogCommand::Autoscroll(enabled) => {
            router.toggle_autoscroll(enabled);
            format!("Autoscroll {}", if enabled { "on" } else { "off" })
        }
        LogCommand::Rerender => {
            let shown = router.rerender();
            format!("{} of {} records shown", shown, router.history().len())
        }
        LogCommand::Clear => {
            router.clear_view();
            "Log view cleared".to_string()
        }
        LogCommand::Tips => {
            router.print_tips();
            "Tips printed".to_string()
        }
        LogCommand::Sources => describe_sources(router),
        LogCommand::Export(path) => match router.export(&path) {
            Ok(count) => format!("Exported {} records to {}", count, path.display()),
            Err(e) => format!("Failed to export log to {}: {}", path.display(), e),
        },
        LogCommand::Help => HELP.to_string(),
        LogCommand::Quit => return Flow::Quit,
    };

    debug!("{}", feedback);
    Flow::Continue(feedback)
}

fn describe_sources<S: RenderSink>(router: &LogRouter<S>) -> String {
    if router.registry().is_empty() {
        return "No sources registered yet".to_string();
    }

    let listed: Vec<String> = router
        .sources()
        .map(|(name, entry)| {
            let mut state = if entry.visible { "shown" } else { "hidden" }.to_string();
            if !entry.attached {
                state.push_str(", detached");
            }
            format!("{} ({})", name, state)
        })
        .collect();
    format!("Sources: {}", listed.join(", "))
}
