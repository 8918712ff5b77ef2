// Builtin commands invoked from `{name:arg}` tokens
//
// Commands are plain function pointers registered by name in the system's
// case-insensitive command table. History-only commands (undo, redo, reset)
// manipulate the history instead of producing an entry of their own.

use std::fmt;

use crate::formatting::Formatting;

pub use crate::translator::CommandContext;

/// Signature of a builtin command.
pub type CommandFn = fn(&mut CommandContext<'_>, Option<&str>) -> Result<(), CommandError>;

/// A registered command.
#[derive(Clone, Copy)]
pub enum Command {
    /// Runs inside the translator.
    Builtin { run: CommandFn, history_only: bool },
    /// Forwarded to the host as [`Action::Host`](crate::translator::Action::Host).
    Host,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Builtin { history_only, .. } => f
                .debug_struct("Builtin")
                .field("history_only", history_only)
                .finish_non_exhaustive(),
            Command::Host => f.write_str("Host"),
        }
    }
}

/// Error type for command arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown transform: {0:?}")]
    UnknownTransform(String),

    #[error("invalid argument {arg:?} for {command}")]
    InvalidArgument { command: &'static str, arg: String },

    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
}

/// Every builtin command with its registration name.
pub fn builtin_commands() -> impl Iterator<Item = (&'static str, Command)> {
    const BUILTINS: &[(&str, CommandFn, bool)] = &[
        ("retro:undo", undo, true),
        ("retro:redo", redo, true),
        ("reset", reset, true),
        ("retro:transform", retro_transform, false),
        ("transform", transform, false),
        ("mode:set_space", set_space, false),
        ("mode:reset_space", reset_space, false),
    ];
    BUILTINS
        .iter()
        .map(|&(name, run, history_only)| (name, Command::Builtin { run, history_only }))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

fn undo(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> Result<(), CommandError> {
    let count = match arg {
        None => 1,
        Some(arg) => arg.trim().parse().map_err(|_| CommandError::InvalidArgument {
            command: "retro:undo",
            arg: arg.to_string(),
        })?,
    };
    ctx.undo(count);
    Ok(())
}

fn redo(ctx: &mut CommandContext<'_>, _arg: Option<&str>) -> Result<(), CommandError> {
    if !ctx.redo() {
        tracing::debug!("nothing to redo");
    }
    Ok(())
}

fn reset(ctx: &mut CommandContext<'_>, _arg: Option<&str>) -> Result<(), CommandError> {
    ctx.reset();
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

fn retro_transform(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> Result<(), CommandError> {
    let name = arg.ok_or(CommandError::MissingArgument("retro:transform"))?;
    let transform = ctx
        .system()
        .transform(name)
        .ok_or_else(|| CommandError::UnknownTransform(name.to_string()))?;
    ctx.retro_transform(transform);
    Ok(())
}

fn transform(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> Result<(), CommandError> {
    let name = arg.ok_or(CommandError::MissingArgument("transform"))?;
    let transform = ctx
        .system()
        .transform(name)
        .ok_or_else(|| CommandError::UnknownTransform(name.to_string()))?;
    ctx.set_formatting(Formatting {
        transform: Some(transform),
        ..ctx.formatting().clone()
    });
    Ok(())
}

fn set_space(ctx: &mut CommandContext<'_>, arg: Option<&str>) -> Result<(), CommandError> {
    let space = arg.unwrap_or_default().to_string();
    ctx.set_formatting(Formatting {
        space: Some(space),
        ..ctx.formatting().clone()
    });
    Ok(())
}

fn reset_space(ctx: &mut CommandContext<'_>, _arg: Option<&str>) -> Result<(), CommandError> {
    ctx.set_formatting(Formatting {
        space: None,
        ..ctx.formatting().clone()
    });
    Ok(())
}
