//! Slash-command parsing for stdin lines.

use pulsewire_proto::ChannelId;
use thiserror::Error;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/join <channel>`: join and make it the active channel.
    Join(ChannelId),
    /// `/leave [channel]`: leave the named channel, or the active one.
    Leave(Option<ChannelId>),
    /// `/typing`: signal typing in the active channel.
    Typing,
    /// `/who`: list online users and who is typing here.
    Who,
    /// `/quit` or `/q`.
    Quit,
    /// Plain text: post it to the active channel.
    Say(String),
}

/// Input that is not a valid command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A required argument was missing.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// The command name is not known.
    #[error("unknown command: /{0}")]
    Unknown(String),
}

impl Command {
    /// Parse one line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let Some(cmd) = line.strip_prefix('/') else {
            return Ok(Some(Self::Say(line.to_string())));
        };

        let mut parts = cmd.split_whitespace();
        let name = parts.next().unwrap_or("");
        let arg = parts.next().map(str::to_string);

        let command = match name {
            "join" | "j" => Self::Join(arg.ok_or(CommandError::Usage("/join <channel>"))?),
            "leave" | "l" => Self::Leave(arg),
            "typing" => Self::Typing,
            "who" => Self::Who,
            "quit" | "q" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            Command::parse("  shift change at 7  ").unwrap(),
            Some(Command::Say("shift change at 7".into()))
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   \t").unwrap(), None);
    }

    #[test]
    fn join_requires_channel() {
        assert_eq!(Command::parse("/join icu").unwrap(), Some(Command::Join("icu".into())));
        assert_eq!(Command::parse("/join"), Err(CommandError::Usage("/join <channel>")));
    }

    #[test]
    fn leave_defaults_to_active() {
        assert_eq!(Command::parse("/leave").unwrap(), Some(Command::Leave(None)));
        assert_eq!(Command::parse("/l icu").unwrap(), Some(Command::Leave(Some("icu".into()))));
    }

    #[test]
    fn short_forms() {
        assert_eq!(Command::parse("/q").unwrap(), Some(Command::Quit));
        assert_eq!(Command::parse("/who").unwrap(), Some(Command::Who));
        assert_eq!(Command::parse("/typing").unwrap(), Some(Command::Typing));
    }

    #[test]
    fn unknown_command_is_an_error() {
        let err = Command::parse("/dance now").unwrap_err();
        assert_eq!(err.to_string(), "unknown command: /dance");

        let err = Command::parse("/").unwrap_err();
        assert_eq!(err, CommandError::Unknown(String::new()));
    }
}
