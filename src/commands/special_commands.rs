//! Special commands parser for the interactive chat
//!
//! Lines starting with `/` drive accounts, sessions and image attachment.
//! Anything else is a question about the attached image. Command names are
//! case-insensitive; arguments keep their case.

use crate::storage::SessionId;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// Session identifiers are integers
    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),
}

/// Commands understood by the interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Create an account: `/signup <user> <password> <confirm>`
    SignUp {
        username: String,
        password: String,
        confirm: String,
    },

    /// Log in: `/login <user> <password>`
    Login { username: String, password: String },

    /// Log out and discard the conversation
    Logout,

    /// Create and select a session: `/new <name>`
    NewSession(String),

    /// List the account's sessions
    ListSessions,

    /// Open a stored session: `/open <id>`
    OpenSession(SessionId),

    /// Rename a session: `/rename <id> <name>`
    RenameSession { id: SessionId, name: String },

    /// Delete a session: `/delete <id>`
    DeleteSession(SessionId),

    /// Attach an image file: `/image <path>`
    AttachImage(String),

    /// Print the current conversation
    ShowHistory,

    /// Display login, session and quota status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a question
    None,
}

/// Parse a user input string into a special command
///
/// # Examples
///
/// ```
/// use saanra::commands::special_commands::{parse_special_command, SpecialCommand};
/// use saanra::storage::SessionId;
///
/// let cmd = parse_special_command("/open 4").unwrap();
/// assert_eq!(cmd, SpecialCommand::OpenSession(SessionId(4)));
///
/// let cmd = parse_special_command("what is in this picture?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') {
        return match lower.as_str() {
            "exit" | "quit" => Ok(SpecialCommand::Exit),
            _ => Ok(SpecialCommand::None),
        };
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match command.as_str() {
        "/signup" => {
            let args: Vec<&str> = rest.split_whitespace().collect();
            match args.as_slice() {
                [username, password, confirm] => Ok(SpecialCommand::SignUp {
                    username: username.to_string(),
                    password: password.to_string(),
                    confirm: confirm.to_string(),
                }),
                _ => Err(missing("/signup", "/signup <username> <password> <confirm>")),
            }
        }
        "/login" => {
            let args: Vec<&str> = rest.split_whitespace().collect();
            match args.as_slice() {
                [username, password] => Ok(SpecialCommand::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                }),
                _ => Err(missing("/login", "/login <username> <password>")),
            }
        }
        "/logout" => Ok(SpecialCommand::Logout),

        "/new" if rest.is_empty() => Err(missing("/new", "/new <name>")),
        "/new" => Ok(SpecialCommand::NewSession(rest.to_string())),

        "/sessions" => Ok(SpecialCommand::ListSessions),

        "/open" => Ok(SpecialCommand::OpenSession(parse_id("/open", "/open <id>", rest)?)),

        "/rename" => {
            let (id, name) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let id = parse_id("/rename", "/rename <id> <name>", id)?;
            if name.trim().is_empty() {
                return Err(missing("/rename", "/rename <id> <name>"));
            }
            Ok(SpecialCommand::RenameSession {
                id,
                name: name.trim().to_string(),
            })
        }

        "/delete" => Ok(SpecialCommand::DeleteSession(parse_id(
            "/delete",
            "/delete <id>",
            rest,
        )?)),

        "/image" if rest.is_empty() => Err(missing("/image", "/image <path>")),
        "/image" => Ok(SpecialCommand::AttachImage(rest.to_string())),

        "/history" => Ok(SpecialCommand::ShowHistory),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Whether `input` is an account command that carries a password
///
/// Such lines must stay out of the readline history, even when malformed.
pub fn contains_credentials(input: &str) -> bool {
    let command = input.split_whitespace().next().unwrap_or_default();
    matches!(command.to_lowercase().as_str(), "/login" | "/signup")
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

fn parse_id(command: &str, usage: &str, raw: &str) -> Result<SessionId, CommandError> {
    if raw.is_empty() {
        return Err(missing(command, usage));
    }
    raw.parse()
        .map_err(|_| CommandError::InvalidSessionId(raw.to_string()))
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands
================

ACCOUNT:
  /signup <user> <pass> <confirm>  - Create an account
  /login <user> <pass>             - Log in
  /logout                          - Log out and clear the conversation

SESSIONS (login required):
  /new <name>                      - Create and select a chat session
  /sessions                        - List your sessions
  /open <id>                       - Open a session and show its history
  /rename <id> <name>              - Rename a session
  /delete <id>                     - Delete a session and its messages

IMAGE:
  /image <path>                    - Attach a jpg, jpeg or png image

OTHER:
  /history                         - Show the current conversation
  /status                          - Show login, session and quota status
  /help                            - Show this help message
  exit, quit                       - Leave the chat

Anything else is sent as a question about the attached image.
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_question() {
        assert_eq!(
            parse_special_command("What breed is this dog?").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_exit_aliases() {
        for input in ["exit", "QUIT", "/exit", "/quit"] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_signup_keeps_argument_case() {
        let cmd = parse_special_command("/SIGNUP Alice PassWord PassWord").unwrap();
        assert_eq!(
            cmd,
            SpecialCommand::SignUp {
                username: "Alice".to_string(),
                password: "PassWord".to_string(),
                confirm: "PassWord".to_string(),
            }
        );
    }

    #[test]
    fn test_signup_needs_three_arguments() {
        assert!(matches!(
            parse_special_command("/signup alice pw"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_login_parses_credentials() {
        assert_eq!(
            parse_special_command("/login alice pw").unwrap(),
            SpecialCommand::Login {
                username: "alice".to_string(),
                password: "pw".to_string(),
            }
        );
    }

    #[test]
    fn test_new_session_keeps_spaces_in_name() {
        assert_eq!(
            parse_special_command("/new Summer trip 2026").unwrap(),
            SpecialCommand::NewSession("Summer trip 2026".to_string())
        );
        assert!(parse_special_command("/new").is_err());
    }

    #[test]
    fn test_rename_parses_id_and_name() {
        assert_eq!(
            parse_special_command("/rename 12 Beach photos").unwrap(),
            SpecialCommand::RenameSession {
                id: SessionId(12),
                name: "Beach photos".to_string(),
            }
        );
        assert!(matches!(
            parse_special_command("/rename 12"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_session_ids_must_be_numeric() {
        assert_eq!(
            parse_special_command("/delete abc"),
            Err(CommandError::InvalidSessionId("abc".to_string()))
        );
        assert!(matches!(
            parse_special_command("/open"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_image_path_is_verbatim() {
        assert_eq!(
            parse_special_command("/image ~/Pictures/My Cat.PNG").unwrap(),
            SpecialCommand::AttachImage("~/Pictures/My Cat.PNG".to_string())
        );
    }

    #[test]
    fn test_credential_lines_are_detected() {
        assert!(contains_credentials("/login alice pw"));
        assert!(contains_credentials("  /SignUp alice pw pw"));
        assert!(contains_credentials("/signup alice pw"));
        assert!(!contains_credentials("/logout"));
        assert!(!contains_credentials("/sessions"));
        assert!(!contains_credentials("what is my login password?"));
        assert!(!contains_credentials(""));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_special_command("/mode write"),
            Err(CommandError::UnknownCommand("/mode".to_string()))
        );
    }
}
