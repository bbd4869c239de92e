//! Wire protocol: outbound command formatting and inbound line parsing.
//!
//! One command or response per line, newline-terminated, fields separated
//! by single spaces. The last field of `msg`/`privmsg` lines is free-form
//! text and may itself contain spaces, so it is split off once and never
//! re-split.

use crate::event::{Event, TextMessage};

/// Commands the client can send to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Authenticate with the given username.
    Login { username: String },
    /// Broadcast a message to everyone.
    PublicMessage { text: String },
    /// Send a message to a single recipient.
    PrivateMessage { recipient: String, text: String },
    /// Request the current user roster.
    Users,
    /// Ask which command verbs the server supports.
    Help,
}

impl Command {
    /// Render the command as one wire line with a single trailing newline.
    pub fn to_line(&self) -> String {
        match self {
            Command::Login { username } => format!("login {username}\n"),
            Command::PublicMessage { text } => format!("msg {text}\n"),
            Command::PrivateMessage { recipient, text } => {
                format!("privmsg {recipient} {text}\n")
            }
            Command::Users => "users\n".to_string(),
            Command::Help => "help\n".to_string(),
        }
    }
}

/// Outcome of parsing one inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// The line maps to an observer notification.
    Event(Event),
    /// Recognized, but there is nothing to deliver: an acknowledgement
    /// (`msgok`), an empty line, or a known verb missing a required field.
    Silent,
    /// The verb is not in the protocol table. Ignored after a diagnostic.
    Unknown,
}

/// How the remainder after the verb is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// No arguments expected.
    None,
    /// The whole remainder is one free-text field (may be empty).
    Trailing,
    /// The remainder is a whitespace-separated token list.
    Tokens,
    /// One name token, then free text. The text is never split further.
    NameThenTrailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    LoginOk,
    LoginErr,
    Users,
    MsgOk,
    MsgErr,
    Msg,
    PrivMsg,
    Supported,
    CmdErr,
}

/// Dispatch table: verb word → (verb, argument shape).
const DISPATCH: &[(&str, Verb, Shape)] = &[
    ("loginok", Verb::LoginOk, Shape::Trailing),
    ("loginerr", Verb::LoginErr, Shape::Trailing),
    ("users", Verb::Users, Shape::Tokens),
    ("msgok", Verb::MsgOk, Shape::None),
    ("msgerr", Verb::MsgErr, Shape::Trailing),
    ("msg", Verb::Msg, Shape::NameThenTrailing),
    ("privmsg", Verb::PrivMsg, Shape::NameThenTrailing),
    ("supported", Verb::Supported, Shape::Tokens),
    ("cmderr", Verb::CmdErr, Shape::Trailing),
];

/// Arguments extracted from the remainder according to a [`Shape`].
enum Args<'a> {
    None,
    Trailing(&'a str),
    Tokens(Vec<&'a str>),
    NameThenTrailing(&'a str, &'a str),
}

/// Extract arguments per `shape`. Returns `None` when a required field is
/// missing, which callers treat as a no-op rather than an error.
fn extract(shape: Shape, rest: &str) -> Option<Args<'_>> {
    match shape {
        Shape::None => Some(Args::None),
        Shape::Trailing => Some(Args::Trailing(rest)),
        Shape::Tokens => Some(Args::Tokens(rest.split_whitespace().collect())),
        Shape::NameThenTrailing => {
            let (name, text) = rest.split_once(' ')?;
            if name.is_empty() {
                return None;
            }
            Some(Args::NameThenTrailing(name, text))
        }
    }
}

/// Parse one server line into an [`Inbound`] outcome.
///
/// The trailing line delimiter (and any `\r`) is stripped here, so callers
/// can hand over the raw buffer from `read_line`.
pub fn parse_line(line: &str) -> Inbound {
    let line = line.trim_end_matches(['\r', '\n']);
    let (word, rest) = match line.split_once(' ') {
        Some((word, rest)) => (word, rest),
        None => (line, ""),
    };
    if word.is_empty() {
        return Inbound::Silent;
    }
    let Some(&(_, verb, shape)) = DISPATCH.iter().find(|(w, _, _)| *w == word) else {
        return Inbound::Unknown;
    };
    let Some(args) = extract(shape, rest) else {
        // Known verb, required field missing: degrade to a no-op.
        return Inbound::Silent;
    };

    let event = match (verb, args) {
        (Verb::LoginOk, Args::Trailing(message)) => Event::LoginResult {
            success: true,
            message: message.to_string(),
        },
        (Verb::LoginErr, Args::Trailing(message)) => Event::LoginResult {
            success: false,
            message: message.to_string(),
        },
        (Verb::Users, Args::Tokens(users)) => Event::UserList {
            users: users.into_iter().map(str::to_string).collect(),
        },
        (Verb::MsgErr, Args::Trailing(message)) => Event::MessageError {
            message: message.to_string(),
        },
        (Verb::Msg, Args::NameThenTrailing(sender, text)) => Event::Message(TextMessage {
            sender: sender.to_string(),
            private: false,
            text: text.to_string(),
        }),
        (Verb::PrivMsg, Args::NameThenTrailing(sender, text)) => Event::Message(TextMessage {
            sender: sender.to_string(),
            private: true,
            text: text.to_string(),
        }),
        (Verb::Supported, Args::Tokens(commands)) => Event::SupportedCommands {
            commands: commands.into_iter().map(str::to_string).collect(),
        },
        (Verb::CmdErr, Args::Trailing(message)) => Event::CommandError {
            message: message.to_string(),
        },
        // msgok, or a verb/shape pairing that cannot occur.
        _ => return Inbound::Silent,
    };
    Inbound::Event(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(line: &str) -> Event {
        match parse_line(line) {
            Inbound::Event(event) => event,
            other => panic!("expected event for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_login_ok_with_message() {
        assert_eq!(
            event("loginok welcome"),
            Event::LoginResult {
                success: true,
                message: "welcome".to_string()
            }
        );
    }

    #[test]
    fn test_login_err() {
        assert_eq!(
            event("loginerr name taken"),
            Event::LoginResult {
                success: false,
                message: "name taken".to_string()
            }
        );
    }

    #[test]
    fn test_login_ok_bare() {
        assert_eq!(
            event("loginok"),
            Event::LoginResult {
                success: true,
                message: String::new()
            }
        );
    }

    #[test]
    fn test_users_preserves_order() {
        assert_eq!(
            event("users alice bob carol"),
            Event::UserList {
                users: vec!["alice".to_string(), "bob".to_string(), "carol".to_string()]
            }
        );
    }

    #[test]
    fn test_users_bare_is_empty_roster() {
        assert_eq!(event("users"), Event::UserList { users: vec![] });
    }

    #[test]
    fn test_privmsg_keeps_embedded_spaces() {
        assert_eq!(
            event("privmsg alice hello there"),
            Event::Message(TextMessage {
                sender: "alice".to_string(),
                private: true,
                text: "hello there".to_string(),
            })
        );
    }

    #[test]
    fn test_public_msg() {
        assert_eq!(
            event("msg bob hi"),
            Event::Message(TextMessage {
                sender: "bob".to_string(),
                private: false,
                text: "hi".to_string(),
            })
        );
    }

    #[test]
    fn test_privmsg_without_text_is_noop() {
        assert_eq!(parse_line("privmsg alice"), Inbound::Silent);
        assert_eq!(parse_line("msg bob"), Inbound::Silent);
    }

    #[test]
    fn test_msgok_is_silent() {
        assert_eq!(parse_line("msgok"), Inbound::Silent);
    }

    #[test]
    fn test_msgerr() {
        assert_eq!(
            event("msgerr recipient offline"),
            Event::MessageError {
                message: "recipient offline".to_string()
            }
        );
    }

    #[test]
    fn test_cmderr() {
        assert_eq!(
            event("cmderr unknown command"),
            Event::CommandError {
                message: "unknown command".to_string()
            }
        );
    }

    #[test]
    fn test_supported_list() {
        assert_eq!(
            event("supported login msg privmsg users help"),
            Event::SupportedCommands {
                commands: vec![
                    "login".to_string(),
                    "msg".to_string(),
                    "privmsg".to_string(),
                    "users".to_string(),
                    "help".to_string(),
                ]
            }
        );
    }

    #[test]
    fn test_unknown_verb() {
        assert_eq!(parse_line("bogus foo bar"), Inbound::Unknown);
    }

    #[test]
    fn test_empty_line_is_silent() {
        assert_eq!(parse_line(""), Inbound::Silent);
        assert_eq!(parse_line("\n"), Inbound::Silent);
    }

    #[test]
    fn test_crlf_stripped() {
        assert_eq!(
            event("loginok welcome\r\n"),
            Event::LoginResult {
                success: true,
                message: "welcome".to_string()
            }
        );
    }

    #[test]
    fn test_command_lines_verbatim() {
        assert_eq!(
            Command::Login {
                username: "alice".to_string()
            }
            .to_line(),
            "login alice\n"
        );
        assert_eq!(
            Command::PublicMessage {
                text: "hi".to_string()
            }
            .to_line(),
            "msg hi\n"
        );
        assert_eq!(
            Command::PrivateMessage {
                recipient: "bob".to_string(),
                text: "see you at 5".to_string()
            }
            .to_line(),
            "privmsg bob see you at 5\n"
        );
        assert_eq!(Command::Users.to_line(), "users\n");
        // Single trailing delimiter, no stray space before it.
        assert_eq!(Command::Help.to_line(), "help\n");
    }
}
