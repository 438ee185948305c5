//! Line protocol spoken over the whirl control socket.
//!
//! Requests are plain text, one per line (`spin`, `spin wait`, `cancel`,
//! `add <label>`, `remove <index>`, `list`, `status`). Every request gets one
//! JSON-encoded [`Reply`] line back.

use crate::engine::SpinPhase;
use crate::segment::Label;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

pub const SOCKET_PATH: &str = "/tmp/whirl.sock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
enum Verb {
    Spin,
    Cancel,
    Add,
    Remove,
    List,
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// With `wait`, the reply is held back until the spin settles.
    Spin { wait: bool },
    Cancel,
    Add(String),
    Remove(usize),
    List,
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty request")]
    Empty,
    #[error("unknown command '{0}'")]
    UnknownVerb(String),
    #[error("'{verb}' expects {expected}")]
    MissingArgument {
        verb: &'static str,
        expected: &'static str,
    },
    #[error("invalid index '{0}'")]
    InvalidIndex(String),
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

impl FromStr for Request {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map(|(v, r)| (v, r.trim()))
            .unwrap_or((line, ""));
        let verb =
            Verb::from_str(verb).map_err(|_| ProtocolError::UnknownVerb(verb.to_string()))?;

        let no_args = |request: Request| {
            if rest.is_empty() {
                Ok(request)
            } else {
                Err(ProtocolError::UnexpectedArgument(rest.to_string()))
            }
        };

        match verb {
            Verb::Spin if rest.eq_ignore_ascii_case("wait") => Ok(Request::Spin { wait: true }),
            Verb::Spin => no_args(Request::Spin { wait: false }),
            Verb::Cancel => no_args(Request::Cancel),
            Verb::List => no_args(Request::List),
            Verb::Status => no_args(Request::Status),
            Verb::Add if rest.is_empty() => Err(ProtocolError::MissingArgument {
                verb: "add",
                expected: "a label",
            }),
            Verb::Add => Ok(Request::Add(rest.to_string())),
            Verb::Remove if rest.is_empty() => Err(ProtocolError::MissingArgument {
                verb: "remove",
                expected: "an index",
            }),
            Verb::Remove => rest
                .parse()
                .map(Request::Remove)
                .map_err(|_| ProtocolError::InvalidIndex(rest.to_string())),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Spin { wait: true } => write!(f, "{} wait", Verb::Spin),
            Request::Spin { wait: false } => write!(f, "{}", Verb::Spin),
            Request::Cancel => write!(f, "{}", Verb::Cancel),
            Request::Add(label) => write!(f, "{} {}", Verb::Add, label),
            Request::Remove(index) => write!(f, "{} {}", Verb::Remove, index),
            Request::List => write!(f, "{}", Verb::List),
            Request::Status => write!(f, "{}", Verb::Status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Done {
        message: String,
    },
    Entries {
        entries: Vec<Label>,
        stats: String,
    },
    Status {
        phase: SpinPhase,
        angle: f64,
        winner: Option<Label>,
    },
    Winner {
        index: usize,
        label: Label,
    },
    Error {
        message: String,
    },
}

impl Reply {
    pub fn done(message: impl Into<String>) -> Self {
        Reply::Done {
            message: message.into(),
        }
    }

    pub fn error(err: impl fmt::Display) -> Self {
        Reply::Error {
            message: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error { .. })
    }

    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim())
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Done { message } => write!(f, "{}", message),
            Reply::Entries { entries, stats } => {
                for (i, label) in entries.iter().enumerate() {
                    writeln!(f, "{:>3}  {}", i, label)?;
                }
                write!(f, "{}", stats)
            }
            Reply::Status {
                phase,
                angle,
                winner,
            } => {
                write!(f, "{} at {:.3} rad", phase, angle)?;
                match winner {
                    Some(label) => write!(f, ", last winner: {}", label),
                    None => Ok(()),
                }
            }
            Reply::Winner { label, .. } => write!(f, "Winner: {}", label),
            Reply::Error { message } => write!(f, "error: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parsing() {
        let cases = vec![
            ("spin", Request::Spin { wait: false }),
            ("SPIN wait", Request::Spin { wait: true }),
            ("  list ", Request::List),
            ("status", Request::Status),
            ("cancel", Request::Cancel),
            ("add Mary Jane ", Request::Add("Mary Jane".to_string())),
            ("Remove 2", Request::Remove(2)),
        ];

        for (line, expected) in cases {
            assert_eq!(line.parse::<Request>(), Ok(expected.clone()));
            assert_eq!(expected.to_string().parse::<Request>(), Ok(expected));
        }
    }

    #[test]
    fn test_request_errors() {
        assert_eq!("".parse::<Request>(), Err(ProtocolError::Empty));
        assert_eq!(
            "shuffle".parse::<Request>(),
            Err(ProtocolError::UnknownVerb("shuffle".to_string()))
        );
        assert!(matches!(
            "add   ".parse::<Request>(),
            Err(ProtocolError::MissingArgument { verb: "add", .. })
        ));
        assert_eq!(
            "remove -1".parse::<Request>(),
            Err(ProtocolError::InvalidIndex("-1".to_string()))
        );
        assert_eq!(
            "list everything".parse::<Request>(),
            Err(ProtocolError::UnexpectedArgument("everything".to_string()))
        );
    }

    #[test]
    fn test_reply_wire_format() {
        let reply = Reply::Winner {
            index: 1,
            label: Label::new("Bob"),
        };
        let line = reply.to_line().unwrap();
        assert_eq!(line, r#"{"kind":"winner","index":1,"label":"Bob"}"#);
        assert_eq!(Reply::from_line(&line).unwrap(), reply);
        assert_eq!(reply.to_string(), "Winner: Bob");
    }
}
