//! JSON line protocol for driving a session without a terminal.
//!
//! Every request is one line such as `{"key":"left"}`; every reply is one JSON
//! line. Unknown keys, and objects without a usable `key`, are accepted and
//! ignored.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::input::Direction;
use crate::session::{Command, Session, SessionError};
use crate::snapshot::{Snapshot, StateSummary};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKey {
    Left,
    Right,
    Up,
    Down,
    Restart,
    State,
    Frame,
    Quit,
    #[serde(other)]
    Unknown,
}

/// A request object. `key` is kept raw so a missing or non-string key is
/// ignored rather than rejected.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct InputRequest {
    #[serde(default)]
    pub key: serde_json::Value,
}

impl InputRequest {
    #[must_use]
    pub fn remote_key(&self) -> RemoteKey {
        RemoteKey::deserialize(&self.key).unwrap_or(RemoteKey::Unknown)
    }
}

/// What the line loop should do for one request.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Request {
    Command(Command),
    State,
    Frame,
    Quit,
    Ignore,
}

/// One reply line.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Ack { ok: bool },
    Error { ok: bool, error: String },
    State(StateSummary),
    Frame(Box<Snapshot>),
}

impl Reply {
    #[must_use]
    pub fn ok() -> Self {
        Self::Ack { ok: true }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            ok: false,
            error: message.into(),
        }
    }
}

impl From<RemoteKey> for Request {
    fn from(key: RemoteKey) -> Self {
        match key {
            RemoteKey::Left => Self::Command(Command::Turn(Direction::Left)),
            RemoteKey::Right => Self::Command(Command::Turn(Direction::Right)),
            RemoteKey::Up => Self::Command(Command::Turn(Direction::Up)),
            RemoteKey::Down => Self::Command(Command::Turn(Direction::Down)),
            RemoteKey::Restart => Self::Command(Command::Restart),
            RemoteKey::State => Self::State,
            RemoteKey::Frame => Self::Frame,
            RemoteKey::Quit => Self::Quit,
            RemoteKey::Unknown => Self::Ignore,
        }
    }
}

/// Parses one request line. Blank lines are ignored.
pub fn parse_request(line: &str) -> Result<Request, serde_json::Error> {
    if line.trim().is_empty() {
        return Ok(Request::Ignore);
    }

    let request: InputRequest = serde_json::from_str(line)?;
    Ok(request.remote_key().into())
}

/// Handles one request line against a running session.
///
/// Returns `None` when the line asks the loop to stop. Lines that do not parse
/// get an error reply; only a stopped worker is an error.
pub fn handle_line(session: &Session, line: &str) -> Result<Option<Reply>, SessionError> {
    let request = match parse_request(line) {
        Ok(request) => request,
        Err(error) => {
            warn!("rejected input line {line:?}: {error}");
            return Ok(Some(Reply::error(error.to_string())));
        }
    };

    let reply = match request {
        Request::Command(command) => {
            session.send(command)?;
            Reply::ok()
        }
        Request::State => session
            .latest()
            .map_or_else(no_frame, |frame| Reply::State(frame.summary())),
        Request::Frame => session
            .latest()
            .map_or_else(no_frame, |frame| Reply::Frame(Box::new(Snapshot::clone(&frame)))),
        Request::Ignore => Reply::ok(),
        Request::Quit => return Ok(None),
    };
    Ok(Some(reply))
}

fn no_frame() -> Reply {
    Reply::error("no frame published yet")
}

/// Serializes a reply as a single line without the trailing newline.
pub fn encode_reply(reply: &Reply) -> Result<String, serde_json::Error> {
    serde_json::to_string(reply)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::EngineConfig;
    use crate::engine::GameCore;
    use crate::input::Direction;
    use crate::session::{Command, Pace, Session};

    use super::{Reply, Request, encode_reply, handle_line, parse_request};

    fn idle_session() -> Session {
        let core = GameCore::with_seed(EngineConfig::default(), 4).expect("valid config");
        Session::spawn_with_pace(core, Pace::Fixed(Duration::from_secs(60)))
    }

    fn encoded(reply: Option<Reply>) -> String {
        encode_reply(&reply.expect("loop continues")).expect("encodes")
    }

    #[test]
    fn direction_keys_become_turn_commands() {
        assert_eq!(
            parse_request(r#"{"key":"left"}"#).expect("valid line"),
            Request::Command(Command::Turn(Direction::Left))
        );
        assert_eq!(
            parse_request(r#"{"key":"restart"}"#).expect("valid line"),
            Request::Command(Command::Restart)
        );
        assert_eq!(
            parse_request(r#"{"key":"state"}"#).expect("valid line"),
            Request::State
        );
    }

    #[test]
    fn unknown_keys_and_blank_lines_are_ignored() {
        assert_eq!(
            parse_request(r#"{"key":"jump"}"#).expect("unknown key is accepted"),
            Request::Ignore
        );
        assert_eq!(parse_request("   ").expect("blank line"), Request::Ignore);
    }

    #[test]
    fn objects_without_a_string_key_are_ignored() {
        for line in [r#"{}"#, r#"{"key":5}"#, r#"{"key":null}"#, r#"{"direction":"left"}"#] {
            assert_eq!(
                parse_request(line).expect("object is accepted"),
                Request::Ignore,
                "{line}"
            );
        }
    }

    #[test]
    fn malformed_lines_are_errors() {
        assert!(parse_request("left").is_err());
        assert!(parse_request(r#"{"key":"left""#).is_err());
        assert!(parse_request(r#""left""#).is_err());
    }

    #[test]
    fn handled_lines_drive_the_session_and_reply() {
        let session = idle_session();

        assert_eq!(
            encoded(handle_line(&session, r#"{"key":"left"}"#).expect("worker is running")),
            r#"{"ok":true}"#
        );
        assert_eq!(
            encoded(handle_line(&session, "{}").expect("worker is running")),
            r#"{"ok":true}"#
        );
        assert_eq!(
            encoded(handle_line(&session, r#"{"key":"state"}"#).expect("worker is running")),
            r#"{"score":0,"game_over":false}"#
        );

        let Some(Reply::Frame(frame)) =
            handle_line(&session, r#"{"key":"frame"}"#).expect("worker is running")
        else {
            panic!("frame request returns a frame");
        };
        assert_eq!(frame.snake.len(), 1);
        assert!(!frame.game_over);

        let rejected = encoded(handle_line(&session, "not json").expect("worker is running"));
        assert!(rejected.starts_with(r#"{"ok":false,"error":"#), "{rejected}");

        assert!(
            handle_line(&session, r#"{"key":"quit"}"#)
                .expect("worker is running")
                .is_none()
        );
    }

    #[test]
    fn replies_encode_as_flat_json() {
        let core = GameCore::with_seed(EngineConfig::default(), 1).expect("valid config");

        assert_eq!(encode_reply(&Reply::ok()).expect("encodes"), r#"{"ok":true}"#);
        assert_eq!(
            encode_reply(&Reply::State(core.get_state())).expect("encodes"),
            r#"{"score":0,"game_over":false}"#
        );

        let error = encode_reply(&Reply::error("bad line")).expect("encodes");
        assert_eq!(error, r#"{"ok":false,"error":"bad line"}"#);
    }
}
