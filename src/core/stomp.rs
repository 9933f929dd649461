//! STOMP 1.2 text framing for the push channel.
//!
//! Only the subset the dashboard speaks is modelled: the client sends
//! CONNECT/SUBSCRIBE/UNSUBSCRIBE/DISCONNECT and receives
//! CONNECTED/MESSAGE/RECEIPT/ERROR. Frames are carried one or more per
//! WebSocket text message; bare end-of-line characters are heart-beats.

use std::fmt;

use crate::core::error::FrameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Connect,
    Connected,
    Subscribe,
    Unsubscribe,
    Disconnect,
    Message,
    Receipt,
    Error,
}

impl Command {
    fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Connected => "CONNECTED",
            Self::Subscribe => "SUBSCRIBE",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Disconnect => "DISCONNECT",
            Self::Message => "MESSAGE",
            Self::Receipt => "RECEIPT",
            Self::Error => "ERROR",
        }
    }

    fn parse(raw: &str) -> Result<Self, FrameError> {
        Ok(match raw {
            "CONNECT" | "STOMP" => Self::Connect,
            "CONNECTED" => Self::Connected,
            "SUBSCRIBE" => Self::Subscribe,
            "UNSUBSCRIBE" => Self::Unsubscribe,
            "DISCONNECT" => Self::Disconnect,
            "MESSAGE" => Self::Message,
            "RECEIPT" => Self::Receipt,
            "ERROR" => Self::Error,
            other => return Err(FrameError::UnknownCommand(other.to_string())),
        })
    }

    /// CONNECT and CONNECTED headers are never escaped.
    fn escapes_headers(self) -> bool {
        !matches!(self, Self::Connect | Self::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One STOMP frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Opening frame; heart-beats are disabled.
    pub fn connect(host: &str) -> Self {
        Self::new(Command::Connect)
            .with_header("accept-version", "1.2")
            .with_header("host", host)
            .with_header("heart-beat", "0,0")
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new(Command::Subscribe)
            .with_header("id", id)
            .with_header("destination", destination)
            .with_header("ack", "auto")
    }

    pub fn unsubscribe(id: &str) -> Self {
        Self::new(Command::Unsubscribe).with_header("id", id)
    }

    pub fn disconnect() -> Self {
        Self::new(Command::Disconnect)
    }

    /// First value of a header; repeated headers keep the first occurrence.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Serialize including the trailing NUL.
    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(32 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Decode every frame in one transport message, skipping heart-beats.
    pub fn decode_all(raw: &str) -> Result<Vec<Frame>, FrameError> {
        let mut pieces: Vec<&str> = raw.split('\0').collect();
        // Everything after the last NUL must be heart-beat padding.
        let tail = pieces.pop().unwrap_or_default();
        if !is_heartbeat(tail) {
            return Err(FrameError::Unterminated);
        }
        pieces
            .into_iter()
            .filter(|piece| !is_heartbeat(piece))
            .map(Self::decode_one)
            .collect()
    }

    fn decode_one(raw: &str) -> Result<Frame, FrameError> {
        let raw = raw.trim_start_matches(['\r', '\n']);
        let (head, body) = match raw.find("\n\n") {
            Some(split) => (&raw[..split], &raw[split + 2..]),
            None => match raw.find("\r\n\r\n") {
                Some(split) => (&raw[..split], &raw[split + 4..]),
                None => (raw, ""),
            },
        };

        let mut lines = head.lines().map(|line| line.trim_end_matches('\r'));
        let command = lines
            .next()
            .filter(|line| !line.is_empty())
            .ok_or(FrameError::MissingCommand)
            .and_then(Command::parse)?;
        let unescape = command.escapes_headers();

        let headers = lines
            .map(|line| {
                let (name, value) = line
                    .split_once(':')
                    .ok_or_else(|| FrameError::MalformedHeader(line.to_string()))?;
                Ok(if unescape {
                    (unescape_header(name), unescape_header(value))
                } else {
                    (name.to_string(), value.to_string())
                })
            })
            .collect::<Result<Vec<_>, FrameError>>()?;

        Ok(Frame {
            command,
            headers,
            body: body.to_string(),
        })
    }
}

fn is_heartbeat(piece: &str) -> bool {
    piece.chars().all(|c| c == '\n' || c == '\r')
}

fn escape_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            Some('\\') => out.push('\\'),
            // Undefined escapes are kept verbatim.
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_subscribe() {
        let frame = Frame::subscribe("sub-3", "/topic/console/alpha");
        assert_eq!(
            frame.encode(),
            "SUBSCRIBE\nid:sub-3\ndestination:/topic/console/alpha\nack:auto\n\n\0"
        );
    }

    #[test]
    fn test_decode_message() {
        let raw = "MESSAGE\ndestination:/topic/status/alpha\nsubscription:sub-0\nmessage-id:7\ncontent-length:6\n\nONLINE\0\n";
        let frames = Frame::decode_all(raw).unwrap();
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.command, Command::Message);
        assert_eq!(frame.header("subscription"), Some("sub-0"));
        assert_eq!(frame.header("destination"), Some("/topic/status/alpha"));
        assert_eq!(frame.body, "ONLINE");
    }

    #[test]
    fn test_decode_skips_heartbeats_and_reads_several_frames() {
        let raw = "\nCONNECTED\nversion:1.2\n\n\0\r\nMESSAGE\nsubscription:sub-1\n\n[Server] Done\0";
        let frames = Frame::decode_all(raw).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].command, Command::Connected);
        assert_eq!(frames[1].body, "[Server] Done");
        assert!(Frame::decode_all("\n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            Frame::decode_all("MESSAGE\n\nbody"),
            Err(FrameError::Unterminated)
        );
        assert_eq!(
            Frame::decode_all("NOPE\n\n\0"),
            Err(FrameError::UnknownCommand("NOPE".into()))
        );
        assert_eq!(
            Frame::decode_all("MESSAGE\nbroken\n\n\0"),
            Err(FrameError::MalformedHeader("broken".into()))
        );
    }

    #[test]
    fn test_header_escaping() {
        let frame = Frame::new(Command::Message).with_header("note", "a:b\nc\\d");
        let encoded = frame.encode();
        assert!(encoded.contains("note:a\\cb\\nc\\\\d\n"));
        let decoded = Frame::decode_all(&encoded).unwrap();
        assert_eq!(decoded[0].header("note"), Some("a:b\nc\\d"));
    }

    #[test]
    fn test_connect_headers_are_not_escaped() {
        let encoded = Frame::connect("localhost:8080").encode();
        assert!(encoded.contains("host:localhost:8080\n"));
    }

    #[test]
    fn test_repeated_header_keeps_first() {
        let frame = Frame::decode_all("MESSAGE\nfoo:1\nfoo:2\n\n\0").unwrap();
        assert_eq!(frame[0].header("foo"), Some("1"));
    }
}
