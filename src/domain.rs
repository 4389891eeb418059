//! Identities shared across the lobby, sessions and the wire protocol.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Durable player identity, as issued by the external identity service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Transient id of one transport connection. A player keeps its
/// `PlayerId` across reconnects; the connection id changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Opaque name of one game session.
///
/// Derived keys escape `%`, `-` and `:` inside player ids, so a match key
/// holds exactly one raw `-` and a solo key exactly one raw `:`. Distinct
/// pairings therefore never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey(pub String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for a challenge game; the acceptor is named first.
    pub fn for_match(acceptor: &PlayerId, challenger: &PlayerId) -> Self {
        Self(format!("{}-{}", escape(acceptor), escape(challenger)))
    }

    /// Key for a solo game against the automated opponent.
    pub fn for_solo(player: &PlayerId) -> Self {
        Self(format!("solo:{}", escape(player)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn escape(player: &PlayerId) -> String {
    let mut out = String::with_capacity(player.0.len());
    for c in player.0.chars() {
        match c {
            '%' => out.push_str("%25"),
            '-' => out.push_str("%2D"),
            ':' => out.push_str("%3A"),
            c => out.push(c),
        }
    }
    out
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the identity service reports for a connected participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: PlayerId,
    pub display_name: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(id),
            display_name: display_name.into(),
        }
    }
}

/// One of the two sides of a session. Seat `A` moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    A,
    B,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::A => Seat::B,
            Seat::B => Seat::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::A => 0,
            Seat::B => 1,
        }
    }
}

/// Who occupies a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Participant {
    Human(PlayerId),
    Automated,
}

impl Participant {
    pub fn player(&self) -> Option<&PlayerId> {
        match self {
            Participant::Human(id) => Some(id),
            Participant::Automated => None,
        }
    }
}
