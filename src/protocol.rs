use serde::{Deserialize, Serialize};

use crate::common::{GameError, ShotResult};
use crate::domain::*;
use crate::game::GameView;
use crate::geometry::Cell;
use crate::ship::{Placement, ShipKind};
use crate::turn::GameOutcome;

/// Current protocol version. Peers must agree on it during the handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// Requests a client sends to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientIntent {
    PlaceShip {
        session: SessionKey,
        ship: ShipKind,
        placement: Placement,
    },
    /// Randomly place the whole fleet.
    AutoPlace { session: SessionKey },
    ReadyUp { session: SessionKey },
    SubmitShot { session: SessionKey, cell: Cell },
    Quit { session: SessionKey },
    Challenge { to: PlayerId },
    /// Accept a pending challenge issued by `from`.
    AcceptChallenge { from: PlayerId },
    RejectChallenge { from: PlayerId },
    /// Start a game against the automated opponent.
    StartSolo,
}

/// Why a challenge did not turn into a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    Declined,
    TimedOut,
    /// The other player went offline.
    Disconnected,
    /// The other player started a different game.
    Unavailable,
}

/// State changes the coordinator pushes to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerEvent {
    /// The recipient's view after a placement or readiness change.
    UpdateGameState(GameView),
    /// Both fleets are ready; `first` holds the turn.
    StartGame { session: SessionKey, first: Seat },
    /// A shot was resolved.
    UpdateBoard {
        session: SessionKey,
        shooter: Seat,
        cell: Cell,
        result: ShotResult,
        next_turn: Option<Seat>,
    },
    GameOver {
        session: SessionKey,
        outcome: GameOutcome,
        winner: Option<PlayerId>,
    },
    ChallengeReceived { from: Identity },
    ChallengeAccepted { session: SessionKey, seat: Seat },
    /// A challenge the recipient sent or received is off; `by` is the
    /// other player.
    ChallengeRejected { by: PlayerId, reason: RejectionReason },
    /// Who the recipient is playing against; `None` for the automated
    /// opponent.
    HasOpponent {
        session: SessionKey,
        opponent: Option<Identity>,
    },
}

/// Frames exchanged over a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Client handshake carrying the identity issued by the identity service.
    Hello { version: u32, identity: Identity },
    /// Server handshake reply.
    Welcome {
        version: u32,
        connection: ConnectionId,
        rules: crate::config::BoardRules,
    },
    Intent(ClientIntent),
    Event(ServerEvent),
    /// A request was refused; sent to the requesting client only.
    Rejected(GameError),
    ListPlayers,
    /// Connected players that are free to be challenged.
    Players(Vec<Identity>),
    Heartbeat,
}
