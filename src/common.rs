//! Common types: the error taxonomy and shot results.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, SessionKey};
use crate::geometry::Cell;
use crate::ship::ShipKind;

/// Outcome of resolving one shot against a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotResult {
    pub hit: bool,
    /// The hit ship is now sunk.
    pub sunk: bool,
    /// Ship that was hit, if any.
    pub ship: Option<ShipKind>,
}

impl ShotResult {
    pub const MISS: ShotResult = ShotResult {
        hit: false,
        sunk: false,
        ship: None,
    };
}

/// Why a proposed placement is illegal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementViolation {
    OutOfBounds,
    Overlap,
    Adjacent,
}

impl fmt::Display for PlacementViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementViolation::OutOfBounds => f.write_str("ship leaves the board"),
            PlacementViolation::Overlap => f.write_str("ship overlaps another ship"),
            PlacementViolation::Adjacent => f.write_str("ship touches another ship"),
        }
    }
}

/// Errors reported by the coordinator. All of them are recoverable from the
/// point of view of the session and are reported to the offending client
/// only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("invalid placement of {ship}: {reason}")]
    InvalidPlacement {
        ship: ShipKind,
        reason: PlacementViolation,
    },

    #[error("not your turn")]
    NotYourTurn,

    #[error("cell {cell} was already guessed")]
    AlreadyGuessed { cell: Cell },

    #[error("cell {cell} is outside the board")]
    CellOutOfBounds { cell: Cell },

    #[error("session {key} already exists")]
    DuplicateSession { key: SessionKey },

    #[error("session {key} not found")]
    SessionNotFound { key: SessionKey },

    #[error("could not place {ship} after {attempts} attempts")]
    PlacementExhausted { ship: ShipKind, attempts: u32 },

    #[error("unknown ship '{name}'")]
    UnknownShip { name: String },

    #[error("fleet is locked after ready-up")]
    FleetLocked,

    #[error("{unplaced} ship(s) still unplaced")]
    FleetIncomplete { unplaced: usize },

    #[error("game has not started")]
    GameNotStarted,

    #[error("game is already over")]
    GameAlreadyOver,

    #[error("player {player} is not part of session {key}")]
    NotInSession { player: PlayerId, key: SessionKey },

    #[error("player {player} is not available")]
    PlayerUnavailable { player: PlayerId },

    #[error("no pending challenge from {challenger}")]
    NoPendingChallenge { challenger: PlayerId },

    #[error("cannot challenge yourself")]
    SelfChallenge,
}

/// Board dimensions that cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("grid size must be at least 1")]
    EmptyGrid,

    #[error(
        "margin {margin} + grid size {grid_size} exceeds the largest coordinate ({max})",
        max = u8::MAX
    )]
    OutOfRange { grid_size: u8, margin: u8 },
}
