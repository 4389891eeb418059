//! Turn order for one session.

use serde::{Deserialize, Serialize};

use crate::common::GameError;
use crate::domain::Seat;

/// Why a game ended without a winner by sinking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuitReason {
    Requested,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// The seat sank the whole opposing fleet.
    Winner(Seat),
    /// The seat left the game.
    Quit { by: Seat, reason: QuitReason },
}

impl GameOutcome {
    /// Seat credited with the win. A quit hands the game to the other side.
    pub fn winner(self) -> Seat {
        match self {
            GameOutcome::Winner(seat) => seat,
            GameOutcome::Quit { by, .. } => by.other(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    AwaitingReady,
    Turn(Seat),
    GameOver(GameOutcome),
}

/// Owns whose turn it is. Rejected requests leave the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMachine {
    first: Seat,
    state: TurnState,
}

impl TurnMachine {
    pub fn new(first: Seat) -> Self {
        Self {
            first,
            state: TurnState::AwaitingReady,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn first(&self) -> Seat {
        self.first
    }

    pub fn holder(&self) -> Option<Seat> {
        match self.state {
            TurnState::Turn(seat) => Some(seat),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, TurnState::GameOver(_))
    }

    /// Both fleets are ready: hand the turn to the first mover. No-op once
    /// the game has begun.
    pub fn start(&mut self) -> bool {
        if self.state == TurnState::AwaitingReady {
            self.state = TurnState::Turn(self.first);
            true
        } else {
            false
        }
    }

    /// Check that `seat` may shoot now.
    pub fn authorize_shot(&self, seat: Seat) -> Result<(), GameError> {
        match self.state {
            TurnState::AwaitingReady => Err(GameError::GameNotStarted),
            TurnState::GameOver(_) => Err(GameError::GameAlreadyOver),
            TurnState::Turn(holder) if holder != seat => Err(GameError::NotYourTurn),
            TurnState::Turn(_) => Ok(()),
        }
    }

    /// Apply an accepted shot by the turn holder.
    pub fn complete_shot(&mut self, defeated: bool) {
        if let TurnState::Turn(holder) = self.state {
            self.state = if defeated {
                TurnState::GameOver(GameOutcome::Winner(holder))
            } else {
                TurnState::Turn(holder.other())
            };
        }
    }

    /// Give the turn away without shooting.
    pub fn pass(&mut self) {
        if let TurnState::Turn(holder) = self.state {
            self.state = TurnState::Turn(holder.other());
        }
    }

    /// End the game from any state. The first terminal outcome sticks.
    pub fn quit(&mut self, by: Seat, reason: QuitReason) -> GameOutcome {
        match self.state {
            TurnState::GameOver(outcome) => outcome,
            _ => {
                let outcome = GameOutcome::Quit { by, reason };
                self.state = TurnState::GameOver(outcome);
                outcome
            }
        }
    }
}
