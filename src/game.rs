//! The game session aggregate: two seats, their fleets and guesses, and the
//! turn machine. All decisions are made against this in-memory state.

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::ai::choose_move;
use crate::board::{Fleet, Guess, GuessOutcome, GuessSet};
use crate::common::{GameError, ShotResult};
use crate::config::BoardRules;
use crate::domain::{Participant, PlayerId, Seat, SessionKey};
use crate::geometry::Cell;
use crate::placement::random_placement;
use crate::ship::{Placement, Ship, ShipKind};
use crate::shot::resolve_shot;
use crate::turn::{GameOutcome, QuitReason, TurnMachine, TurnState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SeatState {
    participant: Participant,
    fleet: Fleet,
    guesses: GuessSet,
}

impl SeatState {
    fn new(participant: Participant) -> Self {
        Self {
            participant,
            fleet: Fleet::new(),
            guesses: GuessSet::new(),
        }
    }
}

/// An accepted shot, as reported to both participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotReport {
    pub shooter: Seat,
    pub cell: Cell,
    pub result: ShotResult,
    /// Set when the shot ended the game.
    pub outcome: Option<GameOutcome>,
}

/// Status of one session, as seen from one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Placing,
    YourTurn,
    OpponentTurn,
    Won,
    Lost,
}

/// Everything one participant may see: its own fleet in full, and of the
/// opponent only what its own guesses revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub session: SessionKey,
    pub rules: BoardRules,
    pub seat: Seat,
    pub phase: Phase,
    pub ready: bool,
    pub opponent_ready: bool,
    pub fleet: Vec<Ship>,
    /// Opponent shots against our fleet.
    pub incoming: Vec<Guess>,
    /// Our shots against the opponent.
    pub outgoing: Vec<Guess>,
    /// Opponent ships we have sunk.
    pub sunk_enemy: Vec<ShipKind>,
}

/// Serializable image of a session, used for write-behind persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub key: SessionKey,
    pub rules: BoardRules,
    seats: [SeatState; 2],
    turn: TurnMachine,
}

/// One game between two participants, or one participant and the automated
/// opponent. Callers serialize access (see `SessionRegistry`).
#[derive(Debug)]
pub struct GameSession {
    key: SessionKey,
    rules: BoardRules,
    seats: [SeatState; 2],
    turn: TurnMachine,
    rng: SmallRng,
}

impl GameSession {
    /// Create a session with `a` in seat A (moves first). With no `b` the
    /// session is a solo game: seat B is the automated opponent, whose fleet
    /// is placed and readied immediately.
    pub fn new(
        key: SessionKey,
        a: PlayerId,
        b: Option<PlayerId>,
        rules: BoardRules,
        mut rng: SmallRng,
    ) -> Result<Self, GameError> {
        let mut seat_b = SeatState::new(match b {
            Some(id) => Participant::Human(id),
            None => Participant::Automated,
        });
        if seat_b.participant == Participant::Automated {
            random_placement(&mut seat_b.fleet, &rules, &mut rng)?;
            seat_b.fleet.lock()?;
        }
        Ok(Self {
            key,
            rules,
            seats: [SeatState::new(Participant::Human(a)), seat_b],
            turn: TurnMachine::new(Seat::A),
            rng,
        })
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn rules(&self) -> &BoardRules {
        &self.rules
    }

    pub fn is_solo(&self) -> bool {
        self.seat(Seat::B).participant == Participant::Automated
    }

    fn seat(&self, seat: Seat) -> &SeatState {
        &self.seats[seat.index()]
    }

    fn seat_mut(&mut self, seat: Seat) -> &mut SeatState {
        &mut self.seats[seat.index()]
    }

    pub fn participant(&self, seat: Seat) -> &Participant {
        &self.seat(seat).participant
    }

    /// Human players of this session, seat A first.
    pub fn players(&self) -> Vec<PlayerId> {
        self.seats
            .iter()
            .filter_map(|s| s.participant.player().cloned())
            .collect()
    }

    pub fn seat_of(&self, player: &PlayerId) -> Result<Seat, GameError> {
        [Seat::A, Seat::B]
            .into_iter()
            .find(|s| self.participant(*s).player() == Some(player))
            .ok_or_else(|| GameError::NotInSession {
                player: player.clone(),
                key: self.key.clone(),
            })
    }

    pub fn fleet(&self, seat: Seat) -> &Fleet {
        &self.seat(seat).fleet
    }

    pub fn guesses(&self, seat: Seat) -> &GuessSet {
        &self.seat(seat).guesses
    }

    pub fn is_ready(&self, seat: Seat) -> bool {
        self.seat(seat).fleet.is_ready()
    }

    pub fn state(&self) -> TurnState {
        self.turn.state()
    }

    pub fn turn_holder(&self) -> Option<Seat> {
        self.turn.holder()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.turn.state() {
            TurnState::GameOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.turn.is_over()
    }

    fn ensure_open(&self) -> Result<(), GameError> {
        if self.is_over() {
            Err(GameError::GameAlreadyOver)
        } else {
            Ok(())
        }
    }

    /// Position one ship of `seat`'s fleet.
    pub fn place_ship(
        &mut self,
        seat: Seat,
        kind: ShipKind,
        placement: Placement,
    ) -> Result<(), GameError> {
        self.ensure_open()?;
        let rules = self.rules;
        self.seat_mut(seat).fleet.place(kind, placement, &rules)
    }

    /// Randomly place `seat`'s whole fleet.
    pub fn auto_place(&mut self, seat: Seat) -> Result<(), GameError> {
        self.ensure_open()?;
        let rules = self.rules;
        let fleet = &mut self.seats[seat.index()].fleet;
        random_placement(fleet, &rules, &mut self.rng)
    }

    /// Lock `seat`'s fleet. Returns `true` when this started the game.
    pub fn ready_up(&mut self, seat: Seat) -> Result<bool, GameError> {
        self.ensure_open()?;
        let fleet = &mut self.seat_mut(seat).fleet;
        if !fleet.is_ready() {
            fleet.lock()?;
        }
        if self.seats.iter().all(|s| s.fleet.is_ready()) {
            Ok(self.turn.start())
        } else {
            Ok(false)
        }
    }

    /// Fire at `cell` on the opponent's board. Rejections leave the session
    /// untouched.
    pub fn submit_shot(&mut self, seat: Seat, cell: Cell) -> Result<ShotReport, GameError> {
        self.turn.authorize_shot(seat)?;
        if !self.rules.contains(cell) {
            return Err(GameError::CellOutOfBounds { cell });
        }
        if self.seat(seat).guesses.contains(cell) {
            return Err(GameError::AlreadyGuessed { cell });
        }

        let target = &mut self.seats[seat.other().index()].fleet;
        let result = resolve_shot(cell, target);
        let defeated = target.is_defeated();
        let outcome = if result.hit {
            GuessOutcome::Hit
        } else {
            GuessOutcome::Miss
        };
        self.seat_mut(seat).guesses.record(cell, outcome)?;
        self.turn.complete_shot(defeated);

        Ok(ShotReport {
            shooter: seat,
            cell,
            result,
            outcome: self.outcome(),
        })
    }

    /// Let the automated opponent play while it holds the turn. Each move is
    /// returned in order. When every cell has been guessed it yields the
    /// turn instead.
    pub fn play_automated(&mut self) -> Vec<ShotReport> {
        let mut reports = Vec::new();
        while let Some(seat) = self.turn.holder() {
            if self.participant(seat) != &Participant::Automated {
                break;
            }
            let guessed = self.seats[seat.index()].guesses.cells();
            match choose_move(guessed, &self.rules, &mut self.rng) {
                Some(cell) => match self.submit_shot(seat, cell) {
                    Ok(report) => reports.push(report),
                    Err(e) => {
                        log::warn!("[{}] automated move {} rejected: {}", self.key, cell, e);
                        self.turn.pass();
                    }
                },
                None => {
                    log::warn!("[{}] automated opponent has no cells left", self.key);
                    self.turn.pass();
                }
            }
        }
        reports
    }

    /// End the game on behalf of `seat`.
    pub fn quit(&mut self, seat: Seat, reason: QuitReason) -> GameOutcome {
        self.turn.quit(seat, reason)
    }

    pub fn phase(&self, seat: Seat) -> Phase {
        match self.turn.state() {
            TurnState::AwaitingReady => Phase::Placing,
            TurnState::Turn(holder) if holder == seat => Phase::YourTurn,
            TurnState::Turn(_) => Phase::OpponentTurn,
            TurnState::GameOver(outcome) if outcome.winner() == seat => Phase::Won,
            TurnState::GameOver(_) => Phase::Lost,
        }
    }

    pub fn view(&self, seat: Seat) -> GameView {
        let own = self.seat(seat);
        let opponent = self.seat(seat.other());
        GameView {
            session: self.key.clone(),
            rules: self.rules,
            seat,
            phase: self.phase(seat),
            ready: own.fleet.is_ready(),
            opponent_ready: opponent.fleet.is_ready(),
            fleet: own.fleet.ships().to_vec(),
            incoming: opponent.guesses.guesses().to_vec(),
            outgoing: own.guesses.guesses().to_vec(),
            sunk_enemy: opponent.fleet.sunk(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            key: self.key.clone(),
            rules: self.rules,
            seats: self.seats.clone(),
            turn: self.turn,
        }
    }

    pub fn from_snapshot(snapshot: SessionSnapshot, rng: SmallRng) -> Self {
        Self {
            key: snapshot.key,
            rules: snapshot.rules,
            seats: snapshot.seats,
            turn: snapshot.turn,
            rng,
        }
    }
}
