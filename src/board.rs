//! Per-player board state: the fleet and the guesses made against the
//! opponent.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::common::GameError;
use crate::config::{BoardRules, FLEET};
use crate::geometry::Cell;
use crate::placement::validate_placement;
use crate::ship::{Placement, Ship, ShipKind};

/// The five ships one player owns in one session, in [`FLEET`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    ships: Vec<Ship>,
    ready: bool,
}

impl Default for Fleet {
    fn default() -> Self {
        Self::new()
    }
}

impl Fleet {
    /// A fleet with every ship unplaced.
    pub fn new() -> Self {
        Self {
            ships: FLEET.into_iter().map(Ship::new).collect(),
            ready: false,
        }
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship(&self, kind: ShipKind) -> &Ship {
        // every fleet holds each kind exactly once
        &self.ships[Self::index_of(kind)]
    }

    fn index_of(kind: ShipKind) -> usize {
        FLEET.iter().position(|k| *k == kind).unwrap_or_default()
    }

    /// Occupied cells of every placed ship except `kind`.
    pub fn occupied_except(&self, kind: ShipKind) -> HashSet<Cell> {
        self.ships
            .iter()
            .filter(|s| s.kind() != kind)
            .flat_map(Ship::cells)
            .collect()
    }

    /// Occupied cells of every placed ship.
    pub fn occupied(&self) -> HashSet<Cell> {
        self.ships.iter().flat_map(Ship::cells).collect()
    }

    /// Position (or reposition) one ship. Fails once the fleet is ready.
    pub fn place(
        &mut self,
        kind: ShipKind,
        placement: Placement,
        rules: &BoardRules,
    ) -> Result<(), GameError> {
        if self.ready {
            return Err(GameError::FleetLocked);
        }
        let others = self.occupied_except(kind);
        validate_placement(placement, kind.length(), &others, rules)
            .map_err(|reason| GameError::InvalidPlacement { ship: kind, reason })?;
        self.ships[Self::index_of(kind)].set_placement(Some(placement));
        Ok(())
    }

    /// Take a ship back off the board.
    pub fn unplace(&mut self, kind: ShipKind) -> Result<(), GameError> {
        if self.ready {
            return Err(GameError::FleetLocked);
        }
        self.ships[Self::index_of(kind)].set_placement(None);
        Ok(())
    }

    /// Remove every ship from the board.
    pub(crate) fn clear(&mut self) {
        for ship in &mut self.ships {
            ship.set_placement(None);
        }
    }

    pub fn unplaced(&self) -> usize {
        self.ships.iter().filter(|s| !s.is_placed()).count()
    }

    pub fn all_placed(&self) -> bool {
        self.unplaced() == 0
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Freeze the placements. Every ship must be on the board.
    pub fn lock(&mut self) -> Result<(), GameError> {
        let unplaced = self.unplaced();
        if unplaced > 0 {
            return Err(GameError::FleetIncomplete { unplaced });
        }
        self.ready = true;
        Ok(())
    }

    /// Ship whose hull covers `cell`.
    pub fn ship_at_mut(&mut self, cell: Cell) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.occupies(cell))
    }

    pub fn sunk(&self) -> Vec<ShipKind> {
        self.ships
            .iter()
            .filter(|s| s.is_sunk())
            .map(Ship::kind)
            .collect()
    }

    /// Every ship sunk.
    pub fn is_defeated(&self) -> bool {
        self.ships.iter().all(Ship::is_sunk)
    }
}

/// Result recorded for a guessed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessOutcome {
    Hit,
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    pub cell: Cell,
    pub outcome: GuessOutcome,
}

/// Guesses one player made, in the order they were played. A cell appears
/// at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Guess>", into = "Vec<Guess>")]
pub struct GuessSet {
    order: Vec<Guess>,
    seen: HashSet<Cell>,
}

impl GuessSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.seen.contains(&cell)
    }

    pub fn record(&mut self, cell: Cell, outcome: GuessOutcome) -> Result<(), GameError> {
        if !self.seen.insert(cell) {
            return Err(GameError::AlreadyGuessed { cell });
        }
        self.order.push(Guess { cell, outcome });
        Ok(())
    }

    pub fn cells(&self) -> &HashSet<Cell> {
        &self.seen
    }

    pub fn guesses(&self) -> &[Guess] {
        &self.order
    }

    pub fn outcome(&self, cell: Cell) -> Option<GuessOutcome> {
        self.order
            .iter()
            .find(|g| g.cell == cell)
            .map(|g| g.outcome)
    }

    pub fn hits(&self) -> usize {
        self.order
            .iter()
            .filter(|g| g.outcome == GuessOutcome::Hit)
            .count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Rebuild from a serialized list. A repeated cell means the data is
/// corrupt and is rejected.
impl TryFrom<Vec<Guess>> for GuessSet {
    type Error = GameError;

    fn try_from(guesses: Vec<Guess>) -> Result<Self, Self::Error> {
        let mut set = GuessSet::new();
        for g in guesses {
            set.record(g.cell, g.outcome)?;
        }
        Ok(set)
    }
}

impl From<GuessSet> for Vec<Guess> {
    fn from(set: GuessSet) -> Self {
        set.order
    }
}
