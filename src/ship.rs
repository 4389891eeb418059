//! Ship definitions: the fixed ship classes, their placement and hit tracking.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::common::GameError;
use crate::geometry::{occupied_cells, Cell, Orientation};

/// Ship classes of the standard fleet. The class name is unique within a
/// fleet and doubles as the ship's identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShipKind {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipKind {
    pub const fn name(self) -> &'static str {
        match self {
            ShipKind::Carrier => "Carrier",
            ShipKind::Battleship => "Battleship",
            ShipKind::Cruiser => "Cruiser",
            ShipKind::Submarine => "Submarine",
            ShipKind::Destroyer => "Destroyer",
        }
    }

    pub const fn length(self) -> u8 {
        match self {
            ShipKind::Carrier => 5,
            ShipKind::Battleship => 4,
            ShipKind::Cruiser | ShipKind::Submarine => 3,
            ShipKind::Destroyer => 2,
        }
    }
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShipKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::config::FLEET
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GameError::UnknownShip {
                name: s.to_string(),
            })
    }
}

/// Anchor cell and orientation of a placed hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub anchor: Cell,
    pub orientation: Orientation,
}

impl Placement {
    pub const fn new(anchor: Cell, orientation: Orientation) -> Self {
        Self {
            anchor,
            orientation,
        }
    }

    pub fn horizontal(x: u8, y: u8) -> Self {
        Self::new(Cell::new(x, y), Orientation::Horizontal)
    }

    pub fn vertical(x: u8, y: u8) -> Self {
        Self::new(Cell::new(x, y), Orientation::Vertical)
    }

    /// Cells a hull of `length` covers at this placement.
    pub fn cells(&self, length: u8) -> Vec<Cell> {
        occupied_cells(self.anchor, length, self.orientation)
    }
}

/// A ship of one fleet. Unplaced until the owner (or random placement)
/// positions it; `hits` only ever holds occupied cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    kind: ShipKind,
    placement: Option<Placement>,
    hits: BTreeSet<Cell>,
}

impl Ship {
    pub fn new(kind: ShipKind) -> Self {
        Self {
            kind,
            placement: None,
            hits: BTreeSet::new(),
        }
    }

    pub fn kind(&self) -> ShipKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn length(&self) -> u8 {
        self.kind.length()
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }

    /// Occupied cells; empty while unplaced.
    pub fn cells(&self) -> Vec<Cell> {
        self.placement
            .map(|p| p.cells(self.length()))
            .unwrap_or_default()
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.cells().contains(&cell)
    }

    pub fn hits(&self) -> &BTreeSet<Cell> {
        &self.hits
    }

    /// Record a hit at `cell`. Returns `true` if the cell belongs to this
    /// hull; recording the same cell twice is a no-op.
    pub fn register_hit(&mut self, cell: Cell) -> bool {
        if self.occupies(cell) {
            self.hits.insert(cell);
            true
        } else {
            false
        }
    }

    /// Sunk once every occupied cell has been hit.
    pub fn is_sunk(&self) -> bool {
        let cells = self.cells();
        !cells.is_empty() && cells.iter().all(|c| self.hits.contains(c))
    }

    pub(crate) fn set_placement(&mut self, placement: Option<Placement>) {
        self.placement = placement;
        self.hits.clear();
    }
}
