use core::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::RulesError;
use crate::geometry::{in_bounds, Cell};
use crate::ship::ShipKind;

pub const DEFAULT_GRID_SIZE: u8 = 10;
pub const DEFAULT_MARGIN: u8 = 0;
pub const DEFAULT_ADJACENCY_REQUIRED: bool = true;

pub const NUM_SHIPS: usize = 5;
pub const FLEET: [ShipKind; NUM_SHIPS] = [
    ShipKind::Carrier,
    ShipKind::Battleship,
    ShipKind::Cruiser,
    ShipKind::Submarine,
    ShipKind::Destroyer,
];

/// Total number of hull cells in the standard fleet.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Random samples allowed per ship before random placement gives up.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1_000;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_CHALLENGE_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Board rules shared by placement, shot validation and the automated
/// opponent. One value per session; never mixed within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRules {
    /// Edge length of the square grid.
    pub grid_size: u8,
    /// Offset of the first row/column.
    pub board_margin: u8,
    /// Whether ships must keep a one-cell buffer (diagonals included).
    pub adjacency_required: bool,
}

impl Default for BoardRules {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            board_margin: DEFAULT_MARGIN,
            adjacency_required: DEFAULT_ADJACENCY_REQUIRED,
        }
    }
}

impl BoardRules {
    /// Checked constructor. Every cell of the board, margin included, must
    /// fit in a `u8` coordinate.
    pub fn new(
        grid_size: u8,
        board_margin: u8,
        adjacency_required: bool,
    ) -> Result<Self, RulesError> {
        let rules = Self {
            grid_size,
            board_margin,
            adjacency_required,
        };
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.grid_size == 0 {
            return Err(RulesError::EmptyGrid);
        }
        if u16::from(self.board_margin) + u16::from(self.grid_size) > u16::from(u8::MAX) {
            return Err(RulesError::OutOfRange {
                grid_size: self.grid_size,
                margin: self.board_margin,
            });
        }
        Ok(())
    }

    pub fn contains(&self, cell: Cell) -> bool {
        in_bounds(cell, self.grid_size, self.board_margin)
    }

    /// Every cell on the board, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let lo = self.board_margin;
        let hi = lo.saturating_add(self.grid_size);
        (lo..hi).flat_map(move |y| (lo..hi).map(move |x| Cell::new(x, y)))
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size as usize * self.grid_size as usize
    }

    /// Parse either the canonical `"x,y"` id or letter notation such as
    /// `"A0"` (column letter and row index, both relative to the margin).
    pub fn parse_cell(&self, input: &str) -> Option<Cell> {
        let input = input.trim();
        if input.contains(',') {
            return input.parse().ok();
        }
        let mut chars = input.chars();
        let col = chars.next()?.to_ascii_uppercase();
        if !col.is_ascii_uppercase() {
            return None;
        }
        let row: u8 = chars.as_str().parse().ok()?;
        let x = (col as u8 - b'A').checked_add(self.board_margin)?;
        let y = row.checked_add(self.board_margin)?;
        Some(Cell::new(x, y))
    }

    /// Letter notation for a cell on this board.
    pub fn notation(&self, cell: Cell) -> String {
        let col = cell.x.saturating_sub(self.board_margin);
        let row = cell.y.saturating_sub(self.board_margin);
        if col < 26 {
            format!("{}{}", (b'A' + col) as char, row)
        } else {
            cell.to_string()
        }
    }
}

impl fmt::Display for BoardRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{n}x{n} grid, margin {}, adjacency {}",
            self.board_margin,
            if self.adjacency_required { "enforced" } else { "allowed" },
            n = self.grid_size,
        )
    }
}

/// Runtime settings for the `serve` command.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub rules: BoardRules,
    pub challenge_ttl: Duration,
    pub idle_timeout: Duration,
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            rules: BoardRules::default(),
            challenge_ttl: DEFAULT_CHALLENGE_TTL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            seed: None,
        }
    }
}
