//! Plain-text rendering of a player's view.

use std::collections::HashMap;
use std::fmt::Write;

use crate::board::{Guess, GuessOutcome};
use crate::config::BoardRules;
use crate::game::{GameView, Phase};
use crate::geometry::Cell;

fn render_grid(rules: &BoardRules, title: &str, mark: impl Fn(Cell) -> char) -> String {
    let mut out = String::new();
    let lo = rules.board_margin;
    let _ = writeln!(out, "  {}", title);
    out.push_str("    ");
    for col in 0..rules.grid_size {
        let label = if col < 26 { (b'A' + col) as char } else { '?' };
        let _ = write!(out, " {}", label);
    }
    out.push('\n');
    for row in 0..rules.grid_size {
        let _ = write!(out, "  {:2}", row);
        for col in 0..rules.grid_size {
            let cell = Cell::new(lo.saturating_add(col), lo.saturating_add(row));
            let _ = write!(out, " {}", mark(cell));
        }
        out.push('\n');
    }
    out
}

fn outcomes(guesses: &[Guess]) -> HashMap<Cell, GuessOutcome> {
    guesses.iter().map(|g| (g.cell, g.outcome)).collect()
}

/// Own fleet (ship initials, `X` hit, `o` miss) followed by the target board.
pub fn render_view(view: &GameView) -> String {
    let ships: HashMap<Cell, char> = view
        .fleet
        .iter()
        .flat_map(|s| {
            let initial = s.name().chars().next().unwrap_or('S');
            s.cells().into_iter().map(move |c| (c, initial))
        })
        .collect();
    let incoming = outcomes(&view.incoming);
    let outgoing = outcomes(&view.outgoing);

    let mut out = String::new();
    let _ = writeln!(out, "Session {}: {}", view.session, phase_label(view.phase));
    out.push_str(&render_grid(&view.rules, "Your fleet", |cell| {
        match (incoming.get(&cell), ships.get(&cell)) {
            (Some(GuessOutcome::Hit), _) => 'X',
            (Some(GuessOutcome::Miss), _) => 'o',
            (None, Some(initial)) => *initial,
            (None, None) => '.',
        }
    }));
    out.push_str(&render_grid(&view.rules, "Target", |cell| match outgoing.get(&cell) {
        Some(GuessOutcome::Hit) => 'X',
        Some(GuessOutcome::Miss) => 'o',
        None => '.',
    }));
    if !view.sunk_enemy.is_empty() {
        let names: Vec<&str> = view.sunk_enemy.iter().map(|k| k.name()).collect();
        let _ = writeln!(out, "  Sunk: {}", names.join(", "));
    }
    out
}

pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Placing => "placing ships",
        Phase::YourTurn => "your turn",
        Phase::OpponentTurn => "opponent's turn",
        Phase::Won => "you won",
        Phase::Lost => "you lost",
    }
}
