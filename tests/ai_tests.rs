use std::collections::HashSet;

use battleship_lobby::{choose_move, BoardRules, Cell};
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[test]
fn test_covers_every_cell_exactly_once() {
    let rules = BoardRules::default();
    let mut rng = SmallRng::seed_from_u64(42);
    let mut guessed = HashSet::new();
    let mut order = Vec::new();
    while let Some(cell) = choose_move(&guessed, &rules, &mut rng) {
        assert!(rules.contains(cell));
        assert!(guessed.insert(cell), "repeated {}", cell);
        order.push(cell);
    }
    assert_eq!(order.len(), 100);
    assert_eq!(guessed.len(), 100);
}

#[test]
fn test_exhausted_board_yields_none() {
    let rules = BoardRules {
        grid_size: 3,
        board_margin: 2,
        ..BoardRules::default()
    };
    let guessed: HashSet<Cell> = rules.cells().collect();
    let mut rng = SmallRng::seed_from_u64(1);
    assert_eq!(choose_move(&guessed, &rules, &mut rng), None);
}

#[test]
fn test_only_remaining_cell_is_chosen() {
    let rules = BoardRules::default();
    let mut guessed: HashSet<Cell> = rules.cells().collect();
    guessed.remove(&Cell::new(6, 2));
    let mut rng = SmallRng::seed_from_u64(9);
    assert_eq!(choose_move(&guessed, &rules, &mut rng), Some(Cell::new(6, 2)));
}

#[test]
fn test_moves_stay_inside_margin() {
    let rules = BoardRules {
        board_margin: 1,
        ..BoardRules::default()
    };
    let mut rng = SmallRng::seed_from_u64(5);
    let mut guessed = HashSet::new();
    while let Some(cell) = choose_move(&guessed, &rules, &mut rng) {
        assert!(cell.x >= 1 && cell.y >= 1 && cell.x <= 10 && cell.y <= 10);
        guessed.insert(cell);
    }
    assert_eq!(guessed.len(), rules.cell_count());
}

#[test]
fn test_same_seed_same_moves() {
    let rules = BoardRules::default();
    let run = |seed| {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut guessed = HashSet::new();
        let mut order = Vec::new();
        for _ in 0..10 {
            let cell = choose_move(&guessed, &rules, &mut rng).unwrap();
            guessed.insert(cell);
            order.push(cell);
        }
        order
    };
    assert_eq!(run(3), run(3));
}
