use std::collections::HashSet;

use battleship_lobby::{
    choose_move, BoardRules, Cell, GameError, GameOutcome, GameSession, GuessOutcome,
    Participant, Phase, PlayerId, QuitReason, Seat, SessionKey, TurnState,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn alice() -> PlayerId {
    PlayerId::from("alice")
}

fn bob() -> PlayerId {
    PlayerId::from("bob")
}

fn versus(seed: u64) -> GameSession {
    GameSession::new(
        SessionKey::for_match(&alice(), &bob()),
        alice(),
        Some(bob()),
        BoardRules::default(),
        SmallRng::seed_from_u64(seed),
    )
    .unwrap()
}

fn started(seed: u64) -> GameSession {
    let mut game = versus(seed);
    for seat in [Seat::A, Seat::B] {
        game.auto_place(seat).unwrap();
    }
    assert!(!game.ready_up(Seat::A).unwrap());
    assert!(game.ready_up(Seat::B).unwrap());
    game
}

#[test]
fn test_ready_requires_full_fleet() {
    let mut game = versus(1);
    assert_eq!(
        game.ready_up(Seat::A),
        Err(GameError::FleetIncomplete { unplaced: 5 })
    );
    assert_eq!(game.state(), TurnState::AwaitingReady);
    assert_eq!(game.phase(Seat::A), Phase::Placing);
}

#[test]
fn test_shot_before_start_rejected() {
    let mut game = versus(2);
    assert_eq!(
        game.submit_shot(Seat::A, Cell::new(0, 0)),
        Err(GameError::GameNotStarted)
    );
}

#[test]
fn test_out_of_turn_shot_changes_nothing() {
    let mut game = started(3);
    let before = game.snapshot();

    assert_eq!(
        game.submit_shot(Seat::B, Cell::new(4, 4)),
        Err(GameError::NotYourTurn)
    );
    assert_eq!(game.turn_holder(), Some(Seat::A));
    assert!(game.guesses(Seat::B).is_empty());
    assert_eq!(game.snapshot(), before);
}

#[test]
fn test_repeat_and_off_board_shots_rejected() {
    let mut game = started(4);
    game.submit_shot(Seat::A, Cell::new(0, 0)).unwrap();
    game.submit_shot(Seat::B, Cell::new(9, 9)).unwrap();
    let before = game.snapshot();

    assert_eq!(
        game.submit_shot(Seat::A, Cell::new(0, 0)),
        Err(GameError::AlreadyGuessed {
            cell: Cell::new(0, 0)
        })
    );
    assert_eq!(
        game.submit_shot(Seat::A, Cell::new(10, 0)),
        Err(GameError::CellOutOfBounds {
            cell: Cell::new(10, 0)
        })
    );
    assert_eq!(game.turn_holder(), Some(Seat::A));
    assert_eq!(game.snapshot(), before);
}

#[test]
fn test_fleet_locked_after_ready() {
    let mut game = started(5);
    assert_eq!(game.auto_place(Seat::A), Err(GameError::FleetLocked));
}

#[test]
fn test_sinking_every_ship_wins() {
    let mut game = started(6);
    let targets: Vec<Cell> = game.fleet(Seat::B).occupied().into_iter().collect();
    let misses: Vec<Cell> = BoardRules::default()
        .cells()
        .filter(|c| !game.fleet(Seat::A).occupied().contains(c))
        .collect();

    let mut last = None;
    for (i, cell) in targets.iter().enumerate() {
        let report = game.submit_shot(Seat::A, *cell).unwrap();
        assert!(report.result.hit);
        last = Some(report);
        if !game.is_over() {
            game.submit_shot(Seat::B, misses[i]).unwrap();
        }
    }

    let last = last.unwrap();
    assert!(last.result.sunk);
    assert_eq!(last.outcome, Some(GameOutcome::Winner(Seat::A)));
    assert_eq!(game.phase(Seat::A), Phase::Won);
    assert_eq!(game.phase(Seat::B), Phase::Lost);
    assert_eq!(game.guesses(Seat::A).hits(), game.fleet(Seat::B).occupied().len());
    assert_eq!(
        game.submit_shot(Seat::B, misses[misses.len() - 1]),
        Err(GameError::GameAlreadyOver)
    );
}

#[test]
fn test_view_hides_opponent_fleet() {
    let mut game = started(7);
    let target = *game.fleet(Seat::B).occupied().iter().next().unwrap();
    game.submit_shot(Seat::A, target).unwrap();

    let view = game.view(Seat::A);
    assert_eq!(view.phase, Phase::OpponentTurn);
    assert_eq!(view.fleet, game.fleet(Seat::A).ships().to_vec());
    assert_eq!(view.outgoing.len(), 1);
    assert_eq!(view.outgoing[0].outcome, GuessOutcome::Hit);
    assert!(view.incoming.is_empty());

    let theirs = game.view(Seat::B);
    assert_eq!(theirs.phase, Phase::YourTurn);
    assert_eq!(theirs.incoming, view.outgoing);
}

#[test]
fn test_quit_ends_game() {
    let mut game = started(8);
    let outcome = game.quit(Seat::B, QuitReason::Requested);
    assert_eq!(outcome.winner(), Seat::A);
    assert!(game.is_over());
    assert_eq!(game.outcome(), Some(outcome));
    assert_eq!(game.auto_place(Seat::A), Err(GameError::GameAlreadyOver));
    assert_eq!(game.ready_up(Seat::A), Err(GameError::GameAlreadyOver));
}

#[test]
fn test_not_in_session() {
    let game = versus(9);
    assert!(matches!(
        game.seat_of(&PlayerId::from("mallory")),
        Err(GameError::NotInSession { .. })
    ));
    assert_eq!(game.seat_of(&alice()), Ok(Seat::A));
    assert_eq!(game.seat_of(&bob()), Ok(Seat::B));
}

#[test]
fn test_solo_opponent_is_ready_and_answers_every_shot() {
    let mut game = GameSession::new(
        SessionKey::for_solo(&alice()),
        alice(),
        None,
        BoardRules::default(),
        SmallRng::seed_from_u64(10),
    )
    .unwrap();
    assert!(game.is_solo());
    assert_eq!(game.participant(Seat::B), &Participant::Automated);
    assert!(game.is_ready(Seat::B));
    assert_eq!(game.players(), vec![alice()]);

    game.auto_place(Seat::A).unwrap();
    assert!(game.ready_up(Seat::A).unwrap());

    let mut rng = SmallRng::seed_from_u64(11);
    let mut automated = Vec::new();
    while !game.is_over() {
        let cell = choose_move(game.guesses(Seat::A).cells(), game.rules(), &mut rng).unwrap();
        game.submit_shot(Seat::A, cell).unwrap();
        let replies = game.play_automated();
        if !game.is_over() {
            assert_eq!(replies.len(), 1);
            assert_eq!(game.turn_holder(), Some(Seat::A));
        }
        automated.extend(replies.into_iter().map(|r| r.cell));
    }

    let distinct: HashSet<Cell> = automated.iter().copied().collect();
    assert_eq!(distinct.len(), automated.len());
    assert!(automated.len() <= 100);
    assert!(automated.iter().all(|c| game.rules().contains(*c)));
    assert_eq!(game.guesses(Seat::B).len(), automated.len());
}

#[test]
fn test_snapshot_restores_identical_session() {
    let mut game = started(12);
    game.submit_shot(Seat::A, Cell::new(3, 3)).unwrap();
    let snapshot = game.snapshot();
    let restored = GameSession::from_snapshot(snapshot.clone(), SmallRng::seed_from_u64(0));
    assert_eq!(restored.snapshot(), snapshot);
    assert_eq!(restored.turn_holder(), Some(Seat::B));
    assert_eq!(restored.view(Seat::A), game.view(Seat::A));
}
