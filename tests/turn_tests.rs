use battleship_lobby::{GameError, GameOutcome, QuitReason, Seat, TurnMachine, TurnState};

#[test]
fn test_turns_alternate_after_start() {
    let mut turn = TurnMachine::new(Seat::A);
    assert_eq!(turn.state(), TurnState::AwaitingReady);
    assert_eq!(turn.authorize_shot(Seat::A), Err(GameError::GameNotStarted));

    assert!(turn.start());
    assert!(!turn.start());
    assert_eq!(turn.holder(), Some(Seat::A));
    assert_eq!(turn.authorize_shot(Seat::B), Err(GameError::NotYourTurn));
    assert_eq!(turn.authorize_shot(Seat::A), Ok(()));

    turn.complete_shot(false);
    assert_eq!(turn.holder(), Some(Seat::B));
    turn.complete_shot(false);
    assert_eq!(turn.holder(), Some(Seat::A));
}

#[test]
fn test_defeating_shot_ends_game_for_shooter() {
    let mut turn = TurnMachine::new(Seat::B);
    turn.start();
    assert_eq!(turn.holder(), Some(Seat::B));
    turn.complete_shot(true);
    assert_eq!(turn.state(), TurnState::GameOver(GameOutcome::Winner(Seat::B)));
    assert!(turn.is_over());
    assert_eq!(turn.authorize_shot(Seat::A), Err(GameError::GameAlreadyOver));
    // nothing moves once the game is over
    turn.complete_shot(false);
    turn.pass();
    assert_eq!(turn.state(), TurnState::GameOver(GameOutcome::Winner(Seat::B)));
}

#[test]
fn test_quit_from_any_state_credits_the_other_seat() {
    let mut waiting = TurnMachine::new(Seat::A);
    let outcome = waiting.quit(Seat::A, QuitReason::Requested);
    assert_eq!(outcome.winner(), Seat::B);

    let mut playing = TurnMachine::new(Seat::A);
    playing.start();
    let outcome = playing.quit(Seat::B, QuitReason::Disconnected);
    assert_eq!(
        outcome,
        GameOutcome::Quit {
            by: Seat::B,
            reason: QuitReason::Disconnected,
        }
    );
    assert_eq!(outcome.winner(), Seat::A);
}

#[test]
fn test_first_outcome_sticks() {
    let mut turn = TurnMachine::new(Seat::A);
    turn.start();
    turn.complete_shot(true);
    let outcome = turn.quit(Seat::B, QuitReason::Disconnected);
    assert_eq!(outcome, GameOutcome::Winner(Seat::A));
}

#[test]
fn test_pass_hands_turn_over() {
    let mut turn = TurnMachine::new(Seat::A);
    turn.pass();
    assert_eq!(turn.state(), TurnState::AwaitingReady);
    turn.start();
    turn.pass();
    assert_eq!(turn.holder(), Some(Seat::B));
}
