//! The coordinator: routes client intents to the lobby and to sessions, and
//! fans the committed results back out.
//!
//! Every session mutation runs under that session's lock, and the events it
//! produces are emitted before the lock is released. Both participants
//! therefore see events in commit order, each reflecting one committed state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::common::GameError;
use crate::config::BoardRules;
use crate::directory::{ConnectionDirectory, Connections, EventSender, Outbound};
use crate::domain::{ConnectionId, Identity, PlayerId, Seat, SessionKey};
use crate::game::{GameSession, ShotReport};
use crate::geometry::Cell;
use crate::lobby::{Lobby, PendingChallenge};
use crate::protocol::{ClientIntent, RejectionReason, ServerEvent};
use crate::registry::{lock, SessionRegistry};
use crate::ship::{Placement, ShipKind};
use crate::snapshot::SnapshotStore;
use crate::turn::QuitReason;

pub struct Coordinator {
    rules: BoardRules,
    registry: SessionRegistry,
    lobby: Lobby,
    connections: Connections,
    store: Option<Arc<dyn SnapshotStore>>,
    rng: Mutex<SmallRng>,
}

impl Coordinator {
    /// A coordinator applying `rules` to every session. A seed makes
    /// random placement and automated moves reproducible.
    pub fn new(rules: BoardRules, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Self {
            rules,
            registry: SessionRegistry::new(),
            lobby: Lobby::new(),
            connections: Connections::new(),
            store: None,
            rng: Mutex::new(rng),
        }
    }

    /// Mirror committed session state into `store`.
    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn rules(&self) -> &BoardRules {
        &self.rules
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    pub fn connections(&self) -> &Connections {
        &self.connections
    }

    fn session_rng(&self) -> SmallRng {
        SmallRng::from_rng(&mut *lock(&self.rng))
    }

    pub fn connect(&self, identity: Identity, sender: EventSender) -> ConnectionId {
        let (connection, previous) = self.connections.register(identity, sender);
        if let Some(previous) = previous {
            log::info!("[coordinator] {} replaced {}", connection, previous);
        }
        connection
    }

    /// Tear down everything tied to `connection`. A disconnect during a game
    /// ends it; the opponent wins. Stale connections are ignored.
    pub fn disconnect(&self, player: &PlayerId, connection: ConnectionId) {
        if !self.connections.unregister(player, connection) {
            return;
        }
        let (session, dropped) = self.lobby.forget(player);
        self.void_challenges(
            std::slice::from_ref(player),
            dropped,
            RejectionReason::Disconnected,
        );
        let Some(key) = session else {
            return;
        };
        match self.registry.get(&key) {
            Ok(handle) => {
                let mut game = lock(&handle);
                if let Ok(seat) = game.seat_of(player) {
                    if !game.is_over() {
                        game.quit(seat, QuitReason::Disconnected);
                        log::info!("[{}] {} disconnected mid-game", key, player);
                        self.finish(&game);
                    }
                }
            }
            Err(_) => self.lobby.release(&key),
        }
    }

    /// Players the requester could challenge.
    pub fn challengeable(&self, requester: &PlayerId) -> Vec<Identity> {
        self.lobby
            .eligible(&self.connections)
            .into_iter()
            .filter(|i| &i.id != requester)
            .collect()
    }

    /// Process one intent from `player`. Errors are for the requester only;
    /// nothing is mutated or broadcast when one is returned.
    pub fn handle(&self, player: &PlayerId, intent: ClientIntent) -> Result<(), GameError> {
        let result = match intent {
            ClientIntent::PlaceShip {
                session,
                ship,
                placement,
            } => self.place_ship(player, &session, ship, placement),
            ClientIntent::AutoPlace { session } => self.auto_place(player, &session),
            ClientIntent::ReadyUp { session } => self.ready_up(player, &session),
            ClientIntent::SubmitShot { session, cell } => self.submit_shot(player, &session, cell),
            ClientIntent::Quit { session } => self.quit(player, &session),
            ClientIntent::Challenge { to } => self.challenge(player, &to),
            ClientIntent::AcceptChallenge { from } => self.accept(player, &from).map(|_| ()),
            ClientIntent::RejectChallenge { from } => self.reject(player, &from),
            ClientIntent::StartSolo => self.start_solo(player).map(|_| ()),
        };
        if let Err(e) = &result {
            log::debug!("[coordinator] rejected request from {}: {}", player, e);
        }
        result
    }

    /// Run `f` against the live session `key` on behalf of `player`, under
    /// the session lock.
    fn with_session<T>(
        &self,
        player: &PlayerId,
        key: &SessionKey,
        f: impl FnOnce(&mut GameSession, Seat) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let handle = self.registry.get(key)?;
        let mut game = lock(&handle);
        // lost a race with teardown
        if game.is_over() {
            return Err(GameError::SessionNotFound { key: key.clone() });
        }
        let seat = game.seat_of(player)?;
        f(&mut *game, seat)
    }

    pub fn place_ship(
        &self,
        player: &PlayerId,
        key: &SessionKey,
        ship: ShipKind,
        placement: Placement,
    ) -> Result<(), GameError> {
        self.with_session(player, key, |game, seat| {
            game.place_ship(seat, ship, placement)?;
            self.send_views(game);
            self.persist(game);
            Ok(())
        })
    }

    pub fn auto_place(&self, player: &PlayerId, key: &SessionKey) -> Result<(), GameError> {
        self.with_session(player, key, |game, seat| {
            game.auto_place(seat)?;
            self.send_views(game);
            self.persist(game);
            Ok(())
        })
    }

    pub fn ready_up(&self, player: &PlayerId, key: &SessionKey) -> Result<(), GameError> {
        self.with_session(player, key, |game, seat| {
            let started = game.ready_up(seat)?;
            self.send_views(game);
            if started {
                log::info!("[{}] both fleets ready, game started", game.key());
                self.broadcast(
                    game,
                    ServerEvent::StartGame {
                        session: game.key().clone(),
                        first: Seat::A,
                    },
                );
            }
            self.persist(game);
            Ok(())
        })
    }

    pub fn submit_shot(
        &self,
        player: &PlayerId,
        key: &SessionKey,
        cell: Cell,
    ) -> Result<(), GameError> {
        self.with_session(player, key, |game, seat| {
            let report = game.submit_shot(seat, cell)?;
            self.announce_shot(game, report);
            for report in game.play_automated() {
                self.announce_shot(game, report);
            }
            if game.is_over() {
                self.finish(game);
            } else {
                self.persist(game);
            }
            Ok(())
        })
    }

    pub fn quit(&self, player: &PlayerId, key: &SessionKey) -> Result<(), GameError> {
        self.with_session(player, key, |game, seat| {
            game.quit(seat, QuitReason::Requested);
            log::info!("[{}] {} quit", game.key(), player);
            self.finish(game);
            Ok(())
        })
    }

    pub fn challenge(&self, from: &PlayerId, to: &PlayerId) -> Result<(), GameError> {
        self.lobby.challenge(&self.connections, from, to)?;
        let identity = self
            .connections
            .identity(from)
            .ok_or_else(|| GameError::PlayerUnavailable { player: from.clone() })?;
        self.connections
            .emit_to(to, ServerEvent::ChallengeReceived { from: identity });
        Ok(())
    }

    /// Accept `challenger`'s challenge. Returns the new session key.
    pub fn accept(
        &self,
        acceptor: &PlayerId,
        challenger: &PlayerId,
    ) -> Result<SessionKey, GameError> {
        let (handle, voided) = self.lobby.accept(
            &self.connections,
            &self.registry,
            acceptor,
            challenger,
            self.rules,
            self.session_rng(),
        )?;
        self.void_challenges(
            &[acceptor.clone(), challenger.clone()],
            voided,
            RejectionReason::Unavailable,
        );
        let game = lock(&handle);
        for seat in [Seat::A, Seat::B] {
            let Some(player) = game.participant(seat).player() else {
                continue;
            };
            let opponent = game
                .participant(seat.other())
                .player()
                .and_then(|p| self.connections.identity(p));
            self.connections.emit_to(
                player,
                ServerEvent::ChallengeAccepted {
                    session: game.key().clone(),
                    seat,
                },
            );
            self.connections.emit_to(
                player,
                ServerEvent::HasOpponent {
                    session: game.key().clone(),
                    opponent,
                },
            );
        }
        self.send_views(&game);
        self.persist(&game);
        Ok(game.key().clone())
    }

    pub fn reject(&self, rejecter: &PlayerId, challenger: &PlayerId) -> Result<(), GameError> {
        self.lobby.reject(rejecter, challenger)?;
        self.connections.emit_to(
            challenger,
            ServerEvent::ChallengeRejected {
                by: rejecter.clone(),
                reason: RejectionReason::Declined,
            },
        );
        Ok(())
    }

    /// Start a game against the automated opponent. Returns the session key.
    pub fn start_solo(&self, player: &PlayerId) -> Result<SessionKey, GameError> {
        let (handle, voided) = self.lobby.start_solo(
            &self.connections,
            &self.registry,
            player,
            self.rules,
            self.session_rng(),
        )?;
        self.void_challenges(
            std::slice::from_ref(player),
            voided,
            RejectionReason::Unavailable,
        );
        let game = lock(&handle);
        self.connections.emit_to(
            player,
            ServerEvent::HasOpponent {
                session: game.key().clone(),
                opponent: None,
            },
        );
        self.send_views(&game);
        self.persist(&game);
        Ok(game.key().clone())
    }

    /// Time out challenges older than `ttl`, telling each challenger.
    pub fn expire_challenges(&self, ttl: Duration) -> usize {
        let expired = self.lobby.expire(ttl);
        for challenge in &expired {
            self.connections.emit_to(
                &challenge.from,
                ServerEvent::ChallengeRejected {
                    by: challenge.to.clone(),
                    reason: RejectionReason::TimedOut,
                },
            );
        }
        expired.len()
    }

    /// Bring a persisted session back. Returns `false` if the store has no
    /// snapshot for `key`.
    pub fn restore(&self, key: &SessionKey) -> anyhow::Result<bool> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        let Some(snapshot) = store.load(key)? else {
            return Ok(false);
        };
        let handle = self
            .registry
            .restore(snapshot, self.session_rng())
            .map_err(|e| anyhow::anyhow!(e))?;
        let players = lock(&handle).players();
        let voided = self.lobby.engage(&players, key);
        self.void_challenges(&players, voided, RejectionReason::Unavailable);
        Ok(true)
    }

    /// Tell the remaining side of each voided challenge that it is off.
    /// `gone` are the players whose departure voided them.
    fn void_challenges(
        &self,
        gone: &[PlayerId],
        voided: Vec<PendingChallenge>,
        reason: RejectionReason,
    ) {
        for challenge in voided {
            let from_gone = gone.contains(&challenge.from);
            let to_gone = gone.contains(&challenge.to);
            let (notify, by) = match (from_gone, to_gone) {
                (true, false) => (challenge.to, challenge.from),
                (false, true) => (challenge.from, challenge.to),
                // both sides are in the new game, or neither left
                _ => continue,
            };
            self.connections
                .emit_to(&notify, ServerEvent::ChallengeRejected { by, reason });
        }
    }

    fn broadcast(&self, game: &GameSession, event: ServerEvent) {
        for player in game.players() {
            self.connections.emit_to(&player, event.clone());
        }
    }

    /// Each human participant gets its own view.
    fn send_views(&self, game: &GameSession) {
        for seat in [Seat::A, Seat::B] {
            if let Some(player) = game.participant(seat).player() {
                self.connections
                    .emit_to(player, ServerEvent::UpdateGameState(game.view(seat)));
            }
        }
    }

    fn announce_shot(&self, game: &GameSession, report: ShotReport) {
        let next_turn = match report.outcome {
            Some(_) => None,
            None => Some(report.shooter.other()),
        };
        self.broadcast(
            game,
            ServerEvent::UpdateBoard {
                session: game.key().clone(),
                shooter: report.shooter,
                cell: report.cell,
                result: report.result,
                next_turn,
            },
        );
    }

    /// Announce the outcome and drop the session.
    fn finish(&self, game: &GameSession) {
        let key = game.key().clone();
        if let Some(outcome) = game.outcome() {
            let winner = game.participant(outcome.winner()).player().cloned();
            log::info!("[{}] game over: {:?}", key, outcome);
            self.broadcast(
                game,
                ServerEvent::GameOver {
                    session: key.clone(),
                    outcome,
                    winner,
                },
            );
        }
        self.registry.destroy(&key);
        self.lobby.release(&key);
        if let Some(store) = &self.store {
            if let Err(e) = store.remove(&key) {
                log::warn!("[{}] failed to remove snapshot: {}", key, e);
            }
        }
    }

    fn persist(&self, game: &GameSession) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&game.snapshot()) {
                log::warn!("[{}] failed to save snapshot: {}", game.key(), e);
            }
        }
    }
}
