//! Matchmaking: challenges between connected players and the set of players
//! currently engaged in a game.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;

use crate::common::GameError;
use crate::config::BoardRules;
use crate::directory::ConnectionDirectory;
use crate::domain::{Identity, PlayerId, SessionKey};
use crate::registry::{lock, SessionHandle, SessionRegistry};

/// An outstanding challenge from `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChallenge {
    pub from: PlayerId,
    pub to: PlayerId,
    pub issued_at: Instant,
}

#[derive(Debug, Default)]
struct LobbyState {
    engaged: HashMap<PlayerId, SessionKey>,
    /// Keyed by challenger; one outgoing challenge per player.
    pending: HashMap<PlayerId, PendingChallenge>,
}

impl LobbyState {
    fn ensure_free(
        &self,
        player: &PlayerId,
        dir: &dyn ConnectionDirectory,
    ) -> Result<(), GameError> {
        if self.engaged.contains_key(player) || !dir.is_connected(player) {
            return Err(GameError::PlayerUnavailable {
                player: player.clone(),
            });
        }
        Ok(())
    }

    /// Remove every pending challenge sent by or to `player`.
    fn drop_challenges(&mut self, player: &PlayerId) -> Vec<PendingChallenge> {
        let mut dropped = Vec::new();
        self.pending.retain(|_, p| {
            let involved = &p.from == player || &p.to == player;
            if involved {
                dropped.push(p.clone());
            }
            !involved
        });
        dropped
    }
}

#[derive(Debug, Default)]
pub struct Lobby {
    state: Mutex<LobbyState>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connected players not currently in a game.
    pub fn eligible(&self, dir: &dyn ConnectionDirectory) -> Vec<Identity> {
        let state = lock(&self.state);
        dir.list_connected()
            .into_iter()
            .filter(|i| !state.engaged.contains_key(&i.id))
            .collect()
    }

    pub fn session_of(&self, player: &PlayerId) -> Option<SessionKey> {
        lock(&self.state).engaged.get(player).cloned()
    }

    pub fn is_engaged(&self, player: &PlayerId) -> bool {
        lock(&self.state).engaged.contains_key(player)
    }

    pub fn pending_from(&self, challenger: &PlayerId) -> Option<PendingChallenge> {
        lock(&self.state).pending.get(challenger).cloned()
    }

    /// Record a challenge. The caller notifies the target.
    pub fn challenge(
        &self,
        dir: &dyn ConnectionDirectory,
        from: &PlayerId,
        to: &PlayerId,
    ) -> Result<(), GameError> {
        if from == to {
            return Err(GameError::SelfChallenge);
        }
        let mut state = lock(&self.state);
        state.ensure_free(from, dir)?;
        state.ensure_free(to, dir)?;
        state.pending.insert(
            from.clone(),
            PendingChallenge {
                from: from.clone(),
                to: to.clone(),
                issued_at: Instant::now(),
            },
        );
        log::debug!("[lobby] {} challenged {}", from, to);
        Ok(())
    }

    /// Turn a pending challenge from `challenger` into a session. The
    /// acceptor takes seat A and moves first. Every other challenge
    /// involving either player is voided and returned.
    pub fn accept(
        &self,
        dir: &dyn ConnectionDirectory,
        registry: &SessionRegistry,
        acceptor: &PlayerId,
        challenger: &PlayerId,
        rules: BoardRules,
        rng: SmallRng,
    ) -> Result<(SessionHandle, Vec<PendingChallenge>), GameError> {
        let mut state = lock(&self.state);
        match state.pending.get(challenger) {
            Some(p) if &p.to == acceptor => {}
            _ => {
                return Err(GameError::NoPendingChallenge {
                    challenger: challenger.clone(),
                })
            }
        }
        state.ensure_free(acceptor, dir)?;
        state.ensure_free(challenger, dir)?;

        let key = SessionKey::for_match(acceptor, challenger);
        let handle = registry.create(
            key.clone(),
            acceptor.clone(),
            Some(challenger.clone()),
            rules,
            rng,
        )?;
        state.pending.remove(challenger);
        let mut voided = state.drop_challenges(acceptor);
        voided.extend(state.drop_challenges(challenger));
        state.engaged.insert(acceptor.clone(), key.clone());
        state.engaged.insert(challenger.clone(), key);
        Ok((handle, voided))
    }

    /// Decline a pending challenge from `challenger`.
    pub fn reject(&self, rejecter: &PlayerId, challenger: &PlayerId) -> Result<(), GameError> {
        let mut state = lock(&self.state);
        match state.pending.get(challenger) {
            Some(p) if &p.to == rejecter => {
                state.pending.remove(challenger);
                Ok(())
            }
            _ => Err(GameError::NoPendingChallenge {
                challenger: challenger.clone(),
            }),
        }
    }

    /// Drop challenges older than `ttl` and return them.
    pub fn expire(&self, ttl: Duration) -> Vec<PendingChallenge> {
        let mut state = lock(&self.state);
        let expired: Vec<PlayerId> = state
            .pending
            .values()
            .filter(|p| p.issued_at.elapsed() >= ttl)
            .map(|p| p.from.clone())
            .collect();
        expired
            .iter()
            .filter_map(|from| state.pending.remove(from))
            .collect()
    }

    /// Start a solo game for `player` against the automated opponent. The
    /// player's pending challenges are voided and returned.
    pub fn start_solo(
        &self,
        dir: &dyn ConnectionDirectory,
        registry: &SessionRegistry,
        player: &PlayerId,
        rules: BoardRules,
        rng: SmallRng,
    ) -> Result<(SessionHandle, Vec<PendingChallenge>), GameError> {
        let mut state = lock(&self.state);
        state.ensure_free(player, dir)?;
        let key = SessionKey::for_solo(player);
        let handle = registry.create(key.clone(), player.clone(), None, rules, rng)?;
        let voided = state.drop_challenges(player);
        state.engaged.insert(player.clone(), key);
        Ok((handle, voided))
    }

    /// Mark `players` as engaged in `key`, voiding their challenges.
    pub(crate) fn engage(
        &self,
        players: &[PlayerId],
        key: &SessionKey,
    ) -> Vec<PendingChallenge> {
        let mut state = lock(&self.state);
        let mut voided = Vec::new();
        for player in players {
            voided.extend(state.drop_challenges(player));
            state.engaged.insert(player.clone(), key.clone());
        }
        voided
    }

    /// Free the players of a finished session.
    pub fn release(&self, key: &SessionKey) {
        lock(&self.state).engaged.retain(|_, k| k != key);
    }

    /// Clear everything `player` left behind. Returns the session it was
    /// engaged in and every challenge that involved it.
    pub fn forget(&self, player: &PlayerId) -> (Option<SessionKey>, Vec<PendingChallenge>) {
        let mut state = lock(&self.state);
        let session = state.engaged.get(player).cloned();
        let dropped = state.drop_challenges(player);
        (session, dropped)
    }
}
