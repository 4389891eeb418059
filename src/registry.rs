//! Session registry: exactly one live session per key.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::rngs::SmallRng;

use crate::common::GameError;
use crate::config::BoardRules;
use crate::domain::{PlayerId, SessionKey};
use crate::game::{GameSession, SessionSnapshot};

/// Shared handle to one session. The mutex is the per-session lock every
/// mutation goes through.
pub type SessionHandle = Arc<Mutex<GameSession>>;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionKey, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a session. Check and insert happen under one
    /// lock; a failed construction registers nothing.
    pub fn create(
        &self,
        key: SessionKey,
        a: PlayerId,
        b: Option<PlayerId>,
        rules: BoardRules,
        rng: SmallRng,
    ) -> Result<SessionHandle, GameError> {
        let mut sessions = lock(&self.sessions);
        match sessions.entry(key) {
            Entry::Occupied(entry) => Err(GameError::DuplicateSession {
                key: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                let session = GameSession::new(entry.key().clone(), a, b, rules, rng)?;
                log::info!("[registry] created session {}", entry.key());
                Ok(entry.insert(Arc::new(Mutex::new(session))).clone())
            }
        }
    }

    /// Re-register a persisted session.
    pub fn restore(
        &self,
        snapshot: SessionSnapshot,
        rng: SmallRng,
    ) -> Result<SessionHandle, GameError> {
        let mut sessions = lock(&self.sessions);
        match sessions.entry(snapshot.key.clone()) {
            Entry::Occupied(entry) => Err(GameError::DuplicateSession {
                key: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                let session = GameSession::from_snapshot(snapshot, rng);
                log::info!("[registry] restored session {}", entry.key());
                Ok(entry.insert(Arc::new(Mutex::new(session))).clone())
            }
        }
    }

    pub fn get(&self, key: &SessionKey) -> Result<SessionHandle, GameError> {
        lock(&self.sessions)
            .get(key)
            .cloned()
            .ok_or_else(|| GameError::SessionNotFound { key: key.clone() })
    }

    /// Remove a session. Calling it for an absent key is a no-op.
    pub fn destroy(&self, key: &SessionKey) -> Option<SessionHandle> {
        let removed = lock(&self.sessions).remove(key);
        if removed.is_some() {
            log::info!("[registry] destroyed session {}", key);
        }
        removed
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        lock(&self.sessions).contains_key(key)
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<SessionKey> {
        lock(&self.sessions).keys().cloned().collect()
    }
}
