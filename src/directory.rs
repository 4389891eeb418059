//! Connection directory: which players are connected, over which connection,
//! and where their outbound events go.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc::UnboundedSender;

use crate::domain::{ConnectionId, Identity, PlayerId};
use crate::protocol::ServerEvent;
use crate::registry::lock;

/// Read side used by matchmaking.
pub trait ConnectionDirectory: Send + Sync {
    fn list_connected(&self) -> Vec<Identity>;
    fn is_connected(&self, player: &PlayerId) -> bool;
    fn identity(&self, player: &PlayerId) -> Option<Identity>;
}

/// Outbound event delivery.
pub trait Outbound: Send + Sync {
    /// Deliver `event` to `player`. Returns `false` if the player is not
    /// connected. Must not block.
    fn emit_to(&self, player: &PlayerId, event: ServerEvent) -> bool;
}

pub type EventSender = UnboundedSender<ServerEvent>;

struct Entry {
    identity: Identity,
    connection: ConnectionId,
    sender: EventSender,
}

/// In-process directory keyed by player id, with the connection id kept
/// alongside so stale connections cannot evict a newer one.
#[derive(Default)]
pub struct Connections {
    next_id: AtomicU64,
    players: Mutex<HashMap<PlayerId, Entry>>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `identity`. A reconnect replaces the
    /// previous mapping; its connection id is returned.
    pub fn register(
        &self,
        identity: Identity,
        sender: EventSender,
    ) -> (ConnectionId, Option<ConnectionId>) {
        let connection = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let player = identity.id.clone();
        let previous = lock(&self.players).insert(
            player.clone(),
            Entry {
                identity,
                connection,
                sender,
            },
        );
        log::info!("[directory] {} connected on {}", player, connection);
        (connection, previous.map(|e| e.connection))
    }

    /// Drop the mapping for `player` if it still points at `connection`.
    pub fn unregister(&self, player: &PlayerId, connection: ConnectionId) -> bool {
        let mut players = lock(&self.players);
        match players.get(player) {
            Some(entry) if entry.connection == connection => {
                players.remove(player);
                log::info!("[directory] {} disconnected from {}", player, connection);
                true
            }
            _ => false,
        }
    }

    pub fn connection_of(&self, player: &PlayerId) -> Option<ConnectionId> {
        lock(&self.players).get(player).map(|e| e.connection)
    }

    pub fn len(&self) -> usize {
        lock(&self.players).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConnectionDirectory for Connections {
    fn list_connected(&self) -> Vec<Identity> {
        let mut list: Vec<Identity> = lock(&self.players)
            .values()
            .map(|e| e.identity.clone())
            .collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }

    fn is_connected(&self, player: &PlayerId) -> bool {
        lock(&self.players).contains_key(player)
    }

    fn identity(&self, player: &PlayerId) -> Option<Identity> {
        lock(&self.players).get(player).map(|e| e.identity.clone())
    }
}

impl Outbound for Connections {
    fn emit_to(&self, player: &PlayerId, event: ServerEvent) -> bool {
        match lock(&self.players).get(player) {
            Some(entry) => entry.sender.send(event).is_ok(),
            None => {
                log::debug!("[directory] dropping event for offline player {}", player);
                false
            }
        }
    }
}
