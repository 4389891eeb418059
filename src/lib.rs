mod ai;
mod board;
pub mod client;
mod common;
mod config;
pub mod coordinator;
pub mod directory;
pub mod domain;
mod game;
mod geometry;
pub mod lobby;
mod logging;
mod placement;
pub mod protocol;
pub mod registry;
pub mod server;
mod ship;
mod shot;
pub mod snapshot;
pub mod transport;
mod turn;
pub mod ui;

pub use ai::*;
pub use board::*;
pub use client::Client;
pub use common::*;
pub use config::*;
pub use coordinator::Coordinator;
pub use directory::{ConnectionDirectory, Connections, Outbound};
pub use domain::*;
pub use game::*;
pub use geometry::*;
pub use lobby::{Lobby, PendingChallenge};
pub use logging::{init_logging, init_logging_with};
pub use placement::*;
pub use protocol::*;
pub use registry::{SessionHandle, SessionRegistry};
pub use ship::*;
pub use shot::*;
pub use snapshot::{MemorySnapshotStore, SnapshotStore};
pub use transport::in_memory::InMemoryTransport;
pub use transport::tcp::TcpTransport;
pub use transport::Transport;
pub use turn::*;
