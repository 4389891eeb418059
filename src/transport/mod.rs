use crate::protocol::Message;

/// A bidirectional message channel to one peer.
///
/// `recv` must be cancel-safe: dropping its future before completion loses
/// no data, so it can be raced against outbound traffic in `select!`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

pub mod in_memory;
pub mod tcp;
