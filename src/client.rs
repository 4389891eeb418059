use crate::config::BoardRules;
use crate::domain::{ConnectionId, Identity};
use crate::protocol::{ClientIntent, Message, ServerEvent, PROTOCOL_VERSION};
use crate::transport::Transport;

/// Client side of the protocol, used by the CLI, the simulator and tests.
pub struct Client<T: Transport> {
    transport: T,
    identity: Identity,
    connection: ConnectionId,
    rules: BoardRules,
}

impl<T: Transport> Client<T> {
    /// Perform the `Hello`/`Welcome` handshake.
    pub async fn connect(mut transport: T, identity: Identity) -> anyhow::Result<Self> {
        transport
            .send(Message::Hello {
                version: PROTOCOL_VERSION,
                identity: identity.clone(),
            })
            .await?;
        match transport.recv().await? {
            Message::Welcome {
                version,
                connection,
                rules,
            } if version == PROTOCOL_VERSION => {
                rules.validate()?;
                Ok(Self {
                    transport,
                    identity,
                    connection,
                    rules,
                })
            }
            Message::Welcome { version, .. } => Err(anyhow::anyhow!(
                "Protocol version mismatch in Welcome: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            )),
            other => Err(anyhow::anyhow!(
                "Expected Welcome, got unexpected message: {:?}",
                other
            )),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn rules(&self) -> &BoardRules {
        &self.rules
    }

    pub async fn send(&mut self, intent: ClientIntent) -> anyhow::Result<()> {
        self.transport.send(Message::Intent(intent)).await
    }

    pub async fn list_players(&mut self) -> anyhow::Result<()> {
        self.transport.send(Message::ListPlayers).await
    }

    pub async fn heartbeat(&mut self) -> anyhow::Result<()> {
        self.transport.send(Message::Heartbeat).await
    }

    /// Next frame from the server. Cancel-safe.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        self.transport.recv().await
    }

    /// Skip frames until `pred` matches an event.
    pub async fn wait_for<F>(&mut self, mut pred: F) -> anyhow::Result<ServerEvent>
    where
        F: FnMut(&ServerEvent) -> bool + Send,
    {
        loop {
            if let Message::Event(event) = self.recv().await? {
                if pred(&event) {
                    return Ok(event);
                }
            }
        }
    }
}
