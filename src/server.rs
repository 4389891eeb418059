//! Transport adapter: accepts connections and shuttles frames between each
//! client and the coordinator.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc::unbounded_channel;
use tokio::time::{interval, Duration};

use crate::config::ServerConfig;
use crate::coordinator::Coordinator;
use crate::domain::Identity;
use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::transport::tcp::TcpTransport;
use crate::transport::Transport;

/// Wait for the client's `Hello` and answer with `Welcome`.
async fn handshake<T: Transport>(transport: &mut T) -> anyhow::Result<Identity> {
    match transport.recv().await? {
        Message::Hello { version, identity } if version == PROTOCOL_VERSION => Ok(identity),
        Message::Hello { version, .. } => Err(anyhow::anyhow!(
            "Protocol version mismatch in Hello: expected {}, got {}",
            PROTOCOL_VERSION,
            version
        )),
        other => Err(anyhow::anyhow!(
            "Expected Hello, got unexpected message: {:?}",
            other
        )),
    }
}

/// Serve one client until it disconnects. The connection's departure is
/// reported to the coordinator however the loop ends.
pub async fn serve_connection<T: Transport>(
    coordinator: Arc<Coordinator>,
    mut transport: T,
) -> anyhow::Result<()> {
    let identity = handshake(&mut transport).await?;
    let player = identity.id.clone();
    let (events_tx, mut events_rx) = unbounded_channel();
    let connection = coordinator.connect(identity, events_tx);

    let result = async {
        transport
            .send(Message::Welcome {
                version: PROTOCOL_VERSION,
                connection,
                rules: *coordinator.rules(),
            })
            .await?;
        loop {
            tokio::select! {
                inbound = transport.recv() => {
                    let reply = match inbound? {
                        Message::Intent(intent) => match coordinator.handle(&player, intent) {
                            Ok(()) => None,
                            Err(e) => Some(Message::Rejected(e)),
                        },
                        Message::ListPlayers => Some(Message::Players(coordinator.challengeable(&player))),
                        Message::Heartbeat => None,
                        other => {
                            log::warn!("[server] unexpected frame from {}: {:?}", player, other);
                            None
                        }
                    };
                    if let Some(reply) = reply {
                        transport.send(reply).await?;
                    }
                }
                event = events_rx.recv() => match event {
                    Some(event) => transport.send(Message::Event(event)).await?,
                    // replaced by a newer connection for the same player
                    None => return anyhow::Ok(()),
                },
            }
        }
    }
    .await;

    coordinator.disconnect(&player, connection);
    if let Err(e) = &result {
        log::info!("[server] {} ({}) closed: {}", player, connection, e);
    }
    result
}

/// Periodically time out stale challenges.
async fn expire_challenges(coordinator: Arc<Coordinator>, ttl: Duration) {
    let mut ticker = interval(ttl.max(Duration::from_secs(1)) / 2);
    loop {
        ticker.tick().await;
        let expired = coordinator.expire_challenges(ttl);
        if expired > 0 {
            log::debug!("[server] expired {} challenge(s)", expired);
        }
    }
}

/// Accept connections forever.
pub async fn run(listener: TcpListener, config: ServerConfig) -> anyhow::Result<()> {
    let coordinator = Arc::new(Coordinator::new(config.rules, config.seed));
    run_with(listener, coordinator, config).await
}

pub async fn run_with(
    listener: TcpListener,
    coordinator: Arc<Coordinator>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    coordinator.rules().validate()?;
    log::info!(
        "[server] listening on {} ({})",
        listener.local_addr()?,
        coordinator.rules()
    );
    tokio::spawn(expire_challenges(coordinator.clone(), config.challenge_ttl));

    loop {
        let (stream, addr) = listener.accept().await?;
        stream.set_nodelay(true)?;
        log::debug!("[server] connection from {}", addr);
        let transport = TcpTransport::with_idle_timeout(stream, config.idle_timeout);
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            if let Err(e) = serve_connection(coordinator, transport).await {
                log::debug!("[server] {} ended: {}", addr, e);
            }
        });
    }
}
