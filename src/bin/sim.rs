use std::collections::HashSet;
use std::sync::Arc;

use battleship_lobby::{
    choose_move, server::serve_connection, BoardRules, Client, ClientIntent, Coordinator,
    Identity, InMemoryTransport, PlayerId, Seat, ServerEvent, SessionKey, Transport,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

/// Play one client's side of a match until the game ends. Returns the winner
/// reported by the server and the number of shots this client fired.
async fn play<T: Transport>(
    client: &mut Client<T>,
    session: SessionKey,
    seat: Seat,
    rng: &mut SmallRng,
) -> anyhow::Result<(Option<PlayerId>, usize)> {
    let rules = *client.rules();
    let mut guessed = HashSet::new();

    client
        .send(ClientIntent::AutoPlace {
            session: session.clone(),
        })
        .await?;
    client
        .send(ClientIntent::ReadyUp {
            session: session.clone(),
        })
        .await?;

    loop {
        let my_turn = match client.wait_for(|_| true).await? {
            ServerEvent::StartGame { first, .. } => first == seat,
            ServerEvent::UpdateBoard {
                shooter,
                cell,
                next_turn,
                ..
            } => {
                if shooter == seat {
                    guessed.insert(cell);
                }
                next_turn == Some(seat)
            }
            ServerEvent::GameOver { winner, .. } => return Ok((winner, guessed.len())),
            _ => false,
        };
        if my_turn {
            let cell = choose_move(&guessed, &rules, rng)
                .ok_or_else(|| anyhow::anyhow!("no cells left to fire at"))?;
            client
                .send(ClientIntent::SubmitShot {
                    session: session.clone(),
                    cell,
                })
                .await?;
        }
    }
}

async fn join(
    coordinator: &Arc<Coordinator>,
    id: &str,
    name: &str,
) -> anyhow::Result<Client<InMemoryTransport>> {
    let (client_end, server_end) = InMemoryTransport::pair();
    let coordinator = coordinator.clone();
    tokio::spawn(async move {
        if let Err(e) = serve_connection(coordinator, server_end).await {
            log::debug!("[sim] connection ended: {}", e);
        }
    });
    Client::connect(client_end, Identity::new(id, name)).await
}

async fn accepted<T: Transport>(client: &mut Client<T>) -> anyhow::Result<(SessionKey, Seat)> {
    match client
        .wait_for(|e| matches!(e, ServerEvent::ChallengeAccepted { .. }))
        .await?
    {
        ServerEvent::ChallengeAccepted { session, seat } => Ok((session, seat)),
        other => Err(anyhow::anyhow!("unexpected event: {:?}", other)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    battleship_lobby::init_logging_with(log::LevelFilter::Warn);
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let coordinator = Arc::new(Coordinator::new(BoardRules::default(), Some(seed1 ^ seed2)));
    let mut p1 = join(&coordinator, "player1", "Player 1").await?;
    let mut p2 = join(&coordinator, "player2", "Player 2").await?;

    p1.send(ClientIntent::Challenge {
        to: "player2".into(),
    })
    .await?;
    p2.wait_for(|e| matches!(e, ServerEvent::ChallengeReceived { .. }))
        .await?;
    p2.send(ClientIntent::AcceptChallenge {
        from: "player1".into(),
    })
    .await?;
    let (session, seat1) = accepted(&mut p1).await?;
    let (_, seat2) = accepted(&mut p2).await?;

    let mut rng1 = SmallRng::seed_from_u64(seed1);
    let mut rng2 = SmallRng::seed_from_u64(seed2);
    let (res1, res2) = tokio::try_join!(
        play(&mut p1, session.clone(), seat1, &mut rng1),
        play(&mut p2, session.clone(), seat2, &mut rng2),
    )?;

    let result = json!({
        "session": session.as_str(),
        "player1": {"seat": format!("{:?}", seat1), "shots": res1.1},
        "player2": {"seat": format!("{:?}", seat2), "shots": res2.1},
        "winner": res1.0.as_ref().map(|w| w.as_str()),
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
