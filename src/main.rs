use battleship_lobby::{
    init_logging, server, ui, BoardRules, Client, ClientIntent, GameError, Identity, Message,
    Placement, RejectionReason, ServerConfig, ServerEvent, SessionKey, ShipKind, TcpTransport,
    DEFAULT_ADJACENCY_REQUIRED, DEFAULT_BIND, DEFAULT_GRID_SIZE, DEFAULT_MARGIN,
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::{interval, Duration};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the lobby and game server.
    Serve {
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,
        #[arg(long, default_value_t = DEFAULT_GRID_SIZE)]
        grid_size: u8,
        #[arg(long, default_value_t = DEFAULT_MARGIN, help = "Offset of the first row and column")]
        margin: u8,
        #[arg(long, help = "Let ships touch each other (no one-cell buffer)")]
        allow_touching: bool,
        #[arg(long, default_value_t = 60, help = "Seconds before an unanswered challenge expires")]
        challenge_ttl: u64,
        #[arg(long, default_value_t = 300, help = "Seconds of silence before a client is dropped")]
        idle_timeout: u64,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Connect to a server and play from the terminal.
    Play {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[arg(long, help = "Player id issued by the identity service")]
        id: String,
        #[arg(long, help = "Display name (defaults to the id)")]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            grid_size,
            margin,
            allow_touching,
            challenge_ttl,
            idle_timeout,
            seed,
        } => {
            let config = ServerConfig {
                bind,
                rules: BoardRules::new(
                    grid_size,
                    margin,
                    DEFAULT_ADJACENCY_REQUIRED && !allow_touching,
                )?,
                challenge_ttl: Duration::from_secs(challenge_ttl),
                idle_timeout: Duration::from_secs(idle_timeout),
                seed,
            };
            if let Some(s) = seed {
                println!("Using fixed seed: {} (games will be reproducible)", s);
            }
            let listener = TcpListener::bind(&config.bind).await?;
            println!("Server listening on {}", listener.local_addr()?);
            server::run(listener, config).await?;
        }
        Commands::Play { connect, id, name } => {
            let identity = Identity::new(id.clone(), name.unwrap_or(id));
            println!("Connecting to {}...", connect);
            let transport = TcpTransport::connect(&connect).await?;
            let client = Client::connect(transport, identity).await?;
            println!(
                "Connected as {} ({}); board: {}",
                client.identity().id,
                client.connection(),
                client.rules()
            );
            print_help();
            run_interactive(client).await?;
        }
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  players                     list players you can challenge");
    println!("  challenge <id>              challenge a player");
    println!("  accept <id> | reject <id>   answer a challenge");
    println!("  solo                        play against the computer");
    println!("  place <ship> <cell> <h|v>   e.g. place carrier B2 h");
    println!("  auto                        place the whole fleet randomly");
    println!("  ready                       lock your fleet");
    println!("  shoot <cell>                e.g. shoot C7");
    println!("  board | quit | exit | help");
}

/// Turn one input line into an intent. `Ok(None)` means the line was
/// handled locally.
fn parse_command(
    line: &str,
    session: Option<&SessionKey>,
    rules: &BoardRules,
) -> Result<Option<ClientIntent>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let need_session = || {
        session
            .cloned()
            .ok_or_else(|| "Not in a game - challenge someone or start a solo game".to_string())
    };
    let parse_cell = |s: &str| {
        rules
            .parse_cell(s)
            .ok_or_else(|| format!("Invalid cell '{}' - use a letter and a row, e.g. A0", s))
    };

    let intent = match words.as_slice() {
        ["challenge", id] => ClientIntent::Challenge { to: (*id).into() },
        ["accept", id] => ClientIntent::AcceptChallenge { from: (*id).into() },
        ["reject", id] => ClientIntent::RejectChallenge { from: (*id).into() },
        ["solo"] => ClientIntent::StartSolo,
        ["place", ship, cell, orientation] => {
            let ship: ShipKind = ship.parse().map_err(|e: GameError| e.to_string())?;
            let anchor = parse_cell(*cell)?;
            let orientation = orientation
                .parse()
                .map_err(|_| format!("Invalid orientation '{}' - use h or v", orientation))?;
            ClientIntent::PlaceShip {
                session: need_session()?,
                ship,
                placement: Placement::new(anchor, orientation),
            }
        }
        ["auto"] => ClientIntent::AutoPlace {
            session: need_session()?,
        },
        ["ready"] => ClientIntent::ReadyUp {
            session: need_session()?,
        },
        ["shoot", cell] => ClientIntent::SubmitShot {
            session: need_session()?,
            cell: parse_cell(*cell)?,
        },
        ["quit"] => ClientIntent::Quit {
            session: need_session()?,
        },
        [] => return Ok(None),
        _ => return Err(format!("Unknown command '{}' - type help", line.trim())),
    };
    Ok(Some(intent))
}

async fn run_interactive(mut client: Client<TcpTransport>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut heartbeat = interval(Duration::from_secs(60));
    let mut session: Option<SessionKey> = None;
    let mut last_view = None;
    let rules = *client.rules();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "exit" => break,
                    "help" => print_help(),
                    "players" => client.list_players().await?,
                    "board" => match &last_view {
                        Some(view) => print!("{}", ui::render_view(view)),
                        None => println!("No game yet."),
                    },
                    other => match parse_command(other, session.as_ref(), &rules) {
                        Ok(Some(intent)) => client.send(intent).await?,
                        Ok(None) => {}
                        Err(msg) => println!("{}", msg),
                    },
                }
            }
            msg = client.recv() => match msg? {
                Message::Event(event) => match event {
                    ServerEvent::UpdateGameState(view) => {
                        print!("{}", ui::render_view(&view));
                        last_view = Some(view);
                    }
                    ServerEvent::StartGame { first, .. } => {
                        println!("Both fleets ready - the game begins (seat {:?} moves first).", first);
                    }
                    ServerEvent::UpdateBoard { shooter, cell, result, next_turn, .. } => {
                        let who = match &last_view {
                            Some(view) if view.seat == shooter => "You",
                            _ => "Opponent",
                        };
                        let what = match (result.hit, result.sunk, result.ship) {
                            (true, true, Some(ship)) => format!("hit and sank the {}", ship),
                            (true, _, _) => "hit".to_string(),
                            _ => "missed".to_string(),
                        };
                        println!("{} fired at {}: {}.", who, rules.notation(cell), what);
                        if let (Some(view), Some(next)) = (&last_view, next_turn) {
                            if view.seat == next {
                                println!("Your turn.");
                            }
                        }
                    }
                    ServerEvent::GameOver { outcome, winner, .. } => {
                        match winner {
                            Some(w) if w == client.identity().id => println!("VICTORY! ({:?})", outcome),
                            _ => println!("DEFEAT. ({:?})", outcome),
                        }
                        session = None;
                        last_view = None;
                    }
                    ServerEvent::ChallengeReceived { from } => {
                        println!("{} ({}) challenges you - accept {} / reject {}", from.display_name, from.id, from.id, from.id);
                    }
                    ServerEvent::ChallengeAccepted { session: key, seat } => {
                        println!("Game {} created; you are seat {:?}.", key, seat);
                        session = Some(key);
                    }
                    ServerEvent::ChallengeRejected { by, reason } => match reason {
                        RejectionReason::Declined => println!("{} declined your challenge.", by),
                        RejectionReason::TimedOut => println!("Your challenge to {} timed out.", by),
                        RejectionReason::Disconnected => println!("{} went offline.", by),
                        RejectionReason::Unavailable => println!("Challenge with {} is off: they started another game.", by),
                    },
                    ServerEvent::HasOpponent { session: key, opponent } => {
                        match opponent {
                            Some(o) => println!("Opponent: {} ({})", o.display_name, o.id),
                            None => println!("Opponent: computer"),
                        }
                        session = Some(key);
                    }
                },
                Message::Rejected(e) => println!("Rejected: {}", e),
                Message::Players(players) => {
                    if players.is_empty() {
                        println!("Nobody else is available.");
                    }
                    for p in players {
                        println!("  {} ({})", p.id, p.display_name);
                    }
                }
                other => log::debug!("ignoring {:?}", other),
            },
            _ = heartbeat.tick() => client.heartbeat().await?,
        }
    }
    Ok(())
}
