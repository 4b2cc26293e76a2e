use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use maze_duel_server::constants::TICK_MS;
use maze_duel_server::engine::GameEngine;
use maze_duel_server::score_store::ScoreStore;
use maze_duel_server::server_protocol::{parse_client_message, ParsedClientMessage};
use maze_duel_server::types::{Direction, DirectionIntent, InputSource, StartNames};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

type SharedState = Arc<Mutex<ServerState>>;

#[derive(Clone)]
struct ClientContext {
    tx: mpsc::Sender<OutboundMessage>,
    source: InputSource,
}

#[derive(Clone, Debug)]
enum OutboundMessage {
    Text(String),
    Close { code: u16, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

struct ServerState {
    clients: HashMap<String, ClientContext>,
    bridge_count: usize,
    game: Option<GameEngine>,
    // Bumped on every session start; a clock task that observes a newer
    // generation exits without touching the session, so two clocks never
    // advance the same process.
    clock_generation: u64,
    score_store: ScoreStore,
}

impl ServerState {
    fn new(score_store: ScoreStore) -> Self {
        Self {
            clients: HashMap::new(),
            bridge_count: 0,
            game: None,
            clock_generation: 0,
            score_store,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScoreQuery {
    limit: Option<String>,
}

#[tokio::main]
async fn main() {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let score_path = std::env::var("SCORE_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".data/scores.json"));

    let state = Arc::new(Mutex::new(ServerState::new(ScoreStore::new(score_path))));

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/scores", get(scores_handler))
        .route("/api/direction/{token}", post(direction_handler))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        println!(
            "[server] static file root: {}",
            static_dir.to_string_lossy()
        );
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    println!("[server] listening on :{port}");
    axum::serve(listener, app)
        .await
        .expect("server runtime failed");
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [PathBuf::from("dist/client")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn scores_handler(
    State(state): State<SharedState>,
    Query(query): Query<ScoreQuery>,
) -> impl IntoResponse {
    let guard = state.lock().await;
    Json(
        guard
            .score_store
            .build_response(parse_score_limit(query.limit.as_deref())),
    )
}

fn parse_score_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.parse::<usize>().ok())
}

/// Administrative single-shot direction injection. The token is routed
/// exactly like a player-1 bridge event; anything outside UP/DOWN/LEFT/RIGHT
/// is rejected without touching simulation state.
async fn direction_handler(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    let Some(dir) = Direction::parse_token(&token) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("unknown direction token '{token}'"),
            })),
        );
    };

    let mut guard = state.lock().await;
    let applied = match guard.game.as_mut() {
        Some(game) => game.set_intent(1, DirectionIntent::from_direction(dir)),
        None => false,
    };
    (StatusCode::OK, Json(json!({ "ok": true, "applied": applied })))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let client_id = make_id("client");
    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(256);

    {
        let mut guard = state.lock().await;
        guard.clients.insert(
            client_id.clone(),
            ClientContext {
                tx: tx.clone(),
                source: InputSource::NetworkPlayer,
            },
        );
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let should_close = matches!(outbound, OutboundMessage::Close { .. });
            let result = match outbound {
                OutboundMessage::Text(payload) => {
                    ws_sender.send(Message::Text(payload.into())).await
                }
                OutboundMessage::Close { code, reason } => {
                    let frame = CloseFrame {
                        code,
                        reason: reason.into(),
                    };
                    ws_sender.send(Message::Close(Some(frame))).await
                }
            };
            if result.is_err() || should_close {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(state.clone(), &client_id, raw.to_string()).await;
            }
            Message::Binary(raw) => {
                if let Ok(text) = String::from_utf8(raw.to_vec()) {
                    handle_client_message(state.clone(), &client_id, text).await;
                } else {
                    send_error_to_client(&state, &client_id, "invalid utf8 message").await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    handle_disconnect(state, &client_id).await;
    drop(tx);
    let _ = writer.await;
}

async fn handle_client_message(state: SharedState, client_id: &str, raw: String) {
    let Some(message) = parse_client_message(&raw) else {
        send_error_to_client(&state, client_id, "invalid message").await;
        return;
    };

    match message {
        ParsedClientMessage::StartSession {
            player1_name,
            player2_name,
        } => {
            handle_start_session(
                state,
                StartNames {
                    player1: player1_name,
                    player2: player2_name,
                },
            )
            .await;
        }
        ParsedClientMessage::PlayerDirection {
            player_index,
            intent,
        } => {
            let Ok(player_index) = usize::try_from(player_index) else {
                send_error_to_client(&state, client_id, "playerIndex must be 1 or 2").await;
                return;
            };
            let mut guard = state.lock().await;
            let accepted = match guard.game.as_mut() {
                Some(game) => game.set_intent(player_index, intent),
                None => true,
            };
            if !accepted {
                drop(guard);
                send_error_to_client(&state, client_id, "playerIndex must be 1 or 2").await;
            }
        }
        ParsedClientMessage::BridgeHello { simulated } => {
            let mut guard = state.lock().await;
            let source = if simulated {
                InputSource::SimulatedBridge
            } else {
                InputSource::HardwareBridge
            };
            let mut newly_bridged = false;
            if let Some(client) = guard.clients.get_mut(client_id) {
                if !client.source.is_bridge() {
                    newly_bridged = true;
                }
                client.source = source;
            }
            if newly_bridged {
                guard.bridge_count += 1;
                broadcast_bridge_status(&mut guard);
            }
        }
        ParsedClientMessage::BridgeDirection { intent } => {
            // Bridge events always drive player 1, whichever bridge
            // connection produced them.
            let mut guard = state.lock().await;
            if let Some(game) = guard.game.as_mut() {
                game.set_intent(1, intent);
            }
        }
        ParsedClientMessage::BridgeHeartbeat => {
            // Liveness only; connectivity did not change, so nothing is
            // broadcast and the simulation is untouched.
        }
    }
}

async fn handle_start_session(state: SharedState, names: StartNames) {
    let generation = {
        let mut guard = state.lock().await;
        // A new session replaces the old one wholesale; bumping the
        // generation first guarantees the previous clock can no longer
        // advance anything.
        guard.clock_generation += 1;
        let generation = guard.clock_generation;

        let engine = GameEngine::new(names, rand::random::<u32>());
        let display_names: Vec<String> = engine
            .final_scores()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        guard.game = Some(engine);

        println!(
            "[server] session started: {} vs {}",
            display_names[0], display_names[1]
        );
        broadcast(
            &mut guard,
            &json!({
                "type": "game_started",
                "player1Name": display_names[0],
                "player2Name": display_names[1],
            }),
            QueuePolicy::DisconnectOnFull,
        );
        generation
    };

    spawn_clock(state, generation);
}

fn spawn_clock(state: SharedState, generation: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            if guard.clock_generation != generation {
                // Superseded by a newer session.
                return;
            }
            if !tick_game(&mut guard) {
                return;
            }
        }
    });
}

/// One clock tick: advance the engine, broadcast the snapshot, and on the
/// terminal transition persist both players' scores exactly once before the
/// clock stops itself.
fn tick_game(state: &mut ServerState) -> bool {
    let snapshot = {
        let Some(game) = state.game.as_mut() else {
            return false;
        };
        game.step(TICK_MS);
        game.build_snapshot()
    };

    broadcast(
        state,
        &json!({
            "type": "game_update",
            "snapshot": snapshot,
        }),
        QueuePolicy::DropOnFull,
    );

    let finished = state
        .game
        .as_ref()
        .map(|game| game.is_ended())
        .unwrap_or(false);
    if finished {
        let scores = state
            .game
            .as_ref()
            .map(|game| game.final_scores())
            .unwrap_or_default();
        for (name, score) in scores {
            state.score_store.record_score(&name, score);
        }
        let winner = state
            .game
            .as_ref()
            .and_then(|game| game.winner().map(str::to_string));
        println!("[server] match over; winner: {}", winner.as_deref().unwrap_or("none"));
        return false;
    }
    true
}

async fn handle_disconnect(state: SharedState, client_id: &str) {
    let mut guard = state.lock().await;
    disconnect_client_internal(&mut guard, client_id);
}

fn disconnect_client_internal(state: &mut ServerState, client_id: &str) {
    let Some(context) = state.clients.remove(client_id) else {
        return;
    };
    if context.source.is_bridge() {
        state.bridge_count = state.bridge_count.saturating_sub(1);
        broadcast_bridge_status(state);
    }
}

fn broadcast_bridge_status(state: &mut ServerState) {
    broadcast(
        state,
        &json!({
            "type": "bridge_status",
            "connected": state.bridge_count > 0,
            "bridgeCount": state.bridge_count,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn send_to_client(state: &mut ServerState, client_id: &str, message: &Value, policy: QueuePolicy) {
    let send_failed = if let Some(client) = state.clients.get(client_id) {
        client
            .tx
            .try_send(OutboundMessage::Text(message.to_string()))
            .is_err()
    } else {
        false
    };
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        disconnect_client_internal(state, client_id);
    }
}

fn broadcast(state: &mut ServerState, message: &Value, policy: QueuePolicy) {
    let payload = message.to_string();
    let client_ids: Vec<String> = state.clients.keys().cloned().collect();
    let mut failed_clients = Vec::new();
    for client_id in client_ids {
        let Some(client) = state.clients.get(&client_id) else {
            continue;
        };
        if client
            .tx
            .try_send(OutboundMessage::Text(payload.clone()))
            .is_err()
            && policy == QueuePolicy::DisconnectOnFull
        {
            failed_clients.push(client_id);
        }
    }
    for client_id in failed_clients {
        disconnect_client_internal(state, &client_id);
    }
}

async fn send_error_to_client(state: &SharedState, client_id: &str, message: &str) {
    let mut guard = state.lock().await;
    send_to_client(
        &mut guard,
        client_id,
        &json!({
            "type": "error",
            "message": message,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}
