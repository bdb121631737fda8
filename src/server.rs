//! Reference implementation of the remote omok service.
//!
//! Serves `GET new/?strategy=` and `GET play/?pid=&x=&y=` with the same JSON
//! shapes [`RemoteClient`](crate::RemoteClient) expects. The client always
//! plays black and the service plays white. A game is dropped from the table
//! as soon as it is won or drawn; later moves for its pid get "Unknown pid".

use crate::games::omok::{Board, DEFAULT_SIZE, MAX_SIZE, MIN_SIZE, Place, Stone, rules};
use crate::players::{RandomStrategy, SequentialStrategy, Strategy};
use crate::remote_client::{NewGameResponse, PlayResponse, WireMove};
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Strategy names the service accepts.
pub const STRATEGIES: [&str; 2] = ["Random", "Sequential"];

fn strategy_by_name(name: &str) -> Option<Box<dyn Strategy>> {
    match name.to_ascii_lowercase().as_str() {
        "random" => Some(Box::new(RandomStrategy)),
        "sequential" => Some(Box::new(SequentialStrategy)),
        _ => None,
    }
}

/// One game hosted by the service.
#[derive(Debug)]
struct HostedGame {
    board: Board,
    strategy: Box<dyn Strategy>,
    over: bool,
}

impl HostedGame {
    /// Places `stone` and reports the result the way the wire expects.
    fn play(&mut self, place: Place, stone: Stone) -> Result<WireMove, String> {
        self.board
            .place(place.row, place.col, stone)
            .map_err(|_| "Place not empty".to_string())?;
        let line = rules::winning_line_through(self.board.grid(), place, stone);
        let is_win = line.is_some();
        let is_draw = !is_win && self.board.is_draw();
        self.over = is_win || is_draw;
        Ok(WireMove {
            x: place.row,
            y: place.col,
            is_win,
            is_draw,
            row: line
                .unwrap_or_default()
                .into_iter()
                .flat_map(|p| [p.row, p.col])
                .collect(),
        })
    }
}

/// Shared table of games still in progress.
#[derive(Debug, Clone)]
pub struct ServerState {
    games: Arc<Mutex<HashMap<String, HostedGame>>>,
    board_size: usize,
}

impl ServerState {
    /// Creates an empty table for boards of `board_size`, clamped to
    /// [`MIN_SIZE`]..=[`MAX_SIZE`].
    #[instrument]
    pub fn new(board_size: usize) -> Self {
        Self {
            games: Arc::new(Mutex::new(HashMap::new())),
            board_size: board_size.clamp(MIN_SIZE, MAX_SIZE),
        }
    }

    /// Number of games in progress.
    pub fn len(&self) -> usize {
        self.games.lock().map(|g| g.len()).unwrap_or(0)
    }

    /// True when no game is in progress.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

/// Query string of `new/`.
#[derive(Debug, Deserialize)]
struct NewQuery {
    strategy: Option<String>,
}

/// Query string of `play/`. Coordinates are kept as text so bad numbers get a
/// protocol-level refusal instead of an HTTP 400.
#[derive(Debug, Deserialize)]
struct PlayQuery {
    pid: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

fn refuse_new(reason: impl Into<String>) -> Json<NewGameResponse> {
    let reason = reason.into();
    warn!(%reason, "Refusing new game");
    Json(NewGameResponse {
        response: false,
        pid: None,
        reason: Some(reason),
    })
}

fn refuse_play(reason: impl Into<String>) -> Json<PlayResponse> {
    let reason = reason.into();
    warn!(%reason, "Refusing move");
    Json(PlayResponse {
        response: false,
        ack_move: None,
        reply: None,
        reason: Some(reason),
    })
}

#[instrument(skip(state))]
async fn new_game(
    State(state): State<ServerState>,
    Query(query): Query<NewQuery>,
) -> Json<NewGameResponse> {
    let Some(name) = query.strategy else {
        return refuse_new("Strategy not specified");
    };
    let Some(strategy) = strategy_by_name(&name) else {
        return refuse_new(format!("Unknown strategy: {}", name));
    };

    let pid = format!("{:016x}", rand::random::<u64>());
    let game = HostedGame {
        board: Board::new(state.board_size),
        strategy,
        over: false,
    };
    match state.games.lock() {
        Ok(mut games) => {
            games.insert(pid.clone(), game);
        }
        Err(_) => return refuse_new("Server state unavailable"),
    }
    info!(%pid, strategy = %name, "Hosted game created");
    Json(NewGameResponse {
        response: true,
        pid: Some(pid),
        reason: None,
    })
}

fn parse_coordinate(value: Option<&str>, axis: &str, size: usize) -> Result<i32, String> {
    let raw = value.ok_or_else(|| format!("{} not specified", axis))?;
    let parsed: i32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("Invalid {} coordinate, {}", axis, raw))?;
    if parsed < 0 || parsed as usize >= size {
        return Err(format!("Invalid {} coordinate, {}", axis, raw));
    }
    Ok(parsed)
}

#[instrument(skip(state))]
async fn play(
    State(state): State<ServerState>,
    Query(query): Query<PlayQuery>,
) -> Json<PlayResponse> {
    let Some(pid) = query.pid else {
        return refuse_play("Pid not specified");
    };
    let x = match parse_coordinate(query.x.as_deref(), "x", state.board_size) {
        Ok(x) => x,
        Err(reason) => return refuse_play(reason),
    };
    let y = match parse_coordinate(query.y.as_deref(), "y", state.board_size) {
        Ok(y) => y,
        Err(reason) => return refuse_play(reason),
    };

    let Ok(mut games) = state.games.lock() else {
        return refuse_play("Server state unavailable");
    };
    let Some(game) = games.get_mut(&pid) else {
        return refuse_play("Unknown pid");
    };

    let ack = match game.play(Place::new(x, y), Stone::Black) {
        Ok(ack) => ack,
        Err(reason) => return refuse_play(reason),
    };
    debug!(%pid, x, y, is_win = ack.is_win, "Client move accepted");

    let reply = if game.over {
        None
    } else {
        let chosen = game.strategy.best_move(&game.board);
        match chosen.map(|place| game.play(place, Stone::White)) {
            Some(Ok(reply)) => Some(reply),
            Some(Err(reason)) => return refuse_play(reason),
            None => None,
        }
    };
    if let Some(reply) = &reply {
        debug!(%pid, x = reply.x, y = reply.y, "Service replied");
    }
    if game.over {
        games.remove(&pid);
        info!(%pid, remaining = games.len(), "Hosted game finished");
    }

    Json(PlayResponse {
        response: true,
        ack_move: Some(ack),
        reply,
        reason: None,
    })
}

/// Builds the service router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/new/", get(new_game))
        .route("/play/", get(play))
        .with_state(state)
}

/// Serves the reference service until the listener fails.
#[instrument(skip(listener, state))]
pub async fn serve(listener: tokio::net::TcpListener, state: ServerState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, strategies = ?STRATEGIES, "Omok service listening");
    }
    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_lookup_is_case_insensitive() {
        assert!(strategy_by_name("random").is_some());
        assert!(strategy_by_name("SEQUENTIAL").is_some());
        assert!(strategy_by_name("Smart").is_none());
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate(Some("3"), "x", 15), Ok(3));
        assert!(parse_coordinate(Some("15"), "x", 15).is_err());
        assert!(parse_coordinate(Some("-1"), "y", 15).is_err());
        assert!(parse_coordinate(Some("abc"), "y", 15).is_err());
        assert!(parse_coordinate(None, "x", 15).is_err());
    }

    #[test]
    fn test_hosted_game_reports_win_row() {
        let mut game = HostedGame {
            board: Board::new(15),
            strategy: Box::new(SequentialStrategy),
            over: false,
        };
        for col in 0..4 {
            assert!(!game.play(Place::new(5, col), Stone::Black).unwrap().is_win);
        }
        let last = game.play(Place::new(5, 4), Stone::Black).unwrap();
        assert!(last.is_win);
        assert_eq!(last.row, vec![5, 0, 5, 1, 5, 2, 5, 3, 5, 4]);
        assert!(game.over);
    }

    async fn start(state: &ServerState) -> String {
        let Json(started) = new_game(
            State(state.clone()),
            Query(NewQuery {
                strategy: Some("Sequential".to_string()),
            }),
        )
        .await;
        started.pid.unwrap()
    }

    async fn send(state: &ServerState, pid: &str, x: i32, y: i32) -> PlayResponse {
        let Json(response) = play(
            State(state.clone()),
            Query(PlayQuery {
                pid: Some(pid.to_string()),
                x: Some(x.to_string()),
                y: Some(y.to_string()),
            }),
        )
        .await;
        response
    }

    #[tokio::test]
    async fn test_finished_game_leaves_table() {
        let state = ServerState::default();
        let pid = start(&state).await;
        let other = start(&state).await;
        assert_eq!(state.len(), 2);

        // Sequential answers along row 0, so black wins on row 10 first.
        for col in 0..4 {
            let response = send(&state, &pid, 10, col).await;
            assert!(response.response);
            assert!(response.reply.is_some());
        }
        let last = send(&state, &pid, 10, 4).await;
        assert!(last.ack_move.unwrap().is_win);
        assert!(last.reply.is_none());
        assert_eq!(state.len(), 1);

        let late = send(&state, &pid, 11, 0).await;
        assert!(!late.response);
        assert_eq!(late.reason.as_deref(), Some("Unknown pid"));
        assert!(send(&state, &other, 7, 7).await.response);
    }

    #[test]
    fn test_board_size_is_clamped() {
        assert_eq!(ServerState::new(100_000).board_size, MAX_SIZE);
        assert_eq!(ServerState::new(1).board_size, MIN_SIZE);
    }

    #[test]
    fn test_hosted_game_refuses_occupied() {
        let mut game = HostedGame {
            board: Board::new(15),
            strategy: Box::new(SequentialStrategy),
            over: false,
        };
        game.play(Place::new(0, 0), Stone::Black).unwrap();
        assert_eq!(
            game.play(Place::new(0, 0), Stone::White),
            Err("Place not empty".to_string())
        );
    }
}
