//! Tests for remote opponents against in-process HTTP services.

use axum::{Router, extract::State, routing::get};
use omok::{
    GameMode, GameSession, OmokConfig, Place, Player, PlayerKind, PlayerNames, RemoteConfig,
    RemoteError, RemoteOpponent, Seat, SessionError, SessionState, Stone, server,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const NEW_OK: &str = r#"{"response": true, "pid": "abc"}"#;

/// Serves `router` on an ephemeral port and returns its base URL.
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Bind test listener");
    let addr = listener.local_addr().expect("Local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server");
    });
    format!("http://{}/", addr)
}

/// Reference service hosting sequential opponents.
async fn spawn_reference() -> (String, server::ServerState) {
    let state = server::ServerState::default();
    let url = spawn(server::router(state.clone())).await;
    (url, state)
}

fn config_for(url: &str, strategy: &str) -> OmokConfig {
    OmokConfig::default().with_remote(
        RemoteConfig::default()
            .with_base_url(url)
            .with_strategy(strategy)
            .with_timeout_ms(2_000u64),
    )
}

async fn remote_session(url: &str, strategy: &str) -> GameSession {
    GameSession::start(
        GameMode::HumanVsRemote,
        &PlayerNames::default(),
        &config_for(url, strategy),
    )
    .await
    .expect("Remote session starts")
}

#[tokio::test]
async fn test_connect_keeps_pid() {
    let url = spawn(Router::new().route("/new/", get(|| async { NEW_OK }))).await;
    let opponent = RemoteOpponent::connect(config_for(&url, "Random").remote())
        .await
        .unwrap();
    assert_eq!(opponent.game_id(), Some("abc"));
    assert_eq!(opponent.strategy(), "Random");
}

#[tokio::test]
async fn test_refused_new_game_prevents_session() {
    let (url, state) = spawn_reference().await;
    let result = GameSession::start(
        GameMode::HumanVsRemote,
        &PlayerNames::default(),
        &config_for(&url, "Smart"),
    )
    .await;

    match result {
        Err(SessionError::Remote(RemoteError::Rejected(reason))) => {
            assert_eq!(reason, "Unknown strategy: Smart");
        }
        other => panic!("expected rejection, got {:?}", other.map(|s| s.state())),
    }
    assert!(state.is_empty());
}

#[tokio::test]
async fn test_new_game_refusal_reason_is_kept() {
    let router = Router::new().route(
        "/new/",
        get(|| async { r#"{"response": false, "reason": "x"}"# }),
    );
    let url = spawn(router).await;
    let result = RemoteOpponent::connect(config_for(&url, "Random").remote()).await;
    assert_eq!(
        result.map(|o| o.game_id().map(str::to_string)),
        Err(RemoteError::Rejected("x".to_string()))
    );
}

#[tokio::test]
async fn test_remote_replies_within_submit() {
    let (url, state) = spawn_reference().await;
    let mut session = remote_session(&url, "Sequential").await;
    assert_eq!(session.player(Seat::Second).kind(), PlayerKind::Remote);
    assert_eq!(session.player(Seat::Second).name(), "Remote");
    assert_eq!(state.len(), 1);

    let result = session.submit_move(7, 7).await.unwrap();
    assert_eq!(result, SessionState::AwaitingMove(Seat::First));
    assert_eq!(session.board().stones_placed(), 2);
    assert_eq!(session.board().occupant(7, 7), Some(Stone::Black));
    assert_eq!(session.board().occupant(0, 0), Some(Stone::White));
    assert_eq!(session.player(Seat::Second).last_move(), Some(Place::new(0, 0)));
}

#[tokio::test]
async fn test_remote_win_then_reset_starts_new_remote_game() {
    let (url, state) = spawn_reference().await;
    let mut session = remote_session(&url, "Sequential").await;

    for col in [0, 2, 4, 6] {
        session.submit_move(10, col).await.unwrap();
    }
    let result = session.submit_move(10, 8).await.unwrap();
    assert_eq!(result, SessionState::Won(Seat::Second));
    assert_eq!(session.winner().map(|p| p.name()), Some("Remote"));

    // The finished game no longer occupies the service's table.
    assert!(state.is_empty());

    session.reset();
    assert_eq!(session.board().stones_placed(), 0);
    assert!(state.is_empty());

    session.submit_move(3, 3).await.unwrap();
    assert_eq!(state.len(), 1);
    assert_eq!(session.board().occupant(0, 0), Some(Stone::White));
}

#[tokio::test]
async fn test_illegal_remote_move_keeps_remote_turn() {
    let router = Router::new()
        .route("/new/", get(|| async { NEW_OK }))
        .route(
            "/play/",
            get(|| async { r#"{"response": true, "move": {"x": 7, "y": 7}}"# }),
        );
    let url = spawn(router).await;
    let mut session = remote_session(&url, "Random").await;
    let mut events = session.subscribe();

    let err = session.submit_move(7, 7).await.unwrap_err();
    assert!(err.is_remote_failure());
    assert!(
        std::iter::from_fn(|| events.try_recv().ok()).any(|e| matches!(
            e,
            omok::GameEvent::RemoteFailure {
                retryable: false,
                ..
            }
        ))
    );
    assert!(matches!(
        err,
        SessionError::Remote(RemoteError::IllegalMove { place, .. }) if place == Place::new(7, 7)
    ));
    assert_eq!(session.current_seat(), Seat::Second);
    assert_eq!(session.state(), SessionState::AwaitingMove(Seat::Second));
    assert_eq!(session.board().stones_placed(), 1);

    assert!(matches!(
        session.submit_move(8, 8).await,
        Err(SessionError::AwaitingOpponent(_))
    ));
}

#[tokio::test]
async fn test_remote_timeout_is_reported() {
    let router = Router::new().route("/new/", get(|| async { NEW_OK })).route(
        "/play/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            r#"{"response": true, "move": {"x": 0, "y": 0}}"#
        }),
    );
    let url = spawn(router).await;
    let config = OmokConfig::default().with_remote(
        RemoteConfig::default()
            .with_base_url(url)
            .with_timeout_ms(100u64),
    );
    let mut session = GameSession::start(GameMode::HumanVsRemote, &PlayerNames::default(), &config)
        .await
        .unwrap();

    let err = session.submit_move(7, 7).await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Remote(RemoteError::Timeout(Duration::from_millis(100)))
    );
    assert_eq!(session.current_seat(), Seat::Second);
}

async fn flaky_play(State(calls): State<Arc<AtomicUsize>>) -> &'static str {
    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
        r#"{"response": false, "reason": "busy"}"#
    } else {
        r#"{"response": true, "ack_move": {"x": 7, "y": 7}, "move": {"x": 1, "y": 2}}"#
    }
}

#[tokio::test]
async fn test_advance_retries_after_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route("/new/", get(|| async { NEW_OK }))
        .route("/play/", get(flaky_play))
        .with_state(calls.clone());
    let url = spawn(router).await;
    let mut session = remote_session(&url, "Random").await;
    let mut events = session.subscribe();

    let err = session.submit_move(7, 7).await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Remote(RemoteError::Rejected("busy".to_string()))
    );
    assert!(
        std::iter::from_fn(|| events.try_recv().ok())
            .any(|e| matches!(e, omok::GameEvent::RemoteFailure { .. }))
    );

    let state = session.advance().await.unwrap();
    assert_eq!(state, SessionState::AwaitingMove(Seat::First));
    assert_eq!(session.last_move(), Some(Place::new(1, 2)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_http_error_status() {
    let url = spawn(Router::new().route("/new/", get(|| async { NEW_OK }))).await;
    let mut session = remote_session(&url, "Random").await;

    let err = session.submit_move(7, 7).await.unwrap_err();
    assert_eq!(err, SessionError::Remote(RemoteError::Status(404)));
    match err {
        SessionError::Remote(e) => assert!(e.is_retryable()),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_remote_cannot_sit_first() {
    let url = spawn(Router::new().route("/new/", get(|| async { NEW_OK }))).await;
    let opponent = RemoteOpponent::connect(config_for(&url, "Random").remote())
        .await
        .unwrap();
    let result = GameSession::new(
        Player::remote("", Stone::Black, opponent),
        Player::human("", Seat::Second, Stone::White),
        15,
    );
    assert!(matches!(result, Err(SessionError::Setup(_))));
}
