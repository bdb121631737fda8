//! HTTP client for the remote omok service.
//!
//! The service speaks a query-string protocol over GET:
//!
//! - `new/?strategy={name}` starts a game and returns its `pid`
//! - `play/?pid={pid}&x={row}&y={col}` sends our move and returns the
//!   service's reply move
//!
//! Every response is a JSON object with a boolean `response`; failures carry
//! a `reason`.

use crate::config::RemoteConfig;
use crate::games::omok::Place;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Errors talking to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RemoteError {
    /// The request could not be sent or the body could not be read.
    #[display("Transport error: {}", _0)]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[display("Remote service returned HTTP {}", _0)]
    Status(u16),

    /// The body was not the expected JSON shape.
    #[display("Malformed response: {}", _0)]
    Malformed(String),

    /// The service answered `response: false`.
    #[display("Remote service refused: {}", _0)]
    Rejected(String),

    /// No answer within the configured deadline.
    #[display("Remote service did not answer within {:?}", _0)]
    Timeout(Duration),

    /// The service replied with a move that cannot be played.
    #[display("Remote move {} is illegal: {}", place, reason)]
    IllegalMove {
        /// The move the service chose.
        place: Place,
        /// Why the board refused it.
        reason: String,
    },

    /// The base URL or a request path could not be built.
    #[display("Invalid remote URL: {}", _0)]
    InvalidUrl(String),
}

impl std::error::Error for RemoteError {}

impl RemoteError {
    /// Whether sending the same request again may succeed.
    ///
    /// A timed-out `play/` may still have been applied by the service, in
    /// which case the repeat comes back [`RemoteError::Rejected`]. Refusals
    /// and illegal replies are final for the current game.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RemoteError::Transport(_) | RemoteError::Timeout(_) | RemoteError::Status(_)
        )
    }
}

/// Body of a `new/` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGameResponse {
    /// Success flag.
    pub response: bool,
    /// Game identifier on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    /// Failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A move as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    /// Row.
    pub x: i32,
    /// Column.
    pub y: i32,
    /// Whether this move completed five in a row.
    #[serde(rename = "isWin", default)]
    pub is_win: bool,
    /// Whether this move filled the board without a win.
    #[serde(rename = "isDraw", default)]
    pub is_draw: bool,
    /// Winning line as flattened `[x1, y1, x2, y2, ...]`, empty unless a win.
    #[serde(default)]
    pub row: Vec<i32>,
}

impl WireMove {
    /// The move's coordinates.
    pub fn place(&self) -> Place {
        Place::new(self.x, self.y)
    }
}

/// Body of a `play/` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayResponse {
    /// Success flag.
    pub response: bool,
    /// Echo of the move we sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_move: Option<WireMove>,
    /// The service's reply move; absent when our move ended the game.
    #[serde(rename = "move", default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<WireMove>,
    /// Failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Parses a `new/` body into a game id.
#[instrument(skip(body))]
pub fn parse_new_game(body: &str) -> Result<String, RemoteError> {
    let parsed: NewGameResponse =
        serde_json::from_str(body).map_err(|e| RemoteError::Malformed(e.to_string()))?;
    if !parsed.response {
        return Err(RemoteError::Rejected(
            parsed.reason.unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }
    parsed
        .pid
        .ok_or_else(|| RemoteError::Malformed("missing pid".to_string()))
}

/// Parses a `play/` body into the service's reply move.
#[instrument(skip(body))]
pub fn parse_play(body: &str) -> Result<Place, RemoteError> {
    let parsed: PlayResponse =
        serde_json::from_str(body).map_err(|e| RemoteError::Malformed(e.to_string()))?;
    if !parsed.response {
        return Err(RemoteError::Rejected(
            parsed.reason.unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }
    parsed
        .reply
        .map(|m| m.place())
        .ok_or_else(|| RemoteError::Malformed("missing move".to_string()))
}

/// Stateless request/response client for the remote service.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: Url,
    client: reqwest::Client,
    timeout: Duration,
}

impl RemoteClient {
    /// Creates a client from configuration.
    #[instrument(skip(config), fields(base_url = %config.base_url()))]
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let mut base = config.base_url().clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
            timeout: config.timeout(),
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Starts a game with the given strategy and returns its id.
    #[instrument(skip(self))]
    pub async fn new_game(&self, strategy: &str) -> Result<String, RemoteError> {
        let body = self.get("new/", &[("strategy", strategy.to_string())]).await?;
        let pid = parse_new_game(&body)?;
        info!(%pid, "Remote game started");
        Ok(pid)
    }

    /// Sends our move and returns the service's reply.
    #[instrument(skip(self), fields(%place))]
    pub async fn play(&self, game_id: &str, place: Place) -> Result<Place, RemoteError> {
        let body = self
            .get(
                "play/",
                &[
                    ("pid", game_id.to_string()),
                    ("x", place.row.to_string()),
                    ("y", place.col.to_string()),
                ],
            )
            .await?;
        let reply = parse_play(&body)?;
        info!(%reply, "Received remote move");
        Ok(reply)
    }

    /// Issues a GET under the deadline and returns the body text.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, RemoteError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        debug!(%url, "Sending request");

        let request = async {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| RemoteError::Transport(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(RemoteError::Status(status.as_u16()));
            }
            response
                .text()
                .await
                .map_err(|e| RemoteError::Transport(e.to_string()))
        };

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(body)) => {
                debug!(body = %body, "Got response");
                Ok(body)
            }
            Ok(Err(e)) => {
                warn!(error = %e, %url, "Request failed");
                Err(e)
            }
            Err(_) => {
                warn!(%url, timeout = ?self.timeout, "Request timed out");
                Err(RemoteError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new_game_success() {
        let pid = parse_new_game(r#"{"response": true, "pid": "abc"}"#).unwrap();
        assert_eq!(pid, "abc");
    }

    #[test]
    fn test_parse_new_game_refused() {
        let err = parse_new_game(r#"{"response": false, "reason": "x"}"#).unwrap_err();
        assert_eq!(err, RemoteError::Rejected("x".to_string()));
    }

    #[test]
    fn test_parse_new_game_missing_pid() {
        assert!(matches!(
            parse_new_game(r#"{"response": true}"#),
            Err(RemoteError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_play_with_ack() {
        let body = r#"{"response": true,
            "ack_move": {"x": 4, "y": 5, "isWin": false, "isDraw": false, "row": []},
            "move": {"x": 4, "y": 6, "isWin": false, "isDraw": false, "row": []}}"#;
        assert_eq!(parse_play(body).unwrap(), Place::new(4, 6));
    }

    #[test]
    fn test_parse_play_minimal_move() {
        let body = r#"{"response": true, "move": {"x": 0, "y": 14}}"#;
        assert_eq!(parse_play(body).unwrap(), Place::new(0, 14));
    }

    #[test]
    fn test_parse_play_refused_without_reason() {
        let err = parse_play(r#"{"response": false}"#).unwrap_err();
        assert_eq!(err, RemoteError::Rejected("Unknown error".to_string()));
    }

    #[test]
    fn test_parse_play_garbage() {
        assert!(matches!(parse_play("<html>"), Err(RemoteError::Malformed(_))));
    }

    #[test]
    fn test_new_appends_trailing_slash() {
        let config = RemoteConfig::default().with_base_url("http://localhost:3000/omok");
        let client = RemoteClient::new(&config).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:3000/omok/");
        assert_eq!(
            client.base_url().join("new/").unwrap().as_str(),
            "http://localhost:3000/omok/new/"
        );
    }

    #[test]
    fn test_invalid_url() {
        let config = RemoteConfig::default().with_base_url("not a url");
        assert!(matches!(
            RemoteClient::new(&config),
            Err(RemoteError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(RemoteError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!RemoteError::Rejected("no".to_string()).is_retryable());
        assert!(
            !RemoteError::IllegalMove {
                place: Place::new(7, 7),
                reason: "occupied".to_string(),
            }
            .is_retryable()
        );
    }
}
