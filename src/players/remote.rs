//! Opponent whose moves come from the remote service.

use super::{Controller, PlayerError, PlayerKind};
use crate::config::RemoteConfig;
use crate::games::omok::{Board, Place};
use crate::remote_client::{RemoteClient, RemoteError};
use tracing::{info, instrument};

/// Controller relaying moves through a [`RemoteClient`].
#[derive(Debug, Clone)]
pub struct RemoteOpponent {
    client: RemoteClient,
    strategy: String,
    game_id: Option<String>,
}

impl RemoteOpponent {
    /// Connects and starts a remote game.
    ///
    /// Failure here is fatal to starting the session.
    #[instrument(skip(config), fields(base_url = %config.base_url(), strategy = %config.strategy()))]
    pub async fn connect(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = RemoteClient::new(config)?;
        let mut opponent = Self {
            client,
            strategy: config.strategy().clone(),
            game_id: None,
        };
        opponent.start_game().await?;
        Ok(opponent)
    }

    /// Current remote game id; `None` after a reset until the next move.
    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    /// Strategy name requested from the service.
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    async fn start_game(&mut self) -> Result<&str, RemoteError> {
        let pid = self.client.new_game(&self.strategy).await?;
        info!(%pid, "Remote opponent ready");
        Ok(self.game_id.insert(pid).as_str())
    }
}

#[async_trait::async_trait]
impl Controller for RemoteOpponent {
    fn kind(&self) -> PlayerKind {
        PlayerKind::Remote
    }

    #[instrument(skip(self, _board), fields(game_id = ?self.game_id))]
    async fn produce_move(
        &mut self,
        _board: &Board,
        opponent_last: Option<Place>,
    ) -> Result<Place, PlayerError> {
        let ours = opponent_last.ok_or(PlayerError::NoOpponentMove)?;
        let game_id = match &self.game_id {
            Some(id) => id.clone(),
            None => self.start_game().await?.to_string(),
        };
        Ok(self.client.play(&game_id, ours).await?)
    }

    fn reset(&mut self) {
        self.game_id = None;
    }
}
