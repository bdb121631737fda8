//! Turn-based game session.
//!
//! A [`GameSession`] owns one [`Board`] and two [`Player`]s and sequences
//! moves between them:
//!
//! ```text
//! AwaitingMove(p) --valid move--> check terminal --+--> Won(p) | Draw
//!                                                  +--> AwaitingMove(other)
//! ```
//!
//! Human moves are pushed in with [`GameSession::submit_move`]. Computer and
//! remote players are asked for their move by the session as soon as it is
//! their turn. Each call runs placement, terminal check and turn switch as one
//! unit before returning; the remote round trip is the only suspension point.

use crate::config::OmokConfig;
use crate::games::omok::{Board, BoardError, MAX_SIZE, MIN_SIZE, Place, Seat, Stone};
use crate::mode::{GameMode, PlayerNames};
use crate::players::{Player, PlayerError, PlayerKind, RandomStrategy, RemoteOpponent, Strategy};
use crate::remote_client::RemoteError;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Where the state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the player in this seat.
    AwaitingMove(Seat),
    /// The player in this seat made five in a row.
    Won(Seat),
    /// The board filled up without a winner.
    Draw,
}

impl SessionState {
    /// True for `Won` and `Draw`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionState::AwaitingMove(_))
    }
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A stone was placed.
    MoveMade {
        /// Seat that moved.
        seat: Seat,
        /// Name of the player that moved.
        player: String,
        /// Stone placed.
        stone: Stone,
        /// Where.
        place: Place,
    },
    /// The turn passed to another player.
    TurnChanged {
        /// Seat now to move.
        seat: Seat,
        /// Name of the player now to move.
        player: String,
    },
    /// An autonomous player started working on its move.
    Thinking {
        /// Seat thinking.
        seat: Seat,
        /// Name of the player thinking.
        player: String,
    },
    /// The game ended.
    GameOver {
        /// Winner's name, `None` on a draw.
        winner: Option<String>,
        /// Cells to highlight.
        line: Option<Vec<Place>>,
    },
    /// A human move was refused; nothing changed.
    Rejected {
        /// Why.
        reason: String,
    },
    /// The remote opponent failed; its turn did not complete.
    RemoteFailure {
        /// Why.
        reason: String,
        /// Whether [`GameSession::advance`] may succeed; otherwise reset.
        retryable: bool,
    },
    /// The board was cleared and player 1 is to move.
    Reset,
    /// A player changed name.
    PlayerRenamed {
        /// Seat renamed.
        seat: Seat,
        /// New name.
        name: String,
    },
}

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SessionError {
    /// Invalid input: the move was refused by the board.
    #[display("{}", _0)]
    Board(BoardError),

    /// The remote opponent failed; retry with [`GameSession::advance`].
    #[display("Remote opponent failed: {}", _0)]
    Remote(RemoteError),

    /// The game has ended; reset before playing again.
    #[display("Game is already over")]
    GameOver,

    /// A human move arrived while an autonomous player is to move.
    #[display("Waiting for {} to move", _0)]
    AwaitingOpponent(String),

    /// `advance` was called while a human is to move.
    #[display("{} moves by input, not on request", _0)]
    NotAutonomous(String),

    /// The session could not be set up.
    #[display("Invalid session setup: {}", _0)]
    Setup(String),

    /// A local strategy produced a move the board refused.
    #[display("Computer chose illegal move {}: {}", place, reason)]
    InvalidComputerMove {
        /// The move chosen.
        place: Place,
        /// Why the board refused it.
        reason: String,
    },

    /// A local player failed to produce a move.
    #[display("Player failed to move: {}", _0)]
    Player(PlayerError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Board(e) => Some(e),
            SessionError::Remote(e) => Some(e),
            SessionError::Player(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BoardError> for SessionError {
    fn from(err: BoardError) -> Self {
        SessionError::Board(err)
    }
}

impl SessionError {
    /// The remote side, not local input, is at fault.
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, SessionError::Remote(_))
    }

    /// The caller's input was refused and nothing changed.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            SessionError::Board(_) | SessionError::GameOver | SessionError::AwaitingOpponent(_)
        )
    }

    /// An engine invariant was broken by a collaborator.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidComputerMove { .. } | SessionError::Player(_)
        )
    }
}

/// One match between two players on one board.
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    players: [Player; 2],
    current: Seat,
    state: SessionState,
    event_tx: Option<mpsc::UnboundedSender<GameEvent>>,
}

impl GameSession {
    /// Creates a session; player 1 moves first.
    ///
    /// # Errors
    ///
    /// [`SessionError::Setup`] if both players share a stone color, the board
    /// size is outside [`MIN_SIZE`]..=[`MAX_SIZE`], or a remote player sits
    /// first (the remote protocol cannot open a game).
    #[instrument(skip(first, second), fields(first = %first.name(), second = %second.name()))]
    pub fn new(first: Player, second: Player, board_size: usize) -> Result<Self, SessionError> {
        if first.stone() == second.stone() {
            return Err(SessionError::Setup(format!(
                "both players use {} stones",
                first.stone()
            )));
        }
        if !(MIN_SIZE..=MAX_SIZE).contains(&board_size) {
            return Err(SessionError::Setup(format!(
                "board size {} is outside {}..={}",
                board_size, MIN_SIZE, MAX_SIZE
            )));
        }
        if first.kind() == PlayerKind::Remote {
            return Err(SessionError::Setup(
                "a remote opponent cannot take the first seat".to_string(),
            ));
        }
        info!(board_size, "Creating new game session");
        Ok(Self {
            board: Board::new(board_size),
            players: [first, second],
            current: Seat::First,
            state: SessionState::AwaitingMove(Seat::First),
            event_tx: None,
        })
    }

    /// Builds the players for `mode` and creates a session.
    ///
    /// The computer seat uses [`RandomStrategy`]. For
    /// [`GameMode::HumanVsRemote`] a remote game is started first; if that
    /// fails no session is created.
    pub async fn start(
        mode: GameMode,
        names: &PlayerNames,
        config: &OmokConfig,
    ) -> Result<Self, SessionError> {
        Self::start_with_strategy(mode, names, config, Box::new(RandomStrategy)).await
    }

    /// Like [`GameSession::start`] with an explicit computer strategy.
    #[instrument(skip(names, config, strategy), fields(mode = %mode))]
    pub async fn start_with_strategy(
        mode: GameMode,
        names: &PlayerNames,
        config: &OmokConfig,
        strategy: Box<dyn Strategy>,
    ) -> Result<Self, SessionError> {
        let first = Player::human(names.first.clone(), Seat::First, Stone::Black);
        let second = match mode {
            GameMode::HumanVsHuman => {
                Player::human(names.second.clone(), Seat::Second, Stone::White)
            }
            GameMode::HumanVsComputer => {
                Player::computer(names.second.clone(), Stone::White, strategy)
            }
            GameMode::HumanVsRemote => {
                let opponent = RemoteOpponent::connect(config.remote()).await.map_err(|e| {
                    error!(error = %e, "Failed to start remote game");
                    SessionError::Remote(e)
                })?;
                Player::remote(names.second.clone(), Stone::White, opponent)
            }
        };
        Self::new(first, second, *config.board_size())
    }

    /// Returns a receiver for [`GameEvent`]s, replacing any earlier one.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_tx = Some(tx);
        rx
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True once won or drawn.
    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seat of the current player. After a win this is the winner.
    pub fn current_seat(&self) -> Seat {
        self.current
    }

    /// The current player.
    pub fn current_player(&self) -> &Player {
        self.player(self.current)
    }

    /// Player in `seat`.
    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    /// The winner, if the game was won.
    pub fn winner(&self) -> Option<&Player> {
        match self.state {
            SessionState::Won(seat) => Some(self.player(seat)),
            _ => None,
        }
    }

    /// Most recent placement on the board.
    pub fn last_move(&self) -> Option<Place> {
        self.board.last_move()
    }

    /// Cells of the winning line, for highlighting.
    pub fn winning_line(&self) -> Option<Vec<Place>> {
        self.board.winning_line()
    }

    /// Renames the player in `seat`; empty input restores the default name.
    #[instrument(skip(self, name))]
    pub fn rename(&mut self, seat: Seat, name: impl Into<String>) {
        let player = &mut self.players[seat.index()];
        player.rename(name);
        let name = player.name().to_string();
        self.emit(GameEvent::PlayerRenamed { seat, name });
    }

    /// Plays a human move at `(row, col)` for the current player.
    ///
    /// If the next player is a computer or remote opponent, its reply is
    /// requested before returning.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Board`] / [`SessionError::GameOver`] /
    ///   [`SessionError::AwaitingOpponent`]: refused, nothing changed.
    /// - [`SessionError::Remote`]: the human move stands but the remote
    ///   reply failed; the remote player is still to move.
    #[instrument(skip(self), fields(seat = %self.current))]
    pub async fn submit_move(&mut self, row: i32, col: i32) -> Result<SessionState, SessionError> {
        self.ensure_in_progress()?;
        let seat = self.current;
        if self.player(seat).is_autonomous() {
            let name = self.player(seat).name().to_string();
            warn!(player = %name, "Human move while opponent is to move");
            self.emit(GameEvent::Rejected {
                reason: format!("Waiting for {}", name),
            });
            return Err(SessionError::AwaitingOpponent(name));
        }

        if let Err(e) = self.place_for(seat, row, col) {
            warn!(row, col, error = %e, "Invalid move");
            self.emit(GameEvent::Rejected {
                reason: e.to_string(),
            });
            return Err(e.into());
        }

        if self.conclude_turn(seat).is_terminal() {
            return Ok(self.state);
        }

        // Let the caller's runtime observe the human move before the reply.
        tokio::task::yield_now().await;
        self.run_autonomous().await
    }

    /// Asks the current (computer or remote) player for its move.
    ///
    /// Used to open a game when the first seat is a computer, and to retry
    /// after a remote failure.
    ///
    /// A retry sends the same opponent move again. If the service already
    /// applied it (it answered after the deadline, or its reply was an
    /// illegal move) the service refuses the repeat and every retry fails;
    /// [`RemoteError::is_retryable`] is false for those errors and the way
    /// out is [`GameSession::reset`].
    #[instrument(skip(self), fields(seat = %self.current))]
    pub async fn advance(&mut self) -> Result<SessionState, SessionError> {
        self.ensure_in_progress()?;
        let seat = self.current;
        if !self.player(seat).is_autonomous() {
            return Err(SessionError::NotAutonomous(self.player(seat).name().to_string()));
        }
        self.run_autonomous().await
    }

    /// Lets autonomous players move until a human is to move or the game ends.
    #[instrument(skip(self))]
    pub async fn run_autonomous(&mut self) -> Result<SessionState, SessionError> {
        while let SessionState::AwaitingMove(seat) = self.state {
            if !self.player(seat).is_autonomous() {
                break;
            }
            self.autonomous_move(seat).await?;
        }
        Ok(self.state)
    }

    /// Clears the board and gives the move to player 1.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.board.clear();
        for player in &mut self.players {
            player.reset();
        }
        self.current = Seat::First;
        self.state = SessionState::AwaitingMove(Seat::First);
        info!("Game reset");
        self.emit(GameEvent::Reset);
        self.emit_turn();
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.is_over() {
            debug!(state = ?self.state, "Move after game over");
            return Err(SessionError::GameOver);
        }
        Ok(())
    }

    /// Requests, validates and applies one autonomous move.
    async fn autonomous_move(&mut self, seat: Seat) -> Result<(), SessionError> {
        let opponent_last = self.player(seat.other()).last_move();
        self.emit(GameEvent::Thinking {
            seat,
            player: self.player(seat).name().to_string(),
        });

        let player = &mut self.players[seat.index()];
        let kind = player.kind();
        let place = match player.produce_move(&self.board, opponent_last).await {
            Ok(place) => place,
            Err(PlayerError::Remote(e)) => return Err(self.remote_failure(e)),
            Err(e) => {
                error!(error = %e, %kind, "Autonomous player failed to move");
                return Err(SessionError::Player(e));
            }
        };

        if let Err(e) = self.place_for(seat, place.row, place.col) {
            let reason = e.to_string();
            return Err(match kind {
                PlayerKind::Remote => {
                    self.remote_failure(RemoteError::IllegalMove { place, reason })
                }
                _ => {
                    error!(%place, %reason, "Computer strategy chose an illegal move");
                    SessionError::InvalidComputerMove { place, reason }
                }
            });
        }

        self.conclude_turn(seat);
        Ok(())
    }

    fn remote_failure(&self, err: RemoteError) -> SessionError {
        let retryable = err.is_retryable();
        warn!(error = %err, retryable, "Remote opponent failed");
        self.emit(GameEvent::RemoteFailure {
            reason: err.to_string(),
            retryable,
        });
        SessionError::Remote(err)
    }

    /// Places the seat's stone and records it as the player's last move.
    fn place_for(&mut self, seat: Seat, row: i32, col: i32) -> Result<Place, BoardError> {
        let player = &mut self.players[seat.index()];
        let place = self.board.place(row, col, player.stone())?;
        player.record_move(place);
        info!(player = %player.name(), stone = %player.stone(), %place, "Move made");
        let event = GameEvent::MoveMade {
            seat,
            player: player.name().to_string(),
            stone: player.stone(),
            place,
        };
        self.emit(event);
        Ok(place)
    }

    /// Decides win, draw or next turn after `seat` moved.
    fn conclude_turn(&mut self, seat: Seat) -> SessionState {
        let stone = self.player(seat).stone();
        self.state = if self.board.is_won_by(stone) {
            SessionState::Won(seat)
        } else if self.board.is_draw() {
            SessionState::Draw
        } else {
            self.current = seat.other();
            SessionState::AwaitingMove(self.current)
        };

        match self.state {
            SessionState::AwaitingMove(_) => self.emit_turn(),
            SessionState::Won(winner) => {
                let name = self.player(winner).name().to_string();
                info!(winner = %name, "Game won");
                self.emit(GameEvent::GameOver {
                    winner: Some(name),
                    line: self.board.winning_line(),
                });
            }
            SessionState::Draw => {
                info!("Game drawn");
                self.emit(GameEvent::GameOver {
                    winner: None,
                    line: None,
                });
            }
        }
        self.state
    }

    fn emit_turn(&self) {
        self.emit(GameEvent::TurnChanged {
            seat: self.current,
            player: self.current_player().name().to_string(),
        });
    }

    fn emit(&self, event: GameEvent) {
        if let Some(tx) = &self.event_tx
            && tx.send(event).is_err()
        {
            debug!("Event receiver dropped");
        }
    }
}
