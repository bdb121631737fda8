//! Line-oriented terminal front-end.
//!
//! Reads commands from stdin, forwards them to a [`GameSession`] and prints
//! the events it emits. Diagnostics go to stderr through tracing.

use anyhow::Result;
use omok::{GameEvent, GameSession, Seat, SessionError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Move(i32, i32),
    Reset,
    Retry,
    Rename(Seat, String),
    Board,
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  <row> <col>       place a stone
  reset             start over (player 1 moves first)
  retry             ask the opponent again after a remote failure
  name <1|2> <name> rename a player
  board             show the board
  quit              leave";

fn parse_input(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let first = words.next()?;
    match first.to_ascii_lowercase().as_str() {
        "reset" => Some(Input::Reset),
        "retry" => Some(Input::Retry),
        "board" => Some(Input::Board),
        "help" | "?" => Some(Input::Help),
        "quit" | "exit" | "q" => Some(Input::Quit),
        "name" => {
            let seat = match words.next()? {
                "1" => Seat::First,
                "2" => Seat::Second,
                _ => return None,
            };
            Some(Input::Rename(seat, words.collect::<Vec<_>>().join(" ")))
        }
        _ => {
            let row = first.trim_end_matches(',').parse().ok()?;
            let col = words.next()?.parse().ok()?;
            words.next().is_none().then_some(Input::Move(row, col))
        }
    }
}

fn describe(event: &GameEvent) -> String {
    match event {
        GameEvent::MoveMade {
            player,
            stone,
            place,
            ..
        } => format!("{} ({}) played {}", player, stone, place),
        GameEvent::TurnChanged { player, .. } => format!("{} to move", player),
        GameEvent::Thinking { player, .. } => format!("{} is thinking...", player),
        GameEvent::GameOver {
            winner: Some(name),
            line,
        } => {
            let cells = line
                .as_ref()
                .map(|l| l.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            format!("{} wins! {}", name, cells)
        }
        GameEvent::GameOver { winner: None, .. } => "It's a draw!".to_string(),
        GameEvent::Rejected { reason } => format!("Not allowed: {}", reason),
        GameEvent::RemoteFailure {
            reason,
            retryable: true,
        } => format!("Opponent error (not your move): {}. Type 'retry'.", reason),
        GameEvent::RemoteFailure {
            reason,
            retryable: false,
        } => format!(
            "Opponent error (not your move): {}. Type 'reset' to start over.",
            reason
        ),
        GameEvent::Reset => "New game".to_string(),
        GameEvent::PlayerRenamed { seat, name } => format!("{} is now {}", seat, name),
    }
}

/// Prints queued events; redraws the board if any stone moved.
fn flush_events(session: &GameSession, events: &mut mpsc::UnboundedReceiver<GameEvent>) {
    let mut redraw = false;
    while let Ok(event) = events.try_recv() {
        redraw |= matches!(event, GameEvent::MoveMade { .. } | GameEvent::Reset);
        println!("{}", describe(&event));
    }
    if redraw {
        println!("{}", session.board().display());
    }
}

/// Runs the console loop until `quit` or end of input.
#[instrument(skip_all)]
pub async fn run(mut session: GameSession) -> Result<()> {
    let mut events = session.subscribe();
    println!("{}", HELP);
    println!("{}", session.board().display());
    println!(
        "{} ({}) vs {} ({})",
        session.player(Seat::First).name(),
        session.player(Seat::First).stone(),
        session.player(Seat::Second).name(),
        session.player(Seat::Second).stone(),
    );

    if session.current_player().is_autonomous() {
        report(session.advance().await);
    } else {
        println!("{} to move", session.current_player().name());
    }
    flush_events(&session, &mut events);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(input) = parse_input(&line) else {
            if !line.trim().is_empty() {
                println!("Unrecognised input. Type 'help'.");
            }
            continue;
        };
        debug!(?input, "Console input");

        match input {
            Input::Move(row, col) => report(session.submit_move(row, col).await),
            Input::Retry => report(session.advance().await),
            Input::Reset => {
                session.reset();
                if session.current_player().is_autonomous() {
                    report(session.advance().await);
                }
            }
            Input::Rename(seat, name) => session.rename(seat, name),
            Input::Board => println!("{}", session.board().display()),
            Input::Help => println!("{}", HELP),
            Input::Quit => break,
        }
        flush_events(&session, &mut events);
    }

    info!("Console closed");
    Ok(())
}

fn report<T>(result: Result<T, SessionError>) {
    match result {
        Ok(_) => {}
        Err(e) if e.is_remote_failure() => warn!(error = %e, "Remote failure"),
        Err(SessionError::GameOver) => println!("Game is over. Type 'reset' to play again."),
        Err(e) if e.is_invalid_input() => debug!(error = %e, "Input refused"),
        Err(e) => println!("Error: {}", e),
    }
}
