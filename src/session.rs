// Lockstep session loop and the connection seam it runs over
//
// One snapshot in, one move out, strictly alternating. Establishing and
// tearing down the session belongs to the connection implementation.

use log::{error, info, warn};
use rand::Rng;
use serde::Serialize;
use std::io::{BufRead, Write};
use thiserror::Error;

use crate::debug_logger::DebugLogger;
use crate::engine::{DecisionEngine, DecisionStats, EngineError};
use crate::types::{Direction, WorldSnapshot};

/// Errors that end a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("connection closed")]
    Closed,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Boundary with the game server
pub trait GameConnection {
    /// Whether the decision loop should keep running
    fn is_active(&mut self) -> bool;

    /// Blocks until a complete snapshot for the next tick arrives
    fn receive_snapshot(&mut self) -> Result<WorldSnapshot, SessionError>;

    /// Sends this tick's move without waiting for acknowledgment
    fn send_move(&mut self, direction: Direction) -> Result<(), SessionError>;
}

/// Outcome of a session that ended normally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub stats: DecisionStats,
}

/// Runs the decision loop while the connection stays active
///
/// Returns `SessionError::Engine(EngineError::Stuck { .. })` when the agent is
/// boxed in; no move is sent for that tick.
pub fn run_session<C, R>(
    connection: &mut C,
    engine: &mut DecisionEngine<R>,
    logger: &DebugLogger,
) -> Result<SessionSummary, SessionError>
where
    C: GameConnection,
    R: Rng,
{
    info!("{}: session started", engine.name());

    while connection.is_active() {
        let snapshot = connection.receive_snapshot()?;

        let decision = match engine.decide(&snapshot) {
            Ok(decision) => decision,
            Err(e) => {
                error!("Tick {}: {}", snapshot.tick, e);
                return Err(e.into());
            }
        };

        // A session plays exactly one game
        logger.log_move(0, engine.name(), &snapshot, &decision);
        connection.send_move(decision.direction)?;
    }

    let stats = engine.stats();
    info!(
        "{}: session ended after {} ticks (pattern {}, edge guard {}, fallback {})",
        engine.name(),
        stats.ticks,
        stats.pattern,
        stats.edge_guard,
        stats.fallback
    );

    Ok(SessionSummary { stats })
}

/// Newline-delimited JSON transport
///
/// Reads one `WorldSnapshot` per line and answers with one lowercase
/// direction name per line. The session ends at end of input.
pub struct JsonLinesConnection<R, W> {
    reader: R,
    writer: W,
    pending: Option<String>,
    closed: bool,
}

impl<R: BufRead, W: Write> JsonLinesConnection<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        JsonLinesConnection {
            reader,
            writer,
            pending: None,
            closed: false,
        }
    }

    /// Consumes the connection, returning the writer
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Buffers the next non-blank line, if any
    fn fill_pending(&mut self) {
        while self.pending.is_none() && !self.closed {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => self.closed = true,
                Ok(_) if line.trim().is_empty() => {}
                Ok(_) => self.pending = Some(line),
                Err(e) => {
                    warn!("Failed to read from connection: {}", e);
                    self.closed = true;
                }
            }
        }
    }
}

impl<R: BufRead, W: Write> GameConnection for JsonLinesConnection<R, W> {
    fn is_active(&mut self) -> bool {
        self.fill_pending();
        self.pending.is_some()
    }

    fn receive_snapshot(&mut self) -> Result<WorldSnapshot, SessionError> {
        self.fill_pending();
        let line = self.pending.take().ok_or(SessionError::Closed)?;

        let snapshot: WorldSnapshot = serde_json::from_str(line.trim())?;
        snapshot.validate().map_err(SessionError::InvalidSnapshot)?;
        Ok(snapshot)
    }

    fn send_move(&mut self, direction: Direction) -> Result<(), SessionError> {
        writeln!(self.writer, "{}", direction.as_str())?;
        self.writer.flush()?;
        Ok(())
    }
}
