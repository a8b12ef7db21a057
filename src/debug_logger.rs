// Debug logging module for asynchronous per-tick decision logging
//
// Entries are handed to a single writer task over a channel, so logging never
// blocks the tick loop and lines land in the order they were logged. Each
// tick's snapshot and decision is written to a JSONL file that the replay tool
// can read back.

use log::error;
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};

use crate::engine::{Decision, DecisionSource};
use crate::types::WorldSnapshot;

/// Represents a single debug log entry
#[derive(Debug, Serialize)]
struct DebugLogEntry {
    game: u64,
    tick: u64,
    agent: String,
    chosen_move: String,
    source: DecisionSource,
    snapshot: WorldSnapshot,
    timestamp: String,
}

enum LogMessage {
    Entry(Box<DebugLogEntry>),
    /// Answered once every earlier entry has been written
    Flush(oneshot::Sender<()>),
}

/// Shared debug logger state
/// Clones share one writer task; a disabled logger has no sender
#[derive(Clone)]
pub struct DebugLogger {
    sender: Option<mpsc::UnboundedSender<LogMessage>>,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    /// and starts the writer task on the current runtime
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                let (sender, receiver) = mpsc::unbounded_channel();
                tokio::spawn(Self::write_loop(file, receiver));
                DebugLogger {
                    sender: Some(sender),
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger { sender: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Logs a decision asynchronously (fire-and-forget)
    /// `game` tells apart games that share one log file
    pub fn log_move(&self, game: u64, agent: &str, snapshot: &WorldSnapshot, decision: &Decision) {
        let Some(sender) = &self.sender else {
            return;
        };

        let entry = DebugLogEntry {
            game,
            tick: snapshot.tick,
            agent: agent.to_string(),
            chosen_move: decision.direction.as_str().to_string(),
            source: decision.source,
            snapshot: snapshot.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        if sender.send(LogMessage::Entry(Box::new(entry))).is_err() {
            error!("Debug log entry for tick {} dropped: writer stopped", snapshot.tick);
        }
    }

    /// Waits until every entry logged so far has been written to disk
    pub async fn flush(&self) {
        let Some(sender) = &self.sender else {
            return;
        };

        let (done, written) = oneshot::channel();
        if sender.send(LogMessage::Flush(done)).is_err() || written.await.is_err() {
            error!("Debug log writer stopped before flushing");
        }
    }

    async fn write_loop(mut file: File, mut receiver: mpsc::UnboundedReceiver<LogMessage>) {
        while let Some(message) = receiver.recv().await {
            match message {
                LogMessage::Entry(entry) => Self::write_entry(&mut file, &entry).await,
                LogMessage::Flush(done) => {
                    if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                    let _ = done.send(());
                }
            }
        }
    }

    /// Performs the actual file write
    async fn write_entry(file: &mut File, entry: &DebugLogEntry) {
        match serde_json::to_string(entry) {
            Ok(json_line) => {
                let line_with_newline = format!("{}\n", json_line);
                if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                    error!("Failed to write debug log entry: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to serialize debug log entry: {}", e);
            }
        }
    }
}
