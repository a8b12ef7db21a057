// Replay module for analyzing recorded sessions and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Replay the engine over the recorded snapshots
// 3. Compare recorded vs replayed moves
// 4. Generate analysis reports
//
// The engine carries state from tick to tick, so a replay always runs every
// entry of a game from its first tick in tick order, even when only some ticks
// are reported. Each game recorded in the log gets its own fresh engine.

use log::{info, warn};
use std::collections::BTreeMap;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::Config;
use crate::engine::{DecisionEngine, DecisionSource, EngineError};
use crate::types::{Direction, WorldSnapshot};

/// Represents a single log entry from the debug JSONL file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogEntry {
    /// Game number within the log; logs of a single session leave it out
    #[serde(default)]
    pub game: u64,
    pub tick: u64,
    pub agent: String,
    pub chosen_move: String,
    pub source: DecisionSource,
    pub snapshot: WorldSnapshot,
    #[serde(default)]
    pub timestamp: String,
}

/// Result of replaying a single tick
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub game: u64,
    pub tick: u64,
    pub original_move: Direction,
    pub original_source: DecisionSource,
    /// `None` when the replayed engine failed on this tick
    pub replayed_move: Option<Direction>,
    pub replayed_source: Option<DecisionSource>,
    pub failure: Option<EngineError>,
    pub matches: bool,
}

impl ReplayResult {
    /// Replayed move name, or what went wrong instead
    pub fn replayed_label(&self) -> &'static str {
        match (&self.replayed_move, &self.failure) {
            (Some(direction), _) => direction.as_str(),
            (None, Some(EngineError::MissingSelf(_))) => "missing self",
            (None, _) => "stuck",
        }
    }
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
    agent: Option<String>,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            config,
            verbose,
            agent: None,
        }
    }

    /// Replays as `agent` instead of the agent named in each entry
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file =
            File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[LogEntry]) -> Result<Vec<ReplayResult>, String> {
        self.replay_filtered(entries, |_| true)
    }

    /// Replays the log and reports only the requested ticks
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        ticks: &[u64],
    ) -> Result<Vec<ReplayResult>, String> {
        if let Some(missing) = ticks.iter().find(|t| !entries.iter().any(|e| e.tick == **t)) {
            return Err(format!("Turn {} not found in log file", missing));
        }

        self.replay_filtered(entries, |tick| ticks.contains(&tick))
    }

    fn replay_filtered<F>(&self, entries: &[LogEntry], report: F) -> Result<Vec<ReplayResult>, String>
    where
        F: Fn(u64) -> bool,
    {
        if entries.is_empty() {
            return Err("Log file has no entries".to_string());
        }

        let mut games: BTreeMap<u64, Vec<&LogEntry>> = BTreeMap::new();
        for entry in entries {
            games.entry(entry.game).or_default().push(entry);
        }
        if games.len() > 1 {
            info!("Log holds {} games, replaying each separately", games.len());
        }

        let mut results = Vec::new();
        for (game, mut ordered) in games {
            ordered.sort_by_key(|e| e.tick);
            let agent = self.agent.as_deref().unwrap_or(&ordered[0].agent);
            let mut engine = self.engine_for(agent);

            for entry in ordered {
                let result = self
                    .replay_entry(&mut engine, entry)
                    .map_err(|e| format!("Game {} turn {}: {}", game, entry.tick, e))?;

                if report(entry.tick) {
                    results.push(result);
                }
            }
        }

        Ok(results)
    }

    /// Builds a fresh engine; replays are reproducible only with a configured seed
    fn engine_for(&self, agent: &str) -> DecisionEngine<StdRng> {
        if self.config.fallback.shuffle && self.config.rng.seed.is_none() {
            warn!("Shuffled fallback without rng.seed: replayed fallback moves may differ");
        }
        DecisionEngine::from_config(agent, &self.config)
    }

    /// Replays a single log entry on the running engine and compares the result
    fn replay_entry(
        &self,
        engine: &mut DecisionEngine<StdRng>,
        entry: &LogEntry,
    ) -> Result<ReplayResult, String> {
        let original_move = Direction::parse(&entry.chosen_move)?;

        let (replayed_move, replayed_source, failure) = match engine.decide(&entry.snapshot) {
            Ok(decision) => (Some(decision.direction), Some(decision.source), None),
            Err(e) => (None, None, Some(e)),
        };

        let matches = replayed_move == Some(original_move);

        let result = ReplayResult {
            game: entry.game,
            tick: entry.tick,
            original_move,
            original_source: entry.source,
            replayed_move,
            replayed_source,
            failure,
            matches,
        };

        if self.verbose {
            if matches {
                info!("Turn {}: ✓ MATCH - {}", entry.tick, result.replayed_label());
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {} ({}), Replayed: {}",
                    entry.tick,
                    original_move.as_str(),
                    entry.source.as_str(),
                    result.replayed_label()
                );
            }
        }

        Ok(result)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        let fallbacks = results
            .iter()
            .filter(|r| r.replayed_source == Some(DecisionSource::Fallback))
            .count();
        let edge_guards = results
            .iter()
            .filter(|r| r.replayed_source == Some(DecisionSource::EdgeGuard))
            .count();
        println!("Edge Guard Moves:   {}", edge_guards);
        println!("Fallback Moves:     {}\n", fallbacks);

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Game {} turn {}: {} ({}) → {}",
                    result.game,
                    result.tick,
                    result.original_move.as_str(),
                    result.original_source.as_str(),
                    result.replayed_label()
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were recorded
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(u64, Vec<Direction>)], // (tick, acceptable_moves)
    ) -> Result<(), String> {
        for (tick, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.tick == *tick)
                .ok_or_else(|| format!("Turn {} not found in log", tick))?;

            let actual_move = Direction::parse(&entry.chosen_move)?;

            if !acceptable.contains(&actual_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    tick,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual_move.as_str()
                ));
            }
        }

        Ok(())
    }
}
