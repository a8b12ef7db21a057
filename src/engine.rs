// Decision engine: one direction per tick, or a terminal Stuck
//
// Per tick, in order:
// 1. Locate ourselves in the snapshot
// 2. Edge guard (pattern counters untouched)
// 3. Spiral proposal (advances the spiral only when taken)
// 4. Fallback scan (pattern counters untouched)
// 5. Stuck: every later call fails with the same error

use log::{debug, error, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::edge_guard::EdgeGuard;
use crate::fallback::FallbackSelector;
use crate::pattern::PatternState;
use crate::trail::TrailMemory;
use crate::types::{Direction, Player, Position, WorldSnapshot};
use crate::validator::MoveValidator;

/// Which stage produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    EdgeGuard,
    Pattern,
    Fallback,
}

impl DecisionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionSource::EdgeGuard => "edge_guard",
            DecisionSource::Pattern => "pattern",
            DecisionSource::Fallback => "fallback",
        }
    }
}

/// A move chosen for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub direction: Direction,
    pub destination: Position,
    pub source: DecisionSource,
}

/// Errors escaping the decision engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No direction passed any stage; terminal
    #[error("{name}: no valid moves available at {position}")]
    Stuck { name: String, position: Position },

    /// The snapshot does not contain a player with our name
    #[error("player '{0}' not found in snapshot")]
    MissingSelf(String),
}

/// Per-source move counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecisionStats {
    pub ticks: u64,
    pub edge_guard: u64,
    pub pattern: u64,
    pub fallback: u64,
}

impl DecisionStats {
    fn record(&mut self, source: DecisionSource) {
        self.ticks += 1;
        match source {
            DecisionSource::EdgeGuard => self.edge_guard += 1,
            DecisionSource::Pattern => self.pattern += 1,
            DecisionSource::Fallback => self.fallback += 1,
        }
    }
}

/// Owns all per-agent state: spiral, trail memory and random source
pub struct DecisionEngine<R = StdRng> {
    name: String,
    validator: MoveValidator,
    edge_guard: Option<EdgeGuard>,
    fallback: FallbackSelector,
    use_trail: bool,
    pattern: PatternState,
    trail: TrailMemory,
    rng: R,
    stuck_at: Option<Position>,
    stats: DecisionStats,
}

impl DecisionEngine<StdRng> {
    /// Creates an engine whose RNG is seeded from `rng.seed`, or from the OS when unset
    pub fn from_config(name: impl Into<String>, config: &Config) -> Self {
        let rng = match config.rng.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(name, config, rng)
    }
}

impl<R: Rng> DecisionEngine<R> {
    /// Creates a new engine in the initial spiral state
    ///
    /// # Arguments
    /// * `name` - Our player name, used to find ourselves in each snapshot
    /// * `config` - Validator, edge guard, trail and fallback settings
    /// * `rng` - Random source used only by the shuffled fallback order
    pub fn new(name: impl Into<String>, config: &Config, rng: R) -> Self {
        DecisionEngine {
            name: name.into(),
            validator: MoveValidator::new(config.validator.edge_margin),
            edge_guard: config
                .edge_guard
                .enabled
                .then(|| EdgeGuard::new(config.edge_guard.border_margin)),
            fallback: FallbackSelector::new(config.fallback.shuffle),
            use_trail: config.trail.enabled,
            pattern: PatternState::default(),
            trail: TrailMemory::new(config.trail.capacity),
            rng,
            stuck_at: None,
            stats: DecisionStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern_state(&self) -> &PatternState {
        &self.pattern
    }

    pub fn trail(&self) -> &TrailMemory {
        &self.trail
    }

    pub fn stats(&self) -> DecisionStats {
        self.stats
    }

    pub fn is_stuck(&self) -> bool {
        self.stuck_at.is_some()
    }

    /// Chooses the move for this tick
    pub fn decide(&mut self, snapshot: &WorldSnapshot) -> Result<Decision, EngineError> {
        if let Some(position) = self.stuck_at {
            return Err(self.stuck_error(position));
        }

        let me = snapshot
            .find_player(&self.name)
            .cloned()
            .ok_or_else(|| EngineError::MissingSelf(self.name.clone()))?;

        self.decide_for(snapshot, &me)
    }

    fn decide_for(&mut self, snapshot: &WorldSnapshot, me: &Player) -> Result<Decision, EngineError> {
        if let Some(guard) = &self.edge_guard {
            if let Some(direction) = guard.force_inward(snapshot, me, &self.validator) {
                let destination = direction.apply(&me.position);
                return Ok(self.emit(direction, destination, DecisionSource::EdgeGuard));
            }
        }

        self.pattern.advance();
        let proposal = self.pattern.proposal();
        if let Ok(destination) = self.validator.check(snapshot, me, proposal) {
            if !self.vetoed_by_trail(&destination) {
                self.pattern.record_step();
                return Ok(self.emit(proposal, destination, DecisionSource::Pattern));
            }
            debug!(
                "{}: ({}, {}) visited recently, skipping spiral step",
                self.name, destination.x, destination.y
            );
        }

        let trail = self.use_trail.then_some(&self.trail);
        let fallback = self
            .fallback
            .select(snapshot, me, &self.validator, trail, &mut self.rng);

        if let Some((direction, destination)) = fallback {
            warn!("{}: fallback to direction {}", self.name, direction.as_str());
            return Ok(self.emit(direction, destination, DecisionSource::Fallback));
        }

        error!("{}: no valid moves available!", self.name);
        self.stuck_at = Some(me.position);
        Err(self.stuck_error(me.position))
    }

    fn vetoed_by_trail(&self, pos: &Position) -> bool {
        self.use_trail && self.trail.recently_visited(pos)
    }

    fn emit(&mut self, direction: Direction, destination: Position, source: DecisionSource) -> Decision {
        self.trail.remember(destination);
        self.stats.record(source);
        debug!(
            "{}: {} via {} to ({}, {})",
            self.name,
            direction.as_str(),
            source.as_str(),
            destination.x,
            destination.y
        );
        Decision {
            direction,
            destination,
            source,
        }
    }

    fn stuck_error(&self, position: Position) -> EngineError {
        EngineError::Stuck {
            name: self.name.clone(),
            position,
        }
    }
}
