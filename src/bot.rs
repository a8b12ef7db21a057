// Bot facade used by the HTTP transport
//
// The arena posts one snapshot per tick to /move and waits for the answer,
// so each request is one lockstep tick. A mutex keeps ticks strictly
// sequential even though the web server is multi-threaded.

use log::{error, info, warn};
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::engine::{DecisionEngine, EngineError};
use crate::types::WorldSnapshot;

/// Engine of the game in progress, numbered so log entries can be grouped
struct ActiveGame {
    id: u64,
    engine: DecisionEngine,
}

impl ActiveGame {
    fn next(games_started: &mut u64, name: &str, config: &Config) -> Self {
        let id = *games_started;
        *games_started += 1;
        ActiveGame {
            id,
            engine: DecisionEngine::from_config(name, config),
        }
    }
}

#[derive(Default)]
struct GameState {
    games_started: u64,
    current: Option<ActiveGame>,
}

/// Spiral bot with one decision engine per game
pub struct Bot {
    config: Config,
    name: String,
    logger: DebugLogger,
    state: Mutex<GameState>,
}

impl Bot {
    /// Creates a new Bot instance
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    /// * `name` - Player name used to find ourselves in each snapshot
    /// * `logger` - Per-tick debug logger (may be disabled)
    pub fn new(config: Config, name: impl Into<String>, logger: DebugLogger) -> Self {
        Bot {
            config,
            name: name.into(),
            logger,
            state: Mutex::new(GameState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns bot metadata
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "name": self.name,
            "strategy": "expanding-square-spiral",
            "version": env!("CARGO_PKG_VERSION"),
        })
    }

    /// Called when a game starts; every game gets a fresh engine
    /// Corresponds to POST /start endpoint
    pub fn start(&self, snapshot: &WorldSnapshot) {
        info!(
            "GAME START ({}x{}, {} players)",
            snapshot.width,
            snapshot.height,
            snapshot.players.len()
        );
        let mut state = self.state.lock();
        let game = ActiveGame::next(&mut state.games_started, &self.name, &self.config);
        info!("Game {} begins", game.id);
        state.current = Some(game);
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, snapshot: &WorldSnapshot) {
        let state = self.state.lock();
        match state.current.as_ref() {
            Some(game) => {
                let stats = game.engine.stats();
                info!(
                    "GAME {} OVER at tick {} (pattern {}, edge guard {}, fallback {})",
                    game.id, snapshot.tick, stats.pattern, stats.edge_guard, stats.fallback
                );
            }
            None => info!("GAME OVER at tick {}", snapshot.tick),
        }
    }

    /// Whether the current game's engine has reached the terminal Stuck state
    pub fn is_stuck(&self) -> bool {
        self.state
            .lock()
            .current
            .as_ref()
            .is_some_and(|game| game.engine.is_stuck())
    }

    /// Decides this tick's move
    /// Corresponds to POST /move endpoint
    ///
    /// # Returns
    /// * `Ok(Value)` - JSON response containing the chosen direction
    /// * `Err(EngineError)` - missing self or terminal Stuck
    pub fn get_move(&self, snapshot: &WorldSnapshot) -> Result<Value, EngineError> {
        let mut state = self.state.lock();
        let GameState {
            games_started,
            current,
        } = &mut *state;
        let game = current.get_or_insert_with(|| {
            warn!("Move requested before game start, creating engine");
            ActiveGame::next(games_started, &self.name, &self.config)
        });

        let decision = game.engine.decide(snapshot).map_err(|e| {
            error!("Tick {}: {}", snapshot.tick, e);
            e
        })?;

        self.logger.log_move(game.id, &self.name, snapshot, &decision);

        info!(
            "Tick {}: Chose {} ({})",
            snapshot.tick,
            decision.direction.as_str(),
            decision.source.as_str()
        );

        Ok(json!({ "move": decision.direction.as_str() }))
    }
}
