// Integration tests for the decision engine
//
// Covers stage precedence (edge guard, spiral, fallback), the terminal Stuck
// state, trail memory configuration and a full simulated game on a bounded board.

use rand::rngs::StdRng;
use rand::SeedableRng;
use spiral_cycles_bot::config::Config;
use spiral_cycles_bot::engine::{DecisionEngine, DecisionSource, EngineError};
use spiral_cycles_bot::pattern::PatternState;
use spiral_cycles_bot::types::{Direction, Player, Position, WorldSnapshot};
use spiral_cycles_bot::validator::MoveValidator;

const ME: u32 = 1;

fn me_at(x: i32, y: i32) -> Player {
    Player {
        id: ME,
        name: "laura".to_string(),
        position: Position::new(x, y),
    }
}

fn board(width: i32, height: i32, me: Player) -> WorldSnapshot {
    WorldSnapshot::empty(width, height, vec![me])
}

fn engine_with(config: &Config) -> DecisionEngine<StdRng> {
    DecisionEngine::new("laura", config, StdRng::seed_from_u64(42))
}

fn default_engine() -> DecisionEngine<StdRng> {
    engine_with(&Config::default_hardcoded())
}

/// Test: first four spiral moves trace a unit square, then the square grows
#[test]
fn test_spiral_first_square_then_growth() {
    let mut engine = default_engine();
    let mut pos = Position::new(10, 10);
    let mut emitted = Vec::new();

    // Trails are never reported, so every spiral proposal is legal on the board
    for _ in 0..4 {
        let decision = engine.decide(&board(20, 20, me_at(pos.x, pos.y))).unwrap();
        assert_eq!(decision.source, DecisionSource::Pattern);
        emitted.push(decision.direction);
        pos = decision.destination;
    }

    assert_eq!(
        emitted,
        vec![Direction::North, Direction::East, Direction::South, Direction::West]
    );
    assert_eq!(pos, Position::new(10, 10));

    // Fifth tick: the square grows and turns north, but (10, 9) is in trail memory
    let decision = engine.decide(&board(20, 20, me_at(pos.x, pos.y))).unwrap();
    let state = engine.pattern_state();
    assert_eq!(state.square_size, 2);
    assert_eq!(state.direction, Direction::North);
    assert_eq!(state.steps_on_side, 0);

    // North and east destinations were both visited; south is the first fresh cell
    assert_eq!(decision.source, DecisionSource::Fallback);
    assert_eq!(decision.direction, Direction::South);
}

/// Test: with trail memory off, the grown spiral steps back over its own path
#[test]
fn test_disabled_trail_memory_is_not_consulted() {
    let mut config = Config::default_hardcoded();
    config.trail.enabled = false;
    let mut engine = engine_with(&config);
    let mut pos = Position::new(10, 10);

    for _ in 0..4 {
        pos = engine
            .decide(&board(20, 20, me_at(pos.x, pos.y)))
            .unwrap()
            .destination;
    }

    let decision = engine.decide(&board(20, 20, me_at(pos.x, pos.y))).unwrap();
    assert_eq!(decision.source, DecisionSource::Pattern);
    assert_eq!(decision.direction, Direction::North);

    // Still recorded, just not used as a veto
    assert!(engine.trail().recently_visited(&Position::new(10, 9)));
}

/// Test: near the right edge the guard forces west and leaves the spiral alone
#[test]
fn test_edge_guard_overrides_pattern_near_right_edge() {
    let mut engine = default_engine();

    // x = width - 2 is inside the border margin; west lands on x = 17, outside the risky band
    let decision = engine.decide(&board(20, 20, me_at(18, 10))).unwrap();

    assert_eq!(decision.direction, Direction::West);
    assert_eq!(decision.source, DecisionSource::EdgeGuard);
    assert_eq!(*engine.pattern_state(), PatternState::default());
    assert!(engine.trail().recently_visited(&Position::new(17, 10)));
}

/// Test: at x = width - 1 with no validator margin, west still wins over the spiral's north
#[test]
fn test_edge_guard_at_last_column() {
    let mut config = Config::default_hardcoded();
    config.validator.edge_margin = 0;
    let mut engine = engine_with(&config);
    let snapshot = board(20, 20, me_at(19, 10));

    // The plain validator would accept the spiral's proposal
    assert!(MoveValidator::new(0).is_valid_move(&snapshot, &me_at(19, 10), Direction::North));

    let decision = engine.decide(&snapshot).unwrap();
    assert_eq!(decision.direction, Direction::West);
    assert_eq!(decision.source, DecisionSource::EdgeGuard);
    assert_eq!(*engine.pattern_state(), PatternState::default());
}

/// Test: once clear of the border, the spiral resumes from its untouched state
#[test]
fn test_spiral_resumes_after_edge_guard() {
    let mut engine = default_engine();

    engine.decide(&board(20, 20, me_at(10, 10))).unwrap();
    let before = *engine.pattern_state();

    let guarded = engine.decide(&board(20, 20, me_at(10, 1))).unwrap();
    assert_eq!(guarded.source, DecisionSource::EdgeGuard);
    assert_eq!(guarded.direction, Direction::South);
    assert_eq!(*engine.pattern_state(), before);

    let resumed = engine.decide(&board(20, 20, me_at(5, 5))).unwrap();
    assert_eq!(resumed.source, DecisionSource::Pattern);
    assert_eq!(resumed.direction, Direction::East);
}

/// Test: the first valid direction in north, east, south, west order wins
#[test]
fn test_fallback_prefers_canonical_order() {
    let mut engine = default_engine();
    let mut snapshot = board(20, 20, me_at(10, 10));
    snapshot.set_occupancy(&Position::new(10, 9), 2);

    let decision = engine.decide(&snapshot).unwrap();

    assert_eq!(decision.direction, Direction::East);
    assert_eq!(decision.source, DecisionSource::Fallback);
    // Fallback moves never advance the spiral
    assert_eq!(*engine.pattern_state(), PatternState::default());
}

/// Test: a single remaining valid direction is always found
#[test]
fn test_fallback_finds_only_valid_direction() {
    let mut engine = default_engine();
    let mut snapshot = board(20, 20, me_at(10, 10));
    snapshot.set_occupancy(&Position::new(10, 9), 2);
    snapshot.set_occupancy(&Position::new(11, 10), 2);
    snapshot.set_occupancy(&Position::new(10, 11), ME);

    let decision = engine.decide(&snapshot).unwrap();
    assert_eq!(decision.direction, Direction::West);
    assert_eq!(decision.source, DecisionSource::Fallback);
}

/// Test: another player's head blocks the spiral even on an empty cell
#[test]
fn test_other_player_head_forces_fallback() {
    let mut engine = default_engine();
    let mut snapshot = board(20, 20, me_at(10, 10));
    snapshot.players.push(Player {
        id: 2,
        name: "raul".to_string(),
        position: Position::new(10, 9),
    });

    let decision = engine.decide(&snapshot).unwrap();
    assert_eq!(decision.direction, Direction::East);
}

/// Test: boxed in by trails, the engine enters Stuck and stays there
#[test]
fn test_surrounded_agent_is_stuck() {
    let mut engine = default_engine();
    let mut snapshot = board(20, 20, me_at(10, 10));
    snapshot.set_occupancy(&Position::new(10, 9), ME);
    snapshot.set_occupancy(&Position::new(11, 10), 2);
    snapshot.set_occupancy(&Position::new(10, 11), 2);
    snapshot.set_occupancy(&Position::new(9, 10), ME);

    let result = engine.decide(&snapshot);
    assert_eq!(
        result,
        Err(EngineError::Stuck {
            name: "laura".to_string(),
            position: Position::new(10, 10),
        })
    );
    assert!(engine.is_stuck());
    assert!(engine.trail().is_empty());

    // Terminal: even an open board does not bring it back
    let open = board(20, 20, me_at(5, 5));
    assert!(matches!(engine.decide(&open), Err(EngineError::Stuck { .. })));
    assert_eq!(engine.stats().ticks, 0);
}

/// Test: on a tiny board every neighbor is inside the risky edge band
#[test]
fn test_edge_margin_alone_can_cause_stuck() {
    let mut engine = default_engine();
    let result = engine.decide(&board(5, 5, me_at(2, 2)));
    assert!(matches!(result, Err(EngineError::Stuck { .. })));
}

/// Test: shuffled fallback is reproducible for a given seed
#[test]
fn test_shuffled_fallback_is_deterministic_per_seed() {
    let mut config = Config::default_hardcoded();
    config.fallback.shuffle = true;

    let mut snapshot = board(20, 20, me_at(10, 10));
    snapshot.set_occupancy(&Position::new(10, 9), 2);

    let picks: Vec<Direction> = (0..2)
        .map(|_| {
            let mut engine = DecisionEngine::new("laura", &config, StdRng::seed_from_u64(9));
            engine.decide(&snapshot).unwrap().direction
        })
        .collect();

    assert_eq!(picks[0], picks[1]);
    assert_ne!(picks[0], Direction::North);
}

/// Test: a simulated game on a bounded board only ever takes safe steps and ends Stuck
#[test]
fn test_simulated_game_moves_are_safe_until_stuck() {
    let width = 16;
    let height = 16;
    let mut engine = default_engine();
    let mut snapshot = board(width, height, me_at(8, 8));
    snapshot.set_occupancy(&Position::new(8, 8), ME);
    let validator = MoveValidator::new(2);

    let mut ticks = 0;
    loop {
        let me = snapshot.players[0].clone();
        match engine.decide(&snapshot) {
            Ok(decision) => {
                assert!(
                    validator.is_valid_move(&snapshot, &me, decision.direction),
                    "tick {}: {:?} from {:?} is unsafe",
                    ticks,
                    decision.direction,
                    me.position
                );
                snapshot.set_occupancy(&decision.destination, ME);
                snapshot.players[0].position = decision.destination;
                snapshot.tick += 1;
                ticks += 1;
            }
            Err(EngineError::Stuck { position, .. }) => {
                assert_eq!(position, me.position);
                break;
            }
            Err(e) => panic!("unexpected error: {}", e),
        }

        assert!(ticks <= width * height, "a bounded board must eventually trap the agent");
    }

    let stats = engine.stats();
    assert_eq!(stats.ticks, ticks as u64);
    assert_eq!(stats.ticks, stats.pattern + stats.edge_guard + stats.fallback);
    assert!(stats.pattern > 0);
}

/// Test: the engine only acts for the configured name
#[test]
fn test_missing_self_does_not_touch_state() {
    let mut engine = default_engine();
    let snapshot = WorldSnapshot::empty(
        20,
        20,
        vec![Player {
            id: 2,
            name: "raul".to_string(),
            position: Position::new(10, 10),
        }],
    );

    assert_eq!(
        engine.decide(&snapshot),
        Err(EngineError::MissingSelf("laura".to_string()))
    );
    assert_eq!(*engine.pattern_state(), PatternState::default());
    assert!(engine.trail().is_empty());
}
