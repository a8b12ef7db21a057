// Standalone replay tool for analyzing spiral bot debug logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                  Replay all ticks
//   --turns <t1,t2>        Replay and report specific ticks (comma-separated)
//   --validate             Run validation mode with expected moves
//   --verbose              Show detailed output for each tick
//   --config <path>        Path to Agent.toml (default: Agent.toml)
//   --name <agent>         Replay as this agent instead of the logged one

use std::env;
use std::process;

use spiral_cycles_bot::config::Config;
use spiral_cycles_bot::replay::ReplayEngine;
use spiral_cycles_bot::types::Direction;

fn print_usage() {
    eprintln!("Spiral Bot Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all ticks in the log");
    eprintln!("  --turns <T1,T2,...>     Report specific ticks (comma-separated)");
    eprintln!("  --validate <T:M,...>    Validate expected moves (format: tick:move,...)");
    eprintln!("  --verbose               Show detailed output for each tick");
    eprintln!("  --config <path>         Path to Agent.toml (default: Agent.toml)");
    eprintln!("  --name <agent>          Replay as this agent (default: agent in the log)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Replay all ticks");
    eprintln!("  replay spiral_debug.jsonl --all");
    eprintln!();
    eprintln!("  # Report specific ticks");
    eprintln!("  replay spiral_debug.jsonl --turns 5,10,15");
    eprintln!();
    eprintln!("  # Validate expected moves");
    eprintln!("  replay spiral_debug.jsonl --validate 5:north,10:east|south");
}

fn parse_turns(s: &str) -> Result<Vec<u64>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<u64>()
                .map_err(|e| format!("Invalid turn number '{}': {}", t, e))
        })
        .collect()
}

fn parse_expected_moves(s: &str) -> Result<Vec<(u64, Vec<Direction>)>, String> {
    s.split(',')
        .map(|pair| {
            let (turn, moves) = pair
                .trim()
                .split_once(':')
                .ok_or_else(|| format!("Invalid format '{}'. Expected 'turn:move'", pair))?;

            let turn = turn
                .parse::<u64>()
                .map_err(|e| format!("Invalid turn number '{}': {}", turn, e))?;

            // Support multiple acceptable moves separated by '|'
            let moves = moves
                .split('|')
                .map(Direction::parse)
                .collect::<Result<Vec<Direction>, String>>()?;

            Ok((turn, moves))
        })
        .collect()
}

#[derive(Debug, PartialEq)]
enum Mode {
    All,
    Turns(String),
    Validate(String),
}

#[derive(Debug)]
struct Args {
    log_file: String,
    config_path: String,
    agent: Option<String>,
    verbose: bool,
    mode: Mode,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let log_file = args.get(1).ok_or("Missing log file")?.clone();
    let mut config_path = "Agent.toml".to_string();
    let mut agent = None;
    let mut verbose = false;
    let mut mode = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => mode = Some(Mode::All),
            "--verbose" => verbose = true,
            flag @ ("--turns" | "--validate" | "--config" | "--name") => {
                let value = args
                    .get(i + 1)
                    .cloned()
                    .ok_or_else(|| format!("{} requires an argument", flag))?;
                match flag {
                    "--turns" => mode = Some(Mode::Turns(value)),
                    "--validate" => mode = Some(Mode::Validate(value)),
                    "--config" => config_path = value,
                    _ => agent = Some(value),
                }
                i += 1;
            }
            other => return Err(format!("Unknown option '{}'", other)),
        }
        i += 1;
    }

    let mode = mode.ok_or("Must specify --all, --turns, or --validate")?;

    Ok(Args {
        log_file,
        config_path,
        agent,
        verbose,
        mode,
    })
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let Args {
        log_file,
        config_path,
        agent,
        verbose,
        mode,
    } = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    let mut engine = ReplayEngine::new(config, verbose);
    if let Some(agent) = agent {
        println!("Replaying as agent: {}", agent);
        engine = engine.with_agent(agent);
    }

    let entries = match engine.load_log_file(&log_file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error loading log file: {}", e);
            process::exit(1);
        }
    };

    if entries.is_empty() {
        eprintln!("Error: Log file is empty");
        process::exit(1);
    }

    println!("Loaded {} log entries\n", entries.len());

    let outcome = match mode {
        Mode::All => {
            println!("Replaying all {} ticks...\n", entries.len());
            engine.replay_all(&entries).map(|results| engine.print_report(&results))
        }
        Mode::Turns(arg) => parse_turns(&arg).and_then(|turns| {
            println!("Replaying to report {} specific tick(s)...\n", turns.len());
            engine
                .replay_turns(&entries, &turns)
                .map(|results| engine.print_report(&results))
        }),
        Mode::Validate(arg) => parse_expected_moves(&arg).and_then(|expected| {
            println!("Validating {} expected move(s)...\n", expected.len());
            engine
                .validate_expected_moves(&entries, &expected)
                .map(|()| println!("✓ All expected moves validated successfully!"))
        }),
    };

    if let Err(e) = outcome {
        eprintln!("✗ {}", e);
        process::exit(1);
    }
}
