// Spiral cycles bot entry point
//
// Usage:
//   spiral-cycles-bot [agent_name] [--stdio] [--config <path>]
//
// Without --stdio the bot serves the arena over HTTP (GET /, POST /start,
// /move, /end). With --stdio it plays one lockstep session over
// newline-delimited JSON on stdin/stdout.

use log::{error, info};
use rocket::fairing::AdHoc;
use rocket::routes;
use std::env;
use std::io;
use std::process;

use spiral_cycles_bot::bot::Bot;
use spiral_cycles_bot::config::Config;
use spiral_cycles_bot::debug_logger::DebugLogger;
use spiral_cycles_bot::engine::{DecisionEngine, EngineError};
use spiral_cycles_bot::handler;
use spiral_cycles_bot::session::{run_session, JsonLinesConnection, SessionError};

struct Args {
    name: Option<String>,
    stdio: bool,
    config_path: Option<String>,
}

fn print_usage() {
    eprintln!("Spiral Cycles Bot");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  spiral-cycles-bot [agent_name] [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --stdio             Play over JSON lines on stdin/stdout instead of HTTP");
    eprintln!("  --config <path>     Path to Agent.toml (default: Agent.toml)");
    eprintln!("  --help              Show this help message");
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args {
        name: None,
        stdio: false,
        config_path: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stdio" => parsed.stdio = true,
            "--config" => {
                let path = args
                    .get(i + 1)
                    .ok_or("--config requires an argument")?;
                parsed.config_path = Some(path.clone());
                i += 1;
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option '{}'", flag));
            }
            name => {
                if parsed.name.is_some() {
                    return Err(format!("Unexpected argument '{}'", name));
                }
                parsed.name = Some(name.to_string());
            }
        }
        i += 1;
    }

    Ok(parsed)
}

/// Plays one session over stdin/stdout; returns the process exit code
async fn run_stdio(config: Config, name: String, logger: DebugLogger) -> i32 {
    let outcome = tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let mut connection = JsonLinesConnection::new(stdin.lock(), io::stdout());
        let mut engine = DecisionEngine::from_config(name, &config);
        run_session(&mut connection, &mut engine, &logger)
    })
    .await;

    match outcome {
        Ok(Ok(summary)) => {
            info!("Session finished after {} ticks", summary.stats.ticks);
            0
        }
        Ok(Err(SessionError::Engine(e @ EngineError::Stuck { .. }))) => {
            error!("Stuck, giving up: {}", e);
            1
        }
        Ok(Err(e)) => {
            error!("Session failed: {}", e);
            1
        }
        Err(e) => {
            error!("Session task failed: {}", e);
            1
        }
    }
}

/// Serves the arena over HTTP until shutdown; returns the process exit code
async fn run_server(config: Config, name: String, logger: DebugLogger) -> i32 {
    let bot = Bot::new(config, name, logger);

    let launched = rocket::build()
        .manage(bot)
        .attach(AdHoc::on_response("Server ID Middleware", |_, res| {
            Box::pin(async move {
                res.set_raw_header("Server", "spiral-cycles-bot");
            })
        }))
        .mount(
            "/",
            routes![handler::index, handler::start, handler::get_move, handler::end],
        )
        .launch()
        .await;

    match launched {
        Ok(rocket) => {
            if rocket.state::<Bot>().is_some_and(|bot| bot.is_stuck()) {
                error!("Server stopped because the bot is stuck");
                1
            } else {
                0
            }
        }
        Err(e) => {
            error!("Server failed: {}", e);
            1
        }
    }
}

#[rocket::main]
async fn main() {
    // Lots of web hosting services expect you to bind to the port specified by the `PORT`
    // environment variable. However, Rocket looks at the `ROCKET_PORT` environment variable.
    // If we find a value for `PORT`, we set `ROCKET_PORT` to that value.
    if let Ok(port) = env::var("PORT") {
        env::set_var("ROCKET_PORT", &port);
    }

    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help") {
        print_usage();
        process::exit(0);
    }

    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    let config = match &args.config_path {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| {
            eprintln!("Error: could not load config from '{}': {}", path, e);
            process::exit(1);
        }),
        None => Config::load_or_default(),
    };

    let name = args
        .name
        .unwrap_or_else(|| config.agent.default_name.clone());

    info!("Starting Spiral Cycles Bot as '{}'...", name);

    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;

    let code = if args.stdio {
        run_stdio(config, name, logger.clone()).await
    } else {
        run_server(config, name, logger.clone()).await
    };

    // process::exit skips destructors, so drain the debug log first
    logger.flush().await;
    process::exit(code);
}
