// HTTP handler bindings for the arena endpoints
//
// This module provides thin wrapper functions that bind Rocket HTTP routes
// to the Bot's methods. Handlers are responsible for:
// - Deserializing incoming JSON snapshots and rejecting inconsistent ones
// - Extracting the Bot instance from Rocket's managed state
// - Delegating to Bot methods
// - Mapping engine errors to status codes

use log::error;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, Shutdown, State};
use serde_json::Value;

use crate::bot::Bot;
use crate::engine::EngineError;
use crate::types::WorldSnapshot;

fn validated(snapshot: &WorldSnapshot) -> Result<(), Status> {
    snapshot.validate().map_err(|e| {
        error!("Rejected snapshot: {}", e);
        Status::BadRequest
    })
}

/// GET / endpoint
/// Returns bot metadata
#[get("/")]
pub fn index(bot: &State<Bot>) -> Json<Value> {
    Json(bot.info())
}

/// POST /start endpoint
/// Called when a game starts
#[post("/start", format = "json", data = "<start_req>")]
pub fn start(bot: &State<Bot>, start_req: Json<WorldSnapshot>) -> Status {
    if let Err(status) = validated(&start_req) {
        return status;
    }
    bot.start(&start_req);

    Status::Ok
}

/// POST /move endpoint
/// Called each tick to compute and return the next move
///
/// A stuck bot answers 500 and asks the server to shut down so the process
/// can exit with a failure status.
#[post("/move", format = "json", data = "<move_req>")]
pub fn get_move(
    bot: &State<Bot>,
    move_req: Json<WorldSnapshot>,
    shutdown: Shutdown,
) -> Result<Json<Value>, Status> {
    validated(&move_req)?;

    match bot.get_move(&move_req) {
        Ok(response) => Ok(Json(response)),
        Err(EngineError::MissingSelf(_)) => Err(Status::BadRequest),
        Err(EngineError::Stuck { .. }) => {
            shutdown.notify();
            Err(Status::InternalServerError)
        }
    }
}

/// POST /end endpoint
/// Called when a game ends
#[post("/end", format = "json", data = "<end_req>")]
pub fn end(bot: &State<Bot>, end_req: Json<WorldSnapshot>) -> Status {
    bot.end(&end_req);

    Status::Ok
}
