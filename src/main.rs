#[macro_use]
extern crate rocket;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Build, Request, Rocket};
use serde_json::{json, Value};

mod boot;
mod config;
mod email;
mod error;
mod routes;
mod security;


use config::RelayConfig;
use email::smtp::{Mailer, SmtpRelay};

#[catch(401)]
fn unauthorized() -> (Status, Json<Value>) {
    (Status::Unauthorized, Json(json!({"error": "Unauthorized"})))
}

/// Everything else Rocket answers on its own: unknown routes, handler panics.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> (Status, Json<Value>) {
    let reason = status.reason().unwrap_or("Unknown error");
    (status, Json(json!({"error": reason})))
}

/// Assemble the relay around a given config and mailer.
pub fn build(config: RelayConfig, mailer: Box<dyn Mailer>) -> Rocket<Build> {
    rocket::build()
        .manage(config)
        .manage(mailer)
        .mount("/", routes::public::routes())
        .mount("/", routes::api::routes())
        .register("/", catchers![unauthorized, default_catcher])
}

#[launch]
fn rocket() -> _ {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RelayConfig::from_env();
    boot::run(&config);

    let mailer = SmtpRelay::new(&config);
    build(config, Box::new(mailer))
}
