use rocket::serde::json::Json;
use serde_json::{json, Value};

// ── Health ─────────────────────────────────────────────

/// Liveness check. No auth, no upstream checks.
#[get("/health")]
pub fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![health]
}
