use axum::Json;
use serde::Serialize;

use crate::utils::json::Envelope;

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<Envelope<Health>> {
    Json(Envelope::with_result(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
