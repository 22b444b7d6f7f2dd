//! HTTP route configuration.

pub mod health;
pub mod reasoning;

use actix_web::web;

/// Registers every route this service exposes (§6).
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/reasoning/deepthink", web::post().to(reasoning::deepthink))
        .route("/reasoning/ultrathink", web::post().to(reasoning::ultrathink));
}
