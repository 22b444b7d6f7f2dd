//! Liveness probe. Deliberately stateless -- it does not touch the provider
//! registry, rate limiter or prefix cache, so it stays cheap and always
//! answers even if a configured upstream is unreachable.

use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthBody { status: "ok" })
}
