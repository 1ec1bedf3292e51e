pub mod audit;
pub mod config;
pub mod keywords;

pub use audit::*;
pub use config::*;
pub use keywords::*;

use crate::error::AppError;
use crate::health;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Transcript audit service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!("No route for {} {}", req.method(), req.path())))
}

/// Register every route plus the JSON extractor config.
///
/// Shared by `main` and the handler tests so both see the same routing table.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/", web::get().to(index))
    .route("/health", web::get().to(health::status_ok))
    .route("/health/live", web::get().to(health::status_ok))
    .route("/health/ready", web::get().to(health::status_ok))
    .service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health::health_check))
            .route("/metrics", web::get().to(health::detailed_metrics))
            .route("/config", web::get().to(get_config))
            .route("/config", web::put().to(update_config))
            .service(
                web::scope("/audit")
                    .route("/text", web::post().to(audit_text))
                    .route("/audio", web::post().to(audit_audio)),
            )
            .service(
                web::scope("/keyword")
                    .route("/add", web::post().to(add_keywords))
                    .route("/delete", web::post().to(delete_keywords))
                    .route("/list", web::get().to(list_keywords)),
            )
            .service(
                web::scope("/keyterm")
                    .route("/add", web::post().to(add_keyterm))
                    .route("/delete", web::post().to(delete_keyterm))
                    .route("/list", web::get().to(list_keyterms)),
            ),
    )
    .default_service(web::route().to(not_found));
}
