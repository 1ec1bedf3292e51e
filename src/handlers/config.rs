use crate::{config::AppConfig, error::AppError, state::AppState};
use actix_web::{web, HttpResponse};
use serde_json::{json, Value};

/// Public view of the configuration. The provider key is reduced to a flag.
fn config_view(config: &AppConfig) -> Value {
    json!({
        "server": {
            "host": config.server.host,
            "port": config.server.port
        },
        "provider": {
            "configured": config.provider_configured(),
            "base_url": config.provider.base_url,
            "model": config.provider.model,
            "language": config.provider.language,
            "timeout_secs": config.provider.timeout_secs
        },
        "audit": {
            "max_words": config.audit.max_words,
            "max_alignment_cells": config.audit.max_alignment_cells
        }
    })
}

pub async fn get_config(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let config = state.get_config();

    Ok(HttpResponse::Ok().json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "config": config_view(&config)
    })))
}

pub async fn update_config(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let json_str = serde_json::to_string(&body.into_inner())?;

    let mut current_config = state.get_config();
    current_config
        .update_from_json(&json_str)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    state
        .update_config(current_config.clone())
        .map_err(AppError::ValidationError)?;

    tracing::info!(
        max_words = current_config.audit.max_words,
        model = %current_config.provider.model,
        language = %current_config.provider.language,
        "Configuration updated"
    );

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Configuration updated successfully",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "updated_config": config_view(&current_config)
    })))
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::handlers::configure_routes;
    use crate::state::AppState;
    use crate::store::InMemoryStore;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_get_config_redacts_api_key() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("secret-key".to_string());
        let state = AppState::new(config, None, Arc::new(InMemoryStore::new()));
        let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/api/v1/config").to_request();
        let resp = test::call_service(&app, req).await;
        let bytes = test::read_body(resp).await;
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(!text.contains("secret-key"));
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["config"]["provider"]["configured"], true);
    }

    #[actix_web::test]
    async fn test_update_config() {
        let state = AppState::new(AppConfig::default(), None, Arc::new(InMemoryStore::new()));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/v1/config")
            .set_json(json!({"audit": {"max_words": 100}}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert_eq!(state.get_config().audit.max_words, 100);

        let req = test::TestRequest::put()
            .uri("/api/v1/config")
            .set_json(json!({"audit": {"max_words": 0}}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.get_config().audit.max_words, 100);
    }
}
