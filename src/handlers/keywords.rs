//! # Keyword and Keyterm Handlers
//!
//! Global vocabulary hints kept in the key-value store.
//!
//! ## Endpoints:
//! - `POST /api/v1/keyword/add` - `{"keywords": {"word": boost}}`
//! - `POST /api/v1/keyword/delete` - `{"keywords": ["word"]}`
//! - `GET /api/v1/keyword/list`
//! - `POST /api/v1/keyterm/add` / `POST /api/v1/keyterm/delete` - `{"keyterm": "term"}`
//! - `GET /api/v1/keyterm/list`

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct KeywordAddRequest {
    pub keywords: BTreeMap<String, i64>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordDeleteRequest {
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeytermRequest {
    pub keyterm: String,
}

fn reject_blank<'a>(kind: &str, mut values: impl Iterator<Item = &'a String>) -> AppResult<()> {
    if values.any(|value| value.trim().is_empty()) {
        return Err(AppError::ValidationError(format!("{} must not be empty", kind)));
    }
    Ok(())
}

pub async fn add_keywords(
    state: web::Data<AppState>,
    request: web::Json<KeywordAddRequest>,
) -> AppResult<HttpResponse> {
    reject_blank("Keywords", request.keywords.keys())?;
    info!(keywords = ?request.keywords, "Adding keywords");

    state.keywords().add_keywords(&request.keywords).await?;

    let names: Vec<&str> = request.keywords.keys().map(String::as_str).collect();
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Keywords {:?} added", names)
    })))
}

pub async fn delete_keywords(
    state: web::Data<AppState>,
    request: web::Json<KeywordDeleteRequest>,
) -> AppResult<HttpResponse> {
    reject_blank("Keywords", request.keywords.iter())?;
    info!(keywords = ?request.keywords, "Deleting keywords");

    let removed = state.keywords().delete_keywords(&request.keywords).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Keywords {:?} deleted", request.keywords),
        "removed": removed
    })))
}

pub async fn list_keywords(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let keywords = state.keywords().list_keywords().await?;
    Ok(HttpResponse::Ok().json(json!({ "keywords": keywords })))
}

pub async fn add_keyterm(
    state: web::Data<AppState>,
    request: web::Json<KeytermRequest>,
) -> AppResult<HttpResponse> {
    reject_blank("Keyterm", std::iter::once(&request.keyterm))?;

    state.keyterms().add_keyterm(&request.keyterm).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Keyterm added" })))
}

pub async fn delete_keyterm(
    state: web::Data<AppState>,
    request: web::Json<KeytermRequest>,
) -> AppResult<HttpResponse> {
    reject_blank("Keyterm", std::iter::once(&request.keyterm))?;

    let removed = state.keyterms().delete_keyterm(&request.keyterm).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Keyterm deleted", "removed": removed })))
}

pub async fn list_keyterms(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let keyterms = state.keyterms().list_keyterms().await?;
    Ok(HttpResponse::Ok().json(json!({ "keyterms": keyterms })))
}
