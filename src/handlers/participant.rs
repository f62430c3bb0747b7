use crate::error::AppError;
use crate::models::participant::*;
use crate::services::participant as service;
use crate::state::AppState;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn register(
    state: web::types::State<Arc<AppState>>,
    body: web::types::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let result = service::register(&state.db, req)?;
    Ok(HttpResponse::Created().json(&result))
}
