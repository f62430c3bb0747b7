use crate::engine::grade::Submission;
use crate::error::AppError;
use crate::models::challenge::*;
use crate::models::submission::SubmissionBody;
use crate::services::challenge as service;
use crate::state::AppState;
use ntex::util::Bytes;
use ntex::web::{self, HttpRequest, HttpResponse};
use std::sync::Arc;

// Query and body are parsed here rather than through the Query and Json
// extractors so that malformed input gets the same error body as every other
// failure.

pub async fn get_aliens(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let challenge_id = path.into_inner();
    let query = web::types::Query::<AlienPageQuery>::from_query(req.query_string())
        .map_err(|e| AppError::BadRequest(format!("Malformed query: {e}")))?;
    let view = service::get_challenge(&state, &challenge_id, &query).await?;
    Ok(HttpResponse::Ok().json(&view))
}

pub async fn submit(
    state: web::types::State<Arc<AppState>>,
    path: web::types::Path<String>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let challenge_id = path.into_inner();
    let parsed: SubmissionBody = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed submission: {e}")))?;
    let result = service::submit(&state, &challenge_id, Submission::from(parsed)).await?;
    Ok(HttpResponse::Ok().json(&result))
}
