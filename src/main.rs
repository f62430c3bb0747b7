mod config;
mod db;
mod engine;
mod error;
mod handlers;
mod locks;
mod models;
mod services;
mod state;
mod validation;

use config::Config;
use db::Db;
use ntex::web;
use ntex_cors::Cors;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[ntex::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();
    let db = Db::open(&config.database_path).map_err(|e| {
        tracing::error!(path = %config.database_path, "failed to open database: {e}");
        std::io::Error::other(e)
    })?;
    let state = Arc::new(AppState::new(db, config.grading_timeout));

    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.database_path,
        "alien invasion server starting"
    );

    web::HttpServer::new(move || {
        web::App::new()
            .state(state.clone())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type"])
                    .max_age(3600)
                    .finish(),
            )
            .route("/health", web::get().to(health))
            .route("/register", web::post().to(handlers::participant::register))
            .route("/challenge/{id}/aliens", web::get().to(handlers::challenge::get_aliens))
            .route(
                "/challenge/{id}/aliens/submit",
                web::post().to(handlers::challenge::submit),
            )
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::catalog::AlienType::Regular;
    use engine::scenario::{Challenge, Wave};
    use models::submission::{GradingResult, SubmissionBody};
    use std::time::Duration;

    fn state() -> AppState {
        AppState::new(Db::open_in_memory().unwrap(), Duration::from_secs(5))
    }

    fn register(state: &AppState) -> String {
        services::participant::register(
            &state.db,
            models::participant::RegisterRequest {
                email: "alan@northeastern.edu".into(),
                nuid: "001912345".into(),
            },
        )
        .unwrap()
        .token
    }

    /// Pins the stored scenario so the wire-level submission below is exact.
    fn pin_two_regulars(state: &AppState, token: &str) {
        let challenge = Challenge {
            id: uuid::Uuid::parse_str(token).unwrap(),
            budget: 100,
            wall_durability: 100,
            waves: vec![Wave::of(&[Regular, Regular])],
        };
        state
            .db
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO scenarios (challenge_id, scenario) VALUES (?1, ?2)",
                    rusqlite::params![token, serde_json::to_string(&challenge).unwrap()],
                )
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_register_then_fetch_challenge() {
        let state = state();
        let token = register(&state);
        let query = models::challenge::AlienPageQuery {
            limit: None,
            offset: None,
        };
        let first = services::challenge::get_challenge(&state, &token, &query)
            .await
            .unwrap();
        let second = services::challenge::get_challenge(&state, &token, &query)
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
        assert_eq!(first.budget, 100);
        assert_eq!(first.waves.len(), 3);
    }

    #[tokio::test]
    async fn test_wire_submission_end_to_end() {
        let state = state();
        let token = register(&state);
        pin_two_regulars(&state, &token);

        let body: SubmissionBody = serde_json::from_str(
            r#"{
                "version": "assignment",
                "gunsPurchased": [{"type": "turret"}],
                "totalCost": 10,
                "assignments": [{"wave": 1, "gunQueues": [[0, 1]], "wallDurabilityRemaining": 97}],
                "commands": ["volley", "alienAttack", "volley"],
                "remainingHP": 97,
                "remainingAliens": 0
            }"#,
        )
        .unwrap();
        let result = services::challenge::submit(&state, &token, body.into())
            .await
            .unwrap();
        assert!(result.valid);

        // a second, invalid submission gets the first result back
        let body: SubmissionBody = serde_json::from_str(
            r#"{
                "version": "assignment",
                "gunsPurchased": [{"type": "turret"}],
                "totalCost": 10,
                "assignments": [{"wave": 1, "gunQueues": [[5]]}],
                "commands": [],
                "remainingHP": 100,
                "remainingAliens": 2
            }"#,
        )
        .unwrap();
        let again = services::challenge::submit(&state, &token, body.into())
            .await
            .unwrap();
        assert_eq!(again, result);
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_rejected() {
        let state = state();
        let token = register(&state);
        pin_two_regulars(&state, &token);

        let body: SubmissionBody = serde_json::from_str(
            r#"{
                "version": "assignment",
                "gunsPurchased": [{"type": "turret"}],
                "totalCost": 10,
                "assignments": [{"wave": 1, "gunQueues": [[5]]}],
                "commands": [],
                "remainingHP": 100,
                "remainingAliens": 2
            }"#,
        )
        .unwrap();
        let result = services::challenge::submit(&state, &token, body.into())
            .await
            .unwrap();
        assert_eq!(result, GradingResult::rejected("index out of range"));
    }

    #[tokio::test]
    async fn test_submit_for_unknown_or_malformed_id() {
        let state = state();
        let body: SubmissionBody = serde_json::from_str(
            r#"{"version": "trace", "gunsPurchased": [], "totalCost": 0,
                "commands": [], "remainingHP": 1, "remainingAliens": 0}"#,
        )
        .unwrap();
        let err = services::challenge::submit(&state, "nope", body.clone().into())
            .await
            .unwrap_err();
        assert!(matches!(err, error::AppError::Unauthorized(_)));

        let err = services::challenge::submit(
            &state,
            &uuid::Uuid::new_v4().to_string(),
            body.into(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, error::AppError::NotFound(_)));
    }
}
