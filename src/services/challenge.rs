use crate::db::Db;
use crate::engine::grade::{self, Submission};
use crate::engine::scenario::{self, Challenge};
use crate::error::AppError;
use crate::models::challenge::*;
use crate::models::submission::GradingResult;
use crate::services::participant;
use crate::state::AppState;
use crate::validation;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::time::Duration;
use uuid::Uuid;

fn load_scenario(db: &Db, id: &Uuid) -> Result<Option<Challenge>, AppError> {
    let stored: Option<String> = db.with_conn(|conn| {
        conn.query_row(
            "SELECT scenario FROM scenarios WHERE challenge_id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .optional()
    })?;

    stored
        .map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| AppError::Internal(format!("stored scenario for {id} is corrupt: {e}")))
        })
        .transpose()
}

/// Caller must hold the id's critical section.
fn materialize_scenario(db: &Db, id: &Uuid) -> Result<Challenge, AppError> {
    if let Some(existing) = load_scenario(db, id)? {
        return Ok(existing);
    }

    let challenge = scenario::generate(id);
    let json = serde_json::to_string(&challenge)
        .map_err(|e| AppError::Internal(format!("failed to encode scenario for {id}: {e}")))?;
    // Whatever row ended up stored is the authoritative one.
    let (stored, inserted) = db.insert_or_keep(
        "INSERT OR IGNORE INTO scenarios (challenge_id, scenario) VALUES (?1, ?2)",
        params![id.to_string(), json],
        |conn| {
            conn.query_row(
                "SELECT scenario FROM scenarios WHERE challenge_id = ?1",
                params![id.to_string()],
                |row| row.get::<_, String>(0),
            )
        },
    )?;
    if inserted {
        tracing::info!(
            challenge_id = %id,
            waves = challenge.waves.len(),
            aliens = challenge.total_aliens(),
            "materialized scenario"
        );
    }

    serde_json::from_str(&stored)
        .map_err(|e| AppError::Internal(format!("stored scenario for {id} is corrupt: {e}")))
}

pub async fn get_or_create_scenario(state: &AppState, id: &Uuid) -> Result<Challenge, AppError> {
    let _guard = state.locks.lock(&id.to_string()).await;
    materialize_scenario(&state.db, id)
}

const SELECT_RESULT: &str =
    "SELECT valid, score, reason FROM grading_results WHERE challenge_id = ?1";

fn result_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GradingResult> {
    Ok(GradingResult {
        valid: row.get(0)?,
        score: row.get(1)?,
        reason: row.get(2)?,
    })
}

pub fn get_grading_result(db: &Db, id: &Uuid) -> Result<Option<GradingResult>, AppError> {
    Ok(db.with_conn(|conn| {
        conn.query_row(SELECT_RESULT, params![id.to_string()], result_from_row)
            .optional()
    })?)
}

/// First writer wins: a later write leaves the stored result untouched and
/// returns it.
pub fn put_grading_result(
    db: &Db,
    id: &Uuid,
    result: &GradingResult,
) -> Result<GradingResult, AppError> {
    let submitted_at = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let (stored, inserted) = db.insert_or_keep(
        "INSERT OR IGNORE INTO grading_results (challenge_id, valid, score, reason, submitted_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id.to_string(),
            result.valid,
            result.score,
            result.reason,
            submitted_at
        ],
        |conn| conn.query_row(SELECT_RESULT, params![id.to_string()], result_from_row),
    )?;
    if !inserted {
        tracing::debug!(challenge_id = %id, "grading result already stored, keeping it");
    }
    Ok(stored)
}

/// Runs `job` on the blocking pool. An overrun or a panic is an internal
/// fault, never a result.
async fn run_blocking_within<T, F>(limit: Duration, job: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(job)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AppError::Internal(format!("blocking task failed: {e}"))),
        Err(_) => Err(AppError::Internal(format!("blocking task exceeded {limit:?}"))),
    }
}

fn paginate(challenge: &Challenge, offset: usize, limit: Option<usize>) -> Vec<AlienEntry> {
    let flattened = challenge.waves.iter().enumerate().flat_map(|(w, wave)| {
        wave.aliens.iter().enumerate().map(move |(index, alien)| AlienEntry {
            wave: w + 1,
            index,
            kind: alien.kind,
            hp: alien.hp,
            atk: alien.atk,
        })
    });
    flattened
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

pub async fn get_challenge(
    state: &AppState,
    raw_id: &str,
    query: &AlienPageQuery,
) -> Result<ChallengeView, AppError> {
    let id = validation::validate_challenge_id(raw_id)?;
    participant::require_participant(&state.db, &id)?;
    let page = validation::validate_page(query.limit, query.offset)?;

    let challenge = get_or_create_scenario(state, &id).await?;
    let mut view = ChallengeView::from(&challenge);
    if query.is_requested() {
        let (offset, limit) = page;
        view.aliens = Some(paginate(&challenge, offset, limit));
        view.total = Some(challenge.total_aliens());
    }
    Ok(view)
}

/// Grades a submission for `raw_id`.
///
/// Only the first submission per id is graded; every later submission gets
/// the stored result back unchanged. Rejections are results too and are
/// stored the same way.
pub async fn submit(
    state: &AppState,
    raw_id: &str,
    submission: Submission,
) -> Result<GradingResult, AppError> {
    let id = validation::validate_challenge_id(raw_id)?;
    participant::require_participant(&state.db, &id)?;

    let _guard = state.locks.lock(&id.to_string()).await;
    if let Some(stored) = get_grading_result(&state.db, &id)? {
        tracing::debug!(challenge_id = %id, "returning stored grading result");
        return Ok(stored);
    }

    let challenge = materialize_scenario(&state.db, &id)?;
    // A fault here returns before anything is stored, so the id can be retried.
    let outcome = run_blocking_within(state.grading_timeout, move || {
        grade::grade(&challenge, &submission)
    })
    .await
    .map_err(|e| {
        tracing::warn!(challenge_id = %id, "grading aborted: {e}");
        e
    })?;

    let result = match outcome {
        Ok(graded) => {
            tracing::info!(
                challenge_id = %id,
                score = graded.score,
                steps = graded.replay.steps(),
                "submission certified"
            );
            GradingResult::accepted(graded.score)
        }
        Err(rejection) => {
            tracing::info!(challenge_id = %id, reason = %rejection, "submission rejected");
            GradingResult::rejected(rejection.to_string())
        }
    };

    put_grading_result(&state.db, &id, &result)
}
