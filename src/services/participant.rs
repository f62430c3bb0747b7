use crate::db::Db;
use crate::error::AppError;
use crate::models::participant::*;
use crate::validation;
use rusqlite::{params, ErrorCode};
use uuid::Uuid;

pub fn register(db: &Db, req: RegisterRequest) -> Result<RegisterResult, AppError> {
    let email = validation::validate_email(&req.email)?;
    let nuid = validation::validate_nuid(&req.nuid)?;
    let id = Uuid::new_v4();

    let inserted = db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO participants (id, email, nuid) VALUES (?1, ?2, ?3)",
            params![id.to_string(), email, nuid],
        )
    });

    match inserted {
        Ok(_) => {
            tracing::info!(participant_id = %id, "registered participant");
            Ok(RegisterResult {
                message: "Successfully registered user!".into(),
                token: id.to_string(),
            })
        }
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(AppError::Conflict("This email and NUID are already registered.".into()))
        }
        Err(e) => Err(AppError::from(e)),
    }
}

pub fn participant_exists(db: &Db, id: &Uuid) -> Result<bool, AppError> {
    Ok(db.with_conn(|conn| {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM participants WHERE id = ?1)",
            params![id.to_string()],
            |row| row.get(0),
        )
    })?)
}

pub fn require_participant(db: &Db, id: &Uuid) -> Result<(), AppError> {
    if participant_exists(db, id)? {
        Ok(())
    } else {
        Err(AppError::NotFound("Unable to find challenge id.".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, nuid: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            nuid: nuid.into(),
        }
    }

    #[test]
    fn test_register_issues_token() {
        let db = Db::open_in_memory().unwrap();
        let result = register(&db, request("ada@northeastern.edu", "001234567")).unwrap();
        let id = Uuid::parse_str(&result.token).unwrap();
        assert!(participant_exists(&db, &id).unwrap());
        assert!(require_participant(&db, &id).is_ok());
    }

    #[test]
    fn test_duplicate_registration_conflicts() {
        let db = Db::open_in_memory().unwrap();
        register(&db, request("ada@northeastern.edu", "001234567")).unwrap();
        let err = register(&db, request("ADA@northeastern.edu", "001234567")).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_malformed_registration() {
        let db = Db::open_in_memory().unwrap();
        let err = register(&db, request("ada@example.com", "001234567")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = register(&db, request("ada@northeastern.edu", "12")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_unknown_participant() {
        let db = Db::open_in_memory().unwrap();
        let err = require_participant(&db, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
