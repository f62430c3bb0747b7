use crate::error::AppError;
use uuid::Uuid;

const EMAIL_DOMAIN: &str = "northeastern.edu";
const NUID_LEN: usize = 9;
const MAX_PAGE_SIZE: usize = 1_000;

/// Challenge ids are capability tokens; anything that is not a token we could
/// have issued is rejected as unauthorized rather than unknown.
pub fn validate_challenge_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| {
        AppError::Unauthorized(
            "Invalid ID. Are you sure you are using the id that you got upon registration?".into(),
        )
    })
}

pub fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain == EMAIL_DOMAIN => Ok(email),
        _ => Err(AppError::BadRequest(
            "Not a valid northeastern email address.".into(),
        )),
    }
}

pub fn validate_nuid(nuid: &str) -> Result<String, AppError> {
    let nuid = nuid.trim();
    if nuid.len() == NUID_LEN && nuid.bytes().all(|b| b.is_ascii_digit()) {
        Ok(nuid.to_string())
    } else {
        Err(AppError::BadRequest("Not a valid NUID.".into()))
    }
}

/// Returns `(offset, limit)`; a missing limit means "to the end".
pub fn validate_page(
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<(usize, Option<usize>), AppError> {
    let offset = usize::try_from(offset.unwrap_or(0))
        .map_err(|_| AppError::BadRequest("offset must not be negative".into()))?;
    let limit = limit
        .map(|l| {
            usize::try_from(l)
                .map(|l| l.min(MAX_PAGE_SIZE))
                .map_err(|_| AppError::BadRequest("limit must not be negative".into()))
        })
        .transpose()?;
    Ok((offset, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_id() {
        let id = Uuid::new_v4();
        assert_eq!(validate_challenge_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            validate_challenge_id("not-a-token"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_email() {
        assert_eq!(
            validate_email(" Jane.Doe@Northeastern.edu ").unwrap(),
            "jane.doe@northeastern.edu"
        );
        assert!(validate_email("jane@gmail.com").is_err());
        assert!(validate_email("@northeastern.edu").is_err());
        assert!(validate_email("northeastern.edu").is_err());
    }

    #[test]
    fn test_nuid() {
        assert_eq!(validate_nuid("001234567").unwrap(), "001234567");
        assert!(validate_nuid("12345678").is_err());
        assert!(validate_nuid("12345678a").is_err());
    }

    #[test]
    fn test_page() {
        assert_eq!(validate_page(None, None).unwrap(), (0, None));
        assert_eq!(validate_page(Some(5), Some(10)).unwrap(), (10, Some(5)));
        assert_eq!(validate_page(Some(50_000), None).unwrap(), (0, Some(MAX_PAGE_SIZE)));
        assert!(validate_page(Some(-1), None).is_err());
        assert!(validate_page(None, Some(-3)).is_err());
    }
}
