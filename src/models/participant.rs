use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub nuid: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResult {
    pub message: String,
    pub token: String,
}
