// ============================================================================
// Authentification : corps des requêtes et réponse du login
// ============================================================================

use serde::{Deserialize, Serialize};

/// POST /auth/login
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// POST /auth/register
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Réponse du login : `{"token": "...", "token_type": "bearer"}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"token": "abc.def", "token_type": "bearer"}"#).unwrap();
        assert_eq!(response.token, "abc.def");
    }
}
