// ============================================================================
// Erreurs de récupération de données
// ============================================================================
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère l'implémentation de std::error::Error
// - #[error("...")] génère Display à partir d'un format
//
// Le binaire utilise anyhow pour la plomberie (terminal, logs) ;
// la librairie expose des erreurs typées que chaque vue affiche elle-même.
// ============================================================================

use serde::Deserialize;
use thiserror::Error;

/// Échec d'un appel au backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Réponse HTTP non-2xx : `detail` est le message du serveur (ou le corps brut)
    #[error("{detail}")]
    Network { status: u16, detail: String },

    /// Échec de transport (connexion refusée, timeout, DNS...)
    #[error("Network error: {0}")]
    Transport(String),

    /// Réponse 2xx mais corps illisible
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Réponse 2xx sans donnée exploitable
    #[error("No data available for {0}")]
    Empty(String),
}

/// Corps d'erreur façon FastAPI : `{"detail": "Email already registered"}`
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

impl FetchError {
    /// Construit une erreur réseau à partir du statut et du corps de la réponse
    ///
    /// Le champ `detail` est extrait si le corps est du JSON FastAPI,
    /// sinon le corps brut est conservé ; un corps vide donne "Network error"
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.detail,
            Err(_) if body.trim().is_empty() => "Network error".to_string(),
            Err(_) => body.trim().to_string(),
        };
        FetchError::Network { status, detail }
    }

    /// Statut HTTP si l'erreur vient du serveur
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Network { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_from_fastapi_body() {
        let err = FetchError::from_response(400, r#"{"detail": "Email already registered"}"#);

        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_raw_body_and_empty_body() {
        assert_eq!(
            FetchError::from_response(500, "Internal Server Error").to_string(),
            "Internal Server Error"
        );
        assert_eq!(FetchError::from_response(502, "  ").to_string(), "Network error");
    }
}
