// ============================================================================
// Transport HTTP
// ============================================================================
// Le client typé (ApiClient) ne parle jamais directement à reqwest :
// il construit une ApiRequest et la confie à un Transport.
//
// CONCEPT RUST : Trait object + Future boxée
// - Un trait avec une méthode async n'est pas "object safe" directement
// - On retourne donc Pin<Box<dyn Future + Send>> : la Future est allouée
//   sur le tas et peut être stockée derrière un Arc<dyn Transport>
// - En production : ReqwestTransport ; en test : un transport scripté
// ============================================================================

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::error::FetchError;

/// Méthodes utilisées par le backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Requête prête à partir
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Noms d'en-têtes en minuscules
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Réponse brute : statut + corps texte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Future retournée par un transport
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse, FetchError>> + Send + 'a>>;

/// Exécute une requête HTTP
///
/// Une erreur n'est retournée que si aucune réponse n'a été reçue ;
/// un statut non-2xx est une réponse normale (interprétée par le client)
pub trait Transport: Send + Sync {
    fn execute(&self, request: ApiRequest) -> TransportFuture<'_>;
}

// ============================================================================
// Implémentation : reqwest
// ============================================================================

/// Transport réel basé sur reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Crée le transport avec un timeout par requête
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lazyfolio/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let mut builder = match request.method {
                Method::Get => self.client.get(&request.url),
                Method::Post => self.client.post(&request.url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    FetchError::Transport(format!("request timeout: {}", e))
                } else if e.is_connect() {
                    FetchError::Transport(format!("connection failed: {}", e))
                } else {
                    FetchError::Transport(format!("request failed: {}", e))
                }
            })?;

            let status = response.status().as_u16();
            debug!(status, "Received HTTP response");

            let body = response
                .text()
                .await
                .map_err(|e| FetchError::Transport(format!("failed to read response body: {}", e)))?;

            Ok(ApiResponse { status, body })
        })
    }
}

// ============================================================================
// Transport scripté (tests)
// ============================================================================
