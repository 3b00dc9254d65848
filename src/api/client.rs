// ============================================================================
// Client typé du backend
// ============================================================================
// Une méthode par endpoint. Chaque requête :
// - porte "Content-Type: application/json"
// - porte "Authorization: Bearer <token>" si une session existe
// - retourne Result<T, FetchError> (chaque vue affiche sa propre erreur)
//
// CONCEPTS RUST :
// 1. Génériques + DeserializeOwned : un seul get<T> pour tous les endpoints
// 2. Arc<dyn Transport> : client clonable à coût nul entre les tâches tokio
// 3. #[instrument] : chaque appel a son span (endpoint, ticker, range)
// ============================================================================

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::FetchError;
use crate::models::{
    CompanyProfile, Credentials, Envelope, HoldingReceipt, LoginResponse, PerformancePoint,
    PerformanceSeries, Position, PriceSeries, QuoteSummary, Registration, SectorCompany,
    StockStats, TickerSummary, TimeRange, TradeOrder,
};
use crate::session::SessionStore;

/// Origine du token ajouté aux requêtes
#[derive(Clone)]
enum Auth {
    /// Lu dans la session à chaque requête
    Live(Arc<SessionStore>),
    /// Figé au moment de l'envoi d'une commande
    Pinned(Option<String>),
}

/// Client du backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    auth: Auth,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            auth: Auth::Live(session),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Copie du client dont le token est figé maintenant
    ///
    /// Le worker l'appelle à la réception d'une commande : une déconnexion
    /// pendant la requête ne change pas les en-têtes déjà décidés
    pub fn pinned(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: Arc::clone(&self.transport),
            auth: Auth::Pinned(self.token()),
        }
    }

    fn token(&self) -> Option<String> {
        match &self.auth {
            Auth::Live(session) => session.token(),
            Auth::Pinned(token) => token.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> ApiRequest {
        let request = ApiRequest::new(method, format!("{}{}", self.base_url, path))
            .with_header("Content-Type", "application/json");

        match self.token() {
            Some(token) => request.with_header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    // ========================================================================
    // Plomberie GET / POST
    // ========================================================================

    /// GET + désérialisation du corps
    ///
    /// Non-2xx -> FetchError::Network { status, detail: "Network error" }
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let response = self.transport.execute(self.request(Method::Get, path)).await?;

        if !response.is_success() {
            warn!(path, status = response.status, "GET failed");
            return Err(FetchError::Network {
                status: response.status,
                detail: "Network error".to_string(),
            });
        }

        decode(&response)
    }

    /// GET d'une réponse enveloppée `{"data": ...}`
    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let envelope: Envelope<T> = self.get(path).await?;
        Ok(envelope.data)
    }

    /// POST JSON ; retourne la réponse brute si 2xx
    ///
    /// Non-2xx -> FetchError::Network avec le message du serveur
    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse, FetchError> {
        let json = serde_json::to_string(body).map_err(|e| FetchError::Decode(e.to_string()))?;
        let request = self.request(Method::Post, path).with_body(json);
        let response = self.transport.execute(request).await?;

        if !response.is_success() {
            let error = FetchError::from_response(response.status, &response.body);
            warn!(path, status = response.status, error = %error, "POST failed");
            return Err(error);
        }

        Ok(response)
    }

    // ========================================================================
    // Authentification
    // ========================================================================

    #[instrument(skip_all, fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<(), FetchError> {
        self.post("/auth/register", registration).await?;
        info!("Account registered");
        Ok(())
    }

    /// Retourne le token ; la session n'est PAS modifiée ici
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<String, FetchError> {
        let response = self.post("/auth/login", credentials).await?;
        let login: LoginResponse = decode(&response)?;

        if login.token.is_empty() {
            return Err(FetchError::Empty("token".to_string()));
        }
        info!("Login accepted");
        Ok(login.token)
    }

    // ========================================================================
    // Marché
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn all_tickers(&self) -> Result<Vec<TickerSummary>, FetchError> {
        let tickers: Vec<TickerSummary> = self.get_data("/stocks/all/tickers").await?;
        debug!(count = tickers.len(), "Ticker universe received");
        Ok(tickers)
    }

    #[instrument(skip(self))]
    pub async fn summary(&self, ticker: &str) -> Result<QuoteSummary, FetchError> {
        self.get_data(&format!("/stocks/summary/{}", ticker)).await
    }

    #[instrument(skip(self))]
    pub async fn about(&self, ticker: &str) -> Result<CompanyProfile, FetchError> {
        self.get_data(&format!("/stocks/about/{}", ticker)).await
    }

    #[instrument(skip(self))]
    pub async fn stats(&self, ticker: &str) -> Result<StockStats, FetchError> {
        self.get_data(&format!("/stocks/stats/{}", ticker)).await
    }

    #[instrument(skip(self, range), fields(range = range.label()))]
    pub async fn price_series(&self, ticker: &str, range: TimeRange) -> Result<PriceSeries, FetchError> {
        let series: PriceSeries = self
            .get_data(&format!("/stocks/{}?timeRange={}", ticker, range.label()))
            .await?;
        debug!(points = series.len(), "Price series received");
        Ok(series)
    }

    #[instrument(skip(self))]
    pub async fn sp500(&self) -> Result<Vec<SectorCompany>, FetchError> {
        let companies: Vec<SectorCompany> = self.get_data("/stocks/sp500").await?;
        debug!(count = companies.len(), "S&P 500 received");
        Ok(companies)
    }

    // ========================================================================
    // Portefeuille
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn portfolio_table(&self) -> Result<Vec<Position>, FetchError> {
        self.get_data("/portfolio/table").await
    }

    #[instrument(skip(self, range), fields(range = range.label()))]
    pub async fn portfolio_graph(&self, range: TimeRange) -> Result<PerformanceSeries, FetchError> {
        let points: Vec<PerformancePoint> = self
            .get_data(&format!("/portfolio/graph?timeRange={}", range.label()))
            .await?;
        Ok(PerformanceSeries::new(points))
    }

    /// Enregistre un achat
    ///
    /// Tout 2xx est un succès ; l'écho du serveur est optionnel
    #[instrument(skip_all, fields(ticker = %order.ticker, shares = order.shares))]
    pub async fn submit_trade(&self, order: &TradeOrder) -> Result<Option<HoldingReceipt>, FetchError> {
        let response = self.post("/portfolio/holdings", order).await?;
        info!(status = response.status, "Trade accepted");
        Ok(serde_json::from_str(&response.body).ok())
    }
}

/// Désérialise le corps d'une réponse 2xx
fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, FetchError> {
    serde_json::from_str(&response.body).map_err(|e| FetchError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::scripted::ScriptedTransport;
    use crate::session::MemoryTokenStorage;

    fn client_with(transport: Arc<ScriptedTransport>, token: Option<&str>) -> ApiClient {
        let storage = match token {
            Some(t) => MemoryTokenStorage::with_token(t),
            None => MemoryTokenStorage::new(),
        };
        let session = Arc::new(SessionStore::new(storage));
        session.initialize();
        ApiClient::new("http://api.test/", transport, session)
    }

    #[tokio::test]
    async fn test_bearer_and_content_type_headers() {
        let transport = Arc::new(
            ScriptedTransport::new().on(Method::Get, "/stocks/all/tickers", 200, r#"{"data": []}"#),
        );
        let client = client_with(Arc::clone(&transport), Some("abc"));

        client.all_tickers().await.unwrap();

        let sent = &transport.received()[0];
        assert_eq!(sent.url, "http://api.test/stocks/all/tickers");
        assert_eq!(sent.header("authorization"), Some("Bearer abc"));
        assert_eq!(sent.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_no_authorization_without_session() {
        let transport = Arc::new(
            ScriptedTransport::new().on(Method::Get, "/stocks/sp500", 200, r#"{"data": []}"#),
        );
        let client = client_with(Arc::clone(&transport), None);

        client.sp500().await.unwrap();
        assert_eq!(transport.received()[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn test_pinned_token_survives_logout() {
        let transport = Arc::new(
            ScriptedTransport::new().on(Method::Get, "/portfolio/table", 200, r#"{"data": []}"#),
        );
        let session = Arc::new(SessionStore::new(MemoryTokenStorage::with_token("t1")));
        session.initialize();
        let client = ApiClient::new("http://api.test", transport.clone(), Arc::clone(&session));

        let pinned = client.pinned();
        session.logout();
        pinned.portfolio_table().await.unwrap();

        assert_eq!(transport.received()[0].header("authorization"), Some("Bearer t1"));
    }

    #[tokio::test]
    async fn test_connection_failure_reaches_caller_unchanged() {
        let error = FetchError::Transport("connection failed: refused".to_string());
        let transport = Arc::new(
            ScriptedTransport::new().failing(Method::Get, "/portfolio/table", error.clone()),
        );
        let client = client_with(transport, Some("t"));

        assert_eq!(client.portfolio_table().await.unwrap_err(), error);
    }

    #[tokio::test]
    async fn test_get_failure_is_network_error() {
        let transport = Arc::new(
            ScriptedTransport::new().on(Method::Get, "/stocks/summary/ZZZ", 404, "not found"),
        );
        let client = client_with(transport, None);

        let err = client.summary("ZZZ").await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Network { status: 404, detail: "Network error".to_string() }
        );
    }

    #[tokio::test]
    async fn test_post_failure_carries_server_detail() {
        let transport = Arc::new(ScriptedTransport::new().on(
            Method::Post,
            "/auth/register",
            400,
            r#"{"detail": "Email already registered"}"#,
        ));
        let client = client_with(transport, None);

        let registration = Registration {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "secret".into(),
        };
        let err = client.register(&registration).await.unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let transport = Arc::new(ScriptedTransport::new().on(
            Method::Post,
            "/auth/login",
            200,
            r#"{"token": "jwt-1", "token_type": "bearer"}"#,
        ));
        let client = client_with(Arc::clone(&transport), None);

        let credentials = Credentials { email: "a@b.c".into(), password: "pw".into() };
        assert_eq!(client.login(&credentials).await.unwrap(), "jwt-1");

        let body: serde_json::Value =
            serde_json::from_str(transport.received()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["email"], "a@b.c");
    }

    #[tokio::test]
    async fn test_price_series_uses_time_range_param() {
        let transport = Arc::new(ScriptedTransport::new().on(
            Method::Get,
            "/stocks/AAPL?timeRange=1M",
            200,
            r#"{"data": {"labels": ["a", "b"], "prices": [1.0, 2.0]}}"#,
        ));
        let client = client_with(transport, None);

        let series = client.price_series("AAPL", TimeRange::OneMonth).await.unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.is_rising());
    }

    #[tokio::test]
    async fn test_trade_success_on_200() {
        let transport = Arc::new(ScriptedTransport::new().on(
            Method::Post,
            "/portfolio/holdings",
            200,
            r#"{"id": 7, "ticker": "AAPL", "shares": 10, "buy_price": 150}"#,
        ));
        let client = client_with(Arc::clone(&transport), Some("tok"));

        let receipt = client
            .submit_trade(&TradeOrder::new("AAPL", 10.0, 150.0))
            .await
            .unwrap();
        assert_eq!(receipt.and_then(|r| r.id), Some(7));

        let sent = transport.received();
        assert_eq!(sent.len(), 1);
        let body: serde_json::Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"ticker": "AAPL", "shares": 10.0, "buy_price": 150.0}));
    }

    #[tokio::test]
    async fn test_decode_error() {
        let transport = Arc::new(
            ScriptedTransport::new().on(Method::Get, "/portfolio/table", 200, "<html>"),
        );
        let client = client_with(transport, Some("tok"));

        assert!(matches!(client.portfolio_table().await, Err(FetchError::Decode(_))));
    }
}
