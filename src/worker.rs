// ============================================================================
// Worker en arrière-plan
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop (thread UI) envoie des AppCommand
// - Le worker (thread dédié + runtime tokio) exécute les appels HTTP
// - Les AppResult reviennent par un second channel, lus par l'UI
//
// Chaque commande devient une tâche tokio indépendante : les réponses
// arrivent dans n'importe quel ordre. C'est le Ticket (clé + génération)
// qui permet à l'UI de jeter les réponses dépassées.
// ============================================================================

use std::sync::mpsc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::FetchError;
use crate::fetch::{Holdings, Sp500, Ticket, TickerUniverse};
use crate::models::{
    CompanyProfile, Credentials, HoldingReceipt, PerformanceSeries, PriceSeries, QuoteSummary,
    Registration, StockStats, TimeRange, TradeOrder,
};

/// Clé du graphique de prix : (ticker, plage)
pub type PriceKey = (String, TimeRange);

/// Panneau de cotation destinataire (page action ou page trade)
///
/// Les deux pages ont leurs propres ressources : le résultat doit
/// revenir à celle qui l'a demandé
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Stock,
    Trade,
}

/// Commandes envoyées au worker
#[derive(Debug, Clone)]
pub enum AppCommand {
    LoadTickers { ticket: Ticket<()> },
    LoadSp500 { ticket: Ticket<()> },
    LoadSummary { panel: Panel, ticket: Ticket<String> },
    LoadAbout { ticket: Ticket<String> },
    LoadStats { ticket: Ticket<String> },
    LoadPrices { panel: Panel, ticket: Ticket<PriceKey> },
    LoadHoldings { ticket: Ticket<()> },
    LoadPerformance { ticket: Ticket<TimeRange> },

    Login { credentials: Credentials },
    Register { registration: Registration },
    SubmitTrade { order: TradeOrder },
}

/// Résultats renvoyés par le worker
#[derive(Debug)]
pub enum AppResult {
    Tickers { ticket: Ticket<()>, result: Result<TickerUniverse, FetchError> },
    Sp500 { ticket: Ticket<()>, result: Result<Sp500, FetchError> },
    Summary { panel: Panel, ticket: Ticket<String>, result: Result<QuoteSummary, FetchError> },
    About { ticket: Ticket<String>, result: Result<CompanyProfile, FetchError> },
    Stats { ticket: Ticket<String>, result: Result<StockStats, FetchError> },
    Prices { panel: Panel, ticket: Ticket<PriceKey>, result: Result<PriceSeries, FetchError> },
    Holdings { ticket: Ticket<()>, result: Result<Holdings, FetchError> },
    Performance { ticket: Ticket<TimeRange>, result: Result<PerformanceSeries, FetchError> },

    LoggedIn(Result<String, FetchError>),
    Registered(Result<(), FetchError>),
    TradeSubmitted(Result<Option<HoldingReceipt>, FetchError>),
}

/// Exécute une commande et produit son résultat
///
/// CONCEPT RUST : match exhaustif
/// - Ajouter une commande sans son résultat ne compile pas
pub async fn execute(client: &ApiClient, command: AppCommand) -> AppResult {
    match command {
        AppCommand::LoadTickers { ticket } => {
            let result = client.all_tickers().await;
            AppResult::Tickers { ticket, result }
        }
        AppCommand::LoadSp500 { ticket } => {
            let result = client.sp500().await;
            AppResult::Sp500 { ticket, result }
        }
        AppCommand::LoadSummary { panel, ticket } => {
            let result = client.summary(&ticket.key).await;
            AppResult::Summary { panel, ticket, result }
        }
        AppCommand::LoadAbout { ticket } => {
            let result = client.about(&ticket.key).await;
            AppResult::About { ticket, result }
        }
        AppCommand::LoadStats { ticket } => {
            let result = client.stats(&ticket.key).await;
            AppResult::Stats { ticket, result }
        }
        AppCommand::LoadPrices { panel, ticket } => {
            let (ticker, range) = &ticket.key;
            let result = client.price_series(ticker, *range).await;
            AppResult::Prices { panel, ticket, result }
        }
        AppCommand::LoadHoldings { ticket } => {
            let result = client.portfolio_table().await;
            AppResult::Holdings { ticket, result }
        }
        AppCommand::LoadPerformance { ticket } => {
            let result = client.portfolio_graph(ticket.key).await;
            AppResult::Performance { ticket, result }
        }
        AppCommand::Login { credentials } => AppResult::LoggedIn(client.login(&credentials).await),
        AppCommand::Register { registration } => {
            AppResult::Registered(client.register(&registration).await)
        }
        AppCommand::SubmitTrade { order } => {
            AppResult::TradeSubmitted(client.submit_trade(&order).await)
        }
    }
}

/// Lance le worker thread
///
/// CONCEPT RUST : Thread + runtime async
/// - std::thread::spawn() : thread OS qui possède le runtime tokio
/// - runtime.spawn() : une tâche par commande, rien ne bloque la boucle
/// - Le token est figé (client.pinned()) à la réception de la commande
///
/// Le thread s'arrête quand tous les Sender de commandes sont droppés
pub fn spawn_worker(
    client: ApiClient,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) -> Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let handle = std::thread::Builder::new()
        .name("lazyfolio-worker".to_string())
        .spawn(move || {
            // Boucle de traitement des commandes
            while let Ok(command) = command_rx.recv() {
                debug!(?command, "Worker received command");

                let client = client.pinned();
                let result_tx = result_tx.clone();
                runtime.spawn(async move {
                    let result = execute(&client, command).await;
                    if result_tx.send(result).is_err() {
                        warn!("Result channel closed, dropping response");
                    }
                });
            }
            info!("Worker thread exiting (channel closed)");
        })
        .context("Échec du lancement du worker thread")?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::api::transport::scripted::ScriptedTransport;
    use crate::api::Method;
    use crate::fetch::{Commit, Resource};
    use crate::session::{MemoryTokenStorage, SessionStore};

    fn client(transport: ScriptedTransport) -> ApiClient {
        let session = Arc::new(SessionStore::new(MemoryTokenStorage::with_token("tok")));
        session.initialize();
        ApiClient::new("http://api.test", Arc::new(transport), session)
    }

    #[tokio::test]
    async fn test_execute_carries_ticket_back() {
        let client = client(ScriptedTransport::new().on(
            Method::Get,
            "/stocks/about/AAPL",
            200,
            r#"{"data": {"name": "Apple Inc."}}"#,
        ));
        let ticket = Ticket { key: "AAPL".to_string(), generation: 3 };

        match execute(&client, AppCommand::LoadAbout { ticket: ticket.clone() }).await {
            AppResult::About { ticket: back, result } => {
                assert_eq!(back, ticket);
                assert_eq!(result.unwrap().name.as_deref(), Some("Apple Inc."));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_trade_reports_once() {
        let client = client(ScriptedTransport::new().on(
            Method::Post,
            "/portfolio/holdings",
            200,
            "{}",
        ));
        let order = TradeOrder::new("AAPL", 10.0, 150.0);

        let result = execute(&client, AppCommand::SubmitTrade { order }).await;
        assert!(matches!(result, AppResult::TradeSubmitted(Ok(_))));
    }

    #[test]
    fn test_last_key_wins_with_real_worker() {
        // K1 répond lentement, K2 vite : la réponse de K1 arrive en dernier
        let transport = ScriptedTransport::new()
            .on_delayed(
                Method::Get,
                "/stocks/summary/K1",
                200,
                r#"{"data": {"stock_ticker": "K1"}}"#,
                Duration::from_millis(150),
            )
            .on(Method::Get, "/stocks/summary/K2", 200, r#"{"data": {"stock_ticker": "K2"}}"#);

        let (command_tx, command_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();
        let handle = spawn_worker(client(transport), command_rx, result_tx).unwrap();

        let mut summary: Resource<String, QuoteSummary> = Resource::new();
        let k1 = summary.request("K1".to_string()).unwrap();
        command_tx.send(AppCommand::LoadSummary { panel: Panel::Stock, ticket: k1 }).unwrap();
        let k2 = summary.request("K2".to_string()).unwrap();
        command_tx.send(AppCommand::LoadSummary { panel: Panel::Stock, ticket: k2 }).unwrap();

        let mut commits = Vec::new();
        for _ in 0..2 {
            match result_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                AppResult::Summary { ticket, result, .. } => {
                    commits.push((ticket.key.clone(), summary.commit(&ticket, result)));
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }

        assert_eq!(
            commits,
            vec![("K2".to_string(), Commit::Applied), ("K1".to_string(), Commit::Stale)]
        );
        assert_eq!(summary.data().unwrap().stock_ticker, "K2");

        drop(command_tx);
        handle.join().unwrap();
    }
}
