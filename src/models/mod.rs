// ============================================================================
// Module : models
// ============================================================================
// Structures de données échangées avec le backend (JSON) et helpers
// de formatage partagés par les vues
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : sous-module public (accessible depuis l'extérieur)
// - "pub use" : re-export pour raccourcir les imports
// ============================================================================

pub mod auth;       // Identifiants, inscription, token
pub mod format;     // Formatage des nombres (%, milliards, séparateurs)
pub mod market;     // Liste S&P 500 pour la treemap
pub mod portfolio;  // Positions, performance, ordres
pub mod quote;      // Résumé de cotation, profil, statistiques
pub mod series;     // Séries de prix et plages de temps
pub mod ticker;     // Univers des tickers (recherche)

// Re-export des structures principales
// Au lieu de : use lazyfolio::models::ticker::TickerSummary;
// On peut faire : use lazyfolio::models::TickerSummary;
pub use auth::{Credentials, LoginResponse, Registration};
pub use market::SectorCompany;
pub use portfolio::{HoldingReceipt, PerformancePoint, PerformanceSeries, Position, TradeOrder};
pub use quote::{CompanyProfile, Metric, QuoteSummary, StockStats};
pub use series::{PricePoint, PriceSeries, TimeRange};
pub use ticker::TickerSummary;

use serde::Deserialize;

/// Enveloppe `{"data": ...}` utilisée par toutes les réponses du backend
/// (sauf le login)
///
/// CONCEPT RUST : Générique avec serde
/// - Envelope<T> désérialise n'importe quel T qui implémente Deserialize
/// - Évite de dupliquer une struct "Response" par endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}
