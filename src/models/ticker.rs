// ============================================================================
// Structure : TickerSummary
// ============================================================================
// Un élément de l'univers des tickers (GET /stocks/all/tickers)
// Immuable une fois chargé : c'est la base de la recherche
// ============================================================================

use serde::{Deserialize, Serialize};

/// Ticker tel que renvoyé par le backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerSummary {
    /// Symbole (ex: "AAPL")
    pub ticker: String,

    /// Nom de la société (ex: "Apple Inc.")
    #[serde(default)]
    pub name: String,

    /// Place de cotation (ex: "NYSE")
    #[serde(default)]
    pub exchange: String,
}

impl TickerSummary {
    pub fn new(ticker: &str, name: &str, exchange: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            name: name.to_string(),
            exchange: exchange.to_string(),
        }
    }

    /// Vérifie si le ticker ou le nom contient `needle`
    ///
    /// `needle` doit déjà être en minuscules (calculé une fois par requête)
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.ticker.to_lowercase().contains(needle) || self.name.to_lowercase().contains(needle)
    }

    /// Formatte le ticker pour une ligne de suggestion
    pub fn display(&self) -> String {
        format!("{:<8} {:<32} {}", self.ticker, self.name, self.exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_ticker_or_name() {
        let apple = TickerSummary::new("AAPL", "Apple Inc.", "NASDAQ");

        assert!(apple.matches_lowercase("aap"));
        assert!(apple.matches_lowercase("apple"));
        assert!(apple.matches_lowercase("inc"));
        assert!(!apple.matches_lowercase("msft"));
    }

    #[test]
    fn test_deserialize_without_exchange() {
        let json = r#"{"ticker": "MSFT", "name": "Microsoft"}"#;
        let ticker: TickerSummary = serde_json::from_str(json).unwrap();

        assert_eq!(ticker.ticker, "MSFT");
        assert_eq!(ticker.exchange, "");
    }
}
