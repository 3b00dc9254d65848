// ============================================================================
// Cotation, profil et statistiques d'une action
// ============================================================================
// GET /stocks/summary/:ticker, /stocks/about/:ticker, /stocks/stats/:ticker
//
// Le backend renvoie des nombres OU la chaîne "N/A" pour le même champ,
// voire null. On modélise ça avec un enum untagged plutôt que des Option<f64>
// qui échoueraient sur "N/A".
// ============================================================================

use std::fmt;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::models::format;

// ============================================================================
// Enum : Metric
// ============================================================================
// CONCEPT RUST : #[serde(untagged)]
// - Serde essaie chaque variant dans l'ordre jusqu'à ce qu'un match
// - 42.5 -> Number, "N/A" -> Text, null -> Missing
// ============================================================================

/// Valeur numérique optionnelle telle qu'envoyée par le backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Metric {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl Metric {
    /// Retourne la valeur numérique si elle existe
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Metric::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Applique un formatage si la valeur est numérique, sinon "N/A"
    /// (ou le texte brut du backend, ex: "185.2 / 185.3" pour bid/ask)
    pub fn map_or_na(&self, f: impl FnOnce(f64) -> String) -> String {
        match self {
            Metric::Number(v) => f(*v),
            Metric::Text(text) if !text.trim().is_empty() => text.clone(),
            _ => "N/A".to_string(),
        }
    }

    /// "12.35"
    pub fn fixed2(&self) -> String {
        self.map_or_na(|v| format!("{:.2}", v))
    }

    /// Ratio -> pourcentage : 0.2531 -> "25.31%"
    pub fn ratio_percent(&self) -> String {
        self.map_or_na(|v| format!("{:.2}%", v * 100.0))
    }

    /// Pourcentage déjà exprimé en % : 1.5 -> "1.50%"
    pub fn percent(&self) -> String {
        self.map_or_na(|v| format!("{:.2}%", v))
    }

    /// "+1.50%"
    pub fn signed_percent(&self) -> String {
        self.map_or_na(format::signed_percent)
    }

    /// "$185.23"
    pub fn dollars(&self) -> String {
        self.map_or_na(format::dollars)
    }

    /// "1,234,567"
    pub fn thousands(&self) -> String {
        self.map_or_na(format::thousands)
    }

    /// "$2.95T"
    pub fn compact_dollars(&self) -> String {
        self.map_or_na(format::compact_dollars)
    }

    /// Timestamp Unix (secondes) -> "Jan 30, 2025"
    pub fn date(&self) -> String {
        self.map_or_na(|v| {
            DateTime::from_timestamp(v as i64, 0)
                .map(|dt| dt.format("%b %d, %Y").to_string())
                .unwrap_or_else(|| "N/A".to_string())
        })
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Number(v) => write!(f, "{}", v),
            Metric::Text(text) => write!(f, "{}", text),
            Metric::Missing => write!(f, "N/A"),
        }
    }
}

// ============================================================================
// Structure : QuoteSummary
// ============================================================================

/// Résumé de cotation ("Stock Detail")
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteSummary {
    pub stock_ticker: String,
    pub name: Metric,
    pub exchange: Metric,
    pub current_price: Metric,
    pub daily_change: Metric,
    pub percent_change: Metric,
    pub market_status: Metric,
    pub earnings_date: Metric,
    pub eps: Metric,
    pub market_cap: Metric,
    pub pe: Metric,
    pub volume: Metric,
    pub bid_ask: Metric,
    pub day_high: Metric,
    pub day_low: Metric,
    pub year_high: Metric,
    pub year_low: Metric,
}

impl QuoteSummary {
    /// Prix actuel si le backend en a fourni un
    pub fn price(&self) -> Option<f64> {
        self.current_price.as_f64().filter(|p| *p > 0.0)
    }

    /// Lignes (libellé, valeur) du tableau "Stock Detail"
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Earning's Date", self.earnings_date.date()),
            ("EPS", self.eps.to_string()),
            ("PE", self.pe.fixed2()),
            ("Market Cap", self.market_cap.compact_dollars()),
            ("Bid/Ask", format!("${}", self.bid_ask)),
            ("Volume", self.volume.thousands()),
            ("Day's High", self.day_high.to_string()),
            ("Day's Low", self.day_low.to_string()),
            ("52 Week High", self.year_high.to_string()),
            ("52 Week Low", self.year_low.to_string()),
        ]
    }
}

// ============================================================================
// Structure : CompanyProfile
// ============================================================================

/// Profil de la société ("About")
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub ceo: Metric,
    pub founded: Metric,
    pub headquarters: Option<String>,
    pub employees: Metric,
    pub website: Option<String>,
}

impl CompanyProfile {
    /// Un profil sans nom ni description n'apporte rien à afficher
    pub fn is_blank(&self) -> bool {
        self.name.as_deref().map_or(true, str::is_empty)
            && self.summary.as_deref().map_or(true, str::is_empty)
    }
}

// ============================================================================
// Structure : StockStats
// ============================================================================
// Quatre groupes de statistiques, chacun rendu comme un petit tableau
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Valuation {
    pub market_cap: Metric,
    pub pe_ratio: Metric,
    pub forward_pe: Metric,
    pub price_to_sales: Metric,
    pub price_to_book: Metric,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Performance {
    pub change_today_percent: Metric,
    pub fifty_two_week_high: Metric,
    pub fifty_two_week_low: Metric,
    pub ytd_return: Metric,
    pub one_year_return: Metric,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialHealth {
    pub debt_to_equity: Metric,
    pub current_ratio: Metric,
    pub profit_margin: Metric,
    pub roe: Metric,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingActivity {
    pub volume_today: Metric,
    pub avg_volume: Metric,
    pub beta: Metric,
    pub shares_outstanding: Metric,
    pub float: Metric,
}

/// Statistiques clés d'une action
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StockStats {
    pub valuation: Valuation,
    pub performance: Performance,
    pub financial_health: FinancialHealth,
    pub trading_activity: TradingActivity,
}

/// Un groupe titré de lignes (libellé, valeur formatée)
pub type StatGroup = (&'static str, Vec<(&'static str, String)>);

impl StockStats {
    /// Groupes prêts à afficher, dans l'ordre de la page
    pub fn groups(&self) -> Vec<StatGroup> {
        let v = &self.valuation;
        let p = &self.performance;
        let h = &self.financial_health;
        let t = &self.trading_activity;

        vec![
            (
                "Valuation",
                vec![
                    // Déjà formaté côté backend ("$2.95T")
                    ("Market Cap", v.market_cap.to_string()),
                    ("P/E Ratio", v.pe_ratio.fixed2()),
                    ("Forward P/E", v.forward_pe.fixed2()),
                    ("Price/Sales", v.price_to_sales.fixed2()),
                    ("Price/Book", v.price_to_book.fixed2()),
                ],
            ),
            (
                "Performance",
                vec![
                    ("Today", p.change_today_percent.signed_percent()),
                    ("52W High", p.fifty_two_week_high.dollars()),
                    ("52W Low", p.fifty_two_week_low.dollars()),
                    ("YTD Return", p.ytd_return.percent()),
                    ("1Y Return", p.one_year_return.ratio_percent()),
                ],
            ),
            (
                "Financial Health",
                vec![
                    ("Debt/Equity", h.debt_to_equity.fixed2()),
                    ("Current Ratio", h.current_ratio.fixed2()),
                    ("Profit Margin", h.profit_margin.ratio_percent()),
                    ("ROE", h.roe.ratio_percent()),
                ],
            ),
            (
                "Trading Activity",
                vec![
                    ("Volume Today", t.volume_today.thousands()),
                    ("Avg Volume (3M)", t.avg_volume.thousands()),
                    ("Beta", t.beta.fixed2()),
                    ("Shares Outstanding", t.shares_outstanding.thousands()),
                    ("Float", t.float.thousands()),
                ],
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_accepts_number_text_and_null() {
        let metrics: Vec<Metric> = serde_json::from_str(r#"[12.5, "N/A", null]"#).unwrap();

        assert_eq!(metrics[0], Metric::Number(12.5));
        assert_eq!(metrics[1], Metric::Text("N/A".to_string()));
        assert_eq!(metrics[2], Metric::Missing);
    }

    #[test]
    fn test_metric_formatting() {
        assert_eq!(Metric::Number(0.2531).ratio_percent(), "25.31%");
        assert_eq!(Metric::Number(1.5).signed_percent(), "+1.50%");
        assert_eq!(Metric::Number(28.456).fixed2(), "28.46");
        assert_eq!(Metric::Text("N/A".to_string()).fixed2(), "N/A");
        assert_eq!(Metric::Missing.dollars(), "N/A");
        assert_eq!(Metric::Number(0.0).date(), "Jan 01, 1970");
    }

    #[test]
    fn test_summary_price() {
        let json = r#"{
            "stock_ticker": "AAPL",
            "current_price": 185.23,
            "market_status": "Open",
            "bid_ask": "185.2 / 185.3"
        }"#;
        let summary: QuoteSummary = serde_json::from_str(json).unwrap();

        assert_eq!(summary.price(), Some(185.23));
        assert_eq!(summary.eps, Metric::Missing);

        let rows = summary.rows();
        assert!(rows.contains(&("Bid/Ask", "$185.2 / 185.3".to_string())));
    }

    #[test]
    fn test_summary_without_price() {
        let summary: QuoteSummary =
            serde_json::from_str(r#"{"current_price": "N/A"}"#).unwrap();
        assert_eq!(summary.price(), None);
    }

    #[test]
    fn test_stats_groups() {
        let json = r#"{
            "valuation": {"market_cap": "$2.95T", "pe_ratio": 30.123},
            "performance": {"one_year_return": 0.12},
            "financial_health": {"roe": "N/A"},
            "trading_activity": {"volume_today": 51234567}
        }"#;
        let stats: StockStats = serde_json::from_str(json).unwrap();
        let groups = stats.groups();

        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].1[0], ("Market Cap", "$2.95T".to_string()));
        assert_eq!(groups[0].1[1], ("P/E Ratio", "30.12".to_string()));
        assert_eq!(groups[1].1[4], ("1Y Return", "12.00%".to_string()));
        assert_eq!(groups[2].1[3], ("ROE", "N/A".to_string()));
        assert_eq!(groups[3].1[0], ("Volume Today", "51,234,567".to_string()));
    }
}
