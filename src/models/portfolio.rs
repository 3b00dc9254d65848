// ============================================================================
// Portefeuille : positions, performance et ordres
// ============================================================================
// GET  /portfolio/table                -> positions (camelCase)
// GET  /portfolio/graph?timeRange=1M   -> points {date, value}
// POST /portfolio/holdings             -> {ticker, shares, buy_price}
// ============================================================================

use serde::{Deserialize, Serialize};

/// Une position du portefeuille (ligne du tableau)
///
/// CONCEPT RUST : #[serde(rename_all = "camelCase")]
/// - "totalValue" (JSON) <-> total_value (Rust)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub ticker: String,
    pub name: String,
    pub shares: f64,
    pub total_value: f64,
    pub current_price: f64,
    pub today_change_percent: f64,
    pub all_time_return_amount: f64,
    pub all_time_return: f64,
}

impl Position {
    pub fn is_up_today(&self) -> bool {
        self.today_change_percent > 0.0
    }

    pub fn is_up_all_time(&self) -> bool {
        self.all_time_return > 0.0
    }
}

/// Un point de la courbe de performance (rendement en %)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformancePoint {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub value: f64,
}

/// Courbe de performance complète
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerformanceSeries {
    pub points: Vec<PerformancePoint>,
}

impl PerformanceSeries {
    pub fn new(points: Vec<PerformancePoint>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Même règle de couleur que le graphique des prix
    pub fn is_rising(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() >= 2 => last.value >= first.value,
            _ => true,
        }
    }
}

/// Ordre d'achat envoyé au backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOrder {
    pub ticker: String,
    pub shares: f64,
    pub buy_price: f64,
}

impl TradeOrder {
    pub fn new(ticker: &str, shares: f64, buy_price: f64) -> Self {
        Self {
            ticker: ticker.to_uppercase(),
            shares,
            buy_price,
        }
    }
}

/// Position créée, renvoyée par POST /portfolio/holdings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldingReceipt {
    pub id: Option<i64>,
    pub ticker: String,
    pub shares: f64,
    pub buy_price: f64,
    pub current_price: Option<f64>,
    pub gain_loss: Option<f64>,
    pub gain_loss_percent: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_from_camel_case() {
        let json = r#"{
            "ticker": "AAPL", "name": "Apple", "shares": 10,
            "totalValue": 1900.5, "currentPrice": 190.05,
            "todayChangePercent": -0.4, "allTimeReturnAmount": 400.5, "allTimeReturn": 26.7
        }"#;
        let position: Position = serde_json::from_str(json).unwrap();

        assert_eq!(position.total_value, 1900.5);
        assert!(!position.is_up_today());
        assert!(position.is_up_all_time());
    }

    #[test]
    fn test_trade_order_body() {
        let order = TradeOrder::new("aapl", 10.0, 150.0);
        let body = serde_json::to_value(&order).unwrap();

        assert_eq!(body["ticker"], "AAPL");
        assert_eq!(body["shares"], 10.0);
        assert_eq!(body["buy_price"], 150.0);
    }

    #[test]
    fn test_performance_direction() {
        let series = PerformanceSeries::new(vec![
            PerformancePoint { date: "Jan".into(), value: 2.0 },
            PerformancePoint { date: "Feb".into(), value: -1.0 },
        ]);
        assert!(!series.is_rising());
        assert!(PerformanceSeries::default().is_rising());
    }
}
