// ============================================================================
// Structure : SectorCompany
// ============================================================================
// Une ligne de GET /stocks/sp500 : entrée plate de la treemap
// ============================================================================

use serde::{Deserialize, Deserializer, Serialize};

/// Société du S&P 500 avec son secteur, sa capitalisation et sa variation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorCompany {
    pub ticker: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    pub sector: String,

    /// Capitalisation boursière (USD) : taille du rectangle
    #[serde(default, deserialize_with = "null_as_default")]
    pub market_cap: f64,

    /// Variation du jour en % : couleur du rectangle
    #[serde(default, deserialize_with = "null_as_default")]
    pub change_percent: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub current_price: f64,
}

/// `null` côté backend (clé présente sans valeur) : valeur par défaut
///
/// CONCEPT RUST : deserialize_with
/// - #[serde(default)] ne couvre que la clé absente
/// - Option<T> accepte null, puis unwrap_or_default() donne 0.0 / ""
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SectorCompany {
    pub fn new(ticker: &str, sector: &str, market_cap: f64, change_percent: f64) -> Self {
        Self {
            ticker: ticker.to_string(),
            name: String::new(),
            sector: sector.to_string(),
            market_cap,
            change_percent,
            current_price: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_row() {
        let json = r#"{
            "ticker": "AAPL", "name": "Apple Inc.", "sector": "Information Technology",
            "market_cap": 2950000000000, "current_price": 190.1, "change_percent": -0.42,
            "low": 0, "high": 0, "open": 0, "close": 0
        }"#;
        let company: SectorCompany = serde_json::from_str(json).unwrap();

        assert_eq!(company.sector, "Information Technology");
        assert_eq!(company.market_cap, 2.95e12);
        assert_eq!(company.change_percent, -0.42);
    }

    #[test]
    fn test_null_values_become_zero() {
        let json = r#"[
            {"ticker": "AAPL", "name": "Apple Inc.", "sector": "Tech", "market_cap": 100, "change_percent": 5},
            {"ticker": "XYZ", "name": null, "sector": "Tech", "market_cap": null, "change_percent": null, "current_price": null}
        ]"#;
        let companies: Vec<SectorCompany> = serde_json::from_str(json).unwrap();

        assert_eq!(companies.len(), 2);
        assert_eq!(companies[1].market_cap, 0.0);
        assert_eq!(companies[1].change_percent, 0.0);
        assert_eq!(companies[1].current_price, 0.0);
        assert_eq!(companies[1].name, "");
    }
}
