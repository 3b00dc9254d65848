// ============================================================================
// Séries de prix et plages de temps
// ============================================================================
// GET /stocks/:ticker?timeRange=1M -> {"data": {"labels": [...], "prices": [...]}}
//
// CONCEPT : Un seul nom de paramètre ("timeRange") pour toutes les vues
// (graphique d'une action et performance du portefeuille)
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Enum : TimeRange
// ============================================================================
// CONCEPT RUST : Enum Copy pour un choix fermé
// - Copy : se copie comme un entier, pas besoin de .clone()
// - Les sous-ensembles par vue sont des constantes (slices statiques)
// ============================================================================

/// Plage de temps d'un graphique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    YearToDate,
    OneYear,
    FiveYears,
    All,
}

impl TimeRange {
    /// Plages proposées par le graphique d'une action
    pub const STOCK: &'static [TimeRange] = &[
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::SixMonths,
        TimeRange::YearToDate,
        TimeRange::OneYear,
        TimeRange::FiveYears,
        TimeRange::All,
    ];

    /// Plages proposées par le graphique du portefeuille
    pub const PORTFOLIO: &'static [TimeRange] = &[
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::OneYear,
        TimeRange::All,
    ];

    /// Valeur du paramètre de requête (et libellé des boutons)
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "1D",
            TimeRange::OneWeek => "1W",
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::SixMonths => "6M",
            TimeRange::YearToDate => "YTD",
            TimeRange::OneYear => "1Y",
            TimeRange::FiveYears => "5Y",
            TimeRange::All => "ALL",
        }
    }

    /// Plage suivante dans `choices` (boucle)
    ///
    /// Si `self` n'appartient pas à `choices`, retourne le premier élément
    pub fn next_in(&self, choices: &[TimeRange]) -> TimeRange {
        match choices.iter().position(|r| r == self) {
            Some(i) => choices[(i + 1) % choices.len()],
            None => choices.first().copied().unwrap_or(*self),
        }
    }

    /// Plage précédente dans `choices` (boucle)
    pub fn previous_in(&self, choices: &[TimeRange]) -> TimeRange {
        match choices.iter().position(|r| r == self) {
            Some(0) => choices.last().copied().unwrap_or(*self),
            Some(i) => choices[i - 1],
            None => choices.first().copied().unwrap_or(*self),
        }
    }
}

impl Default for TimeRange {
    /// Plage par défaut : 1 jour
    fn default() -> Self {
        TimeRange::OneDay
    }
}

// ============================================================================
// Structure : PriceSeries
// ============================================================================

/// Un point du graphique (libellé de l'axe X + prix)
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub label: String,
    pub price: f64,
}

/// Série de prix telle qu'envoyée par le backend (deux tableaux parallèles)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub prices: Vec<f64>,
}

impl PriceSeries {
    /// Combine labels et prix en points
    ///
    /// CONCEPT RUST : zip
    /// - S'arrête au plus court des deux tableaux (pas de panic si tailles différentes)
    pub fn points(&self) -> Vec<PricePoint> {
        self.labels
            .iter()
            .zip(self.prices.iter())
            .map(|(label, &price)| PricePoint {
                label: label.clone(),
                price,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len().min(self.prices.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first_price(&self) -> Option<f64> {
        self.prices.first().copied()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.prices.get(self.len().checked_sub(1)?).copied()
    }

    /// Vrai si la série monte (ou stagne) sur la période
    ///
    /// Moins de 2 points : considéré comme haussier (couleur "gain" par défaut)
    pub fn is_rising(&self) -> bool {
        match (self.first_price(), self.last_price()) {
            (Some(first), Some(last)) if self.len() >= 2 => last >= first,
            _ => true,
        }
    }
}
