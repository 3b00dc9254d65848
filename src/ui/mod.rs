// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod auth;      // Formulaires (login, inscription, quantité)
pub mod chart;     // Graphiques ligne (prix, performance)
pub mod dashboard; // Cadre commun et routage des pages
pub mod events;    // Clavier, souris, redimensionnement
pub mod portfolio; // Page Portfolio
pub mod search;    // Barre de recherche et suggestions
pub mod status;    // États chargement / vide / erreur
pub mod stock;     // Page Stock
pub mod trade;     // Page Trade
pub mod treemap;   // Treemap du S&P 500

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
