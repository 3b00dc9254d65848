// ============================================================================
// LazyFolio - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Client HTTP du backend
pub mod app;       // État de l'application
pub mod config;    // Arguments CLI et variables d'environnement
pub mod error;     // Erreurs typées (FetchError)
pub mod fetch;     // Ressources avec clé de dépendance (last key wins)
pub mod listeners; // Registre des abonnements (clic, resize)
pub mod logging;   // Logs vers fichier avec rotation
pub mod models;    // Structures de données
pub mod router;    // Routes, historique, garde d'authentification
pub mod search;    // Recherche de tickers
pub mod session;   // Session utilisateur persistée
pub mod treemap;   // Layout et état de la treemap du S&P 500
pub mod ui;        // Interface utilisateur
pub mod worker;    // Worker thread (appels async)
