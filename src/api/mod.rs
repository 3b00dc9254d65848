// ============================================================================
// Module : api
// ============================================================================
// Accès au backend HTTP :
// - transport : exécution des requêtes (reqwest en production)
// - client    : un appel typé par endpoint, bearer token inclus
// ============================================================================

pub mod client;     // Endpoints typés
pub mod transport;  // Trait Transport + implémentation reqwest

// Re-export des types principaux
pub use client::ApiClient;
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};
