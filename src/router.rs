// ============================================================================
// Router : routes, historique de navigation et garde d'authentification
// ============================================================================
// CONCEPTS RUST :
// 1. Enum avec données : Route::Stock { ticker } porte son paramètre
// 2. State machine : GuardState = Pending | Allowed | Denied
// 3. Fonctions pures : la garde ne dépend que d'un snapshot de session
//
// PATTERN : Chaque frame, l'UI demande au Navigator quelle page afficher.
// La garde est donc réévaluée en continu : une déconnexion sur une page
// protégée redirige immédiatement vers le login.
// ============================================================================

use tracing::{debug, info};

use crate::session::Session;

// ============================================================================
// Enum : Route
// ============================================================================

/// Pages de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Accueil : treemap du S&P 500
    Home,

    /// Détail d'une action
    Stock { ticker: String },

    Login,
    Register,

    /// Portefeuille (protégé)
    Portfolio,

    /// Passage d'ordre (protégé)
    Trade,
}

impl Route {
    /// Route canonique du détail d'une action
    pub fn stock(ticker: &str) -> Self {
        Route::Stock {
            ticker: ticker.to_uppercase(),
        }
    }

    /// Vrai si la route n'est accessible qu'une fois connecté
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Portfolio | Route::Trade)
    }

    /// Chemin façon URL, pour les logs et le header
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Stock { ticker } => format!("/stock/{}", ticker),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Portfolio => "/portfolio".to_string(),
            Route::Trade => "/trade".to_string(),
        }
    }
}

// ============================================================================
// Garde d'authentification
// ============================================================================

/// Résultat de la garde pour une route protégée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Session en cours de chargement : aucune décision possible
    Pending,
    /// Connecté : on affiche le contenu
    Allowed,
    /// Déconnecté : redirection vers le login
    Denied,
}

impl GuardState {
    /// Évalue la garde à partir d'un snapshot de session
    pub fn evaluate(session: &Session) -> Self {
        if session.loading {
            GuardState::Pending
        } else if session.is_authenticated() {
            GuardState::Allowed
        } else {
            GuardState::Denied
        }
    }
}

/// Ce que l'UI doit dessiner pour la frame courante
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Indicateur de chargement neutre (garde en attente)
    Loading,
    /// Page à afficher
    Page(Route),
}

// ============================================================================
// Structure : Navigator
// ============================================================================

/// Historique de navigation (pile de routes)
#[derive(Debug, Clone)]
pub struct Navigator {
    history: Vec<Route>,
}

impl Navigator {
    /// Démarre sur `start`
    pub fn new(start: Route) -> Self {
        Self {
            history: vec![start],
        }
    }

    /// Route courante (sommet de la pile)
    ///
    /// CONCEPT RUST : Invariant de construction
    /// - history n'est jamais vide (new() empile, back() garde la racine)
    pub fn current(&self) -> &Route {
        &self.history[self.history.len() - 1]
    }

    /// Navigue vers `route` (nouvelle entrée d'historique)
    ///
    /// Naviguer vers la route courante ne crée pas de doublon
    pub fn push(&mut self, route: Route) {
        if *self.current() == route {
            return;
        }
        info!(from = %self.current().path(), to = %route.path(), "Navigate");
        self.history.push(route);
    }

    /// Remplace l'entrée courante (le retour arrière ne la verra plus)
    pub fn replace(&mut self, route: Route) {
        debug!(from = %self.current().path(), to = %route.path(), "Replace route");
        let last = self.history.len() - 1;
        self.history[last] = route;
    }

    /// Retour arrière ; retourne false s'il n'y a rien avant
    pub fn back(&mut self) -> bool {
        if self.history.len() > 1 {
            self.history.pop();
            debug!(to = %self.current().path(), "Navigate back");
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Décide quoi afficher selon la garde
    ///
    /// CONCEPT : Redirection avec remplacement d'historique
    /// - Denied remplace la route protégée par Login
    /// - Un retour arrière depuis le login ne revient donc pas sur la page protégée
    pub fn resolve(&mut self, session: &Session) -> Resolved {
        let route = self.current().clone();
        if !route.requires_auth() {
            return Resolved::Page(route);
        }

        match GuardState::evaluate(session) {
            GuardState::Pending => Resolved::Loading,
            GuardState::Allowed => Resolved::Page(route),
            GuardState::Denied => {
                info!(route = %route.path(), "Not authenticated, redirecting to login");
                self.replace(Route::Login);
                Resolved::Page(Route::Login)
            }
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
