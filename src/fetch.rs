// ============================================================================
// Cycle de vie d'une vue liée à des données
// ============================================================================
// Chaque vue (graphique, résumé, tableau, treemap...) possède un Resource :
//   1. request(key)  -> passe en Loading, renvoie un Ticket (génération)
//   2. la requête part dans le worker (async, pas d'annulation)
//   3. commit(ticket, résultat) -> appliqué seulement si le ticket est le
//      plus récent ; sinon la réponse est jetée ("last key wins")
//
// CONCEPTS RUST :
// 1. Génériques : Resource<K, T> pour n'importe quelle clé et donnée
// 2. Trait bounds : K: Clone + PartialEq pour comparer les clés
// 3. Enum avec références : ResourceView<'a, T> emprunte les données
// ============================================================================

use std::fmt::Debug;

use tracing::debug;

use crate::error::FetchError;
use crate::models::{
    CompanyProfile, PerformanceSeries, Position, PriceSeries, QuoteSummary, SectorCompany,
    StockStats, TickerSummary,
};

/// Statut d'une ressource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Identifie une requête émise : la clé et sa génération
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    pub key: K,
    pub generation: u64,
}

/// Résultat d'un commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// La réponse a été appliquée
    Applied,
    /// La réponse concerne une requête dépassée : ignorée
    Stale,
}

// ============================================================================
// Trait : Emptiness
// ============================================================================
// CONCEPT RUST : Trait pour un comportement commun
// - "vide" n'a pas le même sens pour une liste et pour un profil
// - Chaque type de donnée dit lui-même s'il a quelque chose à afficher
// ============================================================================

/// Une donnée reçue avec succès peut quand même être vide
pub trait Emptiness {
    fn is_empty_data(&self) -> bool;
}

impl<T> Emptiness for Vec<T> {
    fn is_empty_data(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for PriceSeries {
    fn is_empty_data(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for PerformanceSeries {
    fn is_empty_data(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for CompanyProfile {
    fn is_empty_data(&self) -> bool {
        self.is_blank()
    }
}

impl Emptiness for QuoteSummary {
    fn is_empty_data(&self) -> bool {
        false
    }
}

impl Emptiness for StockStats {
    fn is_empty_data(&self) -> bool {
        false
    }
}

// Aides pour les alias utilisés par les pages
pub type TickerUniverse = Vec<TickerSummary>;
pub type Holdings = Vec<Position>;
pub type Sp500 = Vec<SectorCompany>;

/// Ce que la vue doit dessiner
#[derive(Debug, PartialEq)]
pub enum ResourceView<'a, T> {
    /// Jamais activée
    Idle,
    /// Indicateur de chargement
    Loading,
    /// Succès mais rien à afficher
    Empty,
    /// Message d'erreur inline
    Failed(&'a FetchError),
    /// Contenu
    Ready(&'a T),
}

// ============================================================================
// Structure : Resource
// ============================================================================

/// État de récupération d'une ressource, paramétré par une clé de dépendance
#[derive(Debug, Clone)]
pub struct Resource<K, T> {
    key: Option<K>,
    generation: u64,
    status: FetchStatus,
    data: Option<T>,
    error: Option<FetchError>,
}

impl<K, T> Resource<K, T>
where
    K: Clone + PartialEq + Debug,
{
    pub fn new() -> Self {
        Self {
            key: None,
            generation: 0,
            status: FetchStatus::Idle,
            data: None,
            error: None,
        }
    }

    /// Active la ressource pour `key`
    ///
    /// Retourne un Ticket si une requête doit partir (première activation ou
    /// clé différente), None si la clé est déjà la clé courante
    pub fn request(&mut self, key: K) -> Option<Ticket<K>> {
        if self.key.as_ref() == Some(&key) && self.status != FetchStatus::Idle {
            return None;
        }
        Some(self.issue(key))
    }

    /// Force une nouvelle requête pour la clé courante (ex: après un ordre)
    pub fn reload(&mut self) -> Option<Ticket<K>> {
        let key = self.key.clone()?;
        Some(self.issue(key))
    }

    fn issue(&mut self, key: K) -> Ticket<K> {
        self.generation += 1;
        self.key = Some(key.clone());
        self.status = FetchStatus::Loading;
        self.error = None;
        debug!(?key, generation = self.generation, "Resource requested");
        Ticket {
            key,
            generation: self.generation,
        }
    }

    /// Applique une réponse si elle correspond à la dernière requête émise
    pub fn commit(&mut self, ticket: &Ticket<K>, result: Result<T, FetchError>) -> Commit {
        if ticket.generation != self.generation {
            debug!(
                key = ?ticket.key,
                generation = ticket.generation,
                latest = self.generation,
                "Discarding stale response"
            );
            return Commit::Stale;
        }

        match result {
            Ok(data) => {
                self.status = FetchStatus::Success;
                self.data = Some(data);
                self.error = None;
            }
            Err(error) => {
                self.status = FetchStatus::Error;
                self.data = None;
                self.error = Some(error);
            }
        }
        Commit::Applied
    }

    /// Remet la ressource à zéro (démontage de la vue)
    ///
    /// La génération continue d'augmenter : une réponse en vol sera jetée
    pub fn reset(&mut self) {
        self.generation += 1;
        self.key = None;
        self.status = FetchStatus::Idle;
        self.data = None;
        self.error = None;
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }
}

impl<K, T> Resource<K, T>
where
    K: Clone + PartialEq + Debug,
    T: Emptiness,
{
    /// État à dessiner
    pub fn view(&self) -> ResourceView<'_, T> {
        match self.status {
            FetchStatus::Idle => ResourceView::Idle,
            FetchStatus::Loading => ResourceView::Loading,
            FetchStatus::Error => match &self.error {
                Some(error) => ResourceView::Failed(error),
                None => ResourceView::Empty,
            },
            FetchStatus::Success => match &self.data {
                Some(data) if !data.is_empty_data() => ResourceView::Ready(data),
                _ => ResourceView::Empty,
            },
        }
    }
}

impl<K, T> Default for Resource<K, T>
where
    K: Clone + PartialEq + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Structure : ValuePublisher
// ============================================================================
// Canal latéral : une vue publie une valeur dérivée (ex: prix courant)
// vers son parent, une seule fois par nouvelle valeur
// ============================================================================

/// Publie une valeur seulement quand elle change
#[derive(Debug, Clone, Default)]
pub struct ValuePublisher<T> {
    last: Option<T>,
}

impl<T: Clone + PartialEq> ValuePublisher<T> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Retourne Some(valeur) si elle doit être transmise au parent,
    /// None si elle est identique à la dernière publiée
    pub fn publish(&mut self, value: T) -> Option<T> {
        if self.last.as_ref() == Some(&value) {
            return None;
        }
        self.last = Some(value.clone());
        Some(value)
    }

    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }

    /// Oublie la dernière valeur (changement de ticker)
    pub fn reset(&mut self) {
        self.last = None;
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    type ChartKey = (String, &'static str);

    fn key(ticker: &str, range: &'static str) -> ChartKey {
        (ticker.to_string(), range)
    }

    #[test]
    fn test_first_activation_loads() {
        let mut res: Resource<ChartKey, Vec<f64>> = Resource::new();
        assert_eq!(res.view(), ResourceView::Idle);

        let ticket = res.request(key("AAPL", "1D")).unwrap();
        assert_eq!(res.view(), ResourceView::Loading);

        assert_eq!(res.commit(&ticket, Ok(vec![1.0, 2.0])), Commit::Applied);
        assert_eq!(res.view(), ResourceView::Ready(&vec![1.0, 2.0]));
    }

    #[test]
    fn test_same_key_does_not_refetch() {
        let mut res: Resource<ChartKey, Vec<f64>> = Resource::new();
        assert!(res.request(key("AAPL", "1D")).is_some());
        assert!(res.request(key("AAPL", "1D")).is_none());
        assert!(res.request(key("AAPL", "1W")).is_some());
    }

    #[test]
    fn test_last_key_wins_when_first_resolves_last() {
        let mut res: Resource<ChartKey, Vec<f64>> = Resource::new();

        let k1 = res.request(key("AAPL", "1D")).unwrap();
        let k2 = res.request(key("AAPL", "1W")).unwrap();

        // K2 arrive d'abord
        assert_eq!(res.commit(&k2, Ok(vec![7.0])), Commit::Applied);
        // K1 arrive ensuite : jeté
        assert_eq!(res.commit(&k1, Ok(vec![1.0])), Commit::Stale);

        assert_eq!(res.data(), Some(&vec![7.0]));
        assert_eq!(res.key(), Some(&key("AAPL", "1W")));
    }

    #[test]
    fn test_stale_response_does_not_touch_in_flight_state() {
        let mut res: Resource<ChartKey, Vec<f64>> = Resource::new();

        let k1 = res.request(key("AAPL", "1D")).unwrap();
        let _k2 = res.request(key("MSFT", "1D")).unwrap();

        let stale = Err(FetchError::Transport("timeout".into()));
        assert_eq!(res.commit(&k1, stale), Commit::Stale);

        // K2 toujours en vol, pas d'erreur affichée
        assert_eq!(res.view(), ResourceView::Loading);
        assert!(res.error().is_none());
    }

    #[test]
    fn test_error_and_empty_views() {
        let mut res: Resource<String, Vec<f64>> = Resource::new();

        let t = res.request("AAPL".to_string()).unwrap();
        res.commit(&t, Err(FetchError::from_response(500, "boom")));
        assert!(matches!(res.view(), ResourceView::Failed(e) if e.to_string() == "boom"));

        let t = res.reload().unwrap();
        res.commit(&t, Ok(vec![]));
        assert_eq!(res.view(), ResourceView::Empty);
    }

    #[test]
    fn test_reset_discards_in_flight() {
        let mut res: Resource<String, Vec<f64>> = Resource::new();
        let t = res.request("AAPL".to_string()).unwrap();

        res.reset();
        assert_eq!(res.commit(&t, Ok(vec![1.0])), Commit::Stale);
        assert_eq!(res.view(), ResourceView::Idle);

        // Réactivation avec la même clé : nouvelle requête
        assert!(res.request("AAPL".to_string()).is_some());
    }

    #[test]
    fn test_reload_without_key() {
        let mut res: Resource<String, Vec<f64>> = Resource::new();
        assert!(res.reload().is_none());
    }

    #[test]
    fn test_publisher_once_per_new_value() {
        let mut publisher = ValuePublisher::new();
        let mut received = Vec::new();

        for price in [150.0, 150.0, 151.5, 151.5, 150.0] {
            if let Some(p) = publisher.publish(price) {
                received.push(p);
            }
        }

        assert_eq!(received, vec![150.0, 151.5, 150.0]);
        assert_eq!(publisher.last(), Some(&150.0));
    }
}
