// ============================================================================
// Moteur de suggestions de recherche
// ============================================================================
// - L'univers des tickers est chargé une fois par montage (statique ensuite)
// - À chaque frappe : filtre insensible à la casse sur ticker OU nom,
//   8 résultats max, ordre de l'univers conservé (pas de re-classement)
// - Requête vide : aucune suggestion, panneau caché
// - Clic en dehors du widget : panneau caché
//
// CONCEPTS RUST :
// 1. Iterator chaining : filter + take + cloned + collect
// 2. Enum de retour : le choix d'une suggestion produit UN résultat
//    (navigation OU sélection), jamais les deux
// ============================================================================

use ratatui::layout::Rect;
use tracing::debug;

use crate::listeners::{ListenerHandle, ListenerKind, ListenerRegistry};
use crate::models::TickerSummary;
use crate::router::Route;

/// Nombre maximum de suggestions affichées
pub const MAX_SUGGESTIONS: usize = 8;

/// Filtre l'univers : top-N des tickers dont le symbole ou le nom contient `query`
///
/// CONCEPT RUST : Fonction pure
/// - Même entrée -> même sortie, facile à tester
pub fn filter_suggestions(universe: &[TickerSummary], query: &str) -> Vec<TickerSummary> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    universe
        .iter()
        .filter(|stock| stock.matches_lowercase(&needle))
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect()
}

/// Usage de la barre de recherche
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Barre du header : choisir un ticker ouvre sa page
    Standalone,
    /// Barre intégrée (page Trade) : le parent reçoit le ticker choisi
    Controlled,
}

/// Résultat du choix d'une suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Mode Standalone : naviguer vers la page du ticker
    Navigate(Route),
    /// Mode Controlled : ticker transmis au parent
    Selected(String),
}

/// Où est tombé un clic souris par rapport au widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchClick {
    /// Hors du widget : le panneau se ferme
    Outside,
    /// Sur l'input ou la bordure du panneau
    Inside,
    /// Sur la ligne de la suggestion `index`
    Suggestion(usize),
}

// ============================================================================
// Structure : SearchBar
// ============================================================================

/// État de la barre de recherche
#[derive(Debug)]
pub struct SearchBar {
    mode: SearchMode,
    universe: Vec<TickerSummary>,
    query: String,
    suggestions: Vec<TickerSummary>,
    visible: bool,
    highlighted: usize,
    /// Zone occupée par le widget (input + panneau) à la dernière frame
    bounds: Option<Rect>,
    /// Lignes de la liste de suggestions (une suggestion par ligne)
    rows: Option<Rect>,
    listener: Option<ListenerHandle>,
}

impl SearchBar {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            universe: Vec::new(),
            query: String::new(),
            suggestions: Vec::new(),
            visible: false,
            highlighted: 0,
            bounds: None,
            rows: None,
            listener: None,
        }
    }

    // ========================================================================
    // Montage / démontage
    // ========================================================================

    /// Abonne le widget aux clics globaux (un seul abonnement par montage)
    pub fn mount(&mut self, registry: &ListenerRegistry) {
        if self.listener.is_none() {
            self.listener = Some(registry.attach(ListenerKind::PointerDown, "search"));
        }
    }

    /// Retire l'abonnement (drop du handle)
    pub fn unmount(&mut self) {
        self.listener = None;
        self.bounds = None;
        self.rows = None;
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    // ========================================================================
    // Univers et requête
    // ========================================================================

    /// Installe l'univers des tickers (une fois par montage)
    pub fn set_universe(&mut self, universe: Vec<TickerSummary>) {
        debug!(tickers = universe.len(), "Search universe loaded");
        self.universe = universe;
        self.recompute();
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.recompute();
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.recompute();
    }

    pub fn backspace(&mut self) {
        self.query.pop();
        self.recompute();
    }

    /// Vide la requête et cache le panneau
    pub fn clear(&mut self) {
        self.query.clear();
        self.recompute();
    }

    /// Recalcul synchrone après chaque changement de requête ou d'univers
    fn recompute(&mut self) {
        self.suggestions = filter_suggestions(&self.universe, &self.query);
        self.visible = !self.query.trim().is_empty();
        self.highlighted = 0;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[TickerSummary] {
        &self.suggestions
    }

    /// Le panneau est visible et a quelque chose à montrer
    pub fn is_panel_open(&self) -> bool {
        self.visible && !self.suggestions.is_empty()
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    // ========================================================================
    // Interaction
    // ========================================================================

    /// Focus sur l'input : réaffiche le panneau si la requête n'est pas vide
    pub fn focus(&mut self) {
        if !self.query.trim().is_empty() {
            self.visible = true;
        }
    }

    /// Cache le panneau (Échap, clic dehors)
    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn select_next(&mut self) {
        if !self.suggestions.is_empty() {
            self.highlighted = (self.highlighted + 1).min(self.suggestions.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }

    /// Mémorise la zone du widget (mise à jour à chaque rendu)
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Mémorise les lignes de la liste affichée (None si panneau caché)
    pub fn set_rows(&mut self, rows: Option<Rect>) {
        self.rows = rows;
    }

    /// Clic souris en (column, row) : ferme le panneau si hors du widget
    pub fn pointer_down(&mut self, column: u16, row: u16) -> SearchClick {
        let inside = self
            .bounds
            .map(|b| rect_contains(b, column, row))
            .unwrap_or(false);

        if !inside {
            self.dismiss();
            return SearchClick::Outside;
        }

        match self.rows {
            Some(rows) if self.is_panel_open() && rect_contains(rows, column, row) => {
                let index = usize::from(row - rows.y);
                if index < self.suggestions.len() {
                    SearchClick::Suggestion(index)
                } else {
                    SearchClick::Inside
                }
            }
            _ => SearchClick::Inside,
        }
    }

    /// Choisit la suggestion `index`
    ///
    /// Vide la requête, cache le panneau, puis retourne soit une navigation
    /// (Standalone), soit le ticker choisi (Controlled)
    pub fn choose(&mut self, index: usize) -> Option<SearchOutcome> {
        let ticker = self.suggestions.get(index)?.ticker.clone();
        self.clear();
        debug!(ticker = %ticker, mode = ?self.mode, "Suggestion chosen");

        Some(match self.mode {
            SearchMode::Standalone => SearchOutcome::Navigate(Route::stock(&ticker)),
            SearchMode::Controlled => SearchOutcome::Selected(ticker),
        })
    }

    /// Choisit la suggestion surlignée (touche Entrée)
    pub fn choose_highlighted(&mut self) -> Option<SearchOutcome> {
        self.choose(self.highlighted)
    }
}

/// Vrai si (column, row) est dans `rect`
pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> Vec<TickerSummary> {
        vec![
            TickerSummary::new("AAPL", "Apple", "NASDAQ"),
            TickerSummary::new("MSFT", "Microsoft", "NASDAQ"),
        ]
    }

    fn big_universe() -> Vec<TickerSummary> {
        (0..20)
            .map(|i| TickerSummary::new(&format!("T{}", i), &format!("Company {}", i), "NYSE"))
            .collect()
    }

    #[test]
    fn test_query_app_matches_apple_only() {
        let result = filter_suggestions(&universe(), "app");
        assert_eq!(result, vec![TickerSummary::new("AAPL", "Apple", "NASDAQ")]);
    }

    #[test]
    fn test_case_insensitive_on_ticker_or_name() {
        assert_eq!(filter_suggestions(&universe(), "MsF").len(), 1);
        assert_eq!(filter_suggestions(&universe(), "micro")[0].ticker, "MSFT");
    }

    #[test]
    fn test_cap_and_source_order() {
        let result = filter_suggestions(&big_universe(), "company");

        assert_eq!(result.len(), MAX_SUGGESTIONS);
        let tickers: Vec<&str> = result.iter().map(|t| t.ticker.as_str()).collect();
        assert_eq!(tickers, ["T0", "T1", "T2", "T3", "T4", "T5", "T6", "T7"]);
    }

    #[test]
    fn test_every_suggestion_matches_for_any_query() {
        let universe = big_universe();
        for query in ["t", "1", "COMP", "any 1", "y 1", "zzz", "T19"] {
            let needle = query.to_lowercase();
            let result = filter_suggestions(&universe, query);
            assert!(result.len() <= MAX_SUGGESTIONS);
            assert!(result.iter().all(|s| s.matches_lowercase(&needle)), "query {query}");
        }
    }

    #[test]
    fn test_empty_query_hides_panel() {
        let mut bar = SearchBar::new(SearchMode::Standalone);
        bar.set_universe(universe());

        bar.set_query("a");
        assert!(bar.is_panel_open());

        bar.set_query("   ");
        assert!(bar.suggestions().is_empty());
        assert!(!bar.is_panel_open());
    }

    #[test]
    fn test_universe_arriving_after_typing_recomputes() {
        let mut bar = SearchBar::new(SearchMode::Standalone);
        bar.set_query("app");
        assert!(bar.suggestions().is_empty());

        bar.set_universe(universe());
        assert_eq!(bar.suggestions().len(), 1);
    }

    #[test]
    fn test_standalone_choice_navigates() {
        let mut bar = SearchBar::new(SearchMode::Standalone);
        bar.set_universe(universe());
        bar.set_query("app");

        let outcome = bar.choose(0);
        assert_eq!(outcome, Some(SearchOutcome::Navigate(Route::stock("AAPL"))));
        assert_eq!(bar.query(), "");
        assert!(!bar.is_panel_open());
    }

    #[test]
    fn test_controlled_choice_selects() {
        let mut bar = SearchBar::new(SearchMode::Controlled);
        bar.set_universe(universe());
        bar.set_query("soft");
        bar.select_next();

        assert_eq!(bar.choose_highlighted(), Some(SearchOutcome::Selected("MSFT".to_string())));
        assert!(bar.choose(0).is_none());
    }

    #[test]
    fn test_click_outside_dismisses_and_focus_reopens() {
        let mut bar = SearchBar::new(SearchMode::Standalone);
        bar.set_universe(universe());
        bar.set_bounds(Rect::new(10, 0, 30, 5));
        bar.set_query("a");

        assert_eq!(bar.pointer_down(12, 2), SearchClick::Inside);
        assert!(bar.is_panel_open());

        assert_eq!(bar.pointer_down(50, 2), SearchClick::Outside);
        assert!(!bar.is_panel_open());

        bar.focus();
        assert!(bar.is_panel_open());
    }

    #[test]
    fn test_click_on_row_reports_suggestion() {
        let mut bar = SearchBar::new(SearchMode::Standalone);
        bar.set_universe(vec![
            TickerSummary::new("AAPL", "Apple", "NASDAQ"),
            TickerSummary::new("AMZN", "Amazon", "NASDAQ"),
        ]);
        bar.set_query("a");
        bar.set_bounds(Rect::new(0, 0, 40, 8));
        bar.set_rows(Some(Rect::new(1, 4, 38, 3)));

        assert_eq!(bar.pointer_down(5, 4), SearchClick::Suggestion(0));
        assert_eq!(bar.pointer_down(5, 5), SearchClick::Suggestion(1));
        assert_eq!(bar.pointer_down(5, 6), SearchClick::Inside);
        assert_eq!(bar.pointer_down(5, 1), SearchClick::Inside);
        assert_eq!(bar.pointer_down(0, 4), SearchClick::Inside);

        bar.dismiss();
        assert_eq!(bar.pointer_down(5, 4), SearchClick::Inside);
    }

    #[test]
    fn test_single_listener_per_mount() {
        let registry = ListenerRegistry::new();
        let mut bar = SearchBar::new(SearchMode::Standalone);

        bar.mount(&registry);
        bar.mount(&registry);
        assert_eq!(registry.count(ListenerKind::PointerDown), 1);

        bar.unmount();
        assert_eq!(registry.count(ListenerKind::PointerDown), 0);
        assert!(!bar.is_listening());
    }

    #[test]
    fn test_highlight_bounds() {
        let mut bar = SearchBar::new(SearchMode::Standalone);
        bar.set_universe(big_universe());
        bar.set_query("t");

        for _ in 0..20 {
            bar.select_next();
        }
        assert_eq!(bar.highlighted(), MAX_SUGGESTIONS - 1);

        bar.select_previous();
        assert_eq!(bar.highlighted(), MAX_SUGGESTIONS - 2);
    }
}
