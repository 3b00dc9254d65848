// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Outbox : App ne connaît pas le worker, elle accumule des AppCommand
//    que la boucle principale envoie (testable sans thread ni channel)
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - sync() applique la garde de navigation et monte/démonte les pages
// ============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::fetch::{Commit, Holdings, Resource, Sp500, TickerUniverse, ValuePublisher};
use crate::listeners::ListenerRegistry;
use crate::models::{
    CompanyProfile, Credentials, PerformanceSeries, PriceSeries, QuoteSummary, Registration,
    StockStats, TimeRange, TradeOrder,
};
use crate::router::{Navigator, Resolved, Route};
use crate::search::{SearchBar, SearchClick, SearchMode, SearchOutcome};
use crate::session::SessionStore;
use crate::treemap::{LayoutOptions, SectorTreemap};
use crate::worker::{AppCommand, AppResult, Panel, PriceKey};

/// Délai avant la redirection vers le login après une inscription réussie
pub const REGISTER_REDIRECT_DELAY: Duration = Duration::from_secs(2);

// ============================================================================
// Enum : Focus
// ============================================================================
// CONCEPT : Modal input (Vim-like)
// - Focus::None : les touches sont des commandes (q, /, h, l...)
// - Sinon : les caractères vont dans le champ qui a le focus
// ============================================================================

/// Élément qui reçoit la saisie clavier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    None,
    HeaderSearch,
    TradeSearch,
    /// Formulaire de la page courante (login, inscription, quantité)
    Form,
}

/// Colonne affichée par le tableau des positions en mode étroit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionColumn {
    #[default]
    AllTimeReturn,
    TotalValue,
    TodayPrice,
}

impl PositionColumn {
    pub fn next(&self) -> Self {
        match self {
            PositionColumn::AllTimeReturn => PositionColumn::TotalValue,
            PositionColumn::TotalValue => PositionColumn::TodayPrice,
            PositionColumn::TodayPrice => PositionColumn::AllTimeReturn,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PositionColumn::AllTimeReturn => "All Time Return",
            PositionColumn::TotalValue => "Total Value",
            PositionColumn::TodayPrice => "Today Price",
        }
    }
}

// ============================================================================
// Formulaires
// ============================================================================

/// Un champ texte
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    /// Masqué à l'affichage (mot de passe)
    pub secret: bool,
}

/// Formulaire : champs + message d'erreur/succès inline
#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<FormField>,
    pub selected: usize,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub submitting: bool,
}

impl Form {
    fn new(fields: &[(&'static str, bool)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|&(label, secret)| FormField {
                    label,
                    value: String::new(),
                    secret,
                })
                .collect(),
            selected: 0,
            error: None,
            notice: None,
            submitting: false,
        }
    }

    pub fn login() -> Self {
        Self::new(&[("Email", false), ("Password", true)])
    }

    pub fn register() -> Self {
        Self::new(&[
            ("First Name", false),
            ("Last Name", false),
            ("Email", false),
            ("Password", true),
        ])
    }

    pub fn quantity() -> Self {
        Self::new(&[("Quantity", false)])
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.selected) {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.selected) {
            field.value.pop();
        }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.selected = (self.selected + 1) % self.fields.len();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.selected = (self.selected + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Vide les champs et les messages (remontage de la page)
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
        self.selected = 0;
        self.error = None;
        self.notice = None;
        self.submitting = false;
    }
}

// ============================================================================
// Panneau de cotation (graphique + résumé), partagé par Stock et Trade
// ============================================================================

/// Graphique de prix + résumé rapide d'un ticker
#[derive(Debug)]
pub struct StockPanel {
    panel: Panel,
    pub ticker: Option<String>,
    pub range: TimeRange,
    pub prices: Resource<PriceKey, PriceSeries>,
    pub summary: Resource<String, QuoteSummary>,
}

impl StockPanel {
    fn new(panel: Panel) -> Self {
        Self {
            panel,
            ticker: None,
            range: TimeRange::default(),
            prices: Resource::new(),
            summary: Resource::new(),
        }
    }

    fn mount(&mut self, ticker: &str, outbox: &mut Vec<AppCommand>) {
        self.ticker = Some(ticker.to_string());
        self.request_prices(outbox);
        if let Some(ticket) = self.summary.request(ticker.to_string()) {
            outbox.push(AppCommand::LoadSummary { panel: self.panel, ticket });
        }
    }

    fn request_prices(&mut self, outbox: &mut Vec<AppCommand>) {
        if let Some(ticker) = &self.ticker {
            if let Some(ticket) = self.prices.request((ticker.clone(), self.range)) {
                outbox.push(AppCommand::LoadPrices { panel: self.panel, ticket });
            }
        }
    }

    /// Change la plage : nouvelle clé, donc nouvelle requête
    fn set_range(&mut self, range: TimeRange, outbox: &mut Vec<AppCommand>) {
        self.range = range;
        self.request_prices(outbox);
    }

    fn unmount(&mut self) {
        self.ticker = None;
        self.range = TimeRange::default();
        self.prices.reset();
        self.summary.reset();
    }
}

/// État de la page Trade
#[derive(Debug)]
pub struct TradeState {
    pub search: SearchBar,
    pub panel: StockPanel,
    pub form: Form,
    /// Prix publié par le résumé rapide (une fois par nouvelle valeur)
    pub current_price: Option<f64>,
    publisher: ValuePublisher<f64>,
}

impl TradeState {
    fn new() -> Self {
        Self {
            search: SearchBar::new(SearchMode::Controlled),
            panel: StockPanel::new(Panel::Trade),
            form: Form::quantity(),
            current_price: None,
            publisher: ValuePublisher::new(),
        }
    }

    pub fn selected_ticker(&self) -> Option<&str> {
        self.panel.ticker.as_deref()
    }

    fn unmount(&mut self) {
        self.search.unmount();
        self.search.clear();
        self.panel.unmount();
        self.form.reset();
        self.current_price = None;
        self.publisher.reset();
    }
}

// ============================================================================
// Structure : App
// ============================================================================

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' -> confirmation
    pub confirm_quit: bool,

    pub session: Arc<SessionStore>,
    pub navigator: Navigator,
    pub listeners: ListenerRegistry,

    /// Ce qui est affiché (résultat de la garde à la dernière synchro)
    pub page: Resolved,
    mounted: Option<Route>,
    pub focus: Focus,

    // === Header ===
    pub search: SearchBar,
    pub tickers: Resource<(), TickerUniverse>,

    // === Home ===
    pub sp500: Resource<(), Sp500>,
    pub treemap: SectorTreemap,

    // === Stock ===
    pub stock: StockPanel,
    pub about: Resource<String, CompanyProfile>,
    pub stats: Resource<String, StockStats>,

    // === Portfolio ===
    pub holdings: Resource<(), Holdings>,
    pub performance: Resource<TimeRange, PerformanceSeries>,
    pub performance_range: TimeRange,
    pub position_column: PositionColumn,

    // === Trade ===
    pub trade: TradeState,

    // === Auth ===
    pub login: Form,
    pub register: Form,
    register_redirect: Option<Instant>,

    /// Commandes à envoyer au worker
    outbox: Vec<AppCommand>,
}

impl App {
    /// Crée l'application et monte le header (recherche + univers des tickers)
    pub fn new(session: Arc<SessionStore>) -> Self {
        let listeners = ListenerRegistry::new();
        let mut search = SearchBar::new(SearchMode::Standalone);
        search.mount(&listeners);

        let mut app = Self {
            running: true,
            confirm_quit: false,
            session,
            navigator: Navigator::default(),
            listeners,
            page: Resolved::Loading,
            mounted: None,
            focus: Focus::None,
            search,
            tickers: Resource::new(),
            sp500: Resource::new(),
            treemap: SectorTreemap::new(LayoutOptions::cells()),
            stock: StockPanel::new(Panel::Stock),
            about: Resource::new(),
            stats: Resource::new(),
            holdings: Resource::new(),
            performance: Resource::new(),
            performance_range: TimeRange::default(),
            position_column: PositionColumn::default(),
            trade: TradeState::new(),
            login: Form::login(),
            register: Form::register(),
            register_redirect: None,
            outbox: Vec::new(),
        };

        if let Some(ticket) = app.tickers.request(()) {
            app.outbox.push(AppCommand::LoadTickers { ticket });
        }
        app.sync();
        app
    }

    /// Vide l'outbox (appelé par la boucle principale)
    pub fn take_commands(&mut self) -> Vec<AppCommand> {
        std::mem::take(&mut self.outbox)
    }

    // ========================================================================
    // Navigation et montage des pages
    // ========================================================================

    /// Réévalue la garde et monte la page résolue si elle a changé
    ///
    /// Appelé après chaque événement, chaque résultat et chaque tick :
    /// une déconnexion sur une page protégée redirige immédiatement
    pub fn sync(&mut self) {
        let session = self.session.snapshot();
        let resolved = self.navigator.resolve(&session);

        let target = match &resolved {
            Resolved::Page(route) => Some(route.clone()),
            Resolved::Loading => None,
        };

        if target != self.mounted {
            if let Some(old) = self.mounted.take() {
                self.unmount(&old);
            }
            if let Some(route) = &target {
                self.mount(route);
            }
            self.mounted = target;
        }

        self.page = resolved;
    }

    fn mount(&mut self, route: &Route) {
        debug!(route = %route.path(), "Mount page");
        match route {
            Route::Home => {
                self.treemap.mount(&self.listeners);
                if let Some(ticket) = self.sp500.request(()) {
                    self.outbox.push(AppCommand::LoadSp500 { ticket });
                }
            }
            Route::Stock { ticker } => {
                self.stock.mount(ticker, &mut self.outbox);
                if let Some(ticket) = self.about.request(ticker.clone()) {
                    self.outbox.push(AppCommand::LoadAbout { ticket });
                }
                if let Some(ticket) = self.stats.request(ticker.clone()) {
                    self.outbox.push(AppCommand::LoadStats { ticket });
                }
            }
            Route::Login => {
                self.login.reset();
                self.focus = Focus::Form;
            }
            Route::Register => {
                self.register.reset();
                self.register_redirect = None;
                self.focus = Focus::Form;
            }
            Route::Portfolio => {
                if let Some(ticket) = self.holdings.request(()) {
                    self.outbox.push(AppCommand::LoadHoldings { ticket });
                }
                if let Some(ticket) = self.performance.request(self.performance_range) {
                    self.outbox.push(AppCommand::LoadPerformance { ticket });
                }
            }
            Route::Trade => {
                self.trade.search.mount(&self.listeners);
                if let Some(universe) = self.tickers.data() {
                    self.trade.search.set_universe(universe.clone());
                }
                self.focus = Focus::TradeSearch;
            }
        }
    }

    fn unmount(&mut self, route: &Route) {
        debug!(route = %route.path(), "Unmount page");
        match route {
            Route::Home => {
                self.treemap.unmount();
                self.sp500.reset();
            }
            Route::Stock { .. } => {
                self.stock.unmount();
                self.about.reset();
                self.stats.reset();
            }
            Route::Login => self.login.reset(),
            Route::Register => {
                self.register.reset();
                self.register_redirect = None;
            }
            Route::Portfolio => {
                self.holdings.reset();
                self.performance.reset();
                self.performance_range = TimeRange::default();
            }
            Route::Trade => self.trade.unmount(),
        }

        if matches!(self.focus, Focus::Form | Focus::TradeSearch) {
            self.focus = Focus::None;
        }
    }

    /// Route montée actuellement
    pub fn current_page(&self) -> Option<&Route> {
        self.mounted.as_ref()
    }

    pub fn is_on(&self, route: &Route) -> bool {
        self.mounted.as_ref() == Some(route)
    }

    fn is_on_stock(&self) -> bool {
        matches!(self.mounted, Some(Route::Stock { .. }))
    }

    /// Navigue vers une route
    pub fn go(&mut self, route: Route) {
        self.navigator.push(route);
        self.sync();
    }

    /// Retour arrière dans l'historique
    pub fn back(&mut self) {
        if self.navigator.back() {
            self.sync();
        }
    }

    /// Header : déconnexion si connecté, page de login sinon
    pub fn toggle_auth(&mut self) {
        if self.session.is_authenticated() {
            self.logout();
        } else {
            self.go(Route::Login);
        }
    }

    pub fn logout(&mut self) {
        info!("User requested logout");
        self.session.logout();
        self.go(Route::Home);
    }

    // ========================================================================
    // Saisie clavier
    // ========================================================================

    /// Donne le focus à la recherche du header
    pub fn focus_search(&mut self) {
        self.focus = Focus::HeaderSearch;
        self.search.focus();
    }

    /// Entrée sans focus : reprend la saisie sur les pages à formulaire
    pub fn resume_editing(&mut self) {
        match self.mounted {
            Some(Route::Login) | Some(Route::Register) => self.focus = Focus::Form,
            Some(Route::Trade) if self.trade.panel.ticker.is_some() => self.focus = Focus::Form,
            Some(Route::Trade) => {
                self.focus = Focus::TradeSearch;
                self.trade.search.focus();
            }
            _ => {}
        }
    }

    /// Tab : champ suivant, ou bascule recherche <-> quantité sur Trade
    pub fn next_field(&mut self) {
        match self.focus {
            Focus::Form if self.is_on(&Route::Trade) => {
                self.focus = Focus::TradeSearch;
                self.trade.search.focus();
            }
            Focus::TradeSearch => {
                self.trade.search.dismiss();
                self.focus = Focus::Form;
            }
            Focus::Form => {
                if let Some(form) = self.active_form() {
                    form.next_field();
                }
            }
            Focus::None if self.is_on(&Route::Portfolio) => {
                self.position_column = self.position_column.next();
            }
            _ => {}
        }
    }

    pub fn type_char(&mut self, c: char) {
        match self.focus {
            Focus::HeaderSearch => self.search.push_char(c),
            Focus::TradeSearch => self.trade.search.push_char(c),
            Focus::Form => {
                if let Some(form) = self.active_form() {
                    form.push_char(c);
                }
            }
            Focus::None => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Focus::HeaderSearch => self.search.backspace(),
            Focus::TradeSearch => self.trade.search.backspace(),
            Focus::Form => {
                if let Some(form) = self.active_form() {
                    form.backspace();
                }
            }
            Focus::None => {}
        }
    }

    /// Flèche haut : suggestion précédente ou champ précédent
    pub fn up(&mut self) {
        match self.focus {
            Focus::HeaderSearch => self.search.select_previous(),
            Focus::TradeSearch => self.trade.search.select_previous(),
            Focus::Form => {
                if let Some(form) = self.active_form() {
                    form.previous_field();
                }
            }
            Focus::None => {}
        }
    }

    pub fn down(&mut self) {
        match self.focus {
            Focus::HeaderSearch => self.search.select_next(),
            Focus::TradeSearch => self.trade.search.select_next(),
            Focus::Form => {
                if let Some(form) = self.active_form() {
                    form.next_field();
                }
            }
            Focus::None => {}
        }
    }

    /// Échap : quitte le champ, ou retour arrière si rien n'a le focus
    pub fn escape(&mut self) {
        match self.focus {
            Focus::HeaderSearch => {
                self.search.dismiss();
                self.focus = Focus::None;
            }
            Focus::TradeSearch => {
                self.trade.search.dismiss();
                self.focus = Focus::None;
            }
            Focus::Form => self.focus = Focus::None,
            Focus::None => self.back(),
        }
    }

    /// Entrée : choisit la suggestion ou soumet le formulaire
    pub fn enter(&mut self) {
        match self.focus {
            Focus::HeaderSearch => {
                if let Some(outcome) = self.search.choose_highlighted() {
                    self.focus = Focus::None;
                    self.apply_search(outcome);
                }
            }
            Focus::TradeSearch => {
                if let Some(outcome) = self.trade.search.choose_highlighted() {
                    self.apply_search(outcome);
                }
            }
            Focus::Form => match self.mounted {
                Some(Route::Login) => self.submit_login(),
                Some(Route::Register) => self.submit_register(),
                Some(Route::Trade) => self.submit_trade(),
                _ => {}
            },
            Focus::None => {}
        }
    }

    fn active_form(&mut self) -> Option<&mut Form> {
        match self.mounted {
            Some(Route::Login) => Some(&mut self.login),
            Some(Route::Register) => Some(&mut self.register),
            Some(Route::Trade) => Some(&mut self.trade.form),
            _ => None,
        }
    }

    fn apply_search(&mut self, outcome: SearchOutcome) {
        match outcome {
            SearchOutcome::Navigate(route) => self.go(route),
            SearchOutcome::Selected(ticker) => self.select_trade_ticker(&ticker),
        }
    }

    /// Page Trade : un nouveau ticker remonte le panneau de cotation
    pub fn select_trade_ticker(&mut self, ticker: &str) {
        info!(ticker, "Ticker selected for trade");
        self.trade.panel.unmount();
        self.trade.panel.mount(ticker, &mut self.outbox);
        self.trade.current_price = None;
        self.trade.publisher.reset();
        self.trade.form.error = None;
        self.focus = Focus::Form;
    }

    /// h / l : plage précédente / suivante du graphique affiché
    pub fn shift_range(&mut self, forward: bool) {
        if self.is_on_stock() {
            let range = step(self.stock.range, TimeRange::STOCK, forward);
            self.stock.set_range(range, &mut self.outbox);
        } else if self.is_on(&Route::Trade) && self.trade.panel.ticker.is_some() {
            let range = step(self.trade.panel.range, TimeRange::STOCK, forward);
            self.trade.panel.set_range(range, &mut self.outbox);
        } else if self.is_on(&Route::Portfolio) {
            self.performance_range = step(self.performance_range, TimeRange::PORTFOLIO, forward);
            if let Some(ticket) = self.performance.request(self.performance_range) {
                self.outbox.push(AppCommand::LoadPerformance { ticket });
            }
        }
    }

    // ========================================================================
    // Souris et redimensionnement
    // ========================================================================

    /// Clic : choisit la suggestion cliquée, ferme les panneaux de
    /// suggestions si clic dehors, ouvre la page d'une case de la treemap
    pub fn pointer_down(&mut self, column: u16, row: u16) {
        if self.search.is_listening() {
            match self.search.pointer_down(column, row) {
                SearchClick::Suggestion(index) => {
                    self.focus = Focus::None;
                    if let Some(outcome) = self.search.choose(index) {
                        self.apply_search(outcome);
                    }
                    return;
                }
                SearchClick::Inside => {
                    self.focus_search();
                    return;
                }
                SearchClick::Outside => {}
            }
        }
        if self.focus == Focus::HeaderSearch {
            self.focus = Focus::None;
        }

        if self.trade.search.is_listening() {
            match self.trade.search.pointer_down(column, row) {
                SearchClick::Suggestion(index) => {
                    if let Some(outcome) = self.trade.search.choose(index) {
                        self.apply_search(outcome);
                    }
                    return;
                }
                SearchClick::Inside => {
                    self.focus = Focus::TradeSearch;
                    self.trade.search.focus();
                    return;
                }
                SearchClick::Outside => {}
            }
        }

        if self.is_on(&Route::Home) {
            if let Some(route) = self.treemap.click(column, row) {
                self.go(route);
            }
        }
    }

    pub fn pointer_moved(&mut self, column: u16, row: u16) {
        if self.is_on(&Route::Home) {
            self.treemap.hover(column, row);
        }
    }

    pub fn resized(&mut self) {
        if self.treemap.is_listening() {
            self.treemap.resized();
        }
    }

    // ========================================================================
    // Formulaires
    // ========================================================================

    pub fn submit_login(&mut self) {
        if self.login.submitting {
            return;
        }
        let email = self.login.value(0).trim().to_string();
        let password = self.login.value(1).to_string();
        if email.is_empty() || password.is_empty() {
            self.login.error = Some("Email and password are required".to_string());
            return;
        }

        self.login.error = None;
        self.login.submitting = true;
        self.outbox.push(AppCommand::Login {
            credentials: Credentials { email, password },
        });
    }

    pub fn submit_register(&mut self) {
        if self.register.submitting || self.register_redirect.is_some() {
            return;
        }
        let registration = Registration {
            first_name: self.register.value(0).trim().to_string(),
            last_name: self.register.value(1).trim().to_string(),
            email: self.register.value(2).trim().to_string(),
            password: self.register.value(3).to_string(),
        };
        if registration.email.is_empty() || registration.password.is_empty() {
            self.register.error = Some("Email and password are required".to_string());
            return;
        }

        self.register.error = None;
        self.register.notice = None;
        self.register.submitting = true;
        self.outbox.push(AppCommand::Register { registration });
    }

    pub fn submit_trade(&mut self) {
        if self.trade.form.submitting {
            return;
        }
        let Some(ticker) = self.trade.selected_ticker().map(str::to_string) else {
            self.trade.form.error = Some("Select a stock first".to_string());
            return;
        };
        let shares = match self.trade.form.value(0).trim().parse::<f64>() {
            Ok(shares) if shares > 0.0 && shares.is_finite() => shares,
            _ => {
                self.trade.form.error = Some("Enter a valid quantity".to_string());
                return;
            }
        };
        let Some(price) = self.trade.current_price else {
            self.trade.form.error = Some("Price not available yet".to_string());
            return;
        };

        self.trade.form.error = None;
        self.trade.form.submitting = true;
        let order = TradeOrder::new(&ticker, shares, price);
        info!(ticker = %order.ticker, shares, price, "Submitting trade");
        self.outbox.push(AppCommand::SubmitTrade { order });
    }

    // ========================================================================
    // Résultats du worker
    // ========================================================================

    /// Applique un résultat du worker
    ///
    /// CONCEPT : Last key wins
    /// - Chaque Resource compare la génération du ticket à la sienne
    /// - Une réponse dépassée est ignorée sans effet visible
    pub fn apply(&mut self, result: AppResult) {
        match result {
            AppResult::Tickers { ticket, result } => {
                if let Err(e) = &result {
                    warn!(error = %e, "Failed to load the ticker universe");
                }
                if self.tickers.commit(&ticket, result) == Commit::Applied {
                    if let Some(universe) = self.tickers.data() {
                        self.search.set_universe(universe.clone());
                        if self.trade.search.is_listening() {
                            self.trade.search.set_universe(universe.clone());
                        }
                    }
                }
            }
            AppResult::Sp500 { ticket, result } => {
                if self.sp500.commit(&ticket, result) == Commit::Applied {
                    if let Some(companies) = self.sp500.data() {
                        self.treemap.set_data(companies);
                    }
                }
            }
            AppResult::Summary { panel, ticket, result } => {
                let target = self.panel_mut(panel);
                if target.summary.commit(&ticket, result) == Commit::Applied && panel == Panel::Trade {
                    self.publish_trade_price();
                }
            }
            AppResult::Prices { panel, ticket, result } => {
                self.panel_mut(panel).prices.commit(&ticket, result);
            }
            AppResult::About { ticket, result } => {
                self.about.commit(&ticket, result);
            }
            AppResult::Stats { ticket, result } => {
                self.stats.commit(&ticket, result);
            }
            AppResult::Holdings { ticket, result } => {
                self.holdings.commit(&ticket, result);
            }
            AppResult::Performance { ticket, result } => {
                self.performance.commit(&ticket, result);
            }
            AppResult::LoggedIn(result) => self.on_logged_in(result),
            AppResult::Registered(result) => self.on_registered(result),
            AppResult::TradeSubmitted(result) => self.on_trade_submitted(result),
        }
        self.sync();
    }

    fn panel_mut(&mut self, panel: Panel) -> &mut StockPanel {
        match panel {
            Panel::Stock => &mut self.stock,
            Panel::Trade => &mut self.trade.panel,
        }
    }

    /// Le résumé rapide publie le prix courant vers le formulaire d'ordre
    fn publish_trade_price(&mut self) {
        let price = self.trade.panel.summary.data().and_then(QuoteSummary::price);
        if let Some(price) = price {
            if let Some(published) = self.trade.publisher.publish(price) {
                debug!(price = published, "Trade price published");
                self.trade.current_price = Some(published);
            }
        }
    }

    fn on_logged_in(&mut self, result: Result<String, crate::error::FetchError>) {
        if !self.login.submitting {
            debug!("Ignoring login response for an unmounted form");
            return;
        }
        self.login.submitting = false;

        match result {
            Ok(token) => {
                self.session.login(&token);
                self.focus = Focus::None;
                self.navigator.push(Route::Portfolio);
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.login.error = Some(message_or(&e, "Login failed"));
            }
        }
    }

    fn on_registered(&mut self, result: Result<(), crate::error::FetchError>) {
        if !self.register.submitting {
            return;
        }
        self.register.submitting = false;

        match result {
            Ok(()) => {
                self.register.notice =
                    Some("Registration successful. Redirecting to login ...".to_string());
                self.register_redirect = Some(Instant::now() + REGISTER_REDIRECT_DELAY);
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.register.error = Some(message_or(&e, "Registration failed"));
            }
        }
    }

    fn on_trade_submitted(
        &mut self,
        result: Result<Option<crate::models::HoldingReceipt>, crate::error::FetchError>,
    ) {
        if !self.trade.form.submitting {
            debug!("Ignoring trade response, no order pending");
            return;
        }
        self.trade.form.submitting = false;

        match result {
            Ok(receipt) => {
                info!(?receipt, "Trade completed");
                self.navigator.push(Route::Portfolio);
                // Portfolio déjà monté : on force le rechargement des positions
                if self.is_on(&Route::Portfolio) {
                    if let Some(ticket) = self.holdings.reload() {
                        self.outbox.push(AppCommand::LoadHoldings { ticket });
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Trade failed");
                self.trade.form.error = Some(message_or(&e, "Trade failed"));
            }
        }
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    /// Tick : appelé à chaque itération de la boucle
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Tick avec une horloge explicite (tests)
    pub fn tick_at(&mut self, now: Instant) {
        if let Some(deadline) = self.register_redirect {
            if now >= deadline {
                self.register_redirect = None;
                if self.is_on(&Route::Register) {
                    self.navigator.push(Route::Login);
                }
            }
        }
        self.sync();
    }

    /// Vrai si une requête est en cours (indicateur du header)
    pub fn is_busy(&self) -> bool {
        self.tickers.is_loading()
            || self.sp500.is_loading()
            || self.stock.prices.is_loading()
            || self.stock.summary.is_loading()
            || self.about.is_loading()
            || self.stats.is_loading()
            || self.holdings.is_loading()
            || self.performance.is_loading()
            || self.trade.panel.prices.is_loading()
            || self.trade.panel.summary.is_loading()
            || self.login.submitting
            || self.register.submitting
            || self.trade.form.submitting
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Two-step quit pattern
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression : quit réel
    /// - N'importe quelle autre touche : annulation
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

/// Plage voisine dans la liste proposée
fn step(range: TimeRange, choices: &[TimeRange], forward: bool) -> TimeRange {
    if forward {
        range.next_in(choices)
    } else {
        range.previous_in(choices)
    }
}

/// Message du serveur, ou message générique s'il est vide
fn message_or(error: &crate::error::FetchError, fallback: &str) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::listeners::ListenerKind;
    use crate::models::{Metric, TickerSummary};
    use crate::session::MemoryTokenStorage;

    fn app_with(token: Option<&str>) -> App {
        let storage = match token {
            Some(t) => MemoryTokenStorage::with_token(t),
            None => MemoryTokenStorage::new(),
        };
        let session = Arc::new(SessionStore::new(storage));
        session.initialize();
        App::new(session)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.type_char(c);
        }
    }

    fn universe() -> Vec<TickerSummary> {
        vec![
            TickerSummary::new("AAPL", "Apple", "NASDAQ"),
            TickerSummary::new("MSFT", "Microsoft", "NASDAQ"),
        ]
    }

    /// Applique la réponse du chargement de l'univers
    fn load_universe(app: &mut App) {
        let commands = app.take_commands();
        let ticket = commands
            .into_iter()
            .find_map(|c| match c {
                AppCommand::LoadTickers { ticket } => Some(ticket),
                _ => None,
            })
            .expect("tickers requested at startup");
        app.apply(AppResult::Tickers { ticket, result: Ok(universe()) });
    }

    fn count<F: Fn(&AppCommand) -> bool>(commands: &[AppCommand], f: F) -> usize {
        commands.iter().filter(|c| f(c)).count()
    }

    #[test]
    fn test_startup_requests_universe_and_treemap() {
        let mut app = app_with(None);
        let commands = app.take_commands();

        assert_eq!(app.page, Resolved::Page(Route::Home));
        assert_eq!(count(&commands, |c| matches!(c, AppCommand::LoadTickers { .. })), 1);
        assert_eq!(count(&commands, |c| matches!(c, AppCommand::LoadSp500 { .. })), 1);
    }

    #[test]
    fn test_guard_pending_shows_loading() {
        let session = Arc::new(SessionStore::new(MemoryTokenStorage::with_token("t")));
        let mut app = App::new(Arc::clone(&session));
        app.go(Route::Portfolio);

        assert_eq!(app.page, Resolved::Loading);
        assert!(app.current_page().is_none());

        session.initialize();
        app.sync();
        assert_eq!(app.page, Resolved::Page(Route::Portfolio));
    }

    #[test]
    fn test_guard_redirects_and_back_skips_guarded_route() {
        let mut app = app_with(None);
        app.go(Route::stock("AAPL"));
        app.go(Route::Portfolio);

        assert_eq!(app.page, Resolved::Page(Route::Login));
        app.escape(); // quitte le formulaire
        app.escape(); // retour arrière
        assert_eq!(app.page, Resolved::Page(Route::stock("AAPL")));
    }

    #[test]
    fn test_logout_on_guarded_page() {
        let mut app = app_with(Some("t"));
        app.go(Route::Portfolio);
        assert!(app.is_on(&Route::Portfolio));

        app.toggle_auth();
        assert!(!app.session.is_authenticated());
        assert_eq!(app.page, Resolved::Page(Route::Home));
    }

    #[test]
    fn test_header_search_navigates_to_stock() {
        let mut app = app_with(None);
        load_universe(&mut app);

        app.focus_search();
        type_text(&mut app, "app");
        assert_eq!(app.search.suggestions().len(), 1);

        app.enter();
        assert_eq!(app.page, Resolved::Page(Route::stock("AAPL")));
        assert_eq!(app.search.query(), "");

        let commands = app.take_commands();
        assert_eq!(count(&commands, |c| matches!(c, AppCommand::LoadAbout { .. })), 1);
        assert_eq!(count(&commands, |c| matches!(c, AppCommand::LoadStats { .. })), 1);
        assert_eq!(count(&commands, |c| matches!(c, AppCommand::LoadPrices { .. })), 1);
    }

    #[test]
    fn test_click_on_header_suggestion_navigates() {
        use ratatui::layout::Rect;

        let mut app = app_with(None);
        load_universe(&mut app);
        app.focus_search();
        type_text(&mut app, "a");
        // Seul Apple contient un "a"
        assert_eq!(app.search.suggestions().len(), 1);

        app.search.set_bounds(Rect::new(20, 0, 40, 6));
        app.search.set_rows(Some(Rect::new(21, 4, 38, 1)));
        app.pointer_down(25, 4);

        assert_eq!(app.page, Resolved::Page(Route::stock("AAPL")));
        assert_eq!(app.focus, Focus::None);
        assert_eq!(app.search.query(), "");
        assert!(!app.search.is_panel_open());
    }

    #[test]
    fn test_click_on_trade_suggestion_selects_without_navigating() {
        use ratatui::layout::Rect;

        let mut app = app_with(Some("t"));
        load_universe(&mut app);
        app.go(Route::Trade);
        type_text(&mut app, "soft");

        app.trade.search.set_bounds(Rect::new(0, 3, 40, 6));
        app.trade.search.set_rows(Some(Rect::new(1, 7, 38, 1)));
        app.pointer_down(5, 7);

        assert_eq!(app.page, Resolved::Page(Route::Trade));
        assert_eq!(app.trade.selected_ticker(), Some("MSFT"));
        assert_eq!(app.focus, Focus::Form);
        assert_eq!(app.trade.search.query(), "");
    }

    #[test]
    fn test_range_change_discards_old_series() {
        let mut app = app_with(None);
        app.go(Route::stock("AAPL"));
        let first = app
            .take_commands()
            .into_iter()
            .find_map(|c| match c {
                AppCommand::LoadPrices { ticket, .. } => Some(ticket),
                _ => None,
            })
            .unwrap();

        app.shift_range(true);
        let second = app
            .take_commands()
            .into_iter()
            .find_map(|c| match c {
                AppCommand::LoadPrices { ticket, .. } => Some(ticket),
                _ => None,
            })
            .unwrap();
        assert_eq!(second.key, ("AAPL".to_string(), TimeRange::OneWeek));

        let week = PriceSeries { labels: vec!["w".into()], prices: vec![2.0] };
        let day = PriceSeries { labels: vec!["d".into()], prices: vec![1.0] };
        app.apply(AppResult::Prices { panel: Panel::Stock, ticket: second, result: Ok(week.clone()) });
        app.apply(AppResult::Prices { panel: Panel::Stock, ticket: first, result: Ok(day) });

        assert_eq!(app.stock.prices.data(), Some(&week));
    }

    #[test]
    fn test_login_success_goes_to_portfolio() {
        let mut app = app_with(None);
        app.go(Route::Login);
        type_text(&mut app, "ada@example.com");
        app.next_field();
        type_text(&mut app, "secret");
        app.take_commands();

        app.enter();
        let commands = app.take_commands();
        assert_eq!(count(&commands, |c| matches!(c, AppCommand::Login { .. })), 1);

        app.apply(AppResult::LoggedIn(Ok("jwt".to_string())));
        assert!(app.session.is_authenticated());
        assert_eq!(app.page, Resolved::Page(Route::Portfolio));

        let commands = app.take_commands();
        assert_eq!(count(&commands, |c| matches!(c, AppCommand::LoadHoldings { .. })), 1);
        assert_eq!(count(&commands, |c| matches!(c, AppCommand::LoadPerformance { .. })), 1);
    }

    #[test]
    fn test_login_failure_stays_with_message() {
        let mut app = app_with(None);
        app.go(Route::Login);
        type_text(&mut app, "a@b.c");
        app.next_field();
        type_text(&mut app, "wrong");
        app.enter();

        app.apply(AppResult::LoggedIn(Err(FetchError::from_response(
            401,
            r#"{"detail": "Invalid credentials"}"#,
        ))));

        assert_eq!(app.page, Resolved::Page(Route::Login));
        assert_eq!(app.login.error.as_deref(), Some("Invalid credentials"));
        assert!(!app.session.is_authenticated());
    }

    #[test]
    fn test_register_redirects_after_delay() {
        let mut app = app_with(None);
        app.go(Route::Register);
        type_text(&mut app, "Ada");
        app.next_field();
        type_text(&mut app, "Lovelace");
        app.next_field();
        type_text(&mut app, "ada@example.com");
        app.next_field();
        type_text(&mut app, "secret");
        app.enter();
        app.apply(AppResult::Registered(Ok(())));

        assert!(app.register.notice.is_some());
        app.tick_at(Instant::now());
        assert_eq!(app.page, Resolved::Page(Route::Register));

        app.tick_at(Instant::now() + REGISTER_REDIRECT_DELAY + Duration::from_millis(10));
        assert_eq!(app.page, Resolved::Page(Route::Login));
    }

    #[test]
    fn test_trade_flow_succeeds_once() {
        let mut app = app_with(Some("t"));
        load_universe(&mut app);
        app.go(Route::Trade);
        assert_eq!(app.focus, Focus::TradeSearch);

        type_text(&mut app, "aap");
        app.enter();
        assert_eq!(app.trade.selected_ticker(), Some("AAPL"));
        assert_eq!(app.focus, Focus::Form);

        // Le résumé rapide publie le prix courant
        let ticket = app
            .take_commands()
            .into_iter()
            .find_map(|c| match c {
                AppCommand::LoadSummary { panel: Panel::Trade, ticket } => Some(ticket),
                _ => None,
            })
            .unwrap();
        let summary = QuoteSummary {
            stock_ticker: "AAPL".into(),
            current_price: Metric::Number(150.0),
            ..QuoteSummary::default()
        };
        app.apply(AppResult::Summary { panel: Panel::Trade, ticket, result: Ok(summary) });
        assert_eq!(app.trade.current_price, Some(150.0));

        type_text(&mut app, "10");
        app.enter();
        let orders: Vec<TradeOrder> = app
            .take_commands()
            .into_iter()
            .filter_map(|c| match c {
                AppCommand::SubmitTrade { order } => Some(order),
                _ => None,
            })
            .collect();
        assert_eq!(orders, vec![TradeOrder::new("AAPL", 10.0, 150.0)]);

        // Deux réponses (doublon) : un seul effet
        app.apply(AppResult::TradeSubmitted(Ok(None)));
        app.apply(AppResult::TradeSubmitted(Ok(None)));

        assert_eq!(app.page, Resolved::Page(Route::Portfolio));
        assert_eq!(app.navigator.depth(), 3);
        let commands = app.take_commands();
        assert_eq!(count(&commands, |c| matches!(c, AppCommand::LoadHoldings { .. })), 1);
    }

    #[test]
    fn test_trade_requires_selection() {
        let mut app = app_with(Some("t"));
        app.go(Route::Trade);
        app.next_field();
        app.enter();

        assert_eq!(app.trade.form.error.as_deref(), Some("Select a stock first"));
        assert!(app.take_commands().iter().all(|c| !matches!(c, AppCommand::SubmitTrade { .. })));
    }

    #[test]
    fn test_listeners_follow_mounts() {
        let mut app = app_with(Some("t"));
        assert_eq!(app.listeners.count(ListenerKind::Resize), 1);
        assert_eq!(app.listeners.count(ListenerKind::PointerDown), 1);

        app.go(Route::Trade);
        assert_eq!(app.listeners.count(ListenerKind::Resize), 0);
        assert_eq!(app.listeners.count(ListenerKind::PointerDown), 2);

        app.back();
        assert_eq!(app.listeners.count(ListenerKind::Resize), 1);
        assert_eq!(app.listeners.count(ListenerKind::PointerDown), 1);
    }

    #[test]
    fn test_portfolio_tab_cycles_column_and_range_reloads() {
        let mut app = app_with(Some("t"));
        app.go(Route::Portfolio);
        app.take_commands();

        app.next_field();
        assert_eq!(app.position_column, PositionColumn::TotalValue);
        app.next_field();
        app.next_field();
        assert_eq!(app.position_column, PositionColumn::AllTimeReturn);

        app.shift_range(false);
        assert_eq!(app.performance_range, TimeRange::All);
        let commands = app.take_commands();
        assert_eq!(count(&commands, |c| matches!(c, AppCommand::LoadPerformance { .. })), 1);
    }

    #[test]
    fn test_resume_editing_on_form_pages() {
        let mut app = app_with(None);
        app.go(Route::Login);
        app.escape();
        assert_eq!(app.focus, Focus::None);

        app.resume_editing();
        assert_eq!(app.focus, Focus::Form);
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = app_with(None);
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.request_quit();
        app.quit();
        assert!(!app.is_running());
    }
}
