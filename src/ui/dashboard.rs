// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine le cadre commun (header, footer) puis la page courante
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Ordre de dessin : ce qui est dessiné en dernier passe au-dessus
//    (panneau de suggestions, tooltip)
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::router::{Resolved, Route};
use crate::ui::{auth, portfolio, search, stock, trade, treemap};

/// Largeur du champ de recherche du header
const SEARCH_WIDTH: u16 = 36;

/// Dessine l'interface complète
///
/// CONCEPT RUST : &mut App
/// - Le rendu mesure des zones (recherche, treemap) et les mémorise
///   pour la souris : il a besoin d'écrire dans l'état
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Page
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    let search_area = render_header(frame, app, chunks[0]);

    match app.page.clone() {
        Resolved::Loading => render_loading(frame, chunks[1]),
        Resolved::Page(route) => match route {
            Route::Home => {
                treemap::render_treemap(frame, &mut app.treemap, app.sp500.view(), chunks[1])
            }
            Route::Stock { .. } => stock::render_stock_page(frame, app, chunks[1]),
            Route::Login => auth::render_login(frame, &app.login, app.focus == Focus::Form, chunks[1]),
            Route::Register => {
                auth::render_register(frame, &app.register, app.focus == Focus::Form, chunks[1])
            }
            Route::Portfolio => portfolio::render_portfolio_page(frame, app, chunks[1]),
            Route::Trade => trade::render_trade_page(frame, app, chunks[1]),
        },
    }

    render_footer(frame, app, chunks[2]);

    // Suggestions du header en dernier : au-dessus de la page
    search::render_suggestions(frame, &mut app.search, search_area);
}

// ============================================================================
// Header : titre, recherche, navigation, session
// ============================================================================

/// Dessine le header et retourne la zone du champ de recherche
fn render_header(frame: &mut Frame, app: &App, area: Rect) -> Rect {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16),
            Constraint::Length(SEARCH_WIDTH),
            Constraint::Min(0),
        ])
        .split(area);

    let busy = if app.is_busy() { " ⟳" } else { "" };
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "LazyFolio",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(busy, Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    )
    .alignment(Alignment::Center);
    frame.render_widget(title, columns[0]);

    search::render_search_input(
        frame,
        &app.search,
        columns[1],
        app.focus == Focus::HeaderSearch,
        "[/] Search stocks",
    );

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let current = app.current_page();
    let nav = |label: &'static str, route: Route| {
        if current == Some(&route) {
            Span::styled(label, Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED))
        } else {
            Span::raw(label)
        }
    };

    let mut spans = vec![
        Span::styled("[g]", key),
        nav(" Home  ", Route::Home),
        Span::styled("[p]", key),
        nav(" Portfolio  ", Route::Portfolio),
        Span::styled("[t]", key),
        nav(" Trade  ", Route::Trade),
    ];
    if app.session.is_authenticated() {
        spans.push(Span::styled("[a]", key));
        spans.push(Span::raw(" Logout"));
    } else {
        spans.push(Span::styled("[a]", key));
        spans.push(nav(" Login  ", Route::Login));
        spans.push(Span::styled("[r]", key));
        spans.push(nav(" Register", Route::Register));
    }

    let nav_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(nav_bar, columns[2]);

    columns[1]
}

/// Garde en attente : indicateur neutre, aucun contenu protégé
fn render_loading(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Loading...", Style::default().fg(Color::Gray))),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : raccourcis ou confirmation de quit
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        // CONCEPT : Style avec BLINK pour attirer l'attention
        Line::from(vec![
            Span::styled(
                "⚠  Press ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, or any other key to cancel ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if app.focus != Focus::None {
        Line::from(vec![
            Span::styled("[↑↓]", key),
            Span::raw(" Select  "),
            Span::styled("[Tab]", key),
            Span::raw(" Next  "),
            Span::styled("[Enter]", key),
            Span::raw(" Confirm  "),
            Span::styled("[Esc]", key),
            Span::raw(" Leave field"),
        ])
    } else {
        let mut spans = vec![
            Span::styled("[q]", key),
            Span::raw(" Quit  "),
            Span::styled("[/]", key),
            Span::raw(" Search  "),
            Span::styled("[Esc]", key),
            Span::raw(" Back  "),
        ];
        match app.current_page() {
            Some(Route::Home) => {
                spans.push(Span::styled("[click]", key));
                spans.push(Span::raw(" Open stock"));
            }
            Some(Route::Stock { .. }) => {
                spans.push(Span::styled("[h/l]", key));
                spans.push(Span::raw(" Range"));
            }
            Some(Route::Portfolio) => {
                spans.push(Span::styled("[h/l]", key));
                spans.push(Span::raw(" Range  "));
                spans.push(Span::styled("[Tab]", key));
                spans.push(Span::raw(" Column"));
            }
            Some(Route::Trade) | Some(Route::Login) | Some(Route::Register) => {
                spans.push(Span::styled("[Enter]", key));
                spans.push(Span::raw(" Edit"));
            }
            None => {}
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::session::{MemoryTokenStorage, SessionStore};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_home_while_loading() {
        let session = Arc::new(SessionStore::new(MemoryTokenStorage::new()));
        session.initialize();
        let mut app = App::new(session);

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("LazyFolio"));
        assert!(text.contains("Loading..."));
        assert!(text.contains("Login"));
    }

    #[test]
    fn test_render_guard_pending_shows_no_protected_content() {
        let session = Arc::new(SessionStore::new(MemoryTokenStorage::with_token("t")));
        let mut app = App::new(session);
        app.go(Route::Portfolio);

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Loading..."));
        assert!(!text.contains("Positions"));
    }

    /// Position (column, row) du premier `needle` à l'écran
    fn find(terminal: &Terminal<TestBackend>, needle: &str) -> Option<(u16, u16)> {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let wanted: Vec<String> = needle.chars().map(String::from).collect();
        let last_start = area.width.saturating_sub(wanted.len() as u16);

        for y in area.y..area.y + area.height {
            for x in area.x..=area.x + last_start {
                let hit = wanted
                    .iter()
                    .enumerate()
                    .all(|(i, c)| buffer.get(x + i as u16, y).symbol() == c);
                if hit {
                    return Some((x, y));
                }
            }
        }
        None
    }

    #[test]
    fn test_click_on_rendered_suggestion_opens_stock() {
        use crate::models::TickerSummary;
        use crate::worker::{AppCommand, AppResult};

        let session = Arc::new(SessionStore::new(MemoryTokenStorage::new()));
        session.initialize();
        let mut app = App::new(session);

        let ticket = app
            .take_commands()
            .into_iter()
            .find_map(|c| match c {
                AppCommand::LoadTickers { ticket } => Some(ticket),
                _ => None,
            })
            .unwrap();
        let universe = vec![
            TickerSummary::new("AAPL", "Apple", "NASDAQ"),
            TickerSummary::new("AMZN", "Amazon", "NASDAQ"),
        ];
        app.apply(AppResult::Tickers { ticket, result: Ok(universe) });

        app.focus_search();
        app.type_char('a');
        assert_eq!(app.focus, Focus::HeaderSearch);

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let (column, row) = find(&terminal, "AMZN").expect("AMZN row rendered");
        app.pointer_down(column, row);

        assert_eq!(app.page, Resolved::Page(Route::stock("AMZN")));
        assert_eq!(app.search.query(), "");
        assert!(!app.search.is_panel_open());
    }
}
