// ============================================================================
// Page Trade : recherche contrôlée, panneau de cotation, quantité
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Focus};
use crate::models::format::dollars;
use crate::ui::auth::{form_height, render_form};
use crate::ui::search::{render_search_input, render_suggestions};
use crate::ui::stock::render_stock_panel;

pub fn render_trade_page(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form_height(&app.trade.form) + 2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let search_area = search_input_area(top[0]);
    render_search_input(
        frame,
        &app.trade.search,
        search_area,
        app.focus == Focus::TradeSearch,
        "Search a stock to buy [Tab]",
    );

    let title = match app.trade.selected_ticker() {
        Some(ticker) => format!(" Buy {} ", ticker),
        None => " Buy ".to_string(),
    };
    render_form(frame, &app.trade.form, app.focus == Focus::Form, &title, top[1]);

    let price = match app.trade.current_price {
        Some(price) => Span::styled(
            format!("Price: {}", dollars(price)),
            Style::default().fg(Color::White),
        ),
        None => Span::styled("Price: -", Style::default().fg(Color::DarkGray)),
    };
    let estimate = app
        .trade
        .current_price
        .zip(app.trade.form.value(0).trim().parse::<f64>().ok())
        .map(|(price, shares)| format!("   Estimated cost: {}", dollars(price * shares)))
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Line::from(vec![price, Span::raw(estimate)])),
        rows[1],
    );

    if app.trade.selected_ticker().is_some() {
        render_stock_panel(frame, &app.trade.panel, rows[2]);
    } else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Select a stock to see its chart and price",
                Style::default().fg(Color::Gray),
            )),
            rows[2],
        );
    }

    // Panneau de suggestions en dernier : par-dessus le reste de la page
    render_suggestions(frame, &mut app.trade.search, search_area);
}

/// Champ de recherche : 3 lignes en haut de `cell`, sans jamais en déborder
fn search_input_area(cell: Rect) -> Rect {
    Rect::new(cell.x, cell.y, cell.width, 3).intersection(cell)
}
