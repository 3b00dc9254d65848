// ============================================================================
// Page Stock : graphique, résumé de cotation, profil, statistiques
// ============================================================================
// Chaque section dessine son propre état (chargement, vide, erreur) :
// une statistique en échec n'empêche pas le graphique de s'afficher
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, StockPanel};
use crate::models::{CompanyProfile, QuoteSummary, StockStats, TimeRange};
use crate::ui::chart::{range_selector, render_price_chart, trend_color};
use crate::ui::status::ready_or_placeholder;

/// Page complète d'une action
pub fn render_stock_page(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Min(8)])
        .split(area);

    render_stock_panel(frame, &app.stock, rows[0]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    if let Some(profile) = ready_or_placeholder(frame, bottom[0], " About ", app.about.view()) {
        render_about(frame, profile, bottom[0]);
    }
    if let Some(stats) = ready_or_placeholder(frame, bottom[1], " Key Statistics ", app.stats.view()) {
        render_stats(frame, stats, bottom[1]);
    }
}

/// Graphique + sélecteur de plage + résumé (partagé avec la page Trade)
pub fn render_stock_panel(frame: &mut Frame, panel: &StockPanel, area: Rect) {
    let Some(ticker) = panel.ticker.as_deref() else {
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(columns[0]);

    let title = format!(" {} - {} ", ticker, panel.range.label());
    if let Some(series) = ready_or_placeholder(frame, left[0], &title, panel.prices.view()) {
        render_price_chart(frame, left[0], ticker, panel.range, series);
    }
    frame.render_widget(
        Paragraph::new(range_selector(panel.range, TimeRange::STOCK)),
        left[1],
    );

    if let Some(summary) = ready_or_placeholder(frame, columns[1], " Stock Detail ", panel.summary.view()) {
        render_summary(frame, summary, columns[1]);
    }
}

/// Tableau "Stock Detail" précédé du prix et de la variation du jour
fn render_summary(frame: &mut Frame, summary: &QuoteSummary, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", summary.name));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let change = summary.daily_change.as_f64().unwrap_or(0.0);
    let color = trend_color(change >= 0.0);
    let header = vec![
        Line::from(vec![
            Span::styled(
                summary.current_price.dollars(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{} ({})", summary.daily_change.fixed2(), summary.percent_change.signed_percent()),
                Style::default().fg(color),
            ),
        ]),
        Line::from(Span::styled(
            format!("{} · {}", summary.exchange, summary.market_status),
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(Paragraph::new(header), parts[0]);

    let rows: Vec<Row> = summary
        .rows()
        .into_iter()
        .map(|(label, value)| Row::new(vec![label.to_string(), value]))
        .collect();
    let table = Table::new(rows, [Constraint::Percentage(50), Constraint::Percentage(50)])
        .style(Style::default().fg(Color::White));
    frame.render_widget(table, parts[1]);
}

/// Description de la société et quelques faits
fn render_about(frame: &mut Frame, profile: &CompanyProfile, area: Rect) {
    let dim = Style::default().fg(Color::Gray);
    let mut lines = vec![
        Line::from(vec![Span::styled("CEO: ", dim), Span::raw(profile.ceo.to_string())]),
        Line::from(vec![Span::styled("Founded: ", dim), Span::raw(profile.founded.to_string())]),
        Line::from(vec![
            Span::styled("Headquarters: ", dim),
            Span::raw(profile.headquarters.clone().unwrap_or_else(|| "N/A".to_string())),
        ]),
        Line::from(vec![Span::styled("Employees: ", dim), Span::raw(profile.employees.thousands())]),
    ];
    if let Some(website) = &profile.website {
        lines.push(Line::from(vec![Span::styled("Website: ", dim), Span::raw(website.clone())]));
    }
    lines.push(Line::from(""));
    if let Some(summary) = &profile.summary {
        lines.push(Line::from(summary.clone()));
    }

    let title = format!(" About {} ", profile.name.as_deref().unwrap_or(""));
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        );
    frame.render_widget(paragraph, area);
}

/// Quatre petits tableaux en grille 2x2
fn render_stats(frame: &mut Frame, stats: &StockStats, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Key Statistics ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);
    let cells: Vec<Rect> = rows
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row)
                .to_vec()
        })
        .collect();

    for ((title, entries), cell) in stats.groups().into_iter().zip(cells) {
        let table_rows: Vec<Row> = entries
            .into_iter()
            .map(|(label, value)| Row::new(vec![label.to_string(), value]))
            .collect();
        let table = Table::new(table_rows, [Constraint::Percentage(55), Constraint::Percentage(45)])
            .header(Row::new(vec![title.to_string()]).style(Style::default().add_modifier(Modifier::BOLD)));
        frame.render_widget(table, cell);
    }
}
