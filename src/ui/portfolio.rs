// ============================================================================
// Page Portfolio : courbe de performance + tableau des positions
// ============================================================================
// Tableau adaptatif :
// - large : toutes les colonnes
// - étroit : ticker + une seule colonne, choisie avec Tab
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, PositionColumn};
use crate::models::format::{dollars, signed_percent};
use crate::models::{Position, TimeRange};
use crate::ui::chart::{range_selector, render_performance_chart, trend_color};
use crate::ui::status::ready_or_placeholder;

/// En dessous de cette largeur, le tableau passe en mode une colonne
pub const WIDE_TABLE_MIN_WIDTH: u16 = 90;

pub fn render_portfolio_page(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(6),
        ])
        .split(area);

    let title = format!(" Performance - {} ", app.performance_range.label());
    if let Some(series) = ready_or_placeholder(frame, rows[0], &title, app.performance.view()) {
        render_performance_chart(frame, rows[0], app.performance_range, series);
    }
    frame.render_widget(
        Paragraph::new(range_selector(app.performance_range, TimeRange::PORTFOLIO)),
        rows[1],
    );

    if let Some(positions) = ready_or_placeholder(frame, rows[2], " Positions ", app.holdings.view()) {
        render_positions(frame, positions, app.position_column, rows[2]);
    }
}

/// Cellule colorée selon le signe
fn signed_cell(text: String, positive: bool) -> Cell<'static> {
    Cell::from(text).style(Style::default().fg(trend_color(positive)))
}

/// Valeur de la colonne choisie en mode étroit
fn column_cell(position: &Position, column: PositionColumn) -> Cell<'static> {
    match column {
        PositionColumn::AllTimeReturn => signed_cell(
            format!(
                "{} ({})",
                dollars(position.all_time_return_amount),
                signed_percent(position.all_time_return)
            ),
            position.is_up_all_time(),
        ),
        PositionColumn::TotalValue => Cell::from(dollars(position.total_value)),
        PositionColumn::TodayPrice => signed_cell(
            format!(
                "{} ({})",
                dollars(position.current_price),
                signed_percent(position.today_change_percent)
            ),
            position.is_up_today(),
        ),
    }
}

fn render_positions(frame: &mut Frame, positions: &[Position], column: PositionColumn, area: Rect) {
    let header_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let wide = area.width >= WIDE_TABLE_MIN_WIDTH;

    let (header, rows, widths): (Row, Vec<Row>, Vec<Constraint>) = if wide {
        let header = Row::new(vec![
            "Ticker",
            "Name",
            "Shares",
            "Price",
            "Today",
            "Total Value",
            "All Time Return",
        ])
        .style(header_style);
        let rows = positions
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(p.ticker.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
                    Cell::from(p.name.clone()),
                    Cell::from(format!("{}", p.shares)),
                    Cell::from(dollars(p.current_price)),
                    signed_cell(signed_percent(p.today_change_percent), p.is_up_today()),
                    Cell::from(dollars(p.total_value)),
                    signed_cell(
                        format!(
                            "{} ({})",
                            dollars(p.all_time_return_amount),
                            signed_percent(p.all_time_return)
                        ),
                        p.is_up_all_time(),
                    ),
                ])
            })
            .collect();
        let widths = vec![
            Constraint::Length(8),
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(11),
            Constraint::Length(9),
            Constraint::Length(14),
            Constraint::Length(22),
        ];
        (header, rows, widths)
    } else {
        let header = Row::new(vec!["Ticker".to_string(), format!("{} [Tab]", column.label())])
            .style(header_style);
        let rows = positions
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(p.ticker.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
                    column_cell(p, column),
                ])
            })
            .collect();
        (header, rows, vec![Constraint::Length(8), Constraint::Min(10)])
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Positions "),
    );
    frame.render_widget(table, area);
}
