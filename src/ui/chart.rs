// ============================================================================
// Chart - Graphiques ligne (prix d'une action, performance du portefeuille)
// ============================================================================
// CONCEPTS RUST :
// 1. Iterator chaining : transformer les séries en points (x, y)
// 2. fold : min/max en un seul passage
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher
// 3. Axis : configuration des axes X et Y
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::models::{PerformanceSeries, PriceSeries, TimeRange};

/// Couleur des gains / pertes (partagée par les tableaux)
pub const GAIN: Color = Color::Rgb(0x09, 0x99, 0x0F);
pub const LOSS: Color = Color::Rgb(0xFC, 0x2C, 0x2C);

/// Couleur d'une série selon son sens sur la période
pub fn trend_color(rising: bool) -> Color {
    if rising {
        GAIN
    } else {
        LOSS
    }
}

/// Données prêtes à tracer : libellés de l'axe X et valeurs
struct LineSeries<'a> {
    name: &'a str,
    labels: Vec<&'a str>,
    values: Vec<f64>,
    rising: bool,
}

/// Graphique des prix d'une action
pub fn render_price_chart(
    frame: &mut Frame,
    area: Rect,
    ticker: &str,
    range: TimeRange,
    series: &PriceSeries,
) {
    let points = series.points();
    let line = LineSeries {
        name: ticker,
        labels: points.iter().map(|p| p.label.as_str()).collect(),
        values: points.iter().map(|p| p.price).collect(),
        rising: series.is_rising(),
    };
    let title = format!(" {} - {} ", ticker, range.label());
    render_line(frame, area, &title, &line, |v| format!("${:.2}", v));
}

/// Courbe de performance du portefeuille (rendement en %)
pub fn render_performance_chart(
    frame: &mut Frame,
    area: Rect,
    range: TimeRange,
    series: &PerformanceSeries,
) {
    let line = LineSeries {
        name: "Portfolio",
        labels: series.points.iter().map(|p| p.date.as_str()).collect(),
        values: series.points.iter().map(|p| p.value).collect(),
        rising: series.is_rising(),
    };
    let title = format!(" Performance - {} ", range.label());
    render_line(frame, area, &title, &line, |v| format!("{:.2}%", v));
}

/// Dessine un graphique ligne
///
/// CONCEPT RUST : Closure en paramètre
/// - `format_y` formate les labels de l'axe Y ($ ou %)
/// - impl Fn(f64) -> String : dispatch statique, pas de Box
fn render_line(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    series: &LineSeries<'_>,
    format_y: impl Fn(f64) -> String,
) {
    let points: Vec<(f64, f64)> = series
        .values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect();

    if points.is_empty() {
        render_no_data(frame, area, title, "No data available");
        return;
    }

    let (min, max) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(min, max), &(_x, y)| (min.min(y), max.max(y)));

    // Marge de 5% pour que le graphique respire (1 si la série est plate)
    let margin = match (max - min) * 0.05 {
        m if m > 0.0 => m,
        _ => 1.0,
    };
    let y_min = min - margin;
    let y_max = max + margin;

    let color = trend_color(series.rising);
    let datasets = vec![Dataset::default()
        .name(series.name)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let last = series.labels.len().saturating_sub(1);
    let x_labels: Vec<Span> = [0, last / 2, last]
        .iter()
        .map(|&i| Span::raw(series.labels.get(i).copied().unwrap_or("").to_string()))
        .collect();

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, (points.len().max(2) - 1) as f64])
        .labels(x_labels);

    let y_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format_y(y_min)),
            Span::raw(format_y((y_min + y_max) / 2.0)),
            Span::raw(format_y(y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title.to_string()),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Sélecteur de plage : la plage active en surbrillance
pub fn range_selector(active: TimeRange, choices: &[TimeRange]) -> Line<'static> {
    let mut spans = vec![Span::styled("[h/l] ", Style::default().fg(Color::Yellow))];
    for range in choices {
        let style = if *range == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", range.label()), style));
    }
    Line::from(spans)
}

// ============================================================================
// Helper : Message quand pas de données
// ============================================================================

/// Affiche un message à la place d'un contenu absent
pub fn render_no_data(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title.to_string());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_color() {
        assert_eq!(trend_color(true), GAIN);
        assert_eq!(trend_color(false), LOSS);
    }

    #[test]
    fn test_range_selector_highlights_active() {
        let line = range_selector(TimeRange::OneWeek, TimeRange::PORTFOLIO);
        let active: Vec<&str> = line
            .spans
            .iter()
            .filter(|s| s.style.bg == Some(Color::Cyan))
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(active, [" 1W "]);
    }
}
