// ============================================================================
// Rendu de la treemap du S&P 500
// ============================================================================
// Le layout est calculé en cellules de terminal par crate::treemap ;
// ici on ne fait que peindre :
// - le fond de chaque société avec la couleur de sa variation
// - le ticker et la variation si la case est assez grande
// - le nom du secteur sur la première ligne de son rectangle
// - le tooltip de la case survolée
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::fetch::{ResourceView, Sp500};
use crate::models::format::signed_percent;
use crate::treemap::{color_for, Bounds, LabelPolicy, SectorTreemap};
use crate::ui::status::ready_or_placeholder;

const TITLE: &str = " S&P 500 ";

/// Dessine la treemap dans `area`
pub fn render_treemap(
    frame: &mut Frame,
    treemap: &mut SectorTreemap,
    view: ResourceView<'_, Sp500>,
    area: Rect,
) {
    if ready_or_placeholder(frame, area, TITLE, view).is_none() {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(TITLE);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let labels = LabelPolicy::cells();
    if let Some(layout) = treemap.layout_for(inner.x, inner.y, inner.width, inner.height) {
        for leaf in &layout.leaves {
            let Some(rect) = to_rect(&leaf.bounds, inner) else {
                continue;
            };
            let background: Color = color_for(leaf.percent_change).into();

            let mut lines = Vec::new();
            if labels.shows_ticker(&leaf.bounds) {
                lines.push(Line::from(Span::styled(
                    leaf.ticker.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            }
            if labels.shows_percent(&leaf.bounds) {
                lines.push(Line::from(signed_percent(leaf.percent_change)));
            }

            let paragraph = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White).bg(background));
            frame.render_widget(paragraph, rect);
        }

        // Noms des secteurs par-dessus, sur la ligne du haut
        for sector in &layout.sectors {
            let Some(rect) = to_rect(&sector.bounds, inner) else {
                continue;
            };
            let title = Rect::new(rect.x, rect.y, rect.width, 1);
            let name: String = sector.name.chars().take(rect.width as usize).collect();
            frame.render_widget(
                Paragraph::new(name).style(
                    Style::default()
                        .fg(Color::Gray)
                        .bg(Color::Black)
                        .add_modifier(Modifier::ITALIC),
                ),
                title,
            );
        }
    }

    if let Some(tooltip) = treemap.hovered_tooltip() {
        if let Some(rect) = to_rect(&tooltip.bounds, inner) {
            let lines: Vec<Line> = tooltip.lines.into_iter().map(Line::from).collect();
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(lines).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::White))
                        .style(Style::default().bg(Color::Black)),
                ),
                rect,
            );
        }
    }
}

/// Rectangle local (cellules) -> Rect absolu, None si vide
///
/// Le layout est arrondi : les coordonnées sont déjà entières
fn to_rect(bounds: &Bounds, origin: Rect) -> Option<Rect> {
    let x = bounds.x0.max(0.0) as u16;
    let y = bounds.y0.max(0.0) as u16;
    let width = bounds.width().max(0.0) as u16;
    let height = bounds.height().max(0.0) as u16;
    if width == 0 || height == 0 {
        return None;
    }

    let rect = Rect::new(origin.x + x, origin.y + y, width, height);
    Some(rect.intersection(origin)).filter(|r| !r.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rect_offsets_by_origin() {
        let origin = Rect::new(1, 4, 50, 20);
        let rect = to_rect(&Bounds::new(2.0, 3.0, 12.0, 8.0), origin).unwrap();
        assert_eq!(rect, Rect::new(3, 7, 10, 5));
    }

    #[test]
    fn test_to_rect_skips_empty_and_clips() {
        let origin = Rect::new(0, 0, 10, 10);
        assert_eq!(to_rect(&Bounds::new(3.0, 3.0, 3.0, 8.0), origin), None);

        let clipped = to_rect(&Bounds::new(5.0, 5.0, 20.0, 20.0), origin).unwrap();
        assert_eq!(clipped, Rect::new(5, 5, 5, 5));
    }
}
