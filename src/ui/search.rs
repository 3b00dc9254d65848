// ============================================================================
// Rendu de la barre de recherche et du panneau de suggestions
// ============================================================================
// Le panneau est dessiné en dernier, par-dessus la page (widget Clear),
// juste sous le champ de saisie
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::search::SearchBar;

/// Largeur minimale du panneau de suggestions
const PANEL_MIN_WIDTH: u16 = 40;

/// Champ de saisie (bordure verte quand il a le focus)
pub fn render_search_input(
    frame: &mut Frame,
    bar: &SearchBar,
    area: Rect,
    focused: bool,
    placeholder: &str,
) {
    let border = if focused { Color::Green } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let line = if bar.query().is_empty() && !focused {
        Line::from(Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray)))
    } else {
        let mut spans = vec![
            Span::styled("/ ", Style::default().fg(Color::Cyan)),
            Span::styled(bar.query().to_string(), Style::default().fg(Color::White)),
        ];
        if focused {
            spans.push(Span::styled(
                "█",
                Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Panneau de suggestions sous `input`, et mise à jour de la zone
/// "intérieure" de la barre pour la détection des clics dehors
pub fn render_suggestions(frame: &mut Frame, bar: &mut SearchBar, input: Rect) {
    let screen = frame.size();
    let panel = panel_area(input, screen, bar.suggestions().len());

    match panel {
        Some(panel) if bar.is_panel_open() => {
            let items: Vec<ListItem> = bar
                .suggestions()
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let style = if i == bar.highlighted() {
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    ListItem::new(format!(" {}", s.display())).style(style)
                })
                .collect();

            let list = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
            frame.render_widget(Clear, panel);
            frame.render_widget(list, panel);
            bar.set_bounds(input.union(panel));
            bar.set_rows(Some(list_rows(panel)));
        }
        _ => {
            bar.set_bounds(input);
            bar.set_rows(None);
        }
    }
}

/// Lignes de la liste : le panneau sans sa bordure
fn list_rows(panel: Rect) -> Rect {
    Rect::new(
        panel.x + 1,
        panel.y + 1,
        panel.width.saturating_sub(2),
        panel.height.saturating_sub(2),
    )
}

/// Zone du panneau : sous le champ, bornée par l'écran
fn panel_area(input: Rect, screen: Rect, count: usize) -> Option<Rect> {
    if count == 0 {
        return None;
    }
    let y = input.y + input.height;
    let available = screen.height.saturating_sub(y);
    let height = (count as u16 + 2).min(available);
    if height < 3 {
        return None;
    }

    let width = input.width.max(PANEL_MIN_WIDTH).min(screen.width);
    let x = input.x.min(screen.width.saturating_sub(width));
    Some(Rect::new(x, y, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_below_input() {
        let input = Rect::new(10, 0, 30, 3);
        let screen = Rect::new(0, 0, 100, 40);

        let panel = panel_area(input, screen, 3).unwrap();
        assert_eq!(panel, Rect::new(10, 3, 40, 5));
        assert_eq!(panel_area(input, screen, 0), None);
    }

    #[test]
    fn test_panel_stays_on_screen() {
        let input = Rect::new(70, 0, 30, 3);
        let screen = Rect::new(0, 0, 80, 6);

        let panel = panel_area(input, screen, 8).unwrap();
        assert_eq!(panel.x + panel.width, 80);
        assert_eq!(panel.height, 3);
    }

    #[test]
    fn test_list_rows_inside_border() {
        let panel = Rect::new(10, 3, 40, 5);
        assert_eq!(list_rows(panel), Rect::new(11, 4, 38, 3));
    }
}
