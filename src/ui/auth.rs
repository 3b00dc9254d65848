// ============================================================================
// Formulaires : login, inscription, quantité d'un ordre
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::Form;

/// Page de login
pub fn render_login(frame: &mut Frame, form: &Form, focused: bool, area: Rect) {
    let box_area = centered(area, 50, form_height(form) + 2);
    render_form(frame, form, focused, " Login ", box_area);
    render_hint(frame, area, box_area, "No account yet? Press [r] to register");
}

/// Page d'inscription
pub fn render_register(frame: &mut Frame, form: &Form, focused: bool, area: Rect) {
    let box_area = centered(area, 50, form_height(form) + 2);
    render_form(frame, form, focused, " Register ", box_area);
    render_hint(frame, area, box_area, "Already registered? Press [a] to log in");
}

/// Hauteur intérieure : une ligne par champ + ligne de message
pub fn form_height(form: &Form) -> u16 {
    form.fields.len() as u16 + 2
}

/// Dessine les champs, puis l'erreur ou le message de succès
pub fn render_form(frame: &mut Frame, form: &Form, focused: bool, title: &str, area: Rect) {
    let border = if focused { Color::Green } else { Color::Cyan };
    let label_width = form.fields.iter().map(|f| f.label.len()).max().unwrap_or(0);

    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = focused && i == form.selected;
            let shown = if field.secret {
                "•".repeat(field.value.chars().count())
            } else {
                field.value.clone()
            };
            let label_style = if selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };

            let mut spans = vec![
                Span::styled(format!("{:>width$}: ", field.label, width = label_width), label_style),
                Span::raw(shown),
            ];
            if selected {
                spans.push(Span::styled(
                    "█",
                    Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
                ));
            }
            Line::from(spans)
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(if form.submitting {
        Line::from(Span::styled("Submitting...", Style::default().fg(Color::Yellow)))
    } else if let Some(error) = &form.error {
        Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
    } else if let Some(notice) = &form.notice {
        Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Green)))
    } else {
        Line::from(Span::styled(
            "[Tab] Next field  [Enter] Submit",
            Style::default().fg(Color::DarkGray),
        ))
    });

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title.to_string()),
    );
    frame.render_widget(paragraph, area);
}

fn render_hint(frame: &mut Frame, area: Rect, box_area: Rect, hint: &str) {
    let y = box_area.y + box_area.height;
    if y < area.y + area.height {
        let line = Rect::new(area.x, y, area.width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(hint.to_string(), Style::default().fg(Color::Gray)))
                .alignment(Alignment::Center),
            line,
        );
    }
}

/// Rectangle centré de taille fixe (borné par `area`)
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_box() {
        let area = Rect::new(0, 0, 100, 30);
        let rect = centered(area, 50, 6);
        assert_eq!((rect.width, rect.height), (50, 6));
        assert_eq!(rect.x, 25);
        assert_eq!(rect.y, 12);
    }

    #[test]
    fn test_form_height() {
        assert_eq!(form_height(&Form::login()), 4);
        assert_eq!(form_height(&Form::register()), 6);
    }
}
