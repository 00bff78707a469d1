// Confirmation overlay widget.
//
// Centered y/n dialog drawn on top of the layout. Used for quitting and for
// deleting a player from the admin roster.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

const DIALOG_HEIGHT: u16 = 5;
const MIN_WIDTH: u16 = 28;

/// Render a `<question> (y/n)` dialog centered in `area`.
pub fn render(frame: &mut Frame, area: Rect, title: &str, question: &str) {
    // Borders plus two spaces of padding on each side.
    let width = u16::try_from(question.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(12)
        .max(MIN_WIDTH);
    let dialog_area = centered_rect(width, DIALOG_HEIGHT, area);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            title.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

    let text = Line::from(vec![
        Span::raw(format!("  {question} (")),
        Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("/"),
        Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(")"),
    ]);

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().bg(Color::Black));

    frame.render_widget(paragraph, dialog_area);
}

/// Compute a centered rectangle of the given size within `area`, clamped
/// to the available space.
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::buffer_text;

    #[test]
    fn centered_rect_is_centered() {
        let area = Rect::new(0, 0, 100, 50);
        let rect = centered_rect(28, 5, area);
        assert_eq!(rect.width, 28);
        assert_eq!(rect.height, 5);
        assert_eq!(rect.x, 36);
        assert_eq!(rect.y, 22);
    }

    #[test]
    fn centered_rect_clamps_to_area() {
        let rect = centered_rect(28, 5, Rect::new(0, 0, 20, 3));
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 3);
    }

    #[test]
    fn render_shows_question() {
        let backend = ratatui::backend::TestBackend::new(80, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), " Quit? ", "Really quit?"))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Really quit? (y/n)"));
        assert!(text.contains("Quit?"));
    }

    #[test]
    fn oversized_question_is_clamped_to_area() {
        let backend = ratatui::backend::TestBackend::new(80, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let question = format!("Delete {}?", "W".repeat(65_520));
        terminal
            .draw(|frame| render(frame, frame.area(), " Delete player? ", &question))
            .unwrap();
        assert!(buffer_text(terminal.backend().buffer()).contains("Delete WWW"));
    }

    #[test]
    fn long_question_widens_dialog() {
        let backend = ratatui::backend::TestBackend::new(80, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let question = "Delete Jeewan Thirimanne Weerasinghe?";
        terminal
            .draw(|frame| render(frame, frame.area(), " Delete player? ", question))
            .unwrap();
        assert!(buffer_text(terminal.backend().buffer()).contains(question));
    }
}
