// Player detail overlay: raw counters and every derived figure.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crease_core::model::Player;
use crease_cricket::valuation::{format_currency, Valuation};

use super::confirm::centered_rect;

const WIDTH: u16 = 56;
const HEIGHT: u16 = 19;

pub fn render(frame: &mut Frame, area: Rect, player: &Player) {
    let dialog = centered_rect(WIDTH, HEIGHT, area);
    frame.render_widget(Clear, dialog);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" {} ", player.name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(detail_lines(player))
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog);
}

fn detail_lines(player: &Player) -> Vec<Line<'static>> {
    let stats = &player.stats;
    let v = Valuation::of(stats);
    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    vec![
        row("University", player.university.clone()),
        row("Category", player.category.label().to_string()),
        Line::raw(""),
        Line::styled(" Batting", heading),
        row("Total runs", count(stats.total_runs)),
        row("Balls faced", count(stats.balls_faced)),
        row("Innings played", count(stats.innings_played)),
        row("Strike rate", format!("{:.2}", v.batting_strike_rate)),
        row("Average", format!("{:.2}", v.batting_average)),
        Line::raw(""),
        Line::styled(" Bowling", heading),
        row("Wickets", count(stats.wickets)),
        row("Overs bowled", count(stats.overs_bowled)),
        row("Runs conceded", count(stats.runs_conceded)),
        row("Strike rate", format!("{:.2}", v.bowling_strike_rate)),
        row("Economy", format!("{:.2}", v.economy_rate)),
        Line::from(vec![
            Span::raw(format!("   {:<16}", "Value")),
            Span::styled(
                format!("{} ({:.2} points)", format_currency(v.value), v.points),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
    ]
}

fn row(label: &str, value: String) -> Line<'static> {
    Line::raw(format!("   {label:<16}{value}"))
}

/// Whole counters print without a fraction; overs keep theirs.
fn count(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        format!("{n:.1}")
    }
}
