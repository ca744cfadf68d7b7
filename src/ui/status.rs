use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::controller::Stage;

const STAGES: [(Stage, &str); 4] = [
    (Stage::First, " 1 first "),
    (Stage::Second, " 2 second "),
    (Stage::Sum, " 3 sum "),
    (Stage::Solved, " ✓ solved "),
];

pub fn render_stages(frame: &mut Frame, app: &App, area: Rect) {
    let controller = app.controller();
    let current = controller.stage().map(Stage::number).unwrap_or(0);

    let mut spans = Vec::new();
    for (i, (stage, label)) in STAGES.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" → ", Style::default().fg(Color::Rgb(60, 60, 80))));
        }
        let style = match stage.number().cmp(&current) {
            std::cmp::Ordering::Less => Style::default().fg(Color::Rgb(80, 200, 120)),
            std::cmp::Ordering::Equal => Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD),
            std::cmp::Ordering::Greater => Style::default().fg(Color::Rgb(120, 120, 140)),
        };
        spans.push(Span::styled(*label, style));
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
            .border_type(BorderType::Rounded)
            .title(" ➕ Number Line ")
            .title_style(
                Style::default()
                    .fg(Color::Rgb(200, 120, 255))
                    .add_modifier(Modifier::BOLD),
            ),
    );

    frame.render_widget(bar, area);
}

pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let key = Style::default()
        .fg(Color::Rgb(80, 200, 255))
        .add_modifier(Modifier::BOLD);
    let text = Style::default().fg(Color::Rgb(100, 100, 130));

    let controller = app.controller();
    let line = if controller.is_solved() {
        Line::from(vec![
            Span::styled(" Well done! ", Style::default().fg(Color::Rgb(80, 200, 120)).add_modifier(Modifier::BOLD)),
            Span::styled("q", key),
            Span::styled(" quit", text),
        ])
    } else if controller.has_pending_transition() {
        Line::from(vec![
            Span::styled(" Get ready… ", text),
            Span::styled("Esc", key),
            Span::styled(" quit", text),
        ])
    } else {
        Line::from(vec![
            Span::styled(" 0-9", key),
            Span::styled(" type  ", text),
            Span::styled("Backspace", key),
            Span::styled(" erase  ", text),
            Span::styled("Esc", key),
            Span::styled(" quit", text),
        ])
    };

    frame.render_widget(Paragraph::new(line), area);
}
