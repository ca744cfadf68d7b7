pub mod raster;
pub mod status;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::input::{InputColor, InputField};
use crate::surface::{Align, PxRect, Surface, TextStyle, CELL_HEIGHT, CELL_WIDTH};
use raster::{Raster, BACKGROUND};

const FIELD_BG: Color = Color::Rgb(45, 45, 70);
const FIELD_TEXT: Color = Color::Rgb(240, 240, 250);
const FIELD_ERROR: Color = Color::Rgb(255, 80, 80);

fn chunks(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Stage bar
            Constraint::Min(0),    // Exercise
            Constraint::Length(1), // Key help
        ])
        .split(area)
}

fn exercise_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .style(Style::default().bg(BACKGROUND))
}

/// The cell area the canvas is sized to.
pub fn content_area(area: Rect) -> Rect {
    exercise_block().inner(chunks(area)[1])
}

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = chunks(frame.area());

    status::render_stages(frame, app, chunks[0]);
    render_exercise(frame, app, chunks[1]);
    status::render_help(frame, app, chunks[2]);
}

fn render_exercise(frame: &mut Frame, app: &App, area: Rect) {
    let block = exercise_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let controller = app.controller();
    let canvas = controller.view().surface();
    let (cols, rows) = (inner.width as usize, inner.height as usize);
    let mut raster = Raster::from_canvas(canvas, cols, rows);
    if let Some(input) = controller.input() {
        overlay_input(&mut raster, input);
    }

    let lines: Vec<Line> = raster
        .into_grid()
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|(ch, style)| Span::styled(ch.to_string(), style))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);

    if canvas.width() > i32::from(inner.width) * CELL_WIDTH
        || canvas.height() > i32::from(inner.height) * CELL_HEIGHT
    {
        let note = Paragraph::new(Line::from(Span::styled(
            " window shrank, enlarge it to see everything ",
            Style::default().fg(Color::Black).bg(Color::Rgb(255, 200, 80)),
        )));
        let note_area = Rect::new(inner.x, inner.y, inner.width.min(45), 1u16.min(inner.height));
        frame.render_widget(note, note_area);
    }
}

/// Draws the live text field on top of the canvas image.
fn overlay_input(raster: &mut Raster, input: &InputField) {
    let g = input.geometry();
    // One row tall, through the middle of the font box like the glyphs
    let field = PxRect::new(g.left, g.top + g.font_size / 2, g.width, 1);
    let mut look = Style::default().bg(FIELD_BG);
    if input.is_focused() {
        look = look.add_modifier(Modifier::UNDERLINED);
    }
    raster.cover(field, look);

    let fg = match input.color() {
        InputColor::Default => FIELD_TEXT,
        InputColor::Error => FIELD_ERROR,
    };
    let x = match g.align {
        Align::Left => g.left,
        Align::Center => g.left + g.width / 2,
    };
    raster.text(
        input.value(),
        x,
        g.top,
        TextStyle {
            font_size: g.font_size,
            align: g.align,
            color: fg,
        },
        Style::default().fg(fg).add_modifier(Modifier::BOLD),
    );
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::layout::Size;

    use super::*;
    use crate::controller::{Controller, STAGE_DELAY};
    use crate::surface::Canvas;
    use crate::task::Task;
    use crate::view::View;

    fn app_for(area: Rect, t0: Instant) -> App {
        let task = Task::new(3, 4);
        let container = content_area(area);
        let view = View::init(&task, Canvas::new(), Size::new(container.width, container.height));
        App::new(Controller::new(view, task, STAGE_DELAY), t0)
    }

    fn draw(terminal: &mut Terminal<TestBackend>, app: &App) -> Buffer {
        terminal.draw(|frame| render(frame, app)).expect("draw");
        terminal.backend().buffer().clone()
    }

    fn screen_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn content_area_leaves_room_for_the_bars() {
        let inner = content_area(Rect::new(0, 0, 90, 24));
        assert_eq!(inner, Rect::new(1, 4, 88, 18));
    }

    #[test]
    fn renders_the_unsolved_exercise() {
        let t0 = Instant::now();
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).expect("terminal");
        let mut app = app_for(Rect::new(0, 0, 90, 24), t0);
        app.start(t0);

        let text = screen_text(&draw(&mut terminal, &app));
        assert!(text.contains("Number Line"));
        assert!(text.contains("1 first"));
        assert!(text.contains('?'));
        assert!(text.contains('┼'));
    }

    #[test]
    fn wrong_entry_shows_in_the_error_colour() {
        let t0 = Instant::now();
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).expect("terminal");
        let mut app = app_for(Rect::new(0, 0, 90, 24), t0);
        app.start(t0);
        app.on_tick(t0 + STAGE_DELAY);
        app.on_key(KeyEvent::new(KeyCode::Char('5'), KeyModifiers::NONE));

        let buffer = draw(&mut terminal, &app);
        assert!(buffer
            .content()
            .iter()
            .any(|c| c.symbol() == "5" && c.fg == FIELD_ERROR && c.bg == FIELD_BG));
    }

    #[test]
    fn solved_exercise_has_no_placeholder() {
        let t0 = Instant::now();
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).expect("terminal");
        let mut app = app_for(Rect::new(0, 0, 90, 24), t0);
        app.start(t0);
        app.on_tick(t0 + STAGE_DELAY);
        app.on_key(KeyEvent::new(KeyCode::Char('3'), KeyModifiers::NONE));
        app.on_tick(t0 + STAGE_DELAY * 2);
        app.on_key(KeyEvent::new(KeyCode::Char('4'), KeyModifiers::NONE));
        app.on_tick(t0 + STAGE_DELAY * 3);
        app.on_key(KeyEvent::new(KeyCode::Char('7'), KeyModifiers::NONE));

        let text = screen_text(&draw(&mut terminal, &app));
        assert!(!text.contains('?'));
        assert!(text.contains("Well done"));
    }
}
