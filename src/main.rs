mod app;
mod config;
mod controller;
mod error;
mod event;
mod input;
mod scheduler;
mod surface;
mod task;
mod ui;
mod view;

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Rect, Size};
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::App;
use config::{load_settings, Args, Settings};
use controller::Controller;
use event::{Event, EventHandler};
use surface::Canvas;
use view::View;

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env("NUMBERLINE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args)?;
    init_logging(&settings.log_file)?;
    match &settings.source {
        Some(path) => info!(path = %path.display(), "settings file loaded"),
        None => info!("no settings file, using defaults"),
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run(&mut terminal, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend>(terminal: &mut Terminal<B>, settings: &Settings) -> anyhow::Result<()> {
    let task = settings.task();
    let size = terminal.size()?;
    let container = ui::content_area(Rect::new(0, 0, size.width, size.height));
    let view = View::init(&task, Canvas::new(), Size::new(container.width, container.height));
    let controller = Controller::new(view, task, settings.stage_delay);
    info!(a = controller.task().a, b = controller.task().b, ?container, "session ready");

    let mut app = App::new(controller, Instant::now());
    let event_handler = EventHandler::new(settings.tick_rate);
    app.start(Instant::now());

    // Main loop
    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        match event_handler.next()? {
            Event::Tick => app.on_tick(Instant::now()),
            Event::Key(key) => app.on_key(key),
        }

        if app.should_quit {
            info!(solved = app.controller().is_solved(), "quitting");
            break;
        }
    }

    Ok(())
}
