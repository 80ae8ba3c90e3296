mod app;
mod data;
mod event;
mod settings;
mod themes;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

pub use app::TuiConfig;

use app::App;
use event::{Event, EventHandler};

const TICK_RATE: Duration = Duration::from_millis(100);

pub fn run(config: TuiConfig) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config)?;
    let events = EventHandler::new(TICK_RATE);
    let result = run_loop(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    app.reload();
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;
        match events.next()? {
            Event::Tick => app.on_tick(),
            Event::Key(key) => app.handle_key_event(key),
            Event::Resize(width, height) => app.set_terminal_size(width, height),
        }
    }
    Ok(())
}
