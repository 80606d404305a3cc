mod app;
mod config;
mod logging;
mod settings;
mod speedtest;
mod ui;

use anyhow::Result;
use app::{poll_event, run_plain, App, AppAction};
use clap::Parser;
use config::Cli;
use crossterm::event::Event;
use logging::LogTarget;
use ratatui::DefaultTerminal;
use settings::Settings;
use std::time::Duration;
use tokio::sync::mpsc;
use ui::draw_ui;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(LogTarget::select(cli.log_file.as_deref(), cli.plain))?;
    let settings = cli.settings()?;

    if cli.plain {
        return run_plain(settings).await;
    }

    let mut terminal = ratatui::init();
    terminal.clear()?;

    let result = run_app(&mut terminal, settings).await;

    ratatui::restore();
    result
}

async fn run_app(terminal: &mut DefaultTerminal, settings: Settings) -> Result<()> {
    let (tick_tx, mut tick_rx) = mpsc::channel(32);
    let mut app = App::new(settings, tick_tx);

    loop {
        terminal.draw(|frame| draw_ui(frame, &app))?;

        // Handle timer ticks
        while let Ok(tick) = tick_rx.try_recv() {
            app.session.on_tick(tick);
        }

        // Handle input
        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(30))? {
            match app.handle_key_event(key) {
                Some(AppAction::Quit) => break,
                Some(action) => app.perform(action),
                None => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    app.perform(AppAction::ResetTest);
    Ok(())
}
