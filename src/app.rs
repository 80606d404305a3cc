use crate::settings::{Settings, SettingsField};
use crate::speedtest::{
    session::TestSession,
    timer::TimerTick,
    TestPhase,
};
use crate::ui::format_metric;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Main,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Ping,
    Download,
    Upload,
}

impl Panel {
    pub fn next(self) -> Self {
        match self {
            Panel::Ping => Panel::Download,
            Panel::Download => Panel::Upload,
            Panel::Upload => Panel::Ping,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Panel::Ping => Panel::Upload,
            Panel::Download => Panel::Ping,
            Panel::Upload => Panel::Download,
        }
    }

    pub fn phase(self) -> TestPhase {
        match self {
            Panel::Download => TestPhase::Download,
            Panel::Upload => TestPhase::Upload,
            Panel::Ping => TestPhase::Ping,
        }
    }
}

pub struct App {
    pub session: TestSession,
    pub should_quit: bool,

    // UI state
    pub view: AppView,
    pub selected_panel: Panel,
    pub expanded: bool,

    // Settings
    pub settings: Settings,
    pub selected_setting: SettingsField,
}

impl App {
    pub fn new(settings: Settings, tick_tx: mpsc::Sender<TimerTick>) -> Self {
        let session = TestSession::new(settings.tuning, settings.timing(), settings.seed, tick_tx);
        Self {
            session,
            should_quit: false,
            view: AppView::Main,
            selected_panel: Panel::Download,
            expanded: false,
            settings,
            selected_setting: SettingsField::TickInterval,
        }
    }

    pub fn phase(&self) -> TestPhase {
        self.session.phase()
    }

    pub fn handle_key_event(&mut self, key: event::KeyEvent) -> Option<AppAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match self.view {
            AppView::Main => self.handle_main_key(key),
            AppView::Settings => self.handle_settings_key(key),
        }
    }

    fn handle_main_key(&mut self, key: event::KeyEvent) -> Option<AppAction> {
        let running = self.session.is_running();
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Some(AppAction::Quit)
            }
            KeyCode::Char('s') => {
                if !running {
                    self.view = AppView::Settings;
                }
                None
            }
            KeyCode::Char('r') => Some(AppAction::ResetTest),
            KeyCode::Char('v') => {
                self.settings.skin = self.settings.skin.toggle();
                None
            }
            KeyCode::Enter => {
                if self.expanded {
                    self.expanded = false;
                    None
                } else if !running {
                    Some(AppAction::StartTest)
                } else {
                    // Expand current panel during test
                    self.expanded = true;
                    None
                }
            }
            KeyCode::Esc => {
                if self.expanded {
                    self.expanded = false;
                    None
                } else if running {
                    Some(AppAction::ResetTest)
                } else {
                    None
                }
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('j') => {
                if !self.expanded {
                    self.selected_panel = self.selected_panel.next();
                }
                None
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('k') => {
                if !self.expanded {
                    self.selected_panel = self.selected_panel.prev();
                }
                None
            }
            KeyCode::Char(' ') => {
                self.expanded = !self.expanded;
                None
            }
            _ => None,
        }
    }

    fn handle_settings_key(&mut self, key: event::KeyEvent) -> Option<AppAction> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => {
                self.close_settings();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_setting = self.selected_setting.prev();
                None
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.selected_setting = self.selected_setting.next();
                None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.settings.decrease(self.selected_setting);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.settings.increase(self.selected_setting);
                None
            }
            _ => None,
        }
    }

    fn close_settings(&mut self) {
        self.session.set_timing(self.settings.timing());
        self.view = AppView::Main;
    }

    pub fn perform(&mut self, action: AppAction) {
        match action {
            AppAction::Quit => self.should_quit = true,
            AppAction::StartTest => {
                self.expanded = false;
                self.session.start();
            }
            AppAction::ResetTest => {
                self.expanded = false;
                self.session.reset();
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    StartTest,
    ResetTest,
}

/// Runs one test without the UI, printing each phase to stdout as it finishes.
pub async fn run_plain(settings: Settings) -> Result<()> {
    let stdout = io::stdout();
    run_plain_to(settings, &mut stdout.lock()).await
}

pub async fn run_plain_to<W: Write>(settings: Settings, out: &mut W) -> Result<()> {
    let (tick_tx, mut tick_rx) = mpsc::channel(32);
    let mut session = TestSession::new(settings.tuning, settings.timing(), settings.seed, tick_tx);

    writeln!(out, "Testing against {} from {}", settings.server_label, settings.client_address)?;
    session.start();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while session.is_running() {
        tokio::select! {
            Some(tick) = tick_rx.recv() => {
                let before = session.phase();
                session.on_tick(tick);
                if session.phase() != before {
                    let value = format_metric(before, session.result().metric(before));
                    writeln!(out, "{:<10}{}", before.label(), value)?;
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                session.reset();
                writeln!(out, "cancelled")?;
                return Ok(());
            }
        }
    }

    let result = session.result();
    writeln!(
        out,
        "done: ping {} · down {} · up {}",
        format_metric(TestPhase::Ping, result.ping_ms),
        format_metric(TestPhase::Download, result.download_mbps),
        format_metric(TestPhase::Upload, result.upload_mbps)
    )?;
    Ok(())
}

pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
