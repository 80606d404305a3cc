mod card;
mod chart;
mod gauge;

use crate::app::{App, AppView};
use crate::settings::{SettingsField, Skin};
use crate::speedtest::TestPhase;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Bright and faded shade of one metric's color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tone {
    lit: Color,
    faded: Color,
}

const HIGHLIGHT: Color = Color::Rgb(108, 140, 245);
const FG: Color = Color::Rgb(228, 228, 232);
const FG_SOFT: Color = Color::Rgb(158, 158, 166);
const FG_FAINT: Color = Color::Rgb(98, 98, 106);
const FRAME: Color = Color::Rgb(58, 58, 66);
const FRAME_LIT: Color = Color::Rgb(104, 104, 118);

const LATENCY_TONE: Tone = Tone {
    lit: Color::Rgb(229, 192, 123),
    faded: Color::Rgb(118, 100, 72),
};
const DOWNLOAD_TONE: Tone = Tone {
    lit: Color::Rgb(126, 204, 160),
    faded: Color::Rgb(72, 116, 94),
};
const UPLOAD_TONE: Tone = Tone {
    lit: Color::Rgb(136, 172, 232),
    faded: Color::Rgb(82, 102, 140),
};
const IDLE_TONE: Tone = Tone {
    lit: HIGHLIGHT,
    faded: FRAME,
};

/// Shown in place of a metric that has no value yet.
const EMPTY: &str = "—";

pub fn draw_ui(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.view == AppView::Settings {
        draw_settings_view(frame, area, app);
        return;
    }

    let rows = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(area);

    draw_header(frame, rows[0], app.phase());
    match app.settings.skin {
        Skin::Card => card::draw(frame, rows[1], app),
        Skin::Gauge => gauge::draw(frame, rows[1], app),
    }
    draw_footer(frame, rows[2], app);
    draw_help(frame, rows[3], app);
}

fn fg(color: Color) -> Style {
    Style::default().fg(color)
}

fn tone(phase: TestPhase) -> Tone {
    match phase {
        TestPhase::Ping => LATENCY_TONE,
        TestPhase::Download => DOWNLOAD_TONE,
        TestPhase::Upload => UPLOAD_TONE,
        TestPhase::Idle | TestPhase::Complete => IDLE_TONE,
    }
}

fn status_text(phase: TestPhase) -> (&'static str, Color) {
    let text = match phase {
        TestPhase::Idle => return ("Ready", FG_FAINT),
        TestPhase::Ping => "Measuring latency...",
        TestPhase::Download => "Testing download...",
        TestPhase::Upload => "Testing upload...",
        TestPhase::Complete => "Complete",
    };
    (text, tone(phase).lit)
}

fn draw_header(frame: &mut Frame, area: Rect, phase: TestPhase) {
    let (status, color) = status_text(phase);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(fg(FRAME))
        .title(Line::from(Span::styled(" fauxspeed ", fg(FG).add_modifier(Modifier::BOLD))))
        .title(phase_trail(phase).alignment(Alignment::Right));

    frame.render_widget(
        Paragraph::new(Span::styled(status, fg(color)))
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

/// `ping › down › up`, with finished steps softened and the live one lit.
fn phase_trail(phase: TestPhase) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (i, step) in TestPhase::MEASURED.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" › ", fg(FG_FAINT)));
        }
        let style = if phase == step {
            fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
        } else if phase.is_after(step) {
            fg(FG_SOFT)
        } else {
            fg(FG_FAINT)
        };
        let label = match step {
            TestPhase::Ping => "ping",
            TestPhase::Download => "down",
            _ => "up",
        };
        spans.push(Span::styled(label, style));
    }
    spans.push(Span::raw(" "));
    Line::from(spans)
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let footer = Line::from(vec![
        Span::styled("Your IP: ", fg(FG_FAINT)),
        Span::styled(app.settings.client_address.as_str(), fg(FG_SOFT)),
        Span::styled("  ·  ", fg(FG_FAINT)),
        Span::styled("Server: ", fg(FG_FAINT)),
        Span::styled(app.settings.server_label.as_str(), fg(FG_SOFT)),
    ]);
    frame.render_widget(Paragraph::new(footer).alignment(Alignment::Center), area);
}

fn help_text(app: &App) -> &'static str {
    if app.expanded && app.settings.skin == Skin::Card {
        return "esc close · q quit";
    }
    match app.phase() {
        TestPhase::Idle => "enter start · s settings · v skin · tab select · q quit",
        TestPhase::Complete => "enter test again · r reset · s settings · v skin · q quit",
        _ => "tab select · space expand · v skin · esc cancel · q quit",
    }
}

fn draw_help(frame: &mut Frame, area: Rect, app: &App) {
    frame.render_widget(
        Paragraph::new(help_text(app))
            .style(fg(FG_FAINT))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_settings_view(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::vertical([Constraint::Min(6), Constraint::Length(1)]).split(area);
    let settings = &app.settings;
    let applied = app.session.timing();

    let fields = [
        (SettingsField::TickInterval, "Tick interval", format!("{} ms", settings.tick_interval_ms)),
        (SettingsField::StartDelay, "Start delay", format!("{} ms", settings.start_delay_ms)),
        (SettingsField::Skin, "Skin", settings.skin.label().to_string()),
    ];

    let mut lines = vec![Line::default()];
    for (field, label, value) in fields {
        lines.push(setting_line(label, value, app.selected_setting == field));
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        format!(
            "   in use: {} ms ticks after a {} ms start delay",
            applied.tick_interval.as_millis(),
            applied.start_delay.as_millis()
        ),
        fg(FG_FAINT),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(fg(FRAME))
        .title(Span::styled(" Settings ", fg(FG).add_modifier(Modifier::BOLD)));
    frame.render_widget(Paragraph::new(lines).block(block), rows[0]);

    frame.render_widget(
        Paragraph::new("↑↓ select · ←→ adjust · enter done")
            .style(fg(FG_FAINT))
            .alignment(Alignment::Center),
        rows[1],
    );
}

fn setting_line(label: &'static str, value: String, selected: bool) -> Line<'static> {
    let (marker, label_color, value_text, value_color) = if selected {
        ("›", HIGHLIGHT, format!("< {value} >"), FG)
    } else {
        (" ", FG_SOFT, value, FG_FAINT)
    };
    Line::from(vec![
        Span::styled(format!(" {marker} {label:<16}"), fg(label_color)),
        Span::styled(value_text, fg(value_color)),
    ])
}

pub(crate) fn format_metric(phase: TestPhase, value: f64) -> String {
    match phase {
        TestPhase::Ping => format_ping(value),
        _ => format_speed(value),
    }
}

pub fn format_ping(ms: f64) -> String {
    if ms > 0.0 {
        format!("{ms:.0} ms")
    } else {
        EMPTY.to_string()
    }
}

pub fn format_speed(mbps: f64) -> String {
    match mbps {
        v if v.is_nan() || v <= 0.0 => EMPTY.to_string(),
        v if v < 1.0 => format!("{:.0} Kbps", v * 1000.0),
        v if v < 1000.0 => format!("{v:.1} Mbps"),
        v => format!("{:.1} Gbps", v / 1000.0),
    }
}
