use super::{fg, format_metric, status_text, tone, FG, FG_FAINT, FG_SOFT, FRAME, HIGHLIGHT};
use crate::app::App;
use crate::speedtest::TestPhase;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};
use std::f64::consts::PI;

const ARC_POINTS: usize = 180;
/// The dial opens at the bottom: it sweeps 270 degrees clockwise from
/// lower-left to lower-right.
const ARC_START: f64 = 1.25 * PI;
const ARC_SWEEP: f64 = 1.5 * PI;

pub(super) fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([Constraint::Min(6), Constraint::Length(3)]).split(area);

    draw_dial(frame, chunks[0], app);
    draw_results(frame, chunks[1], app);
}

/// Which metric the dial shows, and how far along it is.
fn dial_reading(app: &App) -> (TestPhase, f64) {
    match app.phase() {
        TestPhase::Idle => (TestPhase::Idle, 0.0),
        TestPhase::Complete => (TestPhase::Download, 1.0),
        phase => (phase, app.session.progress(phase)),
    }
}

fn draw_dial(frame: &mut Frame, area: Rect, app: &App) {
    if area.width < 8 || area.height < 4 {
        return;
    }

    // Terminal cells are about twice as tall as wide.
    let side = area.height.min(area.width / 2);
    let dial = Rect {
        x: area.x + (area.width - side * 2) / 2,
        y: area.y + (area.height - side) / 2,
        width: side * 2,
        height: side,
    };

    let (phase, progress) = dial_reading(app);
    let color = tone(phase).lit;
    let (track, filled) = arc_points(progress);

    let canvas = Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([-1.1, 1.1])
        .y_bounds([-1.1, 1.1])
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &track,
                color: FRAME,
            });
            ctx.draw(&Points {
                coords: &filled,
                color,
            });
        });
    frame.render_widget(canvas, dial);

    let center = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Fill(1),
    ])
    .split(dial)[1];
    frame.render_widget(
        Paragraph::new(dial_text(app, phase)).alignment(Alignment::Center),
        center,
    );
}

fn dial_text(app: &App, phase: TestPhase) -> Vec<Line<'static>> {
    let value_style = fg(FG).add_modifier(Modifier::BOLD);
    let muted = fg(FG_FAINT);

    match app.phase() {
        TestPhase::Idle => vec![
            Line::from(Span::styled("GO", fg(HIGHLIGHT).add_modifier(Modifier::BOLD))),
            Line::from(Span::styled("press enter", muted)),
        ],
        TestPhase::Complete => vec![
            Line::from(Span::styled(
                format!("{:.1}", app.session.result().download_mbps),
                value_style,
            )),
            Line::from(Span::styled("Mbps", muted)),
            Line::from(Span::styled("enter test again", fg(HIGHLIGHT))),
        ],
        _ => {
            let value = app.session.result().metric(phase);
            let number = match phase {
                TestPhase::Ping => format!("{:.0}", value),
                _ => format!("{:.1}", value),
            };
            let (status, color) = status_text(phase);
            vec![
                Line::from(Span::styled(number, value_style)),
                Line::from(Span::styled(phase.unit(), muted)),
                Line::from(Span::styled(status, fg(color))),
            ]
        }
    }
}

/// Points for the dial track and the filled part of it.
fn arc_points(progress: f64) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let progress = progress.clamp(0.0, 1.0);
    let mut track = Vec::with_capacity(ARC_POINTS + 1);
    let mut filled = Vec::new();

    for i in 0..=ARC_POINTS {
        let t = i as f64 / ARC_POINTS as f64;
        let angle = ARC_START - ARC_SWEEP * t;
        let point = (angle.cos(), angle.sin());
        if progress > 0.0 && t <= progress {
            filled.push(point);
        } else {
            track.push(point);
        }
    }

    (track, filled)
}

fn draw_results(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(area);

    for (phase, rect) in TestPhase::MEASURED.into_iter().zip(columns.iter()) {
        draw_result_card(frame, *rect, app, phase);
    }
}

fn draw_result_card(frame: &mut Frame, area: Rect, app: &App, phase: TestPhase) {
    let color = tone(phase).lit;
    let active = app.phase() == phase;
    let label = match phase {
        TestPhase::Ping => "Ping",
        TestPhase::Download => "Download",
        _ => "Upload",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(fg(if active { color } else { FRAME }));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let value = app.session.result().metric(phase);
    let line = Line::from(vec![
        Span::styled(format!("{label} "), fg(FG_SOFT)),
        Span::styled(format_metric(phase, value), fg(value_color(active))),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), inner);
}

fn value_color(active: bool) -> Color {
    if active {
        FG
    } else {
        FG_SOFT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_fill_follows_progress() {
        let (track, filled) = arc_points(0.0);
        assert!(filled.is_empty());
        assert_eq!(track.len(), ARC_POINTS + 1);

        let (track, filled) = arc_points(0.5);
        assert_eq!(filled.len(), ARC_POINTS / 2 + 1);
        assert_eq!(track.len() + filled.len(), ARC_POINTS + 1);

        let (track, filled) = arc_points(1.0);
        assert!(track.is_empty());
        assert_eq!(filled.len(), ARC_POINTS + 1);
    }

    #[test]
    fn arc_starts_lower_left_and_ends_lower_right() {
        let (_, filled) = arc_points(1.0);
        let (first, last) = (filled[0], filled[filled.len() - 1]);
        assert!(first.0 < 0.0 && first.1 < 0.0);
        assert!(last.0 > 0.0 && last.1 < 0.0);
    }
}
