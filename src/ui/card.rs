use super::chart::{self, SeriesStats};
use super::{fg, format_metric, tone, Tone, FG, FG_FAINT, FG_SOFT, FRAME, FRAME_LIT};
use crate::app::{App, Panel};
use crate::speedtest::TestPhase;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

pub(super) fn draw(frame: &mut Frame, area: Rect, app: &App) {
    if app.expanded {
        draw_expanded(frame, area, app, app.selected_panel);
        return;
    }

    let columns = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    for (panel, rect) in [Panel::Ping, Panel::Download, Panel::Upload]
        .into_iter()
        .zip(columns.iter())
    {
        draw_panel(frame, *rect, app, panel);
    }
}

fn panel_title(panel: Panel) -> &'static str {
    match panel {
        Panel::Ping => "Latency",
        Panel::Download => "Download",
        Panel::Upload => "Upload",
    }
}

fn panel_block(panel: Panel, tone: Tone, lit: bool) -> Block<'static> {
    let (frame_color, title_color) = if lit { (FRAME_LIT, tone.lit) } else { (FRAME, FG_SOFT) };
    Block::default()
        .borders(Borders::ALL)
        .border_style(fg(frame_color))
        .title(Span::styled(format!(" {} ", panel_title(panel)), fg(title_color)))
}

fn draw_panel(frame: &mut Frame, area: Rect, app: &App, panel: Panel) {
    let phase = panel.phase();
    let tone = tone(phase);
    let block = panel_block(panel, tone, app.selected_panel == panel || app.phase() == phase);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .split(inner);

    let value = app.session.result().metric(phase);
    frame.render_widget(
        Paragraph::new(format_metric(phase, value))
            .style(fg(FG).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        rows[0],
    );
    draw_threshold_gauge(frame, rows[1], app.session.progress(phase), tone);

    if let Some(ramp) = app.session.tuning().ramp(phase) {
        chart::draw_ramp(frame, rows[2], app.session.samples(phase), ramp, tone, None);
    }
}

/// How far the metric is toward its threshold, as a one-row gauge.
fn draw_threshold_gauge(frame: &mut Frame, area: Rect, progress: f64, tone: Tone) {
    if area.width < 4 {
        return;
    }
    let area = Rect {
        x: area.x + 1,
        width: area.width - 2,
        ..area
    };
    frame.render_widget(
        Gauge::default()
            .gauge_style(fg(tone.lit).bg(tone.faded))
            .use_unicode(true)
            .ratio(progress.clamp(0.0, 1.0)),
        area,
    );
}

fn draw_expanded(frame: &mut Frame, area: Rect, app: &App, panel: Panel) {
    let phase = panel.phase();
    let tone = tone(phase);
    let samples = app.session.samples(phase);

    let block = panel_block(panel, tone, true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Min(4),
    ])
    .split(inner);

    let value = app.session.result().metric(phase);
    frame.render_widget(
        Paragraph::new(stats_line(phase, value, chart::summarize(samples)))
            .alignment(Alignment::Center),
        rows[0],
    );
    draw_threshold_gauge(frame, rows[1], app.session.progress(phase), tone);

    if let Some(ramp) = app.session.tuning().ramp(phase) {
        chart::draw_ramp(frame, rows[2], samples, ramp, tone, Some(phase.unit()));
    }
}

fn stats_line(phase: TestPhase, value: f64, stats: Option<SeriesStats>) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format_metric(phase, value),
        fg(FG).add_modifier(Modifier::BOLD),
    )];
    if let Some(stats) = stats {
        for (label, v) in [("avg", stats.mean), ("max", stats.max), ("min", stats.min)] {
            spans.push(Span::styled("  ·  ", fg(FG_FAINT)));
            spans.push(Span::styled(
                format!("{label} {}", format_metric(phase, v)),
                fg(FG_FAINT),
            ));
        }
    }
    Line::from(spans)
}
