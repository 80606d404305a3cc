use super::{fg, Tone, FG_FAINT, FRAME};
use crate::speedtest::tuning::MetricRamp;
use ratatui::{
    layout::Rect,
    symbols,
    text::Span,
    widgets::{Axis, Chart, Dataset, GraphType},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

pub(super) fn summarize(data: &[f64]) -> Option<SeriesStats> {
    let (min, max, sum) = data.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
    );
    if data.is_empty() {
        return None;
    }
    Some(SeriesStats {
        min,
        max,
        mean: sum / data.len() as f64,
    })
}

/// Top of the y axis: the highest value a snap can land on.
pub(super) fn ceiling(ramp: &MetricRamp) -> f64 {
    ramp.threshold + ramp.snap_span
}

/// Plots `samples` against the ramp's threshold line.
///
/// Every chart of a metric shares the same fixed scale, so a half-full line
/// reads as half-way there. Passing a `unit` adds axis labels.
pub(super) fn draw_ramp(
    frame: &mut Frame,
    area: Rect,
    samples: &[f64],
    ramp: &MetricRamp,
    tone: Tone,
    unit: Option<&str>,
) {
    let min_width = if unit.is_some() { 10 } else { 4 };
    if samples.is_empty() || area.width < min_width || area.height < 2 {
        return;
    }

    let right = (samples.len().saturating_sub(1) as f64).max(1.0);
    let top = ceiling(ramp);
    let points: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();
    let target = [(0.0, ramp.threshold), (right, ramp.threshold)];

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(fg(tone.faded))
            .data(&target),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(fg(tone.lit))
            .data(&points),
    ];

    let mut x_axis = Axis::default().bounds([0.0, right]);
    let mut y_axis = Axis::default().bounds([0.0, top]);
    if let Some(unit) = unit {
        x_axis = x_axis.style(fg(FRAME));
        y_axis = y_axis.style(fg(FRAME)).labels(vec![
            Span::styled("0", fg(FG_FAINT)),
            Span::styled(format!("{top:.0} {unit}"), fg(FG_FAINT)),
        ]);
    }

    frame.render_widget(Chart::new(datasets).x_axis(x_axis).y_axis(y_axis), area);
}
