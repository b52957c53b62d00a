use std::fmt::Display;

use clap::ValueEnum;

use crate::analytics::buckets::ChartSeries;

/// Width of the longest bar.
const BAR_WIDTH: usize = 32;
const BAR: &str = "█";
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartStyle {
    Bar,
    Line,
}

impl Display for ChartStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartStyle::Bar => write!(f, "bar"),
            ChartStyle::Line => write!(f, "line"),
        }
    }
}

pub fn render(series: &ChartSeries, style: ChartStyle) -> Vec<String> {
    match style {
        ChartStyle::Bar => render_bars(series),
        ChartStyle::Line => render_line(series),
    }
}

/// A row per bucket with a bar scaled to the largest count.
pub fn render_bars(series: &ChartSeries) -> Vec<String> {
    let label_width = series.labels.iter().map(|v| v.chars().count()).max().unwrap_or(0);
    let count_width = series.max().to_string().len();
    let max = series.max().max(1);

    series
        .iter()
        .map(|(label, count)| {
            let width = (count as f64 / max as f64 * BAR_WIDTH as f64).round() as usize;
            // Non-zero counts always get at least one block.
            let width = if count > 0 { width.max(1) } else { 0 };
            format!(
                "{label:<label_width$} {count:>count_width$} {}",
                BAR.repeat(width)
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

/// A sparkline of the counts followed by the first and last label.
pub fn render_line(series: &ChartSeries) -> Vec<String> {
    let Some((first, last)) = series.labels.first().zip(series.labels.last()) else {
        return vec![];
    };
    let max = series.max().max(1);
    let line = series
        .counts
        .iter()
        .map(|&count| {
            let index = (count * (SPARKS.len() - 1) + max / 2) / max;
            SPARKS[index.min(SPARKS.len() - 1)]
        })
        .collect::<String>();

    vec![
        line,
        format!("{first} .. {last} (max {})", series.max()),
    ]
}
