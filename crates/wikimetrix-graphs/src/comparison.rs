//! Several named series on one date axis, e.g. one article across language
//! editions

use crate::renderer::{
    background_color, parse_color, series_color, text_color, text_style, y_axis_top, DateAxis,
};
use crate::{GraphConfig, GraphRenderer};
use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;
use wikimetrix_common::{MetrixError, Result};

/// A named line of a comparison
#[derive(Debug, Clone)]
pub struct ComparisonSeries {
    pub name: String,
    pub points: Vec<(NaiveDate, u64)>,
}

/// Summary figures of one series
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSummary {
    pub name: String,
    pub total: u64,
    pub peak: u64,
    pub average: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ComparisonGraph {
    pub series: Vec<ComparisonSeries>,
}

impl ComparisonGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_series(&mut self, name: impl Into<String>, points: Vec<(NaiveDate, u64)>) {
        self.series.push(ComparisonSeries {
            name: name.into(),
            points,
        });
    }

    pub fn with_series(mut self, name: impl Into<String>, points: Vec<(NaiveDate, u64)>) -> Self {
        self.add_series(name, points);
        self
    }

    /// Total, peak and average of every series, in series order
    pub fn summaries(&self) -> Vec<ComparisonSummary> {
        self.series
            .iter()
            .map(|s| {
                let total: u64 = s.points.iter().map(|(_, v)| v).sum();
                let peak = s.points.iter().map(|(_, v)| *v).max().unwrap_or(0);
                let average = if s.points.is_empty() {
                    0.0
                } else {
                    total as f64 / s.points.len() as f64
                };
                ComparisonSummary {
                    name: s.name.clone(),
                    total,
                    peak,
                    average,
                }
            })
            .collect()
    }
}

impl GraphRenderer for ComparisonGraph {
    fn name(&self) -> &'static str {
        "comparison"
    }

    fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, config: &GraphConfig) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let all_points = || self.series.iter().flat_map(|s| s.points.iter());
        let Some(axis) = DateAxis::covering(all_points().map(|(date, _)| *date)) else {
            return Err(MetrixError::graph("No data to render"));
        };
        let max = all_points().map(|(_, value)| *value).max().unwrap_or(0);

        root.fill(&background_color(config))?;
        let text = text_color(config);
        let style = &config.style;

        let mut chart = ChartBuilder::on(root)
            .caption(&config.title, text_style(&style.title_font, &text))
            .margin(style.margins.top)
            .x_label_area_size(style.margins.bottom)
            .y_label_area_size(style.margins.left)
            .build_cartesian_2d(0f64..axis.span, 0f64..y_axis_top(max))?;

        let x_formatter = |x: &f64| axis.label(*x, "%Y-%m-%d");
        let y_formatter = |y: &f64| format!("{y:.0}");

        let mut mesh = chart.configure_mesh();
        mesh.x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .x_labels(8)
            .label_style(text_style(&style.axis_font, &text))
            .axis_style(text);
        if let Some(x_label) = &config.x_label {
            mesh.x_desc(x_label.as_str());
        }
        if let Some(y_label) = &config.y_label {
            mesh.y_desc(y_label.as_str());
        }
        if let Some(grid_color) = &style.grid.color {
            mesh.light_line_style(parse_color(grid_color));
        }
        if !style.grid.show_x {
            mesh.disable_x_mesh();
        }
        if !style.grid.show_y {
            mesh.disable_y_mesh();
        }
        mesh.draw()?;

        for (index, series) in self.series.iter().enumerate() {
            if series.points.is_empty() {
                debug!(series = %series.name, "Skipping empty series");
                continue;
            }
            let color = series_color(config, index);
            let data: Vec<(f64, f64)> = series
                .points
                .iter()
                .map(|(date, value)| (axis.offset(*date), *value as f64))
                .collect();

            chart
                .draw_series(LineSeries::new(data, color.stroke_width(2)))?
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font(text_style(&style.axis_font, &text))
            .background_style(background_color(config).mix(0.8))
            .border_style(text)
            .draw()?;

        Ok(())
    }
}
