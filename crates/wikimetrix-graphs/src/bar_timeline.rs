//! Bars per bucket, e.g. edits per month

use crate::renderer::{background_color, parse_color, series_color, text_color, text_style, y_axis_top};
use crate::{GraphConfig, GraphRenderer};
use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::prelude::*;
use wikimetrix_common::Result;

#[derive(Debug, Clone)]
pub struct BarTimelineGraph {
    pub name: String,
    /// One bar per point, in order
    pub points: Vec<(NaiveDate, u64)>,
    /// `strftime` format of the bucket labels
    pub label_format: String,
}

impl BarTimelineGraph {
    pub fn new(name: impl Into<String>, points: Vec<(NaiveDate, u64)>) -> Self {
        Self {
            name: name.into(),
            points,
            label_format: "%Y-%m".to_string(),
        }
    }

    pub fn with_label_format(mut self, format: impl Into<String>) -> Self {
        self.label_format = format.into();
        self
    }

    fn bucket_label(&self, index: u32) -> String {
        self.points
            .get(index as usize)
            .map(|(date, _)| date.format(&self.label_format).to_string())
            .unwrap_or_default()
    }
}

impl GraphRenderer for BarTimelineGraph {
    fn name(&self) -> &'static str {
        "bar timeline"
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, config: &GraphConfig) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let buckets = self.points.len() as u32;
        let max = self.points.iter().map(|(_, value)| *value).max().unwrap_or(0);

        root.fill(&background_color(config))?;
        let text = text_color(config);
        let style = &config.style;

        let mut chart = ChartBuilder::on(root)
            .caption(&config.title, text_style(&style.title_font, &text))
            .margin(style.margins.top)
            .x_label_area_size(style.margins.bottom)
            .y_label_area_size(style.margins.left)
            .build_cartesian_2d((0u32..buckets).into_segmented(), 0f64..y_axis_top(max))?;

        let x_formatter = |segment: &SegmentValue<u32>| match segment {
            SegmentValue::Exact(index) | SegmentValue::CenterOf(index) => self.bucket_label(*index),
            SegmentValue::Last => String::new(),
        };
        let y_formatter = |y: &f64| format!("{y:.0}");

        let mut mesh = chart.configure_mesh();
        mesh.x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .x_labels(self.points.len().min(12))
            .label_style(text_style(&style.axis_font, &text))
            .axis_style(text)
            .disable_x_mesh();
        if let Some(x_label) = &config.x_label {
            mesh.x_desc(x_label.as_str());
        }
        if let Some(y_label) = &config.y_label {
            mesh.y_desc(y_label.as_str());
        }
        if let Some(grid_color) = &style.grid.color {
            mesh.light_line_style(parse_color(grid_color));
        }
        if !style.grid.show_y {
            mesh.disable_y_mesh();
        }
        mesh.draw()?;

        let color = series_color(config, 0);
        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(color.filled())
                    .margin(4)
                    .data(
                        self.points
                            .iter()
                            .enumerate()
                            .map(|(index, (_, value))| (index as u32, *value as f64)),
                    ),
            )?
            .label(self.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

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
