//! Line chart of one metric over a date axis

use crate::renderer::{
    background_color, parse_color, series_color, text_color, text_style, y_axis_top, DateAxis,
};
use crate::{GraphConfig, GraphRenderer};
use chrono::{Datelike, NaiveDate, Weekday};
use plotters::coord::Shift;
use plotters::prelude::*;
use wikimetrix_common::{MetrixError, Result};

const WEEKEND_COLOR: RGBColor = RGBColor(255, 165, 0);

/// Daily or monthly values of one article, e.g. page views
#[derive(Debug, Clone)]
pub struct TimeSeriesGraph {
    /// Legend entry of the line
    pub name: String,
    pub points: Vec<(NaiveDate, u64)>,
    /// Daily points get day labels and weekend markers
    pub daily: bool,
}

impl TimeSeriesGraph {
    pub fn daily(name: impl Into<String>, points: Vec<(NaiveDate, u64)>) -> Self {
        Self {
            name: name.into(),
            points,
            daily: true,
        }
    }

    pub fn monthly(name: impl Into<String>, points: Vec<(NaiveDate, u64)>) -> Self {
        Self {
            name: name.into(),
            points,
            daily: false,
        }
    }

    fn weekend_points(&self) -> Vec<(NaiveDate, u64)> {
        self.points
            .iter()
            .filter(|(date, _)| matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
            .copied()
            .collect()
    }
}

impl GraphRenderer for TimeSeriesGraph {
    fn name(&self) -> &'static str {
        "time series"
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, config: &GraphConfig) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let Some(axis) = DateAxis::covering(self.points.iter().map(|(date, _)| *date)) else {
            return Err(MetrixError::graph("No data to render"));
        };
        let max = self.points.iter().map(|(_, value)| *value).max().unwrap_or(0);

        root.fill(&background_color(config))?;
        let text = text_color(config);
        let style = &config.style;

        let mut chart = ChartBuilder::on(root)
            .caption(&config.title, text_style(&style.title_font, &text))
            .margin(style.margins.top)
            .x_label_area_size(style.margins.bottom)
            .y_label_area_size(style.margins.left)
            .build_cartesian_2d(0f64..axis.span, 0f64..y_axis_top(max))?;

        let date_format = if self.daily { "%Y-%m-%d" } else { "%Y-%m" };
        let x_formatter = |x: &f64| axis.label(*x, date_format);
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

        let color = series_color(config, 0);
        let plot_data: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|(date, value)| (axis.offset(*date), *value as f64))
            .collect();

        chart
            .draw_series(LineSeries::new(plot_data.iter().copied(), color.stroke_width(2)))?
            .label(self.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        if !self.daily || plot_data.len() == 1 {
            chart.draw_series(
                plot_data
                    .iter()
                    .map(|point| Circle::new(*point, 3, color.filled())),
            )?;
        }

        if self.daily && style.highlight_weekends {
            let weekends = self.weekend_points();
            if !weekends.is_empty() {
                chart
                    .draw_series(weekends.iter().map(|(date, value)| {
                        Circle::new((axis.offset(*date), *value as f64), 3, WEEKEND_COLOR.filled())
                    }))?
                    .label("Weekends")
                    .legend(|(x, y)| Circle::new((x + 10, y), 3, WEEKEND_COLOR.filled()));
            }
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

#[cfg(test)]
mod tests {
    use super::*;
    use wikimetrix_common::test_utils::mock_date;

    #[test]
    fn test_weekend_points() {
        // 2024-01-05 is a Friday
        let points: Vec<(NaiveDate, u64)> = (5..=8).map(|day| (mock_date(2024, 1, day), u64::from(day))).collect();
        let graph = TimeSeriesGraph::daily("views", points);
        assert_eq!(
            graph.weekend_points(),
            vec![(mock_date(2024, 1, 6), 6), (mock_date(2024, 1, 7), 7)]
        );
    }

    #[test]
    fn test_empty_graph_is_rejected() {
        let graph = TimeSeriesGraph::daily("views", Vec::new());
        let error = graph.render_to_svg_string(&GraphConfig::default()).unwrap_err();
        assert!(error.to_string().contains("No data to render"));
    }
}
