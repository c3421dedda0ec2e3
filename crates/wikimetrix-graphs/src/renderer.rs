//! Graph rendering trait and shared drawing helpers

use crate::{ColorScheme, FontConfig, GraphConfig};
use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;
use wikimetrix_common::{MetrixError, Result};

/// A chart that can draw itself on any plotters backend
pub trait GraphRenderer {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Whether there is nothing to plot
    fn is_empty(&self) -> bool;

    /// Draw the chart, background included, onto `root`
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, config: &GraphConfig) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static;

    /// Render to `path`: SVG when the extension is `.svg`, PNG otherwise
    fn render_to_file(&self, config: &GraphConfig, path: &Path) -> Result<()> {
        if self.is_empty() {
            return Err(MetrixError::graph("No data to render"));
        }

        let size = (config.width, config.height);
        if is_svg_path(path) {
            let root = SVGBackend::new(path, size).into_drawing_area();
            self.draw(&root, config)?;
            root.present()?;
        } else {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            self.draw(&root, config)?;
            root.present()?;
        }

        info!("Successfully rendered {} graph to {}", self.name(), path.display());
        Ok(())
    }

    /// Render to an SVG document in memory
    fn render_to_svg_string(&self, config: &GraphConfig) -> Result<String> {
        if self.is_empty() {
            return Err(MetrixError::graph("No data to render"));
        }

        let mut buffer = String::new();
        {
            let root = SVGBackend::with_string(&mut buffer, (config.width, config.height)).into_drawing_area();
            self.draw(&root, config)?;
            root.present()?;
        }
        Ok(buffer)
    }
}

pub fn is_svg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Parse a `#rrggbb` color, falling back to black
pub fn parse_color(color_str: &str) -> RGBColor {
    if let Some(hex) = color_str.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return RGBColor(r, g, b);
            }
        }
    }
    RGBColor(0, 0, 0)
}

/// Colors of a scheme, in series order
pub fn palette(scheme: &ColorScheme) -> Vec<RGBColor> {
    match scheme {
        ColorScheme::Default => vec![
            RGBColor(31, 119, 180),  // Blue
            RGBColor(255, 127, 14),  // Orange
            RGBColor(44, 160, 44),   // Green
            RGBColor(214, 39, 40),   // Red
            RGBColor(148, 103, 189), // Purple
            RGBColor(140, 86, 75),   // Brown
            RGBColor(227, 119, 194), // Pink
            RGBColor(127, 127, 127), // Gray
        ],
        ColorScheme::Dark => vec![
            RGBColor(55, 126, 184),
            RGBColor(255, 152, 150),
            RGBColor(77, 175, 74),
            RGBColor(255, 187, 120),
            RGBColor(152, 78, 163),
        ],
        ColorScheme::Monochrome => vec![
            RGBColor(0, 0, 0),
            RGBColor(64, 64, 64),
            RGBColor(128, 128, 128),
            RGBColor(192, 192, 192),
        ],
        ColorScheme::Custom(colors) => colors.iter().map(|c| parse_color(c)).collect(),
    }
}

/// Color of the `index`-th series, cycling through the palette
pub fn series_color(config: &GraphConfig, index: usize) -> RGBColor {
    let colors = palette(&config.style.color_scheme);
    if colors.is_empty() {
        RGBColor(31, 119, 180)
    } else {
        colors[index % colors.len()]
    }
}

pub fn background_color(config: &GraphConfig) -> RGBColor {
    config
        .style
        .background_color
        .as_deref()
        .map(parse_color)
        .unwrap_or(RGBColor(255, 255, 255))
}

/// Readable text on the background: white on dark, black on light
pub fn text_color(config: &GraphConfig) -> RGBColor {
    let RGBColor(r, g, b) = background_color(config);
    let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    if luma < 128.0 {
        RGBColor(230, 230, 230)
    } else {
        RGBColor(0, 0, 0)
    }
}

/// Text style of a configured font in `color`
pub fn text_style<'a>(font: &'a FontConfig, color: &RGBColor) -> TextStyle<'a> {
    (font.family.as_str(), f64::from(font.size)).into_font().color(color)
}

/// Upper end of the value axis: 10% above the maximum, never below 1
pub fn y_axis_top(max: u64) -> f64 {
    (max as f64 * 1.1).max(1.0)
}

/// Maps a day offset on the x axis back to a calendar date
#[derive(Debug, Clone, Copy)]
pub struct DateAxis {
    pub origin: NaiveDate,
    /// Days between the first and last date, at least 1
    pub span: f64,
}

impl DateAxis {
    pub fn covering(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        let mut dates = dates.into_iter();
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self {
            origin: min,
            span: ((max - min).num_days() as f64).max(1.0),
        })
    }

    pub fn offset(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64
    }

    pub fn label(&self, offset: f64, format: &str) -> String {
        (self.origin + Duration::days(offset.round() as i64))
            .format(format)
            .to_string()
    }
}
