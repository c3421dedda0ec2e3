//! Charts for wiki-metrix: page views and edits over time, rendered to PNG
//! or SVG with plotters

pub mod bar_timeline;
pub mod comparison;
pub mod renderer;
pub mod time_series;
pub mod types;

pub use bar_timeline::BarTimelineGraph;
pub use comparison::{ComparisonGraph, ComparisonSeries, ComparisonSummary};
pub use renderer::{is_svg_path, palette, parse_color, GraphRenderer};
pub use time_series::TimeSeriesGraph;
pub use types::*;
