//! Statistics built from Wikimedia data
//!
//! * zero-filled page-view and edit time series of one article
//! * per-article statistics tables for a selection of cases

pub mod page_stats;
pub mod selection;
pub mod table;
pub mod timeseries;

pub use page_stats::{fetch_page_stats, PageStats};
pub use selection::{select_cases, Case, Selection, SelectionOptions, Target};
pub use table::{build_stats_table, collect_page_stats, Table, META_COLUMNS};
pub use timeseries::{
    bucket_revisions, daily_pageviews, monthly_pageviews, revision_activity, wide_table, SeriesPoint, TimeSeries,
};
