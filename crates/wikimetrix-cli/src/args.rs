//! Command line arguments

use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;
use wikimetrix_common::{parse_date, AccessType, AgentType, Bucket, Granularity, Project, SelectionMethod};
use wikimetrix_config::Config;
use wikimetrix_graphs::Theme;

/// Article metrics and time-series plots from Wikipedia and its sister projects
#[derive(Parser, Debug)]
#[command(name = "wikimetrix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level, overrides the configuration
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// No progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Statistics table for a selection of articles
    Stats(StatsArgs),

    /// Page views of one article over a date range
    Pageviews(PageviewsArgs),

    /// Edits of one article over a date range
    Revisions(RevisionsArgs),

    /// Daily page views of several articles in one chart
    Compare(CompareArgs),
}

/// Language edition and site family, defaulting to the configuration
#[derive(Args, Debug, Clone, Default)]
pub struct SiteArgs {
    /// Language code, e.g. `de`
    #[arg(short = 'L', long)]
    pub lang: Option<String>,

    /// Site family, e.g. `wikipedia`
    #[arg(short = 'S', long)]
    pub site: Option<String>,
}

impl SiteArgs {
    pub fn project(&self, config: &Config) -> Project {
        Project::new(
            self.lang.as_deref().unwrap_or(&config.site.lang),
            self.site.as_deref().unwrap_or(&config.site.family),
        )
    }
}

/// Inclusive date range, `YYYY-MM-DD` or `YYYYMMDD`
#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    #[arg(long, value_parser = parse_date)]
    pub start: NaiveDate,

    #[arg(long, value_parser = parse_date)]
    pub end: NaiveDate,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("selection_method")
        .required(true)
        .args(["langlinks", "category", "file"]),
))]
pub struct StatsArgs {
    /// Every language edition of this article
    #[arg(short = 'l', long, value_name = "ARTICLE")]
    pub langlinks: Option<String>,

    /// Every article of this category
    #[arg(short = 'c', long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Titles or Wikidata ids from a TSV file
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<String>,

    #[command(flatten)]
    pub site: SiteArgs,

    /// Column of the input file holding the cases
    #[arg(long, value_name = "NAME")]
    pub column: Option<String>,

    /// Include sub-categories
    #[arg(long)]
    pub recursive: bool,

    /// Output file; stdout when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl StatsArgs {
    /// The chosen method and its argument
    pub fn selection(&self) -> (SelectionMethod, &str) {
        match (&self.langlinks, &self.category, &self.file) {
            (Some(article), _, _) => (SelectionMethod::Langlinks, article.as_str()),
            (_, Some(category), _) => (SelectionMethod::Category, category.as_str()),
            (_, _, Some(file)) => (SelectionMethod::File, file.as_str()),
            (None, None, None) => unreachable!("clap requires one of --langlinks, --category or --file"),
        }
    }
}

/// Where plots go and how they look
#[derive(Args, Debug, Clone, Default)]
pub struct PlotArgs {
    /// Chart file; `.svg` renders SVG, anything else PNG
    #[arg(long, value_name = "FILE")]
    pub plot: Option<PathBuf>,

    /// light, dark or report
    #[arg(long)]
    pub theme: Option<Theme>,
}

#[derive(Args, Debug)]
pub struct PageviewsArgs {
    pub article: String,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub site: SiteArgs,

    /// daily or monthly
    #[arg(long, default_value = "daily")]
    pub granularity: Granularity,

    /// user, spider, automated or all-agents
    #[arg(long, default_value = "user")]
    pub agent: AgentType,

    /// all-access, desktop, mobile-app or mobile-web
    #[arg(long, default_value = "all-access")]
    pub access: AccessType,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub plot: PlotArgs,
}

#[derive(Args, Debug)]
pub struct RevisionsArgs {
    pub article: String,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub site: SiteArgs,

    /// day or month
    #[arg(long, default_value = "day")]
    pub bucket: Bucket,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub plot: PlotArgs,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[arg(required = true, num_args = 1..)]
    pub articles: Vec<String>,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub site: SiteArgs,

    /// Compare every language edition of the single given article
    #[arg(long)]
    pub langlinks: bool,

    /// Chart file; `.svg` renders SVG, anything else PNG
    #[arg(long, value_name = "FILE")]
    pub plot: PathBuf,

    /// light, dark or report
    #[arg(long)]
    pub theme: Option<Theme>,

    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
