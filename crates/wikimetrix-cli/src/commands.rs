//! Subcommand implementations

use crate::args::{CompareArgs, Command, PageviewsArgs, RangeArgs, RevisionsArgs, StatsArgs};
use crate::output::{resolve_plot_path, write_table};
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use tracing::{info, instrument, warn};
use wikimetrix_api::{ClientConfig, WikiApi};
use wikimetrix_common::{AccessType, AgentType, ArticleRequest, Bucket, DateRange, Granularity, Project, SelectionMethod};
use wikimetrix_config::{ApiConfig, Config, GraphSettings};
use wikimetrix_graphs::{BarTimelineGraph, ComparisonGraph, GraphConfig, GraphRenderer, Theme, TimeSeriesGraph};
use wikimetrix_stats::{
    build_stats_table, collect_page_stats, daily_pageviews, monthly_pageviews, revision_activity, select_cases,
    wide_table, SelectionOptions, TimeSeries,
};

/// Run one subcommand to completion
pub async fn run(command: &Command, config: &Config, api: &dyn WikiApi, progress: bool) -> Result<()> {
    match command {
        Command::Stats(args) => stats(args, config, api, progress).await,
        Command::Pageviews(args) => pageviews(args, config, api).await,
        Command::Revisions(args) => revisions(args, config, api).await,
        Command::Compare(args) => compare(args, config, api, progress).await,
    }
}

/// HTTP client settings from the `[api]` section
pub fn client_config(api: &ApiConfig) -> ClientConfig {
    ClientConfig {
        user_agent: api.user_agent.clone(),
        timeout_secs: api.timeout_secs,
        max_idle_per_host: api.max_idle_per_host,
        rate_limit_per_sec: api.rate_limit_per_sec,
        action_api_max_pages: api.action_api_max_pages,
        wikidata_rest_base: api.wikidata_rest_base.clone(),
        pageviews_rest_base: api.pageviews_rest_base.clone(),
        action_api_endpoint: None,
    }
}

/// Graph settings from the `[graph]` section; a theme replaces its colors
pub fn graph_config(
    settings: &GraphSettings,
    title: impl Into<String>,
    x_label: &str,
    y_label: &str,
    theme: Option<Theme>,
) -> GraphConfig {
    let config = GraphConfig::new(title)
        .with_labels(x_label, y_label)
        .with_dimensions(settings.width, settings.height)
        .with_primary_color(&settings.primary_color)
        .with_background_color(&settings.background_color)
        .with_weekend_highlights(settings.highlight_weekends);
    match theme {
        Some(theme) => config.with_theme(theme),
        None => config,
    }
}

fn date_range(range: &RangeArgs) -> Result<DateRange> {
    Ok(DateRange::new(range.start, range.end)?)
}

fn render(graph: &impl GraphRenderer, graph_config: &GraphConfig, path: &Path, config: &Config) -> Result<()> {
    let path = resolve_plot_path(path, config);
    graph
        .render_to_file(graph_config, &path)
        .with_context(|| format!("Failed to render plot {}", path.display()))
}

fn log_summary(article: &str, series: &TimeSeries) {
    info!(
        article,
        metric = %series.metric,
        total = series.total(),
        max = series.max().unwrap_or(0),
        mean = series.mean().unwrap_or(0.0),
        "Series summary"
    );
}

#[instrument(skip_all)]
async fn stats(args: &StatsArgs, config: &Config, api: &dyn WikiApi, progress: bool) -> Result<()> {
    let (method, selection) = args.selection();
    let options = SelectionOptions::new(args.site.project(config))
        .with_input_column(args.column.as_deref().unwrap_or(&config.selection.input_column))
        .with_recursive(args.recursive || config.selection.recursive_categories)
        .with_progress(progress);

    let selection = select_cases(api, method, selection, &options).await?;
    let today = Utc::now().date_naive();
    let stats = collect_page_stats(api, &selection.cases, progress, today).await?;
    let table = build_stats_table(stats, &selection)?;

    write_table(&table, args.output.as_deref(), config)?;
    info!("Collected statistics for {} cases", selection.cases.len());
    Ok(())
}

#[instrument(skip_all, fields(article = %args.article))]
async fn pageviews(args: &PageviewsArgs, config: &Config, api: &dyn WikiApi) -> Result<()> {
    let project = args.site.project(config);
    let request = ArticleRequest::new(&args.article, project.clone(), date_range(&args.range)?)?;

    let series = match args.granularity {
        Granularity::Daily => daily_pageviews(api, &request, args.access, args.agent).await?,
        Granularity::Monthly => monthly_pageviews(api, &request, args.access, args.agent).await?,
    };
    log_summary(&args.article, &series);
    write_table(&series.to_table(), args.output.as_deref(), config)?;

    if let Some(plot) = &args.plot.plot {
        let title = format!("Page views of {} ({})", args.article, project);
        let x_label = match args.granularity {
            Granularity::Daily => "Day",
            Granularity::Monthly => "Month",
        };
        let graph_config = graph_config(&config.graph, title, x_label, "Views", args.plot.theme);
        let graph = match args.granularity {
            Granularity::Daily => TimeSeriesGraph::daily(&args.article, series.as_pairs()),
            Granularity::Monthly => TimeSeriesGraph::monthly(&args.article, series.as_pairs()),
        };
        render(&graph, &graph_config, plot, config)?;
    }
    Ok(())
}

#[instrument(skip_all, fields(article = %args.article))]
async fn revisions(args: &RevisionsArgs, config: &Config, api: &dyn WikiApi) -> Result<()> {
    let project = args.site.project(config);
    let request = ArticleRequest::new(&args.article, project.clone(), date_range(&args.range)?)?;

    let series = revision_activity(api, &request, args.bucket).await?;
    log_summary(&args.article, &series);
    write_table(&series.to_table(), args.output.as_deref(), config)?;

    if let Some(plot) = &args.plot.plot {
        let title = format!("Edits of {} ({})", args.article, project);
        match args.bucket {
            Bucket::Day => {
                let graph_config = graph_config(&config.graph, title, "Day", "Edits", args.plot.theme);
                let graph = TimeSeriesGraph::daily(&args.article, series.as_pairs());
                render(&graph, &graph_config, plot, config)?;
            }
            Bucket::Month => {
                let graph_config = graph_config(&config.graph, title, "Month", "Edits", args.plot.theme);
                let graph = BarTimelineGraph::new(&args.article, series.as_pairs());
                render(&graph, &graph_config, plot, config)?;
            }
        }
    }
    Ok(())
}

/// Labels and projects of the compared articles
async fn compare_targets(
    args: &CompareArgs,
    project: &Project,
    api: &dyn WikiApi,
    progress: bool,
) -> Result<Vec<(String, Project, String)>> {
    if !args.langlinks {
        return Ok(args
            .articles
            .iter()
            .map(|article| (article.clone(), project.clone(), article.clone()))
            .collect());
    }

    let [article] = args.articles.as_slice() else {
        anyhow::bail!("--langlinks compares the language editions of exactly one article");
    };
    let options = SelectionOptions::new(project.clone()).with_progress(progress);
    let selection = select_cases(api, SelectionMethod::Langlinks, article, &options).await?;
    Ok(selection
        .cases
        .into_iter()
        .filter_map(|case| {
            let target = case.target?;
            Some((case.label, target.project, target.title))
        })
        .collect())
}

#[instrument(skip_all, fields(articles = args.articles.len()))]
async fn compare(args: &CompareArgs, config: &Config, api: &dyn WikiApi, progress: bool) -> Result<()> {
    let project = args.site.project(config);
    let range = date_range(&args.range)?;

    let mut series = Vec::new();
    for (label, project, title) in compare_targets(args, &project, api, progress).await? {
        let request = ArticleRequest::new(&title, project, range)?;
        let views = daily_pageviews(api, &request, AccessType::AllAccess, AgentType::User)
            .await
            .with_context(|| format!("Failed to fetch page views for '{label}'"))?;
        if views.total() == 0 {
            warn!("No page views for {label} in the requested range");
        }
        log_summary(&label, &views);
        series.push((label, views));
    }

    write_table(&wide_table(&series), args.output.as_deref(), config)?;

    let mut graph = ComparisonGraph::new();
    for (label, views) in &series {
        graph.add_series(label.as_str(), views.as_pairs());
    }
    let title = format!("Daily page views, {} to {}", range.start(), range.end());
    let graph_config = graph_config(&config.graph, title, "Day", "Views", args.theme);
    render(&graph, &graph_config, &args.plot, config)
}
