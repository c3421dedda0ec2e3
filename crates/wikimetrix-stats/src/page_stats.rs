//! Statistics of a single article

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};
use wikimetrix_api::{CountedProp, WikiApi};
use wikimetrix_common::{
    format_timestamp_utc, AccessType, AgentType, ArticleRequest, DateRange, Granularity, Project, Result,
};

/// Statistics of one article, in table column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageStats {
    pub title: String,
    pub url: String,
    /// Size of the current revision in bytes
    pub length: u64,
    pub n_contributors: u64,
    pub n_revisions: u64,
    pub n_extlinks: u64,
    pub n_langlinks: u64,
    pub n_links: u64,
    pub n_linkshere: u64,
    pub n_categories: u64,
    pub pageviews_365d: u64,
    pub first_revision: Option<DateTime<Utc>>,
}

impl PageStats {
    pub const COLUMNS: [&'static str; 12] = [
        "title",
        "url",
        "length",
        "n_contributors",
        "n_revisions",
        "n_extlinks",
        "n_langlinks",
        "n_links",
        "n_linkshere",
        "n_categories",
        "pageviews_365d",
        "first_revision",
    ];

    /// Cells matching [`PageStats::COLUMNS`]
    pub fn cells(&self) -> Vec<Option<String>> {
        vec![
            Some(self.title.clone()),
            Some(self.url.clone()),
            Some(self.length.to_string()),
            Some(self.n_contributors.to_string()),
            Some(self.n_revisions.to_string()),
            Some(self.n_extlinks.to_string()),
            Some(self.n_langlinks.to_string()),
            Some(self.n_links.to_string()),
            Some(self.n_linkshere.to_string()),
            Some(self.n_categories.to_string()),
            Some(self.pageviews_365d.to_string()),
            self.first_revision.as_ref().map(format_timestamp_utc),
        ]
    }
}

const COUNTED: [(CountedProp, &str); 5] = [
    (CountedProp::ExtLinks, "n_extlinks"),
    (CountedProp::LangLinks, "n_langlinks"),
    (CountedProp::Links, "n_links"),
    (CountedProp::LinksHere, "n_linkshere"),
    (CountedProp::Categories, "n_categories"),
];

/// Collect the statistics of `title`, following a redirect.
///
/// `pageviews_365d` sums the monthly views of [`DateRange::trailing_year`].
#[instrument(skip(api), fields(project = %project))]
pub async fn fetch_page_stats(api: &dyn WikiApi, project: &Project, title: &str, today: NaiveDate) -> Result<PageStats> {
    let info = api.page_info(project, title).await?;
    if let Some(source) = &info.redirected_from {
        warn!("Page {} is a redirect to {}", source, info.title);
    }

    let history = api.revisions(project, &info.title, None).await?;
    if history.truncated {
        warn!(
            "Revision history of {} hit the listing limit; n_revisions and n_contributors are lower bounds",
            info.title
        );
    }
    let contributors: HashSet<&str> = history
        .revisions
        .iter()
        .filter_map(|revision| revision.user.as_deref())
        .collect();

    let mut counts = [0u64; COUNTED.len()];
    for (slot, (prop, field)) in counts.iter_mut().zip(COUNTED) {
        let count = api.count_prop(project, &info.title, prop).await?;
        if count.truncated {
            warn!("Value of {} for {} is at the listing limit", field, info.title);
        }
        *slot = count.count;
    }

    let request = ArticleRequest::new(info.title.clone(), project.clone(), DateRange::trailing_year(today))?;
    let pageviews_365d: u64 = api
        .fetch_pageviews(&request, Granularity::Monthly, AccessType::AllAccess, AgentType::User)
        .await?
        .iter()
        .map(|item| item.views_or_zero())
        .sum();

    let [n_extlinks, n_langlinks, n_links, n_linkshere, n_categories] = counts;
    let stats = PageStats {
        url: info.fullurl,
        length: info.length,
        n_contributors: contributors.len() as u64,
        n_revisions: history.revisions.len() as u64,
        n_extlinks,
        n_langlinks,
        n_links,
        n_linkshere,
        n_categories,
        pageviews_365d,
        first_revision: history.revisions.first().map(|revision| revision.timestamp),
        title: info.title,
    };
    debug!(title = %stats.title, revisions = stats.n_revisions, "Collected page statistics");
    Ok(stats)
}
