//! Page-view and edit time series of an article
//!
//! Every series is zero-filled: one point per day (or month) of the
//! requested range, ascending, whatever the API returned.

use crate::table::Table;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, instrument, warn};
use wikimetrix_api::{PageviewItem, Revision, WikiApi};
use wikimetrix_common::{
    first_of_month, AccessType, AgentType, ArticleRequest, Bucket, DateRange, Granularity, Result,
};

/// A single `(date, value)` observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: u64,
}

/// Values of one metric over time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    /// Column name of the values, e.g. `views` or `edits`
    pub metric: String,
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn new(metric: impl Into<String>, points: Vec<SeriesPoint>) -> Self {
        Self {
            metric: metric.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.points.iter().map(|p| p.value).sum()
    }

    pub fn max(&self) -> Option<u64> {
        self.points.iter().map(|p| p.value).max()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            None
        } else {
            Some(self.total() as f64 / self.points.len() as f64)
        }
    }

    /// `(date, value)` pairs for plotting
    pub fn as_pairs(&self) -> Vec<(NaiveDate, u64)> {
        self.points.iter().map(|p| (p.date, p.value)).collect()
    }

    /// Two columns: `date` and the metric
    pub fn to_table(&self) -> Table {
        Table {
            columns: vec!["date".to_string(), self.metric.clone()],
            rows: self
                .points
                .iter()
                .map(|p| vec![Some(p.date.to_string()), Some(p.value.to_string())])
                .collect(),
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W, separator: u8) -> Result<()> {
        self.to_table().write_delimited(writer, separator)
    }
}

/// A `date` column followed by one column per named series.
///
/// Dates missing from a series are written as zero.
pub fn wide_table(series: &[(String, TimeSeries)]) -> Table {
    let mut by_date: BTreeMap<NaiveDate, Vec<u64>> = BTreeMap::new();
    for (index, (_, s)) in series.iter().enumerate() {
        for point in &s.points {
            by_date.entry(point.date).or_insert_with(|| vec![0; series.len()])[index] += point.value;
        }
    }

    let mut columns = vec!["date".to_string()];
    columns.extend(series.iter().map(|(name, _)| name.clone()));
    Table {
        columns,
        rows: by_date
            .into_iter()
            .map(|(date, values)| {
                std::iter::once(Some(date.to_string()))
                    .chain(values.into_iter().map(|v| Some(v.to_string())))
                    .collect()
            })
            .collect(),
    }
}

/// One point per day of `range`; values outside the range are dropped and
/// values on the same day are summed
pub fn zero_fill_daily(range: &DateRange, values: impl IntoIterator<Item = (NaiveDate, u64)>) -> Vec<SeriesPoint> {
    let mut by_day: BTreeMap<NaiveDate, u64> = range.days().map(|day| (day, 0)).collect();
    for (date, value) in values {
        if let Some(slot) = by_day.get_mut(&date) {
            *slot += value;
        }
    }
    by_day
        .into_iter()
        .map(|(date, value)| SeriesPoint { date, value })
        .collect()
}

/// One point per month touched by `range`, dated to the first of the month
pub fn zero_fill_monthly(range: &DateRange, values: impl IntoIterator<Item = (NaiveDate, u64)>) -> Vec<SeriesPoint> {
    let mut by_month: BTreeMap<NaiveDate, u64> = range.months().into_iter().map(|month| (month, 0)).collect();
    for (date, value) in values {
        if let Some(slot) = by_month.get_mut(&first_of_month(date)) {
            *slot += value;
        }
    }
    by_month
        .into_iter()
        .map(|(date, value)| SeriesPoint { date, value })
        .collect()
}

fn item_values(items: &[PageviewItem]) -> Vec<(NaiveDate, u64)> {
    items
        .iter()
        .filter_map(|item| match item.date() {
            Ok(date) => Some((date, item.views_or_zero())),
            Err(e) => {
                warn!(timestamp = %item.timestamp, "Skipping page-view item: {}", e);
                None
            }
        })
        .collect()
}

/// Daily page views of an article, zero-filled over the request range
#[instrument(skip(api), fields(article = %request.title, project = %request.project))]
pub async fn daily_pageviews(
    api: &dyn WikiApi,
    request: &ArticleRequest,
    access: AccessType,
    agent: AgentType,
) -> Result<TimeSeries> {
    let items = api
        .fetch_pageviews(request, Granularity::Daily, access, agent)
        .await?;
    let points = zero_fill_daily(&request.range, item_values(&items));
    debug!("Built {} daily points from {} items", points.len(), items.len());
    Ok(TimeSeries::new("views", points))
}

/// Monthly page views of an article, one point per month of the range
#[instrument(skip(api), fields(article = %request.title, project = %request.project))]
pub async fn monthly_pageviews(
    api: &dyn WikiApi,
    request: &ArticleRequest,
    access: AccessType,
    agent: AgentType,
) -> Result<TimeSeries> {
    let items = api
        .fetch_pageviews(request, Granularity::Monthly, access, agent)
        .await?;
    let points = zero_fill_monthly(&request.range, item_values(&items));
    debug!("Built {} monthly points from {} items", points.len(), items.len());
    Ok(TimeSeries::new("views", points))
}

/// Count revisions per day or per month of `range`
pub fn bucket_revisions(range: &DateRange, revisions: &[Revision], bucket: Bucket) -> Vec<SeriesPoint> {
    let values = revisions
        .iter()
        .map(|revision| revision.timestamp.date_naive())
        .filter(|date| range.contains(*date))
        .map(|date| (date, 1));
    match bucket {
        Bucket::Day => zero_fill_daily(range, values),
        Bucket::Month => zero_fill_monthly(range, values),
    }
}

/// Number of edits per bucket inside the request range
#[instrument(skip(api), fields(article = %request.title, project = %request.project))]
pub async fn revision_activity(api: &dyn WikiApi, request: &ArticleRequest, bucket: Bucket) -> Result<TimeSeries> {
    let history = api
        .revisions(&request.project, &request.title, Some(request.range))
        .await?;
    if history.truncated {
        warn!(
            "Revision history of {} hit the listing limit; edit counts are lower bounds",
            request.title
        );
    }
    let points = bucket_revisions(&request.range, &history.revisions, bucket);
    debug!("Bucketed {} revisions into {} points", history.revisions.len(), points.len());
    Ok(TimeSeries::new("edits", points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wikimetrix_api::fake::{FakePage, FakeWikiApi};
    use wikimetrix_common::test_utils::{de_wikipedia, init_test_logging, mock_date, mock_range};

    fn point(date: NaiveDate, value: u64) -> SeriesPoint {
        SeriesPoint { date, value }
    }

    #[test]
    fn test_zero_fill_daily() {
        let range = mock_range((2024, 2, 28), (2024, 3, 1));
        let points = zero_fill_daily(
            &range,
            vec![
                (mock_date(2024, 3, 1), 4),
                (mock_date(2024, 2, 27), 100),
                (mock_date(2024, 3, 1), 1),
            ],
        );
        assert_eq!(
            points,
            vec![
                point(mock_date(2024, 2, 28), 0),
                point(mock_date(2024, 2, 29), 0),
                point(mock_date(2024, 3, 1), 5),
            ]
        );
    }

    #[test]
    fn test_zero_fill_monthly() {
        let range = mock_range((2023, 11, 15), (2024, 1, 10));
        let points = zero_fill_monthly(&range, vec![(mock_date(2023, 11, 1), 30), (mock_date(2024, 2, 1), 9)]);
        assert_eq!(
            points,
            vec![
                point(mock_date(2023, 11, 1), 30),
                point(mock_date(2023, 12, 1), 0),
                point(mock_date(2024, 1, 1), 0),
            ]
        );
    }

    #[test]
    fn test_series_summary() {
        let series = TimeSeries::new(
            "views",
            vec![point(mock_date(2024, 1, 1), 2), point(mock_date(2024, 1, 2), 7)],
        );
        assert_eq!(series.total(), 9);
        assert_eq!(series.max(), Some(7));
        assert_eq!(series.mean(), Some(4.5));
        assert_eq!(TimeSeries::new("views", Vec::new()).mean(), None);

        let mut out = Vec::new();
        series.write_csv(&mut out, b',').unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "date,views\n2024-01-01,2\n2024-01-02,7\n");
    }

    #[test]
    fn test_wide_table() {
        let a = TimeSeries::new("views", vec![point(mock_date(2024, 1, 1), 1), point(mock_date(2024, 1, 2), 2)]);
        let b = TimeSeries::new("views", vec![point(mock_date(2024, 1, 2), 5)]);
        let table = wide_table(&[("de:Faust".to_string(), a), ("en:Faust".to_string(), b)]);

        assert_eq!(table.columns, vec!["date", "de:Faust", "en:Faust"]);
        assert_eq!(table.get(0, "en:Faust"), Some("0"));
        assert_eq!(table.get(1, "en:Faust"), Some("5"));
    }

    #[tokio::test]
    async fn test_daily_pageviews_zero_fills_gaps() {
        init_test_logging();
        let project = de_wikipedia();
        let api = FakeWikiApi::new().with_page(
            &project,
            "Faust",
            FakePage::new(1)
                .with_views(mock_date(2024, 1, 1), Some(10))
                .with_views(mock_date(2024, 1, 3), None),
        );
        let request = ArticleRequest::new("Faust", project, mock_range((2024, 1, 1), (2024, 1, 4))).unwrap();

        let series = daily_pageviews(&api, &request, AccessType::AllAccess, AgentType::User)
            .await
            .unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.points.iter().map(|p| p.value).collect::<Vec<_>>(), vec![10, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_unknown_article_gives_zero_series() {
        let request = ArticleRequest::new("Gibt es nicht", de_wikipedia(), mock_range((2024, 1, 1), (2024, 1, 2)))
            .unwrap();
        let series = daily_pageviews(&FakeWikiApi::new(), &request, AccessType::AllAccess, AgentType::User)
            .await
            .unwrap();
        assert_eq!(series.total(), 0);
        assert_eq!(series.len(), 2);
    }

    #[tokio::test]
    async fn test_revision_activity_by_month() {
        let project = de_wikipedia();
        let edit = |revid, month, day| Revision {
            revid,
            timestamp: Utc.with_ymd_and_hms(2024, month, day, 8, 0, 0).unwrap(),
            user: Some("Goethe".to_string()),
            size: 1,
        };
        let api = FakeWikiApi::new().with_page(
            &project,
            "Faust",
            FakePage::new(1)
                .with_revision(edit(1, 1, 5))
                .with_revision(edit(2, 1, 20))
                .with_revision(edit(3, 3, 2))
                .with_revision(edit(4, 5, 1)),
        );
        let request = ArticleRequest::new("Faust", project, mock_range((2024, 1, 1), (2024, 3, 31))).unwrap();

        let series = revision_activity(&api, &request, Bucket::Month).await.unwrap();
        assert_eq!(series.metric, "edits");
        assert_eq!(
            series.points,
            vec![
                point(mock_date(2024, 1, 1), 2),
                point(mock_date(2024, 2, 1), 0),
                point(mock_date(2024, 3, 1), 1),
            ]
        );
    }
}
