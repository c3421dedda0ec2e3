//! Domain types shared by every wiki-metrix crate

use crate::error::{MetrixError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Wikimedia project: a language edition of a site family
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    /// Language code, e.g. `de`
    pub lang: String,
    /// Site family, e.g. `wikipedia`, `wikisource`
    pub family: String,
}

impl Project {
    /// Create a project from a language code and a family name
    pub fn new(lang: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            lang: lang.into().trim().to_ascii_lowercase(),
            family: family.into().trim().to_ascii_lowercase(),
        }
    }

    /// Same family, another language edition
    pub fn with_lang(&self, lang: impl Into<String>) -> Self {
        Self::new(lang, self.family.clone())
    }

    /// Host name, e.g. `de.wikipedia.org`
    pub fn domain(&self) -> String {
        format!("{}.{}.org", self.lang, self.family)
    }

    /// Project identifier used by the REST metrics API, e.g. `de.wikipedia`
    pub fn rest_project(&self) -> String {
        format!("{}.{}", self.lang, self.family)
    }

    /// Endpoint of the MediaWiki Action API
    pub fn action_api_url(&self) -> String {
        format!("https://{}/w/api.php", self.domain())
    }

    /// Wikidata site id, e.g. `dewiki` or `enwikisource`
    pub fn wikidata_site_id(&self) -> String {
        if self.family == "wikipedia" {
            format!("{}wiki", self.lang)
        } else {
            format!("{}{}", self.lang, self.family)
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new("en", "wikipedia")
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.lang, self.family)
    }
}

/// An inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range; `start` must not be after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(MetrixError::validation_field(
                format!("start date {start} is after end date {end}"),
                "start",
            ));
        }
        Ok(Self { start, end })
    }

    /// The window behind the `pageviews_365d` statistic: it ends two days
    /// before `today` (the most recent complete data) and spans 365 days.
    pub fn trailing_year(today: NaiveDate) -> Self {
        let end = today - Duration::days(2);
        let start = end - Duration::days(365);
        Self { start, end }
    }

    /// First day
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days, both ends included
    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Whether `date` falls inside the range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day of the range in ascending order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// First day of every month the range touches, ascending
    pub fn months(&self) -> Vec<NaiveDate> {
        let mut months = Vec::new();
        let mut cursor = Some(first_of_month(self.start));
        while let Some(month) = cursor.filter(|month| *month <= self.end) {
            months.push(month);
            cursor = next_month(month);
        }
        months
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// First day of the month containing `date`
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// `None` past the last representable month
fn next_month(first: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Request descriptor: which article, on which project, over which days
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRequest {
    pub title: String,
    pub project: Project,
    pub range: DateRange,
}

impl ArticleRequest {
    pub fn new(title: impl Into<String>, project: Project, range: DateRange) -> Result<Self> {
        let title = crate::utils::validate_non_empty(&title.into(), "title")?;
        Ok(Self { title, project, range })
    }
}

/// Granularity of the page-view REST endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for Granularity {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            other => Err(MetrixError::validation_field(
                format!("unknown granularity '{other}', expected daily or monthly"),
                "granularity",
            )),
        }
    }
}

/// Agent filter of the page-view REST endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AgentType {
    #[default]
    User,
    Spider,
    Automated,
    AllAgents,
}

impl AgentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Spider => "spider",
            Self::Automated => "automated",
            Self::AllAgents => "all-agents",
        }
    }
}

impl FromStr for AgentType {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Self::User),
            "spider" => Ok(Self::Spider),
            "automated" => Ok(Self::Automated),
            "all-agents" => Ok(Self::AllAgents),
            other => Err(MetrixError::validation_field(
                format!("unknown agent '{other}', expected user, spider, automated or all-agents"),
                "agent",
            )),
        }
    }
}

/// Access-method filter of the page-view REST endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccessType {
    #[default]
    AllAccess,
    Desktop,
    MobileApp,
    MobileWeb,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllAccess => "all-access",
            Self::Desktop => "desktop",
            Self::MobileApp => "mobile-app",
            Self::MobileWeb => "mobile-web",
        }
    }
}

impl FromStr for AccessType {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all-access" => Ok(Self::AllAccess),
            "desktop" => Ok(Self::Desktop),
            "mobile-app" => Ok(Self::MobileApp),
            "mobile-web" => Ok(Self::MobileWeb),
            other => Err(MetrixError::validation_field(
                format!("unknown access '{other}', expected all-access, desktop, mobile-app or mobile-web"),
                "access",
            )),
        }
    }
}

/// Bucket size for aggregating revisions over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[default]
    Day,
    Month,
}

impl FromStr for Bucket {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" | "daily" => Ok(Self::Day),
            "month" | "monthly" => Ok(Self::Month),
            other => Err(MetrixError::validation_field(
                format!("unknown bucket '{other}', expected day or month"),
                "bucket",
            )),
        }
    }
}

/// How the articles of a stats run are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    /// Every article in a category
    Category,
    /// Every language edition of one article
    Langlinks,
    /// Titles or Wikidata ids listed in a TSV file
    File,
}

impl SelectionMethod {
    pub const ALLOWED: [&'static str; 3] = ["category", "langlinks", "file"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Langlinks => "langlinks",
            Self::File => "file",
        }
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionMethod {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "category" => Ok(Self::Category),
            "langlinks" => Ok(Self::Langlinks),
            "file" => Ok(Self::File),
            other => Err(MetrixError::validation_field(
                format!(
                    "selection_method must be one of {:?}, but is {}.",
                    Self::ALLOWED,
                    other
                ),
                "selection_method",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_project_naming() {
        let project = Project::new("DE", "wikipedia");
        assert_eq!(project.domain(), "de.wikipedia.org");
        assert_eq!(project.rest_project(), "de.wikipedia");
        assert_eq!(project.action_api_url(), "https://de.wikipedia.org/w/api.php");
        assert_eq!(project.wikidata_site_id(), "dewiki");
        assert_eq!(project.to_string(), "de.wikipedia");

        let source = Project::new("en", "wikisource");
        assert_eq!(source.wikidata_site_id(), "enwikisource");
        assert_eq!(source.with_lang("fr").domain(), "fr.wikisource.org");
    }

    #[test]
    fn test_date_range_validation() {
        assert!(DateRange::new(date(2024, 1, 2), date(2024, 1, 1)).is_err());
        let single = DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert_eq!(single.len_days(), 1);
    }

    #[test]
    fn test_date_range_days_inclusive() {
        let range = DateRange::new(date(2024, 2, 27), date(2024, 3, 2)).unwrap();
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.len(), 5); // leap year: 27, 28, 29 Feb, 1, 2 Mar
        assert_eq!(days.len(), range.len_days());
        assert_eq!(days.first(), Some(&date(2024, 2, 27)));
        assert_eq!(days.last(), Some(&date(2024, 3, 2)));
        assert!(range.contains(date(2024, 2, 29)));
        assert!(!range.contains(date(2024, 3, 3)));
    }

    #[test]
    fn test_date_range_months() {
        let range = DateRange::new(date(2023, 11, 15), date(2024, 2, 1)).unwrap();
        assert_eq!(
            range.months(),
            vec![date(2023, 11, 1), date(2023, 12, 1), date(2024, 1, 1), date(2024, 2, 1)]
        );
    }

    #[test]
    fn test_months_stop_at_last_representable_date() {
        let end = NaiveDate::MAX;
        let range = DateRange::new(end - chrono::Duration::days(40), end).unwrap();
        let months = range.months();
        assert_eq!(months.len(), 2);
        assert_eq!(months.last(), Some(&first_of_month(end)));
    }

    #[test]
    fn test_trailing_year() {
        let range = DateRange::trailing_year(date(2024, 6, 10));
        assert_eq!(range.end(), date(2024, 6, 8));
        assert_eq!(range.start(), date(2023, 6, 9));
        assert_eq!(range.len_days(), 366);
    }

    #[test]
    fn test_article_request_rejects_blank_title() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(ArticleRequest::new("   ", Project::default(), range).is_err());
        let request = ArticleRequest::new(" Faust ", Project::default(), range).unwrap();
        assert_eq!(request.title, "Faust");
    }

    #[test]
    fn test_rest_enum_spellings() {
        assert_eq!(AgentType::AllAgents.as_str(), "all-agents");
        assert_eq!(AccessType::MobileWeb.as_str(), "mobile-web");
        assert_eq!("monthly".parse::<Granularity>().unwrap(), Granularity::Monthly);
        assert_eq!("month".parse::<Bucket>().unwrap(), Bucket::Month);
        assert!("hourly".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_selection_method_parsing() {
        assert_eq!("langlinks".parse::<SelectionMethod>().unwrap(), SelectionMethod::Langlinks);
        let err = "search".parse::<SelectionMethod>().unwrap_err();
        assert!(err.to_string().contains("category"));
        assert!(err.to_string().contains("search"));
    }
}
