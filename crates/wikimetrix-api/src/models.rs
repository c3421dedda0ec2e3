//! Response models for the Wikimedia APIs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use wikimetrix_common::{parse_rest_timestamp, Project, Result};

// ============================================================================
// Pageviews REST API
// ============================================================================

/// Body of the per-article endpoint
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PageviewsResponse {
    #[serde(default)]
    pub items: Vec<PageviewItem>,
}

/// One bucket of page views
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PageviewItem {
    pub project: String,
    pub article: String,
    pub granularity: String,
    /// `YYYYMMDDHH`
    pub timestamp: String,
    pub access: String,
    pub agent: String,
    /// Absent or null when there is no data for the bucket
    #[serde(default)]
    pub views: Option<u64>,
}

impl PageviewItem {
    /// Calendar day the bucket starts on
    pub fn date(&self) -> Result<NaiveDate> {
        parse_rest_timestamp(&self.timestamp)
    }

    /// View count with missing data counted as zero
    pub fn views_or_zero(&self) -> u64 {
        self.views.unwrap_or(0)
    }
}

// ============================================================================
// Action API
// ============================================================================

/// Basic facts about a page (`prop=info&inprop=url`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInfo {
    pub pageid: u64,
    pub title: String,
    /// Size of the current revision in bytes
    pub length: u64,
    pub fullurl: String,
    /// Title that was requested when it redirected to `title`
    pub redirected_from: Option<String>,
    pub missing: bool,
}

/// One revision of a page
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Revision {
    pub revid: u64,
    #[serde(with = "api_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Absent when the user name is hidden
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub size: u64,
}

/// Length of a page property listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ListCount {
    pub count: u64,
    /// The listing was cut off by the continuation cap
    pub truncated: bool,
}

/// An interlanguage link
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LangLink {
    pub lang: String,
    pub title: String,
    /// Full article URL, present when requested with `llprop=url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl LangLink {
    /// Project the link points to.
    ///
    /// The subdomain of the link URL wins over the language code, which
    /// differs for editions such as `be-x-old` hosted at `be-tarask`.
    pub fn project(&self, source: &Project) -> Project {
        let suffix = format!(".{}.org", source.family);
        self.url
            .as_deref()
            .and_then(|url| Url::parse(url).ok())
            .and_then(|url| {
                let host = url.host_str()?;
                host.strip_suffix(&suffix).map(|lang| source.with_lang(lang))
            })
            .unwrap_or_else(|| source.with_lang(self.lang.as_str()))
    }
}

/// Page properties that can be counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountedProp {
    ExtLinks,
    LangLinks,
    Links,
    LinksHere,
    Categories,
}

impl CountedProp {
    /// Value of the `prop` parameter, also the key of the listing in each page
    pub fn prop(&self) -> &'static str {
        match self {
            Self::ExtLinks => "extlinks",
            Self::LangLinks => "langlinks",
            Self::Links => "links",
            Self::LinksHere => "linkshere",
            Self::Categories => "categories",
        }
    }

    /// Extra parameters: limit, namespace and redirect filters
    pub fn params(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::ExtLinks => &[("ellimit", "max")],
            Self::LangLinks => &[("lllimit", "max")],
            Self::Links => &[("pllimit", "max")],
            Self::LinksHere => &[
                ("lhlimit", "max"),
                ("lhnamespace", "0"),
                ("lhshow", "!redirect"),
                ("lhprop", "pageid"),
            ],
            Self::Categories => &[("cllimit", "max")],
        }
    }
}

// Raw shapes of `formatversion=2` query responses

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct QueryBody {
    #[serde(default)]
    pub query: Option<QueryPart>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct QueryPart {
    #[serde(default)]
    pub normalized: Vec<TitleMapping>,
    #[serde(default)]
    pub redirects: Vec<TitleMapping>,
    #[serde(default)]
    pub pages: Vec<RawPage>,
    #[serde(default)]
    pub categorymembers: Vec<RawMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TitleMapping {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawPage {
    #[serde(default)]
    pub pageid: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(default)]
    pub fullurl: Option<String>,
    #[serde(default)]
    pub revisions: Vec<Revision>,
    #[serde(default)]
    pub langlinks: Vec<LangLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawMember {
    pub ns: i64,
    pub title: String,
}

mod api_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&wikimetrix_common::format_timestamp_utc(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        wikimetrix_common::parse_api_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
