//! MediaWiki Action API queries
//!
//! All page queries pass `redirects=1`, so a redirect title resolves to its
//! target and the answer describes the target page.

use crate::client::WikiClient;
use crate::models::{CountedProp, LangLink, ListCount, PageInfo, QueryBody, RawPage, Revision};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, instrument};
use wikimetrix_common::{DateRange, MetrixError, Project, Result};

/// Namespace of articles
pub const NS_MAIN: i64 = 0;
/// Namespace of categories
pub const NS_CATEGORY: i64 = 14;

/// Revisions of a page, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevisionHistory {
    pub revisions: Vec<Revision>,
    /// The history was cut off by the continuation cap
    pub truncated: bool,
}

impl WikiClient {
    /// Title, length and URL of a page
    #[instrument(skip(self), fields(project = %project))]
    pub async fn page_info(&self, project: &Project, title: &str) -> Result<PageInfo> {
        let params = owned(&[
            ("prop", "info"),
            ("inprop", "url"),
            ("redirects", "1"),
            ("titles", title),
        ]);
        let body = self.action_query(project, &params).await?;
        let info = parse_page_info(&body, title, project)?;
        debug!(pageid = info.pageid, length = info.length, "Fetched page info");
        Ok(info)
    }

    /// Revisions of a page, oldest first; limited to `range` when given
    #[instrument(skip(self), fields(project = %project))]
    pub async fn revisions(&self, project: &Project, title: &str, range: Option<DateRange>) -> Result<RevisionHistory> {
        let bounds = range.map(|r| {
            (
                format!("{}T00:00:00Z", r.start()),
                format!("{}T23:59:59Z", r.end()),
            )
        });
        let mut params = vec![
            ("prop", "revisions"),
            ("redirects", "1"),
            ("titles", title),
            ("rvprop", "ids|timestamp|user|size"),
            ("rvlimit", "max"),
            ("rvdir", "newer"),
        ];
        if let Some((start, end)) = &bounds {
            params.push(("rvstart", start.as_str()));
            params.push(("rvend", end.as_str()));
        }

        let mut revisions = Vec::new();
        let truncated = self
            .query_continued(project, &params, |body| {
                let page = first_page(body, title, project)?;
                revisions.extend(page.revisions);
                Ok(())
            })
            .await?;

        info!(count = revisions.len(), truncated, "Fetched revisions");
        Ok(RevisionHistory { revisions, truncated })
    }

    /// Number of entries of a page property listing
    #[instrument(skip(self), fields(project = %project, prop = prop.prop()))]
    pub async fn count_prop(&self, project: &Project, title: &str, prop: CountedProp) -> Result<ListCount> {
        let mut params = vec![("prop", prop.prop()), ("redirects", "1"), ("titles", title)];
        params.extend_from_slice(prop.params());

        let mut count = 0u64;
        let truncated = self
            .query_continued(project, &params, |body| {
                count += count_in_batch(body, prop, title, project)?;
                Ok(())
            })
            .await?;

        debug!(count, truncated, "Counted property entries");
        Ok(ListCount { count, truncated })
    }

    /// Interlanguage links of a page, sorted by language code
    #[instrument(skip(self), fields(project = %project))]
    pub async fn langlinks(&self, project: &Project, title: &str) -> Result<Vec<LangLink>> {
        let params = [
            ("prop", "langlinks"),
            ("redirects", "1"),
            ("titles", title),
            ("lllimit", "max"),
            ("llprop", "url"),
        ];

        let mut links = Vec::new();
        self.query_continued(project, &params, |body| {
            let page = first_page(body, title, project)?;
            links.extend(page.langlinks);
            Ok(())
        })
        .await?;

        links.sort_by(|a, b| a.lang.cmp(&b.lang));
        info!(count = links.len(), "Fetched language links");
        Ok(links)
    }

    /// Article titles in a category, in API order.
    ///
    /// With `recursive`, sub-categories are walked breadth-first; each
    /// category is visited once even when the category graph has cycles.
    #[instrument(skip(self), fields(project = %project))]
    pub async fn category_members(&self, project: &Project, category: &str, recursive: bool) -> Result<Vec<String>> {
        let root = self.category_title(project, category).await?;
        let namespaces = if recursive { "0|14" } else { "0" };

        let mut articles = Vec::new();
        let mut seen_articles: HashSet<String> = HashSet::new();
        let mut visited: HashSet<String> = HashSet::from([root.clone()]);
        let mut queue: VecDeque<String> = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            debug!(category = %current, "Listing category members");
            let params = [
                ("list", "categorymembers"),
                ("cmtitle", current.as_str()),
                ("cmlimit", "max"),
                ("cmnamespace", namespaces),
                ("cmprop", "title"),
            ];

            let mut subcategories = Vec::new();
            self.query_continued(project, &params, |body| {
                let query = serde_json::from_value::<QueryBody>(body.clone())?.query.unwrap_or_default();
                for member in query.categorymembers {
                    match member.ns {
                        NS_MAIN => {
                            if seen_articles.insert(member.title.clone()) {
                                articles.push(member.title);
                            }
                        }
                        NS_CATEGORY => subcategories.push(member.title),
                        _ => {}
                    }
                }
                Ok(())
            })
            .await?;

            for subcategory in subcategories {
                if visited.insert(subcategory.clone()) {
                    queue.push_back(subcategory);
                }
            }
        }

        info!(count = articles.len(), categories = visited.len(), "Fetched category members");
        Ok(articles)
    }

    /// Full title of a category, adding the namespace prefix when missing.
    ///
    /// Localised prefixes such as `Kategorie:` are recognised from the
    /// wiki's namespace names and aliases.
    pub async fn category_title(&self, project: &Project, name: &str) -> Result<String> {
        let name = name.trim();
        if !name.contains(':') {
            return Ok(format!("Category:{name}"));
        }

        let params = owned(&[("meta", "siteinfo"), ("siprop", "namespaces|namespacealiases")]);
        let body = self.action_query(project, &params).await?;
        Ok(with_category_prefix(name, &category_prefixes(&body)))
    }
}

fn owned(params: &[(&str, &str)]) -> Vec<(String, String)> {
    params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// The single page of a `titles=` query; missing pages are `NotFound`
fn first_page(body: &Value, title: &str, project: &Project) -> Result<RawPage> {
    let query = serde_json::from_value::<QueryBody>(body.clone())?.query.unwrap_or_default();
    let page = query
        .pages
        .into_iter()
        .next()
        .ok_or_else(|| MetrixError::api(format!("No page in response for '{title}'")))?;
    if page.missing || page.invalid {
        return Err(MetrixError::not_found(format!("page '{title}' on {project}")));
    }
    Ok(page)
}

pub(crate) fn parse_page_info(body: &Value, requested: &str, project: &Project) -> Result<PageInfo> {
    let query = serde_json::from_value::<QueryBody>(body.clone())?.query.unwrap_or_default();
    let page = first_page(body, requested, project)?;

    let redirected_from = query.redirects.first().map(|redirect| redirect.from.clone());
    if let Some(source) = &redirected_from {
        debug!(from = %source, to = %page.title, "Redirect resolved");
    }

    Ok(PageInfo {
        pageid: page.pageid.unwrap_or_default(),
        fullurl: page
            .fullurl
            .clone()
            .unwrap_or_else(|| format!("https://{}/wiki/{}", project.domain(), page.title.replace(' ', "_"))),
        length: page.length.unwrap_or_default(),
        title: page.title,
        redirected_from,
        missing: false,
    })
}

fn count_in_batch(body: &Value, prop: CountedProp, title: &str, project: &Project) -> Result<u64> {
    let page = body
        .pointer("/query/pages/0")
        .ok_or_else(|| MetrixError::api(format!("No page in response for '{title}'")))?;
    if page.get("missing").and_then(Value::as_bool).unwrap_or(false) {
        return Err(MetrixError::not_found(format!("page '{title}' on {project}")));
    }
    Ok(page
        .get(prop.prop())
        .and_then(Value::as_array)
        .map_or(0, |entries| entries.len() as u64))
}

/// Local name, canonical name and aliases of the category namespace
pub(crate) fn category_prefixes(body: &Value) -> Vec<String> {
    let mut prefixes = vec!["Category".to_string()];
    if let Some(ns) = body.pointer("/query/namespaces/14") {
        for key in ["name", "canonical"] {
            if let Some(name) = ns.get(key).and_then(Value::as_str) {
                prefixes.push(name.to_string());
            }
        }
    }
    if let Some(aliases) = body.pointer("/query/namespacealiases").and_then(Value::as_array) {
        prefixes.extend(
            aliases
                .iter()
                .filter(|alias| alias.get("id").and_then(Value::as_i64) == Some(NS_CATEGORY))
                .filter_map(|alias| alias.get("alias").and_then(Value::as_str).map(str::to_string)),
        );
    }
    prefixes
}

pub(crate) fn with_category_prefix(name: &str, prefixes: &[String]) -> String {
    if let Some((prefix, _)) = name.split_once(':') {
        let prefix = prefix.trim().replace('_', " ").to_lowercase();
        if prefixes.iter().any(|p| p.to_lowercase() == prefix) {
            return name.to_string();
        }
    }
    format!("Category:{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wikimetrix_common::test_utils::{de_wikipedia, json_fixtures};

    #[test]
    fn test_parse_page_info_follows_redirect() {
        let body = json!({
            "batchcomplete": true,
            "query": {
                "redirects": [{ "from": "Werther", "to": "Die Leiden des jungen Werthers" }],
                "pages": [{
                    "pageid": 58964,
                    "ns": 0,
                    "title": "Die Leiden des jungen Werthers",
                    "contentmodel": "wikitext",
                    "length": 61234,
                    "fullurl": "https://de.wikipedia.org/wiki/Die_Leiden_des_jungen_Werthers"
                }]
            }
        });

        let info = parse_page_info(&body, "Werther", &de_wikipedia()).unwrap();
        assert_eq!(info.title, "Die Leiden des jungen Werthers");
        assert_eq!(info.length, 61234);
        assert_eq!(info.redirected_from.as_deref(), Some("Werther"));
        assert!(!info.missing);
    }

    #[test]
    fn test_parse_page_info_missing() {
        let body = json!({
            "query": { "pages": [{ "ns": 0, "title": "Gibt es nicht", "missing": true }] }
        });
        let error = parse_page_info(&body, "Gibt es nicht", &de_wikipedia()).unwrap_err();
        assert!(error.is_not_found());
        assert!(error.to_string().contains("de.wikipedia"));
    }

    #[test]
    fn test_count_in_batch() {
        let body = json!({
            "continue": { "plcontinue": "58964|0|Goethe", "continue": "||" },
            "query": { "pages": [{
                "pageid": 58964, "ns": 0, "title": "Faust",
                "links": [
                    { "ns": 0, "title": "Goethe" },
                    { "ns": 0, "title": "Mephisto" },
                    { "ns": 14, "title": "Kategorie:Drama" }
                ]
            }] }
        });
        assert_eq!(count_in_batch(&body, CountedProp::Links, "Faust", &de_wikipedia()).unwrap(), 3);
        assert_eq!(count_in_batch(&body, CountedProp::ExtLinks, "Faust", &de_wikipedia()).unwrap(), 0);
    }

    #[test]
    fn test_first_page_reports_missing_as_not_found() {
        let body = json!({ "query": { "pages": [{ "ns": 0, "title": "X", "missing": true }] } });
        assert!(first_page(&body, "X", &de_wikipedia()).unwrap_err().is_not_found());
        assert!(first_page(&json_fixtures::action_error_body("x", "y"), "X", &de_wikipedia()).is_err());
    }

    #[test]
    fn test_category_prefixes() {
        let body = json!({
            "query": {
                "namespaces": {
                    "0": { "id": 0, "name": "", "content": true },
                    "14": { "id": 14, "name": "Kategorie", "canonical": "Category" }
                },
                "namespacealiases": [
                    { "id": 14, "alias": "Kat" },
                    { "id": 4, "alias": "WP" }
                ]
            }
        });
        let prefixes = category_prefixes(&body);
        assert!(prefixes.contains(&"Kategorie".to_string()));
        assert!(prefixes.contains(&"Kat".to_string()));
        assert!(!prefixes.contains(&"WP".to_string()));

        assert_eq!(with_category_prefix("Kategorie:Literatur (18. Jahrhundert)", &prefixes), "Kategorie:Literatur (18. Jahrhundert)");
        assert_eq!(with_category_prefix("kategorie:Roman", &prefixes), "kategorie:Roman");
        assert_eq!(with_category_prefix("Drama: Gattung", &prefixes), "Category:Drama: Gattung");
    }

    #[tokio::test]
    async fn test_category_title_without_colon_needs_no_request() {
        let client = WikiClient::with_defaults().unwrap();
        let title = client.category_title(&de_wikipedia(), " Deutsche Literatur ").await.unwrap();
        assert_eq!(title, "Category:Deutsche Literatur");
    }
}
