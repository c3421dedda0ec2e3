//! In-memory `WikiApi` for tests of code built on top of the client

use crate::action::RevisionHistory;
use crate::models::{CountedProp, LangLink, ListCount, PageInfo, PageviewItem, Revision};
use crate::wiki_api::WikiApi;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use wikimetrix_common::{
    format_rest_date, AccessType, AgentType, ArticleRequest, DateRange, Granularity, MetrixError, Project, Result,
};

/// A page served by [`FakeWikiApi`]
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub length: u64,
    pub revisions: Vec<Revision>,
    pub revisions_truncated: bool,
    /// Daily views by day
    pub daily_views: Vec<(NaiveDate, Option<u64>)>,
    pub counts: HashMap<CountedProp, ListCount>,
    pub langlinks: Vec<LangLink>,
}

impl FakePage {
    pub fn new(length: u64) -> Self {
        Self {
            length,
            ..Default::default()
        }
    }

    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revisions.push(revision);
        self
    }

    pub fn with_views(mut self, date: NaiveDate, views: Option<u64>) -> Self {
        self.daily_views.push((date, views));
        self
    }

    pub fn with_count(mut self, prop: CountedProp, count: u64) -> Self {
        self.counts.insert(prop, ListCount { count, truncated: false });
        self
    }

    pub fn with_truncated_count(mut self, prop: CountedProp, count: u64) -> Self {
        self.counts.insert(prop, ListCount { count, truncated: true });
        self
    }

    pub fn with_langlink(mut self, lang: &str, title: &str) -> Self {
        self.langlinks.push(LangLink {
            lang: lang.to_string(),
            title: title.to_string(),
            url: None,
        });
        self
    }

    /// Language link whose URL host differs from its code
    pub fn with_langlink_url(mut self, lang: &str, title: &str, url: &str) -> Self {
        self.langlinks.push(LangLink {
            lang: lang.to_string(),
            title: title.to_string(),
            url: Some(url.to_string()),
        });
        self
    }
}

type Key = (String, String);

fn key(project: &Project, title: &str) -> Key {
    (project.to_string(), title.to_string())
}

/// Serves pages, redirects, categories and sitelinks from memory and
/// records every call
#[derive(Debug, Default)]
pub struct FakeWikiApi {
    pages: HashMap<Key, FakePage>,
    redirects: HashMap<Key, String>,
    categories: HashMap<Key, Vec<String>>,
    sitelinks: HashMap<Key, String>,
    calls: Mutex<Vec<String>>,
}

impl FakeWikiApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, project: &Project, title: &str, page: FakePage) -> Self {
        self.pages.insert(key(project, title), page);
        self
    }

    pub fn with_redirect(mut self, project: &Project, from: &str, to: &str) -> Self {
        self.redirects.insert(key(project, from), to.to_string());
        self
    }

    /// Members are article titles, or `Category:` titles for sub-categories
    pub fn with_category(mut self, project: &Project, category: &str, members: &[&str]) -> Self {
        self.categories.insert(
            key(project, category),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn with_sitelink(mut self, qid: &str, site_id: &str, title: &str) -> Self {
        self.sitelinks
            .insert((qid.to_string(), site_id.to_string()), title.to_string());
        self
    }

    /// Calls made so far, as `method:title`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, method: &str, subject: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{method}:{subject}"));
        }
    }

    fn resolve(&self, project: &Project, title: &str) -> Result<(String, &FakePage)> {
        let target = self
            .redirects
            .get(&key(project, title))
            .cloned()
            .unwrap_or_else(|| title.to_string());
        self.pages
            .get(&key(project, &target))
            .map(|page| (target.clone(), page))
            .ok_or_else(|| MetrixError::not_found(format!("page '{title}' on {project}")))
    }
}

#[async_trait]
impl WikiApi for FakeWikiApi {
    async fn fetch_pageviews(
        &self,
        request: &ArticleRequest,
        granularity: Granularity,
        access: AccessType,
        agent: AgentType,
    ) -> Result<Vec<PageviewItem>> {
        self.record("pageviews", &request.title);
        let Ok((title, page)) = self.resolve(&request.project, &request.title) else {
            return Ok(Vec::new());
        };

        let item = |date: NaiveDate, views: Option<u64>| PageviewItem {
            project: request.project.rest_project(),
            article: title.replace(' ', "_"),
            granularity: granularity.as_str().to_string(),
            timestamp: format!("{}00", format_rest_date(date)),
            access: access.as_str().to_string(),
            agent: agent.as_str().to_string(),
            views,
        };

        let in_range = page
            .daily_views
            .iter()
            .filter(|(date, _)| request.range.contains(*date));

        Ok(match granularity {
            Granularity::Daily => in_range.map(|(date, views)| item(*date, *views)).collect(),
            Granularity::Monthly => {
                let mut months: Vec<(NaiveDate, Option<u64>)> = Vec::new();
                for (date, views) in in_range {
                    let month = wikimetrix_common::first_of_month(*date);
                    match months.iter_mut().find(|(m, _)| *m == month) {
                        Some((_, total)) => *total = Some(total.unwrap_or(0) + views.unwrap_or(0)),
                        None => months.push((month, *views)),
                    }
                }
                months.sort_by_key(|(month, _)| *month);
                months.into_iter().map(|(month, views)| item(month, views)).collect()
            }
        })
    }

    async fn page_info(&self, project: &Project, title: &str) -> Result<PageInfo> {
        self.record("page_info", title);
        let (target, page) = self.resolve(project, title)?;
        Ok(PageInfo {
            pageid: 1,
            fullurl: format!("https://{}/wiki/{}", project.domain(), target.replace(' ', "_")),
            redirected_from: (target != title).then(|| title.to_string()),
            title: target,
            length: page.length,
            missing: false,
        })
    }

    async fn revisions(&self, project: &Project, title: &str, range: Option<DateRange>) -> Result<RevisionHistory> {
        self.record("revisions", title);
        let (_, page) = self.resolve(project, title)?;
        let revisions = page
            .revisions
            .iter()
            .filter(|rev| range.map_or(true, |r| r.contains(rev.timestamp.date_naive())))
            .cloned()
            .collect();
        Ok(RevisionHistory {
            revisions,
            truncated: page.revisions_truncated,
        })
    }

    async fn count_prop(&self, project: &Project, title: &str, prop: CountedProp) -> Result<ListCount> {
        self.record(prop.prop(), title);
        let (_, page) = self.resolve(project, title)?;
        Ok(page.counts.get(&prop).copied().unwrap_or_default())
    }

    async fn langlinks(&self, project: &Project, title: &str) -> Result<Vec<LangLink>> {
        self.record("langlinks", title);
        let (_, page) = self.resolve(project, title)?;
        let mut links = page.langlinks.clone();
        links.sort_by(|a, b| a.lang.cmp(&b.lang));
        Ok(links)
    }

    async fn category_members(&self, project: &Project, category: &str, recursive: bool) -> Result<Vec<String>> {
        self.record("category_members", category);
        let root = if category.starts_with("Category:") {
            category.to_string()
        } else {
            format!("Category:{category}")
        };

        let mut articles: Vec<String> = Vec::new();
        let mut visited = vec![root.clone()];
        let mut queue = std::collections::VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            let members = self.categories.get(&key(project, &current)).cloned().unwrap_or_default();
            for member in members {
                if member.starts_with("Category:") {
                    if recursive && !visited.contains(&member) {
                        visited.push(member.clone());
                        queue.push_back(member);
                    }
                } else if !articles.contains(&member) {
                    articles.push(member);
                }
            }
        }
        Ok(articles)
    }

    async fn sitelink_title(&self, qid: &str, site_id: &str) -> Result<Option<String>> {
        self.record("sitelink", qid);
        Ok(self.sitelinks.get(&(qid.to_string(), site_id.to_string())).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikimetrix_common::test_utils::{de_wikipedia, mock_date, mock_range};

    #[tokio::test]
    async fn test_fake_resolves_redirects() {
        let project = de_wikipedia();
        let api = FakeWikiApi::new()
            .with_page(&project, "Faust. Eine Tragödie", FakePage::new(1000))
            .with_redirect(&project, "Faust I", "Faust. Eine Tragödie");

        let info = api.page_info(&project, "Faust I").await.unwrap();
        assert_eq!(info.title, "Faust. Eine Tragödie");
        assert_eq!(info.redirected_from.as_deref(), Some("Faust I"));
        assert!(api.page_info(&project, "Unbekannt").await.unwrap_err().is_not_found());
        assert_eq!(api.calls(), vec!["page_info:Faust I", "page_info:Unbekannt"]);
    }

    #[tokio::test]
    async fn test_fake_monthly_pageviews() {
        let project = de_wikipedia();
        let api = FakeWikiApi::new().with_page(
            &project,
            "Faust",
            FakePage::new(1)
                .with_views(mock_date(2024, 1, 30), Some(5))
                .with_views(mock_date(2024, 1, 31), None)
                .with_views(mock_date(2024, 2, 1), Some(7)),
        );
        let request = ArticleRequest::new("Faust", project, mock_range((2024, 1, 1), (2024, 2, 29))).unwrap();

        let items = api
            .fetch_pageviews(&request, Granularity::Monthly, AccessType::AllAccess, AgentType::User)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].timestamp, "2024010100");
        assert_eq!(items[0].views, Some(5));
        assert_eq!(items[1].views, Some(7));
    }

    #[tokio::test]
    async fn test_fake_recursive_categories_terminate_on_cycles() {
        let project = de_wikipedia();
        let api = FakeWikiApi::new()
            .with_category(&project, "Category:Drama", &["Faust", "Category:Tragödie"])
            .with_category(&project, "Category:Tragödie", &["Emilia Galotti", "Category:Drama", "Faust"]);

        let flat = api.category_members(&project, "Drama", false).await.unwrap();
        assert_eq!(flat, vec!["Faust"]);

        let deep = api.category_members(&project, "Drama", true).await.unwrap();
        assert_eq!(deep, vec!["Faust", "Emilia Galotti"]);
    }
}
