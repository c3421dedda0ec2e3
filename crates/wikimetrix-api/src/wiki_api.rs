//! The data-source seam the statistics layer is written against

use crate::action::RevisionHistory;
use crate::client::WikiClient;
use crate::models::{CountedProp, LangLink, ListCount, PageInfo, PageviewItem};
use async_trait::async_trait;
use wikimetrix_common::{AccessType, AgentType, ArticleRequest, DateRange, Granularity, Project, Result};

/// Everything wiki-metrix asks of the Wikimedia APIs
#[async_trait]
pub trait WikiApi: Send + Sync {
    /// Page views of an article; empty when the API has no data
    async fn fetch_pageviews(
        &self,
        request: &ArticleRequest,
        granularity: Granularity,
        access: AccessType,
        agent: AgentType,
    ) -> Result<Vec<PageviewItem>>;

    /// Title, length and URL of a page, following redirects
    async fn page_info(&self, project: &Project, title: &str) -> Result<PageInfo>;

    /// Revisions oldest first, optionally limited to a range
    async fn revisions(&self, project: &Project, title: &str, range: Option<DateRange>) -> Result<RevisionHistory>;

    /// Length of a property listing of a page
    async fn count_prop(&self, project: &Project, title: &str, prop: CountedProp) -> Result<ListCount>;

    /// Interlanguage links sorted by language code
    async fn langlinks(&self, project: &Project, title: &str) -> Result<Vec<LangLink>>;

    /// Article titles of a category
    async fn category_members(&self, project: &Project, category: &str, recursive: bool) -> Result<Vec<String>>;

    /// Article title linked from a Wikidata item, if any
    async fn sitelink_title(&self, qid: &str, site_id: &str) -> Result<Option<String>>;
}

#[async_trait]
impl WikiApi for WikiClient {
    async fn fetch_pageviews(
        &self,
        request: &ArticleRequest,
        granularity: Granularity,
        access: AccessType,
        agent: AgentType,
    ) -> Result<Vec<PageviewItem>> {
        WikiClient::fetch_pageviews(self, request, granularity, access, agent).await
    }

    async fn page_info(&self, project: &Project, title: &str) -> Result<PageInfo> {
        WikiClient::page_info(self, project, title).await
    }

    async fn revisions(&self, project: &Project, title: &str, range: Option<DateRange>) -> Result<RevisionHistory> {
        WikiClient::revisions(self, project, title, range).await
    }

    async fn count_prop(&self, project: &Project, title: &str, prop: CountedProp) -> Result<ListCount> {
        WikiClient::count_prop(self, project, title, prop).await
    }

    async fn langlinks(&self, project: &Project, title: &str) -> Result<Vec<LangLink>> {
        WikiClient::langlinks(self, project, title).await
    }

    async fn category_members(&self, project: &Project, category: &str, recursive: bool) -> Result<Vec<String>> {
        WikiClient::category_members(self, project, category, recursive).await
    }

    async fn sitelink_title(&self, qid: &str, site_id: &str) -> Result<Option<String>> {
        WikiClient::sitelink_title(self, qid, site_id).await
    }
}
