//! Wikimedia Pageviews REST API (per-article endpoint)

use crate::client::WikiClient;
use crate::models::{PageviewItem, PageviewsResponse};
use tracing::{debug, info, instrument};
use wikimetrix_common::{
    format_rest_date, title_to_path_segment, AccessType, AgentType, ArticleRequest, Granularity, Result,
};

impl WikiClient {
    /// URL of the per-article endpoint for a request
    pub fn pageviews_url(
        &self,
        request: &ArticleRequest,
        granularity: Granularity,
        access: AccessType,
        agent: AgentType,
    ) -> String {
        format!(
            "{}/per-article/{}/{}/{}/{}/{}/{}/{}",
            self.config().pageviews_rest_base.trim_end_matches('/'),
            request.project.rest_project(),
            access.as_str(),
            agent.as_str(),
            title_to_path_segment(&request.title),
            granularity.as_str(),
            format_rest_date(request.range.start()),
            format_rest_date(request.range.end()),
        )
    }

    /// Fetch page views for an article.
    ///
    /// The endpoint answers 404 when it has no data for the article or the
    /// range; that case yields an empty list.
    #[instrument(skip(self), fields(title = %request.title, project = %request.project))]
    pub async fn fetch_pageviews(
        &self,
        request: &ArticleRequest,
        granularity: Granularity,
        access: AccessType,
        agent: AgentType,
    ) -> Result<Vec<PageviewItem>> {
        let url = self.pageviews_url(request, granularity, access, agent);
        let empty: [(&str, &str); 0] = [];

        match self.get_json::<PageviewsResponse, _>(&url, &empty).await {
            Ok(response) => {
                info!(items = response.items.len(), "Fetched page views");
                Ok(response.items)
            }
            Err(e) if e.is_not_found() => {
                debug!("No page-view data for this article and range");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
