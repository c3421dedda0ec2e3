//! Wikibase REST API: resolving Wikidata items to article titles

use crate::client::{status_error, HttpReply, WikiClient};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};
use wikimetrix_common::{is_qid, MetrixError, Result};

/// Error codes meaning "the item exists but has no link to that site"
const NO_SITELINK_CODES: [&str; 2] = ["sitelink-not-defined", "resource-not-found"];

/// A sitelink as returned by the REST API
#[derive(Debug, Clone, Deserialize)]
pub struct Sitelink {
    pub title: String,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl WikiClient {
    /// URL of an item's sitelink for one site
    pub fn sitelink_url(&self, qid: &str, site_id: &str) -> String {
        format!(
            "{}/entities/items/{}/sitelinks/{}",
            self.config().wikidata_rest_base.trim_end_matches('/'),
            qid,
            site_id
        )
    }

    /// Title of the article linked from item `qid` on `site_id` (e.g. `dewiki`),
    /// or `None` when the item has no such sitelink
    #[instrument(skip(self))]
    pub async fn sitelink_title(&self, qid: &str, site_id: &str) -> Result<Option<String>> {
        if !is_qid(qid) {
            return Err(MetrixError::validation_field(format!("'{qid}' is not a Wikidata item id"), "qid"));
        }

        let url = self.sitelink_url(qid, site_id);
        let empty: [(&str, &str); 0] = [];
        let reply = self.send(&url, &empty).await?;
        interpret_sitelink_reply(&url, &reply)
    }
}

fn interpret_sitelink_reply(url: &str, reply: &HttpReply) -> Result<Option<String>> {
    if reply.status.is_success() {
        let sitelink: Sitelink = serde_json::from_str(&reply.body)?;
        return Ok(Some(sitelink.title));
    }

    if reply.status == StatusCode::NOT_FOUND {
        let code = serde_json::from_str::<Value>(&reply.body)
            .ok()
            .and_then(|body| body.get("code").and_then(Value::as_str).map(str::to_string));
        if code.as_deref().is_some_and(|code| NO_SITELINK_CODES.contains(&code)) {
            debug!("Item has no sitelink for this site");
            return Ok(None);
        }
    }

    Err(status_error(url, reply))
}
