//! Clients for the Wikimedia APIs used by wiki-metrix
//!
//! * Pageviews REST API (per-article endpoint)
//! * MediaWiki Action API (page info, revisions, links, categories)
//! * Wikibase REST API (sitelinks of Wikidata items)

pub mod action;
pub mod client;
pub mod models;
pub mod pageviews;
pub mod wiki_api;
pub mod wikidata;

#[cfg(any(test, feature = "testing"))]
pub mod fake;

pub use action::{RevisionHistory, NS_CATEGORY, NS_MAIN};
pub use client::{ClientConfig, WikiClient};
pub use models::{CountedProp, LangLink, ListCount, PageInfo, PageviewItem, PageviewsResponse, Revision};
pub use wiki_api::WikiApi;
pub use wikidata::Sitelink;
