//! Integration tests for the HTTP client against a local stub server.

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wikimetrix_api::{ClientConfig, CountedProp, WikiApi, WikiClient};
use wikimetrix_common::test_utils::{de_wikipedia, init_test_logging, json_fixtures, mock_range};
use wikimetrix_common::{AccessType, AgentType, ArticleRequest, Granularity, MetrixError};

/// Serve the canned `(status, body)` replies in order, one per connection,
/// and hand back the request heads that were received.
async fn stub_server(replies: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut heads = Vec::new();
        for (status, body) in replies {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buffer = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buffer.extend_from_slice(&chunk[..n]);
            }
            heads.push(String::from_utf8_lossy(&buffer).into_owned());

            let response = format!(
                "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
        heads
    });

    (base, handle)
}

fn client_for(base: &str, max_pages: u32) -> WikiClient {
    let config = ClientConfig::new("metrix-test/0.1 (tests@example.org)")
        .with_rate_limit(100)
        .with_max_pages(max_pages)
        .with_pageviews_base(format!("{base}/pageviews"))
        .with_wikidata_base(format!("{base}/wikibase/v1"))
        .with_action_api_endpoint(format!("{base}/w/api.php"));
    WikiClient::new(config).unwrap()
}

#[tokio::test]
async fn pageviews_are_parsed_and_user_agent_is_sent() {
    init_test_logging();
    let body = json_fixtures::pageviews_body("Faust", "daily", &[("2024010100", Some(12)), ("2024010200", None)]);
    let (base, server) = stub_server(vec![(200, body.to_string())]).await;
    let client = client_for(&base, 5);

    let request = ArticleRequest::new("Faust", de_wikipedia(), mock_range((2024, 1, 1), (2024, 1, 2))).unwrap();
    let items = WikiApi::fetch_pageviews(&client, &request, Granularity::Daily, AccessType::AllAccess, AgentType::User)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].views, Some(12));
    assert_eq!(items[1].views_or_zero(), 0);

    let heads = server.await.unwrap();
    let head = heads[0].to_lowercase();
    assert!(head.starts_with("get /pageviews/per-article/de.wikipedia/all-access/user/faust/daily/20240101/20240102"));
    assert!(head.contains("user-agent: metrix-test/0.1 (tests@example.org)"));
}

#[tokio::test]
async fn pageviews_not_found_yields_empty_list() {
    let body = json!({ "type": "https://mediawiki.org/wiki/HyperSwitch/errors/not_found", "title": "Not found.", "detail": "The date(s) you used are valid, but we either do not have data for those date(s), or the project you asked for is not loaded yet." });
    let (base, server) = stub_server(vec![(404, body.to_string())]).await;
    let client = client_for(&base, 5);

    let request = ArticleRequest::new("Gibt es nicht", de_wikipedia(), mock_range((2024, 1, 1), (2024, 1, 2))).unwrap();
    let items = client
        .fetch_pageviews(&request, Granularity::Daily, AccessType::AllAccess, AgentType::User)
        .await
        .unwrap();
    assert!(items.is_empty());
    server.await.unwrap();
}

#[tokio::test]
async fn continuation_is_followed_and_counted() {
    let first = json!({
        "continue": { "plcontinue": "1|0|Mephisto", "continue": "||" },
        "query": { "pages": [{ "pageid": 1, "ns": 0, "title": "Faust",
            "links": [{ "ns": 0, "title": "Gretchen" }, { "ns": 0, "title": "Heinrich Faust" }, { "ns": 0, "title": "Marthe" }] }] }
    });
    let second = json!({
        "batchcomplete": true,
        "query": { "pages": [{ "pageid": 1, "ns": 0, "title": "Faust",
            "links": [{ "ns": 0, "title": "Mephisto" }, { "ns": 0, "title": "Wagner" }] }] }
    });
    let (base, server) = stub_server(vec![(200, first.to_string()), (200, second.to_string())]).await;
    let client = client_for(&base, 5);

    let count = client.count_prop(&de_wikipedia(), "Faust", CountedProp::Links).await.unwrap();
    assert_eq!(count.count, 5);
    assert!(!count.truncated);

    let heads = server.await.unwrap();
    assert_eq!(heads.len(), 2);
    assert!(heads[0].contains("formatversion=2"));
    assert!(heads[0].contains("redirects=1"));
    assert!(!heads[0].contains("plcontinue"));
    assert!(heads[1].contains("plcontinue=1%7C0%7CMephisto"));
}

#[tokio::test]
async fn continuation_cap_marks_listing_truncated() {
    let page = json!({
        "continue": { "lhcontinue": 4711, "continue": "||" },
        "query": { "pages": [{ "pageid": 1, "ns": 0, "title": "Faust", "linkshere": [{ "pageid": 7 }] }] }
    });
    let (base, server) = stub_server(vec![(200, page.to_string())]).await;
    let client = client_for(&base, 1);

    let count = client.count_prop(&de_wikipedia(), "Faust", CountedProp::LinksHere).await.unwrap();
    assert_eq!(count.count, 1);
    assert!(count.truncated);

    let heads = server.await.unwrap();
    assert!(heads[0].contains("lhnamespace=0"));
    assert!(heads[0].contains("lhshow=%21redirect"));
}

#[tokio::test]
async fn action_errors_carry_their_code() {
    let body = json_fixtures::action_error_body("invalidtitle", "Bad title \"<>\".");
    let (base, server) = stub_server(vec![(200, body.to_string())]).await;
    let client = client_for(&base, 5);

    let error = client.page_info(&de_wikipedia(), "<>").await.unwrap_err();
    match error {
        MetrixError::Api { code, .. } => assert_eq!(code.as_deref(), Some("invalidtitle")),
        other => panic!("unexpected error: {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn server_errors_are_not_retried() {
    let (base, server) = stub_server(vec![(503, "{}".to_string())]).await;
    let client = client_for(&base, 5);

    let error = client.page_info(&de_wikipedia(), "Faust").await.unwrap_err();
    assert!(matches!(error, MetrixError::Api { status_code: Some(503), .. }));

    let heads = server.await.unwrap();
    assert_eq!(heads.len(), 1);
}

#[tokio::test]
async fn missing_sitelink_resolves_to_none() {
    let found = json!({ "badges": [], "title": "Douglas Adams", "url": "https://de.wikipedia.org/wiki/Douglas_Adams" });
    let missing = json!({ "code": "resource-not-found", "message": "The requested resource does not exist" });
    let (base, server) = stub_server(vec![(200, found.to_string()), (404, missing.to_string())]).await;
    let client = client_for(&base, 5);

    assert_eq!(client.sitelink_title("Q42", "dewiki").await.unwrap().as_deref(), Some("Douglas Adams"));
    assert!(client.sitelink_title("Q42", "xxwiki").await.unwrap().is_none());

    let heads = server.await.unwrap();
    assert!(heads[0].starts_with("GET /wikibase/v1/entities/items/Q42/sitelinks/dewiki"));
}
