//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use meetup_events::config::{Config, HttpConfig};
use meetup_events::crawler::{build_http_client, crawl_group, Crawler, HttpFetcher};
use meetup_events::output::{prepare, SortOrder};
use meetup_events::{FetchError, ScrapeError};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/orange-county-ai/events/";

/// Wraps a node table in the page's embedded state script
fn state_page(nodes: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head>
        <script id="__NEXT_DATA__" type="application/json">
        {{"props":{{"pageProps":{{"__APOLLO_STATE__":{{{}}}}}}}}}
        </script></head><body></body></html>"#,
        nodes
    )
}

/// Listing page whose active events connection references the given event ids
fn listing_page(base_url: &str, ids: &[u32]) -> String {
    let edges = ids
        .iter()
        .map(|id| format!(r#"{{"node":{{"__ref":"Event:{}"}}}}"#, id))
        .collect::<Vec<_>>()
        .join(",");
    let events = ids
        .iter()
        .map(|id| {
            format!(
                r#","Event:{id}":{{"eventUrl":"{base_url}{LISTING_PATH}{id}/"}}"#
            )
        })
        .collect::<String>();

    state_page(&format!(
        r#""Group:7":{{"name":"Orange County AI","events({{\"status\":\"ACTIVE\"}})":{{"edges":[{}]}}}}{}"#,
        edges, events
    ))
}

fn online_event_page(base_url: &str, id: u32, title: &str, date: &str) -> String {
    state_page(&format!(
        r#""Event:{id}":{{
            "eventUrl":"{base_url}{LISTING_PATH}{id}/",
            "title":"{title}",
            "description":"About {title}",
            "dateTime":"{date}"
        }}"#
    ))
}

fn venue_event_page(base_url: &str, id: u32) -> String {
    state_page(&format!(
        r#""Event:{id}":{{
            "eventUrl":"{base_url}{LISTING_PATH}{id}/",
            "title":"Builders Night",
            "description":"Demos and pizza.",
            "dateTime":"2025-05-01T18:00:00-07:00",
            "venue":{{"__ref":"Venue:88"}},
            "featuredEventPhoto":{{"__ref":"PhotoInfo:5"}}
        }},
        "Venue:88":{{"name":"Cove Labs","address":"123 Main St","city":"Irvine","state":"CA","country":"us"}},
        "PhotoInfo:5":{{"highResUrl":"https://secure.meetupstatic.com/photos/event/highres_5.jpeg"}}"#
    ))
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn listing_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), LISTING_PATH)
}

fn crawler() -> Crawler<HttpFetcher> {
    Crawler::new(HttpFetcher::new(&HttpConfig::default()).unwrap())
}

#[tokio::test]
async fn test_full_crawl_two_events() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, LISTING_PATH, listing_page(&base_url, &[101, 102])).await;
    mount_page(
        &server,
        "/orange-county-ai/events/101/",
        online_event_page(&base_url, 101, "AI Office Hours", "2025-04-03T12:00:00-07:00"),
    )
    .await;
    mount_page(
        &server,
        "/orange-county-ai/events/102/",
        venue_event_page(&base_url, 102),
    )
    .await;

    let events = crawler().crawl(&listing_url(&server)).await.unwrap();

    assert_eq!(events.len(), 2);

    let first = &events[0];
    assert_eq!(first.link, format!("{}/orange-county-ai/events/101/", base_url));
    assert_eq!(first.name, "AI Office Hours");
    assert_eq!(first.description, "About AI Office Hours");
    assert_eq!(first.image, "");
    assert_eq!(first.location, "Online");
    assert!(first.is_online());
    assert_eq!(first.venue, None);
    assert_eq!(first.location_link, None);
    assert_eq!(first.date.to_string(), "2025-04-03T12:00:00-07:00");

    let second = &events[1];
    assert_eq!(second.name, "Builders Night");
    assert_eq!(second.description, "Demos and pizza.");
    assert_eq!(second.location, "123 Main St, Irvine, CA, us");
    assert_eq!(second.venue.as_deref(), Some("Cove Labs"));
    assert_eq!(
        second.location_link.as_deref(),
        Some("https://maps.google.com/?q=123+Main+St%2C+Irvine%2C+CA%2C+us")
    );
    assert_eq!(
        second.image,
        "https://secure.meetupstatic.com/photos/event/highres_5.jpeg"
    );

    // The API contract moves office hours behind one-off events
    let ordered = prepare(events, SortOrder::Asc, Some(1));
    assert_eq!(ordered.len(), 1);
    assert_eq!(ordered[0].name, "Builders Night");
}

#[tokio::test]
async fn test_event_404_fails_fast() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, LISTING_PATH, listing_page(&base_url, &[1, 2, 3])).await;
    mount_page(
        &server,
        "/orange-county-ai/events/1/",
        online_event_page(&base_url, 1, "One", "2025-04-01T18:00:00-07:00"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/orange-county-ai/events/2/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orange-county-ai/events/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(online_event_page(
            &base_url,
            3,
            "Three",
            "2025-04-03T18:00:00-07:00",
        )))
        .expect(0)
        .mount(&server)
        .await;

    let err = crawler().crawl(&listing_url(&server)).await.unwrap_err();

    match err {
        ScrapeError::Fetch(fetch_err) => {
            assert_eq!(fetch_err.url(), format!("{}/orange-county-ai/events/2/", base_url));
            assert!(matches!(fetch_err, FetchError::Status { status: 404, .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_listing_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = crawler().crawl(&listing_url(&server)).await.unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::Fetch(FetchError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_dom_fallback_listing_with_relative_links() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    let listing = r#"<html><body>
        <div id="event-card-e-1"><a href="/orange-county-ai/events/201/">First</a></div>
        <div id="event-card-e-2"><a href="/orange-county-ai/events/202/">Second</a></div>
    </body></html>"#;
    mount_page(&server, LISTING_PATH, listing.to_string()).await;
    mount_page(
        &server,
        "/orange-county-ai/events/201/",
        online_event_page(&base_url, 201, "First", "2025-06-01T18:00:00-07:00"),
    )
    .await;
    mount_page(
        &server,
        "/orange-county-ai/events/202/",
        online_event_page(&base_url, 202, "Second", "2025-06-02T18:00:00-07:00"),
    )
    .await;

    let events = crawler().crawl(&listing_url(&server)).await.unwrap();

    let links = events.iter().map(|e| e.link.as_str()).collect::<Vec<_>>();
    assert_eq!(
        links,
        vec![
            format!("{}/orange-county-ai/events/201/", base_url),
            format!("{}/orange-county-ai/events/202/", base_url),
        ]
    );
}

#[tokio::test]
async fn test_listing_without_events_by_either_strategy() {
    let server = MockServer::start().await;
    mount_page(&server, LISTING_PATH, "<html><body>Maintenance</body></html>".to_string()).await;

    let err = crawler().crawl(&listing_url(&server)).await.unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, ScrapeError::Extraction(_)));
    assert!(message.starts_with("Failed to parse events page: "));
    assert!(message.contains("Fallback error: No element matches '#event-card-e-1'"));
}

#[tokio::test]
async fn test_browser_headers_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(header("referer", "https://www.meetup.com/"))
        .and(header("sec-fetch-mode", "navigate"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&server.uri(), &[])))
        .expect(1)
        .mount(&server)
        .await;

    let events = crawler().crawl(&listing_url(&server)).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_fetcher_with_prebuilt_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(header("referer", "https://www.meetup.com/orange-county-ai/"))
        .and(header("user-agent", "EventsBot/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&server.uri(), &[])))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpConfig {
        user_agent: "EventsBot/2.0".to_string(),
        referer: "https://www.meetup.com/orange-county-ai/".to_string(),
        ..HttpConfig::default()
    };
    let fetcher = HttpFetcher::with_client(build_http_client(&config).unwrap());

    let events = Crawler::new(fetcher).crawl(&listing_url(&server)).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_crawl_group_from_config() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(&server, LISTING_PATH, listing_page(&base_url, &[9])).await;
    mount_page(
        &server,
        "/orange-county-ai/events/9/",
        online_event_page(&base_url, 9, "Kickoff", "2025-01-09T18:00:00"),
    )
    .await;

    let mut config = Config::default();
    config.group.url = listing_url(&server);
    config.http.timeout_secs = Some(10);

    let events = crawl_group(&config).await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "Kickoff");
    assert_eq!(events[0].date.to_string(), "2025-01-09T18:00:00");
}

#[tokio::test]
async fn test_dump_page_writes_state_tree() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount_page(&server, LISTING_PATH, listing_page(&base_url, &[5])).await;

    let dir = TempDir::new().unwrap();
    let dump_path = dir.path().join("meetup_debug.json");

    let written = crawler()
        .dump_page(&listing_url(&server), &dump_path)
        .await
        .unwrap();
    assert!(written);

    let content = std::fs::read_to_string(&dump_path).unwrap();
    let tree: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(
        tree["props"]["pageProps"]["__APOLLO_STATE__"]["Group:7"]["name"],
        "Orange County AI"
    );
}

#[tokio::test]
async fn test_dump_page_without_state_writes_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, LISTING_PATH, "<html><body></body></html>".to_string()).await;

    let dir = TempDir::new().unwrap();
    let dump_path = dir.path().join("meetup_debug.json");

    let written = crawler()
        .dump_page(&listing_url(&server), &dump_path)
        .await
        .unwrap();

    assert!(!written);
    assert!(!dump_path.exists());
}
