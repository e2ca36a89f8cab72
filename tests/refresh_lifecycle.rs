//! End-to-end lifecycle: config → refresh → read-state changes → save →
//! restore into a fresh list.
//!
//! These tests run the engine against a real HTTP server (wiremock) and the
//! public crate API only, the same way a presentation layer would drive it.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use skiff::{Config, FeedList, FeedSource, HttpSource, RefreshResult, StoreError};
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rss(title: &str, items: &[(&str, &str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(guid, item_title, date)| {
            format!(
                "<item><guid>{}</guid><title>{}</title><pubDate>{}</pubDate></item>",
                guid, item_title, date
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>{}</title><description>test feed</description>{}</channel></rss>"#,
        title, items
    )
}

async fn mount(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "application/xml"),
        )
        .mount(server)
        .await;
}

async fn drain(mut rx: mpsc::Receiver<RefreshResult>) -> Vec<RefreshResult> {
    let mut results = Vec::new();
    loop {
        match tokio::time::timeout(Duration::from_secs(10), rx.recv()).await {
            Ok(Some(res)) => results.push(res),
            Ok(None) => return results,
            Err(_) => panic!("refresh channel never closed"),
        }
    }
}

fn source() -> Arc<dyn FeedSource> {
    Arc::new(HttpSource::new())
}

#[tokio::test]
async fn test_refresh_save_restore_cycle() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/go",
        rss(
            "Go Blog",
            &[
                ("go-1", "Release", "Mon, 01 Jan 2024 12:00:00 GMT"),
                ("go-2", "Generics", "Tue, 02 Jan 2024 12:00:00 GMT"),
            ],
        ),
    )
    .await;
    mount(
        &server,
        "/jobs",
        rss("Jobs", &[("job-1", "Hiring", "Wed, 03 Jan 2024 12:00:00 GMT")]),
    )
    .await;

    let config = Config::parse(&format!(
        "golang = [\"{0}/go\"]\njobs = [\"{0}/jobs\"]\n",
        server.uri()
    ))
    .unwrap();

    let list = FeedList::from_config(&config);
    let results = drain(list.update_all(source()).unwrap()).await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.is_ok()));

    // Mark one item read, bookmark another.
    let go = list.feed(&format!("{}/go", server.uri())).unwrap();
    {
        let mut feed = go.write();
        assert_eq!(feed.items.len(), 2);
        // Newest first after the sort.
        assert_eq!(feed.items[0].key(), "go-2");
        feed.items[0].mark_read();
        feed.items[1].toggle_bookmark();
    }

    let mut cache = Vec::new();
    list.save(&mut cache).unwrap();

    // Fresh run: same config, state restored from the cache.
    let reloaded = FeedList::from_config(&config);
    reloaded.restore(&cache[..]).unwrap();

    let go2 = reloaded.feed(&format!("{}/go", server.uri())).unwrap();
    {
        let feed = go2.read();
        assert!(feed.items[0].read);
        assert!(feed.items[1].bookmark);
        assert_eq!(feed.summary.as_ref().unwrap().title, "Go Blog");
    }

    // Refreshing the same payload again must not duplicate items or touch
    // the restored read state.
    let results = drain(reloaded.update_all(source()).unwrap()).await;
    assert_eq!(results.len(), 2);
    let feed = go2.read();
    assert_eq!(feed.items.len(), 2);
    assert!(feed.items[0].read);
    assert!(!feed.items[1].read);
}

#[tokio::test]
async fn test_failing_feed_does_not_block_siblings() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/ok",
        rss("Good", &[("g-1", "Post", "Mon, 01 Jan 2024 12:00:00 GMT")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = Config::parse(&format!(
        "mixed = [\"{0}/ok\", \"{0}/gone\"]\n",
        server.uri()
    ))
    .unwrap();
    let list = FeedList::from_config(&config);

    let results = drain(list.update_all(source()).unwrap()).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);

    let good = list.feed(&format!("{}/ok", server.uri())).unwrap();
    assert_eq!(good.read().items.len(), 1);
    assert!(good.read().error.is_empty());

    // The failed feed shows its error in place of a "latest" status.
    let bad = list.feed(&format!("{}/gone", server.uri())).unwrap();
    let status = bad.read().latest();
    assert!(status.contains("404"), "latest() should surface the error, got: {}", status);
}

#[tokio::test]
async fn test_category_scenario_from_config() {
    let urls: Vec<String> = (1..=6)
        .map(|i| format!("https://go.example/feed-{}", i))
        .collect();
    let golang = urls
        .iter()
        .map(|u| format!("\"{}\"", u))
        .collect::<Vec<_>>()
        .join(", ");
    let config = Config::parse(&format!(
        "golang = [{}]\njobs = [\"https://jobs.example/feed\"]\n",
        golang
    ))
    .unwrap();

    let list = FeedList::from_config(&config);
    assert_eq!(list.len(), 7);
    assert_eq!(list.categories(), vec!["golang", "jobs"]);

    let bucket = list.category("golang").unwrap();
    assert_eq!(bucket.len(), 6);
    for feed in bucket {
        assert_eq!(feed.read().category, "golang");
    }
    assert!(list.category("").is_err());
}

#[tokio::test]
async fn test_corrupt_cache_leaves_live_list_untouched() {
    let config = Config::parse("news = [\"https://a.example/rss\"]").unwrap();
    let list = FeedList::from_config(&config);

    let err = list.restore("{invalid".as_bytes()).unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)));

    assert_eq!(list.len(), 1);
    let feed = list.feed("https://a.example/rss").unwrap();
    assert!(feed.read().items.is_empty());
    assert!(feed.read().error.is_empty());
    assert!(feed.read().summary.is_none());
}
