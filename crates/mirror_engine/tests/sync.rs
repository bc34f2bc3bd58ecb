use std::fs;

use mirror_engine::{
    sync_target, FailureKind, FetchSettings, HttpFetcher, SyncAbort, SyncReport, SyncTarget,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str =
    r#"<pre><a href="../">../</a><a href="a.rii">a.rii</a><a href="b.rii">b.rii</a></pre>"#;

async fn mount_listing(server: &MockServer, listing_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(listing_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

async fn run_sync(target: SyncTarget, latest_count: usize) -> Result<SyncReport, SyncAbort> {
    tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::new(FetchSettings::default()).expect("client");
        sync_target(&fetcher, &target, latest_count)
    })
    .await
    .expect("blocking task")
}

#[tokio::test]
async fn downloads_the_latest_missing_entry() {
    let server = MockServer::start().await;
    mount_listing(&server, "/archive/", LISTING).await;
    Mock::given(method("GET"))
        .and(path("/archive/b.rii"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let target = SyncTarget {
        base_url: format!("{}/archive/", server.uri()),
        dest_dir: temp.path().to_path_buf(),
    };

    let report = run_sync(target, 1).await.expect("sync ok");
    assert_eq!(report.downloaded, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(fs::read(temp.path().join("b.rii")).unwrap(), b"fresh");
}

#[tokio::test]
async fn present_files_are_skipped_without_a_body_request() {
    let server = MockServer::start().await;
    mount_listing(&server, "/archive/", LISTING).await;
    // Idempotence: no GET may be issued for files already on disk.
    Mock::given(method("GET"))
        .and(path("/archive/a.rii"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/archive/b.rii"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.rii"), b"old").unwrap();
    fs::write(temp.path().join("b.rii"), b"old").unwrap();

    let target = SyncTarget {
        base_url: format!("{}/archive/", server.uri()),
        dest_dir: temp.path().to_path_buf(),
    };

    let report = run_sync(target, 5).await.expect("sync ok");
    assert_eq!(report.downloaded, 0);
    assert_eq!(report.skipped, 2);
}

#[tokio::test]
async fn all_entries_are_candidates_when_listing_is_short() {
    let server = MockServer::start().await;
    mount_listing(&server, "/archive/", LISTING).await;
    for name in ["a.rii", "b.rii"] {
        Mock::given(method("GET"))
            .and(path(format!("/archive/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let temp = TempDir::new().unwrap();
    let target = SyncTarget {
        base_url: format!("{}/archive/", server.uri()),
        dest_dir: temp.path().to_path_buf(),
    };

    let report = run_sync(target, 5).await.expect("sync ok");
    assert_eq!(report.downloaded, 2);
}

#[tokio::test]
async fn one_failed_download_does_not_stop_the_loop() {
    let server = MockServer::start().await;
    mount_listing(&server, "/archive/", LISTING).await;
    Mock::given(method("GET"))
        .and(path("/archive/a.rii"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/archive/b.rii"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let target = SyncTarget {
        base_url: format!("{}/archive/", server.uri()),
        dest_dir: temp.path().to_path_buf(),
    };

    let report = run_sync(target, 5).await.expect("sync ok");
    assert_eq!(report.downloaded, 1);
    assert!(temp.path().join("b.rii").exists());
    assert!(!temp.path().join("a.rii").exists());
}

#[tokio::test]
async fn rerun_with_unchanged_listing_downloads_nothing() {
    let server = MockServer::start().await;
    mount_listing(&server, "/archive/", LISTING).await;
    Mock::given(method("GET"))
        .and(path("/archive/a.rii"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"one".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/archive/b.rii"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"two".to_vec()))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let target = SyncTarget {
        base_url: format!("{}/archive/", server.uri()),
        dest_dir: temp.path().to_path_buf(),
    };

    let first = run_sync(target.clone(), 5).await.expect("first sync");
    assert_eq!(first.downloaded, 2);

    let second = run_sync(target, 5).await.expect("second sync");
    assert_eq!(second.downloaded, 0);
    assert_eq!(second.skipped, 2);
}

#[tokio::test]
async fn listing_without_pre_block_aborts_as_warning() {
    let server = MockServer::start().await;
    mount_listing(&server, "/archive/", "<html><body>not an index</body></html>").await;

    let temp = TempDir::new().unwrap();
    let target = SyncTarget {
        base_url: format!("{}/archive/", server.uri()),
        dest_dir: temp.path().to_path_buf(),
    };

    let abort = run_sync(target, 5).await.unwrap_err();
    assert!(matches!(abort, SyncAbort::NoPreBlock));
    assert!(abort.is_warning());
}

#[tokio::test]
async fn listing_with_no_file_links_aborts_as_warning() {
    let server = MockServer::start().await;
    mount_listing(&server, "/archive/", r#"<pre><a href="../">../</a></pre>"#).await;

    let temp = TempDir::new().unwrap();
    let target = SyncTarget {
        base_url: format!("{}/archive/", server.uri()),
        dest_dir: temp.path().to_path_buf(),
    };

    let abort = run_sync(target, 5).await.unwrap_err();
    assert!(matches!(abort, SyncAbort::NoEntries));
    assert!(abort.is_warning());
}

#[tokio::test]
async fn failed_listing_fetch_aborts_one_target_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_listing(&server, "/archive/", LISTING).await;
    Mock::given(method("GET"))
        .and(path("/archive/b.rii"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();

    let broken = SyncTarget {
        base_url: format!("{}/broken/", server.uri()),
        dest_dir: temp.path().join("broken"),
    };
    let abort = run_sync(broken, 1).await.unwrap_err();
    match abort {
        SyncAbort::Listing(err) => {
            assert_eq!(err.kind, FailureKind::HttpStatus(404));
            assert!(!SyncAbort::Listing(err).is_warning());
        }
        other => panic!("unexpected abort: {other:?}"),
    }

    // The next target still syncs normally.
    let healthy = SyncTarget {
        base_url: format!("{}/archive/", server.uri()),
        dest_dir: temp.path().join("archive"),
    };
    let report = run_sync(healthy, 1).await.expect("second target ok");
    assert_eq!(report.downloaded, 1);
}
