//! End-to-end download scenarios against a mock HTTP server
//!
//! Covers the full attempt lifecycle: fresh downloads, resumption from a
//! partial file, the benign 416 "already complete" signal, and real error
//! classification with deterministic file-handle release.

use resume_dl::{Config, DownloadHooks, Error, Outcome, ResumableDownloader};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Deterministic test payload
fn body_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn downloader() -> ResumableDownloader {
    ResumableDownloader::new(Config::default()).expect("default config must build")
}

#[tokio::test]
async fn fresh_download_requests_full_range_and_succeeds() {
    let server = MockServer::start().await;
    let remote = body_bytes(1_000_000);

    Mock::given(method("GET"))
        .and(path("/big.bin"))
        .and(header("Range", "bytes=0-"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(remote.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("big.bin");

    let totals: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let totals_in_hook = totals.clone();
    let hooks = DownloadHooks {
        on_start: Some(Box::new(move |total| {
            totals_in_hook.lock().unwrap().push(total);
        })),
        on_progress: None,
    };

    let outcome = downloader()
        .download_with_hooks(&format!("{}/big.bin", server.uri()), &dest, hooks)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), remote);
    // The start hook fired exactly once, with the full resolved size.
    assert_eq!(*totals.lock().unwrap(), vec![1_000_000]);
}

#[tokio::test]
async fn partial_file_resumes_from_its_size() {
    let server = MockServer::start().await;
    let remote = body_bytes(1_000_000);
    let tail = remote[400_000..].to_vec();

    // The server only sees the open-ended range for the missing suffix and
    // answers with the remaining 600,000 bytes.
    Mock::given(method("GET"))
        .and(path("/big.bin"))
        .and(header("Range", "bytes=400000-"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(tail))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("big.bin");
    tokio::fs::write(&dest, &remote[..400_000]).await.unwrap();

    let sizes: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let sizes_in_hook = sizes.clone();
    let hooks = DownloadHooks::on_progress(move |size| {
        sizes_in_hook.lock().unwrap().push(size);
    });

    let outcome = downloader()
        .download_with_hooks(&format!("{}/big.bin", server.uri()), &dest, hooks)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), remote);

    // Progress reports are cumulative and include the pre-existing bytes.
    let sizes = sizes.lock().unwrap();
    assert!(!sizes.is_empty());
    assert!(sizes.windows(2).all(|w| w[0] <= w[1]), "sizes not monotonic");
    assert!(*sizes.first().unwrap() > 400_000);
    assert_eq!(*sizes.last().unwrap(), 1_000_000);
}

#[tokio::test]
async fn range_not_satisfiable_classifies_as_already_complete() {
    let server = MockServer::start().await;
    let remote = body_bytes(50_000);

    Mock::given(method("GET"))
        .and(path("/done.bin"))
        .and(header("Range", "bytes=50000-"))
        .respond_with(ResponseTemplate::new(416))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("done.bin");
    tokio::fs::write(&dest, &remote).await.unwrap();

    let outcome = downloader()
        .download(&format!("{}/done.bin", server.uri()), &dest)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::AlreadyComplete);
    // The fully-downloaded file is untouched.
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), remote);
}

#[tokio::test]
async fn not_found_surfaces_status_and_leaves_existing_bytes_intact() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone.bin"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>not found</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("gone.bin");
    let existing = body_bytes(12_345);
    tokio::fs::write(&dest, &existing).await.unwrap();

    let err = downloader()
        .download(&format!("{}/gone.bin", server.uri()), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Http { status: 404 }));
    assert!(!err.is_retryable());
    // No error-body garbage was appended to the partial file.
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), existing);
}

#[tokio::test]
async fn server_error_is_classified_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky.bin"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("flaky.bin");

    let err = downloader()
        .download(&format!("{}/flaky.bin", server.uri()), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Http { status: 503 }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn connection_failure_surfaces_as_network_error() {
    // Nothing listens on this port; the request fails below HTTP.
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("never.bin");

    let err = downloader()
        .download("http://127.0.0.1:1/never.bin", &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn second_attempt_after_success_reports_already_complete() {
    let server = MockServer::start().await;
    let remote = body_bytes(8_192);

    Mock::given(method("GET"))
        .and(path("/file.bin"))
        .and(header("Range", "bytes=0-"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(remote.clone()))
        .expect(1)
        .mount(&server)
        .await;
    // Once the file is complete, the resume range starts past end-of-file
    // and a well-behaved server answers 416.
    Mock::given(method("GET"))
        .and(path("/file.bin"))
        .and(header("Range", "bytes=8192-"))
        .respond_with(ResponseTemplate::new(416))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("file.bin");
    let url = format!("{}/file.bin", server.uri());
    let downloader = downloader();

    assert_eq!(downloader.download(&url, &dest).await.unwrap(), Outcome::Success);
    assert_eq!(
        downloader.download(&url, &dest).await.unwrap(),
        Outcome::AlreadyComplete
    );
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), remote);
}

#[tokio::test]
async fn interrupted_then_resumed_download_reassembles_the_file() {
    // First attempt is cut short by the server delivering only a prefix
    // with an honest Content-Length for it; the second attempt fills in
    // the rest. Models the retry loop a caller would write.
    let server = MockServer::start().await;
    let remote = body_bytes(300_000);

    Mock::given(method("GET"))
        .and(path("/movie.bin"))
        .and(header("Range", "bytes=0-"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(remote[..120_000].to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie.bin"))
        .and(header("Range", "bytes=120000-"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(remote[120_000..].to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("movie.bin");
    let url = format!("{}/movie.bin", server.uri());
    let downloader = downloader();

    downloader.download(&url, &dest).await.unwrap();
    assert_eq!(tokio::fs::metadata(&dest).await.unwrap().len(), 120_000);

    downloader.download(&url, &dest).await.unwrap();
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), remote);
}
