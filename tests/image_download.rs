//! Integration tests for the image downloader against a mock HTTP server.
//!
//! Images land in a fresh temporary directory per test; the inter-request
//! delay is disabled.

use parentsku::images::{parse_list_content, DownloadStats, Downloader, ImageList};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn downloader(dest: &Path) -> Downloader {
    Downloader::new(reqwest::Client::new(), dest).with_delay(Duration::ZERO)
}

async fn run(dest: &Path, list: &ImageList) -> DownloadStats {
    downloader(dest).run(list, |_| {}).await
}

#[tokio::test]
async fn test_same_line_twice_keeps_both_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"image".to_vec()))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let line = format!("SKU1|{}/img.png", server.uri());

    let first = run(dir.path(), &parse_list_content(&line)).await;
    let second = run(dir.path(), &parse_list_content(&line)).await;

    assert_eq!(first.succeeded, 1);
    assert_eq!(second.succeeded, 1);
    let sku_dir = dir.path().join("SKU1");
    assert!(sku_dir.join("img.png").exists());
    assert!(sku_dir.join("img_1.png").exists());
    assert_eq!(std::fs::read(sku_dir.join("img.png")).unwrap(), b"image");
}

#[tokio::test]
async fn test_malformed_lines_counted_without_requests() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let content = format!(
        "no delimiter {uri}/a.jpg\nSKU|{uri}/a.jpg|extra\n\n",
        uri = server.uri()
    );
    let dir = tempfile::tempdir().unwrap();
    let stats = run(dir.path(), &parse_list_content(&content)).await;

    assert_eq!(
        stats,
        DownloadStats {
            total: 2,
            succeeded: 0,
            skipped: 1,
            errored: 2,
        }
    );
}

#[tokio::test]
async fn test_failures_do_not_stop_the_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let content = format!(
        "A|{uri}/gone.jpg\nB|ftp://example.com/b.jpg\nC|{uri}/ok.jpg\n",
        uri = server.uri()
    );
    let dir = tempfile::tempdir().unwrap();
    let stats = run(dir.path(), &parse_list_content(&content)).await;

    assert_eq!(stats.total, 3);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.errored, 2);
    assert!(dir.path().join("C").join("ok.jpg").exists());
    assert!(!dir.path().join("A").join("gone.jpg").exists());
}

#[tokio::test]
async fn test_url_without_file_name_uses_sku() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
        .mount(&server)
        .await;

    let content = format!("CAM001|{}/", server.uri());
    let dir = tempfile::tempdir().unwrap();
    let stats = run(dir.path(), &parse_list_content(&content)).await;

    assert_eq!(stats.succeeded, 1);
    assert!(dir.path().join("CAM001").join("CAM001.jpg").exists());
}
