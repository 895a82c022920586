//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the book site and tempfile for
//! the destination directory, and run the full crawl end-to-end.

use book_harvest::config::Config;
use book_harvest::crawler::Coordinator;
use book_harvest::state::CrawlPhase;
use book_harvest::storage::{Manifest, SqliteManifest};
use book_harvest::{ExtractionError, HarvestError, LinkOutcome};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, destination: &Path) -> Config {
    config_for_site(&server.uri(), destination)
}

fn config_for_site(base_uri: &str, destination: &Path) -> Config {
    let mut config = Config::default();
    config.site.index_url = format!("{}/", base_uri);
    config.download.destination_dir = destination.to_path_buf();
    config.http.user_agent = "TestHarvest/1.0".to_string();
    config.http.request_timeout_secs = 5;
    config.http.connect_timeout_secs = 5;
    config.http.download_timeout_secs = 5;
    config
}

fn index_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">{}</a>"#, link, link))
        .collect();
    format!(
        "<html><head><title>Books</title></head><body>{}</body></html>",
        anchors
    )
}

fn subpage(file_name: &str) -> String {
    format!(
        r#"<html><body>
        <div id="content"><h1>{name}</h1></div>
        <div id="footer"><button onclick="location.href='{name}'">Download PDF</button></div>
        </body></html>"#,
        name = file_name
    )
}

async fn mount_index(server: &MockServer, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(links)))
        .mount(server)
        .await;
}

/// Mounts a subpage at `/<dir>/` and its file at `/<dir>/<file>`, expecting
/// exactly `transfers` file requests
async fn mount_book(server: &MockServer, dir: &str, file: &str, transfers: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/", dir)))
        .respond_with(ResponseTemplate::new(200).set_body_string(subpage(file)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/{}/{}", dir, file)))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(format!("%PDF-1.4 {}", file).into_bytes()),
        )
        .expect(transfers)
        .mount(server)
        .await;
}

fn partial_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| p.extension().map(|e| e == "tmp").unwrap_or(false))
        .collect()
}

#[tokio::test]
async fn test_full_crawl_downloads_each_book() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let destination = root.path().join("CodeBooks");

    mount_index(
        &mock_server,
        &["Java/", "Python/", "about.html", "mailto:books@example.com"],
    )
    .await;
    mount_book(&mock_server, "Java", "JavaNotes.pdf", 1).await;
    mount_book(&mock_server, "Python", "PythonNotes.pdf", 1).await;

    let config = create_test_config(&mock_server, &destination);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    assert!(destination.is_dir(), "Destination should be created");
    assert_eq!(
        std::fs::read(destination.join("JavaNotes.pdf")).unwrap(),
        b"%PDF-1.4 JavaNotes.pdf"
    );
    assert_eq!(
        std::fs::read(destination.join("PythonNotes.pdf")).unwrap(),
        b"%PDF-1.4 PythonNotes.pdf"
    );
    assert!(partial_files(&destination).is_empty());

    let stats = report.statistics();
    assert_eq!(stats.candidates, 4);
    assert_eq!(stats.downloaded, 2);
    assert_eq!(stats.not_found, 2);
    assert_eq!(stats.failed, 0);

    // Links are reported in index order
    let links: Vec<_> = report.links.iter().map(|l| l.link.as_str()).collect();
    assert_eq!(
        links,
        vec!["Java/", "Python/", "about.html", "mailto:books@example.com"]
    );
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let destination = root.path().join("CodeBooks");

    mount_index(&mock_server, &["Java/", "Python/"]).await;
    // Each file may be transferred exactly once across both runs
    mount_book(&mock_server, "Java", "JavaNotes.pdf", 1).await;
    mount_book(&mock_server, "Python", "PythonNotes.pdf", 1).await;

    let config = create_test_config(&mock_server, &destination);

    let first = Coordinator::new(config.clone())
        .unwrap()
        .run()
        .await
        .expect("First crawl failed");
    assert_eq!(first.statistics().downloaded, 2);

    let second = Coordinator::new(config)
        .unwrap()
        .run()
        .await
        .expect("Second crawl failed");
    let stats = second.statistics();
    assert_eq!(stats.downloaded, 0);
    assert_eq!(stats.already_present, 2);

    for entry in &second.links {
        assert!(matches!(
            entry.outcome,
            Ok(LinkOutcome::AlreadyPresent { .. })
        ));
    }

    mock_server.verify().await;
}

#[tokio::test]
async fn test_duplicate_links_fetch_once() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount_index(&mock_server, &["Java/", "Java/"]).await;
    mount_book(&mock_server, "Java", "JavaNotes.pdf", 1).await;

    let config = create_test_config(&mock_server, root.path());
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert!(report.links[0]
        .outcome
        .as_ref()
        .is_ok_and(|o| o.is_downloaded()));
    assert!(report.links[1]
        .outcome
        .as_ref()
        .is_ok_and(|o| o.is_already_present()));
}

#[tokio::test]
async fn test_malformed_subpage_does_not_abort_run() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    let dirs: Vec<String> = (1..=10).map(|i| format!("Book{}", i)).collect();
    let links: Vec<String> = dirs.iter().map(|d| format!("{}/", d)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    mount_index(&mock_server, &link_refs).await;

    for (i, dir) in dirs.iter().enumerate() {
        if i == 2 {
            // Book3 has no download button
            Mock::given(method("GET"))
                .and(path(format!("/{}/", dir)))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string("<html><body><p>Coming soon</p></body></html>"),
                )
                .mount(&mock_server)
                .await;
        } else {
            mount_book(&mock_server, dir, &format!("{}.pdf", dir), 1).await;
        }
    }

    let config = create_test_config(&mock_server, root.path());
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    let stats = report.statistics();
    assert_eq!(stats.candidates, 10);
    assert_eq!(stats.downloaded, 9);
    assert_eq!(stats.failed, 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].position, 3);
    assert!(failures[0].subpage_url.ends_with("/Book3/"));
    assert!(matches!(
        failures[0].outcome,
        Err(HarvestError::Extraction(
            ExtractionError::MissingAttribute { .. }
        ))
    ));

    for (i, dir) in dirs.iter().enumerate() {
        let file = root.path().join(format!("{}.pdf", dir));
        assert_eq!(file.exists(), i != 2, "unexpected state for {}", dir);
    }
}

#[tokio::test]
async fn test_not_found_subpage_is_skipped() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount_index(&mock_server, &["Gone/"]).await;

    Mock::given(method("GET"))
        .and(path("/Gone/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Gone/Gone.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("never"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, root.path());
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.links.len(), 1);
    assert!(matches!(
        report.links[0].outcome,
        Ok(LinkOutcome::NotFound { status: 404 })
    ));
    assert_eq!(report.statistics().failed, 0);
}

#[tokio::test]
async fn test_index_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, root.path());
    let result = Coordinator::new(config).unwrap().run().await;

    assert!(matches!(
        result,
        Err(HarvestError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_failed_transfer_leaves_no_files() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount_index(&mock_server, &["Broken/"]).await;

    Mock::given(method("GET"))
        .and(path("/Broken/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(subpage("Broken.pdf")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Broken/Broken.pdf"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, root.path());
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert!(matches!(
        report.links[0].outcome,
        Err(HarvestError::Status { status: 500, .. })
    ));
    assert!(!root.path().join("Broken.pdf").exists());
    assert!(partial_files(root.path()).is_empty());
}

fn html_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

/// Serves an index with one book whose transfer stops after a few bytes
/// although the headers announce far more
async fn serve_truncated_book(listener: TcpListener) {
    while let Ok((mut socket, _)) = listener.accept().await {
        tokio::spawn(async move {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }

            let request = String::from_utf8_lossy(&request);
            let response = match request.split_whitespace().nth(1) {
                Some("/") => html_response(&index_page(&["Cut/"])),
                Some("/Cut/") => html_response(&subpage("Cut.pdf")),
                _ => "HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: 100000\r\nConnection: close\r\n\r\n%PDF-1.4 cut"
                    .to_string(),
            };

            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
    }
}

#[tokio::test]
async fn test_interrupted_transfer_removes_partial_file() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(serve_truncated_book(listener));

    let root = TempDir::new().unwrap();
    let config = config_for_site(&format!("http://{}", address), root.path());
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.links.len(), 1);
    assert!(matches!(
        report.links[0].outcome,
        Err(HarvestError::Http { .. })
    ));
    assert_eq!(report.statistics().failed, 1);

    let left: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
    assert!(left.is_empty(), "files left behind: {:?}", left);
}

#[tokio::test]
async fn test_coordinator_can_run_twice() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount_index(&mock_server, &["Java/"]).await;
    mount_book(&mock_server, "Java", "JavaNotes.pdf", 1).await;

    let config = create_test_config(&mock_server, root.path());
    let mut coordinator = Coordinator::new(config).unwrap();

    let first = coordinator.run().await.expect("First run failed");
    assert_eq!(first.statistics().downloaded, 1);
    assert_eq!(coordinator.phase(), CrawlPhase::Done);

    let second = coordinator.run().await.expect("Second run failed");
    assert_eq!(second.statistics().already_present, 1);
    assert_eq!(coordinator.phase(), CrawlPhase::Done);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_stale_partials_swept_before_run() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    std::fs::write(root.path().join("A.pdf"), b"complete").unwrap();
    std::fs::write(root.path().join("A.pdf.tmp"), b"half").unwrap();
    std::fs::write(root.path().join("B.tmp"), b"half").unwrap();

    mount_index(&mock_server, &[]).await;

    let config = create_test_config(&mock_server, root.path());
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.sweep.removed.len(), 2);
    assert!(root.path().join("A.pdf").exists());
    assert!(!root.path().join("A.pdf.tmp").exists());
    assert!(!root.path().join("B.tmp").exists());
    assert!(report.links.is_empty());
}

#[tokio::test]
async fn test_manifest_records_downloads() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();
    let destination = root.path().join("CodeBooks");
    let manifest_path = root.path().join("manifest.db");

    mount_index(&mock_server, &["Java/"]).await;
    mount_book(&mock_server, "Java", "JavaNotes.pdf", 1).await;

    let mut config = create_test_config(&mock_server, &destination);
    config.download.manifest_path = Some(manifest_path.clone());

    Coordinator::new(config.clone())
        .unwrap()
        .with_config_hash("abc123")
        .run()
        .await
        .unwrap();

    // A second run must not add a second transfer or record
    Coordinator::new(config).unwrap().run().await.unwrap();

    let manifest = SqliteManifest::new(&manifest_path).unwrap();
    let records = manifest.list_downloads().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file_name, "JavaNotes.pdf");
    assert_eq!(records[0].bytes, "%PDF-1.4 JavaNotes.pdf".len() as u64);
    assert!(records[0].source_url.ends_with("/Java/JavaNotes.pdf"));

    let run = manifest.get_run(records[0].run_id).unwrap();
    assert_eq!(run.config_hash, "abc123");
    assert_eq!(run.downloaded, 1);
}
