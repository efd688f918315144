use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use grab_core::config::FetchConfig;
use grab_core::destination::DestinationPolicy;
use grab_core::downloader::batch_downloader::BatchDownloader;
use grab_core::downloader::image_grabber::HttpSaveHandler;
use grab_core::downloader::strategy::concurrent_strategy::ConcurrentStrategy;
use grab_core::downloader::strategy::fetch_strategy::FetchStrategy;
use grab_core::downloader::strategy::sequential_strategy::SequentialStrategy;
use grab_core::report::FetchObserver;
use grab_core::types::types::{FetchOutcome, ItemReport, RunReport};

/// Collects the lines a terminal would print.
#[derive(Default)]
struct LineObserver {
    lines: Mutex<Vec<String>>,
}

#[async_trait]
impl FetchObserver for LineObserver {
    async fn on_item(&self, report: &ItemReport) {
        let line = match &report.outcome {
            FetchOutcome::Saved { path, .. } => format!("saved {}", path.display()),
            FetchOutcome::BadStatus { code } => format!("status {}", code),
            other => format!("error {:?}", other),
        };
        self.lines.lock().unwrap().push(line);
    }

    async fn on_finished(&self, report: &RunReport) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("{} took", report.mode.label()));
    }
}

fn both_modes() -> Vec<Arc<dyn FetchStrategy>> {
    let sequential: Arc<dyn FetchStrategy> = Arc::new(SequentialStrategy);
    let concurrent: Arc<dyn FetchStrategy> = Arc::new(ConcurrentStrategy);
    vec![sequential, concurrent]
}

fn per_item_handler(dir: &std::path::Path) -> Arc<HttpSaveHandler> {
    let config = FetchConfig {
        destination: DestinationPolicy::PerItem {
            dir: dir.to_path_buf(),
        },
        ..FetchConfig::default()
    };
    Arc::new(HttpSaveHandler::new(&config).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_three_items_all_saved() {
    let server = MockServer::start().await;
    let bodies = [b"aaaaaaaaaa", b"bbbbbbbbbb", b"cccccccccc"];
    for (i, body) in bodies.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(format!("/{}.jpg", i)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .expect(2)
            .mount(&server)
            .await;
    }
    let urls: Vec<String> = (0..3).map(|i| format!("{}/{}.jpg", server.uri(), i)).collect();

    let dir = tempfile::tempdir().unwrap();
    let handler = per_item_handler(dir.path());
    let observer = Arc::new(LineObserver::default());

    for strategy in both_modes() {
        let mut downloader = BatchDownloader::new(strategy, handler.clone());
        downloader.add_observer(observer.clone());
        let report = downloader.download(&urls).await;

        assert_eq!(report.succeeded(), 3);
        for (i, body) in bodies.iter().enumerate() {
            let saved = std::fs::read(dir.path().join(format!("{:03}-{}.jpg", i, i))).unwrap();
            assert_eq!(&saved[..], &body[..]);
        }
    }

    let lines = observer.lines.lock().unwrap();
    assert_eq!(lines.iter().filter(|l| l.starts_with("saved")).count(), 6);
    assert_eq!(lines[3], "Sequential took");
    assert_eq!(lines[7], "Concurrent took");
}

#[tokio::test]
async fn test_not_found_item_reports_status_and_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let urls = vec![format!("{}/missing.jpg", server.uri())];

    let dir = tempfile::tempdir().unwrap();
    let handler = per_item_handler(dir.path());

    for strategy in both_modes() {
        let observer = Arc::new(LineObserver::default());
        let mut downloader = BatchDownloader::new(strategy, handler.clone());
        downloader.add_observer(observer.clone());

        let report = downloader.download(&urls).await;

        assert_eq!(report.failed(), 1);
        assert_eq!(report.items[0].outcome, FetchOutcome::BadStatus { code: 404 });
        assert_eq!(observer.lines.lock().unwrap()[0], "status 404");
    }
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_empty_list_prints_only_timing() {
    let dir = tempfile::tempdir().unwrap();
    let handler = per_item_handler(dir.path());
    let observer = Arc::new(LineObserver::default());

    for strategy in both_modes() {
        let mut downloader = BatchDownloader::new(strategy, handler.clone());
        downloader.add_observer(observer.clone());
        let report = downloader.download(&[]).await;
        assert!(report.items.is_empty());
    }

    assert_eq!(
        *observer.lines.lock().unwrap(),
        vec!["Sequential took".to_string(), "Concurrent took".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_batch_keeps_going_after_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/good.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"0123456789".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let urls = vec![
        format!("{}/broken.jpg", server.uri()),
        "::not a url::".to_string(),
        format!("{}/good.jpg", server.uri()),
    ];
    let dir = tempfile::tempdir().unwrap();
    let handler = per_item_handler(dir.path());

    for strategy in both_modes() {
        let downloader = BatchDownloader::new(strategy, handler.clone());
        let report = downloader.download(&urls).await;

        assert_eq!(report.items[0].outcome, FetchOutcome::BadStatus { code: 500 });
        assert!(matches!(report.items[1].outcome, FetchOutcome::InvalidRequest { .. }));
        assert!(report.items[2].outcome.is_saved());
    }
}
