use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;

use grab_core::config::FetchConfig;
use grab_core::destination::DestinationPolicy;
use grab_core::downloader::batch_downloader::BatchDownloader;
use grab_core::downloader::image_grabber::HttpSaveHandler;
use grab_core::downloader::strategy::concurrent_strategy::ConcurrentStrategy;
use grab_core::downloader::strategy::fetch_strategy::FetchStrategy;
use grab_core::downloader::strategy::sequential_strategy::SequentialStrategy;

mod terminal_observer;
use terminal_observer::TerminalObserver;

const SAMPLE_URLS: [&str; 5] = [
    "https://unsplash.com/photos/a-view-of-the-top-of-a-mountain-in-the-clouds-wdQ7DUGJmk8",
    "https://unsplash.com/photos/a-man-in-a-kimono-walking-down-a-dark-alley-mHS1sTT2ybQ",
    "https://unsplash.com/photos/a-very-tall-building-with-lots-of-windows-d1h2rPLWfBg",
    "https://unsplash.com/photos/a-leaf-is-laying-on-the-ground-in-the-middle-of-the-road-DIi8kbZZmKQ",
    "https://unsplash.com/photos/a-cup-of-hot-chocolate-with-marshmallows-in-it-s0Cnecr8W4U",
];

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RunMode {
    Both,
    Sequential,
    Concurrent,
}

impl RunMode {
    fn strategies(self) -> Vec<Arc<dyn FetchStrategy>> {
        let sequential: Arc<dyn FetchStrategy> = Arc::new(SequentialStrategy);
        let concurrent: Arc<dyn FetchStrategy> = Arc::new(ConcurrentStrategy);
        match self {
            RunMode::Both => vec![sequential, concurrent],
            RunMode::Sequential => vec![sequential],
            RunMode::Concurrent => vec![concurrent],
        }
    }
}

#[derive(Parser)]
#[command(name = "grab", about = "Fetch a list of images sequentially and concurrently")]
struct Args {
    /// URLs to fetch (defaults to a built-in list of sample images)
    urls: Vec<String>,

    /// Which strategies to run, in order
    #[arg(short, long, value_enum, default_value_t = RunMode::Both)]
    mode: RunMode,

    /// Directory for per-item output files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Write every item to this one file instead (last writer wins)
    #[arg(long, value_name = "NAME")]
    single_file: Option<PathBuf>,

    /// Deadline for each item, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[arg(long, default_value = "10")]
    connect_timeout_secs: u64,

    /// Print one JSON report per run instead of status lines
    #[arg(long)]
    json: bool,

    /// Exit with status 1 when any item failed
    #[arg(long)]
    fail_on_error: bool,
}

impl Args {
    fn fetch_config(&self) -> FetchConfig {
        let destination = match &self.single_file {
            Some(path) => DestinationPolicy::Shared(path.clone()),
            None => DestinationPolicy::PerItem {
                dir: self.output_dir.clone(),
            },
        };
        FetchConfig {
            destination,
            unit_timeout: self.timeout_secs.map(Duration::from_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }

    fn urls(&self) -> Vec<String> {
        if self.urls.is_empty() {
            SAMPLE_URLS.iter().map(|u| u.to_string()).collect()
        } else {
            self.urls.clone()
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();
    let urls = args.urls();
    let config = args.fetch_config();

    let handler = match HttpSaveHandler::new(&config) {
        Ok(handler) => Arc::new(handler),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let cancel_token = CancellationToken::new();
    {
        let token = cancel_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("interrupted, cancelling unfinished items");
                token.cancel();
            }
        });
    }

    let observer = Arc::new(TerminalObserver::new(!args.json));
    let mut any_failed = false;

    for strategy in args.mode.strategies() {
        let mut downloader = BatchDownloader::new(strategy, handler.clone())
            .with_unit_timeout(config.unit_timeout)
            .with_cancel_token(cancel_token.clone());
        downloader.add_observer(observer.clone());

        let report = downloader.download(&urls).await;
        any_failed |= report.failed() > 0;

        if args.json {
            match report.to_json() {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Failed to encode report: {}", e),
            }
        }
    }

    if args.fail_on_error && any_failed {
        std::process::exit(1);
    }
}
