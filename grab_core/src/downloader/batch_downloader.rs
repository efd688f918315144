use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::downloader::item_handler::ItemHandler;
use crate::downloader::strategy::fetch_strategy::{FetchStrategy, RunContext};
use crate::report::{FetchObserver, OutcomeNotifier, RunEvent};
use crate::types::types::RunReport;

const EVENT_BUFFER: usize = 256;

/// Drives one [`FetchStrategy`] over a list of identifiers, times the run
/// and reports outcomes to the registered observers.
pub struct BatchDownloader {
    strategy: Arc<dyn FetchStrategy>,
    handler: Arc<dyn ItemHandler>,
    observers: Vec<Arc<dyn FetchObserver>>,
    cancel_token: CancellationToken,
    unit_timeout: Option<Duration>,
}

impl BatchDownloader {
    pub fn new(strategy: Arc<dyn FetchStrategy>, handler: Arc<dyn ItemHandler>) -> Self {
        Self {
            strategy,
            handler,
            observers: Vec::new(),
            cancel_token: CancellationToken::new(),
            unit_timeout: None,
        }
    }

    pub fn with_unit_timeout(mut self, unit_timeout: Option<Duration>) -> Self {
        self.unit_timeout = unit_timeout;
        self
    }

    /// Shares a cancellation token with other runs (e.g. one Ctrl-C handler
    /// for both modes).
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Register an observer. Observers are kept across runs.
    pub fn add_observer(&mut self, observer: Arc<dyn FetchObserver>) {
        self.observers.push(observer);
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    /// Runs the handler over every identifier and returns once all of them
    /// have finished and every observer has been notified.
    pub async fn download(&self, urls: &[String]) -> RunReport {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);

        let notifier = OutcomeNotifier::new(self.observers.clone());
        let notifier_handle = tokio::spawn(async move {
            notifier.run(events_rx).await;
        });

        let ctx = RunContext {
            handler: Arc::clone(&self.handler),
            events: events_tx,
            cancel_token: self.cancel_token.clone(),
            unit_timeout: self.unit_timeout,
        };

        let mode = self.strategy.mode();
        log::info!("[batch] {:?} run over {} items", mode, urls.len());
        let start = Instant::now();
        let items = self.strategy.fetch_all(urls, &ctx).await;
        let report = RunReport {
            mode,
            elapsed: start.elapsed(),
            items,
        };
        log::info!(
            "[batch] {:?} run finished in {:?}: {} saved, {} failed",
            mode,
            report.elapsed,
            report.succeeded(),
            report.failed()
        );

        let _ = ctx.events.send(RunEvent::Finished(report.clone())).await;

        // Dropping the last sender closes the channel so the notifier exits.
        drop(ctx);
        let _ = notifier_handle.await;

        report
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
    }
}
