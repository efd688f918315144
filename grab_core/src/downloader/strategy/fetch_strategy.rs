use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::downloader::item_handler::ItemHandler;
use crate::report::RunEvent;
use crate::types::types::{FetchError, FetchOutcome, ItemReport, Mode};

/// Everything a strategy needs to run units. Cheap to clone; concurrent
/// units each carry their own copy.
#[derive(Clone)]
pub struct RunContext {
    pub handler: Arc<dyn ItemHandler>,
    pub events: mpsc::Sender<RunEvent>,
    pub cancel_token: CancellationToken,
    pub unit_timeout: Option<Duration>,
}

impl RunContext {
    /// Runs the handler for one item under the deadline and cancellation
    /// token. A panicking handler becomes [`FetchOutcome::Panicked`].
    pub async fn run_unit(&self, index: usize, url: &str) -> FetchOutcome {
        if self.cancel_token.is_cancelled() {
            return FetchOutcome::Cancelled;
        }

        let work = async {
            match self.unit_timeout {
                Some(limit) => {
                    match tokio::time::timeout(limit, self.handler.handle(index, url)).await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            log::warn!("[strategy] item={}: no result within {:?}", index, limit);
                            FetchError::Timeout(limit).into()
                        }
                    }
                }
                None => self.handler.handle(index, url).await,
            }
        };
        let work = AssertUnwindSafe(work).catch_unwind();

        tokio::select! {
            _ = self.cancel_token.cancelled() => FetchOutcome::Cancelled,
            result = work => result.unwrap_or_else(|payload| FetchOutcome::Panicked {
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    /// Sends a finished item to the notifier. A closed channel only means
    /// nobody is listening.
    pub async fn emit(&self, report: ItemReport) {
        let _ = self.events.send(RunEvent::Item(report)).await;
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unit panicked".to_string()
    }
}

/// A way of driving the handler over every identifier. Implementations must
/// invoke the handler once per identifier and return one report per
/// identifier, ordered by index.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn mode(&self) -> Mode;

    async fn fetch_all(&self, urls: &[String], ctx: &RunContext) -> Vec<ItemReport>;
}
