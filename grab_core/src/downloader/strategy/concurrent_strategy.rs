use async_trait::async_trait;

use crate::downloader::strategy::fetch_strategy::{FetchStrategy, RunContext};
use crate::downloader::wait_group::WaitGroup;
use crate::types::types::{FetchOutcome, ItemReport, Mode};

/// One tokio task per item, all spawned up front. Returns once the wait
/// group has drained, with reports ordered by index.
pub struct ConcurrentStrategy;

#[async_trait]
impl FetchStrategy for ConcurrentStrategy {
    fn mode(&self) -> Mode {
        Mode::Concurrent
    }

    async fn fetch_all(&self, urls: &[String], ctx: &RunContext) -> Vec<ItemReport> {
        let wait_group = WaitGroup::new(urls.len());
        let mut handles = Vec::with_capacity(urls.len());

        for (index, url) in urls.iter().enumerate() {
            let guard = wait_group.guard();
            let ctx = ctx.clone();
            let url = url.clone();

            handles.push(tokio::spawn(async move {
                let _guard = guard;
                let outcome = ctx.run_unit(index, &url).await;
                let report = ItemReport { index, url, outcome };
                ctx.emit(report.clone()).await;
                report
            }));
        }

        log::debug!("[concurrent] spawned {} units, waiting", handles.len());
        wait_group.wait().await;

        // Every unit has finished; joining only collects the reports.
        let joined = futures::future::join_all(handles).await;
        let mut reports = Vec::with_capacity(joined.len());
        for (index, result) in joined.into_iter().enumerate() {
            match result {
                Ok(report) => reports.push(report),
                // Handler panics are caught in run_unit; this only sees a
                // panic in emit or a task aborted by runtime shutdown.
                Err(join_err) => {
                    log::error!("[concurrent] item={}: task failed: {}", index, join_err);
                    let report = ItemReport {
                        index,
                        url: urls[index].clone(),
                        outcome: FetchOutcome::Panicked {
                            message: join_err.to_string(),
                        },
                    };
                    ctx.emit(report.clone()).await;
                    reports.push(report);
                }
            }
        }
        reports
    }
}
