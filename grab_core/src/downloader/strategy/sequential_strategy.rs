use async_trait::async_trait;

use crate::downloader::strategy::fetch_strategy::{FetchStrategy, RunContext};
use crate::types::types::{ItemReport, Mode};

/// One item at a time, in input order. A failed item does not stop the
/// items after it.
pub struct SequentialStrategy;

#[async_trait]
impl FetchStrategy for SequentialStrategy {
    fn mode(&self) -> Mode {
        Mode::Sequential
    }

    async fn fetch_all(&self, urls: &[String], ctx: &RunContext) -> Vec<ItemReport> {
        let mut reports = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            let outcome = ctx.run_unit(index, url).await;
            let report = ItemReport {
                index,
                url: url.clone(),
                outcome,
            };
            ctx.emit(report.clone()).await;
            reports.push(report);
        }
        reports
    }
}
