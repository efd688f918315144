use async_trait::async_trait;

use crate::types::types::{ItemReport, RunReport};

/// Trait for anything that wants to hear about fetch outcomes.
///
/// Lifecycle:
/// - `on_item` is called once per item, in completion order (input order for
///   sequential runs).
/// - `on_finished` is called once after every item of the run has been
///   reported, with the full report.
#[async_trait]
pub trait FetchObserver: Send + Sync + 'static {
    async fn on_item(&self, report: &ItemReport);

    async fn on_finished(&self, report: &RunReport);
}
