use async_trait::async_trait;

use crate::types::types::FetchOutcome;

/// Work done for one identifier. Every failure is folded into the returned
/// outcome; a handler never aborts the run.
#[async_trait]
pub trait ItemHandler: Send + Sync + 'static {
    async fn handle(&self, index: usize, url: &str) -> FetchOutcome;
}
