use std::sync::Arc;

use tokio::sync::mpsc;

use super::observer::FetchObserver;
use crate::types::types::{ItemReport, RunReport};

/// Messages travelling from the strategy to the notifier task.
#[derive(Debug, Clone)]
pub enum RunEvent {
    Item(ItemReport),
    Finished(RunReport),
}

/// Drains [`RunEvent`]s and fans them out to every registered observer.
///
/// | Channel message      | Observer method called |
/// |----------------------|------------------------|
/// | `RunEvent::Item`     | `on_item(&report)`     |
/// | `RunEvent::Finished` | `on_finished(&report)` |
///
/// Returns when every sender has been dropped.
pub struct OutcomeNotifier {
    observers: Vec<Arc<dyn FetchObserver>>,
}

impl OutcomeNotifier {
    pub fn new(observers: Vec<Arc<dyn FetchObserver>>) -> Self {
        Self { observers }
    }

    pub async fn run(self, mut events_rx: mpsc::Receiver<RunEvent>) {
        while let Some(event) = events_rx.recv().await {
            match event {
                RunEvent::Item(report) => {
                    for observer in &self.observers {
                        observer.on_item(&report).await;
                    }
                }
                RunEvent::Finished(report) => {
                    for observer in &self.observers {
                        observer.on_finished(&report).await;
                    }
                }
            }
        }
    }
}
