use async_trait::async_trait;

use grab_core::report::FetchObserver;
use grab_core::types::types::{FetchOutcome, ItemReport, RunReport};

/// Prints one status line per item and one timing line per run.
pub struct TerminalObserver {
    enabled: bool,
}

impl TerminalObserver {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

fn status_line(report: &ItemReport) -> String {
    match &report.outcome {
        FetchOutcome::Saved { path, .. } => format!("Image saved to {}", path.display()),
        FetchOutcome::BadStatus { code } => format!("Response status code: {}", code),
        FetchOutcome::InvalidRequest { message }
        | FetchOutcome::TransportError { message }
        | FetchOutcome::WriteError { message } => message.clone(),
        FetchOutcome::TimedOut { after_ms } => {
            format!("{} timed out after {}ms", report.url, after_ms)
        }
        FetchOutcome::Cancelled => format!("{} cancelled", report.url),
        FetchOutcome::Panicked { message } => format!("{} failed: {}", report.url, message),
    }
}

#[async_trait]
impl FetchObserver for TerminalObserver {
    async fn on_item(&self, report: &ItemReport) {
        if self.enabled {
            println!("{}", status_line(report));
        }
    }

    async fn on_finished(&self, report: &RunReport) {
        if self.enabled {
            println!("{} download took: {:?}", report.mode.label(), report.elapsed);
        }
    }
}
