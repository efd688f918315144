pub mod notifier;
pub mod observer;

pub use notifier::{OutcomeNotifier, RunEvent};
pub use observer::FetchObserver;
