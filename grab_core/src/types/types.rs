use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid request for {url}: {reason}")]
    InvalidRequest { url: String, reason: String },
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("Network error: {0}")]
    Transport(reqwest::Error),
    #[error("Response status code: {0}")]
    UnexpectedStatus(u16),
    #[error("Failed to create {path}: {source}")]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Body stream interrupted: {0}")]
    Copy(reqwest::Error),
    #[error("Disk error: {0}")]
    Write(std::io::Error),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Which fan-out strategy produced a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Sequential,
    Concurrent,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Sequential => "Sequential",
            Mode::Concurrent => "Concurrent",
        }
    }
}

/// Result of one handler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    Saved { path: PathBuf, bytes: u64 },
    InvalidRequest { message: String },
    TransportError { message: String },
    BadStatus { code: u16 },
    WriteError { message: String },
    TimedOut { after_ms: u64 },
    Cancelled,
    Panicked { message: String },
}

impl FetchOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, FetchOutcome::Saved { .. })
    }
}

impl From<FetchError> for FetchOutcome {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidRequest { .. } | FetchError::Client(_) => {
                FetchOutcome::InvalidRequest { message: err.to_string() }
            }
            FetchError::Transport(_) | FetchError::Copy(_) => {
                FetchOutcome::TransportError { message: err.to_string() }
            }
            FetchError::UnexpectedStatus(code) => FetchOutcome::BadStatus { code },
            FetchError::FileCreate { .. } | FetchError::Write(_) => {
                FetchOutcome::WriteError { message: err.to_string() }
            }
            FetchError::Timeout(after) => FetchOutcome::TimedOut {
                after_ms: after.as_millis() as u64,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    pub index: usize,
    pub url: String,
    #[serde(flatten)]
    pub outcome: FetchOutcome,
}

/// Everything one Fetch-All run produced, ordered by input index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: Mode,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
    pub items: Vec<ItemReport>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_saved()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// Single-line JSON, one object per run.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_maps_to_bad_status() {
        let outcome = FetchOutcome::from(FetchError::UnexpectedStatus(404));
        assert_eq!(outcome, FetchOutcome::BadStatus { code: 404 });
    }

    #[test]
    fn timeout_maps_to_millis() {
        let outcome = FetchOutcome::from(FetchError::Timeout(Duration::from_millis(1500)));
        assert_eq!(outcome, FetchOutcome::TimedOut { after_ms: 1500 });
    }

    #[test]
    fn report_counts_and_json_shape() {
        let report = RunReport {
            mode: Mode::Concurrent,
            elapsed: Duration::from_millis(42),
            items: vec![
                ItemReport {
                    index: 0,
                    url: "http://a/x.jpg".into(),
                    outcome: FetchOutcome::Saved { path: "x.jpg".into(), bytes: 10 },
                },
                ItemReport {
                    index: 1,
                    url: "http://a/y.jpg".into(),
                    outcome: FetchOutcome::BadStatus { code: 500 },
                },
            ],
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);

        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["mode"], "concurrent");
        assert_eq!(json["elapsed"], 42);
        assert_eq!(json["items"][0]["outcome"], "saved");
        assert_eq!(json["items"][1]["code"], 500);
    }
}
