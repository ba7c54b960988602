use std::fs;
use std::path::Path;
use std::time::Duration;

use human_repr::HumanDuration;
use serde::{Serialize, Serializer};

use crate::error::SetupError;
use crate::job::Mode;

#[derive(Clone, Debug, Serialize)]
pub struct MetricRecord {
    pub format: String,
    pub mode: Mode,
    #[serde(rename = "elapsed_seconds", serialize_with = "as_seconds")]
    pub elapsed: Duration,
    /// Whole megabytes of the output directory, `None` when it could not be measured.
    pub disk_usage_mb: Option<u64>,
    pub files: usize,
    pub failures: usize,
}

impl MetricRecord {
    pub fn new(format: &str, mode: Mode) -> Self {
        MetricRecord {
            format: String::from(format),
            mode,
            elapsed: Duration::ZERO,
            disk_usage_mb: None,
            files: 0,
            failures: 0,
        }
    }
}

fn as_seconds<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub compression: Vec<MetricRecord>,
    pub decompression: Vec<MetricRecord>,
}

impl Report {
    pub fn times(records: &[MetricRecord]) -> String {
        let pairs: Vec<String> = records.iter()
            .map(|r| format!("({}, {})", r.format, r.elapsed.as_secs_f64().human_duration()))
            .collect();
        format!("[{}]", pairs.join(", "))
    }

    pub fn usages(records: &[MetricRecord]) -> String {
        let pairs: Vec<String> = records.iter()
            .map(|r| match r.disk_usage_mb {
                Some(mb) => format!("({}, {} MB)", r.format, mb),
                None => format!("({}, n/a)", r.format),
            })
            .collect();
        format!("[{}]", pairs.join(", "))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), SetupError> {
        let json = self.to_json()
            .map_err(|e| SetupError::for_path(path, &format!("cannot serialize report ({e})")))?;
        fs::write(path, json)
            .map_err(|e| SetupError::for_path(path, &format!("cannot write report ({e})")))
    }
}
