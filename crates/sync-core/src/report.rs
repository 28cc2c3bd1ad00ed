//! Run report types.

use std::time::Duration;

/// Outcome of pushing a single record to the CRM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The CRM accepted the record. Direct pushes may return a trace
    /// message identifying the accepted object.
    Success { trace: Option<String> },
    /// The CRM rejected the record or the request failed.
    Failure { error: String },
}

impl SyncOutcome {
    /// Whether this outcome counts as a success.
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Success { .. })
    }
}

/// Aggregated result of one sync run.
///
/// Created when the push loop starts, updated per record, finalized with
/// the elapsed time and handed to the notification sink.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of records fetched from the source.
    pub total: u64,
    /// Number of records the CRM accepted.
    pub succeeded: u64,
    /// Number of records that failed to push.
    pub failed: u64,
    /// Trace messages returned for accepted records, as (record id, trace).
    pub traces: Vec<(String, String)>,
    /// Wall-clock duration of the run.
    pub total_duration: Duration,
}

impl RunSummary {
    /// Start a summary for a run over `total` records.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Record one per-record outcome.
    pub fn record(&mut self, record_id: &str, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Success { trace } => {
                self.succeeded += 1;
                if let Some(trace) = trace {
                    self.traces.push((record_id.to_string(), trace.clone()));
                }
            }
            SyncOutcome::Failure { .. } => {
                self.failed += 1;
            }
        }
    }

    /// Whether every fetched record has an outcome.
    pub fn is_complete(&self) -> bool {
        self.succeeded + self.failed == self.total
    }

    /// Whether the run completed without a single failure.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Records pushed per second over the whole run.
    pub fn records_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.total as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// One-line summary for logs and notifications.
    pub fn summary(&self) -> String {
        format!(
            "Sync finished: {} total, {} succeeded, {} failed in {:?}",
            self.total, self.succeeded, self.failed, self.total_duration
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_add_up() {
        let mut summary = RunSummary::new(3);
        summary.record("a", &SyncOutcome::Success { trace: None });
        summary.record(
            "b",
            &SyncOutcome::Failure {
                error: "rejected".to_string(),
            },
        );
        summary.record("c", &SyncOutcome::Success { trace: None });

        assert!(summary.is_complete());
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_incomplete_run() {
        let mut summary = RunSummary::new(5);
        summary.record("a", &SyncOutcome::Success { trace: None });

        assert!(!summary.is_complete());
    }

    #[test]
    fn test_traces_collected_for_successes_only() {
        let mut summary = RunSummary::new(2);
        summary.record(
            "C14-001",
            &SyncOutcome::Success {
                trace: Some("obj_88".to_string()),
            },
        );
        summary.record(
            "C14-002",
            &SyncOutcome::Failure {
                error: "boom".to_string(),
            },
        );

        assert_eq!(
            summary.traces,
            vec![("C14-001".to_string(), "obj_88".to_string())]
        );
    }

    #[test]
    fn test_empty_run_is_successful() {
        let mut summary = RunSummary::new(0);
        summary.total_duration = Duration::from_millis(5);

        assert!(summary.is_complete());
        assert!(summary.is_success());
        assert_eq!(summary.records_per_second(), 0.0);
    }

    #[test]
    fn test_summary_line() {
        let mut summary = RunSummary::new(10);
        for i in 0..9 {
            summary.record(&format!("r{i}"), &SyncOutcome::Success { trace: None });
        }
        summary.record(
            "r9",
            &SyncOutcome::Failure {
                error: "x".to_string(),
            },
        );
        summary.total_duration = Duration::from_secs(2);

        let line = summary.summary();
        assert!(line.contains("10 total"));
        assert!(line.contains("9 succeeded"));
        assert!(line.contains("1 failed"));
        assert_eq!(summary.records_per_second(), 5.0);
    }
}
