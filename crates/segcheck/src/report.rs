use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::{resolver::SegmentCase, validator::StreamSummary};

/// Result of checking one segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    /// An expectation did not hold: bad status or a missing stream
    Failed(String),
    /// The check could not run: network failure or unreadable container
    Errored(String),
    /// Not run because an earlier case did not pass
    Skipped,
}

impl CaseOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, CaseOutcome::Passed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaseOutcome::Passed => "PASSED",
            CaseOutcome::Failed(_) => "FAILED",
            CaseOutcome::Errored(_) => "ERROR",
            CaseOutcome::Skipped => "SKIPPED",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            CaseOutcome::Failed(reason) | CaseOutcome::Errored(reason) => Some(reason),
            CaseOutcome::Passed | CaseOutcome::Skipped => None,
        }
    }
}

/// Outcome of one segment, attributed by its URL
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    #[serde(flatten)]
    pub case: SegmentCase,
    pub outcome: CaseOutcome,
    pub elapsed_ms: u64,
    /// Size of the downloaded body, when the download succeeded
    pub bytes: Option<usize>,
    pub streams: Vec<StreamSummary>,
}

impl CaseReport {
    pub fn new(case: SegmentCase, outcome: CaseOutcome) -> Self {
        Self {
            case,
            outcome,
            elapsed_ms: 0,
            bytes: None,
            streams: Vec::new(),
        }
    }

    pub(crate) fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = elapsed.as_millis() as u64;
        self
    }
}

/// Every case of a run, in discovery order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub master_url: String,
    pub cases: Vec<CaseReport>,
    pub elapsed_ms: u64,
    pub summary: Summary,
}

impl RunReport {
    pub fn new(master_url: impl Into<String>, cases: Vec<CaseReport>, elapsed: Duration) -> Self {
        let summary = Summary::from_cases(&cases);
        Self {
            master_url: master_url.into(),
            cases,
            elapsed_ms: elapsed.as_millis() as u64,
            summary,
        }
    }

    /// True when no case failed or errored
    pub fn is_success(&self) -> bool {
        self.summary.is_success()
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Outcome counters of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn from_cases(cases: &[CaseReport]) -> Self {
        cases
            .iter()
            .fold(Summary::default(), |mut summary, report| {
                match report.outcome {
                    CaseOutcome::Passed => summary.passed += 1,
                    CaseOutcome::Failed(_) => summary.failed += 1,
                    CaseOutcome::Errored(_) => summary.errors += 1,
                    CaseOutcome::Skipped => summary.skipped += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errors + self.skipped
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total() == 0 {
            return f.write_str("no segments collected");
        }

        let mut parts = Vec::new();
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }
        if self.passed > 0 {
            parts.push(format!("{} passed", self.passed));
        }
        if self.skipped > 0 {
            parts.push(format!("{} skipped", self.skipped));
        }
        if self.errors > 0 {
            let noun = if self.errors == 1 { "error" } else { "errors" };
            parts.push(format!("{} {noun}", self.errors));
        }
        f.write_str(&parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(index: usize, outcome: CaseOutcome) -> CaseReport {
        CaseReport::new(
            SegmentCase {
                index,
                url: format!("http://h/seg{index}.ts"),
                variant_url: "http://h/v.m3u8".to_string(),
            },
            outcome,
        )
    }

    #[test]
    fn test_summary_counts_and_text() {
        let cases = vec![
            report(0, CaseOutcome::Passed),
            report(1, CaseOutcome::Failed("No video stream found in .ts segment".into())),
            report(2, CaseOutcome::Errored("connection refused".into())),
            report(3, CaseOutcome::Passed),
        ];
        let run = RunReport::new("http://h/m.m3u8", cases, Duration::from_millis(1500));
        assert_eq!(run.summary.passed, 2);
        assert_eq!(run.summary.failed, 1);
        assert_eq!(run.summary.errors, 1);
        assert!(!run.is_success());
        assert_eq!(run.summary.to_string(), "1 failed, 2 passed, 1 error");
        assert_eq!(run.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn test_empty_run_is_success() {
        let run = RunReport::new("http://h/m.m3u8", Vec::new(), Duration::ZERO);
        assert!(run.is_success());
        assert_eq!(run.summary.to_string(), "no segments collected");
    }

    #[test]
    fn test_skipped_does_not_fail_a_run() {
        let summary = Summary::from_cases(&[
            report(0, CaseOutcome::Passed),
            report(1, CaseOutcome::Skipped),
        ]);
        assert!(summary.is_success());
        assert_eq!(summary.to_string(), "1 passed, 1 skipped");
    }

    #[test]
    fn test_case_report_json_shape() {
        let value = serde_json::to_value(report(
            1,
            CaseOutcome::Errored("Input is empty".into()),
        ))
        .unwrap();
        assert_eq!(value["index"], 1);
        assert_eq!(value["url"], "http://h/seg1.ts");
        assert_eq!(value["outcome"]["status"], "errored");
        assert_eq!(value["outcome"]["reason"], "Input is empty");
        assert!(value["bytes"].is_null());

        let skipped = serde_json::to_value(CaseOutcome::Skipped).unwrap();
        assert_eq!(skipped, serde_json::json!({ "status": "skipped" }));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(CaseOutcome::Passed.label(), "PASSED");
        assert_eq!(CaseOutcome::Errored("x".into()).label(), "ERROR");
        assert_eq!(CaseOutcome::Failed("why".into()).reason(), Some("why"));
        assert_eq!(CaseOutcome::Skipped.reason(), None);
    }
}
