// Case runner: discovery, one download and stream check per segment, ordered results.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use futures::{StreamExt, stream};
use tracing::{debug, info, warn};

use crate::{
    CheckError, CheckerConfig,
    client::create_client,
    fetcher::{PlaylistFetcher, ResourceFetcher},
    report::{CaseOutcome, CaseReport, RunReport},
    resolver::{SegmentCase, SegmentResolver},
    validator::inspect,
};

/// Progress notifications emitted while a run proceeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckEvent {
    /// Segment URLs have been collected
    Discovered { total: usize },
    /// A segment download has started
    CaseStarted { index: usize, url: String },
    /// A segment has an outcome, including skipped ones
    CaseFinished { index: usize, outcome: CaseOutcome },
}

/// Callback invoked for every [`CheckEvent`]
pub type OnEvent = Arc<dyn Fn(CheckEvent) + Send + Sync>;

/// Checks every segment reachable from a master playlist
pub struct SegmentChecker<F = PlaylistFetcher> {
    fetcher: F,
    config: CheckerConfig,
    on_event: Option<OnEvent>,
}

impl SegmentChecker<PlaylistFetcher> {
    /// Checker backed by an HTTP client built from `config`
    pub fn from_config(config: CheckerConfig) -> Result<Self, CheckError> {
        let client = create_client(&config)?;
        Ok(Self::new(PlaylistFetcher::new(client), config))
    }
}

impl<F: ResourceFetcher> SegmentChecker<F> {
    pub fn new(fetcher: F, config: CheckerConfig) -> Self {
        Self {
            fetcher,
            config,
            on_event: None,
        }
    }

    pub fn with_event_handler(mut self, on_event: OnEvent) -> Self {
        self.on_event = Some(on_event);
        self
    }

    fn emit(&self, event: CheckEvent) {
        if let Some(on_event) = &self.on_event {
            on_event(event);
        }
    }

    /// Collect the segments of `master_url`, one case per segment URL
    pub async fn discover(&self, master_url: &str) -> Result<Vec<SegmentCase>, CheckError> {
        let cases = SegmentResolver::new(&self.fetcher, self.config.url_resolution)
            .resolve_cases(master_url)
            .await?;
        self.emit(CheckEvent::Discovered { total: cases.len() });
        Ok(cases)
    }

    /// Download one segment and check its streams.
    ///
    /// A non-success status or a missing stream fails the case. Transport
    /// errors and segments that cannot be opened as MPEG-TS are errors.
    pub async fn run_case(&self, case: &SegmentCase) -> CaseReport {
        let start = Instant::now();
        self.emit(CheckEvent::CaseStarted {
            index: case.index,
            url: case.url.clone(),
        });

        let report = match self.fetcher.fetch_bytes(&case.url).await {
            Err(e) if e.is_status() => {
                CaseReport::new(case.clone(), CaseOutcome::Failed(e.to_string()))
            }
            Err(e) => CaseReport::new(case.clone(), CaseOutcome::Errored(e.to_string())),
            Ok(body) => {
                let (outcome, streams) = match inspect(&body) {
                    Ok(presence) => match presence.check() {
                        Ok(()) => (CaseOutcome::Passed, presence.streams),
                        Err(e) => (CaseOutcome::Failed(e.to_string()), presence.streams),
                    },
                    Err(e) => (CaseOutcome::Errored(e.to_string()), Vec::new()),
                };
                CaseReport {
                    bytes: Some(body.len()),
                    streams,
                    ..CaseReport::new(case.clone(), outcome)
                }
            }
        }
        .with_elapsed(start.elapsed());

        match &report.outcome {
            CaseOutcome::Passed => debug!(url = %case.url, "Segment passed"),
            CaseOutcome::Failed(reason) => warn!(url = %case.url, %reason, "Segment failed"),
            CaseOutcome::Errored(reason) => warn!(url = %case.url, %reason, "Segment errored"),
            CaseOutcome::Skipped => {}
        }

        self.emit(CheckEvent::CaseFinished {
            index: case.index,
            outcome: report.outcome.clone(),
        });
        report
    }

    /// Run every case; reports come back in the order of `cases`
    pub async fn run(&self, master_url: &str, cases: Vec<SegmentCase>) -> RunReport {
        let start = Instant::now();
        let concurrency = self.config.concurrency.max(1);
        let stop = AtomicBool::new(false);
        let stop = &stop;

        let reports: Vec<CaseReport> = stream::iter(cases)
            .map(|case| async move {
                if stop.load(Ordering::Acquire) {
                    self.emit(CheckEvent::CaseFinished {
                        index: case.index,
                        outcome: CaseOutcome::Skipped,
                    });
                    return CaseReport::new(case, CaseOutcome::Skipped);
                }

                let report = self.run_case(&case).await;
                if self.config.fail_fast && !report.outcome.is_passed() {
                    stop.store(true, Ordering::Release);
                }
                report
            })
            .buffered(concurrency)
            .collect()
            .await;

        let run = RunReport::new(master_url, reports, start.elapsed());
        info!(
            master_url,
            passed = run.summary.passed,
            failed = run.summary.failed,
            errors = run.summary.errors,
            skipped = run.summary.skipped,
            "Check run finished"
        );
        run
    }

    /// Discover and run in one go
    pub async fn check(&self, master_url: &str) -> Result<RunReport, CheckError> {
        let cases = self.discover(master_url).await?;
        Ok(self.run(master_url, cases).await)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::StatusCode;

    use super::*;
    use crate::testing::ts_segment;

    #[derive(Default)]
    struct FakeFetcher {
        bodies: HashMap<String, (Vec<u8>, Duration)>,
    }

    impl FakeFetcher {
        fn with(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.with_delay(url, body, Duration::ZERO)
        }

        fn with_delay(mut self, url: &str, body: impl Into<Vec<u8>>, delay: Duration) -> Self {
            self.bodies.insert(url.to_string(), (body.into(), delay));
            self
        }
    }

    #[async_trait]
    impl ResourceFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String, CheckError> {
            let body = self.fetch_bytes(url).await?;
            Ok(String::from_utf8_lossy(&body).into_owned())
        }

        async fn fetch_bytes(&self, url: &str) -> Result<Bytes, CheckError> {
            let (body, delay) = self.bodies.get(url).ok_or_else(|| CheckError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
            })?;
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
            Ok(Bytes::from(body.clone()))
        }
    }

    fn case(index: usize, url: &str) -> SegmentCase {
        SegmentCase {
            index,
            url: url.to_string(),
            variant_url: "http://h/v.m3u8".to_string(),
        }
    }

    #[tokio::test]
    async fn test_good_segment_passes() {
        let fetcher = FakeFetcher::default()
            .with("http://h/m.m3u8", "v.m3u8\n")
            .with("http://h/v.m3u8", "a.ts\n")
            .with("http://h/a.ts", ts_segment(&[0x1B, 0x0F]));
        let checker = SegmentChecker::new(fetcher, CheckerConfig::default());

        let run = checker.check("http://h/m.m3u8").await.unwrap();
        assert_eq!(run.cases.len(), 1);
        assert_eq!(run.cases[0].outcome, CaseOutcome::Passed);
        assert_eq!(run.cases[0].streams.len(), 2);
        assert!(run.cases[0].bytes.is_some());
        assert!(run.is_success());
    }

    #[tokio::test]
    async fn test_outcomes_are_classified() {
        let fetcher = FakeFetcher::default()
            .with("http://h/audio.ts", ts_segment(&[0x0F]))
            .with("http://h/garbage.ts", "<html>oops</html>");
        let checker = SegmentChecker::new(fetcher, CheckerConfig::default());

        let audio_only = checker.run_case(&case(0, "http://h/audio.ts")).await;
        assert_eq!(
            audio_only.outcome,
            CaseOutcome::Failed("No video stream found in .ts segment".into())
        );
        assert_eq!(audio_only.streams.len(), 1);

        let missing = checker.run_case(&case(1, "http://h/missing.ts")).await;
        assert!(matches!(missing.outcome, CaseOutcome::Failed(ref r) if r.contains("404")));
        assert_eq!(missing.bytes, None);

        let garbage = checker.run_case(&case(2, "http://h/garbage.ts")).await;
        assert!(matches!(garbage.outcome, CaseOutcome::Errored(_)));
    }

    #[tokio::test]
    async fn test_discovery_failure_is_an_error() {
        let checker = SegmentChecker::new(FakeFetcher::default(), CheckerConfig::default());
        let err = checker.check("http://h/m.m3u8").await.unwrap_err();
        assert!(err.is_status());
    }

    #[tokio::test]
    async fn test_concurrent_run_keeps_discovery_order() {
        let fetcher = FakeFetcher::default()
            .with_delay("http://h/0.ts", ts_segment(&[0x1B, 0x0F]), Duration::from_millis(60))
            .with_delay("http://h/1.ts", ts_segment(&[0x1B]), Duration::from_millis(20))
            .with("http://h/2.ts", ts_segment(&[0x1B, 0x0F]));
        let config = CheckerConfig::builder().with_concurrency(3).build();
        let checker = SegmentChecker::new(fetcher, config);

        let cases = (0..3).map(|i| case(i, &format!("http://h/{i}.ts"))).collect();
        let run = checker.run("http://h/m.m3u8", cases).await;

        let indices: Vec<_> = run.cases.iter().map(|r| r.case.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(run.summary.passed, 2);
        assert_eq!(run.summary.failed, 1);
    }

    #[tokio::test]
    async fn test_fail_fast_skips_remaining_cases() {
        let fetcher = FakeFetcher::default()
            .with("http://h/0.ts", ts_segment(&[0x1B, 0x0F]))
            .with("http://h/1.ts", ts_segment(&[0x1B]))
            .with("http://h/2.ts", ts_segment(&[0x1B, 0x0F]));
        let config = CheckerConfig::builder().with_fail_fast(true).build();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let checker = SegmentChecker::new(fetcher, config)
            .with_event_handler(Arc::new(move |event| sink.lock().unwrap().push(event)));

        let cases = (0..3).map(|i| case(i, &format!("http://h/{i}.ts"))).collect();
        let run = checker.run("http://h/m.m3u8", cases).await;

        assert_eq!(run.cases[0].outcome, CaseOutcome::Passed);
        assert!(matches!(run.cases[1].outcome, CaseOutcome::Failed(_)));
        assert_eq!(run.cases[2].outcome, CaseOutcome::Skipped);
        assert!(!run.is_success());

        let events = events.lock().unwrap();
        let started = events
            .iter()
            .filter(|e| matches!(e, CheckEvent::CaseStarted { .. }))
            .count();
        assert_eq!(started, 2);
        assert_eq!(
            events.last(),
            Some(&CheckEvent::CaseFinished {
                index: 2,
                outcome: CaseOutcome::Skipped
            })
        );
    }

    #[tokio::test]
    async fn test_discover_emits_total() {
        let fetcher = FakeFetcher::default()
            .with("http://h/m.m3u8", "v.m3u8\n")
            .with("http://h/v.m3u8", "a.ts\nb.ts\n");
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let checker = SegmentChecker::new(fetcher, CheckerConfig::default())
            .with_event_handler(Arc::new(move |event| sink.lock().unwrap().push(event)));

        let cases = checker.discover("http://h/m.m3u8").await.unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[CheckEvent::Discovered { total: 2 }]
        );
    }
}
