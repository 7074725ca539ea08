use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use segcheck_engine::{CaseOutcome, CheckEvent};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

fn check_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} {msg}\n[{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} segments",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ")
}

#[derive(Clone)]
pub struct ProgressManager {
    multi: MultiProgress,
    bar: Arc<Mutex<Option<ProgressBar>>>,
    disabled: bool,
}

impl ProgressManager {
    pub fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            bar: Arc::new(Mutex::new(None)),
            disabled: false,
        }
    }

    pub fn new_disabled(multi: MultiProgress) -> Self {
        Self {
            multi,
            bar: Arc::new(Mutex::new(None)),
            disabled: true,
        }
    }

    pub fn handle_event(&self, event: CheckEvent) {
        if self.disabled {
            return;
        }

        let Ok(mut bar) = self.bar.lock() else {
            return;
        };
        match event {
            CheckEvent::Discovered { total } => {
                let new_bar = self.multi.add(ProgressBar::new(total as u64));
                new_bar.set_style(check_style());
                new_bar.set_message("Checking segments");
                new_bar.enable_steady_tick(Duration::from_millis(500));
                *bar = Some(new_bar);
            }
            CheckEvent::CaseStarted { url, .. } => {
                if let Some(bar) = bar.as_ref() {
                    bar.set_message(url);
                }
            }
            CheckEvent::CaseFinished { outcome, .. } => {
                if let Some(bar) = bar.as_ref() {
                    if let CaseOutcome::Failed(reason) | CaseOutcome::Errored(reason) = &outcome {
                        bar.println(format!("{} {reason}", outcome.label()));
                    }
                    bar.inc(1);
                }
            }
        }
    }

    /// Remove the bar once the run is over
    pub fn finish(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(bar) = bar.take() {
                bar.finish_and_clear();
            }
        }
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    fn hidden() -> MultiProgress {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn test_bar_tracks_finished_cases() {
        let manager = ProgressManager::new(hidden());
        manager.handle_event(CheckEvent::Discovered { total: 2 });
        manager.handle_event(CheckEvent::CaseFinished {
            index: 0,
            outcome: CaseOutcome::Passed,
        });

        let position = manager.bar.lock().unwrap().as_ref().map(|b| (b.position(), b.length()));
        assert_eq!(position, Some((1, Some(2))));

        manager.finish();
        assert!(manager.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_disabled_manager_ignores_events() {
        let manager = ProgressManager::new_disabled(hidden());
        manager.handle_event(CheckEvent::Discovered { total: 3 });
        assert!(manager.is_disabled());
        assert!(manager.bar.lock().unwrap().is_none());
    }
}
