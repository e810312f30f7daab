use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{PipelineRun, RunHandle, TrackingEvent};
use crate::error::SentimentError;

/// Keeps runs in process, keyed by run id.
///
/// Clones share the same store, so a caller can keep a handle and inspect
/// runs after the pipeline finishes. A poisoned lock is recovered rather than
/// reported; every event is applied whole.
#[derive(Debug, Clone, Default)]
pub struct MemoryTracker {
    runs: Arc<Mutex<Vec<PipelineRun>>>,
}

impl MemoryTracker {
    /// Snapshot of every run recorded so far, oldest first.
    #[must_use]
    pub fn runs(&self) -> Vec<PipelineRun> {
        self.store().clone()
    }

    #[must_use]
    pub fn run(&self, run_id: &str) -> Option<PipelineRun> {
        self.runs().into_iter().find(|r| r.run_id == run_id)
    }

    fn store(&self) -> MutexGuard<'_, Vec<PipelineRun>> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn start_run(&self, run_name: &str) -> RunHandle {
        let handle = RunHandle {
            run_id: uuid::Uuid::new_v4().to_string(),
            run_name: run_name.to_string(),
            experiment_id: None,
            attached: true,
        };
        self.store().push(PipelineRun::new(&handle));
        tracing::debug!(run_id = %handle.run_id, run_name, "run started");
        handle
    }

    pub(crate) fn record(
        &self,
        handle: &RunHandle,
        event: &TrackingEvent,
    ) -> Result<(), SentimentError> {
        let mut runs = self.store();
        let run = runs
            .iter_mut()
            .find(|r| r.run_id == handle.run_id)
            .ok_or_else(|| SentimentError::Tracking(format!("unknown run {}", handle.run_id)))?;
        run.apply(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::RunStatus;

    #[test]
    fn runs_are_isolated_by_id() {
        let tracker = MemoryTracker::default();
        let a = tracker.start_run("pipeline_A");
        let b = tracker.start_run("pipeline_B");
        assert_ne!(a.run_id, b.run_id);

        tracker
            .record(&a, &TrackingEvent::param("company_name", "A"))
            .unwrap();
        tracker
            .record(&b, &TrackingEvent::End { status: RunStatus::Failed })
            .unwrap();

        let run_a = tracker.run(&a.run_id).unwrap();
        let run_b = tracker.run(&b.run_id).unwrap();
        assert_eq!(run_a.param("company_name"), Some("A"));
        assert_eq!(run_a.status, RunStatus::Running);
        assert!(run_b.params.is_empty());
        assert_eq!(run_b.status, RunStatus::Failed);
    }

    #[test]
    fn unknown_run_is_an_error() {
        let tracker = MemoryTracker::default();
        let stray = RunHandle {
            run_id: "missing".to_string(),
            run_name: "x".to_string(),
            experiment_id: None,
            attached: true,
        };
        assert!(tracker
            .record(&stray, &TrackingEvent::metric("confidence", 1.0))
            .is_err());
    }

    #[test]
    fn poisoned_store_keeps_recording() {
        let tracker = MemoryTracker::default();
        let handle = tracker.start_run("pipeline_A");

        let shared = tracker.clone();
        let joined = std::thread::spawn(move || {
            let _guard = shared.runs.lock().unwrap();
            panic!("poison the run store");
        })
        .join();
        assert!(joined.is_err());
        assert!(tracker.runs.is_poisoned());

        assert_eq!(tracker.runs().len(), 1);
        tracker
            .record(&handle, &TrackingEvent::param("company_name", "A"))
            .unwrap();
        let second = tracker.start_run("pipeline_B");
        assert_eq!(tracker.runs().len(), 2);
        assert_eq!(
            tracker.run(&handle.run_id).unwrap().param("company_name"),
            Some("A")
        );
        assert_ne!(second.run_id, handle.run_id);
    }
}
