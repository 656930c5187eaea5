//! Compliance alerting.
//!
//! [`ComplianceMonitor`] subscribes to the data store, runs the threshold
//! check on every replace and raises an alert through an [`AlertSink`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use equipment_core::{has_violation, ALERT_MESSAGE};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::RecordSnapshot;

/// The user-facing alert surface.
///
/// `alert` is synchronous: it returns once the user has been told.
pub trait AlertSink: Send + Sync + 'static {
    fn alert(&self, message: &str);
}

/// Alert sink that only writes a `warn!` log line.
pub struct LogAlert;

impl AlertSink for LogAlert {
    fn alert(&self, message: &str) {
        warn!("{}", message);
    }
}

/// When a violating store raises an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertPolicy {
    /// Only when the store goes from compliant to violating.
    #[default]
    OnTransition,
    /// On every replace whose list is violating.
    EveryChange,
}

#[derive(Debug, Default)]
struct MonitorState {
    last_revision: u64,
    violating: bool,
}

pub struct ComplianceMonitor {
    policy: AlertPolicy,
    sink: Arc<dyn AlertSink>,
    state: Mutex<MonitorState>,
    raised: AtomicUsize,
}

impl ComplianceMonitor {
    pub fn new(policy: AlertPolicy, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            policy,
            sink,
            state: Mutex::new(MonitorState::default()),
            raised: AtomicUsize::new(0),
        }
    }

    /// Evaluate a snapshot. Returns true if an alert was raised.
    ///
    /// Snapshots older than the last one observed are ignored.
    pub fn observe(&self, snapshot: &RecordSnapshot) -> bool {
        let violating = has_violation(snapshot);

        let raise = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if snapshot.revision() <= state.last_revision && state.last_revision != 0 {
                return false;
            }
            let was_violating = state.violating;
            state.last_revision = snapshot.revision();
            state.violating = violating;

            match self.policy {
                AlertPolicy::OnTransition => violating && !was_violating,
                AlertPolicy::EveryChange => violating,
            }
        };

        if raise {
            self.raised.fetch_add(1, Ordering::SeqCst);
            self.sink.alert(ALERT_MESSAGE);
        }
        raise
    }

    /// Result of the last observed snapshot.
    pub fn is_violating(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).violating
    }

    /// Total alerts raised so far.
    pub fn alerts_raised(&self) -> usize {
        self.raised.load(Ordering::SeqCst)
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }
}
