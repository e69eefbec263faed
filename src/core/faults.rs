//! # Append-only fault log.
//!
//! Every fault the runtime raises is recorded here before it propagates to
//! the caller, so the most recent and all historical faults stay available
//! for later inspection.
//!
//! ## Rules
//! - Append-only: entries are never trimmed or replaced.
//! - Recording happens before propagation, on every raised fault.
//! - Entries carry a per-log sequence number and a wall-clock timestamp.

use std::sync::Mutex;
use std::time::SystemTime;

use crate::error::ControllerError;

/// A recorded fault entry.
#[derive(Clone, Debug)]
pub struct Fault {
    /// Position in the log (0-based, strictly increasing).
    pub seq: u64,
    /// Wall-clock timestamp of the recording.
    pub at: SystemTime,
    /// The raised error.
    pub error: ControllerError,
}

/// Append-only registry of raised faults.
///
/// # Example
/// ```
/// use ctrlvisor::{ControllerError, FaultLog};
///
/// let log = FaultLog::new();
/// log.record(&ControllerError::InvalidApplication);
///
/// assert_eq!(log.len(), 1);
/// assert_eq!(log.last().unwrap().error.as_label(), "invalid_application");
/// ```
#[derive(Default)]
pub struct FaultLog {
    entries: Mutex<Vec<Fault>>,
}

impl FaultLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fault to the log.
    pub fn record(&self, error: &ControllerError) {
        let mut entries = self.entries.lock().expect("fault log lock poisoned");
        let seq = entries.len() as u64;
        entries.push(Fault {
            seq,
            at: SystemTime::now(),
            error: error.clone(),
        });
    }

    /// Returns the most recently recorded fault.
    pub fn last(&self) -> Option<Fault> {
        self.entries
            .lock()
            .expect("fault log lock poisoned")
            .last()
            .cloned()
    }

    /// Returns the full fault history, oldest first.
    pub fn all(&self) -> Vec<Fault> {
        self.entries.lock().expect("fault log lock poisoned").clone()
    }

    /// Number of recorded faults.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("fault log lock poisoned").len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_append_only_and_ordered() {
        let log = FaultLog::new();
        log.record(&ControllerError::InvalidApplication);
        log.record(&ControllerError::InvalidShortName);
        log.record(&ControllerError::ControllerNotFound {
            application: "editor".into(),
        });

        let all = log.all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].seq, 0);
        assert_eq!(all[2].seq, 2);
        assert_eq!(all[0].error.as_label(), "invalid_application");
        assert_eq!(log.last().unwrap().error.as_label(), "controller_not_found");
    }

    #[test]
    fn test_empty_log() {
        let log = FaultLog::new();
        assert!(log.is_empty());
        assert!(log.last().is_none());
    }
}
