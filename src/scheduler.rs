use std::time::{Duration, Instant};

/// A fixed-period task driven by the owner's loop.
///
/// The task never runs anything itself: [`RepeatingTask::poll`] reports one
/// due firing at a time and the caller does the work before polling again,
/// so firings of the same task can't overlap or reorder.
#[derive(Clone, Debug)]
pub struct RepeatingTask {
    label: &'static str,
    period: Duration,
    next_due: Option<Instant>,
}

impl RepeatingTask {
    pub fn new(label: &'static str, period: Duration) -> Self {
        Self {
            label,
            period: period.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true once per elapsed period. Missed periods are reported on
    /// subsequent polls rather than collapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(due + self.period);
                true
            }
            _ => false,
        }
    }
}
