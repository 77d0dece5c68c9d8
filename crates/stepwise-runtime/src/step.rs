//! Outcome of one resumption call.

use serde::Serialize;
use std::fmt;

/// What a single resumption call did.
///
/// Completion is detected by comparing the cursor before and after the call:
/// a call that starts resumable and ends completed reports [`Step::Finished`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// A segment ran and the routine is parked, either advanced past a
    /// suspension point or held at a conditional one.
    Suspended,
    /// The routine completed during this call.
    Finished,
    /// The routine was already completed; nothing ran.
    Idle,
}

impl Step {
    /// `true` if this call dispatched into the routine.
    pub fn ran(self) -> bool {
        !matches!(self, Step::Idle)
    }

    /// `true` if this call is the one that completed the routine.
    pub fn is_finished(self) -> bool {
        matches!(self, Step::Finished)
    }

    /// `true` if the routine was already completed before this call.
    pub fn is_idle(self) -> bool {
        matches!(self, Step::Idle)
    }

    /// `true` if the routine is completed after this call.
    pub fn is_done(self) -> bool {
        matches!(self, Step::Finished | Step::Idle)
    }

    /// Run `hook` when the call found the routine already completed.
    ///
    /// Fires on every such call, not only the first one:
    ///
    /// ```
    /// # use stepwise_runtime::Step;
    /// let mut ended = 0;
    /// Step::Idle.on_end(|| ended += 1);
    /// Step::Idle.on_end(|| ended += 1);
    /// assert_eq!(ended, 2);
    /// ```
    pub fn on_end<F: FnOnce()>(self, hook: F) -> Self {
        if self.is_idle() {
            hook();
        }
        self
    }

    /// Run `hook` only on the call that completed the routine.
    pub fn on_finish<F: FnOnce()>(self, hook: F) -> Self {
        if self.is_finished() {
            hook();
        }
        self
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Suspended => write!(f, "suspended"),
            Step::Finished => write!(f, "finished"),
            Step::Idle => write!(f, "idle"),
        }
    }
}
