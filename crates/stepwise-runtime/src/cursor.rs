//! Routine cursor
//!
//! The persistent "program counter" of a routine instance. A cursor is a plain
//! `u64` that names the segment to resume next, with two reserved values at the
//! top of the range that mean "completed".

use serde::Serialize;
use std::fmt;

/// Raw cursor value type.
pub type CursorValue = u64;

// ── RoutineCursor ────────────────────────────────────────────────────────────

/// Which segment of a routine resumes next.
///
/// - `0` means "not yet started".
/// - `u64::MAX - 1` is the completed sentinel.
/// - `u64::MAX` lies beyond the completed boundary; it reads as completed and
///   dispatch never touches it.
/// - Any other value names a resume point. A value that matches no segment of
///   the routine is coerced to completed on the next resumption.
///
/// Only generated dispatch code advances a cursor. Callers create it at
/// [`RoutineCursor::START`] and may force it to completed with
/// [`RoutineCursor::complete`] to cancel an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct RoutineCursor(CursorValue);

impl RoutineCursor {
    /// Initial cursor: the routine has not run yet.
    pub const START: Self = Self(0);

    /// Reserved sentinel: the routine finished and must not resume again.
    pub const COMPLETED: Self = Self(CursorValue::MAX - 1);

    /// Create a cursor at [`RoutineCursor::START`].
    pub const fn new() -> Self {
        Self::START
    }

    /// Wrap a raw value.
    ///
    /// No validation happens here; unknown resume points are handled by
    /// dispatch (they complete the routine without running user code).
    pub const fn from_raw(value: CursorValue) -> Self {
        Self(value)
    }

    /// The raw value.
    pub const fn get(self) -> CursorValue {
        self.0
    }

    /// `true` before the first resumption.
    pub const fn is_start(self) -> bool {
        self.0 == Self::START.0
    }

    /// `true` at or beyond the completed sentinel.
    pub const fn is_completed(self) -> bool {
        self.0 >= Self::COMPLETED.0
    }

    /// `true` when a resumption call would dispatch into the routine.
    pub const fn is_resumable(self) -> bool {
        self.0 < Self::COMPLETED.0
    }

    /// Force the completed sentinel.
    ///
    /// Used for explicit early exit and for cancellation by the owner. Both are
    /// indistinguishable from running off the end of the routine.
    pub fn complete(&mut self) {
        self.0 = Self::COMPLETED.0;
    }

    pub(crate) fn advance_to(&mut self, point: CursorValue) {
        debug_assert!(point < Self::COMPLETED.0, "resume point collides with sentinel");
        self.0 = point;
    }
}

impl From<RoutineCursor> for CursorValue {
    fn from(cursor: RoutineCursor) -> Self {
        cursor.0
    }
}

impl fmt::Display for RoutineCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_start() {
            write!(f, "start")
        } else if self.is_completed() {
            write!(f, "completed")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}
