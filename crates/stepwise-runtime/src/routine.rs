//! Routine definitions
//!
//! A routine definition is a type implementing [`Routine`]. The `routine!`
//! macro generates the implementation: a frame record, the ordered list of
//! resume points and a dispatch function that jumps straight to the segment
//! named by the cursor.

use crate::cursor::{CursorValue, RoutineCursor};
use serde::Serialize;
use std::fmt;

/// How segment identifiers are assigned within one routine definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Numbering {
    /// Identifiers come from a counter advanced at each suspension point, in
    /// program order. Duplicates and reordering are impossible by construction.
    Automatic,
    /// The author writes an identifier at each suspension point (`yield 3;`)
    /// and the segment after it resumes at `3 + 1`. Uniqueness is checked at
    /// expansion time; ordering and gaps are the author's business.
    Manual,
}

impl fmt::Display for Numbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numbering::Automatic => write!(f, "automatic"),
            Numbering::Manual => write!(f, "manual"),
        }
    }
}

/// A resumable routine definition.
///
/// One implementation exists per definition; any number of instances (cursor
/// and frame pairs) may share it.
pub trait Routine {
    /// Arguments plus every local that must survive a suspension.
    type Frame;

    /// Name of the definition, for diagnostics.
    const NAME: &'static str;

    /// Numbering discipline the definition was written with.
    const NUMBERING: Numbering;

    /// Identifier of every segment, in program order. Segment 0 is always `0`.
    const RESUME_POINTS: &'static [CursorValue];

    /// Execute the segment named by `cursor` and update the cursor.
    ///
    /// A completed cursor is left alone. A cursor naming no segment is set to
    /// completed without running any routine code.
    fn dispatch(cursor: &mut RoutineCursor, frame: &mut Self::Frame);

    /// Runtime view of this definition.
    fn descriptor() -> Descriptor {
        Descriptor {
            name: Self::NAME,
            numbering: Self::NUMBERING,
            resume_points: Self::RESUME_POINTS,
        }
    }
}

// ── Descriptor ───────────────────────────────────────────────────────────────

/// Static description of a routine definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    pub name: &'static str,
    pub numbering: Numbering,
    pub resume_points: &'static [CursorValue],
}

impl Descriptor {
    /// Number of segments in the definition.
    pub fn segment_count(&self) -> usize {
        self.resume_points.len()
    }

    /// Program-order index of the segment a cursor resumes at.
    ///
    /// Returns `None` for completed cursors and for values that name no
    /// segment. This is a diagnostic lookup; dispatch never uses it.
    pub fn segment_of(&self, cursor: RoutineCursor) -> Option<usize> {
        if cursor.is_completed() {
            return None;
        }
        self.resume_points
            .iter()
            .position(|&point| point == cursor.get())
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} numbering, {} segment{})",
            self.name,
            self.numbering,
            self.segment_count(),
            if self.segment_count() == 1 { "" } else { "s" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINTS: &[CursorValue] = &[0, 1, 5, 9];

    fn descriptor() -> Descriptor {
        Descriptor {
            name: "Sample",
            numbering: Numbering::Manual,
            resume_points: POINTS,
        }
    }

    #[test]
    fn test_segment_of_known_points() {
        let desc = descriptor();
        assert_eq!(desc.segment_of(RoutineCursor::START), Some(0));
        assert_eq!(desc.segment_of(RoutineCursor::from_raw(5)), Some(2));
        assert_eq!(desc.segment_of(RoutineCursor::from_raw(9)), Some(3));
    }

    #[test]
    fn test_segment_of_unknown_or_completed() {
        let desc = descriptor();
        assert_eq!(desc.segment_of(RoutineCursor::from_raw(4)), None);
        assert_eq!(desc.segment_of(RoutineCursor::COMPLETED), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            descriptor().to_string(),
            "Sample (manual numbering, 4 segments)"
        );
    }
}
