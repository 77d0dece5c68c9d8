//! Routine instances and the resumption surface
//!
//! An instance is one cursor plus one frame. The owner calls [`Instance::resume`]
//! whenever it wants the routine to make progress; everything the routine needs
//! to continue lives in those two values.

use crate::cursor::RoutineCursor;
use crate::routine::{Descriptor, Routine};
use crate::step::Step;
use std::fmt;
use std::marker::PhantomData;

/// Resume a routine whose cursor and frame are stored separately.
///
/// Dispatches only while the cursor is below the completed boundary, so
/// resuming a completed routine is a free no-op that reports [`Step::Idle`].
pub fn resume<R: Routine>(cursor: &mut RoutineCursor, frame: &mut R::Frame) -> Step {
    if !cursor.is_resumable() {
        tracing::trace!(routine = R::NAME, "resume on completed routine");
        return Step::Idle;
    }

    let before = *cursor;
    R::dispatch(cursor, frame);
    tracing::trace!(routine = R::NAME, %before, after = %cursor, "resumed");

    if cursor.is_completed() {
        Step::Finished
    } else {
        Step::Suspended
    }
}

/// Resume a routine that has no frame.
pub fn resume_frameless<R: Routine<Frame = ()>>(cursor: &mut RoutineCursor) -> Step {
    resume::<R>(cursor, &mut ())
}

// ── Instance ─────────────────────────────────────────────────────────────────

/// One execution of a routine definition.
///
/// Owns its cursor and frame exclusively. An instance is `Send` whenever its
/// frame is, so separate instances can be driven from separate threads; a
/// single instance is only ever resumed through `&mut self`.
pub struct Instance<R: Routine> {
    cursor: RoutineCursor,
    frame: R::Frame,
    routine: PhantomData<fn() -> R>,
}

impl<R: Routine> Instance<R> {
    /// Fresh instance with the given initial frame and a cursor at start.
    pub fn new(frame: R::Frame) -> Self {
        Self {
            cursor: RoutineCursor::START,
            frame,
            routine: PhantomData,
        }
    }

    /// Run the routine until its next suspension point.
    pub fn resume(&mut self) -> Step {
        resume::<R>(&mut self.cursor, &mut self.frame)
    }

    /// Current cursor.
    pub fn cursor(&self) -> RoutineCursor {
        self.cursor
    }

    /// `true` once the routine completed, was exited or was cancelled.
    pub fn is_completed(&self) -> bool {
        self.cursor.is_completed()
    }

    /// Force completion. Later resumptions report [`Step::Idle`].
    pub fn cancel(&mut self) {
        self.cursor.complete();
    }

    pub fn frame(&self) -> &R::Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut R::Frame {
        &mut self.frame
    }

    pub fn into_frame(self) -> R::Frame {
        self.frame
    }

    pub fn descriptor(&self) -> Descriptor {
        R::descriptor()
    }
}

impl<R: Routine<Frame = ()>> Instance<R> {
    /// Fresh instance of a routine without a frame.
    pub fn frameless() -> Self {
        Self::new(())
    }
}

impl<R: Routine> Default for Instance<R>
where
    R::Frame: Default,
{
    fn default() -> Self {
        Self::new(R::Frame::default())
    }
}

impl<R: Routine> Clone for Instance<R>
where
    R::Frame: Clone,
{
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor,
            frame: self.frame.clone(),
            routine: PhantomData,
        }
    }
}

impl<R: Routine> fmt::Debug for Instance<R>
where
    R::Frame: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("routine", &R::NAME)
            .field("cursor", &self.cursor)
            .field("frame", &self.frame)
            .finish()
    }
}

// ── Resumable ────────────────────────────────────────────────────────────────

/// Object-safe view of an instance, for driving different routines together.
pub trait Resumable {
    fn name(&self) -> &'static str;
    fn cursor(&self) -> RoutineCursor;
    fn resume(&mut self) -> Step;
    fn cancel(&mut self);
    fn descriptor(&self) -> Descriptor;
}

impl<R: Routine> Resumable for Instance<R> {
    fn name(&self) -> &'static str {
        R::NAME
    }

    fn cursor(&self) -> RoutineCursor {
        Instance::cursor(self)
    }

    fn resume(&mut self) -> Step {
        Instance::resume(self)
    }

    fn cancel(&mut self) {
        Instance::cancel(self)
    }

    fn descriptor(&self) -> Descriptor {
        R::descriptor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routine::Numbering;
    use crate::CursorValue;

    /// Hand-written routine: counts up once per call, three segments.
    struct Counter;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct CounterFrame {
        hits: Vec<u32>,
    }

    impl Routine for Counter {
        type Frame = CounterFrame;
        const NAME: &'static str = "Counter";
        const NUMBERING: Numbering = Numbering::Automatic;
        const RESUME_POINTS: &'static [CursorValue] = &[0, 1, 2];

        fn dispatch(cursor: &mut RoutineCursor, frame: &mut CounterFrame) {
            match cursor.get() {
                0 => {
                    frame.hits.push(0);
                    cursor.advance_to(1);
                }
                1 => {
                    frame.hits.push(1);
                    cursor.advance_to(2);
                }
                2 => {
                    frame.hits.push(2);
                    cursor.complete();
                }
                _ => {
                    if cursor.is_resumable() {
                        cursor.complete();
                    }
                }
            }
        }
    }

    #[test]
    fn test_resume_sequence() {
        let mut instance = Instance::<Counter>::default();
        assert_eq!(instance.resume(), Step::Suspended);
        assert_eq!(instance.resume(), Step::Suspended);
        assert_eq!(instance.resume(), Step::Finished);
        assert_eq!(instance.resume(), Step::Idle);
        assert_eq!(instance.frame().hits, vec![0, 1, 2]);
    }

    #[test]
    fn test_cancel_before_start() {
        let mut instance = Instance::<Counter>::default();
        instance.cancel();
        assert!(instance.is_completed());
        assert_eq!(instance.resume(), Step::Idle);
        assert!(instance.into_frame().hits.is_empty());
    }

    #[test]
    fn test_free_function_with_separate_storage() {
        let mut cursor = RoutineCursor::new();
        let mut frame = CounterFrame::default();
        while !resume::<Counter>(&mut cursor, &mut frame).is_done() {}
        assert_eq!(cursor, RoutineCursor::COMPLETED);
        assert_eq!(frame.hits, vec![0, 1, 2]);
    }

    #[test]
    fn test_unknown_cursor_finishes_without_running() {
        let mut cursor = RoutineCursor::from_raw(99);
        let mut frame = CounterFrame::default();
        assert_eq!(resume::<Counter>(&mut cursor, &mut frame), Step::Finished);
        assert_eq!(cursor, RoutineCursor::COMPLETED);
        assert!(frame.hits.is_empty());
    }

    #[test]
    fn test_beyond_boundary_is_untouched() {
        let mut cursor = RoutineCursor::from_raw(u64::MAX);
        let mut frame = CounterFrame::default();
        assert_eq!(resume::<Counter>(&mut cursor, &mut frame), Step::Idle);
        assert_eq!(cursor.get(), u64::MAX);
    }

    #[test]
    fn test_dyn_resumable() {
        let mut boxed: Box<dyn Resumable> = Box::new(Instance::<Counter>::default());
        assert_eq!(boxed.name(), "Counter");
        assert_eq!(boxed.descriptor().segment_count(), 3);
        boxed.resume();
        assert_eq!(boxed.cursor(), RoutineCursor::from_raw(1));
    }

    #[test]
    fn test_debug_output_names_routine() {
        let instance = Instance::<Counter>::default();
        let debug = format!("{:?}", instance);
        assert!(debug.contains("Counter"));
        assert!(debug.contains("cursor"));
    }

    #[test]
    fn test_instance_is_send_when_frame_is() {
        fn assert_send<T: Send>() {}
        assert_send::<Instance<Counter>>();
    }
}
