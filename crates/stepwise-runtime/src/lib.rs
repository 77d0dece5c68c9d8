//! Stepwise Runtime - stackless resumable routines
//!
//! A routine is a procedure split into segments at its suspension points. Each
//! call runs exactly one segment and returns; a persistent cursor remembers
//! which segment comes next and a persistent frame holds the routine's
//! arguments and every local that must survive a suspension. There is no
//! separate stack, thread or context switch, and nothing is allocated.
//!
//! This library provides:
//! - [`RoutineCursor`]: the persistent resume position with its completed sentinel
//! - [`Routine`]: the trait every routine definition implements
//! - [`routine!`]: the definition macro (segments, numbering, jump table)
//! - [`Instance`], [`resume`], [`resume_frameless`]: instantiation and resumption
//! - [`Step`]: per-call outcome, completion detection and end hooks
//! - [`Driver`]: a round-robin driver built on the public surface
//!
//! # Example
//!
//! ```
//! use stepwise_runtime::{routine, Step};
//!
//! routine! {
//!     pub Countdown { from: u32, seen: Vec<u32> } |frame| {
//!         frame.seen.push(frame.from);
//!         yield until { frame.from -= 1; frame.from == 0 };
//!         frame.seen.push(0);
//!     }
//! }
//!
//! let mut countdown = Countdown::init(3, Vec::new());
//! assert_eq!(countdown.resume(), Step::Suspended); // from: 3 -> 2
//! assert_eq!(countdown.resume(), Step::Suspended); // from: 2 -> 1
//! assert_eq!(countdown.resume(), Step::Suspended); // from: 1 -> 0, advances
//! assert_eq!(countdown.resume(), Step::Finished);
//! assert_eq!(countdown.resume(), Step::Idle);
//! assert_eq!(countdown.frame().seen, vec![3, 2, 1, 0]);
//! ```

// Lets generated code refer to `::stepwise_runtime` from inside this crate too.
extern crate self as stepwise_runtime;

/// Stepwise runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cursor;
pub mod driver;
pub mod instance;
pub mod routine;
pub mod step;

pub use cursor::{CursorValue, RoutineCursor};
pub use driver::{Driver, DriverError, DriverResult, RunSummary, StopPolicy, TaskId, TaskStep, Tick};
pub use instance::{resume, resume_frameless, Instance, Resumable};
pub use routine::{Descriptor, Numbering, Routine};
pub use step::Step;
pub use stepwise_macros::routine;

/// Short names for routine authors, imported with `use stepwise_runtime::prelude::*`.
pub mod prelude {
    pub use crate::{
        resume, resume_frameless, routine, Instance, Numbering, Resumable, Routine,
        RoutineCursor, Step,
    };
}

#[doc(hidden)]
pub mod __private {
    use crate::{CursorValue, RoutineCursor};

    #[inline]
    pub fn advance(cursor: &mut RoutineCursor, point: CursorValue) {
        cursor.advance_to(point);
    }

    /// Fallback arm of every dispatch table.
    #[inline]
    pub fn unknown_point(cursor: &mut RoutineCursor) {
        if cursor.is_resumable() {
            cursor.complete();
        }
    }
}
