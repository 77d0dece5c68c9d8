//! Demonstration routines driven by `stepwise run`

use clap::ValueEnum;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use stepwise_config::{DemoSettings, StopMode};
use stepwise_runtime::{Descriptor, Driver, TaskId};

pub mod expensive;
pub mod scenario;
pub mod sieve;

/// Output lines written by routines, shared between frames and the driver loop.
#[derive(Debug, Clone, Default)]
pub struct Transcript(Rc<RefCell<Vec<String>>>);

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: impl Into<String>) {
        self.0.borrow_mut().push(line.into());
    }

    /// Remove and return everything written so far.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// Selectable demo
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoKind {
    /// Manual numbering with a countdown, next to a fifteen-step routine
    Expensive,
    /// Five calls through suspend, conditional suspend and exit
    Scenario,
    /// Prime sieve sliced into bounded chunks per call
    Sieve,
}

impl DemoKind {
    pub const ALL: [DemoKind; 3] = [DemoKind::Expensive, DemoKind::Scenario, DemoKind::Sieve];

    pub fn as_str(self) -> &'static str {
        match self {
            DemoKind::Expensive => "expensive",
            DemoKind::Scenario => "scenario",
            DemoKind::Sieve => "sieve",
        }
    }

    /// Descriptors of every routine the demo spawns.
    pub fn descriptors(self) -> Vec<Descriptor> {
        match self {
            DemoKind::Expensive => expensive::descriptors(),
            DemoKind::Scenario => scenario::descriptors(),
            DemoKind::Sieve => sieve::descriptors(),
        }
    }

    /// Spawn the demo's routines on a fresh driver.
    pub fn setup(self, settings: &DemoSettings, out: &Transcript) -> DemoSetup<'static> {
        match self {
            DemoKind::Expensive => expensive::setup(settings, out),
            DemoKind::Scenario => scenario::setup(out),
            DemoKind::Sieve => sieve::setup(settings, out),
        }
    }
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A driver loaded with a demo's routines.
pub struct DemoSetup<'a> {
    pub driver: Driver<'a>,
    /// Task whose end hook stops a `first-ended` run
    pub primary: TaskId,
    pub default_stop: StopMode,
}

/// Hook that records every call made after `name` completed.
pub(crate) fn end_hook(name: &'static str, out: &Transcript) -> impl FnMut() {
    let out = out.clone();
    move || out.push(format!("{} ended", name))
}
