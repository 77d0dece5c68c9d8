//! Suspend, conditional suspend and explicit exit, one call at a time.
//!
//! Starts from `x = 0, y = 5, timer = 3`. Call 1 copies `y` into `x`, calls
//! 2 to 4 print `x` and count the timer down, call 5 exits and call 6 finds
//! the routine completed.

use super::{end_hook, DemoSetup, Transcript};
use stepwise_config::StopMode;
use stepwise_runtime::{routine, Descriptor, Driver, Routine};

routine! {
    pub Scenario { x: i32, y: i32, timer: i64, out: Transcript } |frame| {
        frame.x = frame.y;
        yield;
        frame.out.push(frame.x.to_string());
        yield until { frame.timer -= 1; frame.timer == 0 };
        exit!();
    }
}

pub fn descriptors() -> Vec<Descriptor> {
    vec![Scenario::descriptor()]
}

pub fn setup(out: &Transcript) -> DemoSetup<'static> {
    let mut driver = Driver::new();
    let primary = driver.spawn_with_end_hook(
        Scenario::init(0, 5, 3, out.clone()),
        end_hook(Scenario::NAME, out),
    );

    DemoSetup {
        driver,
        primary,
        default_stop: StopMode::FirstEnded,
    }
}
