//! Countdown with manual numbering, driven next to a fifteen-step routine.
//!
//! The run stops on the first tick that finds `ExpensiveOperation` already
//! completed, which is when its end hook fires.

use super::{end_hook, DemoSetup, Transcript};
use stepwise_config::{DemoSettings, StopMode};
use stepwise_runtime::{routine, Descriptor, Driver, Routine};

routine! {
    #[numbering(manual)]
    pub ExpensiveOperation { x: i32, y: i32, timer: i64, out: Transcript } |frame| {
        frame.x = frame.y;
        yield 0;
        frame.out.push(format!("timer: {}", frame.timer));
        yield 1 until { frame.timer -= 1; frame.timer == 0 };
        frame.out.push(format!("this is state 1: {}", frame.x));
        yield 2;
    }

    #[numbering(manual)]
    pub OtherOperation || {
        yield 0;
        yield 1;
        yield 2;
        yield 3;
        yield 4;
        yield 5;
        yield 6;
        yield 7;
        yield 8;
        yield 9;
        yield 10;
        yield 11;
        yield 12;
        yield 13;
        yield 14;
    }
}

pub fn descriptors() -> Vec<Descriptor> {
    vec![ExpensiveOperation::descriptor(), OtherOperation::descriptor()]
}

pub fn setup(settings: &DemoSettings, out: &Transcript) -> DemoSetup<'static> {
    let mut driver = Driver::new();
    let primary = driver.spawn_with_end_hook(
        ExpensiveOperation::init(settings.x, settings.y, settings.timer, out.clone()),
        end_hook(ExpensiveOperation::NAME, out),
    );
    driver.spawn(OtherOperation::init());

    DemoSetup {
        driver,
        primary,
        default_stop: StopMode::FirstEnded,
    }
}
