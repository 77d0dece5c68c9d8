//! Sieve of Eratosthenes that crosses off at most `chunk` multiples per call.

use super::{end_hook, DemoSetup, Transcript};
use stepwise_config::{DemoSettings, StopMode};
use stepwise_runtime::{routine, Descriptor, Driver, Routine};

routine! {
    pub Sieve {
        limit: usize,
        chunk: usize,
        composite: Vec<bool>,
        prime: usize,
        multiple: usize,
        out: Transcript,
    } |frame| {
        frame.composite = vec![false; frame.limit + 1];
        frame.prime = 2;
        frame.multiple = 4;
        yield;
        cross_off(frame);
        frame.out.push(format!("sieving with {}", frame.prime));
        yield until frame.prime * frame.prime > frame.limit;
        let primes: Vec<String> = (2..=frame.limit)
            .filter(|&n| !frame.composite[n])
            .map(|n| n.to_string())
            .collect();
        frame.out.push(format!("primes up to {}: {}", frame.limit, primes.join(" ")));
    }
}

/// One bounded slice of work. Leaves `prime` past the square root when done.
fn cross_off(frame: &mut SieveFrame) {
    let mut budget = frame.chunk;
    while budget > 0 && frame.prime * frame.prime <= frame.limit {
        if frame.multiple > frame.limit {
            frame.prime += 1;
            while frame.prime <= frame.limit && frame.composite[frame.prime] {
                frame.prime += 1;
            }
            frame.multiple = frame.prime * frame.prime;
            continue;
        }
        frame.composite[frame.multiple] = true;
        frame.multiple += frame.prime;
        budget -= 1;
    }
}

pub fn descriptors() -> Vec<Descriptor> {
    vec![Sieve::descriptor()]
}

pub fn setup(settings: &DemoSettings, out: &Transcript) -> DemoSetup<'static> {
    let mut driver = Driver::new();
    let primary = driver.spawn_with_end_hook(
        Sieve::init(
            settings.sieve_limit,
            settings.sieve_chunk,
            Vec::new(),
            0,
            0,
            out.clone(),
        ),
        end_hook(Sieve::NAME, out),
    );

    DemoSetup {
        driver,
        primary,
        default_stop: StopMode::AllComplete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn run_sieve(limit: usize, chunk: usize) -> (usize, Vec<String>) {
        let out = Transcript::new();
        let mut sieve = Sieve::init(limit, chunk, Vec::new(), 0, 0, out.clone());
        let mut calls = 1;
        while !sieve.resume().is_finished() {
            calls += 1;
        }
        (calls, out.drain())
    }

    #[rstest]
    #[case(2, "primes up to 2: 2")]
    #[case(10, "primes up to 10: 2 3 5 7")]
    #[case(30, "primes up to 30: 2 3 5 7 11 13 17 19 23 29")]
    fn test_sieve_result(#[case] limit: usize, #[case] expected: &str) {
        let (_, lines) = run_sieve(limit, 4);
        assert_eq!(lines.last().map(String::as_str), Some(expected));
    }

    #[test]
    fn test_smaller_chunks_take_more_calls() {
        let (coarse, _) = run_sieve(100, 50);
        let (fine, _) = run_sieve(100, 5);
        assert!(fine > coarse, "fine={} coarse={}", fine, coarse);
    }

    #[test]
    fn test_chunk_bounds_work_per_call() {
        // 49 + 31 + 16 + 8 marks for primes 2, 3, 5, 7 below 100
        let (calls, lines) = run_sieve(100, 10);
        assert_eq!(calls, 1 + 11 + 1);
        assert_eq!(lines.len(), 12);
    }
}
