//! Per-thread execution timer
//!
//! Each thread has at most one running timer. `mark_start` starts it,
//! `mark_end` stops it and records the elapsed time as a sample. Samples
//! accumulate until drained with `take_samples`, so a fragment executed
//! several times yields one sample per run.

use std::cell::RefCell;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Clock {
    start: Option<Instant>,
    samples: Vec<Duration>,
}

thread_local! {
    static CLOCK: RefCell<Clock> = RefCell::new(Clock::default());
}

/// Returned by `Timer::mark_start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    started_at: Instant,
}

impl TimerHandle {
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

pub struct Timer;

impl Timer {
    /// Start timing on this thread, replacing any timer already running
    pub fn mark_start() -> TimerHandle {
        let now = Instant::now();
        CLOCK.with(|clock| {
            let mut clock = clock.borrow_mut();
            if clock.start.replace(now).is_some() {
                debug!("restarting a timer that was never ended");
            }
        });
        TimerHandle { started_at: now }
    }

    /// Stop the running timer and record a sample; `value` is returned as is
    pub fn mark_end<T>(value: T) -> T {
        let now = Instant::now();
        CLOCK.with(|clock| {
            let mut clock = clock.borrow_mut();
            match clock.start.take() {
                Some(start) => {
                    let elapsed = now.duration_since(start);
                    debug!(?elapsed, "timer ended");
                    clock.samples.push(elapsed);
                }
                None => warn!("markEnd called without a running timer"),
            }
        });
        value
    }

    pub fn is_running() -> bool {
        CLOCK.with(|clock| clock.borrow().start.is_some())
    }

    /// End a timer left running by code that never reached `markEnd`.
    /// Returns whether a timer had to be ended.
    pub fn ensure_end_marked() -> bool {
        if Self::is_running() {
            Self::mark_end(());
            true
        } else {
            false
        }
    }

    /// Drain the samples recorded on this thread
    pub fn take_samples() -> Vec<Duration> {
        CLOCK.with(|clock| std::mem::take(&mut clock.borrow_mut().samples))
    }

    /// Forget the running timer and all samples
    pub fn reset() {
        CLOCK.with(|clock| *clock.borrow_mut() = Clock::default());
    }
}

/// Summary of one or more timed runs
#[derive(Debug, Clone, PartialEq)]
pub struct TimingReport {
    samples: Vec<Duration>,
}

impl TimingReport {
    /// `None` when nothing was recorded
    pub fn new(mut samples: Vec<Duration>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort();
        Some(Self { samples })
    }

    /// Drain this thread's samples into a report
    pub fn collect() -> Option<Self> {
        Self::new(Timer::take_samples())
    }

    pub fn runs(&self) -> usize {
        self.samples.len()
    }

    pub fn total(&self) -> Duration {
        self.samples.iter().sum()
    }

    pub fn average(&self) -> Duration {
        self.total() / self.samples.len() as u32
    }

    pub fn median(&self) -> Duration {
        let mid = self.samples.len() / 2;
        if self.samples.len() % 2 == 0 {
            (self.samples[mid - 1] + self.samples[mid]) / 2
        } else {
            self.samples[mid]
        }
    }
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.runs() == 1 {
            write!(
                f,
                "Command took {:.6} seconds to complete.",
                self.total().as_secs_f64()
            )
        } else {
            write!(
                f,
                "Command took {:.6} seconds on average ({:.6} median; {:.6} total) to complete.",
                self.average().as_secs_f64(),
                self.median().as_secs_f64(),
                self.total().as_secs_f64()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::NoReturnValue;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_mark_end_is_transparent() {
        Timer::reset();
        Timer::mark_start();
        assert!(Timer::is_running());
        assert_eq!(Timer::mark_end(42), 42);
        assert!(!Timer::is_running());
        assert_eq!(Timer::take_samples().len(), 1);
    }

    #[test]
    fn test_mark_end_passes_handle_through() {
        Timer::reset();
        let handle = Timer::mark_end(Timer::mark_start());
        assert!(handle.elapsed() >= Duration::ZERO);
        assert_eq!(Timer::take_samples().len(), 1);
    }

    #[test]
    fn test_mark_end_without_start_records_nothing() {
        Timer::reset();
        assert_eq!(Timer::mark_end(NoReturnValue), NoReturnValue);
        assert!(Timer::take_samples().is_empty());
    }

    #[test]
    fn test_ensure_end_marked() {
        Timer::reset();
        assert!(!Timer::ensure_end_marked());

        Timer::mark_start();
        assert!(Timer::ensure_end_marked());
        assert!(!Timer::is_running());
        assert_eq!(Timer::take_samples().len(), 1);
    }

    #[test]
    fn test_samples_accumulate_until_taken() {
        Timer::reset();
        for _ in 0..3 {
            Timer::mark_start();
            Timer::mark_end(());
        }
        assert_eq!(Timer::take_samples().len(), 3);
        assert!(Timer::take_samples().is_empty());
    }

    #[test]
    fn test_report_statistics() {
        assert!(TimingReport::new(vec![]).is_none());

        let report = TimingReport::new(vec![ms(40), ms(10), ms(30), ms(20)]).unwrap();
        assert_eq!(report.runs(), 4);
        assert_eq!(report.total(), ms(100));
        assert_eq!(report.average(), ms(25));
        assert_eq!(report.median(), ms(25));

        let report = TimingReport::new(vec![ms(5), ms(1), ms(9)]).unwrap();
        assert_eq!(report.median(), ms(5));
    }

    #[test]
    fn test_report_display() {
        let single = TimingReport::new(vec![ms(1500)]).unwrap();
        assert_eq!(single.to_string(), "Command took 1.500000 seconds to complete.");

        let several = TimingReport::new(vec![ms(1000), ms(2000), ms(6000)]).unwrap();
        assert_eq!(
            several.to_string(),
            "Command took 3.000000 seconds on average (2.000000 median; 9.000000 total) to complete."
        );
    }
}
