//! Millisecond time base and interval scheduling.
//!
//! `SystemTimer` is shared (via `Arc`) between the periodic timer source,
//! which is the only writer of the millisecond counter, and the main loop,
//! which reads it and advances the tick counter. Counters are atomics so a
//! read never observes a half-updated value.

use scale_traits::Clock;
use std::sync::atomic::{AtomicU32, Ordering};

/// Default timer period: 62.5 ms.
pub const DEFAULT_TIMER_PERIOD_US: u32 = 62_500;

const MICROS_PER_MILLI: u64 = 1_000;

#[derive(Debug)]
pub struct SystemTimer {
    ms: AtomicU32,
    ticks: AtomicU32,
    // Sub-millisecond remainder carried between timer periods.
    carry_us: AtomicU32,
    period_us: u32,
}

impl Default for SystemTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TIMER_PERIOD_US)
    }
}

impl SystemTimer {
    pub fn new(period_us: u32) -> Self {
        Self::starting_at(period_us, 0)
    }

    /// Timer whose millisecond counter starts at `ms` (e.g. just below a wrap).
    pub fn starting_at(period_us: u32, ms: u32) -> Self {
        debug_assert!(period_us > 0, "timer period must be > 0");
        Self {
            ms: AtomicU32::new(ms),
            ticks: AtomicU32::new(0),
            carry_us: AtomicU32::new(0),
            period_us: period_us.max(1),
        }
    }

    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    /// Timer interrupt body: advance the counter by one period.
    ///
    /// Fractional milliseconds accumulate so that a 62.5 ms period yields
    /// 62 and 63 ms steps alternately and never drifts.
    pub fn on_period_elapsed(&self) {
        let total = u64::from(self.carry_us.load(Ordering::Relaxed)) + u64::from(self.period_us);
        let step_ms = (total / MICROS_PER_MILLI) as u32;
        self.carry_us
            .store((total % MICROS_PER_MILLI) as u32, Ordering::Relaxed);
        // fetch_add wraps at 2^32, matching the counter contract
        self.ms.fetch_add(step_ms, Ordering::AcqRel);
    }

    /// Fire `n` timer periods back to back.
    pub fn advance_periods(&self, n: u32) {
        for _ in 0..n {
            self.on_period_elapsed();
        }
    }

    /// Move the counter forward by whole milliseconds, bypassing the period.
    pub fn advance_ms(&self, ms: u32) {
        self.ms.fetch_add(ms, Ordering::AcqRel);
    }
}

impl Clock for SystemTimer {
    #[inline]
    fn now_ms(&self) -> u32 {
        self.ms.load(Ordering::Acquire)
    }

    #[inline]
    fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    #[inline]
    fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }
}

/// "Is it time yet" helper for a fixed polling cadence.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period_ms: u32,
    last_ms: u32,
}

impl Interval {
    pub fn new(period_ms: u32, now_ms: u32) -> Self {
        Self { period_ms, last_ms: now_ms }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn last_ms(&self) -> u32 {
        self.last_ms
    }

    pub fn is_due<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        clock.elapsed_ms(self.last_ms) >= self.period_ms
    }

    pub fn mark<C: Clock + ?Sized>(&mut self, clock: &C) {
        self.last_ms = clock.now_ms();
    }

    /// `is_due` followed by `mark` when due.
    pub fn poll<C: Clock + ?Sized>(&mut self, clock: &C) -> bool {
        if self.is_due(clock) {
            self.mark(clock);
            true
        } else {
            false
        }
    }
}
