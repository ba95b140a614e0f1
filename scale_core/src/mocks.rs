//! Test and helper mocks for scale_core.
//!
//! Handles returned by `level()`, `stats()` and `log()` share state with the
//! mock, so a test can keep them after moving the mock into the sensor.

use scale_traits::{Buzzer, SampleSource};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// Current converter output level of a `ScriptedAdc`.
#[derive(Debug, Clone, Default)]
pub struct AdcLevel(Rc<Cell<u16>>);

impl AdcLevel {
    pub fn set(&self, raw: u16) {
        self.0.set(raw);
    }

    pub fn get(&self) -> u16 {
        self.0.get()
    }
}

#[derive(Debug, Default)]
struct AdcCounters {
    conversions: Cell<usize>,
    busy_polls: Cell<usize>,
}

/// Conversion counters of a `ScriptedAdc`.
#[derive(Debug, Clone, Default)]
pub struct AdcStats(Rc<AdcCounters>);

impl AdcStats {
    pub fn conversions(&self) -> usize {
        self.0.conversions.get()
    }

    pub fn busy_polls(&self) -> usize {
        self.0.busy_polls.get()
    }
}

/// Converter that replays a script of raw counts, then holds a settable level.
#[derive(Debug, Default)]
pub struct ScriptedAdc {
    script: VecDeque<u16>,
    level: AdcLevel,
    stats: AdcStats,
    busy_polls: usize,
    busy_left: usize,
}

impl ScriptedAdc {
    pub fn new(level: u16) -> Self {
        Self::with_script([], level)
    }

    pub fn with_script(script: impl IntoIterator<Item = u16>, level: u16) -> Self {
        let adc = Self {
            script: script.into_iter().collect(),
            ..Self::default()
        };
        adc.level.set(level);
        adc
    }

    /// Report "busy" this many times after each conversion start.
    pub fn busy_polls(mut self, n: usize) -> Self {
        self.busy_polls = n;
        self
    }

    pub fn level(&self) -> AdcLevel {
        self.level.clone()
    }

    pub fn stats(&self) -> AdcStats {
        self.stats.clone()
    }
}

impl SampleSource for ScriptedAdc {
    fn start_conversion(&mut self) {
        self.busy_left = self.busy_polls;
    }

    fn is_ready(&mut self) -> bool {
        if self.busy_left > 0 {
            self.busy_left -= 1;
            let c = &self.stats.0.busy_polls;
            c.set(c.get() + 1);
            return false;
        }
        true
    }

    fn read_result(&mut self) -> u16 {
        let c = &self.stats.0.conversions;
        c.set(c.get() + 1);
        self.script.pop_front().unwrap_or_else(|| self.level.get())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerEvent {
    Beep(Duration),
    Start,
    Stop,
}

/// Shared record of everything a `RecordingBuzzer` was asked to do.
#[derive(Debug, Clone, Default)]
pub struct ToneLog(Rc<RefCell<Vec<BuzzerEvent>>>);

impl ToneLog {
    pub fn events(&self) -> Vec<BuzzerEvent> {
        self.0.borrow().clone()
    }

    pub fn beeps(&self) -> Vec<Duration> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                BuzzerEvent::Beep(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// Continuous output state implied by the last start/stop.
    pub fn is_sounding(&self) -> bool {
        self.0
            .borrow()
            .iter()
            .rev()
            .find_map(|e| match e {
                BuzzerEvent::Start => Some(true),
                BuzzerEvent::Stop => Some(false),
                BuzzerEvent::Beep(_) => None,
            })
            .unwrap_or(false)
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Buzzer spy; optionally fails every call after recording it.
#[derive(Debug, Default)]
pub struct RecordingBuzzer {
    log: ToneLog,
    failing: bool,
}

impl RecordingBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn log(&self) -> ToneLog {
        self.log.clone()
    }

    fn record(&mut self, e: BuzzerEvent) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log.0.borrow_mut().push(e);
        if self.failing {
            return Err(Box::new(std::io::Error::other("buzzer offline")));
        }
        Ok(())
    }
}

impl Buzzer for RecordingBuzzer {
    fn beep(&mut self, duration: Duration) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.record(BuzzerEvent::Beep(duration))
    }

    fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.record(BuzzerEvent::Start)
    }

    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.record(BuzzerEvent::Stop)
    }
}
