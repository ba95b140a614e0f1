use scale_traits::{Buzzer, SampleSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::error::HwError;

/// Shared handle to the mass sitting on a simulated platform (grams).
///
/// Stored as `f32` bits so another thread (stdin reader, test) can move
/// weight on and off while the main loop samples.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLoad(Arc<AtomicU32>);

impl SimulatedLoad {
    pub fn new(grams: f32) -> Self {
        Self(Arc::new(AtomicU32::new(grams.to_bits())))
    }

    pub fn set(&self, grams: f32) {
        self.0.store(grams.max(0.0).to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// Load cell + amplifier + 14-bit converter model.
#[derive(Debug, Clone)]
pub struct SimAdcCfg {
    /// Count produced with nothing on the platform.
    pub zero_count: u16,
    /// Grams represented by one count above `zero_count`.
    pub grams_per_count: f32,
    /// Peak amplitude of uniform noise added to each conversion.
    pub noise_counts: u16,
    /// Converter full-scale code.
    pub max_count: u16,
    /// Number of `is_ready` polls that report busy after each start.
    pub busy_polls: u8,
    pub seed: u32,
}

impl Default for SimAdcCfg {
    fn default() -> Self {
        Self {
            zero_count: 180,
            grams_per_count: 0.061,
            noise_counts: 2,
            max_count: 16_383,
            busy_polls: 3,
            seed: 0x5CA1_E5ED,
        }
    }
}

/// Simulated converter.
pub struct SimulatedAdc {
    cfg: SimAdcCfg,
    load: SimulatedLoad,
    rng: u32,
    busy_left: u8,
    converting: bool,
    result: u16,
}

impl SimulatedAdc {
    pub fn new(cfg: SimAdcCfg, load: SimulatedLoad) -> Self {
        let rng = cfg.seed.max(1);
        Self {
            cfg,
            load,
            rng,
            busy_left: 0,
            converting: false,
            result: 0,
        }
    }

    pub fn load(&self) -> SimulatedLoad {
        self.load.clone()
    }

    fn next_noise(&mut self) -> i32 {
        if self.cfg.noise_counts == 0 {
            return 0;
        }
        // xorshift32
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        let span = 2 * i64::from(self.cfg.noise_counts) + 1;
        (i64::from(x) % span - i64::from(self.cfg.noise_counts)) as i32
    }

    fn convert(&mut self) -> u16 {
        let grams = self.load.get();
        let above_zero = if self.cfg.grams_per_count > 0.0 {
            (grams / self.cfg.grams_per_count).round() as i64
        } else {
            0
        };
        let code = i64::from(self.cfg.zero_count) + above_zero + i64::from(self.next_noise());
        code.clamp(0, i64::from(self.cfg.max_count)) as u16
    }
}

impl SampleSource for SimulatedAdc {
    fn start_conversion(&mut self) {
        self.converting = true;
        self.busy_left = self.cfg.busy_polls;
    }

    fn is_ready(&mut self) -> bool {
        if !self.converting {
            return false;
        }
        if self.busy_left > 0 {
            self.busy_left -= 1;
            return false;
        }
        true
    }

    fn read_result(&mut self) -> u16 {
        if self.converting {
            self.converting = false;
            self.result = self.convert();
            trace!(raw = self.result, "sim adc conversion");
        }
        self.result
    }
}

#[derive(Debug, Clone, Default)]
enum BuzzerFault {
    #[default]
    None,
    Disabled,
    Pwm(String),
}

/// Simulated buzzer: logs tones and tracks the continuous alarm output.
#[derive(Debug, Default)]
pub struct SimulatedBuzzer {
    sounding: bool,
    beeps: u32,
    fault: BuzzerFault,
}

impl SimulatedBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buzzer whose PWM output is unavailable; every call fails.
    pub fn disabled() -> Self {
        Self {
            fault: BuzzerFault::Disabled,
            ..Self::default()
        }
    }

    /// A buzzer whose PWM peripheral rejects every request with `msg`.
    pub fn pwm_fault(msg: impl Into<String>) -> Self {
        Self {
            fault: BuzzerFault::Pwm(msg.into()),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), HwError> {
        match &self.fault {
            BuzzerFault::None => Ok(()),
            BuzzerFault::Disabled => Err(HwError::BuzzerDisabled),
            BuzzerFault::Pwm(msg) => Err(HwError::Pwm(msg.clone())),
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    pub fn beep_count(&self) -> u32 {
        self.beeps
    }
}

impl Buzzer for SimulatedBuzzer {
    fn beep(&mut self, duration: Duration) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.check()?;
        self.beeps = self.beeps.saturating_add(1);
        debug!(ms = duration.as_millis() as u64, "beep (simulated)");
        Ok(())
    }

    fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.check()?;
        if !self.sounding {
            info!("buzzer on (simulated)");
        }
        self.sounding = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.check()?;
        if self.sounding {
            info!("buzzer off (simulated)");
        }
        self.sounding = false;
        Ok(())
    }
}
