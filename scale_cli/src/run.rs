//! Scale commands: simulated hardware assembly, the cooperative main loop,
//! calibration and checks.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError};
use scale_core::error::Result as CoreResult;
use scale_core::{Interval, KeyMap, KeyRouter, OverweightMode, ScaleCore, SystemTimer};
use scale_hardware::{SimAdcCfg, SimulatedAdc, SimulatedBuzzer, SimulatedLoad};
use scale_traits::{Clock, Key};
use serde_json::json;

pub type SimScale = ScaleCore<SimulatedAdc, SimulatedBuzzer>;

/// One parsed line of operator input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// Key interrupt on a physical channel.
    Channel(u8),
    Load(f32),
    Mode(OverweightMode),
    Status,
    Quit,
}

/// Parse an operator command; key names resolve through the channel map.
pub fn parse_input(line: &str, map: &KeyMap) -> Option<Input> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next()?.to_ascii_lowercase();
    let arg = parts.next();
    if let Some(key) = Key::ALL.into_iter().find(|k| k.name() == cmd) {
        return Some(Input::Channel(map.channel(key)));
    }
    match (cmd.as_str(), arg) {
        ("key", Some(ch)) => ch.parse().ok().map(Input::Channel),
        ("load", Some(g)) => g
            .parse::<f32>()
            .ok()
            .filter(|g| g.is_finite())
            .map(Input::Load),
        ("mode", Some("realtime")) => Some(Input::Mode(OverweightMode::RealTime)),
        ("mode", Some("keycheck")) => Some(Input::Mode(OverweightMode::KeyCheck)),
        ("status", None) => Some(Input::Status),
        ("quit" | "exit", None) => Some(Input::Quit),
        _ => None,
    }
}

/// Build a scale on simulated peripherals sharing `clock`.
pub fn build_sim(
    cfg: &scale_config::Config,
    clock: Arc<SystemTimer>,
) -> CoreResult<(SimScale, SimulatedLoad)> {
    let load = SimulatedLoad::new(0.0);
    let adc = SimulatedAdc::new(SimAdcCfg::default(), load.clone());
    let core = ScaleCore::builder()
        .with_config(cfg)
        .with_source(adc)
        .with_buzzer(SimulatedBuzzer::new())
        .with_clock(clock)
        .try_build()?;
    Ok((core, load))
}

/// Periodic timer source: fires `on_period_elapsed` every period until stopped.
struct TimerThread {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl TimerThread {
    fn spawn(timer: Arc<SystemTimer>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let period = Duration::from_micros(u64::from(timer.period_us()));
        let handle = thread::Builder::new()
            .name("scale-timer".into())
            .spawn(move || {
                let mut next = Instant::now() + period;
                while !flag.load(Ordering::Relaxed) {
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    }
                    timer.on_period_elapsed();
                    next += period;
                }
            })
            .map_err(|e| tracing::warn!(error = %e, "failed to spawn timer thread"))
            .ok();
        Self { stop, handle }
    }
}

impl Drop for TimerThread {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

fn spawn_stdin_reader(map: KeyMap) -> Receiver<Input> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let spawned = thread::Builder::new()
        .name("scale-keys".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_input(&line, &map) {
                    Some(input) => {
                        if tx.send(input).is_err() {
                            break;
                        }
                    }
                    None => tracing::warn!(input = %line.trim(), "unknown command"),
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "failed to spawn stdin reader; keys disabled");
    }
    rx
}

fn mode_name(mode: OverweightMode) -> &'static str {
    match mode {
        OverweightMode::RealTime => "realtime",
        OverweightMode::KeyCheck => "keycheck",
    }
}

pub fn snapshot_json(core: &SimScale, final_snapshot: bool) -> serde_json::Value {
    let s = core.state();
    json!({
        "t_ms": core.clock().now_ms(),
        "measuring": s.is_measuring,
        "weight_g": s.current_weight_g,
        "screen": format!("{:?}", s.screen).to_ascii_lowercase(),
        "mode": mode_name(s.overweight_mode),
        "alarm": s.alarm_active,
        "final": final_snapshot,
    })
}

fn print_snapshot(core: &SimScale, json_mode: bool, final_snapshot: bool) {
    if json_mode {
        println!("{}", snapshot_json(core, final_snapshot));
        return;
    }
    let s = core.state();
    println!(
        "{:>9} ms  {:>8.1} g  measuring={} screen={:?} mode={} alarm={}",
        core.clock().now_ms(),
        s.current_weight_g,
        s.is_measuring,
        s.screen,
        mode_name(s.overweight_mode),
        if s.alarm_active { "ON" } else { "off" },
    );
}

pub struct RunParams {
    pub load_grams: f32,
    pub duration_ms: Option<u64>,
    pub mode: Option<OverweightMode>,
    pub snapshot_ms: u32,
    pub json: bool,
}

/// Run the main loop until quit, Ctrl-C or the optional deadline.
pub fn run_scale(
    cfg: &scale_config::Config,
    params: RunParams,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<()> {
    let timer = Arc::new(SystemTimer::new(cfg.timer.period_us));
    let (mut core, load) = build_sim(cfg, timer.clone())?;
    if let Some(mode) = params.mode {
        core.set_overweight_mode(mode);
    }
    let router = KeyRouter::new((&cfg.keys).into());

    core.start();
    load.set(params.load_grams);
    let _timer_thread = TimerThread::spawn(timer.clone());
    let inputs = spawn_stdin_reader(*router.map());

    let deadline = params
        .duration_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    let mut snapshots = Interval::new(params.snapshot_ms.max(1), timer.now_ms());
    tracing::info!(
        load_g = params.load_grams,
        duration_ms = params.duration_ms,
        "scale loop start"
    );

    'main: loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("shutdown requested");
            break;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        loop {
            match inputs.try_recv() {
                Ok(Input::Channel(ch)) => router.dispatch(ch, &mut core),
                Ok(Input::Load(g)) => {
                    tracing::debug!(grams = g, "simulated load changed");
                    load.set(g);
                }
                Ok(Input::Mode(m)) => core.set_overweight_mode(m),
                Ok(Input::Status) => print_snapshot(&core, params.json, false),
                Ok(Input::Quit) => break 'main,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        core.poll();
        if snapshots.poll(&*timer) {
            print_snapshot(&core, params.json, false);
        }
        thread::sleep(Duration::from_millis(1));
    }

    core.update_weight_display();
    print_snapshot(&core, params.json, true);
    tracing::info!(ticks = timer.ticks(), "scale loop stop");
    Ok(())
}

/// Result of `calibrate`.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationReport {
    pub zero_point: u32,
    pub full_scale_count: u32,
    pub scale_factor: f32,
}

/// Zero with an empty platform, then calibrate against `known_grams`.
///
/// Fails if the reference load drives the converter to its full-scale count.
pub fn calibrate(cfg: &scale_config::Config, known_grams: u32) -> CoreResult<CalibrationReport> {
    let timer = Arc::new(SystemTimer::new(cfg.timer.period_us));
    let (mut core, load) = build_sim(cfg, timer)?;
    let sensor = core.sensor_mut();
    sensor.calibrate_zero();
    load.set(known_grams as f32);
    sensor.reset_window();
    sensor.calibrate_full_scale(known_grams)?;
    let cal = *sensor.calibration();
    let max_count = u32::from(SimAdcCfg::default().max_count);
    if cal.full_scale_count >= max_count {
        eyre::bail!(
            "calibration: {known_grams} g saturates the converter (count {}, max {max_count})",
            cal.full_scale_count
        );
    }
    Ok(CalibrationReport {
        zero_point: cal.zero_point,
        full_scale_count: cal.full_scale_count,
        scale_factor: cal.scale_factor,
    })
}

/// Zero an empty platform and confirm the pipeline reads (close to) 0 g.
pub fn self_check(cfg: &scale_config::Config) -> CoreResult<f32> {
    let timer = Arc::new(SystemTimer::new(cfg.timer.period_us));
    let (mut core, _load) = build_sim(cfg, timer)?;
    let sensor = core.sensor_mut();
    sensor.calibrate_zero();
    let mut grams = 0.0;
    for _ in 0..16 {
        grams = sensor.weight_grams();
    }
    if grams > cfg.scale.activity_threshold_g.max(1.0) {
        eyre::bail!("self-check: empty platform reads {grams:.2} g after zeroing");
    }
    Ok(grams)
}
