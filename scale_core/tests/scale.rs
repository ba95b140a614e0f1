use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use scale_core::mocks::{AdcLevel, BuzzerEvent, RecordingBuzzer, ScriptedAdc, ToneLog};
use scale_core::{
    CalibrationRecord, KeyRouter, OverweightMode, ScaleCfg, ScaleCore, ScaleError, ScreenState,
    SensorCfg, SystemTimer,
};
use scale_traits::{Clock, Key};

// One-slot window and 1 g per count: the weight equals the ADC level.
struct Rig {
    core: ScaleCore<ScriptedAdc, RecordingBuzzer, 1>,
    level: AdcLevel,
    tones: ToneLog,
    clock: Arc<SystemTimer>,
}

fn rig_at(mode: OverweightMode, start_ms: u32) -> Rig {
    let adc = ScriptedAdc::new(0);
    let level = adc.level();
    let buzzer = RecordingBuzzer::new();
    let tones = buzzer.log();
    let clock = Arc::new(SystemTimer::starting_at(1_000, start_ms));
    let core = ScaleCore::builder()
        .with_window::<1>()
        .with_source(adc)
        .with_buzzer(buzzer)
        .with_clock(clock.clone())
        .with_sensor_cfg(SensorCfg {
            auto_zero: false,
            ..SensorCfg::default()
        })
        .with_scale_cfg(ScaleCfg {
            overweight_limit_g: 500.0,
            overweight_mode: mode,
            ..ScaleCfg::default()
        })
        .with_calibration(CalibrationRecord {
            scale_factor: 1.0,
            ..CalibrationRecord::default()
        })
        .try_build()
        .expect("build scale");
    let mut rig = Rig {
        core,
        level,
        tones,
        clock,
    };
    rig.core.start();
    rig.tones.clear();
    rig
}

fn rig(mode: OverweightMode) -> Rig {
    rig_at(mode, 0)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn start_sounds_boot_tone() {
    let adc = ScriptedAdc::new(0);
    let buzzer = RecordingBuzzer::new();
    let tones = buzzer.log();
    let mut core = ScaleCore::builder()
        .with_source(adc)
        .with_buzzer(buzzer)
        .try_build()
        .expect("build scale");
    core.start();
    assert_eq!(tones.beeps(), vec![ms(100)]);
    assert!(!core.state().is_measuring);
    assert_eq!(core.state().screen, ScreenState::Active);
}

#[test]
fn start_runs_auto_zero() {
    let adc = ScriptedAdc::new(180);
    let mut core = ScaleCore::builder()
        .with_window::<4>()
        .with_source(adc)
        .with_buzzer(RecordingBuzzer::new())
        .with_sensor_cfg(SensorCfg {
            zero_samples: 8,
            ..SensorCfg::default()
        })
        .try_build()
        .expect("build scale");
    core.start();
    let cal = *core.sensor().calibration();
    assert_eq!(cal.zero_point, 180);
    assert_eq!(cal.tare_value, 180);
    assert_eq!(core.sensor_mut().weight_grams(), 0.0);
}

#[test]
fn realtime_overweight_alarm_follows_weight() {
    let mut r = rig(OverweightMode::RealTime);
    r.core.handle_key(Key::Measure);
    assert!(r.core.state().is_measuring);

    r.level.set(600);
    r.clock.advance_ms(1_000);
    r.core.poll();
    assert!(r.core.state().alarm_active);
    assert!(r.tones.is_sounding());

    // next poll only after a full interval
    r.level.set(400);
    r.clock.advance_ms(999);
    r.core.poll();
    assert!(r.core.state().alarm_active);

    r.clock.advance_ms(1);
    r.core.poll();
    assert!(!r.core.state().alarm_active);
    assert!(!r.tones.is_sounding());
}

#[test]
fn realtime_poll_is_idle_while_not_measuring() {
    let mut r = rig(OverweightMode::RealTime);
    r.level.set(900);
    r.clock.advance_ms(2_000);
    r.core.poll();
    assert!(!r.core.state().alarm_active);
    assert!(r.tones.events().is_empty());
    assert_eq!(r.core.state().last_overweight_check_ms, 2_000);
}

#[test]
fn keycheck_mode_ignores_realtime_poll() {
    let mut r = rig(OverweightMode::KeyCheck);
    r.core.handle_key(Key::Measure);
    r.tones.clear();
    r.level.set(900);
    r.clock.advance_ms(1_000);
    r.core.overweight_check_real_time();
    assert!(!r.core.state().alarm_active);
    assert!(r.tones.events().is_empty());
}

#[test]
fn tare_is_ignored_when_not_measuring() {
    let mut r = rig(OverweightMode::RealTime);
    r.level.set(250);
    r.core.handle_key(Key::Tare);
    assert_eq!(r.core.sensor().calibration().tare_value, 0);
    assert_eq!(r.tones.beeps(), vec![ms(20)]);
}

#[test]
fn tare_while_measuring_zeroes_reading() {
    let mut r = rig(OverweightMode::RealTime);
    r.core.handle_key(Key::Measure);
    r.level.set(250);
    r.tones.clear();
    r.core.handle_key(Key::Tare);
    assert_eq!(r.core.sensor().calibration().tare_value, 250);
    assert_eq!(r.tones.beeps(), vec![ms(50)]);
    r.core.update_weight_display();
    assert_eq!(r.core.state().current_weight_g, 0.0);

    // same load again: same tare
    r.core.handle_key(Key::Tare);
    assert_eq!(r.core.sensor().calibration().tare_value, 250);
}

#[test]
fn keycheck_blocks_measure_when_overweight() {
    let mut r = rig(OverweightMode::KeyCheck);
    r.level.set(600);
    r.core.handle_key(Key::Measure);
    assert!(!r.core.state().is_measuring);
    assert!(r.core.state().alarm_active);
    assert_eq!(
        r.tones.events(),
        vec![BuzzerEvent::Start, BuzzerEvent::Beep(ms(20))]
    );

    r.level.set(400);
    r.tones.clear();
    r.core.handle_key(Key::Measure);
    assert!(r.core.state().is_measuring);
    assert!(!r.core.state().alarm_active);
    assert_eq!(
        r.tones.events(),
        vec![BuzzerEvent::Stop, BuzzerEvent::Beep(ms(100))]
    );
}

#[test]
fn keycheck_blocks_tare_when_overweight() {
    let mut r = rig(OverweightMode::KeyCheck);
    r.level.set(100);
    r.core.handle_key(Key::Measure);
    r.level.set(600);
    r.core.handle_key(Key::Tare);
    assert_eq!(r.core.sensor().calibration().tare_value, 0);
    assert!(r.core.state().alarm_active);
}

#[test]
fn stopping_measurement_clears_weight_and_alarm() {
    let mut r = rig(OverweightMode::RealTime);
    r.core.handle_key(Key::Measure);
    r.level.set(700);
    r.clock.advance_ms(1_000);
    r.core.poll();
    assert!(r.core.state().alarm_active);
    assert!(r.core.state().current_weight_g > 0.0);

    r.tones.clear();
    r.core.handle_key(Key::Measure);
    assert!(!r.core.state().is_measuring);
    assert_eq!(r.core.state().current_weight_g, 0.0);
    assert!(!r.core.state().alarm_active);
    assert_eq!(
        r.tones.events(),
        vec![BuzzerEvent::Beep(ms(30)), BuzzerEvent::Stop]
    );
}

#[rstest]
#[case(Key::Calib, 100)]
#[case(Key::Power, 80)]
fn acknowledge_only_keys(#[case] key: Key, #[case] tone_ms: u64) {
    let mut r = rig(OverweightMode::RealTime);
    let before = r.core.state().clone();
    r.clock.advance_ms(10);
    r.core.handle_key(key);
    assert_eq!(r.tones.beeps(), vec![ms(tone_ms)]);
    assert_eq!(r.core.state().is_measuring, before.is_measuring);
    assert_eq!(r.core.state().last_activity_ms, 10);
}

#[test]
fn display_shows_zero_unless_measuring() {
    let mut r = rig(OverweightMode::RealTime);
    r.level.set(320);
    r.core.update_weight_display();
    assert_eq!(r.core.state().current_weight_g, 0.0);
    r.core.handle_key(Key::Measure);
    r.core.update_weight_display();
    assert_eq!(r.core.state().current_weight_g, 320.0);
}

#[test]
fn idle_scale_enters_standby_and_wakes_on_key() {
    let mut r = rig(OverweightMode::RealTime);
    r.clock.advance_ms(61_000);
    r.core.check_inactivity_timeout();
    assert_eq!(r.core.state().screen, ScreenState::Standby);
    assert!(r.core.is_inactive());

    r.core.handle_key(Key::Power);
    r.core.check_inactivity_timeout();
    assert_eq!(r.core.state().screen, ScreenState::Active);
}

#[test]
fn standby_requires_exceeding_timeout() {
    let mut r = rig(OverweightMode::RealTime);
    r.clock.advance_ms(60_000);
    r.core.poll();
    assert_eq!(r.core.state().screen, ScreenState::Active);
    r.clock.advance_ms(100);
    r.core.poll();
    assert_eq!(r.core.state().screen, ScreenState::Standby);
}

#[test]
fn weight_change_counts_as_activity() {
    let mut r = rig(OverweightMode::RealTime);
    r.clock.advance_ms(30_000);
    // within the 5 g threshold
    r.level.set(4);
    r.core.check_weight_activity();
    assert_eq!(r.core.state().last_activity_ms, 0);

    r.level.set(40);
    r.core.check_weight_activity();
    assert_eq!(r.core.state().last_activity_ms, 30_000);
    assert_eq!(r.core.inactivity_ms(), 0);
}

#[test]
fn elapsed_time_survives_counter_wrap() {
    let mut r = rig_at(OverweightMode::RealTime, u32::MAX - 50);
    r.clock.advance_ms(101);
    assert_eq!(r.clock.now_ms(), 50);
    assert_eq!(r.core.inactivity_ms(), 101);
    r.core.check_inactivity_timeout();
    assert_eq!(r.core.state().screen, ScreenState::Active);
}

#[test]
fn zero_reference_calibration_changes_nothing() {
    let mut r = rig(OverweightMode::RealTime);
    r.level.set(1_000);
    let before = *r.core.sensor().calibration();
    let err = r.core.sensor_mut().calibrate_full_scale(0);
    assert_eq!(err, Err(ScaleError::ZeroReferenceWeight));
    assert_eq!(*r.core.sensor().calibration(), before);
}

#[test]
fn full_scale_calibration_after_zero() {
    let mut r = rig(OverweightMode::RealTime);
    r.level.set(200);
    r.core.sensor_mut().calibrate_zero();
    r.level.set(2_200);
    r.core
        .sensor_mut()
        .calibrate_full_scale(500)
        .expect("calibrate");
    let cal = *r.core.sensor().calibration();
    assert!((cal.scale_factor - 0.25).abs() < 1e-6);
    assert!((r.core.sensor_mut().weight_grams() - 500.0).abs() < 1e-3);
}

#[test]
fn buzzer_failures_do_not_block_state_changes() {
    let clock = Arc::new(SystemTimer::default());
    let buzzer = RecordingBuzzer::failing();
    let tones = buzzer.log();
    let mut core = ScaleCore::builder()
        .with_window::<1>()
        .with_source(ScriptedAdc::new(0))
        .with_buzzer(buzzer)
        .with_clock(clock)
        .try_build()
        .expect("build scale");
    core.start();
    core.handle_key(Key::Measure);
    assert!(core.state().is_measuring);
    assert_eq!(tones.beeps().len(), 2);
}

#[test]
fn router_dispatches_into_scale() {
    let mut r = rig(OverweightMode::RealTime);
    let router = KeyRouter::default();
    router.dispatch(2, &mut r.core);
    assert!(r.core.state().is_measuring);
    router.dispatch(42, &mut r.core);
    assert!(r.core.state().is_measuring);
    assert_eq!(r.tones.beeps(), vec![ms(100)]);
}

#[test]
fn unmapped_key_channel_still_counts_as_activity() {
    let mut r = rig(OverweightMode::RealTime);
    r.clock.advance_ms(30_000);
    KeyRouter::default().dispatch(42, &mut r.core);
    assert_eq!(r.core.state().last_activity_ms, 30_000);
    assert!(!r.core.state().is_measuring);
    assert!(r.tones.events().is_empty());
}

#[test]
fn poll_advances_tick_counter() {
    let mut r = rig(OverweightMode::RealTime);
    let t0 = r.clock.ticks();
    for _ in 0..5 {
        r.core.poll();
    }
    assert_eq!(r.clock.elapsed_ticks(t0), 5);
}
