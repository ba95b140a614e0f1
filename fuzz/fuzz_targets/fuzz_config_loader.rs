#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation may reject input but must never panic.
    let Ok(cfg) = scale_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_ok() {
        // A validated config must also pass the core's build-time checks.
        let built = scale_core::ScaleCore::builder()
            .with_config(&cfg)
            .with_source(scale_core::mocks::ScriptedAdc::new(0))
            .with_buzzer(scale_core::mocks::RecordingBuzzer::new())
            .try_build();
        assert!(built.is_ok(), "validated config rejected by builder: {:?}", built.err());
    }
});
