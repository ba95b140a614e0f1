#![no_main]
use libfuzzer_sys::fuzz_target;
use scale_core::SampleWindow;

fuzz_target!(|data: &[u8]| {
    let mut w = SampleWindow::<7>::new();
    let mut recent = std::collections::VecDeque::with_capacity(7);
    for pair in data.chunks_exact(2) {
        let s = u16::from_le_bytes([pair[0], pair[1]]);
        if recent.len() == 7 {
            recent.pop_front();
        }
        recent.push_back(s);
        let mean = w.push(s);
        let naive = recent.iter().map(|&v| u64::from(v)).sum::<u64>() / recent.len() as u64;
        assert_eq!(u64::from(mean), naive);
    }
});
