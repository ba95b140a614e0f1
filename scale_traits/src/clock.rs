/// Millisecond clock shared between the main loop and the timer interrupt.
///
/// - now_ms(): current millisecond counter (wraps at 2^32)
/// - ticks(): coarse main-loop iteration counter (wraps at 2^32)
/// - tick(): advance the iteration counter by one
/// - elapsed_ms()/elapsed_ticks(): wraparound-safe differences
///
/// Implementations must not tear the counter when it is read from the main
/// loop while the timer source is updating it.
pub trait Clock {
    fn now_ms(&self) -> u32;
    fn ticks(&self) -> u32;
    fn tick(&self);

    /// Milliseconds elapsed since `start`, correct across one counter wrap.
    #[inline]
    fn elapsed_ms(&self, start: u32) -> u32 {
        elapsed_since(start, self.now_ms())
    }

    /// Main-loop iterations since `start`, correct across one counter wrap.
    #[inline]
    fn elapsed_ticks(&self, start: u32) -> u32 {
        elapsed_since(start, self.ticks())
    }
}

/// Distance from `start` to `now` on a 32-bit wrapping counter.
///
/// `now >= start` gives `now - start`; otherwise the counter overflowed once
/// and the result is `(u32::MAX - start) + now + 1`. Both cases are exactly
/// `now.wrapping_sub(start)`.
#[inline]
pub fn elapsed_since(start: u32, now: u32) -> u32 {
    now.wrapping_sub(start)
}
