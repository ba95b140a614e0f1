//! Fixed-capacity sliding window with an O(1) running mean.
//!
//! Samples live in an inline `[u16; N]` ring addressed by a write cursor.
//! The running sum is kept in a `u64`, wide enough for `N * u16::MAX` for
//! any window that fits in memory.

/// Window length used by the scale unless overridden at build time.
pub const DEFAULT_WINDOW: usize = 1024;

#[derive(Debug, Clone)]
pub struct SampleWindow<const N: usize> {
    buf: [u16; N],
    write_index: usize,
    running_sum: u64,
    filled: bool,
}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleWindow<N> {
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        const { assert!(N > 0, "sample window capacity must be > 0") };
        Self {
            buf: [0; N],
            write_index: 0,
            running_sum: 0,
            filled: false,
        }
    }

    /// Drop all samples.
    pub fn reset(&mut self) {
        self.buf = [0; N];
        self.write_index = 0;
        self.running_sum = 0;
        self.filled = false;
    }

    /// Fold in one sample and return the mean of the valid entries.
    pub fn push(&mut self, sample: u16) -> u32 {
        if self.filled {
            self.running_sum -= u64::from(self.buf[self.write_index]);
        }
        self.running_sum += u64::from(sample);
        self.buf[self.write_index] = sample;
        self.write_index += 1;
        if self.write_index == N {
            self.write_index = 0;
            self.filled = true;
        }
        self.average()
    }

    /// Mean of the valid entries (truncating); 0 when empty.
    pub fn average(&self) -> u32 {
        let len = self.len() as u64;
        if len == 0 {
            return 0;
        }
        // mean of u16 values always fits in u32
        (self.running_sum / len) as u32
    }

    /// Number of valid entries: the samples fed so far, capped at `N`.
    pub fn len(&self) -> usize {
        if self.filled { N } else { self.write_index }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn write_index(&self) -> usize {
        self.write_index
    }

    pub fn running_sum(&self) -> u64 {
        self.running_sum
    }
}
