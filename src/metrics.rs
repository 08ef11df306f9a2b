/// Diagnostics counters kept in the pool header.
///
/// Only maintained with the `stats` feature; without it every counter stays
/// at zero and the `record_*` calls compile away.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Bytes currently handed out, rounded up to whole blocks.
    pub used: usize,

    /// Highest value `used` has reached since the last clear.
    pub peak: usize,

    /// Running total of bytes requested by successful allocations.
    pub need: usize,

    /// Running total of bytes those allocations actually consumed.
    pub real: usize,

    /// Number of searches that found no space.
    pub fail: usize,

    /// Number of allocations served by the predicted chunk.
    pub pred: usize,

    /// Number of searches performed.
    pub aloc: usize,
}

impl PoolMetrics {
    pub fn record_alloc(&mut self, need: usize, real: usize) {
        #[cfg(feature = "stats")]
        {
            self.aloc += 1;
            self.need += need;
            self.real += real;
            self.record_grow(real);
        }
        #[cfg(not(feature = "stats"))]
        let _ = (need, real);
    }

    pub fn record_fail(&mut self) {
        #[cfg(feature = "stats")]
        {
            self.aloc += 1;
            self.fail += 1;
        }
    }

    pub fn record_pred(&mut self) {
        #[cfg(feature = "stats")]
        {
            self.pred += 1;
        }
    }

    pub fn record_grow(&mut self, bytes: usize) {
        #[cfg(feature = "stats")]
        {
            self.used += bytes;
            self.peak = self.peak.max(self.used);
        }
        #[cfg(not(feature = "stats"))]
        let _ = bytes;
    }

    pub fn record_release(&mut self, bytes: usize) {
        #[cfg(feature = "stats")]
        {
            debug_assert!(self.used >= bytes);
            self.used = self.used.saturating_sub(bytes);
        }
        #[cfg(not(feature = "stats"))]
        let _ = bytes;
    }

    /// Share of consumed bytes lost to block rounding.
    pub fn waste_percent(&self) -> usize {
        if self.real == 0 {
            return 0;
        }

        (self.real - self.need) * 100 / self.real
    }

    pub fn pred_percent(&self) -> usize {
        if self.aloc == 0 {
            return 0;
        }

        self.pred * 100 / self.aloc
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
