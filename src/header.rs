use super::config::PoolConfig;
use super::constants::POOL_MAGIC;
use super::layout::ArenaLayout;
use super::metrics::PoolMetrics;

/// The record written at the (aligned) start of the caller's buffer.
///
/// Layout fields are fixed at init. `exhausted` and `pred` change as the pool
/// is used, `metrics` only with the `stats` feature.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct PoolHeader {
    pub magic: u16,
    pub align: u8,
    pub step: u8,
    pub exhausted: bool,
    pub predict: bool,
    pub chunk_count: usize,
    pub pred: usize,
    pub metrics: PoolMetrics,
}

impl PoolHeader {
    pub fn new(layout: &ArenaLayout, config: &PoolConfig) -> Self {
        debug_assert!(layout.align <= u8::MAX as usize);
        debug_assert!(layout.step <= u8::MAX as usize);

        Self {
            magic: POOL_MAGIC,
            align: layout.align as u8,
            step: layout.step as u8,
            exhausted: false,
            predict: config.predict,
            chunk_count: layout.chunk_count,
            pred: 0,
            metrics: PoolMetrics::default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == POOL_MAGIC
    }

    pub fn reset(&mut self) {
        self.exhausted = false;
        self.pred = 0;
        self.metrics.reset();
    }
}
