/// Settings a pool is built with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Requested alignment of every returned pointer. Zero picks the platform
    /// word size. Rounded up to a power of two and clamped below by the word
    /// size; anything above 64 is rejected.
    pub align: usize,
    /// When set, an allocation first probes the chunk that most recently had
    /// blocks freed before falling back to the scan from chunk 0.
    pub predict: bool,
}

pub const POOL_CONFIG_DEFAULT_ALIGN: usize = 0;
pub const POOL_CONFIG_DEFAULT_PREDICT: bool = false;

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            align: POOL_CONFIG_DEFAULT_ALIGN,
            predict: POOL_CONFIG_DEFAULT_PREDICT,
        }
    }
}

impl PoolConfig {
    pub fn with_align(align: usize) -> Self {
        PoolConfig {
            align,
            ..Self::default()
        }
    }
}
