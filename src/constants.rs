use core::mem::size_of;

pub const POOL_MAGIC: u16 = 0xdead;

// Every bitmap word tracks one chunk, one bit per block.
pub const WORD_SIZE: usize = size_of::<usize>();
pub const WORD_BITS: usize = usize::BITS as usize;

pub const ALIGN_MIN: usize = WORD_SIZE;
pub const ALIGN_MAX: usize = 64;
pub const STEP_MIN: usize = 16;

pub const FULL_WORD: usize = usize::MAX;
