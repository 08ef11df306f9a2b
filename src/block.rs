use super::constants::WORD_BITS;

/// Arena relative address of an allocation: the chunk whose bitmap words
/// track it and the bit of its first block within that chunk.
///
/// Obtained from [`crate::TinyPool::alloc_block`] or
/// [`crate::TinyPool::block_of`]; turned back into a pointer with
/// [`crate::TinyPool::block_ptr`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockRef {
    chunk: usize,
    bit: usize,
}

impl BlockRef {
    pub(crate) fn new(chunk: usize, bit: usize) -> Self {
        debug_assert!(bit < WORD_BITS);

        Self { chunk, bit }
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self::new(index / WORD_BITS, index % WORD_BITS)
    }

    pub fn chunk(&self) -> usize {
        self.chunk
    }

    pub fn bit(&self) -> usize {
        self.bit
    }

    /// Block number counted from the start of the data region.
    pub fn index(&self) -> usize {
        self.chunk * WORD_BITS + self.bit
    }
}
