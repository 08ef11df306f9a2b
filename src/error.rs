use thiserror::Error;

/// Every way a pool operation can fail.
///
/// Init errors (`InvalidAlignment`, `BufferTooSmall`, `LayoutOverflow`) mean no
/// pool was built. `InvalidSize`, `RequestTooLarge`, `PoolExhausted` and
/// `SizeOverflow` are ordinary allocation outcomes. `InvalidPointer` and
/// `DoubleFree` are caller bugs, see the `panic-on-misuse` feature.
#[non_exhaustive]
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    #[error("alignment {align} exceeds the 64 byte maximum")]
    InvalidAlignment { align: usize },

    #[error("buffer of {size} bytes is too small to hold a pool")]
    BufferTooSmall { size: usize },

    #[error("computed pool layout does not fit inside the buffer")]
    LayoutOverflow,

    #[error("zero sized allocation")]
    InvalidSize,

    #[error("request of {size} bytes exceeds the {max} byte chunk limit")]
    RequestTooLarge { size: usize, max: usize },

    #[error("pool exhausted")]
    PoolExhausted,

    #[error("array size overflows usize")]
    SizeOverflow,

    #[error("pointer was not allocated by this pool")]
    InvalidPointer,

    #[error("pointer was already freed")]
    DoubleFree,
}

impl PoolError {
    pub fn is_misuse(&self) -> bool {
        matches!(self, PoolError::InvalidPointer | PoolError::DoubleFree)
    }
}
