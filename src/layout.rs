use super::constants::{ALIGN_MAX, ALIGN_MIN, STEP_MIN, WORD_BITS, WORD_SIZE};
use super::error::PoolError;

/// Where every region of a pool lives, as byte offsets from the start of the
/// buffer the caller handed in.
///
/// ```text
/// |skip|header|pad|  head  |  body  |pad|              data              |
///                 |<- n words ->|<- n words ->|   |<- n * WORD_BITS * step ->|
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArenaLayout {
    pub align: usize,
    pub step: usize,
    pub chunk_count: usize,
    pub header: usize,
    pub head: usize,
    pub body: usize,
    pub data: usize,
    pub size: usize,
}

pub fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());

    (value + align - 1) & !(align - 1)
}

pub fn resolve_align(requested: usize) -> Result<usize, PoolError> {
    let align = if requested == 0 {
        ALIGN_MIN
    } else {
        requested
            .checked_next_power_of_two()
            .ok_or(PoolError::InvalidAlignment { align: requested })?
    };
    let align = align.max(ALIGN_MIN);

    if align > ALIGN_MAX {
        return Err(PoolError::InvalidAlignment { align: requested });
    }

    Ok(align)
}

pub fn step_for(align: usize) -> usize {
    align.max(STEP_MIN)
}

impl ArenaLayout {
    pub fn compute(
        base: usize,
        size: usize,
        requested_align: usize,
        header_size: usize,
    ) -> Result<Self, PoolError> {
        let align = resolve_align(requested_align)?;
        let step = step_for(align);

        let skip = align_up(base, align) - base;
        if size <= skip {
            return Err(PoolError::BufferTooSmall { size });
        }

        let head = align_up(base + skip + header_size, align) - base;
        if head >= size {
            return Err(PoolError::BufferTooSmall { size });
        }

        // head words + body words + data blocks <= remaining
        let remaining = size - head;
        let chunk_count = remaining / (2 * WORD_SIZE + WORD_BITS * step);
        if chunk_count == 0 {
            return Err(PoolError::BufferTooSmall { size });
        }

        let body = head + chunk_count * WORD_SIZE;
        let data = align_up(base + body + chunk_count * WORD_SIZE, align) - base;
        let data_size = chunk_count * WORD_BITS * step;

        if data > size || data_size > size - data {
            return Err(PoolError::LayoutOverflow);
        }

        Ok(Self {
            align,
            step,
            chunk_count,
            header: skip,
            head,
            body,
            data,
            size,
        })
    }

    pub fn bitmap_bytes(&self) -> usize {
        self.chunk_count * WORD_SIZE
    }

    pub fn data_size(&self) -> usize {
        self.chunk_count * WORD_BITS * self.step
    }

    pub fn max_alloc_size(&self) -> usize {
        WORD_BITS * self.step
    }
}
