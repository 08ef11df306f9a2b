use super::bitmap;
use super::block::BlockRef;
use super::config::PoolConfig;
use super::error::PoolError;
use super::header::PoolHeader;
use super::layout::ArenaLayout;
use super::metrics::PoolMetrics;
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::mem::size_of;
use core::ops::Range;
use core::ptr::{self, NonNull};
use core::slice;
use tracing::{debug, trace, warn};

/// A fixed capacity allocator carved out of a caller supplied buffer.
///
/// The buffer holds everything: a small header record, the head and body bitmaps
/// and the data region. Allocations are runs of `step` byte blocks that never
/// cross a chunk (one bitmap word) boundary, so the largest request a pool
/// can serve is `step * WORD_BITS` bytes.
///
/// A pool is a plain single owner structure. Nothing inside it synchronizes;
/// sharing one between threads requires an outside lock.
pub struct TinyPool<'a> {
    header: NonNull<PoolHeader>,
    head: NonNull<usize>,
    body: NonNull<usize>,
    data: NonNull<u8>,
    layout: ArenaLayout,
    _buffer: PhantomData<&'a mut [u8]>,
}

// SAFETY: the pool holds the only borrow of its buffer, so moving it to
// another thread moves exclusive access along with it.
unsafe impl<'a> Send for TinyPool<'a> {}

// Debug builds always fail loudly; release builds only with the feature.
const PANIC_ON_MISUSE: bool = cfg!(any(feature = "panic-on-misuse", debug_assertions));

fn misuse(err: PoolError) -> PoolError {
    if err.is_misuse() {
        if PANIC_ON_MISUSE {
            panic!("tinypool misuse: {err}");
        }

        warn!(error = %err, "tinypool misuse ignored");
    }

    err
}

impl<'a> TinyPool<'a> {
    pub fn new(buffer: &'a mut [u8], align: usize) -> Result<Self, PoolError> {
        Self::with_config(buffer, PoolConfig::with_align(align))
    }

    pub fn with_config(buffer: &'a mut [u8], config: PoolConfig) -> Result<Self, PoolError> {
        let layout = ArenaLayout::compute(
            buffer.as_ptr() as usize,
            buffer.len(),
            config.align,
            size_of::<PoolHeader>(),
        )?;

        buffer[layout.header..].fill(0);

        let base = buffer.as_mut_ptr();

        // SAFETY: compute() only returns offsets that lie inside the buffer,
        // each aligned to at least the word size, with the header, bitmaps and
        // data region disjoint.
        let pool = unsafe {
            let header = NonNull::new_unchecked(base.add(layout.header).cast::<PoolHeader>());

            header.as_ptr().write(PoolHeader::new(&layout, &config));

            Self {
                header,
                head: NonNull::new_unchecked(base.add(layout.head).cast::<usize>()),
                body: NonNull::new_unchecked(base.add(layout.body).cast::<usize>()),
                data: NonNull::new_unchecked(base.add(layout.data)),
                layout,
                _buffer: PhantomData,
            }
        };

        debug!(
            align = layout.align,
            step = layout.step,
            chunks = layout.chunk_count,
            capacity = layout.data_size(),
            "tinypool initialized"
        );

        Ok(pool)
    }

    pub fn alloc(&mut self, size: usize) -> Result<NonNull<u8>, PoolError> {
        let block = self.alloc_block(size)?;

        Ok(self.ptr_at(block))
    }

    pub fn alloc_zeroed(&mut self, size: usize) -> Result<NonNull<u8>, PoolError> {
        let ptr = self.alloc(size)?;

        // SAFETY: the run just allocated spans at least `size` bytes.
        unsafe { ptr.as_ptr().write_bytes(0, size) };

        Ok(ptr)
    }

    pub fn alloc_array(&mut self, count: usize, item_size: usize) -> Result<NonNull<u8>, PoolError> {
        let size = count.checked_mul(item_size).ok_or(PoolError::SizeOverflow)?;

        self.alloc(size)
    }

    pub fn alloc_array_zeroed(
        &mut self,
        count: usize,
        item_size: usize,
    ) -> Result<NonNull<u8>, PoolError> {
        let size = count.checked_mul(item_size).ok_or(PoolError::SizeOverflow)?;

        self.alloc_zeroed(size)
    }

    pub fn alloc_block(&mut self, size: usize) -> Result<BlockRef, PoolError> {
        if size == 0 {
            return Err(PoolError::InvalidSize);
        }

        let max = self.layout.max_alloc_size();
        if size > max {
            return Err(PoolError::RequestTooLarge { size, max });
        }

        // Once a search fails nothing scans again until a free or clear.
        if self.header().exhausted {
            return Err(PoolError::PoolExhausted);
        }

        let step = self.layout.step;
        let blocks = size.div_ceil(step);

        match self.find_run(blocks) {
            Some((block, predicted)) => {
                self.mark_run(block, blocks);

                let metrics = &mut self.header_mut().metrics;
                metrics.record_alloc(size, blocks * step);
                if predicted {
                    metrics.record_pred();
                }

                trace!(chunk = block.chunk(), bit = block.bit(), blocks, "alloc");

                Ok(block)
            }
            None => {
                let header = self.header_mut();
                header.exhausted = true;
                header.metrics.record_fail();

                debug!(size, blocks, "tinypool exhausted");

                Err(PoolError::PoolExhausted)
            }
        }
    }

    /// Releases the allocation starting at `ptr`. A null pointer is ignored.
    pub fn free(&mut self, ptr: *mut u8) -> Result<(), PoolError> {
        if ptr.is_null() {
            return Ok(());
        }

        let block = self.block_of(ptr).map_err(misuse)?;

        self.free_block(block)
    }

    pub fn free_block(&mut self, block: BlockRef) -> Result<(), PoolError> {
        let blocks = self.run_of(block).map_err(misuse)?;

        self.release(block, blocks);

        trace!(chunk = block.chunk(), bit = block.bit(), blocks, "free");

        Ok(())
    }

    /// Resizes the allocation at `ptr`, in place when its chunk allows it.
    ///
    /// A null `ptr` allocates, a zero `size` frees and returns `None`. When
    /// the run cannot grow in place the contents move to a fresh allocation;
    /// if that allocation fails the old one is left untouched.
    pub fn realloc(&mut self, ptr: *mut u8, size: usize) -> Result<Option<NonNull<u8>>, PoolError> {
        if ptr.is_null() {
            if size == 0 {
                return Ok(None);
            }

            return self.alloc(size).map(Some);
        }

        if size == 0 {
            self.free(ptr)?;

            return Ok(None);
        }

        let block = self.block_of(ptr).map_err(misuse)?;
        let old_blocks = self.run_of(block).map_err(misuse)?;

        let max = self.layout.max_alloc_size();
        if size > max {
            return Err(PoolError::RequestTooLarge { size, max });
        }

        let step = self.layout.step;
        let new_blocks = size.div_ceil(step);

        let block = match new_blocks.cmp(&old_blocks) {
            Ordering::Equal => block,
            Ordering::Less => {
                self.shrink_run(block, old_blocks, new_blocks);
                block
            }
            Ordering::Greater => {
                if self.grow_run(block, old_blocks, new_blocks) {
                    block
                } else {
                    self.relocate(block, old_blocks, size)?
                }
            }
        };

        trace!(
            chunk = block.chunk(),
            bit = block.bit(),
            old_blocks,
            new_blocks,
            "realloc"
        );

        Ok(Some(self.ptr_at(block)))
    }

    /// Drops every allocation and zeroes the data region. The layout stays.
    pub fn clear(&mut self) {
        debug_assert!(self.is_valid());

        // SAFETY: data points at data_size() bytes owned by this pool.
        unsafe { self.data.as_ptr().write_bytes(0, self.layout.data_size()) };

        self.heads_mut().fill(0);
        self.bodies_mut().fill(0);
        self.header_mut().reset();

        debug!("tinypool cleared");
    }

    /// Clears the pool and wipes its header. The buffer goes back to the
    /// caller, who still owns it.
    pub fn destroy(mut self) {
        debug_assert!(self.is_valid());

        if !self.is_valid() {
            return;
        }

        self.clear();

        // SAFETY: the header record sits inside the buffer at init time.
        unsafe {
            self.header
                .as_ptr()
                .cast::<u8>()
                .write_bytes(0, size_of::<PoolHeader>())
        };

        debug!("tinypool destroyed");
    }

    pub fn block_of(&self, ptr: *const u8) -> Result<BlockRef, PoolError> {
        let addr = ptr as usize;
        let data = self.data.as_ptr() as usize;

        if addr < data || addr >= data + self.layout.data_size() {
            return Err(PoolError::InvalidPointer);
        }

        let offset = addr - data;
        if offset % self.layout.step != 0 {
            return Err(PoolError::InvalidPointer);
        }

        Ok(BlockRef::from_index(offset / self.layout.step))
    }

    pub fn block_ptr(&self, block: BlockRef) -> Result<NonNull<u8>, PoolError> {
        if block.chunk() >= self.layout.chunk_count {
            return Err(PoolError::InvalidPointer);
        }

        Ok(self.ptr_at(block))
    }

    /// Number of usable bytes behind a live allocation: its blocks times the
    /// step, which can exceed what was requested.
    pub fn run_size(&self, ptr: *const u8) -> Result<usize, PoolError> {
        let block = self.block_of(ptr).map_err(misuse)?;

        Ok(self.run_of(block).map_err(misuse)? * self.layout.step)
    }

    pub fn bytes(&self, block: BlockRef) -> Result<&[u8], PoolError> {
        let len = self.run_of(block).map_err(misuse)? * self.layout.step;

        // SAFETY: the run is live and lies inside the data region, and the
        // shared borrow of the pool keeps it from being freed or resized.
        Ok(unsafe { slice::from_raw_parts(self.ptr_at(block).as_ptr(), len) })
    }

    pub fn bytes_mut(&mut self, block: BlockRef) -> Result<&mut [u8], PoolError> {
        let len = self.run_of(block).map_err(misuse)? * self.layout.step;

        // SAFETY: as in bytes(), with the exclusive borrow of the pool.
        Ok(unsafe { slice::from_raw_parts_mut(self.ptr_at(block).as_ptr(), len) })
    }

    pub fn is_valid(&self) -> bool {
        self.header().is_valid()
    }

    pub fn is_exhausted(&self) -> bool {
        self.header().exhausted
    }

    pub fn owns(&self, ptr: *const u8) -> bool {
        self.data_range().contains(&ptr)
    }

    pub fn align(&self) -> usize {
        self.layout.align
    }

    pub fn step(&self) -> usize {
        self.layout.step
    }

    pub fn chunk_count(&self) -> usize {
        self.layout.chunk_count
    }

    /// Bytes in the data region.
    pub fn capacity(&self) -> usize {
        self.layout.data_size()
    }

    pub fn max_alloc_size(&self) -> usize {
        self.layout.max_alloc_size()
    }

    pub fn layout(&self) -> &ArenaLayout {
        &self.layout
    }

    pub fn data_range(&self) -> Range<*const u8> {
        let start = self.data.as_ptr() as *const u8;

        // SAFETY: one past the end of the data region is still in the buffer
        // or one past it.
        start..unsafe { start.add(self.layout.data_size()) }
    }

    pub fn metrics(&self) -> PoolMetrics {
        self.header().metrics
    }

    pub(crate) fn header(&self) -> &PoolHeader {
        // SAFETY: written at init and only reachable through this pool.
        unsafe { self.header.as_ref() }
    }

    fn header_mut(&mut self) -> &mut PoolHeader {
        // SAFETY: as in header(), with the exclusive borrow of the pool.
        unsafe { self.header.as_mut() }
    }

    pub(crate) fn heads(&self) -> &[usize] {
        // SAFETY: chunk_count zeroed words inside the buffer, disjoint from
        // the body words and the data region.
        unsafe { slice::from_raw_parts(self.head.as_ptr(), self.layout.chunk_count) }
    }

    fn heads_mut(&mut self) -> &mut [usize] {
        unsafe { slice::from_raw_parts_mut(self.head.as_ptr(), self.layout.chunk_count) }
    }

    pub(crate) fn bodies(&self) -> &[usize] {
        unsafe { slice::from_raw_parts(self.body.as_ptr(), self.layout.chunk_count) }
    }

    fn bodies_mut(&mut self) -> &mut [usize] {
        unsafe { slice::from_raw_parts_mut(self.body.as_ptr(), self.layout.chunk_count) }
    }

    fn ptr_at(&self, block: BlockRef) -> NonNull<u8> {
        debug_assert!(block.chunk() < self.layout.chunk_count);

        // SAFETY: block indexes stay below chunk_count * WORD_BITS, which keeps
        // the offset inside the data region.
        unsafe { NonNull::new_unchecked(self.data.as_ptr().add(block.index() * self.layout.step)) }
    }

    // Returns the run's length in blocks, or why `block` is not the start of
    // a live allocation.
    fn run_of(&self, block: BlockRef) -> Result<usize, PoolError> {
        let chunk = block.chunk();
        let bit = block.bit();

        if chunk >= self.layout.chunk_count {
            return Err(PoolError::InvalidPointer);
        }

        let head = self.heads()[chunk];
        let body = self.bodies()[chunk];

        if !bitmap::is_set(head, bit) {
            if bitmap::is_set(body, bit) {
                return Err(PoolError::InvalidPointer);
            }

            return Err(PoolError::DoubleFree);
        }

        Ok(bitmap::run_len(head, body, bit))
    }

    // The bool reports whether the predicted chunk served the request.
    fn find_run(&self, blocks: usize) -> Option<(BlockRef, bool)> {
        let header = self.header();
        let bodies = self.bodies();

        if header.predict && header.pred < bodies.len() {
            if let Some(bit) = bitmap::find_fit(bodies[header.pred], blocks) {
                return Some((BlockRef::new(header.pred, bit), true));
            }
        }

        // Only the first chunk with any free block is searched.
        let chunk = bodies.iter().position(|&body| !bitmap::is_full(body))?;
        let bit = bitmap::find_fit(bodies[chunk], blocks)?;

        Some((BlockRef::new(chunk, bit), false))
    }

    fn mark_run(&mut self, block: BlockRef, blocks: usize) {
        let chunk = block.chunk();
        let bit = block.bit();

        debug_assert!(bitmap::is_free(self.bodies()[chunk], bit, blocks));

        self.bodies_mut()[chunk] |= bitmap::span_mask(bit, blocks);
        self.heads_mut()[chunk] |= 1 << bit;
    }

    fn release(&mut self, block: BlockRef, blocks: usize) {
        let chunk = block.chunk();
        let bit = block.bit();
        let step = self.layout.step;

        self.bodies_mut()[chunk] &= !bitmap::span_mask(bit, blocks);
        self.heads_mut()[chunk] &= !(1 << bit);

        let header = self.header_mut();
        header.exhausted = false;
        header.pred = chunk;
        header.metrics.record_release(blocks * step);
    }

    fn shrink_run(&mut self, block: BlockRef, old_blocks: usize, new_blocks: usize) {
        let chunk = block.chunk();
        let tail = block.bit() + new_blocks;
        let step = self.layout.step;

        self.bodies_mut()[chunk] &= !bitmap::span_mask(tail, old_blocks - new_blocks);

        let header = self.header_mut();
        header.exhausted = false;
        header.pred = chunk;
        header.metrics.record_release((old_blocks - new_blocks) * step);
    }

    fn grow_run(&mut self, block: BlockRef, old_blocks: usize, new_blocks: usize) -> bool {
        let chunk = block.chunk();
        let tail = block.bit() + old_blocks;
        let extra = new_blocks - old_blocks;

        if !bitmap::is_free(self.bodies()[chunk], tail, extra) {
            return false;
        }

        let step = self.layout.step;

        self.bodies_mut()[chunk] |= bitmap::span_mask(tail, extra);
        self.header_mut().metrics.record_grow(extra * step);

        true
    }

    fn relocate(
        &mut self,
        block: BlockRef,
        old_blocks: usize,
        size: usize,
    ) -> Result<BlockRef, PoolError> {
        let new_block = self.alloc_block(size)?;
        let len = size.min(old_blocks * self.layout.step);

        // SAFETY: both runs are live at this point, so they are disjoint and
        // each is at least `len` bytes long.
        unsafe {
            ptr::copy_nonoverlapping(
                self.ptr_at(block).as_ptr(),
                self.ptr_at(new_block).as_ptr(),
                len,
            );
        }

        self.release(block, old_blocks);

        Ok(new_block)
    }
}

impl fmt::Debug for TinyPool<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TinyPool")
            .field("data", &self.data)
            .field("align", &self.layout.align)
            .field("step", &self.layout.step)
            .field("chunk_count", &self.layout.chunk_count)
            .field("exhausted", &self.is_exhausted())
            .finish()
    }
}
