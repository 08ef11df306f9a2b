use super::constants::WORD_BITS;
use super::pool::TinyPool;
use core::fmt;
use tracing::debug;

/// Human readable utilization report of a pool, see [`TinyPool::report`].
pub struct PoolReport<'p, 'a> {
    pool: &'p TinyPool<'a>,
}

impl<'a> TinyPool<'a> {
    pub fn report(&self) -> PoolReport<'_, 'a> {
        PoolReport { pool: self }
    }

    /// Writes [`TinyPool::report`] to the `debug` log.
    pub fn dump(&self) {
        debug!("\n{}", self.report());
    }
}

impl fmt::Display for PoolReport<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pool = self.pool;
        let header = pool.header();
        let metrics = pool.metrics();

        writeln!(f, "tinypool: magic: {:#x}", header.magic)?;
        writeln!(f, "tinypool: align: {}", header.align)?;
        writeln!(f, "tinypool: step: {}", header.step)?;
        writeln!(f, "tinypool: chunks: {}", header.chunk_count)?;
        writeln!(f, "tinypool: data: {:p}", pool.data_range().start)?;
        writeln!(f, "tinypool: size: {}", pool.capacity())?;
        writeln!(f, "tinypool: full: {}", header.exhausted)?;
        writeln!(f, "tinypool: used: {}", metrics.used)?;
        writeln!(f, "tinypool: peak: {}", metrics.peak)?;
        writeln!(f, "tinypool: wast: {}%", metrics.waste_percent())?;
        writeln!(f, "tinypool: fail: {}", metrics.fail)?;
        write!(f, "tinypool: pred: {}%", metrics.pred_percent())?;

        for (index, (head, body)) in pool.heads().iter().zip(pool.bodies()).enumerate() {
            if *body == 0 {
                continue;
            }

            write!(
                f,
                "\n    tinypool: [{index}]: head: {head:0width$b}, body: {body:0width$b}",
                width = WORD_BITS
            )?;
        }

        Ok(())
    }
}
