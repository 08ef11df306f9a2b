//! A tiny fixed capacity pool allocator that lives entirely inside a byte
//! buffer supplied by the caller.
//!
//! The buffer is split at construction into a small header, two parallel
//! bitmaps and a data region of `step` byte blocks. Every bitmap word covers
//! one chunk of `usize::BITS` blocks. An allocation is a run of consecutive
//! blocks inside a single chunk; the *body* bitmap records which blocks are
//! occupied and the *head* bitmap records where each run starts, which is all
//! that is needed to free a run without a size header.
//!
//! ```rust
//! use tinypool::TinyPool;
//!
//! let mut buffer = [0u8; 4096];
//! let mut pool = TinyPool::new(&mut buffer, 16).unwrap();
//!
//! let a = pool.alloc(16).unwrap();
//! let b = pool.alloc(40).unwrap();
//! assert!(a < b);
//!
//! pool.free(a.as_ptr()).unwrap();
//! assert_eq!(pool.alloc(16).unwrap(), a);
//! ```
//!
//! Nothing is ever allocated from the global heap and no operation blocks.
//! The pool is single threaded; wrap it in a lock to share it.
//!
//! Once a search fails the pool marks itself exhausted and every later
//! allocation fails immediately, without scanning, until something is freed
//! or the pool is cleared.
//!
//! Handles can be kept as raw pointers or as arena relative [`BlockRef`]s:
//! ```rust
//! use tinypool::TinyPool;
//!
//! let mut buffer = [0u8; 4096];
//! let mut pool = TinyPool::new(&mut buffer, 0).unwrap();
//!
//! let block = pool.alloc_block(5).unwrap();
//! pool.bytes_mut(block).unwrap()[..5].copy_from_slice(b"hello");
//!
//! assert_eq!(&pool.bytes(block).unwrap()[..5], b"hello");
//! pool.free_block(block).unwrap();
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

mod bitmap;
mod block;
mod config;
mod constants;
mod error;
mod header;
mod layout;
mod metrics;
mod pool;
mod report;

pub use block::BlockRef;
pub use config::{PoolConfig, POOL_CONFIG_DEFAULT_ALIGN, POOL_CONFIG_DEFAULT_PREDICT};
pub use constants::{ALIGN_MAX, STEP_MIN, WORD_BITS};
pub use error::PoolError;
pub use layout::ArenaLayout;
pub use metrics::PoolMetrics;
pub use pool::TinyPool;
pub use report::PoolReport;
