//! # pagelog storage
//!
//! Memory-mapped region backend for pagelog.
//!
//! This crate provides the lowest-level abstraction for pagelog: a
//! fixed-length file mapped read/write into process memory. The mapped
//! region is an **opaque byte block** - this crate does not interpret
//! the data it maps. `pagelog_core` owns all header interpretation.
//!
//! ## Design Principles
//!
//! - The region has a fixed length decided by the caller; an undersized
//!   backing file is zero-extended, a larger one is never truncated
//! - Writes go through the OS page cache and survive process crashes
//! - Exactly one writer per region at a time (a caller precondition,
//!   not enforced here)
//!
//! ## Example
//!
//! ```no_run
//! use pagelog_storage::MappedRegion;
//! use std::path::Path;
//!
//! let mut region = MappedRegion::open(Path::new("buffer.bin"), 4096).unwrap();
//! region.as_mut_slice()[0] = 0x42;
//! region.sync_async().unwrap();
//! ```

#![warn(missing_docs)]

mod error;
mod region;

pub use error::{StorageError, StorageResult};
pub use region::MappedRegion;
