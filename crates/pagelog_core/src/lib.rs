//! # pagelog core
//!
//! Crash-resilient write buffer for log-style append data.
//!
//! This crate provides:
//! - The fixed binary header layout that multiplexes target path, pending
//!   length, and pending content inside one mapped region
//! - [`CacheManager`], the append/flush/reset state machine over that region
//! - Byte-order normalization so the on-disk header reads the same on any
//!   host architecture
//!
//! ## How it works
//!
//! Callers append byte payloads which accumulate in a 600 KiB region mapped
//! from a backing file. Once more than 400 KiB is pending, or when
//! [`CacheManager::force_flush`] is called, the pending bytes are appended
//! to the configured target file and the region is cleared. The region
//! lives in the OS page cache, so bytes buffered by a crashed process are
//! still there when the backing file is reopened.
//!
//! ## Example
//!
//! ```no_run
//! use pagelog_core::{CacheManager, Config};
//! use std::path::Path;
//!
//! let mut cache = CacheManager::open(Path::new("buffer.bin"), Config::default()).unwrap();
//! cache.set_target(Path::new("app.log")).unwrap();
//! cache.append(b"line of log data\n").unwrap();
//! cache.force_flush().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod endian;
mod error;
pub mod layout;
mod manager;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use manager::CacheManager;
