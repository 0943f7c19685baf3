//! Buffer configuration.

use crate::layout;

/// Configuration for a [`crate::CacheManager`].
///
/// The region length and header offsets are part of the on-disk format and
/// live in [`crate::layout`]; only the tunables that do not change the byte
/// layout are configurable here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pending length above which an append triggers a synchronous flush
    /// to the target file.
    pub flush_threshold: usize,

    /// Maximum chunk size a single copy into the region operates on.
    /// Large payloads are split into sections of this size.
    pub section_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flush_threshold: 400 * 1024,
            section_len: 80 * 1024,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the auto-flush threshold.
    ///
    /// Clamped to [`layout::CONTENT_CAPACITY`]: a threshold at the
    /// capacity never fires, because appends that would pass it are
    /// rejected as over capacity first. Leave headroom below the
    /// capacity for the appends that land before the threshold check.
    #[must_use]
    pub const fn flush_threshold(mut self, bytes: usize) -> Self {
        self.flush_threshold = if bytes > layout::CONTENT_CAPACITY {
            layout::CONTENT_CAPACITY
        } else {
            bytes
        };
        self
    }

    /// Sets the section length used to split large appends.
    #[must_use]
    pub const fn section_len(mut self, bytes: usize) -> Self {
        self.section_len = bytes;
        self
    }
}
