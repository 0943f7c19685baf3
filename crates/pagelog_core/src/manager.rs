//! The cache-file manager: append/flush/reset over the mapped region.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::layout;
use pagelog_storage::MappedRegion;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Crash-resilient write buffer over a memory-mapped backing file.
///
/// Appended payloads accumulate in the content area of the region and are
/// drained into the configured target file, either automatically once the
/// pending length crosses [`Config::flush_threshold`] or explicitly via
/// [`force_flush`](Self::force_flush). The region header always records
/// the current target path and pending length, so a process that crashes
/// mid-buffering leaves enough state behind for the next run (or external
/// tooling) to deliver the bytes.
///
/// # Concurrency
///
/// Single-threaded and single-writer by design. The manager owns its
/// region exclusively; every mutating operation takes `&mut self` and
/// runs to completion on the calling thread. Two processes mapping the
/// same backing file will corrupt the header; exclusivity across
/// processes is a caller precondition.
#[derive(Debug)]
pub struct CacheManager {
    region: MappedRegion,
    /// In-memory mirror of the header's `content_len`, so appends do not
    /// re-read the header.
    pending_len: usize,
    target_path: Option<String>,
    config: Config,
}

impl CacheManager {
    /// Opens the backing cache file and recovers any state left in it.
    ///
    /// Creates the backing file if absent and maps it at the fixed
    /// [`layout::REGION_LEN`]. If the header holds a pending length and
    /// target path from a previous run, both are adopted so the leftover
    /// bytes flush on the next target switch or force-flush. A header
    /// that fails the plausibility guard is logged and reset; stale bytes
    /// are not worth refusing to start over.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be created, extended
    /// to the region length, or mapped.
    pub fn open(backing_path: &Path, config: Config) -> CoreResult<Self> {
        let mut region = MappedRegion::open(backing_path, layout::REGION_LEN)?;

        let recovered = layout::read_content_len(region.as_slice()).and_then(|len| {
            let path = layout::read_target_path(region.as_slice())?;
            Ok((len as usize, path))
        });
        let (pending_len, target_path) = match recovered {
            Ok(state) => state,
            Err(err) => {
                warn!(%err, "cache header failed plausibility check, resetting region");
                layout::zero_header(region.as_mut_slice(), layout::CONTENT_CAPACITY);
                (0, None)
            }
        };

        if pending_len > 0 {
            debug!(
                pending = pending_len,
                path = target_path.as_deref().unwrap_or(""),
                "recovered pending content from previous run"
            );
        }

        Ok(Self {
            region,
            pending_len,
            target_path,
            config,
        })
    }

    /// Sets the target file that flushed content is appended to.
    ///
    /// If content is pending, it is first flushed to the target path
    /// *stored in the header* and the header is fully reset, so bytes
    /// always drain to whichever file was active when they were appended.
    /// Only then is the new path written. If the drain fails, the error
    /// propagates and the stored path is left unchanged, keeping the
    /// pending bytes attached to their original target for retry.
    ///
    /// Pending content buffered before any target was configured is kept
    /// and will flush to the new target.
    ///
    /// # Errors
    ///
    /// Returns an error if the new path is empty, longer than
    /// [`layout::PATH_CAPACITY`] bytes, or not UTF-8, or if draining the
    /// previous target fails.
    pub fn set_target(&mut self, path: &Path) -> CoreResult<()> {
        let new_path = target_path_str(path)?;

        let pending = layout::read_content_len(self.region.as_slice())? as usize;
        if pending > 0 {
            // Bytes buffered before any target existed (stored path empty)
            // stay pending and will drain to the new target instead.
            if let Some(old_path) = layout::read_target_path(self.region.as_slice())? {
                debug!(
                    old = %old_path,
                    new = %new_path,
                    pending,
                    "draining pending content before target switch"
                );
                self.pending_len = pending;
                self.flush_to(&old_path)?;
                layout::zero_header(self.region.as_mut_slice(), 0);
            }
        }

        layout::write_target_path(self.region.as_mut_slice(), new_path)?;
        self.target_path = Some(new_path.to_owned());
        Ok(())
    }

    /// Appends a payload to the buffer.
    ///
    /// The payload is split into sections of [`Config::section_len`] and
    /// copied strictly left to right. After each section the header's
    /// pending length is updated, and once it exceeds
    /// [`Config::flush_threshold`] the buffer synchronously flushes to
    /// the target file. An empty payload is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CapacityExceeded`] (leaving the region
    /// unchanged) if the payload cannot fit in the content area behind
    /// the already-pending bytes, and [`CoreError::NoTargetPath`] if an
    /// auto-flush fires before a target was configured. Flush I/O errors
    /// propagate with the pending bytes still buffered.
    pub fn append(&mut self, payload: &[u8]) -> CoreResult<()> {
        if payload.is_empty() {
            return Ok(());
        }
        if self.pending_len + payload.len() > layout::CONTENT_CAPACITY {
            return Err(CoreError::CapacityExceeded {
                pending: self.pending_len,
                requested: payload.len(),
                capacity: layout::CONTENT_CAPACITY,
            });
        }

        let section_len = self.config.section_len.max(1);
        for section in payload.chunks(section_len) {
            self.write_section(section)?;
        }
        Ok(())
    }

    /// Flushes all pending content to the target file immediately,
    /// regardless of the threshold.
    ///
    /// A no-op when nothing is pending. Used by callers that need
    /// guaranteed delivery before shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoTargetPath`] if no target is configured,
    /// or the I/O error from the target file; pending content survives
    /// a failed flush for retry.
    pub fn force_flush(&mut self) -> CoreResult<()> {
        let target = self.target_path.clone().ok_or(CoreError::NoTargetPath)?;
        self.flush_to(&target)
    }

    /// Requests asynchronous writeback of the mapped region to its
    /// backing file.
    ///
    /// A durability hint for the *cache* file, distinct from flushing to
    /// the target file; does not block for completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the writeback request fails.
    pub fn sync(&self) -> CoreResult<()> {
        self.region.sync_async()?;
        Ok(())
    }

    /// Returns the number of bytes currently buffered.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending_len
    }

    /// Returns the configured target path, if any.
    #[must_use]
    pub fn target_path(&self) -> Option<&str> {
        self.target_path.as_deref()
    }

    /// Returns the path of the backing cache file.
    #[must_use]
    pub fn backing_path(&self) -> &Path {
        self.region.path()
    }

    fn write_section(&mut self, section: &[u8]) -> CoreResult<()> {
        let offset = layout::CONTENT_OFFSET + self.pending_len;
        self.region.as_mut_slice()[offset..offset + section.len()].copy_from_slice(section);
        self.pending_len += section.len();
        layout::write_content_len(self.region.as_mut_slice(), self.pending_len as u32)?;

        if self.pending_len > self.config.flush_threshold {
            let target = self.target_path.clone().ok_or(CoreError::NoTargetPath)?;
            self.flush_to(&target)?;
        }
        Ok(())
    }

    /// Appends exactly `pending_len` bytes of content to `path`, then
    /// clears the pending marker and the consumed byte range.
    ///
    /// On failure the header is left untouched: the bytes stay marked as
    /// buffered and the next flush retries with the same range.
    fn flush_to(&mut self, path: &str) -> CoreResult<()> {
        if self.pending_len == 0 {
            return Ok(());
        }
        debug!(path = %path, pending = self.pending_len, "flushing buffer to target file");

        let mut file = OpenOptions::new().append(true).create(true).open(path)?;
        let start = layout::CONTENT_OFFSET;
        file.write_all(&self.region.as_slice()[start..start + self.pending_len])?;
        file.flush()?;
        drop(file);

        layout::zero_content(self.region.as_mut_slice(), self.pending_len);
        self.pending_len = 0;
        Ok(())
    }
}

fn target_path_str(path: &Path) -> CoreResult<&str> {
    let s = path
        .to_str()
        .ok_or_else(|| CoreError::invalid_path("path is not valid UTF-8"))?;
    if s.is_empty() {
        return Err(CoreError::invalid_path("path is empty"));
    }
    if s.len() > layout::PATH_CAPACITY {
        return Err(CoreError::invalid_path(format!(
            "path is {} bytes, field holds {}",
            s.len(),
            layout::PATH_CAPACITY
        )));
    }
    Ok(s)
}
