//! Fixed-length memory-mapped region over a backing file.

use crate::error::{StorageError, StorageResult};
use memmap2::{MmapMut, MmapOptions};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// A fixed-length read/write memory mapping shared with a backing file.
///
/// The region is created by [`MappedRegion::open`], which ensures the
/// backing file exists and is at least the requested length before
/// mapping it. Bytes written through [`as_mut_slice`](Self::as_mut_slice)
/// reach the OS page cache immediately and are written back to the file
/// by the kernel even if the process crashes, which is the property the
/// rest of pagelog is built on.
///
/// # Durability
///
/// - [`sync_async`](Self::sync_async) schedules writeback without blocking
/// - [`sync`](Self::sync) blocks until the region is on disk
///
/// # Concurrency
///
/// A region assumes a single writer. Mapping the same backing file from
/// two processes at once corrupts its contents; callers must ensure
/// exclusivity.
#[derive(Debug)]
pub struct MappedRegion {
    path: PathBuf,
    map: MmapMut,
    len: usize,
}

impl MappedRegion {
    /// Opens or creates a mapped region of exactly `len` bytes at `path`.
    ///
    /// If the backing file is missing or shorter than `len`, it is
    /// zero-extended to exactly `len` bytes. A file that is already
    /// `len` bytes or longer is never truncated. The resulting size is
    /// re-verified before mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `path` is empty
    /// - The file cannot be opened, created, or extended
    /// - The file is still undersized after extension
    /// - The map operation itself fails
    pub fn open(path: &Path, len: usize) -> StorageResult<Self> {
        if path.as_os_str().is_empty() {
            return Err(StorageError::EmptyPath);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let size = file.metadata()?.len();
        if size < len as u64 {
            file.set_len(len as u64)?;
        }

        // The extension must have taken effect before we map.
        let size = file.metadata()?.len();
        if size < len as u64 {
            return Err(StorageError::SizeMismatch {
                expected: len as u64,
                actual: size,
            });
        }

        // SAFETY: the file is held open for the lifetime of the mapping
        // and the mapped range was verified to lie within it. The single
        // writer precondition (see type docs) rules out concurrent
        // mutation of the underlying file.
        #[allow(unsafe_code)]
        let map = unsafe { MmapOptions::new().len(len).map_mut(&file)? };

        Ok(Self {
            path: path.to_path_buf(),
            map,
            len,
        })
    }

    /// Returns the fixed length of the region in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the region has zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the full region as an immutable byte slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.map
    }

    /// Returns the full region as a mutable byte slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.map
    }

    /// Requests asynchronous writeback of the region to the backing file.
    ///
    /// Returns as soon as the request is queued; a durability hint, not
    /// a guarantee.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying msync request fails.
    pub fn sync_async(&self) -> StorageResult<()> {
        self.map.flush_async()?;
        Ok(())
    }

    /// Flushes the region to the backing file and waits for completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying msync fails.
    pub fn sync(&self) -> StorageResult<()> {
        self.map.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const LEN: usize = 8 * 1024;

    #[test]
    fn open_creates_zero_filled_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");

        let region = MappedRegion::open(&path, LEN).unwrap();
        assert_eq!(region.len(), LEN);
        assert!(region.as_slice().iter().all(|&b| b == 0));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), LEN as u64);
    }

    #[test]
    fn open_empty_path_fails() {
        let result = MappedRegion::open(Path::new(""), LEN);
        assert!(matches!(result, Err(StorageError::EmptyPath)));
    }

    #[test]
    fn open_extends_undersized_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");
        std::fs::write(&path, b"abc").unwrap();

        let region = MappedRegion::open(&path, LEN).unwrap();
        assert_eq!(region.len(), LEN);
        // Existing content is preserved, the rest is zero.
        assert_eq!(&region.as_slice()[..3], b"abc");
        assert!(region.as_slice()[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn open_never_truncates_larger_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");
        std::fs::write(&path, vec![7u8; LEN + 100]).unwrap();

        let region = MappedRegion::open(&path, LEN).unwrap();
        assert_eq!(region.len(), LEN);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), (LEN + 100) as u64);
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");

        {
            let mut region = MappedRegion::open(&path, LEN).unwrap();
            region.as_mut_slice()[..5].copy_from_slice(b"hello");
            region.sync().unwrap();
        }

        let region = MappedRegion::open(&path, LEN).unwrap();
        assert_eq!(&region.as_slice()[..5], b"hello");
    }

    #[test]
    fn writes_visible_without_explicit_sync() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");

        {
            let mut region = MappedRegion::open(&path, LEN).unwrap();
            region.as_mut_slice()[..7].copy_from_slice(b"crashed");
            // Dropped without sync: the page cache still holds the bytes.
        }

        let region = MappedRegion::open(&path, LEN).unwrap();
        assert_eq!(&region.as_slice()[..7], b"crashed");
    }

    #[test]
    fn sync_async_succeeds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");

        let mut region = MappedRegion::open(&path, LEN).unwrap();
        region.as_mut_slice()[0] = 1;
        assert!(region.sync_async().is_ok());
    }

    #[test]
    fn region_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("region.bin");

        let region = MappedRegion::open(&path, LEN).unwrap();
        assert_eq!(region.path(), path);
    }
}
