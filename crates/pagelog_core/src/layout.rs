//! On-disk header layout of the mapped region.
//!
//! The region multiplexes three fields ahead of the buffered content:
//!
//! | field | offset | size |
//! |---|---|---|
//! | `path_len` | 0 | 2 bytes, u16 LE |
//! | `path_bytes` | 2 | 1024 bytes |
//! | `content_len` | 1026 | 4 bytes, u32 LE |
//! | `content_bytes` | 1030 | rest of the region |
//!
//! The functions here are pure accessors over a raw region slice. The
//! manager uses them internally, and external tooling can apply them to
//! an abandoned backing file after a crash to see what was left pending.
//!
//! The original layout trusts its length fields verbatim; the readers
//! here additionally reject implausible values (a length larger than the
//! field it describes) without changing the byte layout.

use crate::endian;
use crate::error::{CoreError, CoreResult};

/// Fixed length of the mapped region: 600 KiB.
pub const REGION_LEN: usize = 600 * 1024;

/// Offset of the 2-byte target path length.
pub const PATH_LEN_OFFSET: usize = 0;
/// Size of the target path length field.
pub const PATH_LEN_SIZE: usize = 2;
/// Offset of the target path bytes.
pub const PATH_OFFSET: usize = PATH_LEN_OFFSET + PATH_LEN_SIZE;
/// Capacity of the target path field.
pub const PATH_CAPACITY: usize = 1024;
/// Offset of the 4-byte pending content length.
pub const CONTENT_LEN_OFFSET: usize = PATH_OFFSET + PATH_CAPACITY;
/// Size of the pending content length field.
pub const CONTENT_LEN_SIZE: usize = 4;
/// Offset of the first pending content byte.
pub const CONTENT_OFFSET: usize = CONTENT_LEN_OFFSET + CONTENT_LEN_SIZE;
/// Physical capacity of the content area.
pub const CONTENT_CAPACITY: usize = REGION_LEN - CONTENT_OFFSET;

fn check_region(region: &[u8]) -> CoreResult<()> {
    if region.len() < CONTENT_OFFSET {
        return Err(CoreError::header_corrupted(format!(
            "region too short for header: {} bytes",
            region.len()
        )));
    }
    Ok(())
}

/// Reads the pending content length from a raw region.
///
/// # Errors
///
/// Returns [`CoreError::HeaderCorrupted`] if the region is too short to
/// hold a header or the stored length exceeds [`CONTENT_CAPACITY`].
pub fn read_content_len(region: &[u8]) -> CoreResult<u32> {
    check_region(region)?;
    let mut bytes = [0u8; CONTENT_LEN_SIZE];
    bytes.copy_from_slice(&region[CONTENT_LEN_OFFSET..CONTENT_OFFSET]);
    let len = endian::decode_u32(bytes);
    if len as usize > CONTENT_CAPACITY.min(region.len() - CONTENT_OFFSET) {
        return Err(CoreError::header_corrupted(format!(
            "content length {len} exceeds content capacity"
        )));
    }
    Ok(len)
}

/// Writes the pending content length into a raw region.
///
/// # Errors
///
/// Returns [`CoreError::HeaderCorrupted`] if the region is too short to
/// hold a header.
pub fn write_content_len(region: &mut [u8], len: u32) -> CoreResult<()> {
    check_region(region)?;
    region[CONTENT_LEN_OFFSET..CONTENT_OFFSET].copy_from_slice(&endian::encode_u32(len));
    Ok(())
}

/// Reads the stored target path from a raw region.
///
/// Returns `None` when no path has been stored (`path_len == 0`).
///
/// # Errors
///
/// Returns [`CoreError::HeaderCorrupted`] if the region is too short, the
/// stored length exceeds [`PATH_CAPACITY`], or the bytes are not UTF-8.
pub fn read_target_path(region: &[u8]) -> CoreResult<Option<String>> {
    check_region(region)?;
    let len = endian::decode_u16([region[PATH_LEN_OFFSET], region[PATH_LEN_OFFSET + 1]]) as usize;
    if len == 0 {
        return Ok(None);
    }
    if len > PATH_CAPACITY {
        return Err(CoreError::header_corrupted(format!(
            "path length {len} exceeds path capacity"
        )));
    }
    let bytes = &region[PATH_OFFSET..PATH_OFFSET + len];
    let path = std::str::from_utf8(bytes)
        .map_err(|_| CoreError::header_corrupted("path bytes are not valid UTF-8"))?;
    Ok(Some(path.to_owned()))
}

/// Writes a target path into a raw region.
///
/// Stores the path bytes followed by a NUL terminator when the field has
/// room for one; the stored length is authoritative on read, so paths of
/// exactly [`PATH_CAPACITY`] bytes still round-trip.
///
/// # Errors
///
/// Returns [`CoreError::InvalidPath`] if the path is empty or longer than
/// [`PATH_CAPACITY`] bytes, or [`CoreError::HeaderCorrupted`] if the
/// region is too short.
pub fn write_target_path(region: &mut [u8], path: &str) -> CoreResult<()> {
    check_region(region)?;
    let bytes = path.as_bytes();
    if bytes.is_empty() {
        return Err(CoreError::invalid_path("path is empty"));
    }
    if bytes.len() > PATH_CAPACITY {
        return Err(CoreError::invalid_path(format!(
            "path is {} bytes, field holds {PATH_CAPACITY}",
            bytes.len()
        )));
    }
    let len = bytes.len() as u16;
    region[PATH_LEN_OFFSET..PATH_OFFSET].copy_from_slice(&endian::encode_u16(len));
    region[PATH_OFFSET..PATH_OFFSET + bytes.len()].copy_from_slice(bytes);
    if bytes.len() < PATH_CAPACITY {
        region[PATH_OFFSET + bytes.len()] = 0;
    }
    Ok(())
}

/// Zeroes the content length field and the first `consumed` content bytes.
///
/// Clearing the consumed byte range is not required for correctness (the
/// length marker alone decides what is live) but keeps reads of stale
/// regions deterministic.
pub fn zero_content(region: &mut [u8], consumed: usize) {
    let end = content_end(region, consumed);
    region[CONTENT_LEN_OFFSET..end].fill(0);
}

/// Zeroes the full header plus the first `consumed` content bytes.
pub fn zero_header(region: &mut [u8], consumed: usize) {
    let end = content_end(region, consumed);
    region[..end].fill(0);
}

fn content_end(region: &[u8], consumed: usize) -> usize {
    CONTENT_OFFSET + consumed.min(region.len().saturating_sub(CONTENT_OFFSET))
}
