//! The compression module drives whole runs of hctree, in both directions.
//!
//! Compression happens in the following steps:
//! - Frequency count: how often each of the 256 byte values occurs in the input.
//! - Tree build: Huffman's algorithm over the bytes that occur.
//! - Count: the number of input bytes, as a 32 bit big-endian word.
//! - Header: the tree shape, bit packed right after the count.
//! - Payload: the code of every input byte in order, with no padding between codes.
//! - Flush: zero bits up to the next byte boundary.
//!
//! An empty input is written as the count alone.
//!
//! Decompression reads the count, rebuilds the tree from the header and decodes exactly
//! that many bytes. Padding and anything after it are never read.
//!

pub mod compress;
pub mod decompress;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use log::error;
use tempfile::NamedTempFile;

/// Run fill against a scratch file in the same directory as path, then move the scratch
/// file over path. If fill fails, the scratch file is removed and path is left as it was.
pub(crate) fn replace_on_success<T, F>(path: &str, fill: F) -> io::Result<T>
where
    F: FnOnce(BufWriter<&mut File>) -> io::Result<T>,
{
    let target = Path::new(path);
    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut scratch = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Can't create a scratch file in {}: {}", dir.display(), e);
        e
    })?;

    let result = fill(BufWriter::new(scratch.as_file_mut()))?;

    scratch.persist(target).map_err(|e| {
        error!("Can't create {}: {}", path, e.error);
        e.error
    })?;
    Ok(result)
}
