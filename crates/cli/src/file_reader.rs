// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Source file reading for import scanning and static instrumentation.
//!
// Allow unsafe_code for memory-mapped I/O (required by memmap2).
// Safety justification:
// 1. File handle is valid (just opened)
// 2. The mapping is never mutated
// 3. A source edited mid-run only skews a scan, it cannot corrupt results
#![allow(unsafe_code)]
//!
//! Small sources are read into a buffer; large ones (bundles, generated
//! code) are memory-mapped so scanning does not copy them.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use memmap2::Mmap;

/// Files at or above this size are memory-mapped.
pub const MMAP_THRESHOLD: u64 = 64 * 1024;

/// Content of a source file, either owned or memory-mapped.
pub enum FileContent {
    Owned(String),
    Mapped(Mmap),
}

impl FileContent {
    /// Read file using the strategy for its size.
    pub fn read(path: &Path) -> io::Result<Self> {
        let size = fs::metadata(path)?.len();

        if size < MMAP_THRESHOLD {
            return Ok(FileContent::Owned(fs::read_to_string(path)?));
        }

        let file = File::open(path)?;
        // SAFETY: the handle was just opened and the mapping is read-only.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(FileContent::Mapped(mmap))
    }

    /// Content as text, or None when a mapped file is not valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FileContent::Owned(s) => Some(s),
            FileContent::Mapped(m) => std::str::from_utf8(m).ok(),
        }
    }
}

/// Read `path` and hand its text to `f`.
///
/// Non-UTF-8 content is reported as `InvalidData`.
pub fn with_text<T>(path: &Path, f: impl FnOnce(&str) -> T) -> io::Result<T> {
    let content = FileContent::read(path)?;
    match content.as_str() {
        Some(text) => Ok(f(text)),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} is not valid UTF-8", path.display()),
        )),
    }
}

#[cfg(test)]
#[path = "file_reader_tests.rs"]
mod tests;
