//! Byte signature scanning over remote memory.
//!
//! A [`BytePattern`] is a fixed-length byte sequence where every position is
//! either fixed or a wildcard. [`scan`] walks a [`MemoryRange`] in overlapping
//! windows so that a match is always fully contained in at least one window,
//! and returns the lowest matching address.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::memory::ReadMemory;

/// Half-open address interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryRange {
    pub start: u64,
    pub end: u64,
}

impl MemoryRange {
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Range of `size` bytes starting at `start`, clamped at the top of the
    /// address space.
    pub const fn from_base(start: u64, size: u64) -> Self {
        Self {
            start,
            end: start.saturating_add(size),
        }
    }

    pub const fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytePattern {
    bytes: Vec<u8>,
    mask: Vec<bool>,
}

impl BytePattern {
    /// Pattern where every byte is fixed.
    pub fn exact(bytes: &[u8]) -> Result<Self> {
        Self::from_signature(&bytes.iter().copied().map(Some).collect::<Vec<_>>())
    }

    /// Pattern from a signature where `None` marks a wildcard.
    pub fn from_signature(signature: &[Option<u8>]) -> Result<Self> {
        if signature.is_empty() {
            return Err(Error::InvalidPattern("Signature pattern is empty".to_string()));
        }
        Ok(Self {
            bytes: signature.iter().map(|b| b.unwrap_or(0)).collect(),
            mask: signature.iter().map(Option::is_some).collect(),
        })
    }

    /// Pattern from bytes plus a mask string (`x` = fixed, `?` = wildcard).
    pub fn with_mask(bytes: &[u8], mask: &str) -> Result<Self> {
        if bytes.len() != mask.len() {
            return Err(Error::InvalidPattern(format!(
                "Mask length {} does not match pattern length {}",
                mask.len(),
                bytes.len()
            )));
        }
        let signature = bytes
            .iter()
            .zip(mask.chars())
            .map(|(&b, m)| match m {
                'x' | 'X' => Ok(Some(b)),
                '?' => Ok(None),
                other => Err(Error::InvalidPattern(format!(
                    "Invalid mask character '{}'",
                    other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_signature(&signature)
    }

    /// Parse the text form `"48 03 ?? 49"` (`??` or `?` = wildcard).
    pub fn parse(pattern: &str) -> Result<Self> {
        let signature = pattern
            .split_whitespace()
            .map(|token| {
                if token == "??" || token == "?" {
                    return Ok(None);
                }
                u8::from_str_radix(token, 16).map(Some).map_err(|e| {
                    Error::InvalidPattern(format!("Invalid signature token '{}': {}", token, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_signature(&signature)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn matches_at(&self, window: &[u8]) -> bool {
        self.bytes
            .iter()
            .zip(&self.mask)
            .zip(window)
            .all(|((&p, &fixed), &b)| !fixed || p == b)
    }

    /// Longest run of fixed bytes, used as a memmem anchor.
    fn anchor(&self) -> (usize, &[u8]) {
        let mut best = (0, 0);
        let mut run_start = 0;
        for (i, &fixed) in self.mask.iter().enumerate() {
            if !fixed {
                run_start = i + 1;
                continue;
            }
            let run_len = i + 1 - run_start;
            if run_len > best.1 {
                best = (run_start, run_len);
            }
        }
        (best.0, &self.bytes[best.0..best.0 + best.1])
    }

    /// Offset of the first match within `buffer`.
    pub fn find_in(&self, buffer: &[u8]) -> Option<usize> {
        if buffer.len() < self.len() {
            return None;
        }
        let last = buffer.len() - self.len();

        let (anchor_offset, anchor) = self.anchor();
        if anchor.is_empty() {
            // All wildcards: the first position always matches.
            return Some(0);
        }

        // Advance one byte past each hit so overlapping anchor occurrences are seen.
        let finder = memchr::memmem::Finder::new(anchor);
        let mut from = 0;
        while let Some(hit) = finder.find(&buffer[from..]) {
            let anchor_pos = from + hit;
            if let Some(start) = anchor_pos.checked_sub(anchor_offset) {
                if start > last {
                    return None;
                }
                if self.matches_at(&buffer[start..start + self.len()]) {
                    return Some(start);
                }
            }
            from = anchor_pos + 1;
        }

        None
    }
}

impl fmt::Display for BytePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (b, fixed)) in self.bytes.iter().zip(&self.mask).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if *fixed {
                write!(f, "{:02X}", b)?;
            } else {
                f.write_str("??")?;
            }
        }
        Ok(())
    }
}

/// Lowest address in `range` where `pattern` matches.
///
/// Reads `window` bytes at a time with a stride of
/// `window - pattern.len() + 1`. Windows that cannot be read in full are
/// skipped.
pub fn scan<R: ReadMemory + ?Sized>(
    reader: &R,
    range: MemoryRange,
    pattern: &BytePattern,
    window: usize,
) -> Option<u64> {
    let len = pattern.len() as u64;
    let window = window.max(pattern.len()) as u64;
    let stride = window - len + 1;

    let mut address = range.start;
    while range.end.saturating_sub(address) >= len {
        let size = window.min(range.end - address);
        match reader.read_exact(address, size as usize) {
            Ok(buffer) => {
                if let Some(pos) = pattern.find_in(&buffer) {
                    return Some(address + pos as u64);
                }
            }
            Err(e) => trace!("Skipping window at {:#x}: {}", address, e),
        }
        address = match address.checked_add(stride) {
            Some(next) => next,
            None => break,
        };
    }

    None
}
