//! Offset-and-dereference pointer chains over a [`ReadMemory`].

use serde::Serialize;
use tracing::trace;

use super::{PointerWidth, ReadMemory};
use crate::error::Result;

/// One hop in a pointer chain: add `offset`, then optionally read a pointer
/// at the resulting address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainStep {
    pub offset: u64,
    pub deref: bool,
}

impl ChainStep {
    pub const fn deref(offset: u64) -> Self {
        Self {
            offset,
            deref: true,
        }
    }

    pub const fn offset(offset: u64) -> Self {
        Self {
            offset,
            deref: false,
        }
    }
}

/// Walk `steps` starting at `start` and return the final address.
///
/// Any failed read aborts the walk. A null pointer is returned as-is; deciding
/// whether zero is acceptable is left to the caller.
pub fn follow_chain<R: ReadMemory + ?Sized>(
    reader: &R,
    start: u64,
    steps: &[ChainStep],
    width: PointerWidth,
) -> Result<u64> {
    let mut address = start;
    for step in steps {
        let field = address.wrapping_add(step.offset);
        address = if step.deref {
            reader.read_ptr(field, width)?
        } else {
            field
        };
        trace!("  chain +{:#x} -> {:#x}", step.offset, address);
    }
    Ok(address)
}
