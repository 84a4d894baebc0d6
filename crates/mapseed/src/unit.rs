//! Unit table walking and player selection.

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::memory::{ChainStep, PointerWidth, ReadMemory, follow_chain};

pub const UNIT_TABLE_CAPACITY: usize = 128;

/// A live unit pointer and the type tag read from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemoteUnit {
    pub address: u64,
    pub type_tag: u32,
}

/// The accepted player unit and its resolved act pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerUnit {
    pub address: u64,
    pub act: u64,
}

/// Read every slot of a unit table, in table order.
///
/// Slots whose pointer cannot be read, is null, or whose tag cannot be read
/// are left out. Never fails.
pub fn resolve<R: ReadMemory + ?Sized>(
    reader: &R,
    table_base: u64,
    capacity: usize,
    width: PointerWidth,
    tag_offset: u64,
) -> Vec<RemoteUnit> {
    let mut units = Vec::new();

    for slot in 0..capacity {
        let slot_addr = table_base.wrapping_add((slot * width.bytes()) as u64);
        let address = match reader.read_ptr(slot_addr, width) {
            Ok(0) => continue,
            Ok(ptr) => ptr,
            Err(e) => {
                trace!("  slot {}: {}", slot, e);
                continue;
            }
        };

        match reader.read_u32(address.wrapping_add(tag_offset)) {
            Ok(type_tag) => units.push(RemoteUnit { address, type_tag }),
            Err(e) => trace!("  slot {} -> {:#x}: tag unreadable: {}", slot, address, e),
        }
    }

    debug!(
        "  Unit table at {:#x}: {} of {} slots populated",
        table_base,
        units.len(),
        capacity
    );
    units
}

/// Pick the first unit tagged `player_tag` whose act chain resolves to a
/// non-null pointer.
pub fn select_player<R: ReadMemory + ?Sized>(
    reader: &R,
    units: &[RemoteUnit],
    player_tag: u32,
    act_chain: &[ChainStep],
    width: PointerWidth,
) -> Result<PlayerUnit> {
    let mut candidates = units.iter().filter(|u| u.type_tag == player_tag).peekable();
    if candidates.peek().is_none() {
        return Err(Error::NoPlayerUnit);
    }

    for unit in candidates {
        match follow_chain(reader, unit.address, act_chain, width) {
            Ok(0) => trace!("  Player candidate {:#x}: null act", unit.address),
            Ok(act) => {
                return Ok(PlayerUnit {
                    address: unit.address,
                    act,
                });
            }
            Err(e) => trace!("  Player candidate {:#x}: {}", unit.address, e),
        }
    }

    Err(Error::NoValidActPointer)
}
