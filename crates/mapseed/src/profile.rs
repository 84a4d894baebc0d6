//! Target layout profile.
//!
//! Every hard-coded signature byte and structure offset the derivation relies
//! on lives here. Supporting a different target build means adding a new
//! profile constant, not touching the pipeline.
//!
//! ```text
//! module base ──scan──► 48 03 C7 49 8B 8C C6 [disp32]
//!                                             │
//!                      base + disp32 ◄────────┘
//!                          │
//!                      unit table (128 × ptr)
//!                          │ slot → unit, tag u32 @ +0x00 == 0
//!                          ▼
//!                      unit +0x20 ──deref──► act
//!                      act  +0x78 ──deref──► act-misc
//!                      act-misc +0x840 init hash (u32)
//!                      act-misc +0x868 end hash  (u32)
//! ```

use serde::Serialize;

use crate::error::Result;
use crate::memory::{ChainStep, PointerWidth};
use crate::scan::BytePattern;
use crate::seed::SeedHasher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetProfile {
    pub name: &'static str,
    pub version: &'static str,

    /// Code signature preceding the unit table displacement (`None` = wildcard).
    pub signature: &'static [Option<u8>],
    /// Distance from the signature match to the little-endian u32 table offset.
    pub offset_field: u64,
    /// Bytes of the primary image to scan, starting at the module base.
    pub scan_size: u64,
    /// Read window used while scanning.
    pub scan_window: usize,

    pub unit_table_capacity: usize,
    pub pointer_width: PointerWidth,
    pub type_tag_offset: u64,
    pub player_type_tag: u32,

    /// unit → act
    pub act_offset: u64,
    /// act → act-misc
    pub act_misc_offset: u64,
    pub init_hash_offset: u64,
    pub end_hash_offset: u64,

    pub hash_multiplier: u32,
    pub hash_increment: u32,
    pub hash_block: u32,
}

impl TargetProfile {
    pub const D2R: TargetProfile = TargetProfile {
        name: "d2r",
        version: "1",
        signature: &[
            Some(0x48),
            Some(0x03),
            Some(0xC7),
            Some(0x49),
            Some(0x8B),
            Some(0x8C),
            Some(0xC6),
        ],
        offset_field: 7,
        scan_size: 0x100_0000,
        scan_window: 4096,
        unit_table_capacity: 128,
        pointer_width: PointerWidth::Bits64,
        type_tag_offset: 0x0,
        player_type_tag: 0,
        act_offset: 0x20,
        act_misc_offset: 0x78,
        init_hash_offset: 0x840,
        end_hash_offset: 0x868,
        hash_multiplier: 0x6AC6_90C5,
        hash_increment: 666,
        hash_block: SeedHasher::DEFAULT_BLOCK,
    };

    pub fn pattern(&self) -> Result<BytePattern> {
        BytePattern::from_signature(self.signature)
    }

    pub fn hasher(&self) -> Result<SeedHasher> {
        SeedHasher::new(self.hash_multiplier, self.hash_increment, self.hash_block)
    }

    /// Chain from a unit to its act structure.
    pub fn act_chain(&self) -> [ChainStep; 1] {
        [ChainStep::deref(self.act_offset)]
    }

    /// Chain from an act structure to act-misc.
    pub fn act_misc_chain(&self) -> [ChainStep; 1] {
        [ChainStep::deref(self.act_misc_offset)]
    }
}

impl Default for TargetProfile {
    fn default() -> Self {
        Self::D2R
    }
}
