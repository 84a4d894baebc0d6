//! End-to-end map seed derivation.
//!
//! Stages run strictly in order and the first failure ends the attempt:
//!
//! 1. Scan the primary image for the profile signature and decode the unit
//!    table offset that follows it.
//! 2. Walk the unit table, pick the player unit, chase unit → act → act-misc.
//! 3. Read the init and end seed hashes from act-misc.
//! 4. Invert the end hash.
//! 5. Reject the result if `init_hash ^ seed == 0`.
//!
//! Reads of live memory are never assumed consistent with each other, and
//! nothing is retried here. Retry policy belongs to the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::memory::{ReadMemory, follow_chain};
use crate::profile::TargetProfile;
use crate::scan::{MemoryRange, scan};
use crate::seed::Seed;
use crate::unit;

/// Everything observed while deriving a seed.
#[derive(Debug, Clone, Serialize)]
pub struct Derivation {
    pub profile: &'static str,
    pub profile_version: &'static str,
    pub module_base: u64,
    pub signature_address: u64,
    pub unit_table: u64,
    pub units_found: usize,
    pub player_unit: u64,
    pub act: u64,
    pub act_misc: u64,
    pub init_hash: u32,
    pub end_hash: u32,
    pub seed: Seed,
    /// `init_hash ^ seed`, always non-zero for a successful derivation.
    pub check: u32,
    pub derived_at: DateTime<Utc>,
}

/// Derive the map seed and return only the seed.
pub fn derive_seed<R: ReadMemory + ?Sized>(reader: &R, profile: &TargetProfile) -> Result<Seed> {
    derive(reader, profile).map(|d| d.seed)
}

/// Derive the map seed, keeping the intermediate addresses and hashes.
pub fn derive<R: ReadMemory + ?Sized>(reader: &R, profile: &TargetProfile) -> Result<Derivation> {
    let pattern = profile.pattern()?;
    let hasher = profile.hasher()?;
    let width = profile.pointer_width;
    let base = reader.base_address();

    debug!("Stage 1: locating unit table...");
    let range = MemoryRange::from_base(base, profile.scan_size);
    debug!(
        "  Scanning {:#x}..{:#x} for {}",
        range.start, range.end, pattern
    );
    let signature_address =
        scan(reader, range, &pattern, profile.scan_window).ok_or(Error::SignatureNotFound)?;
    let table_offset = reader.read_u32(signature_address.wrapping_add(profile.offset_field))?;
    let unit_table = base.wrapping_add(u64::from(table_offset));
    debug!(
        "  Signature at {:#x}, table offset {:#x}, unit table at {:#x}",
        signature_address, table_offset, unit_table
    );

    debug!("Stage 2: resolving player unit...");
    let units = unit::resolve(
        reader,
        unit_table,
        profile.unit_table_capacity,
        width,
        profile.type_tag_offset,
    );
    let player = unit::select_player(
        reader,
        &units,
        profile.player_type_tag,
        &profile.act_chain(),
        width,
    )?;
    let act_misc = follow_chain(reader, player.act, &profile.act_misc_chain(), width)?;
    debug!(
        "  Player {:#x}, act {:#x}, act-misc {:#x}",
        player.address, player.act, act_misc
    );

    debug!("Stage 3: reading seed hashes...");
    let init_hash = reader.read_u32(act_misc.wrapping_add(profile.init_hash_offset))?;
    let end_hash = reader.read_u32(act_misc.wrapping_add(profile.end_hash_offset))?;
    debug!("  Init hash {:#010x}, end hash {:#010x}", init_hash, end_hash);

    debug!("Stage 4: inverting end hash...");
    let seed = hasher
        .invert(end_hash)
        .ok_or(Error::HashInversionExhausted(end_hash))?;

    let check = init_hash ^ seed.0;
    if check == 0 {
        warn!(
            "Init hash equals candidate seed {} (check value is zero), rejecting",
            seed
        );
        return Err(Error::ZeroCheckValue);
    }

    info!("Map seed: {}", seed);
    Ok(Derivation {
        profile: profile.name,
        profile_version: profile.version,
        module_base: base,
        signature_address,
        unit_table,
        units_found: units.len(),
        player_unit: player.address,
        act: player.act,
        act_misc,
        init_hash,
        end_hash,
        seed,
        check,
        derived_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MockMemoryBuilder, MockMemoryReader};
    use crate::seed::hash;

    const BASE: u64 = 0x1_4000_0000;
    const SIGNATURE_AT: u64 = BASE + 0x1234;
    const TABLE_OFFSET: u32 = 0x2000;
    const UNIT: u64 = 0x5000_0000;
    const ACT: u64 = 0x6000_0000;
    const ACT_MISC: u64 = 0x7000_0000;

    fn profile() -> TargetProfile {
        TargetProfile {
            scan_size: 0x3000,
            ..TargetProfile::D2R
        }
    }

    fn end_hash_for(seed: u32) -> u32 {
        let p = TargetProfile::D2R;
        hash(seed, p.hash_multiplier, p.hash_increment)
    }

    /// A complete target image with one player unit in slot 5.
    fn target(init_hash: u32, end_hash: u32) -> MockMemoryBuilder {
        MockMemoryBuilder::new()
            .base(BASE)
            .bytes(SIGNATURE_AT, &[0x48, 0x03, 0xC7, 0x49, 0x8B, 0x8C, 0xC6])
            .u32(SIGNATURE_AT + 7, TABLE_OFFSET)
            .u64(BASE + u64::from(TABLE_OFFSET) + 5 * 8, UNIT)
            .zeroed(BASE, 0x3000)
            .u32(UNIT, 0)
            .u64(UNIT + 0x20, ACT)
            .u64(ACT + 0x78, ACT_MISC)
            .u32(ACT_MISC + 0x840, init_hash)
            .u32(ACT_MISC + 0x868, end_hash)
    }

    fn reader(init_hash: u32, seed: u32) -> MockMemoryReader {
        target(init_hash, end_hash_for(seed)).build()
    }

    #[test]
    fn test_derive_full_chain() {
        let reader = reader(0xAAAA_5555, 3_141_592_653);
        let d = derive(&reader, &profile()).unwrap();

        assert_eq!(d.seed, Seed(3_141_592_653));
        assert_eq!(d.module_base, BASE);
        assert_eq!(d.signature_address, SIGNATURE_AT);
        assert_eq!(d.unit_table, BASE + 0x2000);
        assert_eq!(d.units_found, 1);
        assert_eq!(d.player_unit, UNIT);
        assert_eq!(d.act, ACT);
        assert_eq!(d.act_misc, ACT_MISC);
        assert_eq!(d.init_hash, 0xAAAA_5555);
        assert_eq!(d.check, 0xAAAA_5555 ^ 3_141_592_653);
        assert_eq!(d.profile, "d2r");
    }

    #[test]
    fn test_derive_seed_only() {
        let reader = reader(1, 12345);
        assert_eq!(derive_seed(&reader, &profile()).unwrap(), Seed(12345));
    }

    #[test]
    fn test_signature_missing() {
        let reader = MockMemoryBuilder::new()
            .base(BASE)
            .zeroed(BASE, 0x3000)
            .build();
        assert!(matches!(
            derive(&reader, &profile()),
            Err(Error::SignatureNotFound)
        ));
    }

    #[test]
    fn test_signature_outside_scan_size() {
        let reader = reader(1, 2);
        let p = TargetProfile {
            scan_size: 0x1000,
            ..TargetProfile::D2R
        };
        assert!(matches!(derive(&reader, &p), Err(Error::SignatureNotFound)));
    }

    #[test]
    fn test_all_zero_unit_table() {
        let reader = MockMemoryBuilder::new()
            .base(BASE)
            .bytes(SIGNATURE_AT, &[0x48, 0x03, 0xC7, 0x49, 0x8B, 0x8C, 0xC6])
            .u32(SIGNATURE_AT + 7, TABLE_OFFSET)
            .zeroed(BASE, 0x3000)
            .build();
        assert!(matches!(
            derive(&reader, &profile()),
            Err(Error::NoPlayerUnit)
        ));
    }

    #[test]
    fn test_player_without_act() {
        let reader = target(1, end_hash_for(2)).u64(UNIT + 0x20, 0).build();
        assert!(matches!(
            derive(&reader, &profile()),
            Err(Error::NoValidActPointer)
        ));
    }

    #[test]
    fn test_unreadable_act_misc_fields() {
        // act-misc resolves to null; reading the hash fields then fails.
        let reader = target(1, end_hash_for(2)).u64(ACT + 0x78, 0).build();
        assert!(matches!(
            derive(&reader, &profile()),
            Err(Error::ReadFailure {
                address: 0x840,
                length: 4
            })
        ));
    }

    #[test]
    fn test_zero_check_value() {
        let seed = 777_777;
        let reader = reader(seed, seed);
        assert!(matches!(
            derive(&reader, &profile()),
            Err(Error::ZeroCheckValue)
        ));
    }

    #[test]
    fn test_hash_inversion_exhausted() {
        // An even multiplier cannot reach an odd end hash.
        let p = TargetProfile {
            hash_multiplier: 2,
            hash_increment: 0,
            ..profile()
        };
        let reader = target(1, 1).build();
        assert!(matches!(
            derive(&reader, &p),
            Err(Error::HashInversionExhausted(1))
        ));
    }

    #[test]
    fn test_invalid_block_is_reported_before_reading() {
        let p = TargetProfile {
            hash_block: 3,
            ..profile()
        };
        let reader = MockMemoryBuilder::new().build();
        assert!(matches!(derive(&reader, &p), Err(Error::InvalidProfile(_))));
    }
}
