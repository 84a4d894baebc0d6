//! Map seed hashing and its brute-force inverse.
//!
//! The target scrambles the seed with `hash(x) = (x * M + C) mod 2^32`. For a
//! block size `D = 2^k`, `hash(x) mod D` only depends on `x mod D`, so the
//! search first finds an `x < D` whose hash agrees with the target on the low
//! `k` bits, then steps by `D` through the rest of the space. That costs at
//! most `D + 2^32 / D` hash evaluations instead of `2^32`.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// A recovered map seed. Prints as a plain decimal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Seed(pub u32);

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const fn hash(x: u32, multiplier: u32, increment: u32) -> u32 {
    x.wrapping_mul(multiplier).wrapping_add(increment)
}

/// Recover a preimage of `target` under [`hash`].
///
/// `block` must be a non-zero power of two; any other block yields `None`.
/// Also returns `None` when no value in the 32-bit space hashes to `target`.
pub fn invert_hash(target: u32, multiplier: u32, increment: u32, block: u32) -> Option<u32> {
    if !block.is_power_of_two() {
        return None;
    }
    let low_mask = block - 1;

    let anchor = (0..block).find_map(|x| {
        let h = hash(x, multiplier, increment);
        if h == target {
            Some(Ok(x))
        } else if h & low_mask == target & low_mask {
            Some(Err(x))
        } else {
            None
        }
    })?;

    let anchor = match anchor {
        Ok(exact) => return Some(exact),
        Err(anchor) => anchor,
    };

    (u64::from(anchor) + u64::from(block)..=u64::from(u32::MAX))
        .step_by(block as usize)
        .map(|x| x as u32)
        .find(|&x| hash(x, multiplier, increment) == target)
}

/// Hash constants plus search block size, validated once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedHasher {
    multiplier: u32,
    increment: u32,
    block: u32,
}

impl SeedHasher {
    pub const DEFAULT_BLOCK: u32 = 1 << 16;

    pub fn new(multiplier: u32, increment: u32, block: u32) -> Result<Self> {
        if !block.is_power_of_two() {
            return Err(Error::InvalidProfile(format!(
                "Hash block size {:#x} is not a power of two",
                block
            )));
        }
        Ok(Self {
            multiplier,
            increment,
            block,
        })
    }

    pub fn hash(&self, seed: u32) -> u32 {
        hash(seed, self.multiplier, self.increment)
    }

    pub fn invert(&self, target: u32) -> Option<Seed> {
        invert_hash(target, self.multiplier, self.increment, self.block).map(Seed)
    }
}
