//! Invert command implementation.

use anyhow::{Result, bail};
use mapseed::TargetProfile;

/// Recover the seed behind `end_hash` using the built-in hash constants.
pub fn run(end_hash: u32, json: bool) -> Result<()> {
    let hasher = TargetProfile::D2R.hasher()?;
    let Some(seed) = hasher.invert(end_hash) else {
        bail!(mapseed::Error::HashInversionExhausted(end_hash));
    };

    if json {
        let value = serde_json::json!({
            "end_hash": format!("0x{:08X}", end_hash),
            "seed": seed,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", seed);
    }
    Ok(())
}
