//! Profile command implementation.

use anyhow::Result;
use mapseed::TargetProfile;

/// Print the built-in profile as JSON.
pub fn run() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&TargetProfile::D2R)?);
    Ok(())
}
