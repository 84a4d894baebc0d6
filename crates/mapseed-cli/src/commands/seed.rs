//! Seed command implementation.

use std::path::Path;

use anyhow::Result;
use mapseed::{DerivationReport, MemoryReader, ProcessHandle, TargetConfig, TargetProfile, derive};
use tracing::info;

/// Open the game, derive the seed and print it.
pub fn run(config: &TargetConfig, json: bool, output: Option<&Path>) -> Result<()> {
    let process = match config.pid {
        Some(pid) => ProcessHandle::open(pid, config.module_name())?,
        None => ProcessHandle::find_and_open(&config.process_name, config.module_name())?,
    };
    info!(
        "Opened process (PID: {}, base: {:#x}, size: {:#x})",
        process.pid, process.base_address, process.module_size
    );

    let reader = MemoryReader::new(&process);
    let profile = config.apply(&TargetProfile::D2R);
    let derivation = derive(&reader, &profile)?;
    let report = DerivationReport::from_derivation(&derivation);

    if let Some(path) = output {
        report.save(path)?;
        info!("Report saved to {}", path.display());
    }

    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", derivation.seed);
    }
    Ok(())
}
