use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, ErrorKind, Result};
use crate::pipeline::Derivation;

/// JSON-friendly view of a [`Derivation`] with addresses as hex strings.
#[derive(Debug, Clone, Serialize)]
pub struct DerivationReport {
    pub seed: u32,
    pub profile: String,
    pub derived_at: String,
    pub addresses: ReportAddresses,
    pub hashes: ReportHashes,
    pub units_found: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportAddresses {
    pub module_base: String,
    pub signature: String,
    pub unit_table: String,
    pub player_unit: String,
    pub act: String,
    pub act_misc: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportHashes {
    pub init_hash: String,
    pub end_hash: String,
    pub check: String,
}

fn hex64(value: u64) -> String {
    format!("0x{:X}", value)
}

fn hex32(value: u32) -> String {
    format!("0x{:08X}", value)
}

impl DerivationReport {
    pub fn from_derivation(d: &Derivation) -> Self {
        Self {
            seed: d.seed.0,
            profile: format!("{} v{}", d.profile, d.profile_version),
            derived_at: d.derived_at.to_rfc3339(),
            addresses: ReportAddresses {
                module_base: hex64(d.module_base),
                signature: hex64(d.signature_address),
                unit_table: hex64(d.unit_table),
                player_unit: hex64(d.player_unit),
                act: hex64(d.act),
                act_misc: hex64(d.act_misc),
            },
            hashes: ReportHashes {
                init_hash: hex32(d.init_hash),
                end_hash: hex32(d.end_hash),
                check: hex32(d.check),
            },
            units_found: d.units_found,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save report to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Machine-readable failure, emitted instead of a report when derivation fails.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub error: String,
    pub kind: ErrorKind,
}

impl From<&Error> for FailureReport {
    fn from(err: &Error) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}
