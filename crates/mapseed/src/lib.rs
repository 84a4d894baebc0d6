//! # mapseed
//!
//! Recovers the map seed of a running Diablo II: Resurrected process from its
//! memory, read-only.
//!
//! This crate provides:
//! - Byte signature scanning over remote memory (`scan`)
//! - Pointer chains and the `ReadMemory` abstraction (`memory`)
//! - Unit table walking and player selection (`unit`)
//! - The seed hash and its inverse (`seed`)
//! - The end-to-end derivation (`pipeline`) driven by a fixed layout profile
//! - Windows process discovery and handles (`memory::ProcessHandle`)

pub mod config;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod scan;
pub mod seed;
pub mod unit;

pub use config::{TargetConfig, TargetConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use memory::{
    ChainStep, DEFAULT_PROCESS_NAME, MemoryReader, ModuleInfo, PointerWidth, ProcessHandle,
    ReadMemory, find_module, find_process_id, follow_chain,
};
pub use pipeline::{Derivation, derive, derive_seed};
pub use profile::TargetProfile;
pub use report::{DerivationReport, FailureReport};
pub use scan::{BytePattern, MemoryRange, scan};
pub use seed::{Seed, SeedHasher, hash, invert_hash};
pub use unit::{PlayerUnit, RemoteUnit, UNIT_TABLE_CAPACITY};
