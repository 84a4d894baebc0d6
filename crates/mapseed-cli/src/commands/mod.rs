//! CLI command implementations.

pub mod hex_utils;
pub mod invert;
pub mod profile;
pub mod seed;
