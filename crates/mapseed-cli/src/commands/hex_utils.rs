//! Number parsing for command-line arguments.

use anyhow::{Context, Result};

/// Parse a hex address string (with or without 0x prefix).
pub fn parse_hex_address(s: &str) -> Result<u64> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(s, 16).map_err(|e| anyhow::anyhow!("Invalid hex address: {}", e))
}

/// Parse a 32-bit value given in decimal, or in hex with a 0x prefix.
pub fn parse_u32(s: &str) -> Result<u32> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => {
            u32::from_str_radix(hex, 16).with_context(|| format!("Invalid hex value: {}", s))
        }
        None => s
            .parse::<u32>()
            .with_context(|| format!("Invalid decimal value: {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_address_with_prefix() {
        assert_eq!(parse_hex_address("0x1000000").unwrap(), 0x100_0000);
        assert_eq!(parse_hex_address("0X1000").unwrap(), 0x1000);
    }

    #[test]
    fn test_parse_hex_address_without_prefix() {
        assert_eq!(parse_hex_address("2000").unwrap(), 0x2000);
    }

    #[test]
    fn test_parse_hex_address_invalid() {
        assert!(parse_hex_address("0xZZZ").is_err());
        assert!(parse_hex_address("").is_err());
    }

    #[test]
    fn test_parse_u32_decimal() {
        assert_eq!(parse_u32("12345").unwrap(), 12345);
        assert_eq!(parse_u32("4294967295").unwrap(), u32::MAX);
    }

    #[test]
    fn test_parse_u32_hex() {
        assert_eq!(parse_u32("0xDEADBEEF").unwrap(), 0xDEAD_BEEF);
        assert_eq!(parse_u32("0X10").unwrap(), 16);
    }

    #[test]
    fn test_parse_u32_invalid() {
        assert!(parse_u32("ff").is_err());
        assert!(parse_u32("4294967296").is_err());
        assert!(parse_u32("0x1_0000_0000").is_err());
    }
}
