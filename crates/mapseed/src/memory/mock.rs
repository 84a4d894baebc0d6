//! Sparse in-memory address space for tests.
//!
//! Only bytes that were explicitly written are readable; any read touching an
//! unwritten byte fails the same way an unmapped page does in a live process.

use std::collections::BTreeMap;

use super::ReadMemory;
use crate::error::{Error, Result};

pub struct MockMemoryReader {
    bytes: BTreeMap<u64, u8>,
    base_address: u64,
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        (0..size as u64)
            .map(|i| {
                address
                    .checked_add(i)
                    .and_then(|a| self.bytes.get(&a).copied())
            })
            .collect::<Option<Vec<u8>>>()
            .ok_or(Error::ReadFailure {
                address,
                length: size,
            })
    }

    fn base_address(&self) -> u64 {
        self.base_address
    }
}

#[derive(Default)]
pub struct MockMemoryBuilder {
    bytes: BTreeMap<u64, u8>,
    base_address: u64,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(mut self, address: u64) -> Self {
        self.base_address = address;
        self
    }

    pub fn bytes(mut self, address: u64, data: &[u8]) -> Self {
        for (i, &b) in data.iter().enumerate() {
            self.bytes.insert(address + i as u64, b);
        }
        self
    }

    /// Map `len` zero bytes at `address` without overwriting existing data.
    pub fn zeroed(mut self, address: u64, len: usize) -> Self {
        for i in 0..len as u64 {
            self.bytes.entry(address + i).or_insert(0);
        }
        self
    }

    pub fn u32(self, address: u64, value: u32) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn u64(self, address: u64, value: u64) -> Self {
        self.bytes(address, &value.to_le_bytes())
    }

    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader {
            bytes: self.bytes,
            base_address: self.base_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_read_written_bytes() {
        let reader = MockMemoryBuilder::new()
            .bytes(0x1000, &[0x41, 0x42, 0x43, 0x44])
            .build();
        assert_eq!(reader.read_bytes(0x1001, 2).unwrap(), vec![0x42, 0x43]);
    }

    #[test]
    fn test_mock_read_little_endian() {
        let reader = MockMemoryBuilder::new()
            .u64(0x1000, 0x0807060504030201)
            .build();
        assert_eq!(reader.read_u32(0x1000).unwrap(), 0x04030201);
        assert_eq!(reader.read_u64(0x1000).unwrap(), 0x0807060504030201);
    }

    #[test]
    fn test_mock_read_across_gap_fails() {
        let reader = MockMemoryBuilder::new()
            .bytes(0x1000, &[1, 2])
            .bytes(0x1003, &[4])
            .build();
        assert!(reader.read_bytes(0x1000, 4).is_err());
        assert!(reader.read_bytes(0x0FFF, 1).is_err());
    }

    #[test]
    fn test_mock_zeroed_keeps_existing_data() {
        let reader = MockMemoryBuilder::new()
            .u32(0x1004, 0xAABBCCDD)
            .zeroed(0x1000, 16)
            .base(0x1000)
            .build();
        assert_eq!(reader.read_u32(0x1000).unwrap(), 0);
        assert_eq!(reader.read_u32(0x1004).unwrap(), 0xAABBCCDD);
        assert_eq!(reader.base_address(), 0x1000);
    }
}
