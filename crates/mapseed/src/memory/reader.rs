use serde::Serialize;

use crate::error::{Error, Result};
use crate::memory::ProcessHandle;

/// Size of a pointer slot in the target's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerWidth {
    Bits32,
    Bits64,
}

impl PointerWidth {
    pub const fn bytes(self) -> usize {
        match self {
            PointerWidth::Bits32 => 4,
            PointerWidth::Bits64 => 8,
        }
    }
}

/// Read-only access to a target address space.
///
/// `read_bytes` should return exactly `size` bytes or fail. Callers go through
/// `read_exact`, which turns a short buffer into [`Error::ReadFailure`], so a
/// partial read is never surfaced as data. Typed helpers are little-endian.
pub trait ReadMemory {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Load address of the primary module image.
    fn base_address(&self) -> u64;

    /// `read_bytes` with the length checked; a short buffer is a read failure.
    fn read_exact(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let bytes = self.read_bytes(address, size)?;
        if bytes.len() != size {
            return Err(Error::ReadFailure {
                address,
                length: size,
            });
        }
        Ok(bytes)
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        let bytes: [u8; 4] = self
            .read_exact(address, 4)?
            .try_into()
            .map_err(|_| Error::ReadFailure { address, length: 4 })?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_u64(&self, address: u64) -> Result<u64> {
        let bytes: [u8; 8] = self
            .read_exact(address, 8)?
            .try_into()
            .map_err(|_| Error::ReadFailure { address, length: 8 })?;
        Ok(u64::from_le_bytes(bytes))
    }

    fn read_ptr(&self, address: u64, width: PointerWidth) -> Result<u64> {
        match width {
            PointerWidth::Bits32 => self.read_u32(address).map(u64::from),
            PointerWidth::Bits64 => self.read_u64(address),
        }
    }
}

impl<R: ReadMemory + ?Sized> ReadMemory for &R {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(address, size)
    }

    fn base_address(&self) -> u64 {
        (**self).base_address()
    }
}

/// Reads from an opened target process.
pub struct MemoryReader<'a> {
    process: &'a ProcessHandle,
}

impl<'a> MemoryReader<'a> {
    pub fn new(process: &'a ProcessHandle) -> Self {
        Self { process }
    }
}

impl ReadMemory for MemoryReader<'_> {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        let read = self
            .process
            .read_into(address, &mut buffer)
            .map_err(|_| Error::ReadFailure {
                address,
                length: size,
            })?;
        if read != size {
            return Err(Error::ReadFailure {
                address,
                length: size,
            });
        }
        Ok(buffer)
    }

    fn base_address(&self) -> u64 {
        self.process.base_address
    }
}
