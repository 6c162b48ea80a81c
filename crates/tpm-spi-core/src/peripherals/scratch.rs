//! Sparse byte-addressed register file over the 24-bit address space.
//!
//! Multi-byte accesses map a big-endian value onto consecutive addresses,
//! so the byte at `address` is the first one on the wire.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::{
    pack_data, unpack_data, Direction, RegisterAccess, RegisterError, RegisterFile,
    ADDRESS_MASK,
};

/// Value read back from bytes that were never written.
pub const SCRATCH_DEFAULT_FILL: u8 = 0xFF;

/// Register file backed by a sparse byte map.
#[derive(Debug, Clone)]
pub struct ScratchRegisterFile {
    bytes: BTreeMap<u32, u8>,
    fill: u8,
    read_only: Vec<RangeInclusive<u32>>,
    unmapped: Vec<RangeInclusive<u32>>,
    accesses: Vec<RegisterAccess>,
}

impl Default for ScratchRegisterFile {
    fn default() -> Self {
        Self::new(SCRATCH_DEFAULT_FILL)
    }
}

impl ScratchRegisterFile {
    /// Creates an empty register file answering `fill` for unwritten bytes.
    #[must_use]
    pub const fn new(fill: u8) -> Self {
        Self {
            bytes: BTreeMap::new(),
            fill,
            read_only: Vec::new(),
            unmapped: Vec::new(),
            accesses: Vec::new(),
        }
    }

    /// Marks `range` read-only; writes touching it are rejected.
    #[must_use]
    pub fn with_read_only(mut self, range: RangeInclusive<u32>) -> Self {
        self.read_only.push(range);
        self
    }

    /// Marks `range` unmapped; every access touching it fails.
    #[must_use]
    pub fn with_unmapped(mut self, range: RangeInclusive<u32>) -> Self {
        self.unmapped.push(range);
        self
    }

    /// Returns the byte stored at `address` without logging an access.
    #[must_use]
    pub fn peek(&self, address: u32) -> u8 {
        self.bytes
            .get(&(address & ADDRESS_MASK))
            .copied()
            .unwrap_or(self.fill)
    }

    /// Stores `data` at consecutive addresses without logging an access.
    pub fn poke(&mut self, address: u32, data: &[u8]) {
        for (offset, byte) in (0u32..).zip(data) {
            self.bytes
                .insert(address.wrapping_add(offset) & ADDRESS_MASK, *byte);
        }
    }

    /// Accesses served so far, oldest first.
    #[must_use]
    pub fn accesses(&self) -> &[RegisterAccess] {
        &self.accesses
    }

    /// Forgets the access log.
    pub fn clear_accesses(&mut self) {
        self.accesses.clear();
    }

    fn span(address: u32, width: u8) -> impl Iterator<Item = u32> {
        (0..u32::from(width)).map(move |offset| address.wrapping_add(offset) & ADDRESS_MASK)
    }

    fn touches(ranges: &[RangeInclusive<u32>], address: u32, width: u8) -> bool {
        Self::span(address, width).any(|byte| ranges.iter().any(|range| range.contains(&byte)))
    }
}

impl RegisterFile for ScratchRegisterFile {
    fn read(&mut self, address: u32, width: u8) -> Result<u32, RegisterError> {
        if Self::touches(&self.unmapped, address, width) {
            return Err(RegisterError::Unmapped { address });
        }
        let data: Vec<u8> = Self::span(address, width).map(|a| self.peek(a)).collect();
        let value = pack_data(&data, width);
        self.accesses.push(RegisterAccess {
            direction: Direction::Read,
            address,
            width,
            value,
        });
        Ok(value)
    }

    fn write(&mut self, address: u32, value: u32, width: u8) -> Result<(), RegisterError> {
        if Self::touches(&self.unmapped, address, width) {
            return Err(RegisterError::Unmapped { address });
        }
        if Self::touches(&self.read_only, address, width) {
            return Err(RegisterError::Rejected { address });
        }
        let data = unpack_data(value, width);
        let len = usize::from(width).min(data.len());
        self.poke(address, &data[..len]);
        self.accesses.push(RegisterAccess {
            direction: Direction::Write,
            address,
            width,
            value,
        });
        Ok(())
    }
}
