//! Bit-exact wire encoding for TIS-over-SPI command frames.
//!
//! A frame is one header byte, a 3-byte big-endian register address, and a
//! data phase whose length the header declares. Byte order is fixed here by
//! shifts and masks, never by host layout.

/// Width in bytes of the target address that follows every header.
pub const ADDRESS_BYTES: u8 = 3;

/// Capacity of the data buffer; wider declared transfers are clamped.
pub const MAX_DATA_BYTES: u8 = 4;

/// Largest size the 6-bit header field can declare.
pub const MAX_DECLARED_SIZE: u8 = 0x3F;

/// Mask selecting the meaningful bits of a 24-bit register address.
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

const DIRECTION_BIT: u8 = 0x80;
const SIZE_SHIFT: u8 = 1;
const SIZE_MASK: u8 = 0x3F;

/// Direction of the register access carried by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    /// Initiator supplies the data bytes (header bit 7 clear).
    #[default]
    Write,
    /// Peripheral supplies the data bytes (header bit 7 set).
    Read,
}

impl Direction {
    /// Returns true for device-to-initiator transfers.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Read)
    }
}

/// Decoded view of the header byte that opens every frame.
///
/// Layout: `bit7` direction, `bits6..1` declared size, `bit0` reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TransferHeader {
    raw: u8,
}

impl TransferHeader {
    /// Wraps a raw header byte as received on the wire.
    #[must_use]
    pub const fn decode(raw: u8) -> Self {
        Self { raw }
    }

    /// Builds a header for `direction` declaring `size` data bytes.
    ///
    /// Returns `None` when `size` does not fit the 6-bit size field.
    #[must_use]
    pub const fn encode(direction: Direction, size: u8) -> Option<Self> {
        if size > MAX_DECLARED_SIZE {
            return None;
        }
        let dir = match direction {
            Direction::Read => DIRECTION_BIT,
            Direction::Write => 0,
        };
        Some(Self {
            raw: dir | (size << SIZE_SHIFT),
        })
    }

    /// Raw header byte, reserved bit included.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.raw
    }

    /// Access direction from bit 7.
    #[must_use]
    pub const fn direction(self) -> Direction {
        if self.raw & DIRECTION_BIT == 0 {
            Direction::Write
        } else {
            Direction::Read
        }
    }

    /// Size declared by the initiator, before clamping.
    #[must_use]
    pub const fn declared_size(self) -> u8 {
        (self.raw >> SIZE_SHIFT) & SIZE_MASK
    }

    /// Width of the register access: the declared size clamped to the
    /// data buffer capacity.
    #[must_use]
    pub const fn width(self) -> u8 {
        let declared = self.declared_size();
        if declared > MAX_DATA_BYTES {
            MAX_DATA_BYTES
        } else {
            declared
        }
    }

    /// Data-phase bytes declared beyond the buffer capacity.
    #[must_use]
    pub const fn surplus(self) -> u8 {
        self.declared_size() - self.width()
    }

    /// Returns true when the declared size exceeded the buffer capacity.
    #[must_use]
    pub const fn is_clamped(self) -> bool {
        self.surplus() != 0
    }
}

/// Packs three address bytes, most significant first, into a 24-bit address.
#[must_use]
pub const fn assemble_address(bytes: [u8; ADDRESS_BYTES as usize]) -> u32 {
    ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32
}

/// Splits a 24-bit address into its wire bytes, most significant first.
///
/// Bits above bit 23 are discarded.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn split_address(address: u32) -> [u8; ADDRESS_BYTES as usize] {
    let address = address & ADDRESS_MASK;
    [(address >> 16) as u8, (address >> 8) as u8, address as u8]
}

/// Packs the first `width` bytes of `bytes` big-endian into a register value.
#[must_use]
pub fn pack_data(bytes: &[u8], width: u8) -> u32 {
    bytes
        .iter()
        .take(usize::from(width.min(MAX_DATA_BYTES)))
        .fold(0u32, |value, byte| (value << 8) | u32::from(*byte))
}

/// Unpacks a register value into `width` big-endian wire bytes.
///
/// Positions at and beyond `width` are left zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn unpack_data(value: u32, width: u8) -> [u8; MAX_DATA_BYTES as usize] {
    let width = width.min(MAX_DATA_BYTES);
    let mut bytes = [0u8; MAX_DATA_BYTES as usize];
    for (index, slot) in bytes.iter_mut().take(usize::from(width)).enumerate() {
        let shift = 8 * (usize::from(width) - 1 - index);
        *slot = (value >> shift) as u8;
    }
    bytes
}

/// Builds the header and address bytes of a frame, as an initiator would.
///
/// Returns `None` when `size` does not fit the header size field.
#[must_use]
pub fn encode_command(
    direction: Direction,
    size: u8,
    address: u32,
) -> Option<[u8; 1 + ADDRESS_BYTES as usize]> {
    let header = TransferHeader::encode(direction, size)?;
    let [a2, a1, a0] = split_address(address);
    Some([header.raw(), a2, a1, a0])
}
