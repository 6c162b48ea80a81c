//! Host-facing contracts for embedding the frame decoder.

use thiserror::Error;

use crate::{Direction, FrameFault, TransferHeader};

/// Filler byte answered for every non-data byte of a frame.
pub const DEFAULT_FILLER_BYTE: u8 = 0x00;

/// Immutable configuration for a decoder instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecoderConfig {
    /// Reply byte for every byte that carries no read data.
    pub filler_byte: u8,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            filler_byte: DEFAULT_FILLER_BYTE,
        }
    }
}

/// Failure reported by a [`RegisterFile`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RegisterError {
    /// Nothing backs the addressed register.
    #[error("no register mapped at {address:#08x}")]
    Unmapped {
        /// 24-bit register address of the failed access.
        address: u32,
    },
    /// The register exists but refused the access.
    #[error("register at {address:#08x} rejected the access")]
    Rejected {
        /// 24-bit register address of the failed access.
        address: u32,
    },
}

impl RegisterError {
    /// Address of the failed access.
    #[must_use]
    pub const fn address(self) -> u32 {
        match self {
            Self::Unmapped { address } | Self::Rejected { address } => address,
        }
    }

    /// Maps a collaborator failure to the frame fault surface.
    #[must_use]
    pub const fn fault_code(self, direction: Direction) -> FrameFault {
        match (self, direction) {
            (Self::Unmapped { .. } | Self::Rejected { .. }, Direction::Read) => {
                FrameFault::RegisterReadFailed
            }
            (Self::Unmapped { .. } | Self::Rejected { .. }, Direction::Write) => {
                FrameFault::RegisterWriteFailed
            }
        }
    }
}

/// Register file the decoder dispatches completed frames to.
///
/// Values are packed big-endian over `width` bytes: the first data byte on
/// the wire is the most significant of the accessed bytes.
pub trait RegisterFile {
    /// Reads `width` (1..=4) bytes starting at the 24-bit `address`.
    ///
    /// # Errors
    ///
    /// Returns a [`RegisterError`] when the access cannot be completed.
    fn read(&mut self, address: u32, width: u8) -> Result<u32, RegisterError>;

    /// Writes `width` (1..=4) bytes of `value` starting at the 24-bit `address`.
    ///
    /// # Errors
    ///
    /// Returns a [`RegisterError`] when the access cannot be completed.
    fn write(&mut self, address: u32, value: u32, width: u8) -> Result<(), RegisterError>;
}

impl<R: RegisterFile + ?Sized> RegisterFile for &mut R {
    fn read(&mut self, address: u32, width: u8) -> Result<u32, RegisterError> {
        (**self).read(address, width)
    }

    fn write(&mut self, address: u32, value: u32, width: u8) -> Result<(), RegisterError> {
        (**self).write(address, value, width)
    }
}

/// One completed register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterAccess {
    /// Read or write.
    pub direction: Direction,
    /// 24-bit register address.
    pub address: u32,
    /// Access width in bytes after clamping.
    pub width: u8,
    /// Value read from or written to the register file.
    pub value: u32,
}

/// What a single transferred byte did to the frame being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameEvent {
    /// Byte was decoded as a frame header.
    Header(TransferHeader),
    /// Byte was stored as an address byte; more are expected.
    AddressByte,
    /// Byte completed the 3-byte address.
    AddressComplete {
        /// Assembled 24-bit address.
        address: u32,
    },
    /// Byte was stored or emitted as part of the data phase.
    DataByte,
    /// Byte triggered the frame's single register access.
    Access(RegisterAccess),
    /// Byte was consumed without being stored (surplus, confused, or after the frame ended).
    Discarded,
    /// Byte raised a fault.
    Fault(FrameFault),
}

/// Result of one byte exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferOutcome {
    /// Byte shifted back to the initiator.
    pub reply: u8,
    /// Effect of the incoming byte.
    pub event: FrameEvent,
}

impl TransferOutcome {
    /// Returns the fault raised by this byte, if any.
    #[must_use]
    pub const fn fault(self) -> Option<FrameFault> {
        match self.event {
            FrameEvent::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    /// Returns the register access performed by this byte, if any.
    #[must_use]
    pub const fn access(self) -> Option<RegisterAccess> {
        match self.event {
            FrameEvent::Access(access) => Some(access),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DecoderConfig, FrameEvent, RegisterAccess, RegisterError, TransferOutcome,
        DEFAULT_FILLER_BYTE,
    };
    use crate::{Direction, FrameFault};

    #[test]
    fn default_config_answers_zero_filler() {
        assert_eq!(DecoderConfig::default().filler_byte, DEFAULT_FILLER_BYTE);
        assert_eq!(DEFAULT_FILLER_BYTE, 0x00);
    }

    #[test]
    fn register_error_maps_to_direction_specific_fault() {
        let err = RegisterError::Unmapped { address: 0x2000 };
        assert_eq!(err.fault_code(Direction::Read), FrameFault::RegisterReadFailed);
        assert_eq!(
            err.fault_code(Direction::Write),
            FrameFault::RegisterWriteFailed
        );
        assert_eq!(err.address(), 0x2000);
    }

    #[test]
    fn register_error_display_names_address() {
        let err = RegisterError::Rejected { address: 0xD4_0018 };
        assert_eq!(
            err.to_string(),
            "register at 0xd40018 rejected the access"
        );
    }

    #[test]
    fn outcome_accessors_report_only_matching_events() {
        let access = RegisterAccess {
            direction: Direction::Write,
            address: 0x1000,
            width: 4,
            value: 0xAB00_0000,
        };
        let done = TransferOutcome {
            reply: 0,
            event: FrameEvent::Access(access),
        };
        assert_eq!(done.access(), Some(access));
        assert_eq!(done.fault(), None);

        let faulted = TransferOutcome {
            reply: 0,
            event: FrameEvent::Fault(FrameFault::ZeroSizeTransfer),
        };
        assert_eq!(faulted.fault(), Some(FrameFault::ZeroSizeTransfer));
        assert_eq!(faulted.access(), None);
    }
}
