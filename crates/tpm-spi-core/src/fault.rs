use thiserror::Error;

/// Fault classes used for diagnostics aggregation and recovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// The initiator broke the framing rules.
    Protocol,
    /// The register file behind the decoder failed an access.
    Collaborator,
}

/// Stable fault taxonomy for frame decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FrameFault {
    /// A data-phase byte arrived for a header that declared zero bytes.
    #[error("data byte supplied for a zero-size transfer")]
    ZeroSizeTransfer = 0x01,
    /// The register file failed the read backing a read frame.
    #[error("register read failed")]
    RegisterReadFailed = 0x02,
    /// The register file failed the write completing a write frame.
    #[error("register write failed")]
    RegisterWriteFailed = 0x03,
}

impl FrameFault {
    /// Converts a fault to its stable code byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable code byte back into a fault.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::ZeroSizeTransfer),
            0x02 => Some(Self::RegisterReadFailed),
            0x03 => Some(Self::RegisterWriteFailed),
            _ => None,
        }
    }

    /// Returns the diagnostics class for this fault.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::ZeroSizeTransfer => FaultClass::Protocol,
            Self::RegisterReadFailed | Self::RegisterWriteFailed => FaultClass::Collaborator,
        }
    }

    /// Faults that latch the decoder until the next transaction boundary.
    #[must_use]
    pub const fn latches(self) -> bool {
        matches!(self.class(), FaultClass::Protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::{FaultClass, FrameFault};

    #[test]
    fn stable_code_roundtrip_is_bijective_for_defined_values() {
        for code in 0x01u8..=0x03 {
            let fault = FrameFault::from_u8(code).expect("defined taxonomy code");
            assert_eq!(fault.as_u8(), code);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(FrameFault::from_u8(0x00).is_none());
        assert!(FrameFault::from_u8(0x04).is_none());
        assert!(FrameFault::from_u8(0xFF).is_none());
    }

    #[test]
    fn only_protocol_faults_latch() {
        assert!(FrameFault::ZeroSizeTransfer.latches());
        assert!(!FrameFault::RegisterReadFailed.latches());
        assert!(!FrameFault::RegisterWriteFailed.latches());
    }

    #[test]
    fn class_mapping_matches_fault_taxonomy() {
        assert_eq!(FrameFault::ZeroSizeTransfer.class(), FaultClass::Protocol);
        assert_eq!(
            FrameFault::RegisterReadFailed.class(),
            FaultClass::Collaborator
        );
        assert_eq!(
            FrameFault::RegisterWriteFailed.class(),
            FaultClass::Collaborator
        );
    }
}
