use crate::FrameFault;

/// Deterministic phase machine for one chip-select period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DecoderPhase {
    /// Waiting for a header byte.
    #[default]
    Idle,
    /// Collecting the 3 address bytes.
    Address,
    /// Moving data bytes, or draining surplus ones.
    Data,
    /// Frame finished; every byte is discarded until reset.
    Complete,
    /// Protocol violation latched; every byte is discarded until reset.
    Confused(FrameFault),
}

impl DecoderPhase {
    /// Returns the latched protocol fault, if the decoder is confused.
    #[must_use]
    pub const fn latched_fault(self) -> Option<FrameFault> {
        match self {
            Self::Confused(fault) => Some(fault),
            Self::Idle | Self::Address | Self::Data | Self::Complete => None,
        }
    }

    /// Returns true while a frame is partially decoded.
    #[must_use]
    pub const fn in_frame(self) -> bool {
        !matches!(self, Self::Idle | Self::Complete)
    }

    /// Stable tag used by the canonical snapshot layout.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Address => 1,
            Self::Data => 2,
            Self::Confused(_) => 3,
            Self::Complete => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DecoderPhase;
    use crate::FrameFault;

    #[test]
    fn phase_default_is_idle() {
        assert_eq!(DecoderPhase::default(), DecoderPhase::Idle);
        assert!(!DecoderPhase::Idle.in_frame());
    }

    #[test]
    fn complete_phase_is_not_a_partial_frame() {
        assert!(!DecoderPhase::Complete.in_frame());
        assert!(DecoderPhase::Address.in_frame());
        assert!(DecoderPhase::Confused(FrameFault::ZeroSizeTransfer).in_frame());
    }

    #[test]
    fn latched_fault_accessor_reports_only_confused_variant() {
        assert_eq!(DecoderPhase::Idle.latched_fault(), None);
        assert_eq!(DecoderPhase::Address.latched_fault(), None);
        assert_eq!(DecoderPhase::Data.latched_fault(), None);
        assert_eq!(DecoderPhase::Complete.latched_fault(), None);
        assert_eq!(
            DecoderPhase::Confused(FrameFault::ZeroSizeTransfer).latched_fault(),
            Some(FrameFault::ZeroSizeTransfer)
        );
    }

    #[test]
    fn tags_are_distinct() {
        let tags = [
            DecoderPhase::Idle.tag(),
            DecoderPhase::Address.tag(),
            DecoderPhase::Data.tag(),
            DecoderPhase::Confused(FrameFault::ZeroSizeTransfer).tag(),
            DecoderPhase::Complete.tag(),
        ];
        assert_eq!(tags, [0, 1, 2, 3, 4]);
    }
}
