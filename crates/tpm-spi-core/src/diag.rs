//! Saturating diagnostics counters kept beside the decoder.

use crate::{FaultClass, FrameFault};

/// Host-visible decoder diagnostics.
///
/// Counters saturate instead of wrapping. They are not part of the
/// snapshot and survive transaction-boundary resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecoderStats {
    /// Frames whose single register access completed.
    pub transactions_completed: u32,
    /// Resets that discarded a partially decoded frame.
    pub transactions_aborted: u32,
    /// Register reads dispatched.
    pub register_reads: u32,
    /// Register writes dispatched.
    pub register_writes: u32,
    /// Headers whose declared size exceeded the buffer capacity.
    pub clamped_headers: u32,
    /// Bytes consumed without being stored.
    pub discarded_bytes: u32,
    /// Protocol-class faults raised.
    pub fault_count_protocol: u32,
    /// Collaborator-class faults raised.
    pub fault_count_collaborator: u32,
    /// Most recent fault, if any.
    pub last_fault: Option<FrameFault>,
}

impl DecoderStats {
    /// Records a fault and bumps its class counter.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_fault(&mut self, fault: FrameFault) {
        self.last_fault = Some(fault);
        match fault.class() {
            FaultClass::Protocol => {
                self.fault_count_protocol = self.fault_count_protocol.saturating_add(1);
            }
            FaultClass::Collaborator => {
                self.fault_count_collaborator = self.fault_count_collaborator.saturating_add(1);
            }
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    pub(crate) fn record_read(&mut self) {
        self.register_reads = self.register_reads.saturating_add(1);
    }

    #[allow(clippy::missing_const_for_fn)]
    pub(crate) fn record_write(&mut self) {
        self.register_writes = self.register_writes.saturating_add(1);
    }

    #[allow(clippy::missing_const_for_fn)]
    pub(crate) fn record_completed(&mut self) {
        self.transactions_completed = self.transactions_completed.saturating_add(1);
    }

    #[allow(clippy::missing_const_for_fn)]
    pub(crate) fn record_aborted(&mut self) {
        self.transactions_aborted = self.transactions_aborted.saturating_add(1);
    }

    #[allow(clippy::missing_const_for_fn)]
    pub(crate) fn record_clamped(&mut self) {
        self.clamped_headers = self.clamped_headers.saturating_add(1);
    }

    #[allow(clippy::missing_const_for_fn)]
    pub(crate) fn record_discarded(&mut self) {
        self.discarded_bytes = self.discarded_bytes.saturating_add(1);
    }

    /// Resets all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::DecoderStats;
    use crate::FrameFault;

    #[test]
    fn fault_recording_updates_class_counter_and_last_fault() {
        let mut stats = DecoderStats::default();
        stats.record_fault(FrameFault::ZeroSizeTransfer);
        stats.record_fault(FrameFault::RegisterWriteFailed);

        assert_eq!(stats.fault_count_protocol, 1);
        assert_eq!(stats.fault_count_collaborator, 1);
        assert_eq!(stats.last_fault, Some(FrameFault::RegisterWriteFailed));
    }

    #[test]
    fn counters_saturate() {
        let mut stats = DecoderStats {
            discarded_bytes: u32::MAX,
            ..DecoderStats::default()
        };
        stats.record_discarded();
        assert_eq!(stats.discarded_bytes, u32::MAX);
    }

    #[test]
    fn reset_clears_everything() {
        let mut stats = DecoderStats::default();
        stats.record_read();
        stats.record_write();
        stats.record_completed();
        stats.record_aborted();
        stats.record_clamped();
        stats.record_fault(FrameFault::RegisterReadFailed);

        stats.reset();
        assert_eq!(stats, DecoderStats::default());
    }
}
