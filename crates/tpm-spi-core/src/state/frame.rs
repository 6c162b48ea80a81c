use crate::{
    assemble_address, pack_data, unpack_data, DecoderPhase, Direction, SnapshotLayoutError,
    TransferHeader, ADDRESS_BYTES, MAX_DATA_BYTES,
};

/// All decoder fields that survive between byte exchanges.
///
/// Buffers are fixed-capacity; the write position is derived from the
/// matching `*_remaining` counter and bounds-checked before every store, so
/// a miscounted frame can only be discarded, never written out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FrameState {
    /// Current phase.
    pub phase: DecoderPhase,
    /// Header of the frame in progress; meaningless while idle.
    pub header: TransferHeader,
    /// Address bytes still expected.
    pub address_remaining: u8,
    /// Data bytes still to store (write) or emit (read).
    pub data_remaining: u8,
    /// Declared data bytes beyond the buffer capacity still to drain.
    pub surplus_remaining: u8,
    /// Address bytes, most significant first.
    pub address_buffer: [u8; ADDRESS_BYTES as usize],
    /// Data bytes in wire order.
    pub data_buffer: [u8; MAX_DATA_BYTES as usize],
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            phase: DecoderPhase::Idle,
            header: TransferHeader::default(),
            address_remaining: ADDRESS_BYTES,
            data_remaining: 0,
            surplus_remaining: 0,
            address_buffer: [0; ADDRESS_BYTES as usize],
            data_buffer: [0; MAX_DATA_BYTES as usize],
        }
    }
}

impl FrameState {
    /// Starts a new frame from a decoded header.
    pub fn begin(&mut self, header: TransferHeader) {
        *self = Self {
            phase: DecoderPhase::Address,
            header,
            data_remaining: header.width(),
            surplus_remaining: header.surplus(),
            ..Self::default()
        };
    }

    /// Access width of the frame in progress.
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.header.width()
    }

    /// Assembled 24-bit address from the bytes received so far.
    #[must_use]
    pub const fn address(&self) -> u32 {
        assemble_address(self.address_buffer)
    }

    /// Register value held in the data buffer, packed over the frame width.
    #[must_use]
    pub fn data_value(&self) -> u32 {
        pack_data(&self.data_buffer, self.width())
    }

    /// Stores the next address byte.
    ///
    /// Returns `Some(true)` when the byte completed the address and `None`
    /// when no address byte was expected.
    pub fn push_address_byte(&mut self, byte: u8) -> Option<bool> {
        let index = ADDRESS_BYTES.checked_sub(self.address_remaining)?;
        let slot = self.address_buffer.get_mut(usize::from(index))?;
        *slot = byte;
        self.address_remaining -= 1;
        Some(self.address_remaining == 0)
    }

    /// Buffer position of the next data byte, if one is still expected.
    #[must_use]
    pub fn data_cursor(&self) -> Option<usize> {
        if self.data_remaining == 0 {
            return None;
        }
        let index = usize::from(self.width().checked_sub(self.data_remaining)?);
        (index < self.data_buffer.len()).then_some(index)
    }

    /// Stores the next written data byte.
    ///
    /// Returns `Some(true)` when the buffer is now complete and `None` when
    /// no data byte was expected.
    pub fn push_data_byte(&mut self, byte: u8) -> Option<bool> {
        let index = self.data_cursor()?;
        let slot = self.data_buffer.get_mut(index)?;
        *slot = byte;
        self.data_remaining -= 1;
        Some(self.data_remaining == 0)
    }

    /// Emits the next buffered read byte.
    pub fn pop_data_byte(&mut self) -> Option<u8> {
        let index = self.data_cursor()?;
        let byte = *self.data_buffer.get(index)?;
        self.data_remaining -= 1;
        Some(byte)
    }

    /// Fills the data buffer from a value returned by the register file.
    pub fn load_read_value(&mut self, value: u32) {
        self.data_buffer = unpack_data(value, self.width());
    }

    /// Returns true when a read frame has not fetched its register value yet.
    #[must_use]
    pub const fn read_fetch_pending(&self) -> bool {
        matches!(self.header.direction(), Direction::Read)
            && self.width() != 0
            && self.data_remaining == self.width()
    }

    /// Consumes one surplus byte, returning false when none was declared.
    pub fn drain_surplus_byte(&mut self) -> bool {
        match self.surplus_remaining.checked_sub(1) {
            Some(rest) => {
                self.surplus_remaining = rest;
                true
            }
            None => false,
        }
    }

    /// Returns true when the frame has no data or surplus bytes left.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.data_remaining == 0 && self.surplus_remaining == 0
    }

    /// Ends the frame; nothing of it is kept and later bytes are discarded.
    pub fn finish(&mut self) {
        *self = Self {
            phase: DecoderPhase::Complete,
            ..Self::default()
        };
    }

    /// Checks that counters and phase are mutually consistent.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as a [`SnapshotLayoutError`].
    pub fn validate(&self) -> Result<(), SnapshotLayoutError> {
        check_range("address_remaining", self.address_remaining, ADDRESS_BYTES)?;
        check_range("data_remaining", self.data_remaining, self.width())?;
        check_range(
            "surplus_remaining",
            self.surplus_remaining,
            self.header.surplus(),
        )?;

        let consistent = match self.phase {
            DecoderPhase::Idle | DecoderPhase::Complete => self.address_remaining == ADDRESS_BYTES,
            DecoderPhase::Address => self.address_remaining != 0,
            DecoderPhase::Data => self.address_remaining == 0,
            DecoderPhase::Confused(_) => true,
        };
        if !consistent {
            return Err(SnapshotLayoutError::PhaseMismatch {
                phase: self.phase.tag(),
                address_remaining: self.address_remaining,
            });
        }

        // Data counters only move once the address is complete.
        let untouched = match self.phase {
            DecoderPhase::Address => {
                self.data_remaining == self.width()
                    && self.surplus_remaining == self.header.surplus()
            }
            DecoderPhase::Complete => self.data_remaining == 0 && self.surplus_remaining == 0,
            DecoderPhase::Idle | DecoderPhase::Data | DecoderPhase::Confused(_) => true,
        };
        if untouched {
            Ok(())
        } else {
            Err(SnapshotLayoutError::StaleDataCounters {
                phase: self.phase.tag(),
                data_remaining: self.data_remaining,
                surplus_remaining: self.surplus_remaining,
            })
        }
    }
}

const fn check_range(field: &'static str, value: u8, max: u8) -> Result<(), SnapshotLayoutError> {
    if value > max {
        Err(SnapshotLayoutError::CounterOutOfRange { field, value, max })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FrameState;
    use crate::{
        DecoderPhase, Direction, SnapshotLayoutError, TransferHeader, ADDRESS_BYTES,
        MAX_DATA_BYTES,
    };

    fn header(direction: Direction, size: u8) -> TransferHeader {
        TransferHeader::encode(direction, size).expect("size fits header field")
    }

    #[test]
    fn default_state_is_idle_with_full_address_count() {
        let state = FrameState::default();
        assert_eq!(state.phase, DecoderPhase::Idle);
        assert_eq!(state.address_remaining, ADDRESS_BYTES);
        assert_eq!(state.data_remaining, 0);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn begin_seeds_counters_from_clamped_header() {
        let mut state = FrameState {
            address_buffer: [1, 2, 3],
            data_buffer: [4, 5, 6, 7],
            ..FrameState::default()
        };
        state.begin(header(Direction::Write, 10));

        assert_eq!(state.phase, DecoderPhase::Address);
        assert_eq!(state.data_remaining, MAX_DATA_BYTES);
        assert_eq!(state.surplus_remaining, 6);
        assert_eq!(state.address_buffer, [0; 3]);
        assert_eq!(state.data_buffer, [0; 4]);
    }

    #[test]
    fn address_bytes_fill_most_significant_first() {
        let mut state = FrameState::default();
        state.begin(header(Direction::Read, 1));

        assert_eq!(state.push_address_byte(0xD4), Some(false));
        assert_eq!(state.push_address_byte(0x0F), Some(false));
        assert_eq!(state.push_address_byte(0x00), Some(true));
        assert_eq!(state.address(), 0xD4_0F00);
        assert_eq!(state.push_address_byte(0xAA), None);
        assert_eq!(state.address(), 0xD4_0F00);
    }

    #[test]
    fn data_store_stops_at_width() {
        let mut state = FrameState::default();
        state.begin(header(Direction::Write, 2));

        assert_eq!(state.push_data_byte(0x12), Some(false));
        assert_eq!(state.push_data_byte(0x34), Some(true));
        assert_eq!(state.push_data_byte(0x56), None);
        assert_eq!(state.data_value(), 0x1234);
    }

    #[test]
    fn corrupted_counter_never_indexes_out_of_range() {
        let mut state = FrameState::default();
        state.begin(header(Direction::Write, 1));
        state.data_remaining = 9;

        assert_eq!(state.data_cursor(), None);
        assert_eq!(state.push_data_byte(0xFF), None);

        state.address_remaining = 7;
        assert_eq!(state.push_address_byte(0xFF), None);
    }

    #[test]
    fn read_fetch_is_pending_until_first_byte_leaves() {
        let mut state = FrameState::default();
        state.begin(header(Direction::Read, 2));
        assert!(state.read_fetch_pending());

        state.load_read_value(0xBEEF);
        assert_eq!(state.pop_data_byte(), Some(0xBE));
        assert!(!state.read_fetch_pending());
        assert_eq!(state.pop_data_byte(), Some(0xEF));
        assert_eq!(state.pop_data_byte(), None);
    }

    #[test]
    fn zero_size_read_never_requests_fetch() {
        let mut state = FrameState::default();
        state.begin(header(Direction::Read, 0));
        assert!(!state.read_fetch_pending());
        assert!(state.is_exhausted());
    }

    #[test]
    fn surplus_drains_to_zero_then_refuses() {
        let mut state = FrameState::default();
        state.begin(header(Direction::Write, 6));
        assert!(state.drain_surplus_byte());
        assert!(state.drain_surplus_byte());
        assert!(!state.drain_surplus_byte());
    }

    #[test]
    fn validate_rejects_out_of_range_counters() {
        let state = FrameState {
            address_remaining: 4,
            ..FrameState::default()
        };
        assert_eq!(
            state.validate(),
            Err(SnapshotLayoutError::CounterOutOfRange {
                field: "address_remaining",
                value: 4,
                max: 3,
            })
        );
    }

    #[test]
    fn finish_clears_frame_and_enters_complete() {
        let mut state = FrameState::default();
        state.begin(header(Direction::Write, 2));
        let _ = state.push_address_byte(0x12);
        state.finish();

        assert_eq!(state.phase, DecoderPhase::Complete);
        assert_eq!(state.address_buffer, [0; 3]);
        assert_eq!(state.address_remaining, ADDRESS_BYTES);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn validate_rejects_data_consumed_before_address_completes() {
        let mut state = FrameState::default();
        state.begin(header(Direction::Write, 4));
        let _ = state.push_address_byte(0x00);
        state.data_remaining = 1;

        assert_eq!(
            state.validate(),
            Err(SnapshotLayoutError::StaleDataCounters {
                phase: 1,
                data_remaining: 1,
                surplus_remaining: 0,
            })
        );

        state.begin(header(Direction::Write, 9));
        state.surplus_remaining = 2;
        assert!(matches!(
            state.validate(),
            Err(SnapshotLayoutError::StaleDataCounters { phase: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_phase_counter_mismatch() {
        let mut state = FrameState::default();
        state.begin(header(Direction::Write, 1));
        state.phase = DecoderPhase::Data;

        assert_eq!(
            state.validate(),
            Err(SnapshotLayoutError::PhaseMismatch {
                phase: 2,
                address_remaining: 3,
            })
        );
    }
}
