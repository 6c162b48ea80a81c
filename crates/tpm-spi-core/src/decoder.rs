//! Byte-at-a-time frame decoder for TIS register access over SPI.
//!
//! The bus carries no framing besides chip-select, so every byte is
//! classified purely by its position inside the current selection period:
//! one header byte, three address bytes, then the data phase. At most one
//! register access is dispatched per selection period; once the frame is
//! over, further bytes are answered with filler until the next reset.

use tracing::{debug, trace, warn};

use crate::{
    DecoderConfig, DecoderPhase, DecoderSnapshot, DecoderStats, Direction, FrameEvent, FrameFault,
    FrameState, RegisterAccess, RegisterFile, SnapshotLayoutError, TransferHeader,
    TransferOutcome,
};

/// Frame decoder bound to the register file it dispatches to.
#[derive(Debug)]
pub struct FrameDecoder<R> {
    config: DecoderConfig,
    state: FrameState,
    stats: DecoderStats,
    registers: R,
}

impl<R: Default> Default for FrameDecoder<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

impl<R> FrameDecoder<R> {
    /// Creates an idle decoder with default configuration.
    #[must_use]
    pub fn new(registers: R) -> Self {
        Self::with_config(DecoderConfig::default(), registers)
    }

    /// Creates an idle decoder with an explicit configuration.
    #[must_use]
    pub fn with_config(config: DecoderConfig, registers: R) -> Self {
        Self {
            config,
            state: FrameState::default(),
            stats: DecoderStats::default(),
            registers,
        }
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Current decoder fields.
    #[must_use]
    pub const fn state(&self) -> &FrameState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DecoderPhase {
        self.state.phase
    }

    /// Diagnostics counters.
    #[must_use]
    pub const fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Clears the diagnostics counters.
    pub fn clear_stats(&mut self) {
        self.stats.reset();
    }

    /// Register file behind the decoder.
    #[must_use]
    pub const fn registers(&self) -> &R {
        &self.registers
    }

    /// Mutable access to the register file behind the decoder.
    #[allow(clippy::missing_const_for_fn)]
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.registers
    }

    /// Consumes the decoder, returning its register file.
    #[allow(clippy::missing_const_for_fn)]
    pub fn into_registers(self) -> R {
        self.registers
    }

    /// Ends the current transaction, discarding any partial frame.
    ///
    /// Must be called whenever chip-select is released. Never touches the
    /// register file and is idempotent.
    pub fn reset(&mut self) {
        if self.state.phase.in_frame() {
            debug!(
                phase = ?self.state.phase,
                address_remaining = self.state.address_remaining,
                data_remaining = self.state.data_remaining,
                "transaction boundary discarded partial frame"
            );
            self.stats.record_aborted();
        }
        self.state = FrameState::default();
    }

    /// Captures the decoder fields.
    #[must_use]
    pub const fn snapshot(&self) -> DecoderSnapshot {
        DecoderSnapshot::new(self.state)
    }

    /// Replaces the decoder fields with a previously captured snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotLayoutError`] when the snapshot violates the decoder
    /// invariants; the decoder is left unchanged in that case.
    pub fn restore(&mut self, snapshot: &DecoderSnapshot) -> Result<(), SnapshotLayoutError> {
        snapshot.state.validate()?;
        self.state = snapshot.state;
        Ok(())
    }

    const fn filler(&self, event: FrameEvent) -> TransferOutcome {
        TransferOutcome {
            reply: self.config.filler_byte,
            event,
        }
    }

    fn raise(&mut self, fault: FrameFault) -> TransferOutcome {
        self.stats.record_fault(fault);
        if fault.latches() {
            warn!(
                %fault,
                header = self.state.header.raw(),
                "protocol violation, ignoring bytes until deselect"
            );
            self.state.phase = DecoderPhase::Confused(fault);
        } else {
            self.state.finish();
        }
        self.filler(FrameEvent::Fault(fault))
    }

    fn discard(&mut self) -> TransferOutcome {
        self.stats.record_discarded();
        self.filler(FrameEvent::Discarded)
    }

    fn on_header(&mut self, byte: u8) -> TransferOutcome {
        let header = TransferHeader::decode(byte);
        self.state.begin(header);
        if header.is_clamped() {
            debug!(
                declared = header.declared_size(),
                width = header.width(),
                "declared size exceeds data buffer, clamping"
            );
            self.stats.record_clamped();
        }
        debug!(
            direction = ?header.direction(),
            size = header.declared_size(),
            "frame header"
        );
        self.filler(FrameEvent::Header(header))
    }

    fn on_address(&mut self, byte: u8) -> TransferOutcome {
        match self.state.push_address_byte(byte) {
            Some(false) => self.filler(FrameEvent::AddressByte),
            Some(true) => {
                self.state.phase = DecoderPhase::Data;
                let address = self.state.address();
                trace!(address, "address complete");
                self.filler(FrameEvent::AddressComplete { address })
            }
            None => self.discard(),
        }
    }

    fn on_surplus(&mut self) -> TransferOutcome {
        if !self.state.drain_surplus_byte() || self.state.is_exhausted() {
            self.state.finish();
        }
        self.discard()
    }
}

impl<R: RegisterFile> FrameDecoder<R> {
    /// Exchanges one byte with the initiator.
    ///
    /// Always produces exactly one reply byte. A completed frame dispatches
    /// its single register access from inside this call.
    pub fn transfer(&mut self, byte: u8) -> TransferOutcome {
        trace!(byte, phase = ?self.state.phase, "transfer");
        match self.state.phase {
            DecoderPhase::Idle => self.on_header(byte),
            DecoderPhase::Address => self.on_address(byte),
            DecoderPhase::Data => self.on_data(byte),
            DecoderPhase::Complete | DecoderPhase::Confused(_) => self.discard(),
        }
    }

    fn on_data(&mut self, byte: u8) -> TransferOutcome {
        if self.state.width() == 0 {
            return self.raise(FrameFault::ZeroSizeTransfer);
        }
        if self.state.data_remaining == 0 {
            return self.on_surplus();
        }
        match self.state.header.direction() {
            Direction::Write => self.on_write_byte(byte),
            Direction::Read => self.on_read_byte(),
        }
    }

    fn on_write_byte(&mut self, byte: u8) -> TransferOutcome {
        match self.state.push_data_byte(byte) {
            Some(false) => self.filler(FrameEvent::DataByte),
            Some(true) => self.complete_write(),
            None => self.on_surplus(),
        }
    }

    fn complete_write(&mut self) -> TransferOutcome {
        let address = self.state.address();
        let width = self.state.width();
        let value = self.state.data_value();

        if let Err(err) = self.registers.write(address, value, width) {
            warn!(%err, address, width, "register write failed");
            return self.raise(err.fault_code(Direction::Write));
        }

        debug!(address, width, value, "register write");
        self.stats.record_write();
        self.stats.record_completed();
        if self.state.is_exhausted() {
            self.state.finish();
        }
        self.filler(FrameEvent::Access(RegisterAccess {
            direction: Direction::Write,
            address,
            width,
            value,
        }))
    }

    fn on_read_byte(&mut self) -> TransferOutcome {
        let mut event = FrameEvent::DataByte;

        if self.state.read_fetch_pending() {
            let address = self.state.address();
            let width = self.state.width();
            match self.registers.read(address, width) {
                Ok(value) => {
                    debug!(address, width, value, "register read");
                    self.state.load_read_value(value);
                    self.stats.record_read();
                    self.stats.record_completed();
                    event = FrameEvent::Access(RegisterAccess {
                        direction: Direction::Read,
                        address,
                        width,
                        value,
                    });
                }
                Err(err) => {
                    warn!(%err, address, width, "register read failed");
                    return self.raise(err.fault_code(Direction::Read));
                }
            }
        }

        let Some(reply) = self.state.pop_data_byte() else {
            return self.on_surplus();
        };
        if self.state.is_exhausted() {
            self.state.finish();
        }
        TransferOutcome { reply, event }
    }
}
