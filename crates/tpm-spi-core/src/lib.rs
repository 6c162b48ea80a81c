//! Command-framing decoder for a TPM TIS register interface exposed over a
//! serial peripheral bus.

/// Bit-exact header, address, and data encoding.
pub mod wire;
pub use wire::{
    assemble_address, encode_command, pack_data, split_address, unpack_data, Direction,
    TransferHeader, ADDRESS_BYTES, ADDRESS_MASK, MAX_DATA_BYTES, MAX_DECLARED_SIZE,
};

/// Fault taxonomy for frame decoding.
pub mod fault;
pub use fault::{FaultClass, FrameFault};

/// Host-facing contracts and integration types.
pub mod api;
pub use api::{
    DecoderConfig, FrameEvent, RegisterAccess, RegisterError, RegisterFile, TransferOutcome,
    DEFAULT_FILLER_BYTE,
};

/// Decoder phase machine and per-frame fields.
pub mod state;
pub use state::{DecoderPhase, FrameState};

/// Versioned snapshot layout.
pub mod snapshot;
pub use snapshot::{DecoderSnapshot, SnapshotLayoutError, SnapshotVersion, SNAPSHOT_LEN};

/// Diagnostics counters.
pub mod diag;
pub use diag::DecoderStats;

/// The frame decoder.
pub mod decoder;
pub use decoder::FrameDecoder;

/// Serial-bus transport adapter.
pub mod transport;
pub use transport::{exchange, ChipSelect, SpiPeripheral};

/// Register files usable behind the decoder.
pub mod peripherals;
pub use peripherals::{scratch::SCRATCH_DEFAULT_FILL, ScratchRegisterFile};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
