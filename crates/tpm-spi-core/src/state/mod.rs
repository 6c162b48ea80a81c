//! Decoder state model: phase machine and the per-frame fields it owns.

/// Phase of the frame currently being decoded.
pub mod phase;
/// Per-frame fields and bounds-checked buffer accessors.
pub mod frame;

pub use frame::FrameState;
pub use phase::DecoderPhase;
