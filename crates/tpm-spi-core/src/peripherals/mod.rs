//! Register files that can sit behind the frame decoder.

/// Byte-addressed scratch register file with access logging.
pub mod scratch;

pub use scratch::ScratchRegisterFile;
