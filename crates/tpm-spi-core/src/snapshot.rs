//! Versioned snapshot of the decoder fields for save/restore.
//!
//! The canonical layout is fixed-width and big-endian:
//!
//! | offset | field                |
//! |--------|----------------------|
//! | 0..2   | version (`u16`)      |
//! | 2      | phase tag            |
//! | 3      | latched fault code   |
//! | 4      | header byte          |
//! | 5      | `address_remaining`  |
//! | 6      | `data_remaining`     |
//! | 7      | `surplus_remaining`  |
//! | 8..11  | address buffer       |
//! | 11..15 | data buffer          |

use thiserror::Error;

use crate::{DecoderPhase, FrameFault, FrameState, TransferHeader};

/// Length in bytes of the canonical snapshot layout.
pub const SNAPSHOT_LEN: usize = 15;

/// Stable snapshot wire-version identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts wire value to known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }

    /// Wire value of this version.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Reasons a snapshot cannot be imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SnapshotLayoutError {
    /// Byte image has the wrong size.
    #[error("snapshot is {actual} bytes, expected {expected}")]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
    /// Version field names no known schema.
    #[error("unknown snapshot version {0}")]
    UnknownVersion(u16),
    /// Phase tag is not a known phase.
    #[error("unknown decoder phase tag {0}")]
    UnknownPhase(u8),
    /// Confused phase carries a code outside the fault taxonomy.
    #[error("unknown fault code {0:#04x}")]
    UnknownFault(u8),
    /// A counter exceeds what the header allows.
    #[error("{field} is {value}, at most {max} allowed")]
    CounterOutOfRange {
        /// Offending field name.
        field: &'static str,
        /// Stored value.
        value: u8,
        /// Largest legal value.
        max: u8,
    },
    /// Phase and address counter contradict each other.
    #[error("phase tag {phase} inconsistent with {address_remaining} address bytes remaining")]
    PhaseMismatch {
        /// Phase tag.
        phase: u8,
        /// Stored address counter.
        address_remaining: u8,
    },
    /// Data or surplus counters moved in a phase where they cannot have.
    #[error(
        "phase tag {phase} inconsistent with {data_remaining} data and {surplus_remaining} surplus bytes remaining"
    )]
    StaleDataCounters {
        /// Phase tag.
        phase: u8,
        /// Stored data counter.
        data_remaining: u8,
        /// Stored surplus counter.
        surplus_remaining: u8,
    },
}

/// Serializable decoder snapshot used for save/restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecoderSnapshot {
    /// Snapshot schema version.
    pub version: SnapshotVersion,
    /// Decoder fields at capture time.
    pub state: FrameState,
}

impl DecoderSnapshot {
    /// Wraps a state in the current schema version.
    #[must_use]
    pub const fn new(state: FrameState) -> Self {
        Self {
            version: SnapshotVersion::V1,
            state,
        }
    }

    /// Encodes the snapshot into its canonical byte layout.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SNAPSHOT_LEN] {
        let state = &self.state;
        let [v_hi, v_lo] = self.version.as_u16().to_be_bytes();
        let fault = state.phase.latched_fault().map_or(0, FrameFault::as_u8);
        let [a2, a1, a0] = state.address_buffer;
        let [d0, d1, d2, d3] = state.data_buffer;
        [
            v_hi,
            v_lo,
            state.phase.tag(),
            fault,
            state.header.raw(),
            state.address_remaining,
            state.data_remaining,
            state.surplus_remaining,
            a2,
            a1,
            a0,
            d0,
            d1,
            d2,
            d3,
        ]
    }

    /// Decodes and validates a canonical byte layout.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotLayoutError`] when the image is malformed or the
    /// decoded fields violate the decoder invariants.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotLayoutError> {
        let image: &[u8; SNAPSHOT_LEN] =
            bytes.try_into().map_err(|_| SnapshotLayoutError::WrongLength {
                expected: SNAPSHOT_LEN,
                actual: bytes.len(),
            })?;

        let raw_version = u16::from_be_bytes([image[0], image[1]]);
        let version = SnapshotVersion::from_u16(raw_version)
            .ok_or(SnapshotLayoutError::UnknownVersion(raw_version))?;

        let phase = match image[2] {
            0 => DecoderPhase::Idle,
            1 => DecoderPhase::Address,
            2 => DecoderPhase::Data,
            3 => DecoderPhase::Confused(
                FrameFault::from_u8(image[3]).ok_or(SnapshotLayoutError::UnknownFault(image[3]))?,
            ),
            4 => DecoderPhase::Complete,
            tag => return Err(SnapshotLayoutError::UnknownPhase(tag)),
        };

        let state = FrameState {
            phase,
            header: TransferHeader::decode(image[4]),
            address_remaining: image[5],
            data_remaining: image[6],
            surplus_remaining: image[7],
            address_buffer: [image[8], image[9], image[10]],
            data_buffer: [image[11], image[12], image[13], image[14]],
        };
        state.validate()?;

        Ok(Self { version, state })
    }
}
