//! Serial-bus side of the decoder: per-byte exchange plus chip-select.

use crate::{FrameDecoder, RegisterFile};

/// A peripheral on a byte-clocked, full-duplex serial bus.
pub trait SpiPeripheral {
    /// Shifts one byte in and returns the byte shifted out.
    fn transfer8(&mut self, tx: u8) -> u8;

    /// Reports a chip-select edge; `false` ends the current transaction.
    fn set_cs(&mut self, selected: bool);
}

impl<R: RegisterFile> SpiPeripheral for FrameDecoder<R> {
    fn transfer8(&mut self, tx: u8) -> u8 {
        self.transfer(tx).reply
    }

    fn set_cs(&mut self, selected: bool) {
        if !selected {
            self.reset();
        }
    }
}

/// Keeps a peripheral selected for the guard's lifetime.
///
/// Dropping the guard deselects the peripheral, so the transaction boundary
/// is delivered on every exit path.
#[derive(Debug)]
pub struct ChipSelect<'a, P: SpiPeripheral + ?Sized> {
    peripheral: &'a mut P,
    exchanged: usize,
}

impl<'a, P: SpiPeripheral + ?Sized> ChipSelect<'a, P> {
    /// Selects `peripheral` and opens a transaction.
    pub fn assert(peripheral: &'a mut P) -> Self {
        peripheral.set_cs(true);
        Self {
            peripheral,
            exchanged: 0,
        }
    }

    /// Exchanges one byte inside the open transaction.
    pub fn transfer(&mut self, tx: u8) -> u8 {
        self.exchanged += 1;
        self.peripheral.transfer8(tx)
    }

    /// Exchanges every byte of `tx`, returning one reply per byte.
    pub fn transfer_all(&mut self, tx: &[u8]) -> Vec<u8> {
        tx.iter().map(|byte| self.transfer(*byte)).collect()
    }

    /// Bytes exchanged since the guard was created.
    #[must_use]
    pub const fn exchanged(&self) -> usize {
        self.exchanged
    }
}

impl<P: SpiPeripheral + ?Sized> Drop for ChipSelect<'_, P> {
    fn drop(&mut self) {
        self.peripheral.set_cs(false);
    }
}

/// Runs one complete transaction: select, exchange `tx`, deselect.
pub fn exchange<P: SpiPeripheral + ?Sized>(peripheral: &mut P, tx: &[u8]) -> Vec<u8> {
    let mut cs = ChipSelect::assert(peripheral);
    cs.transfer_all(tx)
}
