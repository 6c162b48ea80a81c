//! Drives a write then a read-back through one chip-select period each and
//! prints every exchanged byte.

use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tpm_spi_core::{encode_command, exchange, Direction, FrameDecoder, ScratchRegisterFile};
use tracing as _;

fn run(decoder: &mut FrameDecoder<ScratchRegisterFile>, label: &str, tx: &[u8]) {
    let rx = exchange(decoder, tx);
    println!("{label}:");
    for (sent, received) in tx.iter().zip(&rx) {
        println!("  tx {sent:#04x} -> rx {received:#04x}");
    }
}

fn main() {
    let mut decoder = FrameDecoder::new(ScratchRegisterFile::default());

    let Some(prefix) = encode_command(Direction::Write, 4, 0xD4_0018) else {
        return;
    };
    let mut write = prefix.to_vec();
    write.extend_from_slice(&[0x00, 0x00, 0x00, 0x40]);
    run(&mut decoder, "write STS", &write);

    let Some(prefix) = encode_command(Direction::Read, 4, 0xD4_0018) else {
        return;
    };
    let mut read = prefix.to_vec();
    read.extend_from_slice(&[0x00; 4]);
    run(&mut decoder, "read STS", &read);

    println!("stats: {:?}", decoder.stats());

    let registers = decoder.into_registers();
    for access in registers.accesses() {
        println!(
            "{:?} {:#08x} width {} value {:#010x}",
            access.direction, access.address, access.width, access.value
        );
    }
    println!("STS now reads {:#04x}", registers.peek(0xD4_001B));
}
