#![no_main]

use libfuzzer_sys::fuzz_target;
use tpm_spi_core::{
    DecoderSnapshot, FrameDecoder, ScratchRegisterFile, ADDRESS_BYTES, MAX_DATA_BYTES,
};

// Each input byte pair is (control, data): control bit 0 deselects before
// the data byte is exchanged.
fuzz_target!(|data: &[u8]| {
    let registers = ScratchRegisterFile::new(0).with_unmapped(0xFF_0000..=0xFF_FFFF);
    let mut decoder = FrameDecoder::new(registers);
    let mut selections = 1usize;

    for pair in data.chunks_exact(2) {
        if pair[0] & 1 != 0 {
            decoder.reset();
            selections += 1;
        }
        let _ = decoder.transfer(pair[1]);

        let state = decoder.state();
        assert!(state.address_remaining <= ADDRESS_BYTES);
        assert!(state.data_remaining <= MAX_DATA_BYTES);
        assert!(state.validate().is_ok());
    }

    let accesses = decoder.registers().accesses().len();
    assert!(accesses <= selections);

    let image = decoder.snapshot().to_bytes();
    let _ = DecoderSnapshot::from_bytes(&image).expect("live state always encodes validly");
    let _ = DecoderSnapshot::from_bytes(data);
});
