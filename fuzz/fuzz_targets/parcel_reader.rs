#![no_main]

use cursor::ParcelReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ParcelReader::new(data);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 8;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_i32();
            }
            1 => {
                let _ = reader.read_i64();
            }
            2 => {
                let _ = reader.read_string16();
            }
            3 => {
                let _ = reader.read_byte_array();
            }
            4 => {
                let _ = reader.read_len();
            }
            5 => {
                let skip = usize::from(data[idx.saturating_sub(1)] % 16);
                let _ = reader.skip(skip);
            }
            6 => {
                let end = reader.position() + usize::from(data[idx.saturating_sub(1)] % 32);
                let _ = reader.with_limit(end, |r| r.read_f64());
            }
            _ => {
                let _ = wire::read_field_header(&mut reader);
            }
        }
    }
});
