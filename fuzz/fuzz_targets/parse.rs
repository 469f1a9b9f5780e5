#![no_main]
use libfuzzer_sys::fuzz_target;
use marktree::from_bytes;

fuzz_target!(|data: &[u8]| {
    let _ = from_bytes(data);
});
