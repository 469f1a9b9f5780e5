#![no_main]
use libfuzzer_sys::fuzz_target;
use marktree::{from_bytes, from_str};

// After one parse/serialize pass the output must be a fixed point:
// rendering it, reparsing it and rendering again has to reproduce it.
fuzz_target!(|data: &[u8]| {
    let Ok(doc) = from_bytes(data) else { return };
    let Ok(first) = doc.to_xml(false) else { return };
    let reparsed = from_str(&first).expect("rendered output must reparse");
    let second = reparsed
        .to_xml(false)
        .expect("reparsed output must render");
    assert_eq!(first, second);
});
