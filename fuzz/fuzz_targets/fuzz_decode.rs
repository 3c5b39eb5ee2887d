#![no_main]

use bufview::{TextView, utf8};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let forward: Vec<_> = utf8::decode_all(data).collect();
    assert!(forward.len() <= data.len());
    assert_eq!(forward.len(), utf8::count(data));

    let cps: Vec<_> = forward.iter().map(|&(_, cp)| cp).collect();
    let encoded = utf8::encode(&cps);
    assert!(utf8::is_valid(&encoded));
    assert_eq!(encoded.len(), utf8::encoded_len(&cps));

    if let Ok(text) = std::str::from_utf8(data) {
        assert_eq!(encoded, data);
        let backward: Vec<_> = utf8::decode_all(data).rev().collect();
        assert!(backward.into_iter().rev().eq(forward));
        assert_eq!(TextView::from(text).char_count(), text.chars().count());
    }
});
