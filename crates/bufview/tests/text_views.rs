#![expect(missing_docs)]

use std::thread;

use bufview::{Buffer, CodePoint, FrozenError, SeqView, TextView, ViewError, utf8};

#[test]
fn build_then_freeze_then_share() {
    let mut line = SeqView::<u8>::allocate(4);
    for word in ["alpha", " ", "beta", " ", "gamma"] {
        line = line.append(word.as_bytes());
    }
    let text = line.freeze();
    assert_eq!(text, "alpha beta gamma");

    let words: Vec<TextView> = [(0, 5), (6, 10), (11, 16)]
        .into_iter()
        .map(|(low, high)| text.substr(low, high).unwrap())
        .collect();
    let lengths = thread::scope(|scope| {
        let handles: Vec<_> = words
            .iter()
            .map(|word| scope.spawn(move || word.char_count()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });
    assert_eq!(lengths, [5, 4, 5]);

    assert_eq!(line.set(0, b'A').unwrap_err(), ViewError::Frozen(FrozenError));
}

#[test]
fn frozen_buffer_refuses_new_mutable_views() {
    let buffer = Buffer::from_vec(b"abc".to_vec());
    let _text = buffer.freeze();
    assert!(matches!(buffer.view(0, 3, 3), Err(ViewError::Frozen(_))));
}

#[test]
fn malformed_input_decodes_one_byte_at_a_time() {
    let text = TextView::from_literal(b"\xE4\x00\x00\xE7\x95\x8Cabc");
    let cps: Vec<u32> = text.chars().map(|(_, cp)| cp.to_u32()).collect();
    assert_eq!(cps, [0xFFFD, 0, 0, 0x754C, 0x61, 0x62, 0x63]);
    assert!(!text.is_valid_utf8());
    assert_eq!(text.to_string(), "\u{FFFD}\0\0界abc");
}

#[test]
fn code_point_sequences_are_mutable_copies() {
    let text = TextView::from("añb");
    let cps = text.to_code_points();
    cps.set(1, CodePoint::from('n')).unwrap();
    let edited = TextView::from_code_points(&cps);
    assert_eq!(edited, "anb");
    assert_eq!(text, "añb");
    assert_eq!(utf8::encode_view(&cps), *b"anb");
}

#[test]
fn bytes_round_trip_through_text() {
    let bytes = SeqView::from_vec(b"caf\xC3\xA9".to_vec());
    let text = TextView::from_bytes_view(&bytes);
    assert_eq!(text, "café");
    let back = text.as_bytes_view();
    assert_eq!(back, *"café".as_bytes());
    assert!(back.is_frozen());
}
