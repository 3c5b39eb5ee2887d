#![no_main]

use arbitrary::Arbitrary;
use bufview::{FrontRemoval, SeqView};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Strategy {
    Advance,
    AdvanceReleasing,
    Compact,
}

#[derive(Arbitrary, Debug)]
enum Op {
    Append(Vec<u8>),
    Insert(u16, Vec<u8>),
    Remove(u16, u16),
    Truncate(u16),
    Pop,
    RemoveFront(u16, Strategy),
    LimitCapacity,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut view = SeqView::<u8>::allocate(8);
    let mut model: Vec<u8> = Vec::new();
    for op in ops {
        let len = model.len();
        view = match op {
            Op::Append(bytes) => {
                model.extend_from_slice(&bytes);
                view.append(&bytes)
            }
            Op::Insert(at, bytes) => {
                let at = usize::from(at) % (len + 1);
                model.splice(at..at, bytes.iter().copied());
                view.insert(at, &bytes).unwrap()
            }
            Op::Remove(start, count) => {
                let start = usize::from(start) % (len + 1);
                let end = start + usize::from(count) % (len - start + 1);
                model.drain(start..end);
                view.remove_range(start, end).unwrap()
            }
            Op::Truncate(new_len) => {
                let new_len = usize::from(new_len);
                model.truncate(new_len);
                view.truncate(new_len).unwrap()
            }
            Op::Pop => {
                let expected = model.pop();
                let (view, popped) = view.pop().unwrap();
                assert_eq!(popped, expected);
                view
            }
            Op::RemoveFront(count, strategy) => {
                let count = usize::from(count) % (len + 1);
                model.drain(..count);
                let strategy = match strategy {
                    Strategy::Advance => FrontRemoval::Advance,
                    Strategy::AdvanceReleasing => FrontRemoval::AdvanceReleasing,
                    Strategy::Compact => FrontRemoval::Compact,
                };
                view.remove_front(count, strategy).unwrap()
            }
            Op::LimitCapacity => view.slice_with_capacity(0, len, len).unwrap(),
        };
        assert_eq!(view, *model.as_slice());
        let spare = view.slice(view.len(), view.capacity()).unwrap();
        assert!(spare.iter().all(|byte| byte == 0));
    }
});
