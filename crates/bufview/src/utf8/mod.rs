//! UTF-8 decoding and encoding over byte buffers.
//!
//! Decoding never fails. Any byte that does not start a well-formed sequence
//! (a stray continuation byte, a truncated sequence, an overlong form, an
//! encoded surrogate, or a value above U+10FFFF) decodes to
//! [`CodePoint::REPLACEMENT`] and consumes exactly one byte, so decoding the
//! remaining bytes resynchronizes on the next lead byte and a buffer of `n`
//! bytes takes at most `n` steps.

use alloc::vec::Vec;
use core::{fmt, iter::FusedIterator};

use crate::view::SeqView;


/// A Unicode scalar value: any code point except the surrogates.
///
/// The default is U+0000.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodePoint(char);

impl CodePoint {
    /// U+FFFD, produced for every malformed byte.
    pub const REPLACEMENT: Self = Self(char::REPLACEMENT_CHARACTER);

    /// The largest scalar value, U+10FFFF.
    pub const MAX: Self = Self(char::MAX);

    /// `None` for surrogates and values above U+10FFFF.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match char::from_u32(value) {
            Some(ch) => Some(Self(ch)),
            None => None,
        }
    }

    /// Like [`CodePoint::new`], mapping unrepresentable values to U+FFFD.
    #[must_use]
    pub const fn from_u32_lossy(value: u32) -> Self {
        match Self::new(value) {
            Some(cp) => cp,
            None => Self::REPLACEMENT,
        }
    }

    #[must_use]
    pub const fn from_char(ch: char) -> Self {
        Self(ch)
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        self.0
    }

    #[must_use]
    pub const fn to_u32(self) -> u32 {
        self.0 as u32
    }

    /// Number of bytes in the UTF-8 encoding, 1 to 4.
    #[must_use]
    pub const fn len_utf8(self) -> usize {
        self.0.len_utf8()
    }
}

impl From<char> for CodePoint {
    fn from(ch: char) -> Self {
        Self(ch)
    }
}

impl From<CodePoint> for char {
    fn from(cp: CodePoint) -> Self {
        cp.0
    }
}

impl From<CodePoint> for u32 {
    fn from(cp: CodePoint) -> Self {
        cp.to_u32()
    }
}

impl fmt::Debug for CodePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U+{:04X}", self.to_u32())
    }
}

impl fmt::Display for CodePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Decodes the code point starting at `pos`.
///
/// Returns `None` once `pos` reaches the end of `bytes`, otherwise the code
/// point and the position just past it.
///
/// ```
/// use bufview::utf8::{CodePoint, decode_next};
///
/// let bytes = b"\xE4\x00";
/// assert_eq!(decode_next(bytes, 0), Some((CodePoint::REPLACEMENT, 1)));
/// assert_eq!(decode_next(bytes, 1), Some((CodePoint::from('\0'), 2)));
/// assert_eq!(decode_next(bytes, 2), None);
/// ```
///
/// # Panics
///
/// Panics if `pos > bytes.len()`.
#[inline]
#[must_use]
pub fn decode_next(bytes: &[u8], pos: usize) -> Option<(CodePoint, usize)> {
    let rest = &bytes[pos..];
    let &lead = rest.first()?;
    if lead.is_ascii() {
        return Some((CodePoint(char::from(lead)), pos + 1));
    }
    match bstr::decode_utf8(rest) {
        (Some(ch), width) => Some((CodePoint(ch), pos + width)),
        (None, _) => Some((CodePoint::REPLACEMENT, pos + 1)),
    }
}

/// Decodes the code point that ends `bytes`.
///
/// Returns the code point and the number of bytes it occupies at the end, or
/// `None` for empty input. A malformed tail yields U+FFFD with width 1.
#[must_use]
pub fn decode_last(bytes: &[u8]) -> Option<(CodePoint, usize)> {
    let &last = bytes.last()?;
    if last.is_ascii() {
        return Some((CodePoint(char::from(last)), 1));
    }
    match bstr::decode_last_utf8(bytes) {
        (Some(ch), width) => Some((CodePoint(ch), width)),
        (None, _) => Some((CodePoint::REPLACEMENT, 1)),
    }
}

/// Lazily decodes `bytes`, yielding each code point with its byte offset.
#[must_use]
pub fn decode_all(bytes: &[u8]) -> Decoder<'_> {
    Decoder {
        bytes,
        front: 0,
        back: bytes.len(),
    }
}

/// Single-pass iterator returned by [`decode_all`] and
/// [`TextView::chars`](crate::TextView::chars).
#[derive(Debug)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    front: usize,
    back: usize,
}

impl Decoder<'_> {
    /// Byte offset of the next code point from the front.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.front
    }
}

impl Iterator for Decoder<'_> {
    type Item = (usize, CodePoint);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.front;
        let (cp, next) = decode_next(&self.bytes[..self.back], start)?;
        self.front = next;
        Some((start, cp))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining.div_ceil(4), Some(remaining))
    }
}

impl DoubleEndedIterator for Decoder<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (cp, width) = decode_last(&self.bytes[self.front..self.back])?;
        self.back -= width;
        Some((self.back, cp))
    }
}

impl FusedIterator for Decoder<'_> {}

/// Number of code points [`decode_all`] yields for `bytes`.
#[must_use]
pub fn count(bytes: &[u8]) -> usize {
    decode_all(bytes).count()
}

/// Whether `bytes` is entirely well-formed UTF-8.
#[must_use]
pub fn is_valid(bytes: &[u8]) -> bool {
    core::str::from_utf8(bytes).is_ok()
}

/// Whether `bytes` begins with a complete encoding, or with a byte that
/// decodes to U+FFFD no matter what follows it. `false` for empty input and
/// for a well-formed prefix that was cut short.
#[must_use]
pub fn is_full(bytes: &[u8]) -> bool {
    let Some(&lead) = bytes.first() else {
        return false;
    };
    match bstr::decode_utf8(bytes) {
        (Some(_), _) => true,
        (None, valid_prefix) => {
            valid_prefix < bytes.len() || bytes.len() >= sequence_len(lead)
        }
    }
}

// Length a lead byte announces; 1 for bytes that never start a sequence.
fn sequence_len(lead: u8) -> usize {
    match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 1,
    }
}

/// Writes the encoding of `cp` into `buf` and returns the bytes written.
pub fn encode_one(cp: CodePoint, buf: &mut [u8; 4]) -> &[u8] {
    let len = cp.0.encode_utf8(buf).len();
    &buf[..len]
}

/// Number of bytes [`encode`] produces for `cps`.
#[must_use]
pub fn encoded_len(cps: &[CodePoint]) -> usize {
    cps.iter().map(|cp| cp.len_utf8()).sum()
}

/// Encodes `cps` as UTF-8.
#[must_use]
pub fn encode(cps: &[CodePoint]) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(cps));
    let mut scratch = [0; 4];
    for &cp in cps {
        out.extend_from_slice(encode_one(cp, &mut scratch));
    }
    out
}

/// Copy of `bytes` with every malformed byte replaced by U+FFFD.
pub(crate) fn to_valid(bytes: &[u8]) -> Vec<u8> {
    if is_valid(bytes) {
        return bytes.to_vec();
    }
    let mut out = Vec::with_capacity(bytes.len() + bytes.len() / 2);
    let mut scratch = [0; 4];
    for (_, cp) in decode_all(bytes) {
        out.extend_from_slice(encode_one(cp, &mut scratch));
    }
    out
}

/// Decodes a byte view into a fresh view of code points.
///
/// Counts first, then fills a buffer of exactly that many code points. The
/// result never shares storage with `bytes`; an absent view stays absent.
#[must_use]
pub fn decode_view(bytes: &SeqView<u8>) -> SeqView<CodePoint> {
    if bytes.is_absent() {
        return SeqView::absent();
    }
    bytes.with_slice(|bytes| {
        let mut cps = Vec::with_capacity(count(bytes));
        cps.extend(decode_all(bytes).map(|(_, cp)| cp));
        SeqView::from_vec(cps)
    })
}

/// Encodes a view of code points into a fresh byte view.
#[must_use]
pub fn encode_view(cps: &SeqView<CodePoint>) -> SeqView<u8> {
    if cps.is_absent() {
        return SeqView::absent();
    }
    cps.with_slice(|cps| SeqView::from_vec(encode(cps)))
}
