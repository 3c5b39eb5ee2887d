//! Immutable text over frozen byte buffers.

use alloc::{string::String, sync::Arc, vec::Vec};
use core::{
    borrow::Borrow,
    cmp::Ordering,
    fmt::{self, Write as _},
    hash::{Hash, Hasher},
    str,
};

use crate::{
    buffer::{Buffer, RawBuffer},
    error::{RangeError, ViewError},
    utf8::{self, CodePoint, Decoder},
    view::SeqView,
};

/// A read-only window of bytes, usually UTF-8 text.
///
/// A text view only ever points at frozen storage: nothing can write those
/// bytes again, so text views are `Send + Sync`, substrings share the storage
/// without copying, and the storage lives until the last view (text or
/// sequence) of it is dropped.
///
/// The bytes are not required to be valid UTF-8. Decoding (see
/// [`TextView::chars`]) substitutes U+FFFD for malformed bytes instead of
/// failing.
///
/// ```
/// use bufview::TextView;
///
/// let greeting = TextView::from("hello, world");
/// let world = greeting.substr(7, 12).unwrap();
/// assert_eq!(world, "world");
/// assert_eq!(world.char_count(), 5);
/// ```
#[derive(Clone)]
pub struct TextView {
    buf: Option<Arc<RawBuffer<u8>>>,
    offset: usize,
    len: usize,
}

// SAFETY: the storage behind a text view is frozen before the view is built.
// Frozen storage is never written and its reads do not touch the borrow flag,
// so sharing it across threads cannot race. The remaining state (reference
// count, release routine for plain bytes) is thread-safe.
unsafe impl Send for TextView {}
// SAFETY: see above.
unsafe impl Sync for TextView {}

impl TextView {
    /// The empty text, backed by no storage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: None,
            offset: 0,
            len: 0,
        }
    }

    pub(crate) fn from_frozen(raw: Arc<RawBuffer<u8>>, offset: usize, len: usize) -> Self {
        debug_assert!(raw.is_frozen());
        debug_assert!(offset + len <= raw.capacity());
        Self {
            buf: Some(raw),
            offset,
            len,
        }
    }

    /// Copies `bytes` into fresh frozen storage.
    #[must_use]
    pub fn from_literal(bytes: &[u8]) -> Self {
        Self::from(bytes.to_vec())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.buf {
            Some(raw) => &raw.frozen_slots()[self.offset..self.offset + self.len],
            None => &[],
        }
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes in `[low, high)`, sharing this view's storage.
    ///
    /// Offsets are in bytes and need not fall on character boundaries.
    ///
    /// # Errors
    ///
    /// [`RangeError`] unless `low <= high <= len`.
    pub fn substr(&self, low: usize, high: usize) -> Result<TextView, ViewError> {
        if low > high || high > self.len {
            return Err(RangeError::Span {
                start: low,
                end: high,
                len: self.len,
            }
            .into());
        }
        Ok(Self {
            buf: self.buf.clone(),
            offset: self.offset + low,
            len: high - low,
        })
    }

    /// Copies both texts, in order, into new storage.
    #[must_use]
    pub fn concat(&self, other: &TextView) -> TextView {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut bytes = Vec::with_capacity(self.len + other.len);
        bytes.extend_from_slice(self.as_bytes());
        bytes.extend_from_slice(other.as_bytes());
        Self::from(bytes)
    }

    /// Decodes the text, yielding each code point with its byte offset.
    #[must_use]
    pub fn chars(&self) -> Decoder<'_> {
        utf8::decode_all(self.as_bytes())
    }

    /// Number of code points [`TextView::chars`] yields.
    #[must_use]
    pub fn char_count(&self) -> usize {
        utf8::count(self.as_bytes())
    }

    #[must_use]
    pub fn is_valid_utf8(&self) -> bool {
        utf8::is_valid(self.as_bytes())
    }

    /// The text as `&str`, if it is valid UTF-8.
    #[must_use]
    pub fn to_str(&self) -> Option<&str> {
        str::from_utf8(self.as_bytes()).ok()
    }

    /// Decodes into a fresh, mutable sequence of code points.
    #[must_use]
    pub fn to_code_points(&self) -> SeqView<CodePoint> {
        let bytes = self.as_bytes();
        let mut cps = Vec::with_capacity(utf8::count(bytes));
        cps.extend(utf8::decode_all(bytes).map(|(_, cp)| cp));
        SeqView::from_vec(cps)
    }

    /// Encodes `cps` into new text.
    #[must_use]
    pub fn from_code_points(cps: &SeqView<CodePoint>) -> TextView {
        cps.with_slice(|cps| Self::from(utf8::encode(cps)))
    }

    /// The same bytes as a sequence view, without copying.
    ///
    /// The view's capacity equals its length and its storage is frozen:
    /// element writes fail with [`FrozenError`](crate::FrozenError) and
    /// appends move to a fresh buffer, so the text is never changed.
    #[must_use]
    pub fn as_bytes_view(&self) -> SeqView<u8> {
        match &self.buf {
            Some(raw) => SeqView::from_parts(
                Buffer::from_raw(Arc::clone(raw)),
                self.offset,
                self.len,
                self.len,
            ),
            None => SeqView::absent(),
        }
    }

    /// Copies a byte view into new text, replacing malformed bytes with
    /// U+FFFD.
    #[must_use]
    pub fn from_bytes_view(bytes: &SeqView<u8>) -> TextView {
        bytes.with_slice(|bytes| Self::from(utf8::to_valid(bytes)))
    }
}

impl SeqView<u8> {
    /// Freezes the backing buffer and returns this view's bytes as text.
    ///
    /// Every view of the buffer becomes read-only, including views that do
    /// not overlap this one.
    ///
    /// # Panics
    ///
    /// Panics if called while a read or write of the buffer is in progress.
    #[must_use]
    pub fn freeze(&self) -> TextView {
        match self.buffer() {
            Some(buf) => {
                buf.raw().freeze();
                TextView::from_frozen(Arc::clone(buf.raw()), self.offset(), self.len())
            }
            None => TextView::new(),
        }
    }
}

impl Default for TextView {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for TextView {
    fn from(bytes: Vec<u8>) -> Self {
        Buffer::from_vec(bytes).freeze()
    }
}

impl From<String> for TextView {
    fn from(text: String) -> Self {
        Self::from(text.into_bytes())
    }
}

impl From<&str> for TextView {
    fn from(text: &str) -> Self {
        Self::from_literal(text.as_bytes())
    }
}

impl AsRef<[u8]> for TextView {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Borrow<[u8]> for TextView {
    fn borrow(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for TextView {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for TextView {}

impl PartialOrd for TextView {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TextView {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for TextView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl PartialEq<str> for TextView {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for TextView {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<[u8]> for TextView {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for TextView {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

/// Lossy: malformed bytes print as U+FFFD, one per byte.
impl fmt::Display for TextView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.to_str() {
            return f.write_str(text);
        }
        for (_, cp) in self.chars() {
            f.write_char(cp.as_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for TextView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(bstr::BStr::new(self.as_bytes()), f)
    }
}
