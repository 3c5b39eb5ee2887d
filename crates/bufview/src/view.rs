//! Sequence views: value-semantic headers over shared, mutable buffers.

use alloc::vec::Vec;
use core::{fmt, iter::FusedIterator, mem};

use crate::{
    buffer::Buffer,
    error::{FrozenError, RangeError, ViewError},
};

/// A window of `len` elements (and `cap` slots of room) into a [`Buffer`].
///
/// The header is cheap to clone and cloning never copies elements: every
/// clone, reslice and in-place append shares the buffer, and a write through
/// one view is visible through every other view covering the same slots.
///
/// A view with no buffer at all is *absent* ([`SeqView::absent`], also the
/// [`Default`]). It behaves like an empty view but is distinguishable from a
/// zero-length view of a live buffer.
///
/// Sequence views are neither `Send` nor `Sync`: aliasing writers stay on one
/// thread.
pub struct SeqView<T> {
    buf: Option<Buffer<T>>,
    offset: usize,
    len: usize,
    cap: usize,
}

impl<T> SeqView<T> {
    /// The absent view: no buffer, no elements, no capacity.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            buf: None,
            offset: 0,
            len: 0,
            cap: 0,
        }
    }

    pub(crate) fn from_parts(buf: Buffer<T>, offset: usize, len: usize, cap: usize) -> Self {
        debug_assert!(len <= cap);
        debug_assert!(offset + cap <= buf.capacity());
        Self {
            buf: Some(buf),
            offset,
            len,
            cap,
        }
    }

    /// Same window, new length. `len` must not exceed the capacity.
    pub(crate) fn into_len(mut self, len: usize) -> Self {
        debug_assert!(len <= self.cap);
        self.len = len;
        self
    }

    /// Moves the start of the window forward by `count` elements.
    pub(crate) fn advance(mut self, count: usize) -> Self {
        debug_assert!(count <= self.len);
        self.offset += count;
        self.len -= count;
        self.cap -= count;
        self
    }

    /// Takes ownership of `vec`'s elements; the view covers all of them.
    #[must_use]
    pub fn from_vec(vec: Vec<T>) -> Self {
        let len = vec.len();
        Self::from_parts(Buffer::from_vec(vec), 0, len, len)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether this view has no buffer at all.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.buf.is_none()
    }

    /// Position of the first element within the buffer.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn buffer(&self) -> Option<&Buffer<T>> {
        self.buf.as_ref()
    }

    /// Whether the backing buffer has been frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.buf.as_ref().is_some_and(Buffer::is_frozen)
    }

    /// Whether both views are backed by the same buffer.
    #[must_use]
    pub fn shares_buffer(&self, other: &SeqView<T>) -> bool {
        match (&self.buf, &other.buf) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Whether the elements of both views occupy at least one common slot.
    #[must_use]
    pub fn overlaps(&self, other: &SeqView<T>) -> bool {
        self.shares_buffer(other)
            && self.offset < other.offset + other.len
            && other.offset < self.offset + self.len
    }

    /// Reslices to `[low, high)`, keeping the rest of the capacity.
    ///
    /// `high` may go past `len` up to `capacity`, re-exposing slots that an
    /// earlier, shorter header did not show.
    ///
    /// # Errors
    ///
    /// [`RangeError`] unless `low <= high <= capacity`.
    pub fn slice(&self, low: usize, high: usize) -> Result<SeqView<T>, ViewError> {
        self.slice_with_capacity(low, high, self.cap)
    }

    /// Reslices to `[low, high)` with the result's capacity ending at `max`.
    ///
    /// Limiting the capacity makes the next append on the result reallocate
    /// instead of writing into slots that other views may still be using.
    ///
    /// # Errors
    ///
    /// [`RangeError`] unless `low <= high <= max <= capacity`.
    pub fn slice_with_capacity(&self, low: usize, high: usize, max: usize) -> Result<SeqView<T>, ViewError> {
        if low > high || high > max || max > self.cap {
            return Err(RangeError::bounds(low, high, max, self.cap).into());
        }
        Ok(Self {
            buf: self.buf.clone(),
            offset: self.offset + low,
            len: high - low,
            cap: max - low,
        })
    }

    /// Runs `f` over the view's elements.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is being written (for example when `f` is called
    /// from inside [`SeqView::with_slice_mut`] on an aliasing view).
    pub fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        match &self.buf {
            Some(buf) => buf
                .raw()
                .with_read(|slots| f(&slots[self.offset..self.offset + self.len])),
            None => f(&[]),
        }
    }

    /// Runs `f` over the view's elements with write access.
    ///
    /// # Errors
    ///
    /// [`FrozenError`] if the buffer is frozen; `f` is not called.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is already being read or written, which can only
    /// happen re-entrantly from inside another `with_slice*` closure.
    pub fn with_slice_mut<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> Result<R, FrozenError> {
        match &self.buf {
            Some(buf) => buf
                .raw()
                .with_write(|slots| f(&mut slots[self.offset..self.offset + self.len])),
            None => Ok(f(&mut [])),
        }
    }

    /// Stores `value` at `index`, dropping the previous element.
    ///
    /// # Errors
    ///
    /// [`RangeError`] if `index >= len`, [`FrozenError`] if the buffer is
    /// frozen.
    pub fn set(&self, index: usize, value: T) -> Result<(), ViewError> {
        self.replace(index, value).map(drop)
    }

    /// Stores `value` at `index` and returns the previous element.
    ///
    /// # Errors
    ///
    /// As for [`SeqView::set`].
    pub fn replace(&self, index: usize, value: T) -> Result<T, ViewError> {
        if index >= self.len {
            return Err(RangeError::Index { index, len: self.len }.into());
        }
        Ok(self.with_slice_mut(|live| mem::replace(&mut live[index], value))?)
    }
}

impl<T: Default> SeqView<T> {
    /// Allocates a fresh buffer of `capacity` slots and returns an empty view
    /// over it.
    #[must_use]
    pub fn allocate(capacity: usize) -> Self {
        Self::from_parts(Buffer::allocate(capacity), 0, 0, capacity)
    }

    /// Allocates `len` default elements.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self::from_parts(Buffer::allocate(len), 0, len, len)
    }

    /// Allocates `capacity` slots and exposes the first `len` of them.
    ///
    /// # Errors
    ///
    /// [`RangeError`] if `len > capacity`.
    pub fn make(len: usize, capacity: usize) -> Result<Self, ViewError> {
        if len > capacity {
            return Err(RangeError::LengthExceedsCapacity { len, capacity }.into());
        }
        Ok(Self::from_parts(Buffer::allocate(capacity), 0, len, capacity))
    }
}

impl<T: Clone> SeqView<T> {
    /// Clones the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.with_slice(|live| live.get(index).cloned())
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.with_slice(<[T]>::to_vec)
    }

    /// Iterates over clones of the elements.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            view: self,
            front: 0,
            back: self.len,
        }
    }

    /// Copies the elements into a fresh buffer sized exactly to them.
    ///
    /// This is how a small view stops keeping a large buffer alive: the copy
    /// shares nothing with the original. Absent views stay absent.
    #[must_use]
    pub fn clone_owned(&self) -> SeqView<T> {
        if self.is_absent() {
            return Self::absent();
        }
        Self::from_vec(self.to_vec())
    }

    /// Copies `min(self.len(), src.len())` elements from `src` to the front of
    /// this view and returns how many were copied.
    ///
    /// The two views may overlap; the result is as if `src` had been read in
    /// full before anything was written.
    ///
    /// # Errors
    ///
    /// [`FrozenError`] if this view's buffer is frozen.
    pub fn copy_from(&self, src: &SeqView<T>) -> Result<usize, ViewError> {
        let count = self.len.min(src.len);
        if count == 0 {
            return Ok(0);
        }
        if self.shares_buffer(src) {
            let staged = src.with_slice(|s| s[..count].to_vec());
            self.with_slice_mut(|dst| dst[..count].clone_from_slice(&staged))?;
        } else {
            src.with_slice(|s| self.with_slice_mut(|dst| dst[..count].clone_from_slice(&s[..count])))?;
        }
        Ok(count)
    }
}

impl<T> Clone for SeqView<T> {
    fn clone(&self) -> Self {
        Self {
            buf: self.buf.clone(),
            offset: self.offset,
            len: self.len,
            cap: self.cap,
        }
    }
}

impl<T> Default for SeqView<T> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<T> From<Vec<T>> for SeqView<T> {
    fn from(vec: Vec<T>) -> Self {
        Self::from_vec(vec)
    }
}

impl<T> FromIterator<T> for SeqView<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: PartialEq> PartialEq for SeqView<T> {
    fn eq(&self, other: &Self) -> bool {
        self.with_slice(|a| other.with_slice(|b| a == b))
    }
}

impl<T: Eq> Eq for SeqView<T> {}

impl<T: PartialEq> PartialEq<[T]> for SeqView<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.with_slice(|a| a == other)
    }
}

impl<T: PartialEq> PartialEq<&[T]> for SeqView<T> {
    fn eq(&self, other: &&[T]) -> bool {
        self.with_slice(|a| a == *other)
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for SeqView<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.with_slice(|a| a == other)
    }
}

impl<T: fmt::Debug> fmt::Debug for SeqView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_slice(|live| f.debug_list().entries(live).finish())
    }
}

/// Iterator over clones of a view's elements, see [`SeqView::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    view: &'a SeqView<T>,
    front: usize,
    back: usize,
}

impl<T: Clone> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let item = self.view.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.view.get(self.back)
    }
}

impl<T: Clone> ExactSizeIterator for Iter<'_, T> {}

impl<T: Clone> FusedIterator for Iter<'_, T> {}

impl<'a, T: Clone> IntoIterator for &'a SeqView<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn absent_is_not_an_empty_live_view() {
        let absent = SeqView::<u8>::absent();
        let empty = SeqView::<u8>::from_vec(vec![]);
        assert!(absent.is_absent());
        assert!(!empty.is_absent());
        assert_eq!(absent.len(), 0);
        assert_eq!(empty.len(), 0);
        assert_eq!(absent, empty);
        assert!(SeqView::<u8>::default().is_absent());
    }

    #[test]
    fn slicing_an_absent_view_stays_absent() {
        let absent = SeqView::<u8>::absent();
        assert!(absent.slice(0, 0).unwrap().is_absent());
        assert!(absent.slice(0, 1).is_err());
    }

    #[test]
    fn reslice_can_reach_into_capacity() {
        let view = SeqView::from_vec(vec![1, 2, 3, 4, 5]);
        let head = view.slice(0, 2).unwrap();
        assert_eq!(head, [1, 2]);
        assert_eq!(head.capacity(), 5);
        let regrown = head.slice(1, 4).unwrap();
        assert_eq!(regrown, [2, 3, 4]);
        assert_eq!(regrown.offset(), 1);
    }

    #[test]
    fn reslice_bounds_are_never_clamped() {
        let view = SeqView::from_vec(vec![1, 2, 3]);
        assert_eq!(
            view.slice(2, 1).unwrap_err(),
            ViewError::Range(RangeError::Bounds {
                low: 2,
                high: 1,
                max: 3,
                capacity: 3,
            })
        );
        assert!(view.slice(0, 4).is_err());
        assert!(view.slice_with_capacity(0, 2, 4).is_err());
        assert!(view.slice_with_capacity(1, 2, 3).is_ok());
    }

    #[test]
    fn three_index_slice_limits_capacity() {
        let view = SeqView::from_vec(vec![1, 2, 3, 4]);
        let head = view.slice_with_capacity(0, 2, 2).unwrap();
        assert_eq!(head.capacity(), 2);
        assert!(head.slice(0, 3).is_err());
    }

    #[test]
    fn set_and_replace_check_length_not_capacity() {
        let view = SeqView::<i32>::make(2, 4).unwrap();
        view.set(1, 5).unwrap();
        assert_eq!(view.replace(1, 6).unwrap(), 5);
        assert_eq!(
            view.set(2, 1).unwrap_err(),
            ViewError::Range(RangeError::Index { index: 2, len: 2 })
        );
        assert!(SeqView::<i32>::make(3, 2).is_err());
    }

    #[test]
    fn overlap_is_by_element_range() {
        let view = SeqView::from_vec(vec![0u8; 6]);
        let a = view.slice(0, 3).unwrap();
        let b = view.slice(3, 6).unwrap();
        let c = view.slice(2, 4).unwrap();
        assert!(a.shares_buffer(&b));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
        assert!(!a.overlaps(&SeqView::from_vec(vec![0u8; 6])));
    }

    #[test]
    fn clone_owned_detaches() {
        let view = SeqView::from_vec(vec![1, 2, 3, 4]);
        let part = view.slice(1, 3).unwrap();
        let owned = part.clone_owned();
        assert!(!owned.shares_buffer(&part));
        assert_eq!(owned.capacity(), 2);
        view.set(1, 9).unwrap();
        assert_eq!(part, [9, 3]);
        assert_eq!(owned, [2, 3]);
        assert!(SeqView::<u8>::absent().clone_owned().is_absent());
    }

    #[test]
    fn copy_from_handles_overlap_in_both_directions() {
        let view = SeqView::from_vec(vec![1, 2, 3, 4, 5]);
        let n = view.slice(1, 5).unwrap().copy_from(&view.slice(0, 4).unwrap()).unwrap();
        assert_eq!(n, 4);
        assert_eq!(view, [1, 1, 2, 3, 4]);

        let view = SeqView::from_vec(vec![1, 2, 3, 4, 5]);
        view.slice(0, 4).unwrap().copy_from(&view.slice(1, 5).unwrap()).unwrap();
        assert_eq!(view, [2, 3, 4, 5, 5]);
    }

    #[test]
    fn copy_from_copies_the_shorter_length() {
        let dst = SeqView::from_vec(vec![0; 2]);
        let src = SeqView::from_vec(vec![7, 8, 9]);
        assert_eq!(dst.copy_from(&src).unwrap(), 2);
        assert_eq!(dst, [7, 8]);
        assert_eq!(dst.copy_from(&SeqView::absent()).unwrap(), 0);
    }

    #[test]
    fn iter_is_double_ended() {
        let view: SeqView<char> = "abc".chars().collect();
        assert_eq!(view.iter().rev().collect::<Vec<_>>(), vec!['c', 'b', 'a']);
        assert_eq!(view.iter().len(), 3);
        let mut seen = Vec::new();
        for ch in &view {
            seen.push(ch);
        }
        assert_eq!(seen, vec!['a', 'b', 'c']);
    }

    #[test]
    fn debug_lists_live_elements_only() {
        let view = SeqView::from_vec(vec![1, 2, 3]).slice(0, 2).unwrap();
        assert_eq!(alloc::format!("{view:?}"), "[1, 2]");
    }
}
