//! The append engine.
//!
//! An append either writes into the spare capacity of the view's buffer (the
//! returned header points at the same buffer, with a longer length) or, when
//! the capacity is exhausted or the buffer is frozen, copies everything into a
//! fresh buffer sized by [`GrowthPolicy`] and returns a header detached from
//! the old one. Either way the caller must keep the returned header: the old
//! one is still valid but does not see the new elements.

use alloc::vec::Vec;
use core::mem;

use crate::{
    buffer::Buffer,
    error::{RangeError, ViewError},
    options::GrowthPolicy,
    view::SeqView,
};

impl<T: Clone + Default> SeqView<T> {
    /// Appends clones of `elems` using the default [`GrowthPolicy`].
    ///
    /// ```
    /// use bufview::SeqView;
    ///
    /// let base = SeqView::<u8>::allocate(4).append(b"ab");
    /// let grown = base.clone().append(b"cd");
    /// assert!(grown.shares_buffer(&base)); // fit in place
    /// assert_eq!(base, *b"ab"); // the old header sees only its own length
    ///
    /// let spilled = grown.clone().append(b"e");
    /// assert!(!spilled.shares_buffer(&grown));
    /// assert_eq!(spilled, *b"abcde");
    /// ```
    ///
    /// # Panics
    ///
    /// Panics with "capacity overflow" if the new length overflows `usize`.
    ///
    /// Panics with "buffer is already borrowed" if `elems` is borrowed from
    /// this view's own buffer (for example from inside
    /// [`SeqView::with_slice`]) and the append fits in place. Use
    /// [`SeqView::append_view`] to append from the same buffer.
    #[must_use]
    pub fn append(self, elems: &[T]) -> Self {
        self.append_with(elems, &GrowthPolicy::default())
    }

    /// Appends clones of `elems`, growing according to `policy`.
    ///
    /// # Panics
    ///
    /// As for [`SeqView::append`].
    #[must_use]
    pub fn append_with(self, elems: &[T], policy: &GrowthPolicy) -> Self {
        if elems.is_empty() {
            return self;
        }
        let required = self
            .len()
            .checked_add(elems.len())
            .unwrap_or_else(|| capacity_overflow());
        if required <= self.capacity() && !self.is_frozen() {
            let (start, end) = (self.offset() + self.len(), self.offset() + required);
            let wrote = self.buffer().is_some_and(|buf| {
                buf.raw()
                    .with_write(|slots| slots[start..end].clone_from_slice(elems))
                    .is_ok()
            });
            if wrote {
                return self.into_len(required);
            }
        }
        self.reallocate(required, policy, |live, staged| {
            staged.extend_from_slice(live);
            staged.extend_from_slice(elems);
        })
    }

    /// Appends a single element.
    ///
    /// # Panics
    ///
    /// As for [`SeqView::append`].
    #[must_use]
    pub fn push(self, value: T) -> Self {
        let mut pending = Some(value);
        if self.len() < self.capacity() && !self.is_frozen() {
            let index = self.offset() + self.len();
            let wrote = self.buffer().is_some_and(|buf| {
                buf.raw()
                    .with_write(|slots| {
                        if let Some(value) = pending.take() {
                            slots[index] = value;
                        }
                    })
                    .is_ok()
            });
            if wrote {
                let len = self.len() + 1;
                return self.into_len(len);
            }
        }
        let required = self
            .len()
            .checked_add(1)
            .unwrap_or_else(|| capacity_overflow());
        self.reallocate(required, &GrowthPolicy::default(), |live, staged| {
            staged.extend_from_slice(live);
            staged.extend(pending);
        })
    }

    /// Appends the elements of `other`, which may alias this view's buffer
    /// (including the slots being written).
    ///
    /// A source that shares the buffer is copied out before anything is
    /// written, so the result is as if `other` had been read first.
    #[must_use]
    pub fn append_view(self, other: &SeqView<T>) -> Self {
        if self.shares_buffer(other) {
            let staged = other.to_vec();
            self.append(&staged)
        } else {
            other.with_slice(|elems| self.append(elems))
        }
    }

    /// Inserts clones of `elems` before position `index`.
    ///
    /// Shifts in place when the capacity allows it, otherwise reallocates like
    /// [`SeqView::append`].
    ///
    /// # Errors
    ///
    /// [`RangeError`] if `index > len`.
    ///
    /// # Panics
    ///
    /// As for [`SeqView::append`]: `elems` must not be borrowed from this
    /// view's own buffer when the insertion fits in place.
    pub fn insert(self, index: usize, elems: &[T]) -> Result<Self, ViewError> {
        if index > self.len() {
            return Err(RangeError::Index {
                index,
                len: self.len(),
            }
            .into());
        }
        if elems.is_empty() {
            return Ok(self);
        }
        let tail = self.len();
        let required = tail
            .checked_add(elems.len())
            .unwrap_or_else(|| capacity_overflow());
        if required <= self.capacity() && !self.is_frozen() {
            if let Some(buf) = self.buffer() {
                let (start, end) = (self.offset(), self.offset() + required);
                buf.raw().with_write(|slots| {
                    let window = &mut slots[start..end];
                    window[tail..].clone_from_slice(elems);
                    window[index..].rotate_right(elems.len());
                })?;
                return Ok(self.into_len(required));
            }
        }
        Ok(self.reallocate(required, &GrowthPolicy::default(), |live, staged| {
            staged.extend_from_slice(&live[..index]);
            staged.extend_from_slice(elems);
            staged.extend_from_slice(&live[index..]);
        }))
    }

    /// Makes sure `additional` more elements can be appended in place.
    ///
    /// Returns `self` unchanged when they already fit; otherwise the elements
    /// move to a fresh buffer.
    #[must_use]
    pub fn reserve(self, additional: usize) -> Self {
        if self.capacity() - self.len() >= additional && !self.is_frozen() {
            return self;
        }
        let required = self
            .len()
            .checked_add(additional)
            .unwrap_or_else(|| capacity_overflow());
        self.reallocate(required, &GrowthPolicy::default(), |live, staged| {
            staged.extend_from_slice(live);
        })
    }

    fn reallocate(
        self,
        required: usize,
        policy: &GrowthPolicy,
        build: impl FnOnce(&[T], &mut Vec<T>),
    ) -> Self {
        let capacity = policy.next_capacity(self.capacity(), required, mem::size_of::<T>());
        let mut staged = Vec::with_capacity(capacity);
        self.with_slice(|live| build(live, &mut staged));
        let len = staged.len();
        log::trace!(
            "reallocating view: capacity {} -> {capacity}, {} elements carried over",
            self.capacity(),
            self.len()
        );
        staged.resize_with(capacity, T::default);
        SeqView::from_parts(Buffer::from_vec(staged), 0, len, capacity)
    }
}

// One central function responsible for reporting capacity overflows.
#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}
