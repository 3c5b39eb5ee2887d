//! In-place deletion.
//!
//! Removing elements from a view never reallocates, but it must not leave the
//! removed values sitting in slots past the new length either: a later
//! reslice up to the capacity would expose them, and whatever they own would
//! stay alive for as long as the buffer does. Every operation here therefore
//! *releases* the slots it vacates by resetting them to `T::default()`.
//!
//! The released values are collected and dropped only after the buffer's
//! write guard is gone, so a destructor that reads a view of the same buffer
//! does not trip the borrow flag.
//!
//! Releasing needs a value to leave behind, so growth and deletion require
//! `T: Default`. Element types that own resources but have no natural default
//! can be stored as `Option<T>`, which releases to `None`.

use alloc::vec::Vec;
use core::mem;

use crate::{
    error::{FrozenError, RangeError, ViewError},
    view::SeqView,
};

/// How [`SeqView::remove_front`] gets rid of leading elements.
///
/// There is no default: each strategy trades time against what the buffer
/// keeps alive, and the caller has to pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontRemoval {
    /// Move the start of the view forward. O(1). The skipped slots still hold
    /// their values, so anything those values own is retained until the
    /// buffer itself is released.
    Advance,
    /// Release the skipped slots, then move the start forward. O(n) in the
    /// number removed. The slots' space stays part of the buffer.
    AdvanceReleasing,
    /// Shift the remaining elements to the front and release the tail. O(len).
    /// Nothing is retained and the view keeps its offset and capacity.
    Compact,
}

impl<T: Default> SeqView<T> {
    /// Removes the elements in `[start, end)`, shifting the tail left.
    ///
    /// ```
    /// use bufview::SeqView;
    ///
    /// let view = SeqView::from_vec(vec![1, 2, 3, 4, 5]);
    /// let view = view.remove_range(1, 3).unwrap();
    /// assert_eq!(view, [1, 4, 5]);
    /// // The vacated slots hold defaults, not the removed values.
    /// assert_eq!(view.slice(0, 5).unwrap(), [1, 4, 5, 0, 0]);
    /// ```
    ///
    /// # Errors
    ///
    /// [`RangeError`] unless `start <= end <= len`, [`FrozenError`] if the
    /// buffer is frozen.
    pub fn remove_range(self, start: usize, end: usize) -> Result<Self, ViewError> {
        if start > end || end > self.len() {
            return Err(RangeError::Span {
                start,
                end,
                len: self.len(),
            }
            .into());
        }
        let removed = end - start;
        let released = self.with_slice_mut(|live| {
            live[start..].rotate_left(removed);
            let kept = live.len() - removed;
            take_all(&mut live[kept..])
        })?;
        log_release(released.len(), "remove_range");
        let len = self.len() - removed;
        drop(released);
        Ok(self.into_len(len))
    }

    /// Keeps the elements for which `keep` returns `true`, preserving their
    /// order, and releases the rest.
    ///
    /// `keep` sees every element exactly once, front to back. It runs while
    /// the buffer is being written, so it must not read other views of the
    /// same buffer.
    ///
    /// # Errors
    ///
    /// [`FrozenError`] if the buffer is frozen.
    pub fn filter_in_place(self, mut keep: impl FnMut(&T) -> bool) -> Result<Self, ViewError> {
        let (kept, released) = self.with_slice_mut(|live| {
            let mut kept = 0;
            for index in 0..live.len() {
                if keep(&live[index]) {
                    live.swap(kept, index);
                    kept += 1;
                }
            }
            (kept, take_all(&mut live[kept..]))
        })?;
        log_release(released.len(), "filter_in_place");
        drop(released);
        Ok(self.into_len(kept))
    }

    /// Shortens the view to `new_len`, releasing the cut elements. A `new_len`
    /// at or past the current length leaves the elements alone.
    ///
    /// # Errors
    ///
    /// [`FrozenError`] if the buffer is frozen.
    pub fn truncate(self, new_len: usize) -> Result<Self, ViewError> {
        if self.is_frozen() {
            return Err(FrozenError.into());
        }
        if new_len >= self.len() {
            return Ok(self);
        }
        let released = self.with_slice_mut(|live| take_all(&mut live[new_len..]))?;
        log_release(released.len(), "truncate");
        drop(released);
        Ok(self.into_len(new_len))
    }

    /// Moves the last element out, leaving its slot released.
    ///
    /// # Errors
    ///
    /// [`FrozenError`] if the buffer is frozen.
    pub fn pop(self) -> Result<(Self, Option<T>), ViewError> {
        if self.is_frozen() {
            return Err(FrozenError.into());
        }
        let Some(last) = self.len().checked_sub(1) else {
            return Ok((self, None));
        };
        let value = self.with_slice_mut(|live| mem::take(&mut live[last]))?;
        Ok((self.into_len(last), Some(value)))
    }

    /// Removes the first `count` elements using the given strategy.
    ///
    /// ```
    /// use bufview::{FrontRemoval, SeqView};
    ///
    /// let queue = SeqView::from_vec(vec![1, 2, 3, 4]);
    /// let fast = queue.clone().remove_front(1, FrontRemoval::Advance).unwrap();
    /// assert_eq!((fast.offset(), fast.capacity()), (1, 3));
    ///
    /// let compact = queue.remove_front(1, FrontRemoval::Compact).unwrap();
    /// assert_eq!((compact.offset(), compact.capacity()), (0, 4));
    /// assert_eq!(compact, [2, 3, 4]);
    /// ```
    ///
    /// # Errors
    ///
    /// [`RangeError`] if `count > len`. [`FrozenError`] if the buffer is
    /// frozen and the strategy writes to it ([`FrontRemoval::Advance`] never
    /// does).
    pub fn remove_front(self, count: usize, strategy: FrontRemoval) -> Result<Self, ViewError> {
        if count > self.len() {
            return Err(RangeError::Span {
                start: 0,
                end: count,
                len: self.len(),
            }
            .into());
        }
        match strategy {
            FrontRemoval::Advance => Ok(self.advance(count)),
            FrontRemoval::AdvanceReleasing => {
                let released = self.with_slice_mut(|live| take_all(&mut live[..count]))?;
                log_release(released.len(), "remove_front");
                drop(released);
                Ok(self.advance(count))
            }
            FrontRemoval::Compact => self.remove_range(0, count),
        }
    }
}

fn take_all<T: Default>(slots: &mut [T]) -> Vec<T> {
    slots.iter_mut().map(mem::take).collect()
}

fn log_release(count: usize, operation: &str) {
    if count > 0 {
        log::trace!("{operation}: released {count} slots");
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, vec};

    use rstest::rstest;

    use super::*;

    fn tracked(payload: &Rc<()>, n: usize) -> SeqView<Option<Rc<()>>> {
        (0..n).map(|_| Some(Rc::clone(payload))).collect()
    }

    #[test]
    fn remove_range_releases_the_vacated_tail() {
        let payload = Rc::new(());
        let view = tracked(&payload, 5);
        let whole = view.clone();
        let view = view.remove_range(1, 3).unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(Rc::strong_count(&payload), 1 + 3);
        assert_eq!(whole.get(3), Some(None));
        assert_eq!(whole.get(4), Some(None));
    }

    #[test]
    fn owners_without_default_release_through_option() {
        struct Handle(Rc<()>);

        let payload = Rc::new(());
        let view: SeqView<Option<Handle>> =
            (0..3).map(|_| Some(Handle(Rc::clone(&payload)))).collect();
        let whole = view.clone();
        let view = view.remove_range(0, 2).unwrap();
        assert_eq!(Rc::strong_count(&payload), 1 + 1);
        assert!(whole.with_slice(|slots| slots[1..].iter().all(Option::is_none)));
        let kept = view.with_slice(|slots| slots[0].as_ref().map(|h| Rc::clone(&h.0)));
        assert!(kept.is_some_and(|rc| Rc::ptr_eq(&rc, &payload)));
    }

    #[test]
    fn remove_range_bounds() {
        let view = SeqView::from_vec(vec![1, 2, 3]);
        assert_eq!(
            view.clone().remove_range(2, 4).unwrap_err(),
            ViewError::Range(RangeError::Span {
                start: 2,
                end: 4,
                len: 3
            })
        );
        assert!(view.clone().remove_range(2, 1).is_err());
        assert_eq!(view.remove_range(3, 3).unwrap(), [1, 2, 3]);
    }

    #[test]
    fn removed_values_never_reappear_after_append() {
        let view = SeqView::from_vec(vec!['a', 'b', 'c', 'd']);
        let stale = view.clone();
        let view = view.remove_range(0, 2).unwrap().push('x');
        assert!(view.shares_buffer(&stale));
        assert_eq!(view, ['c', 'd', 'x']);
        assert_eq!(stale, ['c', 'd', 'x', char::default()]);
    }

    #[test]
    fn filter_keeps_order_and_visits_once() {
        let view = SeqView::from_vec(vec![1, 2, 3, 4, 5, 6]);
        let mut seen = vec![];
        let evens = view
            .clone()
            .filter_in_place(|&x| {
                seen.push(x);
                x % 2 == 0
            })
            .unwrap();
        assert_eq!(seen, [1, 2, 3, 4, 5, 6]);
        assert_eq!(evens, [2, 4, 6]);
        assert_eq!(view, [2, 4, 6, 0, 0, 0]);
    }

    #[test]
    fn truncate_and_pop_release() {
        let payload = Rc::new(());
        let view = tracked(&payload, 4).truncate(2).unwrap();
        assert_eq!(Rc::strong_count(&payload), 3);
        let (view, last) = view.pop().unwrap();
        assert!(last.is_some());
        drop(last);
        assert_eq!(Rc::strong_count(&payload), 2);
        assert_eq!(view.len(), 1);
        let (view, _) = view.pop().unwrap();
        let (view, none) = view.pop().unwrap();
        assert!(none.is_none());
        assert!(view.is_empty());
        assert_eq!(view.truncate(5).unwrap().len(), 0);
    }

    #[rstest]
    #[case::advance(FrontRemoval::Advance, 1 + 4, 2)]
    #[case::advance_releasing(FrontRemoval::AdvanceReleasing, 1 + 2, 2)]
    #[case::compact(FrontRemoval::Compact, 1 + 2, 0)]
    fn front_removal_strategies(
        #[case] strategy: FrontRemoval,
        #[case] expected_count: usize,
        #[case] expected_offset: usize,
    ) {
        let payload = Rc::new(());
        let view = tracked(&payload, 4).remove_front(2, strategy).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view.offset(), expected_offset);
        assert_eq!(Rc::strong_count(&payload), expected_count);
    }

    #[test]
    fn remove_front_past_len_is_an_error() {
        let view = SeqView::from_vec(vec![1, 2]);
        assert!(view.remove_front(3, FrontRemoval::Advance).is_err());
    }

    #[test]
    fn frozen_buffers_reject_deletion() {
        let view = SeqView::from_vec(b"abcd".to_vec());
        let _ = view.buffer().unwrap().freeze();
        let frozen = ViewError::Frozen(FrozenError);
        assert_eq!(view.clone().remove_range(0, 1).unwrap_err(), frozen);
        assert_eq!(view.clone().filter_in_place(|_| true).unwrap_err(), frozen);
        assert_eq!(view.clone().truncate(1).unwrap_err(), frozen);
        assert_eq!(view.clone().pop().unwrap_err(), frozen);
        assert_eq!(
            view.clone()
                .remove_front(1, FrontRemoval::AdvanceReleasing)
                .unwrap_err(),
            frozen
        );
        assert_eq!(view.remove_front(1, FrontRemoval::Advance).unwrap(), *b"bcd");
    }
}
