use alloc::vec::Vec;
use core::{
    array,
    ops::{Index, IndexMut},
    slice,
};

use crate::{
    error::{RangeError, ViewError},
    view::SeqView,
};

/// A sequence of exactly `N` elements with plain value semantics.
///
/// Unlike a [`SeqView`], a fixed sequence owns its elements inline and never
/// aliases anything: assigning or cloning it copies the elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedSeq<T, const N: usize>([T; N]);

impl<T, const N: usize> FixedSeq<T, N> {
    #[must_use]
    pub const fn new(elements: [T; N]) -> Self {
        Self(elements)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    #[must_use]
    pub const fn as_slice(&self) -> &[T] {
        &self.0
    }

    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0
    }

    #[must_use]
    pub fn into_inner(self) -> [T; N] {
        self.0
    }

    /// Moves the elements into a fresh buffer and returns a view of all `N`.
    #[must_use]
    pub fn into_view(self) -> SeqView<T> {
        SeqView::from_vec(Vec::from(self.0))
    }
}

impl<T: Clone, const N: usize> FixedSeq<T, N> {
    /// Copies the elements into a fresh buffer.
    #[must_use]
    pub fn to_view(&self) -> SeqView<T> {
        SeqView::from_vec(self.0.to_vec())
    }

    /// Copies the elements of a view holding exactly `N` of them.
    ///
    /// # Errors
    ///
    /// [`RangeError::LengthMismatch`] if `view.len() != N`.
    pub fn try_from_view(view: &SeqView<T>) -> Result<Self, ViewError> {
        view.with_slice(|elements| {
            if elements.len() != N {
                return Err(RangeError::LengthMismatch {
                    len: elements.len(),
                    expected: N,
                }
                .into());
            }
            Ok(Self(array::from_fn(|i| elements[i].clone())))
        })
    }
}

impl<T: Default, const N: usize> Default for FixedSeq<T, N> {
    fn default() -> Self {
        Self(array::from_fn(|_| T::default()))
    }
}

impl<T, const N: usize> From<[T; N]> for FixedSeq<T, N> {
    fn from(elements: [T; N]) -> Self {
        Self(elements)
    }
}

impl<T: Clone, const N: usize> TryFrom<&SeqView<T>> for FixedSeq<T, N> {
    type Error = ViewError;

    fn try_from(view: &SeqView<T>) -> Result<Self, ViewError> {
        Self::try_from_view(view)
    }
}

impl<T, const N: usize> Index<usize> for FixedSeq<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.0[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for FixedSeq<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.0[index]
    }
}

impl<T, const N: usize> IntoIterator for FixedSeq<T, N> {
    type Item = T;
    type IntoIter = array::IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a FixedSeq<T, N> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
