//! Reinterpretation of a view's elements as another element type.

use core::mem;

use crate::{
    buffer::Buffer,
    error::{AlignmentError, ViewError},
    view::SeqView,
};

/// Element types for which every bit pattern of their size is a valid value.
///
/// # Safety
///
/// Implementors must have no padding, no invalid bit patterns and no drop
/// glue. Reading any initialized bytes of `size_of::<Self>()` as `Self` must
/// be sound.
pub unsafe trait Plain: Copy + Default + 'static {}

macro_rules! plain {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: primitive numbers accept every bit pattern.
            unsafe impl Plain for $ty {}
        )*
    };
}

plain!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

impl<T: Plain> SeqView<T> {
    /// Views the same slots as elements of type `U`, without copying.
    ///
    /// The result shares the buffer (writes through either view are visible
    /// through the other, and a frozen buffer stays frozen), keeps the same
    /// offset, length and capacity, and keeps the buffer alive like any other
    /// view.
    ///
    /// Only the layout is checked. Whether the values still *mean* anything
    /// as `U` is the caller's business: for example, the bits of non-negative
    /// finite `f64`s compare in the same order as `i64`s, but negative values,
    /// NaNs and signed zeros do not. A violated assumption yields unexpected
    /// numbers, never undefined behaviour.
    ///
    /// ```
    /// use bufview::SeqView;
    ///
    /// let floats = SeqView::from_vec(vec![0.5f64, 1.0, 3.0]);
    /// let bits = floats.reinterpret::<i64>().unwrap();
    /// assert!(bits.get(0) < bits.get(1) && bits.get(1) < bits.get(2));
    /// ```
    ///
    /// # Errors
    ///
    /// [`AlignmentError::SizeMismatch`] if `T` and `U` differ in size,
    /// [`AlignmentError::Misaligned`] if the storage is not aligned for `U`.
    /// The primitive [`Plain`] types all have an alignment equal to their
    /// size, so the second error only arises for user `Plain` types whose
    /// alignment is smaller than their size.
    pub fn reinterpret<U: Plain>(&self) -> Result<SeqView<U>, ViewError> {
        let (from, to) = (mem::size_of::<T>(), mem::size_of::<U>());
        if from != to {
            return Err(AlignmentError::SizeMismatch { from, to }.into());
        }
        let Some(buf) = self.buffer() else {
            return Ok(SeqView::absent());
        };
        // Sizes are multiples of alignment, so an aligned base keeps every
        // slot aligned.
        let (address, align) = (buf.raw().address(), mem::align_of::<U>());
        if address % align != 0 {
            return Err(AlignmentError::Misaligned { address, align }.into());
        }
        // SAFETY: equal sizes and an aligned base were checked above, and
        // `U: Plain` accepts whatever bits the slots hold.
        let raw = unsafe { buf.raw().reinterpret::<U>() };
        log::trace!(
            "reinterpreting {} slots as {}",
            buf.capacity(),
            core::any::type_name::<U>()
        );
        Ok(SeqView::from_parts(
            Buffer::from_raw(raw),
            self.offset(),
            self.len(),
            self.capacity(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::error::FrozenError;

    #[test]
    fn views_alias_across_the_cast() {
        let signed = SeqView::from_vec(vec![-1i32, 2, 3]);
        let unsigned = signed.reinterpret::<u32>().unwrap();
        assert_eq!(unsigned.get(0), Some(u32::MAX));
        unsigned.set(1, 7).unwrap();
        assert_eq!(signed, [-1, 7, 3]);
        assert_eq!(signed.buffer().unwrap().handle_count(), 2);
    }

    #[test]
    fn window_survives_the_cast() {
        let view = SeqView::from_vec(vec![1u64, 2, 3, 4]).slice(1, 3).unwrap();
        let cast = view.reinterpret::<i64>().unwrap();
        assert_eq!(
            (cast.offset(), cast.len(), cast.capacity()),
            (view.offset(), view.len(), view.capacity())
        );
        assert_eq!(cast, [2, 3]);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let view = SeqView::from_vec(vec![1u32, 2]);
        assert_eq!(
            view.reinterpret::<u64>().unwrap_err(),
            ViewError::Alignment(AlignmentError::SizeMismatch { from: 4, to: 8 })
        );
    }

    #[test]
    fn float_bits_order_only_for_non_negative_values() {
        let floats = SeqView::from_vec(vec![0.0f64, 0.25, 1.5, 1e300, -1.0, -2.0]);
        let bits = floats.reinterpret::<i64>().unwrap().to_vec();
        assert!(bits[..4].windows(2).all(|pair| pair[0] < pair[1]));
        // -1.0 > -2.0, but their bits compare the other way round.
        assert!(bits[4] < bits[5]);
    }

    #[test]
    fn nan_and_signed_zero_bits_carry_no_ordering() {
        let floats = SeqView::from_vec(vec![f64::NAN, 1.0]);
        let bits = floats.reinterpret::<i64>().unwrap().to_vec();
        // NaN is unordered as a float, yet its bits sort above 1.0.
        assert_eq!(floats.get(0).unwrap().partial_cmp(&1.0), None);
        assert!(bits[0] > bits[1]);

        let floats = SeqView::from_vec(vec![f64::INFINITY, -0.0, 0.0]);
        let bits = floats.reinterpret::<i64>().unwrap().to_vec();
        // -0.0 == 0.0 as floats, but not as bits.
        assert_ne!(bits[1], bits[2]);
        assert!(bits[1] < bits[2]);
        assert!(bits[2] < bits[0]);
    }

    #[test]
    fn byte_aligned_plain_type_checks_the_base_address() {
        #[derive(Debug, Clone, Copy, Default, PartialEq)]
        #[repr(C, align(1))]
        struct Packed([u8; 8]);
        // SAFETY: a byte array with no padding accepts every bit pattern.
        unsafe impl Plain for Packed {}

        let view = SeqView::from_vec(vec![Packed([1, 0, 0, 0, 0, 0, 0, 0])]);
        let address = view.buffer().unwrap().raw().address();
        match view.reinterpret::<u64>() {
            Ok(words) => {
                assert_eq!(address % 8, 0);
                assert_eq!(words.get(0), Some(u64::from_ne_bytes([1, 0, 0, 0, 0, 0, 0, 0])));
            }
            Err(err) => assert_eq!(
                err,
                ViewError::Alignment(AlignmentError::Misaligned { address, align: 8 })
            ),
        }
        // The reverse direction never needs more than byte alignment.
        let words = SeqView::from_vec(vec![7u64]);
        assert_eq!(
            words.reinterpret::<Packed>().unwrap().get(0),
            Some(Packed(7u64.to_ne_bytes()))
        );
    }

    #[test]
    fn frozen_storage_stays_frozen() {
        let bytes = SeqView::from_vec(vec![1u8, 2]);
        let _ = bytes.freeze();
        let signed = bytes.reinterpret::<i8>().unwrap();
        assert!(signed.is_frozen());
        assert_eq!(signed.set(0, -1).unwrap_err(), ViewError::Frozen(FrozenError));
    }

    #[test]
    fn cast_view_outlives_the_original() {
        let cast = SeqView::from_vec(vec![1.0f32]).reinterpret::<u32>().unwrap();
        assert_eq!(cast.get(0), Some(1.0f32.to_bits()));
        assert!(SeqView::<u8>::absent().reinterpret::<i8>().unwrap().is_absent());
    }
}
