//! Backing storage shared by sequence and text views.
//!
//! A [`Buffer`] is a reference-counted, fixed-capacity block of initialized
//! slots. Views hold a handle to it plus an `(offset, len, cap)` window, so any
//! number of views may alias one allocation and observe each other's writes.
//!
//! Access discipline
//! - Reads and writes go through a borrow flag kept next to the slots, with
//!   the same rules as `RefCell`: any number of readers, or exactly one writer.
//!   Violations can only come from re-entrant use on one thread (handles are
//!   `!Send`), and they panic.
//! - Freezing is one-way. Every write path checks the frozen flag *before*
//!   touching the borrow flag, and reads of frozen storage skip the borrow flag
//!   entirely, so frozen storage can be read from any thread with no
//!   coordination (see [`TextView`]).
//! - The storage remembers how to release the element type it was allocated
//!   with. A reinterpretation cast may re-type the handle, but the final drop
//!   still runs the original element type's destructor and deallocation.

use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::{
    fmt,
    marker::PhantomData,
    ptr::{self, NonNull},
    slice,
    sync::atomic::{AtomicBool, AtomicIsize, Ordering},
};

use crate::{
    error::{FrozenError, RangeError, ViewError},
    text::TextView,
    view::SeqView,
};

const WRITING: isize = -1;

/// Raw shared storage.
///
/// `#[repr(C)]` with the element type only in `PhantomData`: the layout of
/// `RawBuffer<T>` does not depend on `T`, which is what lets
/// [`RawBuffer::reinterpret`] re-type an `Arc` in place.
#[repr(C)]
pub(crate) struct RawBuffer<T> {
    ptr: NonNull<u8>,
    capacity: usize,
    release: unsafe fn(NonNull<u8>, usize),
    frozen: AtomicBool,
    borrow: AtomicIsize,
    _marker: PhantomData<T>,
}

/// Drops the `Box<[T]>` that `RawBuffer::from_vec` leaked.
///
/// # Safety
///
/// `ptr` and `len` must be the parts of a leaked `Box<[T]>`, and this must be
/// called at most once for them.
unsafe fn release_boxed<T>(ptr: NonNull<u8>, len: usize) {
    let slots = ptr::slice_from_raw_parts_mut(ptr.cast::<T>().as_ptr(), len);
    // SAFETY: guaranteed by the caller.
    drop(unsafe { Box::from_raw(slots) });
}

impl<T> RawBuffer<T> {
    fn from_vec(vec: Vec<T>) -> Self {
        let slots: &mut [T] = Box::leak(vec.into_boxed_slice());
        let capacity = slots.len();
        Self {
            ptr: NonNull::from(slots).cast::<u8>(),
            capacity,
            release: release_boxed::<T>,
            frozen: AtomicBool::new(false),
            borrow: AtomicIsize::new(0),
            _marker: PhantomData,
        }
    }

    #[inline]
    fn slots_ptr(&self) -> *mut T {
        self.ptr.cast::<T>().as_ptr()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    fn read(&self) -> ReadGuard<'_> {
        if self.is_frozen() {
            return ReadGuard { flag: None };
        }
        let prev = self.borrow.fetch_add(1, Ordering::Acquire);
        if prev < 0 {
            self.borrow.fetch_sub(1, Ordering::Release);
            panic!("buffer is already mutably borrowed");
        }
        ReadGuard {
            flag: Some(&self.borrow),
        }
    }

    fn write(&self) -> Result<WriteGuard<'_>, FrozenError> {
        if self.is_frozen() {
            return Err(FrozenError);
        }
        if self
            .borrow
            .compare_exchange(0, WRITING, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            panic!("buffer is already borrowed");
        }
        Ok(WriteGuard { flag: &self.borrow })
    }

    /// Runs `f` over every slot of the buffer with shared access.
    ///
    /// # Panics
    ///
    /// Panics if called while a write to this buffer is in progress.
    pub(crate) fn with_read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let _guard = self.read();
        // SAFETY: the slots come from a `Box<[T]>` of `capacity` initialized
        // elements whose alignment the element type satisfies (checked by
        // `reinterpret` when re-typed). The guard excludes writers for the
        // lifetime of the borrow, or the buffer is frozen and has none.
        let slots = unsafe { slice::from_raw_parts(self.slots_ptr(), self.capacity) };
        f(slots)
    }

    /// Runs `f` over every slot of the buffer with exclusive access.
    ///
    /// # Panics
    ///
    /// Panics if called while any other access to this buffer is in progress.
    pub(crate) fn with_write<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> Result<R, FrozenError> {
        let _guard = self.write()?;
        // SAFETY: as in `with_read`; the write guard is exclusive.
        let slots = unsafe { slice::from_raw_parts_mut(self.slots_ptr(), self.capacity) };
        Ok(f(slots))
    }

    /// Borrows every slot of a frozen buffer for as long as the buffer lives.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is not frozen.
    pub(crate) fn frozen_slots(&self) -> &[T] {
        assert!(self.is_frozen(), "shared read of a mutable buffer");
        // SAFETY: frozen storage is never written again and never hands out
        // mutable access, so a shared borrow tied to `&self` is sound.
        unsafe { slice::from_raw_parts(self.slots_ptr(), self.capacity) }
    }

    pub(crate) fn freeze(&self) {
        if self.is_frozen() {
            return;
        }
        // Exclude in-flight readers and writers on this thread while flipping.
        let _guard = self.write();
        self.frozen.store(true, Ordering::Release);
        log::trace!("froze buffer of {} slots at {:#x}", self.capacity, self.address());
    }

    /// Re-types a handle to this storage.
    ///
    /// # Safety
    ///
    /// `T` and `U` must have the same size, the slot address must be aligned
    /// for `U`, and every bit pattern present in the slots must be a valid `U`.
    pub(crate) unsafe fn reinterpret<U>(self: &Arc<Self>) -> Arc<RawBuffer<U>> {
        let raw = Arc::into_raw(Arc::clone(self)).cast::<RawBuffer<U>>();
        // SAFETY: `RawBuffer` is `repr(C)` and only mentions its element type
        // in `PhantomData`, so both instantiations share size and alignment.
        // Element compatibility is guaranteed by the caller.
        unsafe { Arc::from_raw(raw) }
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        // SAFETY: `release` and the parts were recorded together in `from_vec`
        // and the storage is dropped exactly once.
        unsafe { (self.release)(self.ptr, self.capacity) }
    }
}

struct ReadGuard<'a> {
    flag: Option<&'a AtomicIsize>,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        if let Some(flag) = self.flag {
            flag.fetch_sub(1, Ordering::Release);
        }
    }
}

struct WriteGuard<'a> {
    flag: &'a AtomicIsize,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(0, Ordering::Release);
    }
}

/// A shared, fixed-capacity block of elements.
///
/// Cloning a `Buffer` clones the handle, not the elements. The storage is
/// released when the last handle (buffer, sequence view or text view) goes
/// away.
///
/// ```
/// use bufview::Buffer;
///
/// let buffer = Buffer::<u32>::allocate(4);
/// let head = buffer.view(0, 2, 2).unwrap();
/// let whole = buffer.view(0, 4, 4).unwrap();
/// head.set(1, 7).unwrap();
/// assert_eq!(whole, [0, 7, 0, 0]);
/// ```
pub struct Buffer<T> {
    raw: Arc<RawBuffer<T>>,
}

impl<T: Default> Buffer<T> {
    /// Allocates a buffer of `capacity` default-initialized slots.
    #[must_use]
    pub fn allocate(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, T::default);
        Self::from_vec(slots)
    }
}

impl<T> Buffer<T> {
    /// Takes ownership of `vec`'s elements without copying them.
    ///
    /// The buffer's capacity is `vec.len()`; spare capacity of the vector is
    /// not kept.
    #[must_use]
    pub fn from_vec(vec: Vec<T>) -> Self {
        Self {
            raw: Arc::new(RawBuffer::from_vec(vec)),
        }
    }

    pub(crate) fn from_raw(raw: Arc<RawBuffer<T>>) -> Self {
        Self { raw }
    }

    pub(crate) fn raw(&self) -> &Arc<RawBuffer<T>> {
        &self.raw
    }

    /// Number of slots in the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Whether the buffer has been frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.raw.is_frozen()
    }

    /// Whether two handles refer to the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Buffer<T>) -> bool {
        Arc::ptr_eq(&self.raw, &other.raw)
    }

    /// Number of live handles (buffers, views, text views) keeping this
    /// storage alive.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.raw)
    }

    /// Creates a mutable view over `[offset, offset + capacity)` holding the
    /// first `len` of those slots. No data is copied.
    ///
    /// # Errors
    ///
    /// - [`RangeError`] if `offset + capacity` exceeds the buffer or `len`
    ///   exceeds `capacity`.
    /// - [`FrozenError`] if the buffer is frozen.
    pub fn view(&self, offset: usize, len: usize, capacity: usize) -> Result<SeqView<T>, ViewError> {
        let allocated = self.capacity();
        if offset.checked_add(capacity).is_none_or(|end| end > allocated) {
            return Err(RangeError::ExceedsBuffer {
                offset,
                capacity,
                allocated,
            }
            .into());
        }
        if len > capacity {
            return Err(RangeError::LengthExceedsCapacity { len, capacity }.into());
        }
        if self.is_frozen() {
            return Err(FrozenError.into());
        }
        Ok(SeqView::from_parts(self.clone(), offset, len, capacity))
    }
}

impl Buffer<u8> {
    /// Irrevocably marks the buffer read-only and returns a text view of all
    /// of its bytes. No data is copied.
    ///
    /// Existing sequence views keep reading the bytes, but every later write
    /// through them fails with [`FrozenError`], and [`Buffer::view`] refuses to
    /// hand out new ones.
    ///
    /// # Panics
    ///
    /// Panics if called while a read or write of this buffer is in progress.
    #[must_use]
    pub fn freeze(&self) -> TextView {
        self.raw.freeze();
        TextView::from_frozen(Arc::clone(&self.raw), 0, self.capacity())
    }
}

impl<T> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        Self {
            raw: Arc::clone(&self.raw),
        }
    }
}

impl<T> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("capacity", &self.capacity())
            .field("frozen", &self.is_frozen())
            .field("handles", &self.handle_count())
            .finish()
    }
}
