/// Capacity policy used when an append does not fit in a view's capacity.
///
/// # Examples
///
/// ```rust
/// use bufview::{GrowthPolicy, SeqView};
///
/// let policy = GrowthPolicy {
///     factor: 4,
///     ..Default::default()
/// };
/// let view = SeqView::<u64>::allocate(2).append_with(&[1, 2, 3], &policy);
/// assert_eq!(view.capacity(), 8);
/// ```
///
/// # Default
///
/// Doubling, with a minimum derived from the element size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Multiplier applied to the current capacity when a view must grow.
    ///
    /// Values below 2 are treated as 2, so a run of N appends never copies
    /// more than O(N) elements in total.
    ///
    /// # Default
    ///
    /// `2`
    pub factor: usize,

    /// Smallest capacity a growing append allocates.
    ///
    /// `0` picks a minimum from the element size: 8 for single-byte elements,
    /// 4 for elements up to 1 KiB and 1 for anything larger.
    ///
    /// # Default
    ///
    /// `0`
    pub min_capacity: usize,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            factor: 2,
            min_capacity: 0,
        }
    }
}

impl GrowthPolicy {
    /// Capacity for a view that holds `current` slots and needs `required`.
    ///
    /// Monotone: the result is at least `current * factor` and at least
    /// `required`.
    #[must_use]
    pub fn next_capacity(&self, current: usize, required: usize, elem_size: usize) -> usize {
        let scaled = current.saturating_mul(self.factor.max(2));
        let floor = if self.min_capacity == 0 {
            min_non_zero_capacity(elem_size)
        } else {
            self.min_capacity
        };
        scaled.max(required).max(floor)
    }
}

// Tiny buffers are dumb: allocators round small requests up anyway.
fn min_non_zero_capacity(elem_size: usize) -> usize {
    if elem_size == 1 {
        8
    } else if elem_size <= 1024 {
        4
    } else {
        1
    }
}
