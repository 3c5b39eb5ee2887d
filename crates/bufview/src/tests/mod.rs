
/// Number of quickcheck cases per property.
#[cfg(not(any(miri, feature = "test-fast")))]
pub(crate) fn test_count() -> u64 {
    if is_ci::cached() { 10_000 } else { 1_000 }
}

#[cfg(any(miri, feature = "test-fast"))]
pub(crate) fn test_count() -> u64 {
    10
}
