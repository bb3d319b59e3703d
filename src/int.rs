use core::num::NonZeroUsize;

/// Lossless widening of `u32` values used as indices (state identifiers,
/// slots, capture indices).
pub(crate) trait U32 {
    fn as_usize(self) -> usize;
}

impl U32 for u32 {
    fn as_usize(self) -> usize {
        // Only 32 and 64 bit targets are supported (see lib.rs).
        self as usize
    }
}

/// Narrowing of `usize` values that are known to have been bounds checked
/// against `u32::MAX` when they were created.
pub(crate) trait Usize {
    fn as_u32(self) -> u32;
}

impl Usize for usize {
    fn as_u32(self) -> u32 {
        debug_assert!(self <= u32::MAX as usize);
        self as u32
    }
}

/// A match offset that can never be `usize::MAX`.
///
/// Haystack lengths always fit in an `isize`, so the maximum `usize` is free
/// to act as the niche for "no offset". An `Option<NonMaxUsize>` is therefore
/// exactly one word, which keeps the per-state slot table of the PikeVM
/// compact.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(transparent)]
pub(crate) struct NonMaxUsize(NonZeroUsize);

impl NonMaxUsize {
    /// Wraps `value`, returning `None` only for `usize::MAX`.
    pub(crate) fn new(value: usize) -> Option<NonMaxUsize> {
        NonZeroUsize::new(value.wrapping_add(1)).map(NonMaxUsize)
    }

    /// Returns the wrapped offset.
    pub(crate) fn get(self) -> usize {
        self.0.get().wrapping_sub(1)
    }
}

impl core::fmt::Debug for NonMaxUsize {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{:?}", self.get())
    }
}
