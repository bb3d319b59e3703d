use core::{cmp, fmt::Debug};

use alloc::vec::Vec;

/// A set of inclusive intervals in canonical form: sorted, non-overlapping
/// and non-adjacent. Every operation preserves canonical form, so two sets
/// are equal exactly when they contain the same elements.
///
/// Most operations append their result to the end of `ranges` and then
/// drain the prefix holding the old contents. That keeps each operation a
/// single linear pass without a second allocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct IntervalSet<I> {
    ranges: Vec<I>,
}

impl<I: Interval> IntervalSet<I> {
    /// Create a new set from a sequence of intervals in any order, possibly
    /// overlapping.
    pub(crate) fn new<T: IntoIterator<Item = I>>(intervals: T) -> IntervalSet<I> {
        let mut set = IntervalSet { ranges: intervals.into_iter().collect() };
        set.canonicalize();
        set
    }

    /// Add a new interval to this set.
    pub(crate) fn push(&mut self, interval: I) {
        self.ranges.push(interval);
        self.canonicalize();
    }

    /// The intervals of this set, in ascending order.
    pub(crate) fn intervals(&self) -> &[I] {
        &self.ranges
    }

    /// Returns true if this set contains `bound`.
    pub(crate) fn contains(&self, bound: I::Bound) -> bool {
        self.ranges
            .binary_search_by(|r| {
                if r.upper() < bound {
                    cmp::Ordering::Less
                } else if r.lower() > bound {
                    cmp::Ordering::Greater
                } else {
                    cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Union this set with the given set, in place.
    pub(crate) fn union(&mut self, other: &IntervalSet<I>) {
        if other.ranges.is_empty() || self.ranges == other.ranges {
            return;
        }
        self.ranges.extend_from_slice(&other.ranges);
        self.canonicalize();
    }

    /// Intersect this set with the given set, in place.
    pub(crate) fn intersect(&mut self, other: &IntervalSet<I>) {
        if self.ranges.is_empty() {
            return;
        }
        if other.ranges.is_empty() {
            self.ranges.clear();
            return;
        }
        let drain_end = self.ranges.len();
        let (mut a, mut b) = (0, 0);
        while a < drain_end && b < other.ranges.len() {
            if let Some(ab) = self.ranges[a].intersect(&other.ranges[b]) {
                self.ranges.push(ab);
            }
            // Advance whichever interval ends first. The other one may still
            // overlap the next interval of the advanced side.
            if self.ranges[a].upper() < other.ranges[b].upper() {
                a += 1;
            } else {
                b += 1;
            }
        }
        self.ranges.drain(..drain_end);
    }

    /// Subtract the given set from this set, in place.
    pub(crate) fn difference(&mut self, other: &IntervalSet<I>) {
        if self.ranges.is_empty() || other.ranges.is_empty() {
            return;
        }
        let drain_end = self.ranges.len();
        let mut b = 0;
        for a in 0..drain_end {
            let mut rest = Some(self.ranges[a]);
            // Skip subtrahends entirely below this interval.
            while b < other.ranges.len()
                && other.ranges[b].upper() < self.ranges[a].lower()
            {
                b += 1;
            }
            let mut i = b;
            while let Some(range) = rest {
                let Some(sub) = other.ranges.get(i) else { break };
                if sub.lower() > range.upper() {
                    break;
                }
                let (lo, hi) = range.difference(sub);
                // `lo`, when present, lies entirely below `sub` and so can
                // no longer be affected by later subtrahends.
                match (lo, hi) {
                    (Some(lo), Some(hi)) => {
                        self.ranges.push(lo);
                        rest = Some(hi);
                    }
                    (Some(only), None) if only.upper() < sub.lower() => {
                        self.ranges.push(only);
                        rest = None;
                    }
                    (Some(only), None) => rest = Some(only),
                    (None, _) => rest = None,
                }
                i += 1;
            }
            if let Some(range) = rest {
                self.ranges.push(range);
            }
        }
        self.ranges.drain(..drain_end);
    }

    /// Compute the symmetric difference of the two sets, in place: the
    /// elements in exactly one of them.
    pub(crate) fn symmetric_difference(&mut self, other: &IntervalSet<I>) {
        let mut intersection = self.clone();
        intersection.intersect(other);
        self.union(other);
        self.difference(&intersection);
    }

    /// Negate this set: every element of the bound's domain that was in the
    /// set is removed, and every element that was not is added.
    pub(crate) fn negate(&mut self) {
        let (min, max) = (I::Bound::min_value(), I::Bound::max_value());
        if self.ranges.is_empty() {
            self.ranges.push(I::create(min, max));
            return;
        }
        let drain_end = self.ranges.len();
        if self.ranges[0].lower() > min {
            let upper = self.ranges[0].lower().decrement();
            self.ranges.push(I::create(min, upper));
        }
        for i in 1..drain_end {
            // Canonical form guarantees a gap between neighbours.
            let lower = self.ranges[i - 1].upper().increment();
            let upper = self.ranges[i].lower().decrement();
            self.ranges.push(I::create(lower, upper));
        }
        if self.ranges[drain_end - 1].upper() < max {
            let lower = self.ranges[drain_end - 1].upper().increment();
            self.ranges.push(I::create(lower, max));
        }
        self.ranges.drain(..drain_end);
    }

    /// Sort and merge the intervals of this set.
    fn canonicalize(&mut self) {
        if self.is_canonical() {
            return;
        }
        self.ranges.sort();
        let mut merged = 0;
        for i in 1..self.ranges.len() {
            match self.ranges[merged].union(&self.ranges[i]) {
                Some(union) => self.ranges[merged] = union,
                None => {
                    merged += 1;
                    self.ranges[merged] = self.ranges[i];
                }
            }
        }
        self.ranges.truncate(merged + 1);
    }

    fn is_canonical(&self) -> bool {
        self.ranges.windows(2).all(|pair| {
            pair[0] < pair[1] && !pair[0].is_contiguous(&pair[1])
        })
    }
}

/// An inclusive interval over a totally ordered bound type.
pub(crate) trait Interval:
    Clone + Copy + Debug + Default + Eq + PartialEq + PartialOrd + Ord
{
    type Bound: Bound;

    fn lower(&self) -> Self::Bound;
    fn upper(&self) -> Self::Bound;
    fn set_lower(&mut self, bound: Self::Bound);
    fn set_upper(&mut self, bound: Self::Bound);

    /// Create a new interval, swapping the bounds if they are out of order.
    fn create(lower: Self::Bound, upper: Self::Bound) -> Self {
        let mut int = Self::default();
        int.set_lower(cmp::min(lower, upper));
        int.set_upper(cmp::max(lower, upper));
        int
    }

    /// Union the given interval with this one, if they overlap or touch.
    fn union(&self, other: &Self) -> Option<Self> {
        if !self.is_contiguous(other) {
            return None;
        }
        let lower = cmp::min(self.lower(), other.lower());
        let upper = cmp::max(self.upper(), other.upper());
        Some(Self::create(lower, upper))
    }

    /// Intersect this interval with the given interval.
    fn intersect(&self, other: &Self) -> Option<Self> {
        let lower = cmp::max(self.lower(), other.lower());
        let upper = cmp::min(self.upper(), other.upper());
        if lower <= upper {
            Some(Self::create(lower, upper))
        } else {
            None
        }
    }

    /// Subtract `other` from this interval. The result is up to two pieces,
    /// the lower one first. A lone piece is always in the first position.
    fn difference(&self, other: &Self) -> (Option<Self>, Option<Self>) {
        if self.is_subset(other) {
            return (None, None);
        }
        if self.intersect(other).is_none() {
            return (Some(*self), None);
        }
        let below = if other.lower() > self.lower() {
            Some(Self::create(self.lower(), other.lower().decrement()))
        } else {
            None
        };
        let above = if other.upper() < self.upper() {
            Some(Self::create(other.upper().increment(), self.upper()))
        } else {
            None
        };
        match (below, above) {
            (None, above) => (above, None),
            pieces => pieces,
        }
    }

    /// Returns true when the two intervals overlap or are adjacent.
    fn is_contiguous(&self, other: &Self) -> bool {
        let (lower1, upper1) = (self.lower().as_u32(), self.upper().as_u32());
        let (lower2, upper2) = (other.lower().as_u32(), other.upper().as_u32());
        cmp::max(lower1, lower2) <= cmp::min(upper1, upper2).saturating_add(1)
    }

    fn is_subset(&self, other: &Self) -> bool {
        other.lower() <= self.lower() && self.upper() <= other.upper()
    }
}

/// A bound of an interval: a byte or a Unicode scalar value.
pub(crate) trait Bound:
    Copy + Clone + Debug + Eq + PartialEq + PartialOrd + Ord
{
    fn min_value() -> Self;
    fn max_value() -> Self;
    fn as_u32(self) -> u32;
    /// The successor. Callers never ask for the successor of the maximum.
    fn increment(self) -> Self;
    /// The predecessor. Callers never ask for the predecessor of the minimum.
    fn decrement(self) -> Self;
}

impl Bound for u8 {
    fn min_value() -> Self {
        u8::MIN
    }
    fn max_value() -> Self {
        u8::MAX
    }
    fn as_u32(self) -> u32 {
        u32::from(self)
    }
    fn increment(self) -> Self {
        self.saturating_add(1)
    }
    fn decrement(self) -> Self {
        self.saturating_sub(1)
    }
}

impl Bound for char {
    fn min_value() -> Self {
        '\x00'
    }
    fn max_value() -> Self {
        '\u{10FFFF}'
    }
    fn as_u32(self) -> u32 {
        u32::from(self)
    }

    // The surrogate block is skipped, so that adjacent scalar values on
    // either side of it are treated as contiguous.
    fn increment(self) -> Self {
        match self {
            '\u{D7FF}' => '\u{E000}',
            c => char::from_u32(u32::from(c) + 1).unwrap_or(char::MAX),
        }
    }

    fn decrement(self) -> Self {
        match self {
            '\u{E000}' => '\u{D7FF}',
            c => char::from_u32(u32::from(c).saturating_sub(1)).unwrap_or('\0'),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord)]
    struct R(u8, u8);

    impl Interval for R {
        type Bound = u8;
        fn lower(&self) -> u8 {
            self.0
        }
        fn upper(&self) -> u8 {
            self.1
        }
        fn set_lower(&mut self, bound: u8) {
            self.0 = bound;
        }
        fn set_upper(&mut self, bound: u8) {
            self.1 = bound;
        }
    }

    fn set(ranges: &[(u8, u8)]) -> IntervalSet<R> {
        IntervalSet::new(ranges.iter().map(|&(s, e)| R(s, e)))
    }

    fn ranges(set: &IntervalSet<R>) -> Vec<(u8, u8)> {
        set.intervals().iter().map(|r| (r.0, r.1)).collect()
    }

    #[test]
    fn canonical_form() {
        let s = set(&[(10, 20), (1, 3), (4, 5), (15, 25), (30, 30)]);
        assert_eq!(vec![(1, 5), (10, 25), (30, 30)], ranges(&s));
        assert!(s.contains(12));
        assert!(!s.contains(7));
    }

    #[test]
    fn union() {
        let mut s = set(&[(1, 3), (10, 12)]);
        s.union(&set(&[(4, 9), (20, 20)]));
        assert_eq!(vec![(1, 12), (20, 20)], ranges(&s));
    }

    #[test]
    fn intersect() {
        let mut s = set(&[(1, 10), (20, 30)]);
        s.intersect(&set(&[(5, 25)]));
        assert_eq!(vec![(5, 10), (20, 25)], ranges(&s));

        let mut s = set(&[(b'a', b'a')]);
        s.intersect(&set(&[(b'b', b'b')]));
        assert!(s.intervals().is_empty());
    }

    #[test]
    fn difference() {
        let mut s = set(&[(1, 30)]);
        s.difference(&set(&[(5, 6), (10, 12), (28, 40)]));
        assert_eq!(vec![(1, 4), (7, 9), (13, 27)], ranges(&s));

        let mut s = set(&[(1, 5), (10, 15)]);
        s.difference(&set(&[(0, 255)]));
        assert!(s.intervals().is_empty());

        let mut s = set(&[(1, 5), (10, 15)]);
        s.difference(&set(&[(3, 12)]));
        assert_eq!(vec![(1, 2), (13, 15)], ranges(&s));
    }

    #[test]
    fn symmetric_difference() {
        let mut s = set(&[(1, 10)]);
        s.symmetric_difference(&set(&[(5, 15)]));
        assert_eq!(vec![(1, 4), (11, 15)], ranges(&s));
    }

    #[test]
    fn negate() {
        let mut s = set(&[(0, 9), (20, 29)]);
        s.negate();
        assert_eq!(vec![(10, 19), (30, 255)], ranges(&s));
        s.negate();
        assert_eq!(vec![(0, 9), (20, 29)], ranges(&s));

        let mut s = set(&[]);
        s.negate();
        assert_eq!(vec![(0, 255)], ranges(&s));
        s.negate();
        assert!(s.intervals().is_empty());
    }

    #[test]
    fn char_bounds_skip_surrogates() {
        assert_eq!('\u{E000}', '\u{D7FF}'.increment());
        assert_eq!('\u{D7FF}', '\u{E000}'.decrement());
    }
}
