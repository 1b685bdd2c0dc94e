//! Bounding lists: fixed-width bitsets over the colour set \(\{0, \dots, q-1\}\).

use std::fmt;

/// Returns a mask with the lowest `width` bits set.
#[inline(always)]
const fn all_bits(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[inline(always)]
const fn bit(c: usize) -> u64 {
    1u64 << c
}

// ============================================================================
// BoundingList
// ============================================================================

/// The set of candidate colours for one vertex of the bounding chain.
///
/// Representation: a `u64` bitset where bit `c` means colour `c` is still a
/// candidate, limiting the implementation to `q <= 64` colours. The width is
/// the colour count `q` and is fixed at construction; all binary operations
/// require equal widths.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BoundingList {
    bits: u64,
    width: usize,
}

/// Error for constructing a bounding list from an out-of-range colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidColourError {
    /// The offending colour index.
    pub colour: usize,
    /// The width (colour count) of the target list.
    pub width: usize,
}

impl fmt::Display for InvalidColourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "colour {} is outside {{0, ..., {}}}",
            self.colour,
            self.width - 1
        )
    }
}

impl std::error::Error for InvalidColourError {}

impl BoundingList {
    /// Creates an empty list of the given width.
    pub fn empty(width: usize) -> Self {
        debug_assert!(width <= 64, "this implementation assumes q <= 64");
        Self { bits: 0, width }
    }

    /// Creates a list containing every colour in `[0, width)`.
    pub fn full(width: usize) -> Self {
        debug_assert!(width <= 64, "this implementation assumes q <= 64");
        Self {
            bits: all_bits(width),
            width,
        }
    }

    /// Creates a list from an explicit set of colours.
    ///
    /// # Errors
    /// Returns an error if any colour is outside `[0, width)`.
    pub fn from_colours(width: usize, colours: &[usize]) -> Result<Self, InvalidColourError> {
        let mut result = Self::empty(width);
        for &c in colours {
            if c >= width {
                return Err(InvalidColourError { colour: c, width });
            }
            result.bits |= bit(c);
        }
        Ok(result)
    }

    /// Returns the width (the colour count `q`).
    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of candidate colours in the list.
    #[inline(always)]
    pub fn count(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns whether exactly one candidate colour remains.
    #[inline(always)]
    pub fn is_singleton(&self) -> bool {
        self.bits.count_ones() == 1
    }

    /// Returns whether the list contains `c`.
    #[inline(always)]
    pub fn contains(&self, c: usize) -> bool {
        debug_assert!(c < self.width);
        (self.bits & bit(c)) != 0
    }

    /// Adds the colour `c` to the list.
    #[inline(always)]
    pub fn set(&mut self, c: usize) {
        debug_assert!(c < self.width);
        self.bits |= bit(c);
    }

    /// Removes the colour `c` from the list.
    #[inline(always)]
    pub fn reset(&mut self, c: usize) {
        debug_assert!(c < self.width);
        self.bits &= !bit(c);
    }

    /// Returns the union of two lists of equal width.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        debug_assert_eq!(self.width, other.width);
        Self {
            bits: self.bits | other.bits,
            width: self.width,
        }
    }

    /// Returns the intersection of two lists of equal width.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Self {
        debug_assert_eq!(self.width, other.width);
        Self {
            bits: self.bits & other.bits,
            width: self.width,
        }
    }

    /// Returns the complement within `{0, ..., width - 1}`.
    #[inline]
    pub fn complement(&self) -> Self {
        Self {
            bits: !self.bits & all_bits(self.width),
            width: self.width,
        }
    }

    /// Returns whether every colour of `self` is also in `other`.
    #[inline]
    pub fn is_subset(&self, other: &Self) -> bool {
        debug_assert_eq!(self.width, other.width);
        (self.bits & !other.bits) == 0
    }

    /// Keeps the `k` lowest-index set bits and clears the rest.
    ///
    /// The lowest-index tie-break is load-bearing: the candidate-set padding
    /// in `State::generate_a` relies on exactly which bits survive.
    pub fn truncate_to_at_most_k(&mut self, k: usize) {
        let mut kept = 0u64;
        let mut t = self.bits;
        let mut remaining = k;
        while t != 0 && remaining > 0 {
            let low = t & t.wrapping_neg();
            kept |= low;
            t &= t - 1;
            remaining -= 1;
        }
        self.bits = kept;
    }

    /// Returns the lowest colour not in the list, if the list is not full.
    #[inline]
    pub fn first_unset(&self) -> Option<usize> {
        let unset = !self.bits & all_bits(self.width);
        if unset == 0 {
            None
        } else {
            Some(unset.trailing_zeros() as usize)
        }
    }

    /// Returns the lowest colour in the list, if any.
    #[inline]
    pub fn lowest(&self) -> Option<usize> {
        if self.bits == 0 {
            None
        } else {
            Some(self.bits.trailing_zeros() as usize)
        }
    }

    /// Iterates over the colours of the list in ascending order.
    #[inline]
    pub fn iter(&self) -> SetBits {
        SetBits(self.bits)
    }

    /// OR-reduction of a slice of lists; the empty slice yields the empty
    /// list. Associative, commutative and idempotent.
    pub fn union_of_lists(width: usize, lists: &[Self]) -> Self {
        let mut result = Self::empty(width);
        for list in lists {
            result = result.union(list);
        }
        result
    }
}

/// Ascending iterator over the set bits of a bounding list.
#[derive(Clone, Debug)]
pub struct SetBits(u64);

impl Iterator for SetBits {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let c = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(c)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl fmt::Display for BoundingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for c in self.iter() {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{c}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for BoundingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn bl(width: usize, colours: &[usize]) -> BoundingList {
        BoundingList::from_colours(width, colours).unwrap()
    }

    #[test]
    fn empty_and_full_widths() {
        let e = BoundingList::empty(7);
        let f = BoundingList::full(7);
        assert_eq!(e.count(), 0);
        assert_eq!(f.count(), 7);
        assert_eq!(e.width(), 7);
        assert_eq!(f.width(), 7);
    }

    #[test]
    fn from_colours_roundtrip() {
        let list = bl(7, &[4, 1, 3, 1]);
        let indices: Vec<usize> = list.iter().collect();
        assert_eq!(indices, vec![1, 3, 4]);
        assert_eq!(list.count(), 3);
    }

    #[test]
    fn from_colours_rejects_out_of_range() {
        let err = BoundingList::from_colours(7, &[1, 7]).unwrap_err();
        assert_eq!(err, InvalidColourError { colour: 7, width: 7 });
    }

    #[test]
    fn boolean_operators() {
        let bl1 = bl(5, &[1]);
        let bl2 = bl(5, &[1, 3]);
        assert_eq!(bl1.union(&bl2), bl2);
        assert_eq!(bl1.intersection(&bl2), bl1);
    }

    #[test]
    fn union_scenario() {
        // BoundingList(7,{1}) ∪ BoundingList(7,{1,3}) == BoundingList(7,{1,3})
        assert_eq!(bl(7, &[1]).union(&bl(7, &[1, 3])), bl(7, &[1, 3]));
    }

    #[test]
    fn truncate_scenario() {
        let mut list = bl(7, &[1, 3]);
        list.truncate_to_at_most_k(1);
        assert_eq!(list, bl(7, &[1]));
    }

    #[test]
    fn complement_scenario() {
        assert_eq!(bl(7, &[1]).complement(), bl(7, &[0, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn complement_of_five_wide_list() {
        assert_eq!(bl(5, &[1]).complement(), bl(5, &[0, 2, 3, 4]));
    }

    #[test]
    fn union_of_lists_matches_fixture() {
        let lists = [bl(5, &[1]), bl(5, &[1, 3]), bl(5, &[2])];
        assert_eq!(
            BoundingList::union_of_lists(5, &lists),
            bl(5, &[1, 2, 3])
        );
    }

    #[test]
    fn union_of_no_lists_is_empty() {
        assert_eq!(BoundingList::union_of_lists(7, &[]), BoundingList::empty(7));
    }

    #[test]
    fn union_is_associative_commutative_idempotent() {
        let mut rng = XorShiftRng::seed_from_u64(0x5E7B175);
        for _ in 0..200 {
            let a = BoundingList {
                bits: rng.random::<u64>() & 0x7F,
                width: 7,
            };
            let b = BoundingList {
                bits: rng.random::<u64>() & 0x7F,
                width: 7,
            };
            let c = BoundingList {
                bits: rng.random::<u64>() & 0x7F,
                width: 7,
            };
            assert_eq!(a.union(&b), b.union(&a));
            assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
            assert_eq!(a.union(&a), a);
        }
    }

    #[test]
    fn truncate_keeps_k_lowest_set_bits() {
        let mut rng = XorShiftRng::seed_from_u64(0x7A7E);
        for _ in 0..500 {
            let original = BoundingList {
                bits: rng.random::<u64>() & all_bits(11),
                width: 11,
            };
            for k in 0..=11 {
                let mut truncated = original;
                truncated.truncate_to_at_most_k(k);
                assert_eq!(truncated.count(), k.min(original.count()));

                let expected: Vec<usize> = original.iter().take(k).collect();
                let got: Vec<usize> = truncated.iter().collect();
                assert_eq!(got, expected, "truncate({k}) of {original:?}");
            }
        }
    }

    #[test]
    fn first_unset_scans_ascending() {
        assert_eq!(bl(5, &[0, 1, 3]).first_unset(), Some(2));
        assert_eq!(BoundingList::full(5).first_unset(), None);
        assert_eq!(BoundingList::empty(5).first_unset(), Some(0));
    }

    #[test]
    fn singleton_and_lowest() {
        assert!(bl(7, &[4]).is_singleton());
        assert!(!bl(7, &[4, 5]).is_singleton());
        assert!(!BoundingList::empty(7).is_singleton());
        assert_eq!(bl(7, &[4, 5]).lowest(), Some(4));
        assert_eq!(BoundingList::empty(7).lowest(), None);
    }

    #[test]
    fn subset_relation() {
        assert!(bl(7, &[1]).is_subset(&bl(7, &[1, 3])));
        assert!(!bl(7, &[2]).is_subset(&bl(7, &[1, 3])));
        assert!(BoundingList::empty(7).is_subset(&BoundingList::empty(7)));
    }

    #[test]
    fn set_and_reset() {
        let mut list = BoundingList::empty(7);
        list.set(3);
        assert!(list.contains(3));
        assert!(list.is_singleton());
        list.reset(3);
        assert_eq!(list, BoundingList::empty(7));
    }

    #[test]
    fn display_formats_as_set() {
        assert_eq!(format!("{}", bl(7, &[1, 3])), "{1,3}");
        assert_eq!(format!("{}", BoundingList::empty(7)), "{}");
    }
}
