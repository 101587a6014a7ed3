//! Fragment slot sets and fragment buffer maps
//!
//! A (K, M) engine has K+M slots: `0..K` are data fragments, `K..K+M` parity.
//! Containers here are fixed-capacity, sized by [`MAX_FRAGMENTS`], and borrow the
//! caller's buffers for the duration of one call.

use std::fmt;

/// Maximum number of data fragments (K)
pub const MAX_DATA_FRAGMENTS: usize = 32;

/// Maximum number of parity fragments (M)
pub const MAX_PARITY_FRAGMENTS: usize = 32;

/// Maximum number of fragment slots (K + M)
pub const MAX_FRAGMENTS: usize = MAX_DATA_FRAGMENTS + MAX_PARITY_FRAGMENTS;

const _: () = assert!(MAX_FRAGMENTS <= u64::BITS as usize);

/// Bit-indexed set of fragment slots
///
/// Used for erased slots (value unknown) and zero slots (value known to be all
/// zeros, no buffer supplied).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SlotSet {
    bits: u64,
}

impl SlotSet {
    #[inline]
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Slots `start..end`
    ///
    /// # Panics
    /// If `end` exceeds [`MAX_FRAGMENTS`].
    pub fn range(start: usize, end: usize) -> Self {
        let mut set = Self::new();
        for slot in start..end {
            set.insert(slot);
        }
        set
    }

    /// Adds a slot, returning whether it was newly inserted
    ///
    /// # Panics
    /// If `slot >= MAX_FRAGMENTS`.
    #[inline]
    pub fn insert(&mut self, slot: usize) -> bool {
        assert!(slot < MAX_FRAGMENTS, "slot {slot} exceeds capacity");
        let added = !self.contains(slot);
        self.bits |= 1 << slot;
        added
    }

    /// Removes a slot, returning whether it was present
    #[inline]
    pub fn remove(&mut self, slot: usize) -> bool {
        let present = self.contains(slot);
        if present {
            self.bits &= !(1 << slot);
        }
        present
    }

    #[inline]
    pub fn contains(&self, slot: usize) -> bool {
        slot < MAX_FRAGMENTS && self.bits & (1 << slot) != 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Highest slot in the set
    #[inline]
    pub fn last(&self) -> Option<usize> {
        (self.bits != 0).then(|| (u64::BITS - 1 - self.bits.leading_zeros()) as usize)
    }

    #[inline]
    pub fn union(&self, other: &SlotSet) -> SlotSet {
        SlotSet {
            bits: self.bits | other.bits,
        }
    }

    #[inline]
    pub fn intersection(&self, other: &SlotSet) -> SlotSet {
        SlotSet {
            bits: self.bits & other.bits,
        }
    }

    /// Slots of `self` not in `other`
    #[inline]
    pub fn difference(&self, other: &SlotSet) -> SlotSet {
        SlotSet {
            bits: self.bits & !other.bits,
        }
    }

    #[inline]
    pub fn is_disjoint(&self, other: &SlotSet) -> bool {
        self.bits & other.bits == 0
    }

    /// Slots in ascending order
    pub fn iter(&self) -> SlotIter {
        SlotIter { bits: self.bits }
    }
}

impl fmt::Debug for SlotSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<usize> for SlotSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = SlotSet::new();
        for slot in iter {
            set.insert(slot);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SlotSet {
    type Item = usize;
    type IntoIter = SlotIter;

    fn into_iter(self) -> SlotIter {
        self.iter()
    }
}

/// Ascending iterator over a [`SlotSet`]
#[derive(Clone, Debug)]
pub struct SlotIter {
    bits: u64,
}

impl Iterator for SlotIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.bits == 0 {
            return None;
        }
        let slot = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bits.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SlotIter {}

/// Read-only fragment buffers indexed by slot
///
/// An absent slot carries no meaning on its own; whether it is erased or
/// known-zero is decided by the [`SlotSet`]s passed alongside.
#[derive(Clone, Copy)]
pub struct FragmentMap<'a> {
    slots: [Option<&'a [u8]>; MAX_FRAGMENTS],
}

impl Default for FragmentMap<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FragmentMap<'a> {
    pub const fn new() -> Self {
        Self {
            slots: [None; MAX_FRAGMENTS],
        }
    }

    /// Map buffers to consecutive slots starting at 0
    ///
    /// # Panics
    /// If more than [`MAX_FRAGMENTS`] buffers are given.
    pub fn from_buffers<B: AsRef<[u8]>>(buffers: &'a [B]) -> Self {
        let mut map = Self::new();
        for (slot, buffer) in buffers.iter().enumerate() {
            map.insert(slot, buffer.as_ref());
        }
        map
    }

    /// # Panics
    /// If `slot >= MAX_FRAGMENTS`.
    #[inline]
    pub fn insert(&mut self, slot: usize, buffer: &'a [u8]) -> Option<&'a [u8]> {
        self.slots[slot].replace(buffer)
    }

    #[inline]
    pub fn remove(&mut self, slot: usize) -> Option<&'a [u8]> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&'a [u8]> {
        self.slots.get(slot).copied().flatten()
    }

    #[inline]
    pub fn contains(&self, slot: usize) -> bool {
        self.get(slot).is_some()
    }

    /// Slots holding a buffer
    pub fn present(&self) -> SlotSet {
        self.iter().map(|(slot, _)| slot).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// `(slot, buffer)` pairs in ascending slot order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a [u8])> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, buffer)| buffer.map(|b| (slot, b)))
    }
}

impl fmt::Debug for FragmentMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(slot, buffer)| (slot, buffer.len())))
            .finish()
    }
}

/// Writable fragment buffers indexed by slot
pub struct FragmentMapMut<'a> {
    slots: [Option<&'a mut [u8]>; MAX_FRAGMENTS],
}

impl Default for FragmentMapMut<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FragmentMapMut<'a> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Map buffers to consecutive slots starting at 0
    ///
    /// # Panics
    /// If more than [`MAX_FRAGMENTS`] buffers are given.
    pub fn from_buffers<B: AsMut<[u8]>>(buffers: &'a mut [B]) -> Self {
        let mut map = Self::new();
        for (slot, buffer) in buffers.iter_mut().enumerate() {
            map.insert(slot, buffer.as_mut());
        }
        map
    }

    /// # Panics
    /// If `slot >= MAX_FRAGMENTS`.
    #[inline]
    pub fn insert(&mut self, slot: usize, buffer: &'a mut [u8]) -> Option<&'a mut [u8]> {
        self.slots[slot].replace(buffer)
    }

    #[inline]
    pub fn remove(&mut self, slot: usize) -> Option<&'a mut [u8]> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&[u8]> {
        self.slots.get(slot).and_then(|s| s.as_deref())
    }

    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut [u8]> {
        self.slots.get_mut(slot).and_then(|s| s.as_deref_mut())
    }

    #[inline]
    pub fn contains(&self, slot: usize) -> bool {
        self.get(slot).is_some()
    }

    /// Slots holding a buffer
    pub fn present(&self) -> SlotSet {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(slot, _)| slot)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// `(slot, buffer)` pairs in ascending slot order
    pub fn iter_mut(&mut self) -> FragmentIterMut<'_, 'a> {
        FragmentIterMut {
            slots: self.slots.iter_mut().enumerate(),
        }
    }
}

/// Mutable iterator over the buffers of a [`FragmentMapMut`]
pub struct FragmentIterMut<'s, 'a> {
    slots: std::iter::Enumerate<std::slice::IterMut<'s, Option<&'a mut [u8]>>>,
}

impl<'s> Iterator for FragmentIterMut<'s, '_> {
    type Item = (usize, &'s mut [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .find_map(|(slot, buffer)| buffer.as_deref_mut().map(|b| (slot, b)))
    }
}

impl fmt::Debug for FragmentMapMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.slots
                    .iter()
                    .enumerate()
                    .filter_map(|(slot, b)| b.as_ref().map(|b| (slot, b.len()))),
            )
            .finish()
    }
}
