// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Open-addressing set of 64-bit hashes.
//!
//! Slots hold the hash itself, with 0 marking an empty slot. The hash 0 (what an
//! absent value maps to) is tracked by a separate flag. Collisions are resolved
//! by double hashing: the probe starts at the low bits and advances by an odd
//! stride taken from the bits just above, so every slot of the power-of-two
//! table is eventually visited.

const EMPTY: u64 = 0;

const MIN_LG_SIZE: u8 = 3;

// Resize at 3/4 = 75% load factor
const RESIZE_NUMER: usize = 3;
const RESIZE_DENOM: usize = 4;

// Larger capacity hints are clamped; the table still grows on demand.
const MAX_CAPACITY_HINT: usize = 1 << 16;

#[derive(Debug, Clone)]
pub(crate) struct HashSet {
    lg_size: u8,
    slots: Box<[u64]>,
    /// Number of occupied slots, not counting the zero flag
    occupied: usize,
    has_zero: bool,
}

impl HashSet {
    /// Creates a set that holds `capacity` hashes before its first resize.
    ///
    /// Hints above 65536 are treated as 65536.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_CAPACITY_HINT);
        let mut lg_size = MIN_LG_SIZE;
        while capacity * RESIZE_DENOM > (1usize << lg_size) * RESIZE_NUMER {
            lg_size += 1;
        }
        Self::new(lg_size)
    }

    fn new(lg_size: u8) -> Self {
        Self {
            lg_size,
            slots: vec![EMPTY; 1 << lg_size].into_boxed_slice(),
            occupied: 0,
            has_zero: false,
        }
    }

    pub fn len(&self) -> usize {
        self.occupied + self.has_zero as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert hash into the set, ignoring duplicates. Returns true if it was not present.
    pub fn insert(&mut self, hash: u64) -> bool {
        if hash == EMPTY {
            let inserted = !self.has_zero;
            self.has_zero = true;
            return inserted;
        }

        let slot = match self.find(hash) {
            Ok(_) => return false,
            Err(slot) => slot,
        };
        if (self.occupied + 1) * RESIZE_DENOM > self.slots.len() * RESIZE_NUMER {
            // Slots move on growth, so probe again in the larger table.
            self.grow(self.lg_size + 1);
            return self.insert(hash);
        }
        self.slots[slot] = hash;
        self.occupied += 1;
        true
    }

    pub fn contains(&self, hash: u64) -> bool {
        if hash == EMPTY {
            return self.has_zero;
        }
        self.find(hash).is_ok()
    }

    /// Removes every hash, keeping the allocated table.
    pub fn clear(&mut self) {
        self.slots.fill(EMPTY);
        self.occupied = 0;
        self.has_zero = false;
    }

    /// Iterates over the stored hashes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.has_zero
            .then_some(EMPTY)
            .into_iter()
            .chain(self.slots.iter().copied().filter(|&h| h != EMPTY))
    }

    /// Returns `Ok(slot)` holding `hash`, or `Err(slot)` of the empty slot where it belongs.
    fn find(&self, hash: u64) -> Result<usize, usize> {
        let mask = (1usize << self.lg_size) - 1;
        let mut probe = hash as usize & mask;
        // Stride is always odd to ensure all slots are visited
        let stride = ((hash >> self.lg_size) as usize & mask) | 1;

        loop {
            let value = self.slots[probe];
            if value == EMPTY {
                return Err(probe);
            } else if value == hash {
                return Ok(probe);
            }
            // The load factor stays below 1, so an empty slot is always reached.
            probe = (probe + stride) & mask;
        }
    }

    /// Internally grow the set by a power of two, rehashing all the existing values.
    fn grow(&mut self, lg_size: u8) {
        debug_assert!(lg_size > self.lg_size);

        let mut grown = HashSet::new(lg_size);
        for &hash in self.slots.iter().filter(|&&h| h != EMPTY) {
            if let Err(slot) = grown.find(hash) {
                grown.slots[slot] = hash;
            }
        }
        grown.occupied = self.occupied;
        grown.has_zero = self.has_zero;
        *self = grown;
    }
}

impl PartialEq for HashSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|h| other.contains(h))
    }
}

impl Eq for HashSet {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_grow() {
        let mut set = HashSet::with_capacity(1);
        assert_eq!(set.lg_size, MIN_LG_SIZE);
        for i in 1..=1000u64 {
            assert!(set.insert(i.wrapping_mul(0x9E37_79B9_7F4A_7C15)));
        }
        for i in 1..=1000u64 {
            assert!(!set.insert(i.wrapping_mul(0x9E37_79B9_7F4A_7C15)));
        }
        assert_eq!(set.len(), 1000);
        assert!(set.occupied * RESIZE_DENOM <= set.slots.len() * RESIZE_NUMER);
        assert!(set.contains(0x9E37_79B9_7F4A_7C15));
        assert!(!set.contains(12345));
    }

    #[test]
    fn test_zero_is_tracked_separately() {
        let mut set = HashSet::with_capacity(4);
        assert!(!set.contains(0));
        assert!(set.insert(0));
        assert!(!set.insert(0));
        assert!(set.insert(7));
        assert_eq!(set.len(), 2);
        let mut values: Vec<u64> = set.iter().collect();
        values.sort_unstable();
        assert_eq!(values, vec![0, 7]);

        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(0));
    }

    #[test]
    fn test_equality_ignores_layout() {
        let mut a = HashSet::with_capacity(1);
        let mut b = HashSet::with_capacity(1000);
        for h in [5u64, 0, u64::MAX, 1 << 40] {
            a.insert(h);
        }
        for h in [1 << 40, u64::MAX, 5, 0] {
            b.insert(h);
        }
        assert_eq!(a, b);
        b.insert(6);
        assert_ne!(a, b);
    }

    #[test]
    fn test_colliding_low_bits() {
        // Identical low bits, so every insert probes past the earlier ones.
        let mut set = HashSet::with_capacity(8);
        for i in 1..=6u64 {
            assert!(set.insert(i << 32));
        }
        for i in 1..=6u64 {
            assert!(set.contains(i << 32));
        }
    }

    #[test]
    fn test_duplicates_do_not_grow() {
        let mut set = HashSet::with_capacity(6);
        assert_eq!(set.lg_size, MIN_LG_SIZE);
        for i in 1..=6u64 {
            assert!(set.insert(i));
        }
        // a seventh distinct hash would cross the load threshold, a repeat must not
        assert!(!set.insert(3));
        assert_eq!(set.lg_size, MIN_LG_SIZE);
        assert_eq!(set.len(), 6);

        assert!(set.insert(7));
        assert_eq!(set.lg_size, MIN_LG_SIZE + 1);
        for i in 1..=7u64 {
            assert!(set.contains(i));
        }
    }

    #[test]
    fn test_huge_capacity_hint_is_clamped() {
        let mut set = HashSet::with_capacity(usize::MAX);
        assert_eq!(set.slots.len(), 1 << 17);
        assert!(set.insert(42));
        assert!(set.contains(42));
        assert_eq!(HashSet::with_capacity(MAX_CAPACITY_HINT + 1).lg_size, set.lg_size);
    }
}
