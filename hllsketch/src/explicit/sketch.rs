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

use std::hash::Hash;
use std::hash::Hasher;

use tracing::debug;
use tracing::trace;

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::codec::checksum;
use crate::error::Error;
use crate::explicit::hash_set::HashSet;
use crate::explicit::serialization::EXPLICIT_MARKER;
use crate::explicit::serialization::OVERHEAD_BYTES;
use crate::explicit::serialization::serialized_size;
use crate::funnel::Funnel;

/// Exact distinct counter that stores every distinct 64-bit hash.
///
/// Memory grows linearly with the cardinality, so this is meant for small sets
/// or for validating a [`HllSketch`](crate::hll::HllSketch) against ground truth.
///
/// # Examples
///
/// ```
/// # use hllsketch::explicit::ExplicitSketch;
/// # use hllsketch::funnel::StringFunnel;
/// let mut sketch = ExplicitSketch::new(StringFunnel, 16).unwrap();
/// for s in ["aaa", "bbb", "ccc", "aaa"] {
///     sketch.put(s);
/// }
/// assert_eq!(sketch.estimate(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct ExplicitSketch<F> {
    funnel: F,
    hashes: HashSet,
}

impl<F: Funnel> ExplicitSketch<F> {
    /// Creates an empty sketch sized for `initial_capacity` distinct values.
    ///
    /// The capacity is a hint; the set grows as needed.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `initial_capacity` is 0.
    pub fn new(funnel: F, initial_capacity: usize) -> Result<Self, Error> {
        if initial_capacity == 0 {
            return Err(Error::invalid_argument("initial capacity must be positive")
                .with_context("initial_capacity", initial_capacity));
        }
        Ok(Self {
            funnel,
            hashes: HashSet::with_capacity(initial_capacity),
        })
    }

    /// Registers a value.
    pub fn put(&mut self, value: &F::Value) {
        let hash = self.funnel.hash64(value);
        self.hashes.insert(hash);
    }

    /// Registers a value that may be absent; an absent value hashes to 0.
    pub fn put_nullable(&mut self, value: Option<&F::Value>) {
        let hash = value.map_or(0, |v| self.funnel.hash64(v));
        self.hashes.insert(hash);
    }

    /// Registers a precomputed 64-bit hash.
    pub fn put_hash(&mut self, hash: u64) {
        self.hashes.insert(hash);
    }

    /// The exact number of distinct hashes registered.
    pub fn estimate(&self) -> u64 {
        self.hashes.len() as u64
    }

    /// Always 0; the count is exact up to hash collisions.
    pub fn relative_error(&self) -> f64 {
        0.0
    }

    /// Returns a new sketch holding the hashes of both inputs, with the funnel of `self`.
    pub fn union(&self, other: &Self) -> Self
    where
        F: Clone,
    {
        let capacity = self.hashes.len().max(other.hashes.len()).max(1);
        let mut hashes = HashSet::with_capacity(capacity);
        for hash in self.hashes.iter().chain(other.hashes.iter()) {
            hashes.insert(hash);
        }
        trace!(
            left = self.hashes.len(),
            right = other.hashes.len(),
            merged = hashes.len(),
            "merged explicit sketches"
        );
        Self {
            funnel: self.funnel.clone(),
            hashes,
        }
    }

    /// Removes every hash.
    pub fn reset(&mut self) {
        self.hashes.clear();
    }

    /// Returns true if no hash has been registered since creation or the last reset.
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Iterates over the stored hashes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.hashes.iter()
    }

    /// The stored hashes, ascending when compared as signed 64-bit integers.
    pub fn to_sorted_vec(&self) -> Vec<u64> {
        let mut hashes: Vec<u64> = self.hashes.iter().collect();
        hashes.sort_unstable_by_key(|&h| h as i64);
        hashes
    }

    /// The funnel values are hashed through.
    pub fn funnel(&self) -> &F {
        &self.funnel
    }

    /// Length of [`serialize`](Self::serialize) output: `8 * n + 6` bytes.
    pub fn serialized_size(&self) -> usize {
        serialized_size(self.hashes.len())
    }

    /// Serializes the sketch: a marker byte, the hash count, the sorted hashes,
    /// and a checksum byte.
    ///
    /// # Panics
    ///
    /// Panics if the sketch holds more than `i32::MAX` hashes.
    pub fn serialize(&self) -> Vec<u8> {
        let hashes = self.to_sorted_vec();
        assert!(
            hashes.len() <= i32::MAX as usize,
            "explicit sketch holds {} hashes, more than the format allows",
            hashes.len()
        );

        let mut bytes = SketchBytes::with_capacity(serialized_size(hashes.len()));
        bytes.write_u8(EXPLICIT_MARKER);
        bytes.write_i32_be(hashes.len() as i32);
        for hash in hashes {
            bytes.write_u64_be(hash);
        }
        bytes.finish_with_checksum()
    }

    /// Deserializes a sketch written by [`serialize`](Self::serialize).
    ///
    /// # Errors
    ///
    /// `CorruptData` if the input is too short, the marker or checksum does not
    /// match, the count is negative, or the length disagrees with the count.
    pub fn deserialize(bytes: &[u8], funnel: F) -> Result<Self, Error> {
        Self::decode(bytes, funnel).inspect_err(|err| {
            debug!(len = bytes.len(), error = %err, "failed to deserialize explicit sketch");
        })
    }

    fn decode(bytes: &[u8], funnel: F) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        if bytes.len() < OVERHEAD_BYTES {
            return Err(Error::corrupt(format!(
                "explicit sketch needs at least {OVERHEAD_BYTES} bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[0] != EXPLICIT_MARKER {
            return Err(Error::invalid_marker(EXPLICIT_MARKER, bytes[0]));
        }

        let payload = checksum::verify(bytes)?;
        let mut cursor = SketchSlice::new(payload);
        let _marker = cursor.read_u8().map_err(make_error("marker"))?;
        let count = cursor.read_i32_be().map_err(make_error("count"))?;

        let count = usize::try_from(count).map_err(|_| {
            Error::corrupt(format!("negative hash count {count}")).with_context("count", count)
        })?;
        let expected = serialized_size(count);
        if bytes.len() != expected {
            return Err(Error::corrupt(format!(
                "explicit sketch with {count} hashes must be {expected} bytes, got {}",
                bytes.len()
            ))
            .with_context("expected", expected)
            .with_context("actual", bytes.len()));
        }

        let mut hashes = HashSet::with_capacity(count.max(1));
        for _ in 0..count {
            hashes.insert(cursor.read_u64_be().map_err(make_error("hash"))?);
        }
        trace!(count, "deserialized explicit sketch");

        Ok(Self { funnel, hashes })
    }
}

impl<F: PartialEq> PartialEq for ExplicitSketch<F> {
    fn eq(&self, other: &Self) -> bool {
        self.funnel == other.funnel && self.hashes == other.hashes
    }
}

impl<F: Eq> Eq for ExplicitSketch<F> {}

impl<F: Hash> Hash for ExplicitSketch<F> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.funnel.hash(state);
        let mut hashes: Vec<u64> = self.hashes.iter().collect();
        hashes.sort_unstable();
        hashes.hash(state);
    }
}
