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

//! Dense HyperLogLog sketch

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;
use tracing::trace;

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::codec::checksum;
use crate::error::Error;
use crate::funnel::Funnel;
use crate::hll::DEFAULT_LG_M;
use crate::hll::DEFAULT_REGISTER_WIDTH;
use crate::hll::MAX_LG_M;
use crate::hll::MAX_REGISTER_WIDTH;
use crate::hll::MIN_LG_M;
use crate::hll::MIN_REGISTER_WIDTH;
use crate::hll::array::RegisterArray;
use crate::hll::array::min_bytes_len;
use crate::hll::estimator;
use crate::hll::serialization::CHECKSUM_BYTES;
use crate::hll::serialization::PREFIX_BYTES;
use crate::hll::serialization::decode_prefix;
use crate::hll::serialization::encode_prefix;

/// A HyperLogLog sketch over `2^lg_m` registers of `register_width` bits.
///
/// Values are hashed through the funnel `F`; the top `lg_m` bits of the hash
/// select a register, which keeps the largest "leading zeros + 1" seen among
/// the remaining bits.
///
/// # Examples
///
/// ```
/// # use hllsketch::funnel::StringFunnel;
/// # use hllsketch::hll::HllSketch;
/// let mut sketch = HllSketch::builder().lg_m(12).build(StringFunnel).unwrap();
/// sketch.put("apple");
/// sketch.put("banana");
/// sketch.put("apple");
/// assert_eq!(sketch.estimate(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HllSketch<F> {
    lg_m: u8,
    register_width: u8,
    registers: RegisterArray,
    funnel: F,
}

impl<F: Funnel> HllSketch<F> {
    /// Create a new builder for HllSketch
    ///
    /// # Examples
    ///
    /// ```
    /// # use hllsketch::funnel::U64Funnel;
    /// # use hllsketch::hll::HllSketch;
    /// let sketch = HllSketch::builder()
    ///     .lg_m(14)
    ///     .register_width(6)
    ///     .build(U64Funnel)
    ///     .unwrap();
    /// assert_eq!(sketch.num_registers(), 16384);
    /// ```
    pub fn builder() -> HllSketchBuilder<F> {
        HllSketchBuilder::default()
    }

    /// Creates a sketch with the default parameters (`lg_m = 11`, `register_width = 5`).
    pub fn new(funnel: F) -> Self {
        Self::from_registers(
            DEFAULT_LG_M,
            RegisterArray::zeroed(1 << DEFAULT_LG_M, DEFAULT_REGISTER_WIDTH),
            funnel,
        )
    }

    fn from_registers(lg_m: u8, registers: RegisterArray, funnel: F) -> Self {
        Self {
            lg_m,
            register_width: registers.width(),
            registers,
            funnel,
        }
    }

    /// Registers a value.
    pub fn put(&mut self, value: &F::Value) {
        let hash = self.funnel.hash64(value);
        self.put_hash(hash);
    }

    /// Registers a value that may be absent; an absent value hashes to 0.
    pub fn put_nullable(&mut self, value: Option<&F::Value>) {
        let hash = value.map_or(0, |v| self.funnel.hash64(v));
        self.put_hash(hash);
    }

    /// Registers a precomputed 64-bit hash.
    ///
    /// The top `lg_m` bits select the register. The rank stored is the number of
    /// leading zeros of the remaining bits plus one, truncated to the register
    /// width, and only replaces a smaller value.
    pub fn put_hash(&mut self, hash: u64) {
        let index = (hash >> (64 - self.lg_m)) as usize;
        let rest = hash << self.lg_m;
        let rank = (rest.leading_zeros() + 1) & ((1u32 << self.register_width) - 1);
        if rank > self.registers.get_raw(index) {
            self.registers.put_raw(index, rank);
        }
    }

    /// Estimated number of distinct values registered so far.
    pub fn estimate(&self) -> u64 {
        estimator::estimate(&self.registers)
    }

    /// Standard error of [`estimate`](Self::estimate), `1.04 / sqrt(2^lg_m)`.
    pub fn relative_error(&self) -> f64 {
        estimator::relative_error(self.lg_m)
    }

    /// Returns a new sketch counting the union of both inputs.
    ///
    /// The result takes the wider of the two register widths and the funnel of
    /// `self`. Neither input is modified.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the two sketches have different `lg_m`.
    pub fn union(&self, other: &Self) -> Result<Self, Error>
    where
        F: Clone,
    {
        if self.lg_m != other.lg_m {
            debug!(
                left = self.lg_m,
                right = other.lg_m,
                "rejecting union of dense sketches"
            );
            return Err(Error::invalid_argument(format!(
                "cannot union sketches with lg_m {} and {}",
                self.lg_m, other.lg_m
            ))
            .with_context("left_lg_m", self.lg_m)
            .with_context("right_lg_m", other.lg_m));
        }

        let width = self.register_width.max(other.register_width);
        let mut registers = RegisterArray::zeroed(self.registers.len(), width);
        registers.merge_max(&self.registers);
        registers.merge_max(&other.registers);
        trace!(lg_m = self.lg_m, register_width = width, "merged dense sketches");

        Ok(Self::from_registers(
            self.lg_m,
            registers,
            self.funnel.clone(),
        ))
    }

    /// Zeroes every register, keeping the configuration.
    pub fn reset(&mut self) {
        self.registers.clear();
    }

    /// Returns true if no value has been registered since creation or the last reset.
    pub fn is_empty(&self) -> bool {
        self.registers.as_bytes().iter().all(|&b| b == 0)
    }

    /// Log2 of the number of registers.
    pub fn lg_m(&self) -> u8 {
        self.lg_m
    }

    /// Bits per register.
    pub fn register_width(&self) -> u8 {
        self.register_width
    }

    /// Number of registers, `2^lg_m`.
    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    /// Read-only view of the registers.
    pub fn registers(&self) -> &RegisterArray {
        &self.registers
    }

    /// The funnel values are hashed through.
    pub fn funnel(&self) -> &F {
        &self.funnel
    }

    /// Length of [`serialize`](Self::serialize) output in bytes.
    pub fn serialized_size(&self) -> usize {
        PREFIX_BYTES + self.registers.as_bytes().len() + CHECKSUM_BYTES
    }

    /// Serializes the sketch: a prefix byte, the packed registers, and a checksum byte.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hllsketch::funnel::StringFunnel;
    /// # use hllsketch::hll::HllSketch;
    /// let sketch = HllSketch::builder()
    ///     .lg_m(4)
    ///     .register_width(5)
    ///     .build(StringFunnel)
    ///     .unwrap();
    /// let bytes = sketch.serialize();
    /// assert_eq!(bytes.len(), 12);
    /// assert_eq!(bytes[0], 0x25);
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = SketchBytes::with_capacity(self.serialized_size());
        bytes.write_u8(encode_prefix(self.lg_m, self.register_width));
        bytes.write(self.registers.as_bytes());
        bytes.finish_with_checksum()
    }

    /// Deserializes a sketch written by [`serialize`](Self::serialize).
    ///
    /// # Errors
    ///
    /// `CorruptData` if the input is too short, the checksum does not match,
    /// `lg_m` is out of range, or the length disagrees with the prefix.
    pub fn deserialize(bytes: &[u8], funnel: F) -> Result<Self, Error> {
        Self::decode(bytes, funnel).inspect_err(|err| {
            debug!(len = bytes.len(), error = %err, "failed to deserialize dense sketch");
        })
    }

    fn decode(bytes: &[u8], funnel: F) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        if bytes.len() <= PREFIX_BYTES + CHECKSUM_BYTES {
            return Err(Error::corrupt(format!(
                "dense sketch needs more than {} bytes, got {}",
                PREFIX_BYTES + CHECKSUM_BYTES,
                bytes.len()
            )));
        }

        let payload = checksum::verify(bytes)?;
        let mut cursor = SketchSlice::new(payload);
        let prefix = cursor.read_u8().map_err(make_error("prefix"))?;
        let (lg_m, register_width) = decode_prefix(prefix);

        if !(MIN_LG_M..=MAX_LG_M).contains(&lg_m) {
            return Err(Error::corrupt(format!(
                "lg_m {lg_m} is out of range [{MIN_LG_M}, {MAX_LG_M}]"
            ))
            .with_context("prefix", format!("0x{prefix:02X}")));
        }

        let expected = PREFIX_BYTES + min_bytes_len(1 << lg_m, register_width) + CHECKSUM_BYTES;
        if bytes.len() != expected {
            return Err(Error::corrupt(format!(
                "dense sketch with lg_m {lg_m} and width {register_width} must be {expected} bytes, got {}",
                bytes.len()
            ))
            .with_context("expected", expected)
            .with_context("actual", bytes.len()));
        }

        let mut registers = RegisterArray::zeroed(1 << lg_m, register_width);
        registers.set_raw_bytes(cursor.remaining(), 0)?;
        trace!(lg_m, register_width, "deserialized dense sketch");

        Ok(Self::from_registers(lg_m, registers, funnel))
    }
}

/// Builder for HllSketch
pub struct HllSketchBuilder<F> {
    lg_m: u8,
    register_width: u8,
    _funnel: PhantomData<fn() -> F>,
}

impl<F> Default for HllSketchBuilder<F> {
    fn default() -> Self {
        Self {
            lg_m: DEFAULT_LG_M,
            register_width: DEFAULT_REGISTER_WIDTH,
            _funnel: PhantomData,
        }
    }
}

impl<F> fmt::Debug for HllSketchBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HllSketchBuilder")
            .field("lg_m", &self.lg_m)
            .field("register_width", &self.register_width)
            .finish()
    }
}

impl<F: Funnel> HllSketchBuilder<F> {
    /// Set lg_m, the log2 of the number of registers. Valid range is [4, 31].
    pub fn lg_m(mut self, lg_m: u8) -> Self {
        self.lg_m = lg_m;
        self
    }

    /// Set the number of bits per register. Valid range is [1, 8].
    pub fn register_width(mut self, register_width: u8) -> Self {
        self.register_width = register_width;
        self
    }

    /// Build the HllSketch.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `lg_m` or `register_width` is out of range.
    pub fn build(self, funnel: F) -> Result<HllSketch<F>, Error> {
        if !(MIN_LG_M..=MAX_LG_M).contains(&self.lg_m) {
            return Err(Error::invalid_argument(format!(
                "lg_m must be in [{MIN_LG_M}, {MAX_LG_M}], got {}",
                self.lg_m
            ))
            .with_context("lg_m", self.lg_m));
        }
        if !(MIN_REGISTER_WIDTH..=MAX_REGISTER_WIDTH).contains(&self.register_width) {
            return Err(Error::invalid_argument(format!(
                "register_width must be in [{MIN_REGISTER_WIDTH}, {MAX_REGISTER_WIDTH}], got {}",
                self.register_width
            ))
            .with_context("register_width", self.register_width));
        }

        let registers = RegisterArray::zeroed(1 << self.lg_m, self.register_width);
        Ok(HllSketch::from_registers(self.lg_m, registers, funnel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::funnel::U64Funnel;

    fn small() -> HllSketch<U64Funnel> {
        HllSketch::builder()
            .lg_m(4)
            .register_width(5)
            .build(U64Funnel)
            .unwrap()
    }

    #[test]
    fn test_put_hash_selects_register_and_rank() {
        let mut sketch = small();
        // register 3, then 4 zero bits before the first one bit
        sketch.put_hash((3 << 60) | (1 << 55));
        assert_eq!(sketch.registers().get(3).unwrap(), 5);
        assert_eq!(sketch.registers().to_vec().iter().sum::<u32>(), 5);

        // smaller rank leaves the register alone
        sketch.put_hash((3 << 60) | (1 << 59));
        assert_eq!(sketch.registers().get(3).unwrap(), 5);

        // larger rank replaces it
        sketch.put_hash((3 << 60) | (1 << 50));
        assert_eq!(sketch.registers().get(3).unwrap(), 10);
    }

    #[test]
    fn test_rank_is_truncated_to_width() {
        let mut sketch = small();
        // an all-zero suffix has 64 leading zeros, so the rank 65 wraps in 5 bits
        sketch.put_hash(7 << 60);
        assert_eq!(sketch.registers().get(7).unwrap(), 65 & 31);

        let mut narrow = HllSketch::builder()
            .lg_m(4)
            .register_width(2)
            .build(U64Funnel)
            .unwrap();
        narrow.put_hash(1 << 56);
        // leading zeros 3 -> rank 4, truncated to 2 bits -> 0
        assert_eq!(narrow.registers().get(0).unwrap(), 0);
    }

    #[test]
    fn test_put_nullable_hashes_absent_to_zero() {
        let mut a = small();
        let mut b = small();
        a.put_nullable(None);
        b.put_hash(0);
        assert_eq!(a, b);
        assert!(!a.is_empty());

        a.put_nullable(Some(&42));
        b.put(&42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_builder_rejects_out_of_range() {
        for lg_m in [0, 3, 32] {
            let err = HllSketch::builder().lg_m(lg_m).build(U64Funnel).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        for width in [0, 9] {
            let err = HllSketch::builder()
                .register_width(width)
                .build(U64Funnel)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_defaults() {
        let sketch = HllSketch::new(U64Funnel);
        assert_eq!(sketch.lg_m(), 11);
        assert_eq!(sketch.register_width(), 5);
        assert_eq!(sketch.num_registers(), 2048);
        assert_eq!(sketch.serialized_size(), 1 + 1280 + 1);
        assert!(sketch.is_empty());
        assert_eq!(sketch.estimate(), 0);
    }

    #[test]
    fn test_reset() {
        let mut sketch = small();
        for i in 0..100u64 {
            sketch.put(&i);
        }
        assert!(sketch.estimate() > 0);
        sketch.reset();
        assert!(sketch.is_empty());
        assert_eq!(sketch.estimate(), 0);
        assert_eq!(sketch, small());
    }
}
