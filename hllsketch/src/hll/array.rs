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

//! Fixed-width unsigned registers packed back to back into a byte buffer.
//!
//! Register `i` occupies bits `[i * width, (i + 1) * width)` of the buffer,
//! counting from the most significant bit of byte 0. A register may straddle
//! two bytes when the width does not divide 8.

use std::fmt;

use crate::error::Error;
use crate::hll::MAX_REGISTER_WIDTH;
use crate::hll::MIN_REGISTER_WIDTH;

/// A packed array of `len` unsigned registers, each `width` bits wide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RegisterArray {
    len: usize,
    width: u8,
    raw: Box<[u8]>,
}

impl RegisterArray {
    /// Creates a zeroed array of `len` registers of `width` bits.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `len` is 0 or `width` is not in `[1, 8]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hllsketch::hll::RegisterArray;
    /// let mut registers = RegisterArray::new(3, 7).unwrap();
    /// registers.set(1, 127).unwrap();
    /// assert_eq!(registers.get(1).unwrap(), 127);
    /// assert_eq!(registers.as_bytes().len(), 3);
    /// ```
    pub fn new(len: usize, width: u8) -> Result<Self, Error> {
        if len == 0 {
            return Err(Error::invalid_argument("register array must not be empty"));
        }
        if !(MIN_REGISTER_WIDTH..=MAX_REGISTER_WIDTH).contains(&width) {
            return Err(Error::invalid_argument(format!(
                "register width must be in [{MIN_REGISTER_WIDTH}, {MAX_REGISTER_WIDTH}], got {width}"
            ))
            .with_context("width", width));
        }
        Ok(Self::zeroed(len, width))
    }

    /// Creates a zeroed array from parameters the caller has already validated.
    pub(crate) fn zeroed(len: usize, width: u8) -> Self {
        debug_assert!(len > 0);
        debug_assert!((MIN_REGISTER_WIDTH..=MAX_REGISTER_WIDTH).contains(&width));
        Self {
            len,
            width,
            raw: vec![0u8; min_bytes_len(len, width)].into_boxed_slice(),
        }
    }

    /// Number of registers.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; an array holds at least one register.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits per register.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Reads register `index`.
    pub fn get(&self, index: usize) -> Result<u32, Error> {
        self.check_index(index)?;
        Ok(self.get_raw(index))
    }

    /// Writes `value` into register `index`, leaving every other register untouched.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `index >= len`, `ValueOverflow` if `value >= 2^width`.
    pub fn set(&mut self, index: usize, value: u32) -> Result<(), Error> {
        self.check_index(index)?;
        if value > mask(self.width as usize) {
            return Err(Error::value_overflow(value, self.width));
        }
        self.put_raw(index, value);
        Ok(())
    }

    /// Resets every register to zero.
    pub fn clear(&mut self) {
        self.raw.fill(0);
    }

    /// The packed buffer, borrowed.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// A copy of the packed buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.raw.to_vec()
    }

    /// Overwrites the packed buffer with `src[offset..offset + self.as_bytes().len()]`.
    pub fn set_raw_bytes(&mut self, src: &[u8], offset: usize) -> Result<(), Error> {
        let n = self.raw.len();
        let end = offset
            .checked_add(n)
            .filter(|&end| end <= src.len())
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "need {n} bytes at offset {offset}, source has {}",
                    src.len()
                ))
            })?;
        self.raw.copy_from_slice(&src[offset..end]);
        Ok(())
    }

    /// Iterates over all register values in index order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(move |i| self.get_raw(i))
    }

    /// All register values, unpacked.
    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Elementwise maximum of `self` and `other` written into `self`.
    ///
    /// Both arrays must have the same length, and every value of `other` must
    /// fit into `self`'s width.
    pub(crate) fn merge_max(&mut self, other: &RegisterArray) {
        debug_assert_eq!(self.len, other.len);
        debug_assert!(self.width >= other.width);
        for i in 0..self.len {
            let theirs = other.get_raw(i);
            if theirs > self.get_raw(i) {
                self.put_raw(i, theirs);
            }
        }
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<(), Error> {
        if index >= self.len {
            return Err(Error::index_out_of_range(index, self.len));
        }
        Ok(())
    }

    /// Reads register `index` without bounds checking against `len`.
    #[inline]
    pub(crate) fn get_raw(&self, index: usize) -> u32 {
        let width = self.width as usize;
        let from_bits = index * width;
        let byte_idx = from_bits >> 3;
        let bit_offset = from_bits & 7;

        if bit_offset + width <= 8 {
            let shift = 8 - width - bit_offset;
            ((self.raw[byte_idx] as u32) >> shift) & mask(width)
        } else {
            // spans into the next byte
            let spill = bit_offset + width - 8;
            let high = (self.raw[byte_idx] as u32) & mask(width - spill);
            (high << spill) | ((self.raw[byte_idx + 1] as u32) >> (8 - spill))
        }
    }

    /// Writes register `index`; `value` must already fit into the width.
    #[inline]
    pub(crate) fn put_raw(&mut self, index: usize, value: u32) {
        debug_assert!(value <= mask(self.width as usize));

        let width = self.width as usize;
        let from_bits = index * width;
        let byte_idx = from_bits >> 3;
        let bit_offset = from_bits & 7;

        if bit_offset + width <= 8 {
            let shift = 8 - width - bit_offset;
            let field = (mask(width) << shift) as u8;
            self.raw[byte_idx] = (self.raw[byte_idx] & !field) | ((value << shift) as u8);
        } else {
            let spill = bit_offset + width - 8;
            let head = mask(width - spill) as u8;
            let tail_keep = mask(8 - spill) as u8;
            self.raw[byte_idx] = (self.raw[byte_idx] & !head) | ((value >> spill) as u8);
            self.raw[byte_idx + 1] =
                (self.raw[byte_idx + 1] & tail_keep) | ((value << (8 - spill)) as u8);
        }
    }
}

impl fmt::Display for RegisterArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("]")
    }
}

/// Bytes needed to pack `len` registers of `width` bits.
pub fn min_bytes_len(len: usize, width: u8) -> usize {
    (len * width as usize).div_ceil(8)
}

#[inline]
fn mask(bits: usize) -> u32 {
    (1u32 << bits) - 1
}
