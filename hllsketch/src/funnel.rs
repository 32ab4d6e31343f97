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

//! Funnels turn application values into bytes and hashes.
//!
//! A [`Funnel`] decides how its value type is represented as bytes. The
//! sketches only ever see the resulting 64-bit hash, so two sketches can be
//! merged only when they were fed through equivalent funnels.
//!
//! # Examples
//!
//! ```
//! # use hllsketch::funnel::{Funnel, StringFunnel, U64Funnel};
//! # use hllsketch::hash::hash128_x64;
//! assert_eq!(StringFunnel.hash64("apple"), hash128_x64(b"apple", 0).0);
//! assert_eq!(U64Funnel.hash64(&7), hash128_x64(&7u64.to_le_bytes(), 0).0);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

use crate::hash::MurmurHash3X64128;
use crate::hash::hash32_u64;
use crate::hash::hash32_x86;
use crate::hash::hash128_x64;
use crate::hash::hash128_x64_u64;

/// Maps values to bytes and derives their hashes.
///
/// Only [`Funnel::to_bytes`] is required. The provided hash methods use seed 0
/// and return 0 for an empty byte representation; implementations may override
/// them with a faster path as long as the results stay identical.
pub trait Funnel {
    /// The type of values this funnel accepts.
    type Value: ?Sized;

    /// The byte representation of `value`.
    fn to_bytes<'a>(&self, value: &'a Self::Value) -> Cow<'a, [u8]>;

    /// 32-bit MurmurHash3 (x86) of the byte representation.
    fn hash32(&self, value: &Self::Value) -> u32 {
        let bytes = self.to_bytes(value);
        if bytes.is_empty() {
            0
        } else {
            hash32_x86(&bytes, 0)
        }
    }

    /// First half of the 128-bit MurmurHash3 (x64) of the byte representation.
    fn hash64(&self, value: &Self::Value) -> u64 {
        let bytes = self.to_bytes(value);
        if bytes.is_empty() {
            0
        } else {
            hash128_x64(&bytes, 0).0
        }
    }
}

/// UTF-8 bytes of a string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StringFunnel;

impl Funnel for StringFunnel {
    type Value = str;

    fn to_bytes<'a>(&self, value: &'a str) -> Cow<'a, [u8]> {
        Cow::Borrowed(value.as_bytes())
    }
}

/// Raw byte slices, hashed as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BytesFunnel;

impl Funnel for BytesFunnel {
    type Value = [u8];

    fn to_bytes<'a>(&self, value: &'a [u8]) -> Cow<'a, [u8]> {
        Cow::Borrowed(value)
    }
}

macro_rules! impl_integer_funnel {
    ($(#[$meta:meta])* $name:ident, $ty:ty) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl Funnel for $name {
            type Value = $ty;

            fn to_bytes<'a>(&self, value: &'a $ty) -> Cow<'a, [u8]> {
                Cow::Owned(value.to_le_bytes().to_vec())
            }

            fn hash32(&self, value: &$ty) -> u32 {
                hash32_u64(*value as u64, 0)
            }

            fn hash64(&self, value: &$ty) -> u64 {
                hash128_x64_u64(*value as u64, 0).0
            }
        }
    };
}

impl_integer_funnel!(
    /// Little-endian bytes of a `u64`.
    U64Funnel,
    u64
);

impl_integer_funnel!(
    /// Little-endian bytes of an `i64`.
    I64Funnel,
    i64
);

/// UUIDs packed into a `u128` with the most significant half in the high bits.
///
/// Random UUIDs are already uniformly distributed, so the hashes are taken
/// directly from the most significant 64 bits instead of running MurmurHash3.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct UuidFunnel;

impl Funnel for UuidFunnel {
    type Value = u128;

    fn to_bytes<'a>(&self, value: &'a u128) -> Cow<'a, [u8]> {
        Cow::Owned(value.to_be_bytes().to_vec())
    }

    fn hash32(&self, value: &u128) -> u32 {
        let msb = (*value >> 64) as u64;
        (msb ^ (msb >> 32)) as u32
    }

    fn hash64(&self, value: &u128) -> u64 {
        (*value >> 64) as u64
    }
}

/// Any [`Hash`] type, represented by the bytes its `Hash` impl writes.
///
/// The byte stream depends on the standard library's `Hash` impls, so sketches
/// built with this funnel should only be merged with sketches built by the same
/// program.
pub struct HashFunnel<T: ?Sized>(PhantomData<fn(&T)>);

impl<T: ?Sized> HashFunnel<T> {
    pub const fn new() -> Self {
        HashFunnel(PhantomData)
    }
}

impl<T: Hash + ?Sized> Funnel for HashFunnel<T> {
    type Value = T;

    fn to_bytes<'a>(&self, value: &'a T) -> Cow<'a, [u8]> {
        let mut collector = ByteCollector::default();
        value.hash(&mut collector);
        Cow::Owned(collector.bytes)
    }

    fn hash64(&self, value: &T) -> u64 {
        let mut counter = ByteCounter::default();
        value.hash(&mut counter);
        if counter.len == 0 {
            return 0;
        }
        let mut hasher = MurmurHash3X64128::with_seed(0);
        value.hash(&mut hasher);
        hasher.finish()
    }
}

// Manual impls: the marker must not require anything of `T`.
impl<T: ?Sized> Clone for HashFunnel<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for HashFunnel<T> {}

impl<T: ?Sized> Default for HashFunnel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for HashFunnel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashFunnel")
    }
}

impl<T: ?Sized> PartialEq for HashFunnel<T> {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl<T: ?Sized> Eq for HashFunnel<T> {}

impl<T: ?Sized> Hash for HashFunnel<T> {
    fn hash<H: Hasher>(&self, _: &mut H) {}
}

#[derive(Default)]
struct ByteCollector {
    bytes: Vec<u8>,
}

impl Hasher for ByteCollector {
    fn finish(&self) -> u64 {
        0
    }

    fn write(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }
}

#[derive(Default)]
struct ByteCounter {
    len: usize,
}

impl Hasher for ByteCounter {
    fn finish(&self) -> u64 {
        0
    }

    fn write(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
    }
}
