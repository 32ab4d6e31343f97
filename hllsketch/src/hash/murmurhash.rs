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

use std::hash::Hasher;

use super::read_u32_le;
use super::read_u64_le;

const C1_32: u32 = 0xcc9e2d51;
const C2_32: u32 = 0x1b873593;

const C1_64: u64 = 0x87c37b91114253d5;
const C2_64: u64 = 0x4cf5ad432745937f;
const N1_64: u64 = 0x52dce729;
const N2_64: u64 = 0x38495ab5;

/// MurmurHash3 x86 32-bit variant.
///
/// # Examples
///
/// ```
/// # use hllsketch::hash::hash32_x86;
/// assert_eq!(hash32_x86(b"", 0), 0);
/// assert_eq!(hash32_x86(b"Hello, world!", 0x9747b28c), 0x24884CBA);
/// ```
pub fn hash32_x86(data: &[u8], seed: u32) -> u32 {
    let mut h1 = seed;

    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        h1 = mix_h32(h1, read_u32_le(block));
    }

    let tail = blocks.remainder();
    let mut k1 = 0u32;
    for (i, &b) in tail.iter().enumerate() {
        k1 ^= (b as u32) << (8 * i);
    }
    if !tail.is_empty() {
        h1 ^= mix_k32(k1);
    }

    fmix32(h1 ^ data.len() as u32)
}

/// 32-bit hash of the little-endian bytes of `value`, without materializing them.
///
/// Equal to `hash32_x86(&value.to_le_bytes(), seed)`.
pub fn hash32_u64(value: u64, seed: u32) -> u32 {
    let mut h1 = seed;
    h1 = mix_h32(h1, value as u32);
    h1 = mix_h32(h1, (value >> 32) as u32);
    fmix32(h1 ^ 8)
}

/// 32-bit hash of the little-endian bytes of `a` followed by those of `b`.
pub fn hash32_u64_pair(a: u64, b: u64, seed: u32) -> u32 {
    let mut h1 = seed;
    for v in [a, b] {
        h1 = mix_h32(h1, v as u32);
        h1 = mix_h32(h1, (v >> 32) as u32);
    }
    fmix32(h1 ^ 16)
}

/// MurmurHash3 x64 128-bit variant, returned as the two 64-bit halves `(h1, h2)`.
///
/// # Examples
///
/// ```
/// # use hllsketch::hash::hash128_x64;
/// let (h1, h2) = hash128_x64(b"The quick brown fox jumps over the lazy dog", 0);
/// assert_eq!(h1, 0xe34bbc7bbc071b6c);
/// assert_eq!(h2, 0x7a433ca9c49a9347);
/// ```
pub fn hash128_x64(data: &[u8], seed: u32) -> (u64, u64) {
    let mut hasher = MurmurHash3X64128::with_seed(seed);
    hasher.write(data);
    hasher.finish128()
}

/// 128-bit hash of the little-endian bytes of `value`.
///
/// Equal to `hash128_x64(&value.to_le_bytes(), seed)`.
pub fn hash128_x64_u64(value: u64, seed: u32) -> (u64, u64) {
    let h1 = seed as u64 ^ mix_k1(value);
    finalize128(h1, seed as u64, 8)
}

/// 128-bit hash of the little-endian bytes of `a` followed by those of `b`.
pub fn hash128_x64_u64_pair(a: u64, b: u64, seed: u32) -> (u64, u64) {
    let (h1, h2) = mix_block(seed as u64, seed as u64, a, b);
    finalize128(h1, h2, 16)
}

/// Streaming MurmurHash3 x64 128-bit hasher.
///
/// Feeding bytes in any split yields the same result as [`hash128_x64`] over
/// their concatenation.
#[derive(Debug, Clone)]
pub struct MurmurHash3X64128 {
    h1: u64,
    h2: u64,
    total_len: u64,
    buffer: [u8; 16],
    buffer_len: usize,
}

impl MurmurHash3X64128 {
    pub fn with_seed(seed: u32) -> Self {
        MurmurHash3X64128 {
            h1: seed as u64,
            h2: seed as u64,
            total_len: 0,
            buffer: [0; 16],
            buffer_len: 0,
        }
    }

    /// Returns both halves of the 128-bit hash.
    pub fn finish128(&self) -> (u64, u64) {
        let mut h1 = self.h1;
        let mut h2 = self.h2;
        let tail = &self.buffer[..self.buffer_len];

        if tail.len() > 8 {
            let mut k2 = 0u64;
            for (i, &b) in tail[8..].iter().enumerate() {
                k2 ^= (b as u64) << (8 * i);
            }
            h2 ^= mix_k2(k2);
        }
        if !tail.is_empty() {
            let mut k1 = 0u64;
            for (i, &b) in tail.iter().take(8).enumerate() {
                k1 ^= (b as u64) << (8 * i);
            }
            h1 ^= mix_k1(k1);
        }

        finalize128(h1, h2, self.total_len)
    }

    #[inline]
    fn update(&mut self, block: &[u8]) {
        let k1 = read_u64_le(&block[0..8]);
        let k2 = read_u64_le(&block[8..16]);
        (self.h1, self.h2) = mix_block(self.h1, self.h2, k1, k2);
    }
}

impl Default for MurmurHash3X64128 {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl Hasher for MurmurHash3X64128 {
    /// Returns the first half of the 128-bit hash.
    fn finish(&self) -> u64 {
        self.finish128().0
    }

    fn write(&mut self, bytes: &[u8]) {
        self.total_len = self.total_len.wrapping_add(bytes.len() as u64);

        if self.buffer_len + bytes.len() < 16 {
            self.buffer[self.buffer_len..self.buffer_len + bytes.len()].copy_from_slice(bytes);
            self.buffer_len += bytes.len();
            return;
        }

        let mut bytes = bytes;

        if self.buffer_len != 0 {
            let needed = 16 - self.buffer_len;
            self.buffer[self.buffer_len..].copy_from_slice(&bytes[..needed]);
            let block = self.buffer;
            self.update(&block);
            self.buffer_len = 0;
            bytes = &bytes[needed..];
        }

        let mut blocks = bytes.chunks_exact(16);
        for block in &mut blocks {
            self.update(block);
        }

        let remainder = blocks.remainder();
        self.buffer[..remainder.len()].copy_from_slice(remainder);
        self.buffer_len = remainder.len();
    }
}

#[inline]
fn mix_k32(mut k1: u32) -> u32 {
    k1 = k1.wrapping_mul(C1_32);
    k1 = k1.rotate_left(15);
    k1.wrapping_mul(C2_32)
}

#[inline]
fn mix_h32(mut h1: u32, k1: u32) -> u32 {
    h1 ^= mix_k32(k1);
    h1 = h1.rotate_left(13);
    h1.wrapping_mul(5).wrapping_add(0xe6546b64)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^ (h >> 16)
}

#[inline]
fn mix_k1(mut k1: u64) -> u64 {
    k1 = k1.wrapping_mul(C1_64);
    k1 = k1.rotate_left(31);
    k1.wrapping_mul(C2_64)
}

#[inline]
fn mix_k2(mut k2: u64) -> u64 {
    k2 = k2.wrapping_mul(C2_64);
    k2 = k2.rotate_left(33);
    k2.wrapping_mul(C1_64)
}

#[inline]
fn mix_block(mut h1: u64, mut h2: u64, k1: u64, k2: u64) -> (u64, u64) {
    h1 ^= mix_k1(k1);
    h1 = h1.rotate_left(27);
    h1 = h1.wrapping_add(h2);
    h1 = h1.wrapping_mul(5).wrapping_add(N1_64);

    h2 ^= mix_k2(k2);
    h2 = h2.rotate_left(31);
    h2 = h2.wrapping_add(h1);
    h2 = h2.wrapping_mul(5).wrapping_add(N2_64);

    (h1, h2)
}

#[inline]
fn finalize128(mut h1: u64, mut h2: u64, len: u64) -> (u64, u64) {
    h1 ^= len;
    h2 ^= len;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    h1 = fmix64(h1);
    h2 = fmix64(h2);

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    (h1, h2)
}

#[inline]
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51afd7ed558ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ceb9fe1a85ec53);
    k ^ (k >> 33)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOX: &[u8] = b"The quick brown fox jumps over the lazy dog";

    #[test]
    fn test_x64_128_remainders() {
        // test a remainder < 8
        let key = "The quick brown fox jumps over the lazy dogdogdog";
        let (h1, h2) = hash128_x64(key.as_bytes(), 0);
        assert_eq!(h1, 0x9c8205300e612fc4);
        assert_eq!(h2, 0xcbc0af6136aa3df9);

        // test a remainder = 8
        let key = "The quick brown fox jumps over the lazy1";
        let (h1, h2) = hash128_x64(key.as_bytes(), 0);
        assert_eq!(h1, 0xe3301a827e5cdfe3);
        assert_eq!(h2, 0xbdbf05f8da0f0392);

        // test a remainder = 0
        let key = "The quick brown fox jumps over t";
        let (h1, h2) = hash128_x64(key.as_bytes(), 0);
        assert_eq!(h1, 0xdf6af91bb29bdacf);
        assert_eq!(h2, 0x91a341c58df1f3a6);

        // test a ones byte and a zeros byte
        let mut key = FOX.to_vec();
        key.extend_from_slice(&[0xff, 0x64, 0x6f, 0x67, 0x00]);
        let (h1, h2) = hash128_x64(&key, 0);
        assert_eq!(h1, 0xe88abda785929c9e);
        assert_eq!(h2, 0x96b98587cacc83d6);
    }

    #[test]
    fn test_x86_32_published_vectors() {
        assert_eq!(hash32_x86(b"", 0), 0);
        assert_eq!(hash32_x86(b"", 1), 0x514E28B7);
        assert_eq!(hash32_x86(b"", 0xffffffff), 0x81F16F39);
        assert_eq!(hash32_x86(&[0, 0, 0, 0], 0), 0x2362F9DE);
        assert_eq!(hash32_x86(&[0x21, 0x43, 0x65, 0x87], 0), 0xF55B516B);
        assert_eq!(hash32_x86(&[0x21], 0), 0x72661CF4);
        assert_eq!(hash32_x86(&[0xff; 4], 0), 0x76293B50);
        assert_eq!(hash32_x86(b"aaaa", 0x9747b28c), 0x5A97808A);
        assert_eq!(hash32_x86(FOX, 0x9747b28c), 0x2FA826CD);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let data: Vec<u8> = (0..100u8).collect();
        for split in [0, 1, 7, 15, 16, 17, 33, 99, 100] {
            let mut hasher = MurmurHash3X64128::with_seed(7);
            hasher.write(&data[..split]);
            hasher.write(&data[split..]);
            assert_eq!(hasher.finish128(), hash128_x64(&data, 7), "split {split}");
        }

        let mut hasher = MurmurHash3X64128::default();
        for b in &data {
            hasher.write(std::slice::from_ref(b));
        }
        assert_eq!(hasher.finish(), hash128_x64(&data, 0).0);
    }

    #[test]
    fn test_integer_fast_paths() {
        for v in [0u64, 1, 42, u64::MAX, 0x0123_4567_89ab_cdef, i64::MAX as u64] {
            assert_eq!(hash32_u64(v, 0), hash32_x86(&v.to_le_bytes(), 0));
            assert_eq!(hash32_u64(v, 7), hash32_x86(&v.to_le_bytes(), 7));
            assert_eq!(hash128_x64_u64(v, 0), hash128_x64(&v.to_le_bytes(), 0));
            assert_eq!(hash128_x64_u64(v, 99), hash128_x64(&v.to_le_bytes(), 99));

            let w = v.rotate_left(17) ^ 0x5555;
            let mut le = v.to_le_bytes().to_vec();
            le.extend_from_slice(&w.to_le_bytes());
            assert_eq!(hash32_u64_pair(v, w, 3), hash32_x86(&le, 3));
            assert_eq!(hash128_x64_u64_pair(v, w, 3), hash128_x64(&le, 3));
        }
        // the low byte is hashed first
        assert_eq!(hash32_u64(0x8765_4321, 0), 0x9e71_0c01);
        assert_eq!(hash32_u64(1, 0), 0x5307_5d44);
    }

    #[test]
    fn test_seed_is_unsigned() {
        // Seeds with the top bit set must not be sign-extended into the upper lanes.
        let (h1, _) = hash128_x64(b"seed", 0x8000_0000);
        let mut hasher = MurmurHash3X64128::with_seed(0x8000_0000);
        hasher.write(b"seed");
        assert_eq!(hasher.finish(), h1);
        assert_eq!(
            hash128_x64(b"seed", 0x8000_0000),
            mur3::murmurhash3_x64_128(b"seed", 0x8000_0000)
        );
    }
}
