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

//! Non-cryptographic hash functions used to spread values over registers.
//!
//! All functions are pure and bit-exact with the reference MurmurHash3 C++
//! implementation, so hashes computed here agree with any other conforming
//! implementation for the same bytes and seed.

mod murmurhash;

use byteorder::ByteOrder;
use byteorder::LittleEndian;

pub use self::murmurhash::MurmurHash3X64128;
pub use self::murmurhash::hash32_u64;
pub use self::murmurhash::hash32_u64_pair;
pub use self::murmurhash::hash32_x86;
pub use self::murmurhash::hash128_x64;
pub use self::murmurhash::hash128_x64_u64;
pub use self::murmurhash::hash128_x64_u64_pair;

#[inline]
fn read_u32_le(bytes: &[u8]) -> u32 {
    LittleEndian::read_u32(bytes)
}

#[inline]
fn read_u64_le(bytes: &[u8]) -> u64 {
    LittleEndian::read_u64(bytes)
}
