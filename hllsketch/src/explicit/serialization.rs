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

//! Binary format of an explicit sketch (big endian)
//!
//! | Byte          | Field    | Description                                   |
//! |---------------|----------|-----------------------------------------------|
//! | 0             | marker   | always `0xE7`                                 |
//! | 1..=4         | count    | number of hashes, `i32`                       |
//! | 5..5+8*count  | hashes   | `u64` each, ascending when read as `i64`      |
//! | last          | checksum | low byte of CRC32C over all preceding bytes   |

pub(crate) const EXPLICIT_MARKER: u8 = 0xE7;

pub(crate) const MARKER_BYTES: usize = 1;
pub(crate) const COUNT_BYTES: usize = 4;
pub(crate) const HASH_BYTES: usize = 8;
pub(crate) const CHECKSUM_BYTES: usize = 1;

/// Bytes taken by everything except the hashes.
pub(crate) const OVERHEAD_BYTES: usize = MARKER_BYTES + COUNT_BYTES + CHECKSUM_BYTES;

pub(crate) fn serialized_size(count: usize) -> usize {
    OVERHEAD_BYTES + HASH_BYTES * count
}
