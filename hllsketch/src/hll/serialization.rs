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

//! Binary format of a dense HyperLogLog sketch
//!
//! | Byte      | Field     | Description                                        |
//! |-----------|-----------|----------------------------------------------------|
//! | 0         | prefix    | `lg_m` in the high 5 bits, register width in the low 3 |
//! | 1..=N     | registers | packed register buffer, `ceil(2^lg_m * width / 8)` bytes |
//! | N + 1     | checksum  | low byte of CRC32C over bytes `0..=N`              |
//!
//! A register width of 8 does not fit in 3 bits and is written as 0.

/// Bytes before the register buffer.
pub(crate) const PREFIX_BYTES: usize = 1;
/// Bytes after the register buffer.
pub(crate) const CHECKSUM_BYTES: usize = 1;

const LG_M_SHIFT: u8 = 3;
const WIDTH_MASK: u8 = 0b111;

pub(crate) fn encode_prefix(lg_m: u8, register_width: u8) -> u8 {
    (lg_m << LG_M_SHIFT) | (register_width & WIDTH_MASK)
}

/// Splits a prefix byte into `(lg_m, register_width)`.
pub(crate) fn decode_prefix(prefix: u8) -> (u8, u8) {
    let lg_m = prefix >> LG_M_SHIFT;
    let width = match prefix & WIDTH_MASK {
        0 => 8,
        w => w,
    };
    (lg_m, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix() {
        assert_eq!(encode_prefix(4, 5), 0x25);
        assert_eq!(encode_prefix(11, 5), 0x5D);
        assert_eq!(encode_prefix(4, 8), 0x20);
        assert_eq!(encode_prefix(31, 7), 0xFF);
        for lg_m in 4..=31 {
            for width in 1..=8 {
                assert_eq!(decode_prefix(encode_prefix(lg_m, width)), (lg_m, width));
            }
        }
    }
}
