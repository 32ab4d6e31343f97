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

//! One-byte integrity checksum trailing every serialized sketch.
//!
//! The checksum is the least significant byte of the CRC32C (Castagnoli) of all
//! preceding bytes.

use crate::error::Error;

/// Computes the trailing checksum byte for `payload`.
pub(crate) fn checksum(payload: &[u8]) -> u8 {
    crc32c::crc32c(payload) as u8
}

/// Splits off the trailing checksum byte, verifies it, and returns the payload.
///
/// `bytes` must be non-empty.
pub(crate) fn verify(bytes: &[u8]) -> Result<&[u8], Error> {
    let Some((&stored, payload)) = bytes.split_last() else {
        return Err(Error::insufficient_data("checksum"));
    };
    let computed = checksum(payload);
    if computed != stored {
        return Err(Error::checksum_mismatch(computed, stored));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_castagnoli_check_value() {
        // CRC32C("123456789") = 0xE3069283
        assert_eq!(checksum(b"123456789"), 0x83);
    }

    #[test]
    fn test_verify() {
        let mut bytes = b"123456789".to_vec();
        bytes.push(0x83);
        assert_eq!(verify(&bytes).unwrap(), b"123456789");

        *bytes.last_mut().unwrap() = 0x84;
        let err = verify(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);
        assert!(err.message().contains("expected 0x83, got 0x84"));

        assert!(verify(&[]).is_err());
    }
}
