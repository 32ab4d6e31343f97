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

//! Byte-level building blocks shared by the sketch encoders and decoders.

use std::io;
use std::io::Cursor;

use byteorder::BigEndian;
use byteorder::ReadBytesExt;

pub(crate) mod checksum;

/// Growable output buffer for a serialized sketch.
pub(crate) struct SketchBytes {
    bytes: Vec<u8>,
}

impl SketchBytes {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Appends the checksum of everything written so far and returns the buffer.
    pub fn finish_with_checksum(mut self) -> Vec<u8> {
        let sum = checksum::checksum(&self.bytes);
        self.bytes.push(sum);
        self.bytes
    }

    pub fn write(&mut self, buf: &[u8]) {
        self.bytes.extend_from_slice(buf);
    }

    pub fn write_u8(&mut self, n: u8) {
        self.bytes.push(n);
    }

    pub fn write_i32_be(&mut self, n: i32) {
        self.write(&n.to_be_bytes());
    }

    pub fn write_u64_be(&mut self, n: u64) {
        self.write(&n.to_be_bytes());
    }
}

/// Forward-only reader over a serialized sketch payload.
pub(crate) struct SketchSlice<'a> {
    slice: Cursor<&'a [u8]>,
}

impl<'a> SketchSlice<'a> {
    pub fn new(slice: &'a [u8]) -> Self {
        SketchSlice {
            slice: Cursor::new(slice),
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        let slice = *self.slice.get_ref();
        let pos = (self.slice.position() as usize).min(slice.len());
        &slice[pos..]
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.slice.read_u8()
    }

    pub fn read_i32_be(&mut self) -> io::Result<i32> {
        self.slice.read_i32::<BigEndian>()
    }

    pub fn read_u64_be(&mut self) -> io::Result<u64> {
        self.slice.read_u64::<BigEndian>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let mut bytes = SketchBytes::with_capacity(16);
        bytes.write_u8(0xE7);
        bytes.write_i32_be(2);
        bytes.write_u64_be(0x0102_0304_0506_0708);
        let out = bytes.finish_with_checksum();
        assert_eq!(out.len(), 1 + 4 + 8 + 1);
        assert_eq!(&out[1..5], &[0, 0, 0, 2]);

        let mut slice = SketchSlice::new(&out);
        assert_eq!(slice.read_u8().unwrap(), 0xE7);
        assert_eq!(slice.read_i32_be().unwrap(), 2);
        assert_eq!(slice.read_u64_be().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(slice.remaining().len(), 1);
        slice.read_u8().unwrap();
        assert!(slice.remaining().is_empty());
        assert!(slice.read_u8().is_err());
    }
}
