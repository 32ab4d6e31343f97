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

//! Dense HyperLogLog sketch for approximate distinct counting.
//!
//! The sketch keeps `m = 2^lg_m` registers. Each value is hashed to 64 bits;
//! the top `lg_m` bits select a register and the register keeps the maximum
//! rank (leading zeros of the remaining bits plus one) ever observed. The
//! harmonic mean of the registers, with small- and large-range corrections,
//! gives the estimate.
//!
//! # Register width
//!
//! Registers are packed into a [`RegisterArray`] of 1 to 8 bits each. Five bits
//! (the default) cover ranks up to 31, which is enough for hashes of any
//! practical cardinality with `lg_m >= 4`; wider registers only cost memory.
//!
//! # Accuracy
//!
//! The relative standard error is `1.04 / sqrt(m)`: about 2.3% for the default
//! `lg_m = 11`.

mod array;
mod estimator;
mod serialization;
mod sketch;

pub use self::array::RegisterArray;
pub use self::array::min_bytes_len;
pub use self::sketch::HllSketch;
pub use self::sketch::HllSketchBuilder;

/// Default log2 of the number of registers.
pub const DEFAULT_LG_M: u8 = 11;
/// Smallest supported log2 of the number of registers.
pub const MIN_LG_M: u8 = 4;
/// Largest supported log2 of the number of registers.
pub const MAX_LG_M: u8 = 31;

/// Default bits per register.
pub const DEFAULT_REGISTER_WIDTH: u8 = 5;
pub const MIN_REGISTER_WIDTH: u8 = 1;
pub const MAX_REGISTER_WIDTH: u8 = 8;
