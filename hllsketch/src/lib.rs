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

//! # hllsketch
//!
//! Distinct-value counting over streams of typed values.
//!
//! - [`hll::HllSketch`]: a dense HyperLogLog sketch with a fixed memory
//!   footprint and a relative error of `1.04 / sqrt(2^lg_m)`.
//! - [`explicit::ExplicitSketch`]: an exact counter keeping every distinct hash.
//!
//! Values reach a sketch through a [`funnel::Funnel`], which turns them into
//! bytes and then into a MurmurHash3 hash ([`hash`]). Both sketches serialize to
//! a compact, checksummed byte format and can be merged with `union`, so shards
//! can be counted independently and combined later.
//!
//! # Examples
//!
//! ```
//! use hllsketch::funnel::StringFunnel;
//! use hllsketch::hll::HllSketch;
//!
//! let mut left = HllSketch::new(StringFunnel);
//! let mut right = HllSketch::new(StringFunnel);
//! left.put("apple");
//! right.put("banana");
//! right.put("apple");
//!
//! let merged = left.union(&right).unwrap();
//! assert_eq!(merged.estimate(), 2);
//!
//! let bytes = merged.serialize();
//! let restored = HllSketch::deserialize(&bytes, StringFunnel).unwrap();
//! assert_eq!(restored, merged);
//! ```

pub mod error;
pub mod explicit;
pub mod funnel;
pub mod hash;
pub mod hll;
pub mod sketch;

mod codec;
