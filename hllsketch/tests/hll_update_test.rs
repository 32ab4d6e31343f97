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

//! Update and estimation tests for HllSketch

use googletest::assert_that;
use googletest::prelude::le;
use hllsketch::funnel::I64Funnel;
use hllsketch::funnel::StringFunnel;
use hllsketch::hll::HllSketch;

const BASE: i64 = i64::MAX >> 1;

fn sketch_with(lg_m: u8, register_width: u8, n: i64) -> HllSketch<I64Funnel> {
    let mut sketch = HllSketch::builder()
        .lg_m(lg_m)
        .register_width(register_width)
        .build(I64Funnel)
        .unwrap();
    for i in 0..n {
        sketch.put(&(BASE + i));
    }
    sketch
}

fn relative_diff(estimate: u64, actual: u64) -> f64 {
    (estimate as f64 - actual as f64).abs() / actual as f64
}

#[test]
fn test_empty() {
    let sketch = HllSketch::new(I64Funnel);
    assert!(sketch.is_empty());
    assert_eq!(sketch.estimate(), 0);
    assert!(sketch.registers().iter().all(|v| v == 0));
}

#[test]
fn test_estimates_across_cardinalities() {
    for (n, expected) in [
        (10, 10),
        (77, 76),
        (1000, 1006),
        (1027, 1031),
        (37659, 38215),
        (100_000, 100_592),
    ] {
        let sketch = sketch_with(11, 5, n);
        assert_eq!(sketch.estimate(), expected, "estimate for {n} distinct values");
        assert_that!(
            relative_diff(sketch.estimate(), n as u64),
            le(sketch.relative_error())
        );
    }
}

#[test]
fn test_large_cardinality_within_error_bound() {
    let sketch = sketch_with(11, 5, 2_000_000);
    assert_eq!(sketch.estimate(), 1_958_021);
    assert_that!(
        relative_diff(sketch.estimate(), 2_000_000),
        le(sketch.relative_error())
    );
}

#[test]
fn test_other_configurations() {
    for (lg_m, width, expected) in [
        (11, 6, 100_592),
        (11, 8, 100_592),
        (14, 5, 98_653),
        (16, 6, 100_025),
    ] {
        let sketch = sketch_with(lg_m, width, 100_000);
        assert_eq!(
            sketch.estimate(),
            expected,
            "lg_m {lg_m} register_width {width}"
        );
        assert_that!(
            relative_diff(sketch.estimate(), 100_000),
            le(3.0 * sketch.relative_error())
        );
    }
}

#[test]
fn test_relative_error() {
    assert_eq!(sketch_with(4, 5, 0).relative_error(), 0.26);
    assert_eq!(sketch_with(11, 5, 0).relative_error(), 1.04 / 2048f64.sqrt());
}

#[test]
fn test_duplicates_do_not_change_registers() {
    let once = sketch_with(11, 5, 1000);
    let mut twice = once.clone();
    for i in 0..1000 {
        twice.put(&(BASE + i));
    }
    assert_eq!(once, twice);
    assert_eq!(twice.estimate(), 1006);
}

#[test]
fn test_insertion_order_does_not_matter() {
    let forward = sketch_with(11, 5, 500);
    let mut backward = HllSketch::new(I64Funnel);
    for i in (0..500).rev() {
        backward.put(&(BASE + i));
    }
    assert_eq!(forward, backward);
}

#[test]
fn test_strings() {
    let mut sketch = HllSketch::builder().lg_m(12).build(StringFunnel).unwrap();
    for i in 0..1000 {
        sketch.put(&format!("item_{i}"));
    }
    assert_that!(
        relative_diff(sketch.estimate(), 1000),
        le(3.0 * sketch.relative_error())
    );
}

#[test]
fn test_put_nullable() {
    let mut sketch = HllSketch::new(StringFunnel);
    sketch.put_nullable(None);
    sketch.put_nullable(None);
    assert_eq!(sketch.estimate(), 1);
    sketch.put_nullable(Some("apple"));
    assert_eq!(sketch.estimate(), 2);
}
