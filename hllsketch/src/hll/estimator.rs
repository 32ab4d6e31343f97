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

//! Classic HyperLogLog cardinality estimator.
//!
//! The raw estimate `alpha * m^2 / sum(2^-M[j])` is corrected in two ranges:
//!
//! - **Small range** (`E <= 2.5m`): linear counting over the empty registers,
//!   `m * ln(m / V)`, when at least one register is still zero.
//! - **Large range** (`E > 2^32 / 30`): hash-collision correction
//!   `-2^32 * ln(1 - E / 2^32)`.

use crate::hll::array::RegisterArray;

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Bias correction constant for `m` registers.
pub(crate) fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.679,
        _ => 0.7213 / (1.0 + 1.079 / m as f64),
    }
}

/// Linear counting estimate for `m` registers of which `zeros` are empty.
#[inline]
pub(crate) fn linear_counting(m: f64, zeros: f64) -> f64 {
    m * (m / zeros).ln()
}

/// Standard error of the estimate for `2^lg_m` registers.
pub(crate) fn relative_error(lg_m: u8) -> f64 {
    1.04 / ((1u64 << lg_m) as f64).sqrt()
}

/// Estimated number of distinct values registered in `registers`.
pub(crate) fn estimate(registers: &RegisterArray) -> u64 {
    let m = registers.len() as f64;

    let mut sum = 0.0;
    let mut zeros = 0usize;
    for value in registers.iter() {
        sum += inv_pow2(value);
        if value == 0 {
            zeros += 1;
        }
    }

    let raw = alpha(registers.len()) * m * m / sum;
    let corrected = if raw <= 2.5 * m {
        if zeros > 0 {
            linear_counting(m, zeros as f64)
        } else {
            raw
        }
    } else if raw <= TWO_POW_32 / 30.0 {
        raw
    } else {
        -TWO_POW_32 * (1.0 - raw / TWO_POW_32).ln()
    };

    corrected.round() as u64
}

/// Compute 1 / 2^value (inverse power of 2)
#[inline]
fn inv_pow2(value: u32) -> f64 {
    if value <= 63 {
        1.0 / (1u64 << value) as f64
    } else {
        f64::exp2(-(value as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha() {
        assert_eq!(alpha(16), 0.673);
        assert_eq!(alpha(32), 0.697);
        assert_eq!(alpha(64), 0.679);
        let m = 2048.0;
        assert_eq!(alpha(2048), 0.7213 / (1.0 + 1.079 / m));
    }

    #[test]
    fn test_empty_registers_estimate_zero() {
        let registers = RegisterArray::new(16, 5).unwrap();
        assert_eq!(estimate(&registers), 0);
    }

    #[test]
    fn test_single_register_uses_linear_counting() {
        let mut registers = RegisterArray::new(16, 5).unwrap();
        registers.set(3, 5).unwrap();
        // 16 * ln(16 / 15) = 1.0326
        assert_eq!(estimate(&registers), 1);
    }

    #[test]
    fn test_all_registers_set_uses_raw_estimate() {
        let mut registers = RegisterArray::new(16, 5).unwrap();
        for i in 0..16 {
            registers.set(i, 1).unwrap();
        }
        // alpha * 16^2 / (16 * 0.5) = 21.536, no zeros left for linear counting.
        assert_eq!(estimate(&registers), 22);
    }

    #[test]
    fn test_relative_error() {
        assert_eq!(relative_error(4), 0.26);
        assert!((relative_error(11) - 0.022980970388562793).abs() < 1e-15);
    }

    #[test]
    fn test_inv_pow2() {
        assert_eq!(inv_pow2(0), 1.0);
        assert_eq!(inv_pow2(1), 0.5);
        assert_eq!(inv_pow2(10), 1.0 / 1024.0);
        assert_eq!(inv_pow2(255), f64::exp2(-255.0));
    }
}
