// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The reference evaluator.
//!
//! This is the escape-time loop written the way it reads on paper:
//! `z` is a complex number from the very first line, it gets squared,
//! `c` gets added, and we look at how far from the origin it ended
//! up.  Nothing clever happens here, which is the point; every other
//! evaluator is checked against this one.

use errors::EscapeError;
use evaluator::{EscapeEvaluator, IterationBound, ESCAPE_NORM_SQR};
use num::Complex;

/// Iterates the orbit with `num`'s complex arithmetic.
#[derive(Copy, Clone, Debug, Default)]
pub struct NaiveEvaluator;

impl EscapeEvaluator for NaiveEvaluator {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn escape_count(&self, c: Complex<f64>, bound: IterationBound) -> Result<usize, EscapeError> {
        let mut z: Complex<f64> = Complex { re: 0.0, im: 0.0 };
        for i in 1..=bound.get() {
            z = z * z + c;
            let norm = z.norm_sqr();
            if norm > ESCAPE_NORM_SQR {
                return Ok(i);
            }
            if norm.is_nan() {
                return Err(EscapeError::NumericOverflow {
                    re: c.re,
                    im: c.im,
                    iteration: i,
                });
            }
        }
        Ok(bound.get())
    }
}
