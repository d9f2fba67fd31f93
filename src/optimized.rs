// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The optimized evaluator.
//!
//! Squaring a complex number and then taking its squared magnitude
//! computes `re * re` and `im * im` twice per iteration.  Here we keep
//! the orbit as two plain `f64` registers and carry the squares from
//! the magnitude check of one iteration into the multiplication of the
//! next.  The operations, and their order, are exactly those `num`
//! performs, so the counts are bit-for-bit the same as the
//! `NaiveEvaluator`'s.

use errors::EscapeError;
use evaluator::{EscapeEvaluator, IterationBound, ESCAPE_NORM_SQR};
use num::Complex;

/// Iterates the orbit on split real and imaginary registers.
#[derive(Copy, Clone, Debug, Default)]
pub struct OptimizedEvaluator;

impl EscapeEvaluator for OptimizedEvaluator {
    fn name(&self) -> &'static str {
        "optimized"
    }

    #[inline]
    fn escape_count(&self, c: Complex<f64>, bound: IterationBound) -> Result<usize, EscapeError> {
        let (cx, cy) = (c.re, c.im);
        let (mut x, mut y) = (0.0_f64, 0.0_f64);
        let (mut x2, mut y2) = (0.0_f64, 0.0_f64);
        for i in 1..=bound.get() {
            let xy = x * y;
            x = x2 - y2 + cx;
            y = xy + xy + cy;
            x2 = x * x;
            y2 = y * y;
            let norm = x2 + y2;
            // One branch on the hot path: NaN fails every comparison.
            if !(norm <= ESCAPE_NORM_SQR) {
                if norm.is_nan() {
                    return Err(EscapeError::NumericOverflow {
                        re: cx,
                        im: cy,
                        iteration: i,
                    });
                }
                return Ok(i);
            }
        }
        Ok(bound.get())
    }
}
