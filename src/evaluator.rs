// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The contract shared by every escape-time evaluator, and the small
//! vocabulary of types it is written in.
//!
//! An evaluator takes a point `c` on the complex plane and iterates
//! `z = z * z + c` starting from zero.  Once the squared magnitude of
//! `z` is greater than four the orbit is guaranteed to run off to
//! infinity, and the number of iterations it took to get there is the
//! "escape count."  Points that never leave the disk within the bound
//! report the bound itself.

use std::fmt;
use std::str::FromStr;

use errors::EscapeError;
use naive::NaiveEvaluator;
use num::Complex;
use optimized::OptimizedEvaluator;

/// Squared radius of the escape disk.  Strictly greater than this is
/// an escape; equal to it is not.
pub const ESCAPE_NORM_SQR: f64 = 4.0;

/// The maximum number of times the map is applied to a single sample.
/// Can only hold values of one or more.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IterationBound(usize);

impl IterationBound {
    /// Validates a caller-supplied bound.
    pub fn new(iterate_max: usize) -> Result<IterationBound, EscapeError> {
        if iterate_max < 1 {
            return Err(EscapeError::InvalidArgument { iterate_max });
        }
        Ok(IterationBound(iterate_max))
    }

    /// The bound as a plain count.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// Normalizes an escape count into the half-open interval (0, 1].
    #[inline]
    pub fn fraction(self, count: usize) -> f64 {
        count as f64 / self.0 as f64
    }
}

impl fmt::Display for IterationBound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything that can count how long a sample takes to escape.
///
/// Implementations must be pure: the same sample and bound always
/// give the same answer, and nothing is shared between calls, so a
/// single evaluator can be handed to any number of threads.
pub trait EscapeEvaluator: Sync {
    /// Short human-readable name, used in logs and benchmarks.
    fn name(&self) -> &'static str;

    /// Counts the iterations until the orbit of `c` leaves the escape
    /// disk, or returns the bound if it never does.  The result is
    /// always in `1..=bound`.
    fn escape_count(&self, c: Complex<f64>, bound: IterationBound) -> Result<usize, EscapeError>;

    /// As `escape_count`, but validates a raw bound first.
    fn evaluate(&self, c: Complex<f64>, iterate_max: usize) -> Result<usize, EscapeError> {
        let bound = IterationBound::new(iterate_max)?;
        self.escape_count(c, bound)
    }
}

static NAIVE: NaiveEvaluator = NaiveEvaluator;
static OPTIMIZED: OptimizedEvaluator = OptimizedEvaluator;

/// Names one of the interchangeable evaluators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Straightforward complex arithmetic.  The baseline every other
    /// evaluator has to agree with.
    Reference,
    /// Split real and imaginary registers with the squares carried
    /// from one iteration into the next.
    Optimized,
}

impl Strategy {
    /// Every strategy, in a stable order.
    pub const ALL: [Strategy; 2] = [Strategy::Reference, Strategy::Optimized];

    /// The evaluator this strategy stands for.
    pub fn evaluator(self) -> &'static dyn EscapeEvaluator {
        match self {
            Strategy::Reference => &NAIVE,
            Strategy::Optimized => &OPTIMIZED,
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reference" | "naive" => Ok(Strategy::Reference),
            "optimized" => Ok(Strategy::Optimized),
            _ => Err(format!(
                "Unknown evaluator '{}'; expected 'reference' or 'optimized'",
                s
            )),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.evaluator().name())
    }
}
