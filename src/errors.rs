// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one error type shared by the evaluators, the grid builder and
//! the plane mapper.

/// Everything that can go wrong while evaluating a sample or building
/// a grid.  None of these are retried; the computation is pure, so
/// trying again gives the same answer.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum EscapeError {
    /// The iteration bound must be at least one.
    #[fail(display = "iteration bound must be at least 1, got {}", iterate_max)]
    InvalidArgument {
        /// The bound the caller asked for.
        iterate_max: usize,
    },

    /// The orbit's squared magnitude became NaN, and so can no longer
    /// be compared against the escape threshold.
    #[fail(
        display = "orbit of {}{:+}i lost its magnitude at iteration {}",
        re, im, iteration
    )]
    NumericOverflow {
        /// Real part of the sample.
        re: f64,
        /// Imaginary part of the sample.
        im: f64,
        /// The iteration at which the magnitude stopped being a number.
        iteration: usize,
    },

    /// The viewing rectangle handed to the plane mapper is unusable.
    #[fail(display = "invalid plane: {}", reason)]
    InvalidPlane {
        /// What is wrong with it.
        reason: String,
    },

    /// The grid would not fit in memory.
    #[fail(display = "a {}x{} grid is too large to allocate", width, height)]
    GridTooLarge {
        /// Number of samples along the real axis.
        width: usize,
        /// Number of samples along the imaginary axis.
        height: usize,
    },

    /// A grid worker died before finishing its rows.
    #[fail(display = "a grid worker thread panicked")]
    WorkerPanicked,
}
