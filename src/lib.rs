#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time grid evaluator
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which the orbit `z = z * z + c`, started at zero, never runs
//! off to infinity.  We can't iterate forever, so instead we iterate
//! up to some bound and count how long each point takes to leave the
//! disk of radius two; once outside, it is guaranteed never to come
//! back.  That count, divided by the bound, is the number this crate
//! produces for every point of a rectangular grid.
//!
//! There are two evaluators behind a single trait: a reference one
//! written directly in complex arithmetic, and an optimized one that
//! must agree with it to the last bit.  Either can be handed to the
//! `GridImageBuilder`, which fills the grid on one thread or many.
//! Turning the grid into a picture is somebody else's job.

extern crate crossbeam;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;

pub mod errors;
pub mod evaluator;
pub mod grid;
pub mod naive;
pub mod optimized;
pub mod planes;

pub use errors::EscapeError;
pub use evaluator::{EscapeEvaluator, IterationBound, Strategy, ESCAPE_NORM_SQR};
pub use grid::{first_disagreement, Disagreement, GridImageBuilder, ResultGrid};
pub use naive::NaiveEvaluator;
pub use optimized::OptimizedEvaluator;
pub use planes::{linspace, PlaneMapper};
