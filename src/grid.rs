// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Grid evaluation.
//!
//! Takes two coordinate axes, forms every complex sample
//! `xs[i] + ys[j]i`, asks an evaluator how long each one takes to
//! escape, and stores the answer as a fraction of the iteration bound.
//! Every cell is independent of every other, so the multi-threaded
//! build just hands whole rows to whichever worker asks for one next.

use std::iter::Zip;
use std::slice::{Chunks, ChunksMut, Iter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam::thread::ScopedJoinHandle;
use errors::EscapeError;
use evaluator::{EscapeEvaluator, IterationBound};
use num::Complex;

type RowQueue<'a> = Arc<Mutex<Zip<Iter<'a, f64>, ChunksMut<'a, f64>>>>;

/// A two-dimensional array of escape fractions.  Cell `(i, j)` holds
/// the fraction for the sample `xs[i] + ys[j]i`; all the cells sharing
/// an `i` are stored together and make up row `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultGrid {
    shape: (usize, usize),
    cells: Vec<f64>,
}

impl ResultGrid {
    fn zeroed(width: usize, height: usize) -> Result<ResultGrid, EscapeError> {
        let too_large = EscapeError::GridTooLarge { width, height };
        let len = width.checked_mul(height).ok_or_else(|| too_large.clone())?;
        let mut cells: Vec<f64> = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| too_large)?;
        cells.resize(len, 0.0);
        Ok(ResultGrid {
            shape: (width, height),
            cells,
        })
    }

    /// `(|xs|, |ys|)`.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if either axis was empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The fraction for `xs[i] + ys[j]i`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.shape.0 || j >= self.shape.1 {
            return None;
        }
        Some(self.cells[i * self.shape.1 + j])
    }

    /// Every fraction sharing the real part `xs[i]`, in `ys` order.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.shape.0 {
            return None;
        }
        let height = self.shape.1;
        Some(&self.cells[i * height..(i + 1) * height])
    }

    /// Walks the rows in `xs` order.  Yields exactly `|xs|` rows, even
    /// when `ys` is empty.
    pub fn rows(&self) -> Rows {
        Rows {
            index: 0,
            grid: self,
        }
    }

    /// The raw cells, row after row.
    pub fn as_slice(&self) -> &[f64] {
        &self.cells
    }
}

/// Iterator over the rows of a `ResultGrid`.
pub struct Rows<'a> {
    index: usize,
    grid: &'a ResultGrid,
}

impl<'a> Iterator for Rows<'a> {
    type Item = &'a [f64];

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.grid.row(self.index)?;
        self.index += 1;
        Some(row)
    }
}

/// Builds a `ResultGrid` from two axes using one evaluator.  The
/// evaluator is borrowed, never owned, so the same one can be reused
/// across builds or swapped for another without touching the builder's
/// callers.
pub struct GridImageBuilder<'a, E: EscapeEvaluator + ?Sized + 'a> {
    evaluator: &'a E,
    threads: usize,
}

impl<'a, E: EscapeEvaluator + ?Sized + 'a> GridImageBuilder<'a, E> {
    /// A single-threaded builder around `evaluator`.
    pub fn new(evaluator: &'a E) -> Self {
        GridImageBuilder {
            evaluator,
            threads: 1,
        }
    }

    /// Sets the number of worker threads.  Zero is treated as one.
    ///
    /// With more than one thread, a panic inside the evaluator is caught
    /// at the worker boundary and reported as
    /// `EscapeError::WorkerPanicked`.  A single-threaded build runs the
    /// evaluator on the caller's thread, so the same panic unwinds
    /// straight through `build`.
    pub fn threads(mut self, threads: usize) -> Self {
        if threads == 0 {
            warn!("A thread count of zero makes no sense; using one.");
        }
        self.threads = threads.max(1);
        self
    }

    /// Evaluates every `xs[i] + ys[j]i` and returns the escape
    /// fractions.  The bound is checked before any cell is touched, and
    /// no grid at all comes back if any cell fails.
    pub fn build(
        &self,
        xs: &[f64],
        ys: &[f64],
        iterate_max: usize,
    ) -> Result<ResultGrid, EscapeError> {
        let bound = IterationBound::new(iterate_max)?;
        let mut grid = ResultGrid::zeroed(xs.len(), ys.len())?;
        debug!(
            "Building a {}x{} grid with the {} evaluator, bound {}, {} thread(s)",
            xs.len(),
            ys.len(),
            self.evaluator.name(),
            bound,
            self.threads
        );
        if grid.is_empty() {
            return Ok(grid);
        }

        if self.threads == 1 {
            self.fill_single(xs, ys, bound, &mut grid.cells)?;
        } else {
            self.fill_threaded(xs, ys, bound, &mut grid.cells)?;
        }
        Ok(grid)
    }

    fn fill_single(
        &self,
        xs: &[f64],
        ys: &[f64],
        bound: IterationBound,
        cells: &mut [f64],
    ) -> Result<(), EscapeError> {
        for ((i, j), cell) in iproduct!(0..xs.len(), 0..ys.len()).zip(cells.iter_mut()) {
            let count = self.evaluator.escape_count(Complex::new(xs[i], ys[j]), bound)?;
            *cell = bound.fraction(count);
        }
        Ok(())
    }

    fn fill_threaded(
        &self,
        xs: &[f64],
        ys: &[f64],
        bound: IterationBound,
        cells: &mut [f64],
    ) -> Result<(), EscapeError> {
        let evaluator = self.evaluator;
        let rows: RowQueue = Arc::new(Mutex::new(xs.iter().zip(cells.chunks_mut(ys.len()))));
        let abort = AtomicBool::new(false);

        let outcome = crossbeam::scope(|spawner| {
            let handles: Vec<ScopedJoinHandle<Result<usize, EscapeError>>> = (0..self.threads)
                .map(|worker| {
                    let rows = rows.clone();
                    let abort = &abort;
                    spawner.spawn(move |_| -> Result<usize, EscapeError> {
                        let done = drain_rows(evaluator, &rows, abort, ys, bound)?;
                        trace!("Worker {} finished {} row(s)", worker, done);
                        Ok(done)
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or(Err(EscapeError::WorkerPanicked)))
                .collect::<Result<Vec<usize>, EscapeError>>()
        });

        match outcome {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(EscapeError::WorkerPanicked),
        }
    }
}

// Pulls rows off the shared queue until it runs dry, filling each one
// in place.  Returns the number of rows this worker completed.  Stops
// taking rows once any worker has failed, and raises `abort` itself
// when a cell fails here.
fn drain_rows<E: EscapeEvaluator + ?Sized>(
    evaluator: &E,
    rows: &RowQueue,
    abort: &AtomicBool,
    ys: &[f64],
    bound: IterationBound,
) -> Result<usize, EscapeError> {
    let mut done = 0;
    loop {
        if abort.load(Ordering::Relaxed) {
            return Ok(done);
        }
        let row = {
            let mut queue = rows.lock().map_err(|_| EscapeError::WorkerPanicked)?;
            queue.next()
        };
        match row {
            Some((&re, slots)) => {
                for (slot, &im) in slots.iter_mut().zip(ys.iter()) {
                    let count = match evaluator.escape_count(Complex::new(re, im), bound) {
                        Ok(count) => count,
                        Err(e) => {
                            abort.store(true, Ordering::Relaxed);
                            return Err(e);
                        }
                    };
                    *slot = bound.fraction(count);
                }
                done += 1;
            }
            None => {
                return Ok(done);
            }
        }
    }
}

/// Where two grids stop agreeing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Disagreement {
    /// The grids have different shapes, left then right; no cell was
    /// compared.
    Shape((usize, usize), (usize, usize)),
    /// The first cell, `(i, j)`, whose bits differ.
    Cell(usize, usize),
}

/// Compares two grids row by row and reports the first place at which
/// they differ, if any.  Cells are compared bit for bit.
pub fn first_disagreement(left: &ResultGrid, right: &ResultGrid) -> Option<Disagreement> {
    if left.shape() != right.shape() {
        return Some(Disagreement::Shape(left.shape(), right.shape()));
    }
    let height = left.shape().1;
    let cells: Zip<Chunks<f64>, Chunks<f64>> = left
        .as_slice()
        .chunks(height.max(1))
        .zip(right.as_slice().chunks(height.max(1)));
    for (i, (l, r)) in cells.enumerate() {
        if let Some(j) = l.iter().zip(r.iter()).position(|(a, b)| a.to_bits() != b.to_bits()) {
            return Some(Disagreement::Cell(i, j));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use evaluator::Strategy;
    use naive::NaiveEvaluator;
    use optimized::OptimizedEvaluator;
    use planes::linspace;

    #[test]
    fn shape_follows_the_axes() {
        let xs = linspace(-2.0, 0.5, 7);
        let ys = linspace(-1.25, 1.25, 5);
        let grid = GridImageBuilder::new(&NaiveEvaluator).build(&xs, &ys, 50).unwrap();
        assert_eq!(grid.shape(), (7, 5));
        assert_eq!(grid.len(), 35);
        assert_eq!(grid.rows().count(), 7);
        assert!(grid.rows().all(|row| row.len() == 5));
    }

    #[test]
    fn empty_axes_give_empty_grids() {
        let ys = linspace(-1.0, 1.0, 4);
        let builder = GridImageBuilder::new(&NaiveEvaluator);

        let grid = builder.build(&[], &ys, 10).unwrap();
        assert_eq!(grid.shape(), (0, 4));
        assert!(grid.is_empty());
        assert_eq!(grid.rows().count(), 0);

        let grid = builder.build(&ys, &[], 10).unwrap();
        assert_eq!(grid.shape(), (4, 0));
        assert!(grid.is_empty());
        assert_eq!(grid.rows().count(), 4);
    }

    #[test]
    fn zero_bound_fails_even_on_empty_axes() {
        let builder = GridImageBuilder::new(&OptimizedEvaluator);
        assert_eq!(
            builder.build(&[], &[], 0),
            Err(EscapeError::InvalidArgument { iterate_max: 0 })
        );
        assert_eq!(
            builder.threads(4).build(&[0.0], &[0.0], 0),
            Err(EscapeError::InvalidArgument { iterate_max: 0 })
        );
    }

    #[test]
    fn cells_are_indexed_x_first() {
        let xs = [0.0, 3.0];
        let ys = [0.0, 0.5, 3.0];
        let grid = GridImageBuilder::new(&NaiveEvaluator).build(&xs, &ys, 10).unwrap();
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert_eq!(grid.get(1, 0), Some(0.1));
        assert_eq!(grid.get(0, 2), Some(0.1));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 3), None);
        assert_eq!(grid.row(1).map(|r| r.len()), Some(3));
    }

    #[test]
    fn fractions_stay_in_unit_interval() {
        let xs = linspace(-2.5, 1.0, 40);
        let ys = linspace(-1.5, 1.5, 30);
        let grid = GridImageBuilder::new(&OptimizedEvaluator).build(&xs, &ys, 100).unwrap();
        assert!(grid.as_slice().iter().all(|&f| f > 0.0 && f <= 1.0));
    }

    #[test]
    fn threaded_build_matches_single() {
        let xs = linspace(-2.0, 0.5, 33);
        let ys = linspace(-1.25, 1.25, 17);
        for strategy in Strategy::ALL.iter() {
            let evaluator = strategy.evaluator();
            let single = GridImageBuilder::new(evaluator).build(&xs, &ys, 200).unwrap();
            for &threads in &[2, 3, 8, 64] {
                let threaded = GridImageBuilder::new(evaluator)
                    .threads(threads)
                    .build(&xs, &ys, 200)
                    .unwrap();
                assert_eq!(first_disagreement(&single, &threaded), None);
            }
        }
    }

    #[test]
    fn zero_threads_means_one() {
        let grid = GridImageBuilder::new(&NaiveEvaluator)
            .threads(0)
            .build(&[0.0], &[0.0], 5)
            .unwrap();
        assert_eq!(grid.get(0, 0), Some(1.0));
    }

    #[test]
    fn a_bad_cell_aborts_the_whole_build() {
        let xs = [0.0, std::f64::NAN, 0.25];
        let ys = linspace(-0.5, 0.5, 9);
        for &threads in &[1, 3] {
            let result = GridImageBuilder::new(&OptimizedEvaluator)
                .threads(threads)
                .build(&xs, &ys, 20);
            match result {
                Err(EscapeError::NumericOverflow { .. }) => {}
                other => panic!("expected an overflow, got {:?}", other),
            }
        }
    }

    #[test]
    fn disagreement_is_located() {
        let mut left = ResultGrid::zeroed(2, 3).unwrap();
        let right = left.clone();
        assert_eq!(first_disagreement(&left, &right), None);
        left.cells[4] = 0.5;
        assert_eq!(first_disagreement(&left, &right), Some(Disagreement::Cell(1, 1)));
    }

    #[test]
    fn shape_mismatch_is_not_a_cell() {
        let left = ResultGrid::zeroed(2, 3).unwrap();
        let right = ResultGrid::zeroed(3, 2).unwrap();
        assert_eq!(
            first_disagreement(&left, &right),
            Some(Disagreement::Shape((2, 3), (3, 2)))
        );
    }

    #[test]
    fn oversized_grids_are_refused() {
        assert_eq!(
            ResultGrid::zeroed(std::usize::MAX, 2),
            Err(EscapeError::GridTooLarge {
                width: std::usize::MAX,
                height: 2,
            })
        );
        assert_eq!(
            ResultGrid::zeroed(1, std::usize::MAX / 2),
            Err(EscapeError::GridTooLarge {
                width: 1,
                height: std::usize::MAX / 2,
            })
        );
    }

    // Panics on every sample with a real part of exactly one.
    struct PanicsOnOne;

    impl EscapeEvaluator for PanicsOnOne {
        fn name(&self) -> &'static str {
            "panics-on-one"
        }

        fn escape_count(&self, c: Complex<f64>, bound: IterationBound) -> Result<usize, EscapeError> {
            if c.re == 1.0 {
                panic!("refusing to evaluate {}", c);
            }
            NaiveEvaluator.escape_count(c, bound)
        }
    }

    #[test]
    fn a_panicking_worker_fails_the_build() {
        let xs = linspace(-2.0, 2.0, 9);
        let ys = linspace(-1.0, 1.0, 5);
        let result = GridImageBuilder::new(&PanicsOnOne)
            .threads(3)
            .build(&xs, &ys, 50);
        assert_eq!(result, Err(EscapeError::WorkerPanicked));
    }

    #[test]
    fn raised_abort_flag_stops_workers_before_the_next_row() {
        let xs = [0.0, 0.25, 0.5];
        let ys = [0.0, 0.5];
        let mut cells = vec![0.0; 6];
        let bound = IterationBound::new(10).unwrap();
        let abort = AtomicBool::new(true);
        {
            let rows: RowQueue = Arc::new(Mutex::new(xs.iter().zip(cells.chunks_mut(2))));
            assert_eq!(drain_rows(&NaiveEvaluator, &rows, &abort, &ys, bound), Ok(0));
        }
        assert!(cells.iter().all(|&f| f == 0.0));
    }

    #[test]
    fn a_failing_cell_raises_the_abort_flag() {
        let xs = [0.0, std::f64::NAN, 0.5];
        let ys = [0.0, 0.5];
        let mut cells = vec![0.0; 6];
        let bound = IterationBound::new(10).unwrap();
        let abort = AtomicBool::new(false);
        {
            let rows: RowQueue = Arc::new(Mutex::new(xs.iter().zip(cells.chunks_mut(2))));
            match drain_rows(&OptimizedEvaluator, &rows, &abort, &ys, bound) {
                Err(EscapeError::NumericOverflow { .. }) => {}
                other => panic!("expected an overflow, got {:?}", other),
            }
            // The row after the failure was never taken.
            assert_eq!(rows.lock().unwrap().next().map(|(&re, _)| re), Some(0.5));
        }
        assert!(abort.load(Ordering::Relaxed));
        assert_eq!(cells[0], 1.0);
        assert_eq!(cells[4], 0.0);
    }
}
