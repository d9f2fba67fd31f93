// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane with an arbitrary pair of
//! corners defining the leftlower and rightupper corners.  The
//! mapper's job is to hand the grid builder its two coordinate axes.
use errors::EscapeError;
use num::Complex;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.  For that reason,
/// the lower-left-hand corner is not included.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of the
/// Complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

/// `count` evenly spaced values from `start` to `end`, both ends
/// included.  A single value is just `start`; zero values is an empty
/// axis.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / ((count - 1) as f64);
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        end
                    } else {
                        start + (i as f64) * step
                    }
                })
                .collect()
        }
    }
}

/// Maps pixels of an integral plane onto evenly spaced samples of a
/// rectangle in the complex plane.  The corners of the rectangle are
/// sampled exactly.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The right-upper hand corner of the integral cartesian plane.
    /// The left-lower is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    /// The two coordinates defining the complex cartesian plane,
    /// left-lower and right-upper
    pub complex_plane: ComplexPlane,
}

impl PlaneMapper {
    /// Takes the size of the integral plane, and two points describing
    /// the complex plane.  Fails if either corner is not a finite
    /// number, or if the corners are the wrong way around.
    pub fn new(
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<PlaneMapper, EscapeError> {
        if !(leftlower.re.is_finite()
            && leftlower.im.is_finite()
            && rightupper.re.is_finite()
            && rightupper.im.is_finite())
        {
            return Err(EscapeError::InvalidPlane {
                reason: "The corners of the complex plane must be finite.".to_string(),
            });
        }

        if rightupper.re < leftlower.re {
            return Err(EscapeError::InvalidPlane {
                reason: "The left lower corner is not to the left of the right upper corner."
                    .to_string(),
            });
        }

        if rightupper.im < leftlower.im {
            return Err(EscapeError::InvalidPlane {
                reason: "The left lower corner is not lower than the right upper corner."
                    .to_string(),
            });
        }

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(leftlower, rightupper),
        })
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane has no area.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// The real part of every column, left to right.
    pub fn real_axis(&self) -> Vec<f64> {
        linspace(
            self.complex_plane.0.re,
            self.complex_plane.1.re,
            self.integral_plane.0,
        )
    }

    /// The imaginary part of every row, bottom to top.
    pub fn imaginary_axis(&self) -> Vec<f64> {
        linspace(
            self.complex_plane.0.im,
            self.complex_plane.1.im,
            self.integral_plane.1,
        )
    }

    /// Both axes at once, ready for `GridImageBuilder::build`.
    pub fn axes(&self) -> (Vec<f64>, Vec<f64>) {
        (self.real_axis(), self.imaginary_axis())
    }
}
