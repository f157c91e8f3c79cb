//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Coordinate grids of the signal plane.
//!

use cgmath::Vector2;
use crate::error::{Result, Warning};
use crate::image::Axis;
use rayon::prelude::*;

/// Additional translation of the grid origin; `x` refers to columns, `y` to rows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shift {
    /// Multiplied by the axis scales.
    Pixels(Vector2<f64>),
    /// In calibrated units.
    Scaled(Vector2<f64>)
}

/// Physical coordinates of each pixel of a signal plane.
#[derive(Clone, Debug)]
pub struct CoordinateGrid {
    /// Column coordinates.
    x: Vec<f64>,
    /// Row coordinates.
    y: Vec<f64>,
    /// Row and column scales.
    scales: (f64, f64),
    units: Option<String>,
    warnings: Vec<Warning>
}

impl CoordinateGrid {
    /// Creates the grid of `row_axis` x `col_axis`.
    ///
    /// If `shifted`, coordinates are re-centered so that index `size / 2` of each axis becomes 0
    /// (the position of the zero frequency after an FFT shift).
    ///
    pub fn new(row_axis: &Axis, col_axis: &Axis, shifted: bool) -> Result<CoordinateGrid> {
        CoordinateGrid::with_shift(row_axis, col_axis, shifted, None)
    }

    /// As `new`, with the origin additionally moved by `shift`.
    pub fn with_shift(row_axis: &Axis, col_axis: &Axis, shifted: bool, shift: Option<Shift>) -> Result<CoordinateGrid> {
        let mut x = axis_coordinates(col_axis, shifted)?;
        let mut y = axis_coordinates(row_axis, shifted)?;

        if let Some(shift) = shift {
            let s = match shift {
                Shift::Pixels(px) => Vector2{ x: px.x * col_axis.scale(), y: px.y * row_axis.scale() },
                Shift::Scaled(s) => s
            };
            x.iter_mut().for_each(|v| *v -= s.x);
            y.iter_mut().for_each(|v| *v -= s.y);
        }

        let warnings = check_calibration(row_axis, col_axis);
        for warning in &warnings {
            log::warn!("{}", warning);
        }

        Ok(CoordinateGrid{
            x,
            y,
            scales: (row_axis.scale(), col_axis.scale()),
            units: col_axis.units().or_else(|| row_axis.units()).map(|u| u.to_string()),
            warnings
        })
    }

    /// Creates the spatial frequency grid corresponding to the real-space axes `row_axis` x `col_axis`.
    ///
    /// Frequencies are spaced by `1 / (size * scale)`. If `shifted`, the zero frequency is at index `size / 2`,
    /// otherwise at index 0 with negative frequencies in the upper half (FFT order).
    ///
    pub fn frequency(row_axis: &Axis, col_axis: &Axis, shifted: bool) -> CoordinateGrid {
        let x = frequencies(col_axis.size(), col_axis.scale(), shifted);
        let y = frequencies(row_axis.size(), row_axis.scale(), shifted);
        let scales = (
            1.0 / (row_axis.size() as f64 * row_axis.scale()),
            1.0 / (col_axis.size() as f64 * col_axis.scale())
        );

        CoordinateGrid{
            x,
            y,
            scales,
            units: col_axis.units().or_else(|| row_axis.units()).map(reciprocal_units),
            warnings: vec![]
        }
    }

    pub fn rows(&self) -> usize { self.y.len() }

    pub fn cols(&self) -> usize { self.x.len() }

    pub fn x(&self) -> &[f64] { &self.x }

    pub fn y(&self) -> &[f64] { &self.y }

    /// Row and column scales.
    pub fn scales(&self) -> (f64, f64) { self.scales }

    pub fn units(&self) -> Option<&str> { self.units.as_deref() }

    pub fn warnings(&self) -> &[Warning] { &self.warnings }

    pub fn radius_at(&self, row: usize, col: usize) -> f64 {
        self.x[col].hypot(self.y[row])
    }

    /// Returns the angle in (-π, π].
    pub fn angle_at(&self, row: usize, col: usize) -> f64 {
        let angle = self.y[row].atan2(self.x[col]);
        if angle == -std::f64::consts::PI { std::f64::consts::PI } else { angle }
    }

    /// Returns the radius of every pixel (row-major).
    pub fn radius(&self) -> Vec<f64> {
        let cols = self.cols();
        (0..self.rows() * cols).into_par_iter().map(|i| self.radius_at(i / cols, i % cols)).collect()
    }

    /// Returns the angle of every pixel (row-major).
    pub fn angle(&self) -> Vec<f64> {
        let cols = self.cols();
        (0..self.rows() * cols).into_par_iter().map(|i| self.angle_at(i / cols, i % cols)).collect()
    }

    /// Returns the squared angular wavenumber `(2π)^2 (x^2 + y^2)` of every pixel of a frequency grid.
    pub fn k_squared(&self) -> Vec<f64> {
        let two_pi = 2.0 * std::f64::consts::PI;
        self.radius().into_iter().map(|r| (two_pi * r).powi(2)).collect()
    }
}

fn axis_coordinates(axis: &Axis, shifted: bool) -> Result<Vec<f64>> {
    let mut coords = (0..axis.size()).map(|i| axis.coordinate_at(i)).collect::<Result<Vec<f64>>>()?;
    if shifted && !coords.is_empty() {
        let center = coords[axis.size() / 2];
        coords.iter_mut().for_each(|c| *c -= center);
    }

    Ok(coords)
}

fn frequencies(size: usize, scale: f64, shifted: bool) -> Vec<f64> {
    let step = 1.0 / (size as f64 * scale);
    (0..size).map(|i| {
        let k = if shifted {
            i as isize - (size / 2) as isize
        } else if i < (size + 1) / 2 {
            i as isize
        } else {
            i as isize - size as isize
        };
        k as f64 * step
    }).collect()
}

pub(crate) fn reciprocal_units(units: &str) -> String {
    format!("1/{}", units)
}

fn check_calibration(row_axis: &Axis, col_axis: &Axis) -> Vec<Warning> {
    let mut warnings = vec![];

    for axis in &[row_axis, col_axis] {
        if axis.units().is_none() {
            warnings.push(Warning::UnitsUndefined{ axis: axis.name().to_string() });
        }
    }

    if let (Some(row_units), Some(col_units)) = (row_axis.units(), col_axis.units()) {
        if row_units != col_units {
            warnings.push(Warning::UnitsMismatch{ units: (row_units.to_string(), col_units.to_string()) });
        }
    }

    let (row_scale, col_scale) = (row_axis.scale(), col_axis.scale());
    if (row_scale - col_scale).abs() > 1.0e-9 * row_scale.abs().max(col_scale.abs()) {
        warnings.push(Warning::ScaleMismatch{ scales: (row_scale, col_scale) });
    }

    warnings
}
