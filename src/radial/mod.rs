//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Radial and angular digitization and integration over the signal plane.
//!

pub mod digitize;
pub mod grid;
pub mod integrate;

pub use digitize::{BinSpec, Digitization, Quantity};
pub use grid::{CoordinateGrid, Shift};
pub use integrate::{integrate, Reduction};

use crate::error::{Result, Warning};
use crate::image::{Image, Sample};

impl<T: Sample> Image<T> {
    /// Returns the coordinate grid of the signal plane.
    pub fn coordinate_grid(&self, shifted: bool, shift: Option<Shift>) -> Result<CoordinateGrid> {
        let (row_axis, col_axis) = self.signal_axes()?;
        CoordinateGrid::with_shift(row_axis, col_axis, shifted, shift)
    }

    pub fn digitized_radius(&self, bins: &BinSpec, shifted: bool) -> Result<Digitization> {
        Digitization::radius(&self.coordinate_grid(shifted, None)?, bins)
    }

    pub fn digitized_angle(&self, bins: &BinSpec, shifted: bool) -> Result<Digitization> {
        Digitization::angle(&self.coordinate_grid(shifted, None)?, bins)
    }

    /// Integrates every signal plane over radius bins.
    ///
    /// If `shifted`, radius is measured from the plane center (index `size / 2` of each signal axis),
    /// otherwise from the axes' zero coordinates. Returns the profiles and the calibration warnings
    /// raised for the signal axes.
    ///
    pub fn integrate_radial(
        &self,
        bins: &BinSpec,
        shifted: bool,
        reduction: Reduction
    ) -> Result<(Image<T>, Vec<Warning>)> {
        let digitization = self.digitized_radius(bins, shifted)?;
        Ok((integrate(self, &digitization, reduction)?, digitization.warnings().to_vec()))
    }

    /// Integrates every signal plane over angle bins covering (-π, π]; see `integrate_radial`.
    pub fn integrate_angular(
        &self,
        bins: &BinSpec,
        shifted: bool,
        reduction: Reduction
    ) -> Result<(Image<T>, Vec<Warning>)> {
        let digitization = self.digitized_angle(bins, shifted)?;
        Ok((integrate(self, &digitization, reduction)?, digitization.warnings().to_vec()))
    }
}
