//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Digitization of radius and angle grids into bins.
//!

use crate::error::{Error, Result, Warning};
use crate::image::Axis;
use rayon::prelude::*;
use std::f64::consts::PI;
use super::grid::CoordinateGrid;

/// How to choose bin edges.
#[derive(Clone, Debug, PartialEq)]
pub enum BinSpec {
    /// Radius: bin width equal to the pixel diagonal; angle: a single bin covering the full circle.
    Auto,

    /// Bin width in units of the digitized quantity; non-positive values mean `Auto`.
    Width(f64),

    /// Number of equal bins spanning the range of the quantity.
    Count(usize),

    /// Explicit, strictly increasing bin edges.
    Edges(Vec<f64>)
}

impl Default for BinSpec {
    fn default() -> BinSpec { BinSpec::Auto }
}

#[derive(Copy, Clone, Debug, PartialEq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Quantity {
    Radius,
    Angle
}

/// Bin label of every pixel of a signal plane.
#[derive(Clone, Debug)]
pub struct Digitization {
    quantity: Quantity,
    edges: Vec<f64>,
    labels: Vec<u32>,
    rows: usize,
    cols: usize,
    units: Option<String>,
    warnings: Vec<Warning>
}

impl Digitization {
    /// Label of pixels outside of all bins.
    pub const OUTSIDE: u32 = u32::MAX;

    /// Largest supported number of bins; labels must stay below `OUTSIDE`.
    pub const MAX_BINS: usize = 1 << 24;

    pub fn radius(grid: &CoordinateGrid, bins: &BinSpec) -> Result<Digitization> {
        let radius = grid.radius();
        let max_radius = radius.iter().cloned().fold(0.0, f64::max);
        let (row_scale, col_scale) = grid.scales();
        let edges = radius_edges(max_radius, row_scale.hypot(col_scale), bins)?;

        Ok(Digitization::new(
            Quantity::Radius,
            &radius,
            edges,
            (grid.rows(), grid.cols()),
            grid.units().map(|u| u.to_string()),
            grid.warnings().to_vec()
        ))
    }

    pub fn angle(grid: &CoordinateGrid, bins: &BinSpec) -> Result<Digitization> {
        let edges = angle_edges(bins)?;

        Ok(Digitization::new(
            Quantity::Angle,
            &grid.angle(),
            edges,
            (grid.rows(), grid.cols()),
            Some("rad".to_string()),
            grid.warnings().to_vec()
        ))
    }

    fn new(
        quantity: Quantity,
        values: &[f64],
        edges: Vec<f64>,
        (rows, cols): (usize, usize),
        units: Option<String>,
        warnings: Vec<Warning>
    ) -> Digitization {
        let labels = values.par_iter().map(|&v| bin_index(&edges, v)).collect();
        log::debug!("digitized {} ({}x{}) into {} bins", quantity, rows, cols, edges.len() - 1);

        Digitization{ quantity, edges, labels, rows, cols, units, warnings }
    }

    pub fn quantity(&self) -> Quantity { self.quantity }

    pub fn edges(&self) -> &[f64] { &self.edges }

    pub fn num_bins(&self) -> usize { self.edges.len() - 1 }

    /// Bin index of each pixel (row-major); `OUTSIDE` for pixels not in any bin.
    pub fn labels(&self) -> &[u32] { &self.labels }

    /// Returns (rows, columns) of the digitized plane.
    pub fn shape(&self) -> (usize, usize) { (self.rows, self.cols) }

    pub fn units(&self) -> Option<&str> { self.units.as_deref() }

    pub fn warnings(&self) -> &[Warning] { &self.warnings }

    /// Returns the number of pixels in each bin.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_bins()];
        for &label in &self.labels {
            if label != Digitization::OUTSIDE {
                counts[label as usize] += 1;
            }
        }

        counts
    }

    /// Returns the axis of integrated profiles; coordinates are the left bin edges.
    pub fn bin_axis(&self) -> Axis {
        let left_edges = &self.edges[..self.num_bins()];
        let axis = if is_evenly_spaced(&self.edges) {
            Axis::uniform(left_edges.len(), self.edges[1] - self.edges[0], self.edges[0])
        } else {
            Axis::explicit(left_edges.to_vec())
        };
        let axis = axis.with_name(&self.quantity.to_string());

        match &self.units {
            Some(units) => axis.with_units(units),
            None => axis
        }
    }
}

/// Returns the bin of `value`; bins are `[e_i, e_i+1)`, except the last one which is closed.
pub fn bin_index(edges: &[f64], value: f64) -> u32 {
    let last = edges[edges.len() - 1];
    if value.is_nan() || value < edges[0] || value > last {
        Digitization::OUTSIDE
    } else if value == last {
        (edges.len() - 2) as u32
    } else {
        (edges.partition_point(|&e| e <= value) - 1) as u32
    }
}

fn is_evenly_spaced(edges: &[f64]) -> bool {
    let step = edges[1] - edges[0];
    edges.windows(2).all(|w| ((w[1] - w[0]) - step).abs() <= 1.0e-9 * step.abs())
}

fn check_edges(edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(Error::InvalidBinSpec(format!("at least 2 edges required, got {}", edges.len())));
    }
    if edges.iter().any(|e| !e.is_finite()) {
        return Err(Error::InvalidBinSpec("bin edges must be finite".to_string()));
    }
    if edges.windows(2).any(|w| w[1] <= w[0]) {
        return Err(Error::InvalidBinSpec("bin edges must be strictly increasing".to_string()));
    }
    check_bin_count(edges.len() - 1)?;

    Ok(())
}

fn check_width(width: f64) -> Result<()> {
    if width.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidBinSpec(format!("invalid bin width: {}", width)))
    }
}

fn check_bin_count(count: usize) -> Result<()> {
    if count > Digitization::MAX_BINS {
        Err(Error::InvalidBinSpec(format!("{} bins requested, at most {} supported", count, Digitization::MAX_BINS)))
    } else {
        Ok(())
    }
}

/// Edges `start + k * step` covering `start..=end`.
fn edges_by_width(start: f64, end: f64, step: f64) -> Result<Vec<f64>> {
    let num_bins = ((end - start) / step).ceil();
    if !(num_bins < Digitization::MAX_BINS as f64) {
        return Err(Error::InvalidBinSpec(format!(
            "bin width {} gives more than {} bins", step, Digitization::MAX_BINS
        )));
    }
    let num_bins = (num_bins as usize).max(1);
    let mut edges: Vec<f64> = (0..=num_bins).map(|k| start + k as f64 * step).collect();
    while edges[edges.len() - 1] < end {
        let k = edges.len();
        edges.push(start + k as f64 * step);
    }

    Ok(edges)
}

/// `count` equal bins; the last edge is exactly `end`.
fn edges_by_count(start: f64, end: f64, count: usize) -> Result<Vec<f64>> {
    if count == 0 {
        return Err(Error::InvalidBinSpec("bin count must be positive".to_string()));
    }
    check_bin_count(count)?;
    let step = (end - start) / count as f64;
    let mut edges: Vec<f64> = (0..count).map(|k| start + k as f64 * step).collect();
    edges.push(end);

    Ok(edges)
}

/// Edges from 0 covering radii up to `max_radius`.
fn radius_edges(max_radius: f64, auto_width: f64, bins: &BinSpec) -> Result<Vec<f64>> {
    if let BinSpec::Width(width) = bins {
        check_width(*width)?;
    }
    let edges = match bins {
        BinSpec::Width(width) if *width > 0.0 => edges_by_width(0.0, max_radius, *width)?,

        BinSpec::Auto | BinSpec::Width(_) => {
            check_width(auto_width)?;
            if auto_width <= 0.0 {
                return Err(Error::InvalidBinSpec(format!("cannot derive bin width from scale {}", auto_width)));
            }
            edges_by_width(0.0, max_radius, auto_width)?
        },

        BinSpec::Count(count) => {
            let upper = if max_radius > 0.0 { max_radius } else { 1.0 };
            edges_by_count(0.0, upper, *count)?
        },

        BinSpec::Edges(edges) => edges.clone()
    };
    check_edges(&edges)?;

    Ok(edges)
}

/// Edges from -π covering angles up to π.
fn angle_edges(bins: &BinSpec) -> Result<Vec<f64>> {
    if let BinSpec::Width(width) = bins {
        check_width(*width)?;
    }
    let edges = match bins {
        BinSpec::Width(width) if *width > 0.0 => edges_by_width(-PI, PI, *width)?,
        BinSpec::Auto | BinSpec::Width(_) => vec![-PI, PI],
        BinSpec::Count(count) => edges_by_count(-PI, PI, *count)?,
        BinSpec::Edges(edges) => edges.clone()
    };
    check_edges(&edges)?;

    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_are_half_open_except_the_last() {
        let edges = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(0, bin_index(&edges, 0.0));
        assert_eq!(0, bin_index(&edges, 0.999));
        assert_eq!(1, bin_index(&edges, 1.0));
        assert_eq!(2, bin_index(&edges, 2.5));
        assert_eq!(2, bin_index(&edges, 3.0));
        assert_eq!(Digitization::OUTSIDE, bin_index(&edges, 3.001));
        assert_eq!(Digitization::OUTSIDE, bin_index(&edges, -0.5));
        assert_eq!(Digitization::OUTSIDE, bin_index(&edges, std::f64::NAN));
    }

    #[test]
    fn when_edges_not_increasing_fail() {
        let grid = CoordinateGrid::new(&Axis::pixels(4), &Axis::pixels(4), true).unwrap();
        for bins in &[
            BinSpec::Edges(vec![0.0, 2.0, 2.0]),
            BinSpec::Edges(vec![1.0]),
            BinSpec::Edges(vec![0.0, std::f64::INFINITY]),
            BinSpec::Count(0),
            BinSpec::Width(std::f64::NAN)
        ] {
            assert!(matches!(Digitization::radius(&grid, bins), Err(Error::InvalidBinSpec(_))), "{:?}", bins);
        }
    }

    #[test]
    fn when_too_many_bins_requested_fail() {
        let axis = Axis::pixels(16);
        let grid = CoordinateGrid::new(&axis, &axis, true).unwrap();
        for bins in &[BinSpec::Width(1.0e-15), BinSpec::Count(Digitization::MAX_BINS + 1)] {
            assert!(matches!(Digitization::radius(&grid, bins), Err(Error::InvalidBinSpec(_))), "{:?}", bins);
            assert!(matches!(Digitization::angle(&grid, bins), Err(Error::InvalidBinSpec(_))), "{:?}", bins);
        }
        assert!(Digitization::angle(&grid, &BinSpec::Count(1000)).is_ok());
    }

    #[test]
    fn radius_width_on_centered_100x100_grid() {
        let axis = Axis::pixels(100);
        let grid = CoordinateGrid::new(&axis, &axis, true).unwrap();
        let max_radius = grid.radius().into_iter().fold(0.0, f64::max);
        let dig = Digitization::radius(&grid, &BinSpec::Width(0.25)).unwrap();

        assert_eq!((max_radius / 0.25).ceil() as usize, dig.num_bins());
        for (k, edge) in dig.edges().iter().enumerate() {
            assert_eq!(k as f64 * 0.25, *edge);
        }
        assert!(dig.labels().iter().all(|&l| l != Digitization::OUTSIDE));
    }

    #[test]
    fn when_width_not_positive_auto_width_used() {
        let axis = Axis::uniform(10, 0.5, 0.0);
        let grid = CoordinateGrid::new(&axis, &axis, true).unwrap();
        let auto = Digitization::radius(&grid, &BinSpec::Auto).unwrap();
        let zero = Digitization::radius(&grid, &BinSpec::Width(0.0)).unwrap();
        assert_eq!(auto.edges(), zero.edges());
        assert_eq!(0.5f64.hypot(0.5), auto.edges()[1]);
    }

    #[test]
    fn angular_bins_tile_the_full_circle() {
        let axis = Axis::pixels(33);
        let grid = CoordinateGrid::new(&axis, &axis, true).unwrap();
        for &width in &[0.1, 0.5, 1.0, 2.0 * PI / 7.0, 3.0, 10.0] {
            let dig = Digitization::angle(&grid, &BinSpec::Width(width)).unwrap();
            let edges = dig.edges();
            assert_eq!(-PI, edges[0]);
            assert!(edges[edges.len() - 1] >= PI);
            assert!(edges.windows(2).all(|w| w[1] > w[0]));
            assert!(dig.labels().iter().all(|&l| l != Digitization::OUTSIDE));
            assert_eq!(grid.rows() * grid.cols(), dig.counts().iter().sum::<usize>());

            // every angle falls into the single bin whose range contains it
            for (&angle, &label) in grid.angle().iter().zip(dig.labels()) {
                let (lo, hi) = (edges[label as usize], edges[label as usize + 1]);
                assert!(angle >= lo && (angle < hi || (angle == hi && label as usize == dig.num_bins() - 1)));
            }
        }
    }

    #[test]
    fn angle_count_ends_exactly_at_pi() {
        let axis = Axis::pixels(8);
        let grid = CoordinateGrid::new(&axis, &axis, true).unwrap();
        let dig = Digitization::angle(&grid, &BinSpec::Count(8)).unwrap();
        assert_eq!(8, dig.num_bins());
        assert_eq!(PI, dig.edges()[8]);
        assert_eq!(Some("rad"), dig.units());

        let dig = Digitization::angle(&grid, &BinSpec::Auto).unwrap();
        assert_eq!(1, dig.num_bins());
        assert_eq!(vec![64], dig.counts());
    }

    #[test]
    fn when_edges_narrower_than_grid_outer_pixels_excluded() {
        let axis = Axis::pixels(9);
        let grid = CoordinateGrid::new(&axis, &axis, true).unwrap();
        let dig = Digitization::radius(&grid, &BinSpec::Edges(vec![0.0, 1.0, 2.0])).unwrap();
        let counts = dig.counts();
        // radius 0, then radius 1 (4 pixels) and sqrt(2) (4 pixels), and the 4 pixels at radius exactly 2
        assert_eq!(vec![1, 8 + 4], counts);
        assert_eq!(81 - 13, dig.labels().iter().filter(|&&l| l == Digitization::OUTSIDE).count());
    }

    #[test]
    fn bin_axis_uses_left_edges() {
        let axis = Axis::pixels(9).with_units("px");
        let grid = CoordinateGrid::new(&axis, &axis, true).unwrap();
        let dig = Digitization::radius(&grid, &BinSpec::Width(1.0)).unwrap();
        let bin_axis = dig.bin_axis();
        assert!(bin_axis.is_uniform());
        assert_eq!(dig.num_bins(), bin_axis.size());
        assert_eq!(0.0, bin_axis.offset());
        assert_eq!(1.0, bin_axis.scale());
        assert_eq!(Some("px"), bin_axis.units());
        assert_eq!("radius", bin_axis.name());

        let dig = Digitization::radius(&grid, &BinSpec::Edges(vec![0.0, 1.0, 5.0, 6.0])).unwrap();
        assert_eq!(vec![0.0, 1.0, 5.0], dig.bin_axis().coordinates());
    }
}
