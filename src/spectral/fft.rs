//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Fast Fourier Transform functions.
//!

use crate::image::utils::shifted_index;
use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// 2-dimensional discrete Fourier transform of a `rows`x`cols` plane; multithreaded.
///
/// Uses the row-column algorithm; any sizes are supported. The forward transform is unnormalized,
/// the inverse one divides by `rows * cols`.
///
pub struct Fft2d {
    rows: usize,
    cols: usize,
    inverse: bool,
    row_fft: Arc<dyn Fft<f64>>,
    col_fft: Arc<dyn Fft<f64>>
}

impl Fft2d {
    pub fn new(rows: usize, cols: usize, inverse: bool) -> Fft2d {
        let mut planner = FftPlanner::<f64>::new();
        let (row_fft, col_fft) = if inverse {
            (planner.plan_fft_inverse(cols), planner.plan_fft_inverse(rows))
        } else {
            (planner.plan_fft_forward(cols), planner.plan_fft_forward(rows))
        };

        Fft2d{ rows, cols, inverse, row_fft, col_fft }
    }

    pub fn rows(&self) -> usize { self.rows }

    pub fn cols(&self) -> usize { self.cols }

    /// Transforms `values` (`rows` * `cols` elements, row-major) in place.
    pub fn process(&self, values: &mut [Complex64]) {
        assert!(values.len() == self.rows * self.cols);
        if values.is_empty() {
            return;
        }

        // calculate 1-dimensional transforms of all the rows
        values.par_chunks_mut(self.cols).for_each(|row| self.row_fft.process(row));

        // calculate 1-dimensional transforms of all the columns (as rows of the transposed array)
        let mut transposed = transpose(values, self.rows, self.cols);
        transposed.par_chunks_mut(self.rows).for_each(|col| self.col_fft.process(col));

        let norm = if self.inverse { 1.0 / (self.rows * self.cols) as f64 } else { 1.0 };
        values.par_chunks_mut(self.cols).enumerate().for_each(|(r, row)| {
            for (c, value) in row.iter_mut().enumerate() {
                *value = transposed[c * self.rows + r] * norm;
            }
        });
    }
}

fn transpose(values: &[Complex64], rows: usize, cols: usize) -> Vec<Complex64> {
    let mut result = vec![Complex64::new(0.0, 0.0); values.len()];
    result.par_chunks_mut(rows).enumerate().for_each(|(c, col)| {
        for (r, value) in col.iter_mut().enumerate() {
            *value = values[r * cols + c];
        }
    });

    result
}

/// Moves the zero frequency of a `rows`x`cols` plane to index (`rows / 2`, `cols / 2`), or back if `inverse`.
pub fn shift_2d<T: Copy + Default>(rows: usize, cols: usize, input: &[T], inverse: bool) -> Vec<T> {
    assert!(input.len() == rows * cols);
    let mut output = vec![T::default(); input.len()];
    for (i, value) in input.iter().enumerate() {
        output[shifted_index(i, rows, cols, inverse)] = *value;
    }

    output
}

/// Calculates the (unnormalized) cross-power spectrum `fft_1 * conj(fft_2)` of two 2D discrete Fourier transforms.
pub fn cross_power_spectrum(fft_1: &[Complex64], fft_2: &[Complex64]) -> Vec<Complex64> {
    assert!(fft_1.len() == fft_2.len());
    fft_1.par_iter().zip(fft_2.par_iter()).map(|(f1, f2)| f1 * f2.conj()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(rows: usize, cols: usize) -> Vec<Complex64> {
        (0..rows * cols).map(|i| Complex64::new((i % 7) as f64 - 2.5, (i % 3) as f64)).collect()
    }

    #[test]
    fn when_transforming_constant_all_energy_in_dc() {
        let (rows, cols) = (6, 10);
        let mut values = vec![Complex64::new(2.0, 0.0); rows * cols];
        Fft2d::new(rows, cols, false).process(&mut values);
        assert_relative_eq!(120.0, values[0].re, epsilon = 1.0e-9);
        for value in &values[1..] {
            assert!(value.norm() < 1.0e-9);
        }
    }

    #[test]
    fn matches_direct_dft_for_non_power_of_2_sizes() {
        let (rows, cols) = (3, 5);
        let input = ramp(rows, cols);
        let mut values = input.clone();
        Fft2d::new(rows, cols, false).process(&mut values);

        for &(kr, kc) in &[(0usize, 0usize), (1, 2), (2, 4)] {
            let mut expected = Complex64::new(0.0, 0.0);
            for r in 0..rows {
                for c in 0..cols {
                    let phase = -2.0 * std::f64::consts::PI
                        * ((kr * r) as f64 / rows as f64 + (kc * c) as f64 / cols as f64);
                    expected += input[r * cols + c] * Complex64::from_polar(1.0, phase);
                }
            }
            let actual = values[kr * cols + kc];
            assert_relative_eq!(expected.re, actual.re, epsilon = 1.0e-9);
            assert_relative_eq!(expected.im, actual.im, epsilon = 1.0e-9);
        }
    }

    #[test]
    fn inverse_undoes_forward() {
        let (rows, cols) = (12, 9);
        let input = ramp(rows, cols);
        let mut values = input.clone();
        Fft2d::new(rows, cols, false).process(&mut values);
        Fft2d::new(rows, cols, true).process(&mut values);
        for (a, b) in input.iter().zip(values.iter()) {
            assert!((a - b).norm() < 1.0e-10);
        }
    }

    #[test]
    fn shift_moves_origin_to_center() {
        let (rows, cols) = (3, 4);
        let input: Vec<usize> = (0..rows * cols).collect();
        let shifted = shift_2d(rows, cols, &input, false);
        assert_eq!(0, shifted[1 * cols + 2]);
        assert_eq!(input, shift_2d(rows, cols, &shifted, true));
    }
}
