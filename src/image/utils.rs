//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Low-level utility functions and macros for N-dimensional images.
//!

/// Produces a range of specified length.
#[macro_export]
macro_rules! range { ($start:expr, $len:expr) => { $start .. $start + $len } }

/// Returns the number of elements of an array of `shape`.
pub fn num_elements(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Returns row-major (C order) strides of an array of `shape`.
pub fn strides(shape: &[usize]) -> Vec<usize> {
    let mut result = vec![1; shape.len()];
    for d in (0..shape.len().saturating_sub(1)).rev() {
        result[d] = result[d + 1] * shape[d + 1];
    }

    result
}

/// Converts a flat row-major index into a multi-index, written to `index`.
pub fn unravel(mut flat: usize, shape: &[usize], index: &mut [usize]) {
    debug_assert!(index.len() == shape.len());
    for d in (0..shape.len()).rev() {
        if shape[d] > 0 {
            index[d] = flat % shape[d];
            flat /= shape[d];
        } else {
            index[d] = 0;
        }
    }
}

/// Moves the element at flat index `i` of a `rows`x`cols` plane by half of each dimension.
///
/// `inverse` selects the inverse shift, which differs from the forward one for odd sizes.
///
pub fn shifted_index(i: usize, rows: usize, cols: usize, inverse: bool) -> usize {
    let (shift_r, shift_c) = if inverse {
        (rows - rows / 2, cols - cols / 2)
    } else {
        (rows / 2, cols / 2)
    };
    let r = (i / cols + shift_r) % rows;
    let c = (i % cols + shift_c) % cols;

    r * cols + c
}
