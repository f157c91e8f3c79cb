//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Bin-wise integration of image stacks.
//!

use crate::error::{Error, Result};
use crate::image::{Image, Sample};
use super::digitize::Digitization;

#[derive(Copy, Clone, Debug, PartialEq, strum_macros::Display, strum_macros::EnumIter, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Reduction {
    /// Mean of the pixels in each bin; empty bins give NaN.
    Mean,
    /// Sum of the pixels in each bin; empty bins give 0.
    Sum
}

impl Default for Reduction {
    fn default() -> Reduction { Reduction::Mean }
}

/// Reduces every signal plane of `image` over the bins of `digitization`.
///
/// Returns an image with the navigation axes of `image` followed by the bin axis (see `Digitization::bin_axis`).
/// Pixels labeled `Digitization::OUTSIDE` are skipped.
///
pub fn integrate<T: Sample>(image: &Image<T>, digitization: &Digitization, reduction: Reduction) -> Result<Image<T>> {
    let signal_shape = image.signal_shape()?;
    if signal_shape != digitization.shape() {
        return Err(Error::ShapeMismatch(format!(
            "signal plane {:?} does not match digitized plane {:?}", signal_shape, digitization.shape()
        )));
    }

    let num_bins = digitization.num_bins();
    let labels = digitization.labels();
    let inv_counts: Vec<Option<f64>> = digitization.counts().iter()
        .map(|&c| if c == 0 { None } else { Some(1.0 / c as f64) })
        .collect();

    let result = image.map_planes(vec![digitization.bin_axis()], |_, plane| {
        let mut accumulator = vec![T::zero(); num_bins];
        for (value, &label) in plane.iter().zip(labels) {
            if label != Digitization::OUTSIDE {
                accumulator[label as usize] += *value;
            }
        }

        match reduction {
            Reduction::Sum => accumulator,
            Reduction::Mean => accumulator.into_iter().zip(inv_counts.iter()).map(|(sum, inv_count)| {
                match inv_count {
                    Some(inv_count) => sum * *inv_count,
                    None => T::nan()
                }
            }).collect()
        }
    });

    log::debug!(
        "integrated {} plane(s) over {} {} bins ({})",
        image.nav_len(), num_bins, digitization.quantity(), reduction
    );

    Ok(result)
}
