//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Fourier ring correlation.
//!

use crate::error::{Error, Result};
use crate::image::{Image, Sample};
use crate::radial::{BinSpec, CoordinateGrid, Digitization};
use crate::spectral::fft::cross_power_spectrum;
use num_complex::Complex64;

/// Calculates the Fourier ring correlation of two images as a function of spatial frequency.
///
/// Signal planes must have the same shape. Navigation lengths must be equal, or one of them 1
/// (its plane is then correlated with every plane of the other image). `bins` refer to the frequency
/// magnitude. The result has one profile per navigation index along an axis named "|q|";
/// bins without spectral power are NaN.
///
pub fn fourier_ring_correlation<A: Sample, B: Sample>(
    image_1: &Image<A>,
    image_2: &Image<B>,
    bins: &BinSpec
) -> Result<Image<f64>> {
    let shape = image_1.signal_shape()?;
    if shape != image_2.signal_shape()? {
        return Err(Error::ShapeMismatch(format!(
            "signal planes differ: {:?} vs {:?}", shape, image_2.signal_shape()?
        )));
    }
    let (n1, n2) = (image_1.nav_len(), image_2.nav_len());
    if n1 != n2 && n1 != 1 && n2 != 1 {
        return Err(Error::ShapeMismatch(format!(
            "cannot correlate {} planes with {} planes", n1, n2
        )));
    }

    let fft_1 = image_1.fft(true)?;
    let fft_2 = image_2.fft(true)?;

    let (row_axis, col_axis) = fft_1.signal_axes()?;
    // frequency axes are already centered
    let digitization = Digitization::radius(&CoordinateGrid::new(row_axis, col_axis, false)?, bins)?;
    let bin_axis = digitization.bin_axis().with_name("|q|");

    let correlate = |plane_1: &[Complex64], plane_2: &[Complex64]| {
        ring_correlation(&digitization, plane_1, plane_2)
    };

    let result = if n1 >= n2 {
        fft_1.map_planes(vec![bin_axis], |nav_index, plane| {
            correlate(plane, fft_2.plane(if n2 == 1 { 0 } else { nav_index }))
        })
    } else {
        fft_2.map_planes(vec![bin_axis], |_, plane| correlate(fft_1.plane(0), plane))
    };

    log::debug!(
        "calculated Fourier ring correlation of {} plane pair(s) over {} bins",
        n1.max(n2), digitization.num_bins()
    );

    Ok(result)
}

fn ring_correlation(digitization: &Digitization, plane_1: &[Complex64], plane_2: &[Complex64]) -> Vec<f64> {
    let num_bins = digitization.num_bins();
    let mut cross = vec![0.0; num_bins];
    let mut power_1 = vec![0.0; num_bins];
    let mut power_2 = vec![0.0; num_bins];

    let cps = cross_power_spectrum(plane_1, plane_2);
    for (i, &label) in digitization.labels().iter().enumerate() {
        if label == Digitization::OUTSIDE {
            continue;
        }
        let b = label as usize;
        cross[b] += cps[i].re;
        power_1[b] += plane_1[i].norm_sqr();
        power_2[b] += plane_2[i].norm_sqr();
    }

    (0..num_bins).map(|b| {
        let denom = (power_1[b] * power_2[b]).sqrt();
        if denom > 0.0 {
            (cross[b] / denom).max(-1.0).min(1.0)
        } else {
            std::f64::NAN
        }
    }).collect()
}
