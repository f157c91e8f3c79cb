//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Comparison of observed and expected (e.g., simulated) images.
//!

pub mod frc;

pub use frc::fourier_ring_correlation;

use crate::error::{Error, Result};
use crate::image::Image;
use crate::radial::BinSpec;

/// Pair of same-shaped real images to compare.
#[derive(Clone, Debug)]
pub struct Validation {
    observed: Image<f64>,
    expected: Image<f64>
}

impl Validation {
    /// Creates a validation of `observed` against `expected`.
    ///
    /// If `unpad` is set, images carrying a pad record have the pad removed first.
    ///
    pub fn new(observed: &Image<f64>, expected: &Image<f64>, unpad: bool) -> Result<Validation> {
        let prepare = |image: &Image<f64>| -> Result<Image<f64>> {
            if unpad && image.pad_record().is_some() {
                image.remove_pad()
            } else {
                Ok(image.clone())
            }
        };
        let observed = prepare(observed)?;
        let expected = prepare(expected)?;

        if observed.shape() != expected.shape() {
            return Err(Error::ShapeMismatch(format!(
                "observed image {:?} does not match expected image {:?}", observed.shape(), expected.shape()
            )));
        }

        Ok(Validation{ observed, expected })
    }

    pub fn observed(&self) -> &Image<f64> { &self.observed }

    pub fn expected(&self) -> &Image<f64> { &self.expected }

    /// Returns the per-pixel chi-square map `(o - e)^2 / e^2`.
    pub fn chi2(&self) -> Image<f64> {
        let values = self.observed.pixels().iter().zip(self.expected.pixels())
            .map(|(o, e)| (o - e).powi(2) / (e * e))
            .collect();

        self.observed.with_pixels(values)
    }

    /// Returns the r-value `sum |sqrt(o) - sqrt(e)| / sum sqrt(e)` over all pixels.
    pub fn rvalue(&self) -> Result<f64> {
        if self.observed.pixels().iter().chain(self.expected.pixels()).any(|&v| v < 0.0) {
            return Err(Error::InvalidParameter("r-value requires non-negative images".to_string()));
        }

        let (mut diff, mut total) = (0.0, 0.0);
        for (o, e) in self.observed.pixels().iter().zip(self.expected.pixels()) {
            diff += (o.sqrt() - e.sqrt()).abs();
            total += e.sqrt();
        }
        if total == 0.0 {
            return Err(Error::InvalidParameter("r-value requires a non-zero expected image".to_string()));
        }

        Ok(diff / total)
    }

    /// Returns the squared error maps of the mean-subtracted images in real and reciprocal space.
    ///
    /// The reciprocal map uses orthonormal FFT scaling, so both maps have the same total.
    ///
    pub fn rmse(&self) -> Result<(Image<f64>, Image<f64>)> {
        let (rows, cols) = self.observed.signal_shape()?;
        let mean = |image: &Image<f64>| image.pixels().iter().sum::<f64>() / image.pixels().len() as f64;
        let (mean_o, mean_e) = (mean(&self.observed), mean(&self.expected));

        let diff: Vec<f64> = self.observed.pixels().iter().zip(self.expected.pixels())
            .map(|(o, e)| (o - mean_o) - (e - mean_e))
            .collect();
        let diff = self.observed.with_pixels(diff);

        let real_space = diff.map_values(|d| d * d);
        let norm = 1.0 / (rows * cols) as f64;
        let reciprocal = diff.fft(false)?.map_values(|f| f.norm_sqr() * norm);

        Ok((real_space, reciprocal))
    }

    pub fn fourier_ring_correlation(&self, bins: &BinSpec) -> Result<Image<f64>> {
        fourier_ring_correlation(&self.observed, &self.expected, bins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{Axis, Fill, PadMode, PadSpec, PadWidths};
    use approx::assert_relative_eq;

    fn image(values: Vec<f64>) -> Image<f64> {
        Image::new(vec![Axis::pixels(2), Axis::pixels(values.len() / 2)], values).unwrap()
    }

    #[test]
    fn chi2_is_relative_squared_error() {
        let v = Validation::new(&image(vec![1.0, 2.0, 3.0, 4.0]), &image(vec![1.0, 1.0, 2.0, 8.0]), false).unwrap();
        assert_eq!(&[0.0, 1.0, 0.25, 0.25], v.chi2().pixels());
    }

    #[test]
    fn rvalue_of_known_images() {
        let v = Validation::new(&image(vec![4.0, 1.0]), &image(vec![1.0, 1.0]), false).unwrap();
        assert_relative_eq!(0.5, v.rvalue().unwrap());

        let v = Validation::new(&image(vec![4.0, 1.0]), &image(vec![4.0, 1.0]), false).unwrap();
        assert_eq!(0.0, v.rvalue().unwrap());
    }

    #[test]
    fn when_data_negative_rvalue_fails() {
        let v = Validation::new(&image(vec![-1.0, 1.0]), &image(vec![1.0, 1.0]), false).unwrap();
        assert!(matches!(v.rvalue(), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn rmse_maps_have_equal_totals() {
        let observed = Image::from_fn(vec![Axis::pixels(6), Axis::pixels(5)], |i| (i[0] * i[1]) as f64 * 0.3);
        let expected = Image::from_fn(vec![Axis::pixels(6), Axis::pixels(5)], |i| (i[0] + 2 * i[1]) as f64);
        let (real_space, reciprocal) = Validation::new(&observed, &expected, true).unwrap().rmse().unwrap();

        assert_eq!(observed.axes(), real_space.axes());
        assert_eq!(vec![6, 5], reciprocal.shape());
        assert_relative_eq!(
            real_space.pixels().iter().sum::<f64>(),
            reciprocal.pixels().iter().sum::<f64>(),
            max_relative = 1.0e-10
        );
        // mean difference is removed
        assert!(reciprocal.pixels()[0] < 1.0e-20);
    }

    #[test]
    fn offset_images_have_zero_rmse() {
        let observed = image(vec![1.0, 2.0, 5.0, 7.0]);
        let expected = image(vec![11.0, 12.0, 15.0, 17.0]);
        let (real_space, reciprocal) = Validation::new(&observed, &expected, false).unwrap().rmse().unwrap();
        assert!(real_space.pixels().iter().all(|&v| v == 0.0));
        assert!(reciprocal.pixels().iter().all(|&v| v < 1.0e-20));
    }

    #[test]
    fn padded_images_are_unpadded_on_request() {
        let observed = image(vec![1.0, 2.0, 3.0, 4.0]);
        let spec = PadSpec::new(PadWidths::Pixels(vec![(1, 1), (2, 0)]), PadMode::Constant(Fill::Scalar(0.0)));
        let padded = observed.pad(&spec).unwrap();

        let v = Validation::new(&padded, &observed, true).unwrap();
        assert_eq!(observed.axes(), v.observed().axes());
        assert!(v.chi2().pixels().iter().all(|&x| x == 0.0));

        assert!(matches!(Validation::new(&padded, &observed, false), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn frc_of_identical_images_is_one() {
        let observed = Image::from_fn(vec![Axis::pixels(16), Axis::pixels(16)], |i| ((i[0] * 7 + i[1] * 3) % 5) as f64);
        let v = Validation::new(&observed, &observed, false).unwrap();
        let frc = v.fourier_ring_correlation(&BinSpec::Count(4)).unwrap();
        for value in frc.pixels().iter().filter(|v| !v.is_nan()) {
            assert_relative_eq!(1.0, *value, epsilon = 1.0e-12);
        }
    }
}
