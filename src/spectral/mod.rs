//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Fourier transforms of signal planes and frequency-domain filtering.
//!

pub mod ctf;
pub mod fft;

pub use ctf::{contrast_transfer, CtfParams};

use crate::error::{Error, Result};
use crate::image::{Axis, Image, Sample};
use crate::radial::grid::{reciprocal_units, CoordinateGrid};
use fft::Fft2d;
use num_complex::Complex64;

/// Returns the frequency axis corresponding to the real-space `axis`.
///
/// Spacing is `1 / (size * scale)`; if `shifted`, the zero frequency is at index `size / 2`.
///
pub fn frequency_axis(axis: &Axis, shifted: bool) -> Axis {
    let scale = 1.0 / (axis.size() as f64 * axis.scale());
    let offset = if shifted { -((axis.size() / 2) as f64) * scale } else { 0.0 };

    let result = Axis::uniform(axis.size(), scale, offset).with_name(axis.name());
    match axis.units() {
        Some(units) => result.with_units(&reciprocal_units(units)),
        None => result
    }
}

/// Derives a real-space axis from a frequency axis (offset 0).
fn real_space_axis(axis: &Axis) -> Axis {
    let scale = 1.0 / (axis.size() as f64 * axis.scale());
    let result = Axis::uniform(axis.size(), scale, 0.0).with_name(axis.name());
    match axis.units() {
        Some(units) => result.with_units(units.strip_prefix("1/").unwrap_or(units)),
        None => result
    }
}

fn check_plane(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        Err(Error::ShapeMismatch(format!("cannot transform an empty {}x{} signal plane", rows, cols)))
    } else {
        Ok(())
    }
}

impl<T: Sample> Image<T> {
    /// Calculates the 2D discrete Fourier transform of every signal plane.
    ///
    /// The transform is unnormalized. If `shift`, the zero frequency is moved to index (`rows / 2`, `cols / 2`).
    /// Signal axes of the result are frequency axes (see `frequency_axis`); the original ones are remembered
    /// and restored by `ifft`. The pad record is carried over, so `remove_pad` can be applied after `ifft`.
    ///
    pub fn fft(&self, shift: bool) -> Result<Image<Complex64>> {
        let (row_axis, col_axis) = self.signal_axes()?;
        let (rows, cols) = (row_axis.size(), col_axis.size());
        check_plane(rows, cols)?;

        let plan = Fft2d::new(rows, cols, false);
        let freq_axes = vec![frequency_axis(row_axis, shift), frequency_axis(col_axis, shift)];

        let mut result = self.map_planes(freq_axes, |_, plane| {
            let mut values: Vec<Complex64> = plane.iter().map(|&v| v.into()).collect();
            plan.process(&mut values);
            if shift { fft::shift_2d(rows, cols, &values, false) } else { values }
        });
        result.set_real_space_axes(Some(vec![row_axis.clone(), col_axis.clone()]));
        result.set_pad_record(self.pad_record().cloned());

        log::debug!("calculated FFT of {} {}x{} plane(s)", self.nav_len(), rows, cols);

        Ok(result)
    }
}

impl Image<Complex64> {
    /// Calculates the inverse 2D discrete Fourier transform of every signal plane (divided by `rows * cols`).
    ///
    /// If `shift`, the input is expected to have its zero frequency at the center (as produced by `fft(true)`).
    ///
    pub fn ifft(&self, shift: bool) -> Result<Image<Complex64>> {
        let (row_axis, col_axis) = self.signal_axes()?;
        let (rows, cols) = (row_axis.size(), col_axis.size());
        check_plane(rows, cols)?;

        let real_axes = match self.real_space_axes() {
            Some(axes) if axes.len() == 2 && axes[0].size() == rows && axes[1].size() == cols => axes.to_vec(),
            _ => vec![real_space_axis(row_axis), real_space_axis(col_axis)]
        };

        let plan = Fft2d::new(rows, cols, true);
        let mut result = self.map_planes(real_axes, |_, plane| {
            let mut values = if shift { fft::shift_2d(rows, cols, plane, true) } else { plane.to_vec() };
            plan.process(&mut values);
            values
        });
        result.set_pad_record(self.pad_record().cloned());

        log::debug!("calculated inverse FFT of {} {}x{} plane(s)", self.nav_len(), rows, cols);

        Ok(result)
    }

    pub fn real(&self) -> Image<f64> { self.map_values(|v| v.re) }

    pub fn imag(&self) -> Image<f64> { self.map_values(|v| v.im) }

    pub fn amplitude(&self) -> Image<f64> { self.map_values(|v| v.norm()) }

    /// Returns the phase in (-π, π].
    pub fn phase(&self) -> Image<f64> { self.map_values(|v| v.arg()) }

    /// Multiplies every signal plane by the corresponding plane of `kernel`.
    ///
    /// Signal shapes must match. The kernel's navigation length must be 1 or equal to the image's;
    /// alternatively the image may have navigation length 1, in which case the result takes
    /// the kernel's navigation axes.
    ///
    pub fn apply_kernel<K: Sample>(&self, kernel: &Image<K>) -> Result<Image<Complex64>> {
        let (row_axis, col_axis) = self.signal_axes()?;
        if self.signal_shape()? != kernel.signal_shape()? {
            return Err(Error::ShapeMismatch(format!(
                "kernel signal plane {:?} does not match image signal plane {:?}",
                kernel.signal_shape()?, self.signal_shape()?
            )));
        }

        let signal_axes = vec![row_axis.clone(), col_axis.clone()];
        let (image_len, kernel_len) = (self.nav_len(), kernel.nav_len());

        let mut result = if kernel_len == image_len || kernel_len == 1 {
            self.map_planes(signal_axes, |nav_index, plane| {
                let k_plane = kernel.plane(if kernel_len == 1 { 0 } else { nav_index });
                multiply(plane, k_plane)
            })
        } else if image_len == 1 {
            let plane = self.plane(0);
            kernel.map_planes(signal_axes, |_, k_plane| multiply(plane, k_plane))
        } else {
            return Err(Error::ShapeMismatch(format!(
                "cannot broadcast kernel with {} navigation indices over image with {}", kernel_len, image_len
            )));
        };
        result.set_real_space_axes(self.real_space_axes().map(|a| a.to_vec()));
        result.set_pad_record(self.pad_record().cloned());

        Ok(result)
    }
}

fn multiply<K: Sample>(plane: &[Complex64], kernel: &[K]) -> Vec<Complex64> {
    plane.iter().zip(kernel.iter()).map(|(&v, &k)| {
        let k: Complex64 = k.into();
        v * k
    }).collect()
}

/// Creates the kernel `exp(-r^2 / (2 sigma^2))` over the radius of `grid`.
///
/// To low-pass filter an image `F` obtained by `fft(true)`, build `grid` from the signal axes of `F`
/// with `shifted = false` (frequency axes are already centered).
///
pub fn gaussian_low_pass(grid: &CoordinateGrid, sigma: f64) -> Result<Image<f64>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(Error::InvalidParameter(format!("Gaussian sigma must be positive, got {}", sigma)));
    }

    let mut axes = vec![Axis::explicit(grid.y().to_vec()), Axis::explicit(grid.x().to_vec())];
    if let Some(units) = grid.units() {
        axes = axes.into_iter().map(|a| a.with_units(units)).collect();
    }

    let denom = 2.0 * sigma * sigma;
    let values = grid.radius().into_iter().map(|r| (-r * r / denom).exp()).collect();

    Image::new(axes, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::image::{AxisKind, Fill, PadMode, PadSpec, PadWidths};

    fn test_stack() -> Image<f64> {
        Image::from_fn(
            vec![
                Axis::explicit(vec![-5.0, 5.0]).with_name("defocus"),
                Axis::uniform(6, 0.5, 10.0).with_units("nm"),
                Axis::uniform(9, 0.5, -3.0).with_units("nm")
            ],
            |i| ((i[0] + 1) * (i[1] * 3 + i[2] * i[2])) as f64 * 0.1 - 1.0
        )
    }

    #[test]
    fn round_trip_restores_values_and_axes() {
        let image = test_stack();
        for &shift in &[false, true] {
            let restored = image.fft(shift).unwrap().ifft(shift).unwrap();
            assert_eq!(image.axes(), restored.axes());
            for (a, b) in image.pixels().iter().zip(restored.real().pixels()) {
                assert_relative_eq!(*a, *b, epsilon = 1.0e-10);
            }
            assert!(restored.imag().pixels().iter().all(|v| v.abs() < 1.0e-10));
        }
    }

    #[test]
    fn frequency_axes_have_reciprocal_calibration() {
        let spectrum = Image::<f64>::zeros(vec![Axis::uniform(8, 0.5, 3.0).with_units("nm"), Axis::pixels(5)])
            .fft(true).unwrap();

        assert_eq!(&AxisKind::Uniform{ scale: 0.25, offset: -1.0 }, spectrum.axis(0).kind());
        assert_eq!(Some("1/nm"), spectrum.axis(0).units());
        assert_eq!(None, spectrum.axis(1).units());

        let spectrum = Image::<f64>::zeros(vec![Axis::uniform(8, 0.5, 3.0), Axis::pixels(5)]).fft(false).unwrap();
        assert_eq!(0.0, spectrum.axis(0).offset());
    }

    #[test]
    fn when_shifted_dc_is_at_center() {
        let (rows, cols) = (7, 4);
        let image = Image::new(vec![Axis::pixels(rows), Axis::pixels(cols)], vec![1.0; rows * cols]).unwrap();
        let spectrum = image.fft(true).unwrap();
        let amplitude = spectrum.amplitude();
        assert_relative_eq!((rows * cols) as f64, amplitude.value(&[rows / 2, cols / 2]), epsilon = 1.0e-9);
        assert_relative_eq!((rows * cols) as f64, amplitude.pixels().iter().sum::<f64>(), epsilon = 1.0e-9);
    }

    #[test]
    fn without_record_real_space_axes_are_derived() {
        let spectrum = Image::new(
            vec![Axis::uniform(4, 0.25, 0.0).with_units("1/um"), Axis::uniform(2, 0.5, 0.0)],
            vec![Complex64::new(1.0, 0.0); 8]
        ).unwrap();
        let image = spectrum.ifft(false).unwrap();
        assert_eq!(&AxisKind::Uniform{ scale: 1.0, offset: 0.0 }, image.axis(0).kind());
        assert_eq!(Some("um"), image.axis(0).units());
        assert_relative_eq!(1.0, image.value(&[0, 0]).re);
    }

    #[test]
    fn phase_and_amplitude_views() {
        let image = Image::new(
            vec![Axis::pixels(1), Axis::pixels(2)],
            vec![Complex64::new(0.0, 2.0), Complex64::new(-3.0, 0.0)]
        ).unwrap();
        assert_eq!(&[2.0, 3.0], image.amplitude().pixels());
        assert_relative_eq!(std::f64::consts::FRAC_PI_2, image.phase().pixels()[0]);
        assert_relative_eq!(std::f64::consts::PI, image.phase().pixels()[1]);
        assert_eq!(&[0.0, -3.0], image.real().pixels());
        assert_eq!(&[2.0, 0.0], image.imag().pixels());
    }

    #[test]
    fn kernel_is_broadcast_over_navigation() {
        let image = test_stack().to_complex();
        let kernel = Image::new(vec![Axis::pixels(6), Axis::pixels(9)], vec![2.0; 54]).unwrap();
        let result = image.apply_kernel(&kernel).unwrap();
        assert_eq!(image.axes(), result.axes());
        assert_eq!(image.pixels()[60] * 2.0, result.pixels()[60]);

        let single = Image::new(vec![Axis::pixels(6), Axis::pixels(9)], vec![Complex64::new(1.0, 1.0); 54]).unwrap();
        let kernels = Image::from_fn(
            vec![Axis::explicit(vec![1.0, 2.0, 3.0]).with_name("defocus"), Axis::pixels(6), Axis::pixels(9)],
            |i| Complex64::new(i[0] as f64, 0.0)
        );
        let result = single.apply_kernel(&kernels).unwrap();
        assert_eq!(vec![3, 6, 9], result.shape());
        assert_eq!(kernels.axis(0), result.axis(0));
        assert_eq!(Complex64::new(2.0, 2.0), result.value(&[2, 5, 8]));
    }

    #[test]
    fn when_kernel_cannot_be_broadcast_fail() {
        let image = test_stack().to_complex();
        let kernels = Image::<f64>::zeros(vec![Axis::pixels(3), Axis::pixels(6), Axis::pixels(9)]);
        assert!(matches!(image.apply_kernel(&kernels), Err(Error::ShapeMismatch(_))));

        let kernel = Image::<f64>::zeros(vec![Axis::pixels(9), Axis::pixels(6)]);
        assert!(matches!(image.apply_kernel(&kernel), Err(Error::ShapeMismatch(_))));
    }

    #[test]
    fn low_pass_keeps_constant_image() {
        let axis = Axis::uniform(16, 0.5, 0.0).with_units("nm");
        let image = Image::new(vec![axis.clone(), axis], vec![3.0; 256]).unwrap();

        let spectrum = image.fft(true).unwrap();
        let (row_axis, col_axis) = spectrum.signal_axes().unwrap();
        let grid = CoordinateGrid::new(row_axis, col_axis, false).unwrap();
        let kernel = gaussian_low_pass(&grid, 0.2).unwrap();
        assert_eq!(1.0, kernel.value(&[8, 8]));

        let filtered = spectrum.apply_kernel(&kernel).unwrap().ifft(true).unwrap().real();
        assert_eq!(image.axes(), filtered.axes());
        for value in filtered.pixels() {
            assert_relative_eq!(3.0, *value, epsilon = 1.0e-10);
        }
    }

    #[test]
    fn low_pass_attenuates_high_frequencies() {
        let axis = Axis::pixels(32);
        let image = Image::from_fn(vec![axis.clone(), axis], |i| if (i[0] + i[1]) % 2 == 0 { 1.0 } else { -1.0 });
        let spectrum = image.fft(true).unwrap();
        let (row_axis, col_axis) = spectrum.signal_axes().unwrap();
        let grid = CoordinateGrid::new(row_axis, col_axis, false).unwrap();
        let filtered = spectrum.apply_kernel(&gaussian_low_pass(&grid, 0.1).unwrap()).unwrap().ifft(true).unwrap();
        assert!(filtered.amplitude().pixels().iter().all(|&v| v < 1.0e-3));
    }

    #[test]
    fn pad_record_survives_round_trip() {
        let image = test_stack();
        let spec = PadSpec::new(PadWidths::signal(3, (2, 3), (4, 0)), PadMode::Reflect);
        let padded = image.pad(&spec).unwrap();

        let spectrum = padded.fft(true).unwrap();
        assert_eq!(padded.pad_record(), spectrum.pad_record());

        let restored = spectrum.ifft(true).unwrap().real().remove_pad().unwrap();
        assert_eq!(image.axes(), restored.axes());
        for (a, b) in image.pixels().iter().zip(restored.pixels()) {
            assert_relative_eq!(*a, *b, epsilon = 1.0e-10);
        }
    }

    #[test]
    fn when_spectrum_padded_inverse_uses_padded_shape() {
        let image = test_stack();
        let spectrum = image.fft(true).unwrap();
        let padded = spectrum.pad(
            &PadSpec::new(PadWidths::signal(3, (4, 4), (4, 4)), PadMode::Constant(Fill::Scalar(Complex64::new(0.0, 0.0))))
        ).unwrap();
        assert!(padded.real_space_axes().is_none());

        let upsampled = padded.ifft(true).unwrap();
        assert_eq!(vec![2, 14, 17], upsampled.shape());
        let (row_axis, col_axis) = upsampled.signal_axes().unwrap();
        assert_eq!(Some("nm"), row_axis.units());
        assert_relative_eq!(0.5 * 6.0 / 14.0, row_axis.scale(), epsilon = 1.0e-12);
        assert_relative_eq!(0.5 * 9.0 / 17.0, col_axis.scale(), epsilon = 1.0e-12);
    }

    #[test]
    fn when_real_space_record_does_not_match_plane_it_is_ignored() {
        let mut spectrum = test_stack().fft(false).unwrap();
        spectrum.set_real_space_axes(Some(vec![Axis::pixels(3), Axis::pixels(3)]));
        let image = spectrum.ifft(false).unwrap();
        assert_eq!(vec![2, 6, 9], image.shape());
        assert_relative_eq!(0.5, image.axis(1).scale(), epsilon = 1.0e-12);
    }

    #[test]
    fn when_sigma_not_positive_fail() {
        let grid = CoordinateGrid::new(&Axis::pixels(4), &Axis::pixels(4), true).unwrap();
        assert!(matches!(gaussian_low_pass(&grid, 0.0), Err(Error::InvalidParameter(_))));
        assert!(matches!(gaussian_low_pass(&grid, std::f64::NAN), Err(Error::InvalidParameter(_))));
    }
}
