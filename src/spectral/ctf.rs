//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Contrast transfer function of a defocused imaging system.
//!

use crate::error::{Error, Result};
use crate::image::{Axis, Image};
use crate::radial::grid::CoordinateGrid;
use num_complex::Complex64;
use rayon::prelude::*;
use super::frequency_axis;

/// Imaging system parameters; lengths use the units of the image's signal axes.
#[derive(Clone, Debug, PartialEq)]
pub struct CtfParams {
    pub wavelength: f64,
    pub refractive_index: f64,
    pub numerical_aperture: f64,
    /// If set, the aperture edge is smoothed with a cosine bell extending up to `1 + smoothing`
    /// times the aperture's squared wavenumber.
    pub smoothing: Option<f64>
}

impl Default for CtfParams {
    fn default() -> CtfParams {
        CtfParams{ wavelength: 1.0, refractive_index: 1.0, numerical_aperture: 1.0, smoothing: None }
    }
}

impl CtfParams {
    fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f64| if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Error::InvalidParameter(format!("{} must be positive, got {}", name, value)))
        };

        positive("wavelength", self.wavelength)?;
        positive("refractive index", self.refractive_index)?;
        positive("numerical aperture", self.numerical_aperture)?;
        if let Some(smoothing) = self.smoothing {
            positive("aperture smoothing", smoothing)?;
        }

        Ok(())
    }
}

/// Creates the contrast transfer functions of a defocus series for real-space signal axes `row_axis` x `col_axis`.
///
/// The result has a leading navigation axis "defocus" (one plane per value of `defoci`) followed by
/// unshifted frequency axes, i.e., it can be applied directly to the output of `Image::fft(false)`.
///
pub fn contrast_transfer(row_axis: &Axis, col_axis: &Axis, defoci: &[f64], params: &CtfParams) -> Result<Image<Complex64>> {
    if defoci.is_empty() {
        return Err(Error::InvalidParameter("at least one defocus value is required".to_string()));
    }
    if let Some(z) = defoci.iter().find(|z| !z.is_finite()) {
        return Err(Error::InvalidParameter(format!("invalid defocus value {}", z)));
    }
    params.validate()?;

    let k2 = CoordinateGrid::frequency(row_axis, col_axis, false).k_squared();

    let wnum = 2.0 * std::f64::consts::PI * params.refractive_index / params.wavelength;
    let wnum2 = wnum * wnum;
    let aperture_k2 = (params.numerical_aperture * wnum / params.refractive_index).powi(2);

    // propagation phase per unit defocus and aperture transmission
    let (chi, aperture): (Vec<f64>, Vec<f64>) = k2.par_iter().map(|&k2| {
        // evanescent waves do not propagate
        if k2 > wnum2 {
            return (0.0, 0.0);
        }
        let chi = (wnum2 - k2).sqrt() - wnum;
        let aperture = if k2 <= aperture_k2 {
            1.0
        } else {
            match params.smoothing {
                Some(smoothing) if k2 < (1.0 + smoothing) * aperture_k2 =>
                    0.5 * (1.0 + (std::f64::consts::PI * (k2 - aperture_k2) / (smoothing * aperture_k2)).cos()),
                _ => 0.0
            }
        };
        (chi, aperture)
    }).unzip();

    let mut axes = vec![defocus_axis(defoci)];
    axes.push(frequency_axis(row_axis, false));
    axes.push(frequency_axis(col_axis, false));

    let mut pixels = Vec::with_capacity(defoci.len() * k2.len());
    for &z in defoci {
        pixels.extend(chi.iter().zip(aperture.iter()).map(|(&chi, &a)| Complex64::from_polar(a, chi * z)));
    }

    log::debug!(
        "created {} contrast transfer function(s), wave number {:.4}, aperture |k|^2 = {:.4}",
        defoci.len(), wnum, aperture_k2
    );

    let mut result = Image::new(axes, pixels)?;
    result.set_real_space_axes(Some(vec![row_axis.clone(), col_axis.clone()]));

    Ok(result)
}

fn defocus_axis(defoci: &[f64]) -> Axis {
    let axis = if defoci.len() >= 2 {
        let step = defoci[1] - defoci[0];
        let uniform = step != 0.0 && defoci.iter().enumerate()
            .all(|(i, &z)| z == defoci[0] + i as f64 * step);
        if uniform { Axis::uniform(defoci.len(), step, defoci[0]) } else { Axis::explicit(defoci.to_vec()) }
    } else {
        Axis::uniform(1, 1.0, defoci[0])
    };

    axis.with_name("defocus")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::AxisKind;
    use approx::assert_relative_eq;

    #[test]
    fn zero_defocus_is_the_aperture() {
        let axis = Axis::uniform(16, 0.25, 0.0).with_units("um");
        let ctf = contrast_transfer(&axis, &axis, &[0.0], &CtfParams{ numerical_aperture: 0.5, ..Default::default() })
            .unwrap();
        assert_eq!(vec![1, 16, 16], ctf.shape());

        // frequency spacing is 0.25 / um; aperture radius is NA / wavelength = 0.5 / um
        assert_eq!(Complex64::new(1.0, 0.0), ctf.value(&[0, 0, 0]));
        assert_eq!(Complex64::new(1.0, 0.0), ctf.value(&[0, 0, 2]));
        assert_eq!(0.0, ctf.value(&[0, 0, 3]).norm());
        assert_eq!(0.0, ctf.value(&[0, 2, 1]).norm());
    }

    #[test]
    fn phase_follows_angular_spectrum_propagator() {
        let axis = Axis::uniform(8, 0.5, 0.0);
        let params = CtfParams{ wavelength: 0.5, ..Default::default() };
        let ctf = contrast_transfer(&axis, &axis, &[2.0, 4.0, 6.0], &params).unwrap();

        assert_eq!(&AxisKind::Uniform{ scale: 2.0, offset: 2.0 }, ctf.axis(0).kind());
        assert_eq!("defocus", ctf.axis(0).name());

        let wnum = 2.0 * std::f64::consts::PI / 0.5;
        let k = 2.0 * std::f64::consts::PI * 0.25;
        let chi = (wnum * wnum - k * k).sqrt() - wnum;
        for (nav, z) in [2.0, 4.0, 6.0].iter().enumerate() {
            let value = ctf.value(&[nav, 0, 1]);
            assert_relative_eq!(1.0, value.norm(), epsilon = 1.0e-12);
            assert_relative_eq!((chi * z).cos(), value.re, epsilon = 1.0e-12);
            assert_relative_eq!((chi * z).sin(), value.im, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn evanescent_frequencies_are_blocked() {
        // wave number pi/2, so frequencies above 0.25 are evanescent; aperture extends to 0.5
        let axis = Axis::pixels(8);
        let params = CtfParams{ wavelength: 4.0, numerical_aperture: 2.0, ..Default::default() };
        let ctf = contrast_transfer(&axis, &axis, &[1.0], &params).unwrap();

        assert_relative_eq!(1.0, ctf.value(&[0, 0, 1]).norm(), epsilon = 1.0e-12);
        assert_relative_eq!(1.0, ctf.value(&[0, 1, 1]).norm(), epsilon = 1.0e-12);
        assert_eq!(Complex64::new(0.0, 0.0), ctf.value(&[0, 0, 3]));
        assert_eq!(Complex64::new(0.0, 0.0), ctf.value(&[0, 3, 3]));
    }

    #[test]
    fn smoothing_tapers_aperture_edge() {
        let axis = Axis::pixels(32);
        let params = CtfParams{ numerical_aperture: 0.25, smoothing: Some(1.0), ..Default::default() };
        let ctf = contrast_transfer(&axis, &axis, &[0.0], &params).unwrap();
        let amplitude: Vec<f64> = (0..16).map(|c| ctf.value(&[0, 0, c]).norm()).collect();

        // aperture at |f| = 0.25 (index 8), taper until |f|^2 = 2 * 0.25^2 (index 11.3)
        assert_eq!(1.0, amplitude[8]);
        assert!(amplitude[9] < 1.0 && amplitude[9] > amplitude[10] && amplitude[11] > 0.0);
        assert_eq!(0.0, amplitude[12]);
    }

    #[test]
    fn irregular_defoci_give_explicit_axis() {
        let axis = Axis::pixels(4);
        let ctf = contrast_transfer(&axis, &axis, &[-1.0, 0.5, 3.0], &CtfParams::default()).unwrap();
        assert_eq!(&AxisKind::Explicit(vec![-1.0, 0.5, 3.0]), ctf.axis(0).kind());
    }

    #[test]
    fn when_parameters_invalid_fail() {
        let axis = Axis::pixels(4);
        assert!(matches!(
            contrast_transfer(&axis, &axis, &[], &CtfParams::default()),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            contrast_transfer(&axis, &axis, &[1.0], &CtfParams{ wavelength: 0.0, ..Default::default() }),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            contrast_transfer(&axis, &axis, &[1.0], &CtfParams{ smoothing: Some(-1.0), ..Default::default() }),
            Err(Error::InvalidParameter(_))
        ));
    }
}
