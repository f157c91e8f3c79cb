//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Utilities.
//!

use holotool::{Axis, Error, Image};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Creates an inline hologram of a point scatterer at the image center.
///
/// Fresnel zone pattern under a Gaussian envelope; the fringe frequency at the image border
/// is a quarter of the sampling frequency.
///
pub fn synthetic_hologram(size: usize, scale: f64, units: &str) -> Image<f64> {
    let axis = Axis::uniform(size, scale, 0.0).with_units(units);
    let extent = size as f64 * scale;
    let center = (size / 2) as f64 * scale;
    let envelope = 2.0 * (extent / 4.0).powi(2);

    Image::from_fn(vec![axis.clone().with_name("y"), axis.with_name("x")], |index| {
        let y = index[0] as f64 * scale - center;
        let x = index[1] as f64 * scale - center;
        let r2 = x * x + y * y;
        1.0 + 0.5 * (std::f64::consts::PI * r2 / (2.0 * extent * scale)).cos() * (-r2 / envelope).exp()
    })
}

/// Returns a copy of `image` with added Gaussian noise of standard deviation `sigma`.
pub fn add_noise(image: &Image<f64>, sigma: f64, rng: &mut StdRng) -> Result<Image<f64>, Error> {
    let normal = Normal::new(0.0, sigma).map_err(|e| Error::InvalidParameter(format!("noise level: {}", e)))?;
    let pixels = image.pixels().iter().map(|v| v + normal.sample(&mut *rng)).collect();

    Image::new(image.axes().to_vec(), pixels)
}

/// Returns (mean, standard deviation) of `values`.
pub fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (std::f64::NAN, std::f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    (mean, var.sqrt())
}

/// Returns the root-mean-square difference of two equally sized images.
pub fn rms_difference(image_1: &Image<f64>, image_2: &Image<f64>) -> f64 {
    let diff: Vec<f64> = image_1.pixels().iter().zip(image_2.pixels()).map(|(a, b)| a - b).collect();
    let (mean, std_dev) = mean_and_std_dev(&diff);

    (mean * mean + std_dev * std_dev).sqrt()
}

/// Prints a 1D profile (the last axis of `profile`) as a two-column table.
pub fn print_profile(profile: &Image<f64>, title: &str) {
    let axis = profile.axis(profile.rank() - 1);
    let units = axis.units().map(|u| format!(" [{}]", u)).unwrap_or_default();

    println!("\n{}\n", title);
    println!("{:>14}    {:>12}", format!("{}{}", axis.name(), units), "value");
    for (coord, value) in axis.coordinates().iter().zip(profile.pixels()) {
        println!("{:>14.5}    {:>12.6}", coord, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn hologram_is_centered_and_positive() {
        let image = synthetic_hologram(64, 0.5, "nm");
        assert_eq!(vec![64, 64], image.shape());
        assert_eq!(Some("nm"), image.axis(0).units());
        assert_eq!(1.5, image.value(&[32, 32]));
        assert_eq!(image.value(&[32, 20]), image.value(&[32, 44]));
        assert_eq!(image.value(&[20, 32]), image.value(&[32, 20]));
        assert!(image.pixels().iter().all(|&v| v > 0.0));
    }

    #[test]
    fn noise_is_reproducible_for_seed() {
        let image = synthetic_hologram(16, 1.0, "nm");
        let noisy_1 = add_noise(&image, 0.1, &mut StdRng::seed_from_u64(7)).unwrap();
        let noisy_2 = add_noise(&image, 0.1, &mut StdRng::seed_from_u64(7)).unwrap();
        let noisy_3 = add_noise(&image, 0.1, &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(noisy_1.pixels(), noisy_2.pixels());
        assert_ne!(noisy_1.pixels(), noisy_3.pixels());
        assert_eq!(image.axes(), noisy_1.axes());
    }

    #[test]
    fn when_noise_level_invalid_fail() {
        let image = synthetic_hologram(4, 1.0, "nm");
        assert!(add_noise(&image, std::f64::INFINITY, &mut StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn statistics_of_known_values() {
        let (mean, std_dev) = mean_and_std_dev(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(2.5, mean);
        assert_relative_eq!(1.25f64.sqrt(), std_dev);
        let (mean, std_dev) = mean_and_std_dev(&[]);
        assert!(mean.is_nan() && std_dev.is_nan());
    }
}
