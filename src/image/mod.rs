//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Image data structure and basic operations.
//!
//! An image is an N-dimensional array stored in row-major order with one calibrated axis per dimension.
//! The two trailing axes are the signal axes (the image plane); all leading axes are navigation axes
//! (e.g., a stack index), processed independently.
//!

#[macro_use]
pub mod utils; // must be first due to exported macros
pub mod axis;
pub mod pad;

pub use axis::{Axis, AxisKind};
pub use pad::{Fill, PadKind, PadMode, PadRecord, PadSpec, PadWidths};

use crate::error::{Error, Result};
use num_complex::Complex64;
use num_traits::Zero;
use rayon::prelude::*;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Type of pixel values; implemented for `f64` (real images) and `Complex64` (complex images).
pub trait Sample:
    Copy + Default + std::fmt::Debug + PartialEq + Send + Sync + 'static +
    Zero + Add<Output=Self> + AddAssign + Sub<Output=Self> + Mul<Output=Self> + Mul<f64, Output=Self> +
    Into<Complex64>
{
    fn from_f64(f: f64) -> Self;

    fn nan() -> Self;
}

impl Sample for f64 {
    fn from_f64(f: f64) -> Self { f }

    fn nan() -> Self { std::f64::NAN }
}

impl Sample for Complex64 {
    fn from_f64(f: f64) -> Self { Complex64::new(f, 0.0) }

    fn nan() -> Self { Complex64::new(std::f64::NAN, std::f64::NAN) }
}

#[derive(Clone, PartialEq)]
pub struct Image<T: Sample = f64> {
    axes: Vec<Axis>,
    pixels: Vec<T>,
    /// Set by `pad`, consumed by `remove_pad`.
    pad_record: Option<PadRecord>,
    /// Real-space signal axes; set by `fft`, consumed by `ifft`.
    real_space_axes: Option<Vec<Axis>>
}

impl<T: Sample> std::fmt::Debug for Image<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Image {:?}, pad_record = {:?}, pixels = {:?}...",
            self.shape(),
            self.pad_record,
            &self.pixels[..self.pixels.len().min(8)]
        )
    }
}

impl<T: Sample> Image<T> {
    /// Creates an image from `pixels` (row-major); the number of pixels must match the axis sizes.
    pub fn new(axes: Vec<Axis>, pixels: Vec<T>) -> Result<Image<T>> {
        if axes.is_empty() {
            return Err(Error::ShapeMismatch("image must have at least one axis".to_string()));
        }
        let shape: Vec<usize> = axes.iter().map(|a| a.size()).collect();
        if utils::num_elements(&shape) != pixels.len() {
            return Err(Error::ShapeMismatch(format!(
                "axes of shape {:?} require {} values, got {}", shape, utils::num_elements(&shape), pixels.len()
            )));
        }

        Ok(Image{ axes, pixels, pad_record: None, real_space_axes: None })
    }

    /// Creates a zero-filled image.
    pub fn zeros(axes: Vec<Axis>) -> Image<T> {
        let len = axes.iter().map(|a| a.size()).product();
        Image{ axes, pixels: vec![T::zero(); len], pad_record: None, real_space_axes: None }
    }

    /// Creates an image with uncalibrated (pixel) axes of `shape`.
    pub fn from_shape(shape: &[usize], pixels: Vec<T>) -> Result<Image<T>> {
        Image::new(shape.iter().map(|&s| Axis::pixels(s)).collect(), pixels)
    }

    /// Creates an image whose values are produced by `func` from each multi-index.
    pub fn from_fn<F: Fn(&[usize]) -> T>(axes: Vec<Axis>, func: F) -> Image<T> {
        let shape: Vec<usize> = axes.iter().map(|a| a.size()).collect();
        let mut index = vec![0; shape.len()];
        let pixels = (0..utils::num_elements(&shape)).map(|flat| {
            utils::unravel(flat, &shape, &mut index);
            func(&index)
        }).collect();

        Image{ axes, pixels, pad_record: None, real_space_axes: None }
    }

    pub fn rank(&self) -> usize { self.axes.len() }

    pub fn shape(&self) -> Vec<usize> { self.axes.iter().map(|a| a.size()).collect() }

    pub fn axes(&self) -> &[Axis] { &self.axes }

    pub fn axis(&self, dim: usize) -> &Axis { &self.axes[dim] }

    /// Replaces the calibration of `dim`; the new axis must have the same size.
    pub fn set_axis(&mut self, dim: usize, axis: Axis) -> Result<()> {
        if dim >= self.rank() || self.axes[dim].size() != axis.size() {
            return Err(Error::ShapeMismatch(format!(
                "cannot set axis {} of size {} on image of shape {:?}", dim, axis.size(), self.shape()
            )));
        }
        self.axes[dim] = axis;
        Ok(())
    }

    pub fn pixels(&self) -> &[T] { &self.pixels }

    pub fn pixels_mut(&mut self) -> &mut [T] { &mut self.pixels }

    pub fn take_pixel_data(self) -> Vec<T> { self.pixels }

    /// Returns the value at multi-index `index`.
    pub fn value(&self, index: &[usize]) -> T {
        assert!(index.len() == self.rank());
        let shape = self.shape();
        let flat = index.iter().zip(utils::strides(&shape)).map(|(i, s)| i * s).sum::<usize>();
        self.pixels[flat]
    }

    pub fn pad_record(&self) -> Option<&PadRecord> { self.pad_record.as_ref() }

    pub(crate) fn set_pad_record(&mut self, record: Option<PadRecord>) { self.pad_record = record; }

    pub(crate) fn real_space_axes(&self) -> Option<&[Axis]> { self.real_space_axes.as_deref() }

    pub(crate) fn set_real_space_axes(&mut self, axes: Option<Vec<Axis>>) { self.real_space_axes = axes; }

    /// Number of leading (navigation) axes.
    pub fn nav_dimension(&self) -> usize { self.rank().saturating_sub(2) }

    pub fn nav_axes(&self) -> &[Axis] { &self.axes[..self.nav_dimension()] }

    /// Number of navigation indices (1 for a single image).
    pub fn nav_len(&self) -> usize { self.nav_axes().iter().map(|a| a.size()).product() }

    /// Returns the (row, column) signal axes; fails for images of rank < 2.
    pub fn signal_axes(&self) -> Result<(&Axis, &Axis)> {
        if self.rank() < 2 {
            return Err(Error::ShapeMismatch(format!(
                "operation requires 2 signal axes, image has rank {}", self.rank()
            )));
        }
        let n = self.rank();
        Ok((&self.axes[n - 2], &self.axes[n - 1]))
    }

    /// Returns (rows, columns) of the signal plane; fails for images of rank < 2.
    pub fn signal_shape(&self) -> Result<(usize, usize)> {
        let (row_axis, col_axis) = self.signal_axes()?;
        Ok((row_axis.size(), col_axis.size()))
    }

    /// Returns the signal plane at navigation index `nav_index` (flattened).
    pub fn plane(&self, nav_index: usize) -> &[T] {
        let plane_len = self.plane_len();
        &self.pixels[range!(nav_index * plane_len, plane_len)]
    }

    fn plane_len(&self) -> usize {
        self.axes[self.nav_dimension()..].iter().map(|a| a.size()).product()
    }

    /// Creates an image from per-plane results of `func`, processed in parallel.
    ///
    /// `signal_axes` are the axes of the output planes; navigation axes are copied from `self`.
    /// Records (pad, real-space) are not carried over.
    ///
    pub(crate) fn map_planes<U, F>(&self, signal_axes: Vec<Axis>, func: F) -> Image<U>
    where U: Sample,
          F: Fn(usize, &[T]) -> Vec<U> + Sync + Send
    {
        let plane_len = self.plane_len().max(1);
        let out_plane_len: usize = signal_axes.iter().map(|a| a.size()).product();

        let mut pixels = vec![U::zero(); self.nav_len() * out_plane_len];
        if out_plane_len > 0 {
            pixels.par_chunks_mut(out_plane_len)
                .zip(self.pixels.par_chunks(plane_len))
                .enumerate()
                .for_each(|(nav_index, (output, input))| {
                    let result = func(nav_index, input);
                    debug_assert!(result.len() == out_plane_len);
                    output.copy_from_slice(&result);
                });
        }

        let mut axes = self.nav_axes().to_vec();
        axes.extend(signal_axes);

        Image{ axes, pixels, pad_record: None, real_space_axes: None }
    }

    /// Applies `func` to every value; axes and records are kept.
    pub fn map_values<U: Sample, F: Fn(T) -> U + Sync + Send>(&self, func: F) -> Image<U> {
        Image{
            axes: self.axes.clone(),
            pixels: self.pixels.par_iter().map(|&v| func(v)).collect(),
            pad_record: self.pad_record.clone(),
            real_space_axes: self.real_space_axes.clone()
        }
    }

    pub fn to_complex(&self) -> Image<Complex64> {
        self.map_values(|v| v.into())
    }

    /// Returns a copy with replaced pixel values and the same axes and records.
    pub(crate) fn with_pixels<U: Sample>(&self, pixels: Vec<U>) -> Image<U> {
        assert!(pixels.len() == self.pixels.len());
        Image{
            axes: self.axes.clone(),
            pixels,
            pad_record: self.pad_record.clone(),
            real_space_axes: self.real_space_axes.clone()
        }
    }
}
