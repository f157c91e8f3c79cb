//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Image-analysis helpers for inline holography: radial/angular integration, padding with exact inverse,
//! Fourier transforms with calibrated frequency axes and Fourier ring correlation.
//!

pub mod error;
#[macro_use]
pub mod image;
pub mod radial;
pub mod spectral;
pub mod validation;

pub use error::{Error, Result, Warning};
pub use image::{Axis, AxisKind, Fill, Image, PadKind, PadMode, PadRecord, PadSpec, PadWidths, Sample};
pub use radial::{BinSpec, CoordinateGrid, Digitization, Quantity, Reduction, Shift};
pub use spectral::{contrast_transfer, gaussian_low_pass, CtfParams};
pub use validation::{fourier_ring_correlation, Validation};
