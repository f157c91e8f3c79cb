//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Error and warning types.
//!

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Structural errors; fatal to the call which reports them.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("invalid bin specification: {0}")]
    InvalidBinSpec(String),

    #[error("image has no pad record; remove_pad requires the output of a previous pad")]
    NoPadRecord,

    #[error("index {index} out of bounds for axis \"{axis}\" of size {size}")]
    AxisBounds { axis: String, index: usize, size: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String)
}

/// Non-fatal conditions; the operation proceeds using raw axis values.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// Axis has no units; coordinates are used as they are.
    UnitsUndefined { axis: String },

    /// Signal axes use different units; unit differences are not accounted for.
    UnitsMismatch { units: (String, String) },

    /// Signal axes have different scales.
    ScaleMismatch { scales: (f64, f64) }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnitsUndefined{ axis } =>
                write!(f, "units of axis \"{}\" are undefined", axis),

            Warning::UnitsMismatch{ units } =>
                write!(f, "signal axes have different units ({}, {}); unit differences are not accounted for",
                    units.0, units.1),

            Warning::ScaleMismatch{ scales } =>
                write!(f, "signal axes have different scales ({}, {})", scales.0, scales.1)
        }
    }
}
