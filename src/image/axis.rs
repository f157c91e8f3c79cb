//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Calibrated image axis.
//!

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum AxisKind {
    /// Coordinate of index `i` is `offset + scale * i`.
    Uniform { scale: f64, offset: f64 },

    /// Coordinates listed explicitly; need not be monotonic.
    Explicit(Vec<f64>)
}

/// One calibrated dimension of an image.
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    name: String,
    units: Option<String>,
    size: usize,
    kind: AxisKind
}

impl Axis {
    pub fn uniform(size: usize, scale: f64, offset: f64) -> Axis {
        Axis{ name: String::new(), units: None, size, kind: AxisKind::Uniform{ scale, offset } }
    }

    /// Creates an axis from explicit coordinates; its size is the number of values.
    pub fn explicit(values: Vec<f64>) -> Axis {
        Axis{ name: String::new(), units: None, size: values.len(), kind: AxisKind::Explicit(values) }
    }

    /// Uniform axis with scale 1 and offset 0.
    pub fn pixels(size: usize) -> Axis {
        Axis::uniform(size, 1.0, 0.0)
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Axis {
        self.name = name.to_string();
        self
    }

    #[must_use]
    pub fn with_units(mut self, units: &str) -> Axis {
        self.units = Some(units.to_string());
        self
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn units(&self) -> Option<&str> { self.units.as_deref() }

    pub fn size(&self) -> usize { self.size }

    pub fn kind(&self) -> &AxisKind { &self.kind }

    pub fn is_uniform(&self) -> bool {
        match self.kind {
            AxisKind::Uniform{ .. } => true,
            AxisKind::Explicit(_) => false
        }
    }

    /// Returns the physical coordinate of `index`.
    ///
    /// Uniform axes follow their linear law for any index; explicit axes fail for `index >= size`.
    ///
    pub fn coordinate_at(&self, index: usize) -> Result<f64> {
        match &self.kind {
            AxisKind::Uniform{ scale, offset } => Ok(offset + scale * index as f64),

            AxisKind::Explicit(values) => values.get(index).copied().ok_or_else(|| Error::AxisBounds{
                axis: self.name.clone(),
                index,
                size: self.size
            })
        }
    }

    pub fn coordinates(&self) -> Vec<f64> {
        match &self.kind {
            AxisKind::Uniform{ scale, offset } => (0..self.size).map(|i| offset + scale * i as f64).collect(),
            AxisKind::Explicit(values) => values.clone()
        }
    }

    /// Scale of a uniform axis; mean spacing of an explicit one (1.0 if it has fewer than 2 values).
    pub fn scale(&self) -> f64 {
        match &self.kind {
            AxisKind::Uniform{ scale, .. } => *scale,
            AxisKind::Explicit(values) => if values.len() < 2 {
                1.0
            } else {
                (values[values.len() - 1] - values[0]) / (values.len() - 1) as f64
            }
        }
    }

    /// Offset of a uniform axis; first value of an explicit one.
    pub fn offset(&self) -> f64 {
        match &self.kind {
            AxisKind::Uniform{ offset, .. } => *offset,
            AxisKind::Explicit(values) => values.first().copied().unwrap_or(0.0)
        }
    }

    /// Sets the offset of a uniform axis; explicit axes are left unchanged.
    pub(crate) fn set_offset(&mut self, new_offset: f64) {
        if let AxisKind::Uniform{ offset, .. } = &mut self.kind {
            *offset = new_offset;
        }
    }

    /// Returns a copy with `before` and `after` coordinates added at the ends.
    ///
    /// Uniform axes keep their linear law (the offset moves back by `before * scale`). Explicit axes
    /// are extrapolated linearly with the spacing at the respective end; the existing values are kept as they are.
    ///
    pub(crate) fn extended(&self, before: usize, after: usize) -> Axis {
        let kind = match &self.kind {
            AxisKind::Uniform{ scale, offset } => AxisKind::Uniform{
                scale: *scale,
                offset: offset - before as f64 * scale
            },

            AxisKind::Explicit(values) => {
                let (first_step, last_step) = end_steps(values);
                let first = values.first().copied().unwrap_or(0.0);
                let last = values.last().copied().unwrap_or(0.0);

                let mut extended = Vec::with_capacity(values.len() + before + after);
                extended.extend((1..=before).rev().map(|i| first - first_step * i as f64));
                extended.extend_from_slice(values);
                extended.extend((1..=after).map(|i| last + last_step * i as f64));
                AxisKind::Explicit(extended)
            }
        };

        Axis{ name: self.name.clone(), units: self.units.clone(), size: self.size + before + after, kind }
    }

    /// Returns the axis restricted to indices `start..start + len`.
    ///
    /// Uniform axes get the offset of `start`; explicit values are copied verbatim.
    ///
    pub(crate) fn cropped(&self, start: usize, len: usize) -> Axis {
        let kind = match &self.kind {
            AxisKind::Uniform{ scale, offset } => AxisKind::Uniform{
                scale: *scale,
                offset: offset + start as f64 * scale
            },
            AxisKind::Explicit(values) => AxisKind::Explicit(values[range!(start, len)].to_vec())
        };

        Axis{ name: self.name.clone(), units: self.units.clone(), size: len, kind }
    }
}

/// Returns spacings at the start and at the end of `values`.
fn end_steps(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n < 2 {
        (1.0, 1.0)
    } else {
        (values[1] - values[0], values[n - 1] - values[n - 2])
    }
}
