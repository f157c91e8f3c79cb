//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Padding and its exact inverse.
//!

use super::{utils, Axis, Image, Sample};
use crate::error::{Error, Result};
use rayon::prelude::*;

/// Pad widths; one `(before, after)` pair per image dimension.
#[derive(Clone, Debug, PartialEq)]
pub enum PadWidths {
    /// Number of pixels.
    Pixels(Vec<(usize, usize)>),

    /// Calibrated units; converted to pixels using each axis' scale (rounding down).
    Scaled(Vec<(f64, f64)>)
}

impl PadWidths {
    /// Pads only the signal axes of an image of `rank` (rank >= 2).
    pub fn signal(rank: usize, rows: (usize, usize), cols: (usize, usize)) -> PadWidths {
        let mut widths = vec![(0, 0); rank.saturating_sub(2)];
        widths.push(rows);
        widths.push(cols);
        PadWidths::Pixels(widths)
    }

    fn to_pixels(&self, axes: &[Axis]) -> Result<Vec<(usize, usize)>> {
        let count = match self {
            PadWidths::Pixels(w) => w.len(),
            PadWidths::Scaled(w) => w.len()
        };
        if count != axes.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} pad widths given for an image of rank {}", count, axes.len()
            )));
        }

        match self {
            PadWidths::Pixels(widths) => Ok(widths.clone()),

            PadWidths::Scaled(widths) => widths.iter().zip(axes.iter()).map(|(&(before, after), axis)| {
                let scale = axis.scale().abs();
                if !scale.is_finite() || scale == 0.0 {
                    return Err(Error::InvalidParameter(format!(
                        "cannot convert scaled pad widths for axis of scale {}", axis.scale()
                    )));
                }
                let to_px = |w: f64| -> Result<usize> {
                    let px = (w / scale).floor();
                    if !w.is_finite() || w < 0.0 || !(px < isize::MAX as f64) {
                        Err(Error::InvalidParameter(format!("invalid pad width: {}", w)))
                    } else {
                        Ok(px as usize)
                    }
                };
                Ok((to_px(before)?, to_px(after)?))
            }).collect()
        }
    }
}

/// Values used by `PadMode::Constant`.
#[derive(Clone, Debug, PartialEq)]
pub enum Fill<T> {
    Scalar(T),

    /// One value per navigation index (navigation axes must not be padded).
    PerNavigation(Vec<T>)
}

#[derive(Clone, Debug, PartialEq)]
pub enum PadMode<T> {
    Constant(Fill<T>),
    /// Mirror image excluding the edge value: `c b | a b c d | c b`.
    Reflect,
    /// Mirror image including the edge value: `b a | a b c d | d c`.
    Symmetric,
    /// Repeats the edge value.
    Edge,
    /// Periodic continuation.
    Wrap
}

#[derive(Copy, Clone, Debug, PartialEq, strum_macros::Display, strum_macros::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PadKind {
    Constant,
    Reflect,
    Symmetric,
    Edge,
    Wrap
}

impl<T> PadMode<T> {
    pub fn kind(&self) -> PadKind {
        match self {
            PadMode::Constant(_) => PadKind::Constant,
            PadMode::Reflect => PadKind::Reflect,
            PadMode::Symmetric => PadKind::Symmetric,
            PadMode::Edge => PadKind::Edge,
            PadMode::Wrap => PadKind::Wrap
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PadSpec<T> {
    pub widths: PadWidths,
    pub mode: PadMode<T>
}

impl<T> PadSpec<T> {
    pub fn new(widths: PadWidths, mode: PadMode<T>) -> PadSpec<T> {
        PadSpec{ widths, mode }
    }
}

/// Remembers how an image was padded, so that `remove_pad` can restore it exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct PadRecord {
    widths: Vec<(usize, usize)>,
    kind: PadKind,
    /// Offsets of the axes before padding.
    offsets: Vec<f64>
}

impl PadRecord {
    pub fn widths(&self) -> &[(usize, usize)] { &self.widths }

    pub fn kind(&self) -> PadKind { self.kind }
}

/// Maps a possibly out-of-range index `i` into `0..n` according to `kind`.
///
/// Returns `None` for indices to be filled with a constant.
///
fn source_index(i: isize, n: usize, kind: PadKind) -> Option<usize> {
    let n_i = n as isize;
    if i >= 0 && i < n_i {
        return Some(i as usize);
    }

    match kind {
        PadKind::Constant => None,

        PadKind::Edge => Some(if i < 0 { 0 } else { n - 1 }),

        PadKind::Wrap => Some(i.rem_euclid(n_i) as usize),

        PadKind::Reflect => if n == 1 {
            Some(0)
        } else {
            let period = 2 * (n_i - 1);
            let m = i.rem_euclid(period);
            Some(if m < n_i { m } else { period - m } as usize)
        },

        PadKind::Symmetric => {
            let period = 2 * n_i;
            let m = i.rem_euclid(period);
            Some(if m < n_i { m } else { period - 1 - m } as usize)
        }
    }
}

impl<T: Sample> Image<T> {
    /// Returns a padded copy; the pad record attached to the result allows `remove_pad` to undo it.
    ///
    /// Padding an already padded image replaces its record. The real-space record of a spectrum
    /// is not carried over, since it no longer matches the padded shape.
    ///
    pub fn pad(&self, spec: &PadSpec<T>) -> Result<Image<T>> {
        let widths = spec.widths.to_pixels(self.axes())?;
        let kind = spec.mode.kind();
        let src_shape = self.shape();

        for (d, (&(before, after), &size)) in widths.iter().zip(src_shape.iter()).enumerate() {
            if size == 0 && before + after > 0 && kind != PadKind::Constant {
                return Err(Error::InvalidParameter(format!(
                    "cannot pad empty axis {} in {} mode", d, kind
                )));
            }
        }

        let nav_dim = self.nav_dimension();
        if let PadMode::Constant(Fill::PerNavigation(values)) = &spec.mode {
            if values.len() != self.nav_len() {
                return Err(Error::ShapeMismatch(format!(
                    "{} fill values given for {} navigation indices", values.len(), self.nav_len()
                )));
            }
            if widths[..nav_dim].iter().any(|&(b, a)| b + a > 0) {
                return Err(Error::ShapeMismatch(
                    "per-navigation fill values require unpadded navigation axes".to_string()
                ));
            }
        }

        let dst_shape = src_shape.iter().zip(widths.iter())
            .map(|(s, (b, a))| s.checked_add(*b).and_then(|v| v.checked_add(*a)))
            .collect::<Option<Vec<usize>>>()
            .ok_or_else(|| Error::InvalidParameter(format!("pad widths {:?} are too large", widths)))?;
        let src_strides = utils::strides(&src_shape);
        let nav_strides = utils::strides(&src_shape[..nav_dim]);
        let src = self.pixels();

        let pixels: Vec<T> = (0..utils::num_elements(&dst_shape)).into_par_iter().map(|flat| {
            let mut index = vec![0; dst_shape.len()];
            utils::unravel(flat, &dst_shape, &mut index);

            let mut src_flat = 0;
            for d in 0..index.len() {
                match source_index(index[d] as isize - widths[d].0 as isize, src_shape[d], kind) {
                    Some(i) => src_flat += i * src_strides[d],
                    None => return match &spec.mode {
                        PadMode::Constant(Fill::Scalar(value)) => *value,
                        PadMode::Constant(Fill::PerNavigation(values)) => {
                            let nav_index: usize = index[..nav_dim].iter().zip(nav_strides.iter())
                                .map(|(i, s)| i * s).sum();
                            values[nav_index]
                        },
                        _ => unreachable!()
                    }
                }
            }

            src[src_flat]
        }).collect();

        let axes: Vec<Axis> = self.axes().iter().zip(widths.iter())
            .map(|(axis, &(before, after))| axis.extended(before, after))
            .collect();

        log::debug!("padded image {:?} to {:?} ({} mode)", src_shape, dst_shape, kind);

        let mut result = Image::new(axes, pixels)?;
        result.set_pad_record(Some(PadRecord{
            widths,
            kind,
            offsets: self.axes().iter().map(|a| a.offset()).collect()
        }));

        Ok(result)
    }

    /// Undoes the last `pad`, restoring data, shape and calibration exactly.
    pub fn remove_pad(&self) -> Result<Image<T>> {
        let record = self.pad_record().ok_or(Error::NoPadRecord)?;
        let padded_shape = self.shape();
        if record.widths.len() != padded_shape.len() {
            return Err(Error::ShapeMismatch(format!(
                "pad record of rank {} does not match image of rank {}", record.widths.len(), padded_shape.len()
            )));
        }

        let mut dst_shape = Vec::with_capacity(padded_shape.len());
        for (&size, &(before, after)) in padded_shape.iter().zip(record.widths.iter()) {
            if size < before + after {
                return Err(Error::ShapeMismatch(format!(
                    "axis of size {} cannot have pad widths ({}, {})", size, before, after
                )));
            }
            dst_shape.push(size - before - after);
        }

        let src_strides = utils::strides(&padded_shape);
        let src = self.pixels();
        let pixels: Vec<T> = (0..utils::num_elements(&dst_shape)).into_par_iter().map(|flat| {
            let mut index = vec![0; dst_shape.len()];
            utils::unravel(flat, &dst_shape, &mut index);
            let src_flat: usize = index.iter().zip(record.widths.iter()).zip(src_strides.iter())
                .map(|((i, (before, _)), stride)| (i + before) * stride)
                .sum();
            src[src_flat]
        }).collect();

        let axes: Vec<Axis> = self.axes().iter().zip(record.widths.iter()).zip(dst_shape.iter())
            .zip(record.offsets.iter())
            .map(|(((axis, &(before, _)), &size), &offset)| {
                let mut axis = axis.cropped(before, size);
                axis.set_offset(offset);
                axis
            })
            .collect();

        Image::new(axes, pixels)
    }
}
