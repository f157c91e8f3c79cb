//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Command-line options definitions and parsing.
//!

use crate::logging;
use holotool::{PadKind, Reduction};
use strum::IntoEnumIterator;

#[derive(Copy, Clone, Debug, PartialEq, strum_macros::EnumIter)]
pub enum ModeOfOperation {
    RadialProfile,
    AngularProfile,
    PadRoundTrip,
    LowPass,
    RingCorrelation
}

pub mod cmdline {
    pub const HELP:       &str = "help";
    pub const MODE:       &str = "mode";
    pub const SIZE:       &str = "size";
    pub const SCALE:      &str = "scale";
    pub const UNITS:      &str = "units";
    pub const BIN_SIZE:   &str = "bin_size";
    pub const SHIFTED:    &str = "shifted";
    pub const REDUCTION:  &str = "reduction";
    pub const PAD_WIDTH:  &str = "pad_width";
    pub const PAD_MODE:   &str = "pad_mode";
    pub const SIGMA:      &str = "sigma";
    pub const NOISE:      &str = "noise";
    pub const SEED:       &str = "seed";
    pub const LOG_LEVEL:  &str = "log_level";
}

#[derive(Debug)]
pub struct Configuration {
    mode: ModeOfOperation,
    size: usize,
    scale: f64,
    units: String,
    bin_size: Option<f64>,
    shifted: bool,
    reduction: Reduction,
    pad_width: usize,
    pad_mode: PadKind,
    sigma: f64,
    noise: f64,
    seed: u64,
    log_level: logging::Level
}

impl Configuration {
    pub fn mode(&self) -> ModeOfOperation { self.mode }
    pub fn size(&self) -> usize { self.size }
    pub fn scale(&self) -> f64 { self.scale }
    pub fn units(&self) -> &str { &self.units }
    pub fn bin_size(&self) -> Option<f64> { self.bin_size }
    pub fn shifted(&self) -> bool { self.shifted }
    pub fn reduction(&self) -> Reduction { self.reduction }
    pub fn pad_width(&self) -> usize { self.pad_width }
    pub fn pad_mode(&self) -> PadKind { self.pad_mode }
    pub fn sigma(&self) -> f64 { self.sigma }
    pub fn noise(&self) -> f64 { self.noise }
    pub fn seed(&self) -> u64 { self.seed }
    pub fn log_level(&self) -> logging::Level { self.log_level }
}

impl From<ModeOfOperation> for &str {
    fn from(m: ModeOfOperation) -> &'static str {
        match m {
            ModeOfOperation::RadialProfile   => "radial",
            ModeOfOperation::AngularProfile  => "angular",
            ModeOfOperation::PadRoundTrip    => "pad",
            ModeOfOperation::LowPass         => "lowpass",
            ModeOfOperation::RingCorrelation => "frc"
        }
    }
}

impl From<logging::Level> for &str {
    fn from(level: logging::Level) -> &'static str {
        match level {
            logging::Level::Quiet   => "quiet",
            logging::Level::Info    => "info",
            logging::Level::Verbose => "verbose"
        }
    }
}

impl std::str::FromStr for logging::Level {
    type Err = ();
    fn from_str(s: &str) -> Result<logging::Level, ()> {
        for level in logging::Level::iter() {
            if s == Into::<&str>::into(level) {
                return Ok(level);
            }
        }

        Err(())
    }
}

impl std::str::FromStr for ModeOfOperation {
    type Err = ();
    fn from_str(s: &str) -> Result<ModeOfOperation, ()> {
        for mode in ModeOfOperation::iter() {
            if s == Into::<&str>::into(mode) {
                return Ok(mode);
            }
        }

        Err(())
    }
}

/// Returns the list of `values` separated with `|`.
fn alternatives<T: Copy, I: Iterator<Item=T>, F: Fn(T) -> String>(values: I, name: F) -> String {
    values.map(name).collect::<Vec<String>>().join("|")
}

pub fn print_help() {
    println!(
r#"Command-line options:

  --{} <{}>

    Mode of operation. Possible values:

        {:8}    print the radial profile of a synthetic hologram
        {:8}    print the angular profile of a synthetic hologram
        {:8}    pad and unpad a synthetic hologram, report calibration and data round trip
        {:8}    Gaussian low-pass filter a noisy synthetic hologram in the frequency domain
        {:8}    print the Fourier ring correlation of two noisy copies of a synthetic hologram


  --{} <pixels>

    Size of the (square) synthetic image. Default: 256.


  --{} <value>

    Pixel size. Default: 1.0.


  --{} <text>

    Units of the pixel size. Default: nm.


  --{} <value>

    Bin width in calibrated units (radians for the angular profile). Default: automatic.


  --{} <yes|no>

    Whether radius and angle are measured from the image center. Default: yes.


  --{} <{}>

    How pixels are combined in each bin. Valid only when mode = {} or {}. Default: mean.


  --{} <pixels>

    Pad width on each side. Valid only when mode = {}. Default: 32.


  --{} <{}>

    Pad mode. Valid only when mode = {}. Default: reflect.


  --{} <value>

    Width of the low-pass filter in reciprocal units. Valid only when mode = {}. Default: 0.1.


  --{} <value>

    Standard deviation of the Gaussian noise added to the synthetic images. Default: 0.1.


  --{} <value>

    Seed of the noise generator. Default: 0.


  --{} <{}>

    Chooses the amount of messages to print during processing.

"#,
        cmdline::MODE, alternatives(ModeOfOperation::iter(), |m| Into::<&str>::into(m).to_string()),
        Into::<&str>::into(ModeOfOperation::RadialProfile),
        Into::<&str>::into(ModeOfOperation::AngularProfile),
        Into::<&str>::into(ModeOfOperation::PadRoundTrip),
        Into::<&str>::into(ModeOfOperation::LowPass),
        Into::<&str>::into(ModeOfOperation::RingCorrelation),

        cmdline::SIZE,

        cmdline::SCALE,

        cmdline::UNITS,

        cmdline::BIN_SIZE,

        cmdline::SHIFTED,

        cmdline::REDUCTION, alternatives(Reduction::iter(), |r| r.to_string()),
        Into::<&str>::into(ModeOfOperation::RadialProfile), Into::<&str>::into(ModeOfOperation::AngularProfile),

        cmdline::PAD_WIDTH, Into::<&str>::into(ModeOfOperation::PadRoundTrip),

        cmdline::PAD_MODE, alternatives(PadKind::iter(), |k| k.to_string()),
        Into::<&str>::into(ModeOfOperation::PadRoundTrip),

        cmdline::SIGMA, Into::<&str>::into(ModeOfOperation::LowPass),

        cmdline::NOISE,

        cmdline::SEED,

        cmdline::LOG_LEVEL, alternatives(logging::Level::iter(), |l| Into::<&str>::into(l).to_string())
    );
}

/// Returns the value of a single-valued option of type `T`.
fn get_option_value<T: std::str::FromStr>(
    option: &str,
    option_values: &std::collections::HashMap::<String, Vec<String>>
) -> Result<Option<T>, ()> {
    match option_values.get(option) {
        None => Ok(None),
        Some(vals) => if vals.is_empty() {
            eprintln!("Value missing for option {}.", option);
            Err(())
        } else if vals.len() > 1 {
            eprintln!("Too many values for option {}.", option);
            Err(())
        } else {
            match vals[0].parse::<T>() {
                Ok(value) => Ok(Some(value)),
                Err(_) => {
                    eprintln!("Invalid value for option {}: {}.", option, vals[0]);
                    Err(())
                }
            }
        }
    }
}

/// Returns the value of an option valid only in `mode`.
fn get_mode_option_value<T: std::str::FromStr>(
    option: &str,
    option_values: &std::collections::HashMap::<String, Vec<String>>,
    mode: ModeOfOperation,
    required_mode: ModeOfOperation
) -> Result<Option<T>, ()> {
    let value = get_option_value::<T>(option, option_values)?;
    if value.is_some() && mode != required_mode {
        eprintln!("Unexpected option {} (mode is not {}).", option, Into::<&str>::into(required_mode));
        return Err(());
    }

    Ok(value)
}

/// Returns Ok(None) if help was requested.
pub fn parse_command_line<I: Iterator<Item=String>>(stream: I) -> Result<Option<Configuration>, ()> {
    let allowed_options = vec![
        cmdline::HELP,
        cmdline::MODE,
        cmdline::SIZE,
        cmdline::SCALE,
        cmdline::UNITS,
        cmdline::BIN_SIZE,
        cmdline::SHIFTED,
        cmdline::REDUCTION,
        cmdline::PAD_WIDTH,
        cmdline::PAD_MODE,
        cmdline::SIGMA,
        cmdline::NOISE,
        cmdline::SEED,
        cmdline::LOG_LEVEL
    ];

    // key: option name
    let mut option_values = std::collections::HashMap::<String, Vec<String>>::new();

    let mut current: Option<&mut Vec<String>> = None;

    for arg in stream.skip(1) /*skip the binary name*/ {
        if let Some(option) = arg.strip_prefix("--") {
            match option {
                cmdline::HELP => { print_help(); return Ok(None); },
                x if !allowed_options.contains(&x) => {
                    eprintln!("Unknown command-line option: {}.", x); return Err(());
                },
                opt => current = Some(option_values.entry(opt.to_string()).or_insert_with(Vec::new)),
            }
        } else {
            match current.as_mut() {
                None => {
                    eprintln!("Unexpected value: {}.", arg);
                    return Err(());
                },
                Some(values) => values.push(arg)
            }
        }
    }

    let mode = match get_option_value::<String>(cmdline::MODE, &option_values)? {
        None => { eprintln!("Mode not specified."); return Err(()); },
        Some(mode) => match mode.parse::<ModeOfOperation>() {
            Ok(mode) => mode,
            Err(_) => {
                eprintln!(
                    "Invalid mode of operation: {}. Expected one of: {}.",
                    mode, alternatives(ModeOfOperation::iter(), |m| Into::<&str>::into(m).to_string())
                );
                return Err(());
            }
        }
    };

    let size = get_option_value::<usize>(cmdline::SIZE, &option_values)?.unwrap_or(256);
    if size < 2 {
        eprintln!("Image size must be at least 2.");
        return Err(());
    }

    let scale = get_option_value::<f64>(cmdline::SCALE, &option_values)?.unwrap_or(1.0);
    if !(scale > 0.0) || !scale.is_finite() {
        eprintln!("Invalid pixel size: {}.", scale);
        return Err(());
    }

    let units = get_option_value::<String>(cmdline::UNITS, &option_values)?.unwrap_or_else(|| "nm".to_string());

    let bin_size = get_option_value::<f64>(cmdline::BIN_SIZE, &option_values)?;

    let shifted = match get_option_value::<String>(cmdline::SHIFTED, &option_values)? {
        None => true,
        Some(value) => match value.as_str() {
            "yes" => true,
            "no" => false,
            _ => {
                eprintln!("Invalid value for option {}: {}.", cmdline::SHIFTED, value);
                return Err(());
            }
        }
    };

    let reduction = get_option_value::<Reduction>(cmdline::REDUCTION, &option_values)?;
    if reduction.is_some() && mode != ModeOfOperation::RadialProfile && mode != ModeOfOperation::AngularProfile {
        eprintln!(
            "Unexpected option {} (mode is not {} or {}).",
            cmdline::REDUCTION,
            Into::<&str>::into(ModeOfOperation::RadialProfile),
            Into::<&str>::into(ModeOfOperation::AngularProfile)
        );
        return Err(());
    }
    let reduction = reduction.unwrap_or_default();

    let pad_width = get_mode_option_value::<usize>(
        cmdline::PAD_WIDTH, &option_values, mode, ModeOfOperation::PadRoundTrip
    )?.unwrap_or(32);

    let pad_mode = match get_mode_option_value::<String>(
        cmdline::PAD_MODE, &option_values, mode, ModeOfOperation::PadRoundTrip
    )? {
        None => PadKind::Reflect,
        Some(value) => match PadKind::iter().find(|k| k.to_string() == value) {
            Some(kind) => kind,
            None => {
                eprintln!("Invalid value for option {}: {}.", cmdline::PAD_MODE, value);
                return Err(());
            }
        }
    };

    let sigma = get_mode_option_value::<f64>(
        cmdline::SIGMA, &option_values, mode, ModeOfOperation::LowPass
    )?.unwrap_or(0.1);

    let noise = get_option_value::<f64>(cmdline::NOISE, &option_values)?.unwrap_or(0.1);
    if !(noise >= 0.0) {
        eprintln!("Invalid noise level: {}.", noise);
        return Err(());
    }

    let seed = get_option_value::<u64>(cmdline::SEED, &option_values)?.unwrap_or(0);

    let log_level = get_option_value::<logging::Level>(cmdline::LOG_LEVEL, &option_values)?
        .unwrap_or(logging::Level::Info);

    Ok(Some(Configuration{
        mode,
        size,
        scale,
        units,
        bin_size,
        shifted,
        reduction,
        pad_width,
        pad_mode,
        sigma,
        noise,
        seed,
        log_level
    }))
}
