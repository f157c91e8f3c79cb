//
// holotool - Radial integration, padding and Fourier ring correlation for inline holography
// Copyright (c) 2020 Filip Szczerek <ga.software@yahoo.com>
//
// This project is licensed under the terms of the MIT license
// (see the LICENSE file for details).
//

//!
//! Entry point and main functions of the `holotool` executable.
//!

mod args;
mod logging;
mod utils;

use args::{Configuration, ModeOfOperation};
use holotool::{
    fourier_ring_correlation,
    gaussian_low_pass,
    BinSpec,
    CoordinateGrid,
    Fill,
    Image,
    PadKind,
    PadMode,
    PadSpec,
    PadWidths,
    Validation
};
use logging::Logger;
use rand::{rngs::StdRng, SeedableRng};

const VERSION_STRING: &str = include_str!(concat!(env!("OUT_DIR"), "/version"));

fn print_header() {
    println!(r#"
_________________

   {}
   Radial integration, padding and Fourier ring correlation for inline holography

   Copyright © 2020 Filip Szczerek <ga.software@yahoo.com>

   This program is licensed under MIT license (see LICENSE.txt for details).

_________________
"#,
        VERSION_STRING
    );
}

fn bins(config: &Configuration) -> BinSpec {
    match config.bin_size() {
        Some(width) => BinSpec::Width(width),
        None => BinSpec::Auto
    }
}

fn test_image(config: &Configuration) -> Image<f64> {
    utils::synthetic_hologram(config.size(), config.scale(), config.units())
}

fn mode_radial_profile(config: &Configuration) -> holotool::Result<()> {
    let image = test_image(config);
    let (profile, warnings) = image.integrate_radial(&bins(config), config.shifted(), config.reduction())?;
    log::info!("{} radius bins, {} calibration warning(s)", profile.axis(0).size(), warnings.len());
    utils::print_profile(&profile, "Radial profile");

    Ok(())
}

fn mode_angular_profile(config: &Configuration) -> holotool::Result<()> {
    let mut rng = StdRng::seed_from_u64(config.seed());
    let image = utils::add_noise(&test_image(config), config.noise(), &mut rng)?;
    let (profile, warnings) = image.integrate_angular(&bins(config), config.shifted(), config.reduction())?;
    log::info!("{} angle bins, {} calibration warning(s)", profile.axis(0).size(), warnings.len());
    utils::print_profile(&profile, "Angular profile");

    Ok(())
}

fn mode_pad_round_trip(config: &Configuration) -> holotool::Result<()> {
    let mut rng = StdRng::seed_from_u64(config.seed());
    let image = utils::add_noise(&test_image(config), config.noise(), &mut rng)?;

    let width = config.pad_width();
    let mode = match config.pad_mode() {
        PadKind::Constant => PadMode::Constant(Fill::Scalar(0.0)),
        PadKind::Reflect => PadMode::Reflect,
        PadKind::Symmetric => PadMode::Symmetric,
        PadKind::Edge => PadMode::Edge,
        PadKind::Wrap => PadMode::Wrap
    };
    let spec = PadSpec::new(PadWidths::signal(image.rank(), (width, width), (width, width)), mode);

    let padded = image.pad(&spec)?;
    let restored = padded.remove_pad()?;

    println!();
    for (name, img) in &[("original", &image), ("padded", &padded), ("restored", &restored)] {
        let (row_axis, col_axis) = img.signal_axes()?;
        println!(
            "{:>8}: {:?}, offsets ({}, {}), scales ({}, {})",
            name, img.shape(), row_axis.offset(), col_axis.offset(), row_axis.scale(), col_axis.scale()
        );
    }

    let identical = restored.axes() == image.axes() && restored.pixels() == image.pixels();
    println!("\nround trip ({} mode) exact: {}", config.pad_mode(), if identical { "yes" } else { "no" });

    Ok(())
}

fn mode_low_pass(config: &Configuration) -> holotool::Result<()> {
    let clean = test_image(config);
    let mut rng = StdRng::seed_from_u64(config.seed());
    let noisy = utils::add_noise(&clean, config.noise(), &mut rng)?;

    // pad to reduce the wrap-around artifacts of the FFT
    let width = config.size() / 8;
    let padded = noisy.pad(&PadSpec::new(PadWidths::signal(2, (width, width), (width, width)), PadMode::Reflect))?;

    let spectrum = padded.fft(true)?;
    let (row_axis, col_axis) = spectrum.signal_axes()?;
    let kernel = gaussian_low_pass(&CoordinateGrid::new(row_axis, col_axis, false)?, config.sigma())?;
    let filtered = spectrum.apply_kernel(&kernel)?.ifft(true)?.real().remove_pad()?;

    println!(
        "\nRMS error vs. noiseless image: {:.6} (noisy), {:.6} (filtered, sigma = {} {})",
        utils::rms_difference(&noisy, &clean),
        utils::rms_difference(&filtered, &clean),
        config.sigma(),
        row_axis.units().unwrap_or("")
    );

    Ok(())
}

fn mode_ring_correlation(config: &Configuration) -> holotool::Result<()> {
    let clean = test_image(config);
    let mut rng = StdRng::seed_from_u64(config.seed());
    let noisy_1 = utils::add_noise(&clean, config.noise(), &mut rng)?;
    let noisy_2 = utils::add_noise(&clean, config.noise(), &mut rng)?;

    let bins = match config.bin_size() {
        Some(width) => BinSpec::Width(width),
        None => BinSpec::Count(config.size() / 4)
    };
    let frc = fourier_ring_correlation(&noisy_1, &noisy_2, &bins)?;
    utils::print_profile(&frc, "Fourier ring correlation");

    let validation = Validation::new(&noisy_1, &clean, true)?;
    let (chi2_mean, _) = utils::mean_and_std_dev(validation.chi2().pixels());
    println!("\nr-value: {:.6}, mean chi^2: {:.6}", validation.rvalue()?, chi2_mean);

    Ok(())
}

fn run_program() -> bool {
    print_header();
    println!();

    let config = match args::parse_command_line(std::env::args()) {
        Ok(config) => match config {
            None => return true, // help was requested
            Some(config) => config
        },
        Err(_) => { println!("\nUse --{} for more information.\n", args::cmdline::HELP); return false; }
    };

    if let Err(e) = Logger::init(config.log_level()) {
        eprintln!("Failed to initialize logging: {}.", e);
    }

    let tstart = std::time::Instant::now();

    let result = match config.mode() {
        ModeOfOperation::RadialProfile => mode_radial_profile(&config),

        ModeOfOperation::AngularProfile => mode_angular_profile(&config),

        ModeOfOperation::PadRoundTrip => mode_pad_round_trip(&config),

        ModeOfOperation::LowPass => mode_low_pass(&config),

        ModeOfOperation::RingCorrelation => mode_ring_correlation(&config)
    };

    if let Err(e) = result {
        log::error!("{}", e);
        return false;
    }

    let elapsed = tstart.elapsed();
    let mins = elapsed.as_secs() / 60;
    let secs = elapsed.as_secs() % 60;
    let frac_secs = elapsed.as_secs_f32() - (mins * 60) as f32 - secs as f32;
    log::info!("\nCompleted in {} min {:02}.{:0.0} s.", mins, secs, frac_secs * 10.0);

    true
}

fn main() {
    std::process::exit(if run_program() { 0 } else { 1 });
}
