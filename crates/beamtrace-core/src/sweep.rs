//! Spectral sweep orchestration.
//!
//! A sweep repeats the full trace across a range of wavelengths, each
//! sample overriding every source's configured wavelength. Samples share
//! no mutable state, so they are dispatched across the Rayon thread pool
//! and collected back in sample order.

use log::debug;
use rayon::prelude::*;

use crate::document::SweepConfig;
use crate::graph::Graph;
use crate::optics::wavelength_to_frequency_thz;
use crate::tracer::trace;
use crate::types::{EngineConfig, SweepSample};

/// Wavelengths sampled for a sweep configuration.
///
/// Two or more points are spaced linearly over `[start, stop]` inclusive
/// of both ends; a single point samples the midpoint.
pub fn sample_wavelengths(config: &SweepConfig) -> Vec<f64> {
    match config.points {
        0 => Vec::new(),
        1 => vec![0.5 * (config.start_nm + config.stop_nm)],
        n => {
            let span = config.stop_nm - config.start_nm;
            (0..n)
                .map(|i| config.start_nm + span * i as f64 / (n - 1) as f64)
                .collect()
        }
    }
}

/// Run one independent trace per sampled wavelength and collect the
/// detector readings.
pub fn sweep(graph: &Graph, config: &EngineConfig) -> Vec<SweepSample> {
    let wavelengths = sample_wavelengths(graph.sweep_config());
    debug!("sweeping {} wavelength sample(s)", wavelengths.len());

    wavelengths
        .into_par_iter()
        .map(|wavelength_nm| {
            let outcome = trace(graph, Some(wavelength_nm), config);
            let total_intensity = outcome.detector_readings.values().sum();
            SweepSample {
                wavelength_nm,
                frequency_thz: wavelength_to_frequency_thz(wavelength_nm),
                per_detector_intensity: outcome.detector_readings,
                total_intensity,
            }
        })
        .collect()
}
