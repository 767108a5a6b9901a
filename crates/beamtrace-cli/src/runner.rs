//! Ties the core engine to files on disk: load a setup, simulate, export.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use beamtrace_core::graph::port_schema;
use beamtrace_core::types::{ComponentKind, EngineConfig, PortRole, SimulationResult};
use beamtrace_core::{parse_setup, simulate, validate, OpticalSetup};

fn load_setup(path: &Path) -> Result<OpticalSetup> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading setup file {}", path.display()))?;
    parse_setup(&content).with_context(|| format!("parsing setup file {}", path.display()))
}

/// Run a full simulation and write the result documents.
pub fn run_simulate(setup_path: &Path, output: Option<&Path>) -> Result<()> {
    println!("Beamtrace Optical Simulator");
    println!("===========================");
    let setup = load_setup(setup_path)?;
    println!("Setup: {}", setup_path.display());

    let result = simulate(&setup, &EngineConfig::default())
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!(
        "Traced {} ray(s), {} interaction(s), total path {:.1}",
        result.statistics.total_rays,
        result.statistics.total_interactions,
        result.statistics.total_path_length,
    );
    println!(
        "Sweep: {} sample(s), average absorbed intensity {:.4}",
        result.frequency_sweep.len(),
        result.statistics.average_intensity,
    );
    for warning in &result.warnings {
        eprintln!("Warning: {warning}");
    }

    let out_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("./output"));

    write_result_json(&result, &out_dir.join("result.json"))?;
    write_sweep_csv(&result, &out_dir.join("sweep.csv"))?;

    println!("Simulation complete.");
    Ok(())
}

/// Validate a setup file and report every issue.
pub fn run_validate(setup_path: &Path) -> Result<()> {
    let setup = load_setup(setup_path)?;
    let report = validate(&setup);

    for issue in &report.issues {
        println!("Issue: {issue}");
    }
    for recommendation in &report.recommendations {
        println!("Recommendation: {recommendation}");
    }

    if report.ok {
        println!("Setup is valid: {}", setup_path.display());
        Ok(())
    } else {
        anyhow::bail!(
            "setup is invalid: {} issue(s) found",
            report.issues.len()
        )
    }
}

/// Write the full result document as pretty-printed JSON.
pub fn write_result_json(result: &SimulationResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {e}"))?;
    std::fs::write(path, json)?;
    println!("Result written to: {}", path.display());
    Ok(())
}

/// Write the frequency sweep to a CSV file with a metadata header.
pub fn write_sweep_csv(result: &SimulationResult, path: &Path) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;

    writeln!(file, "# Beamtrace — Spectral Sweep")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# Samples: {}", result.frequency_sweep.len())?;
    writeln!(file, "#")?;

    // Stable detector column set across all samples.
    let detectors: BTreeSet<_> = result
        .frequency_sweep
        .iter()
        .flat_map(|s| s.per_detector_intensity.keys().copied())
        .collect();

    let mut header = String::from("wavelength_nm,frequency_thz");
    for id in &detectors {
        header.push_str(&format!(",detector_{id}"));
    }
    header.push_str(",total");
    writeln!(file, "{header}")?;

    for sample in &result.frequency_sweep {
        let mut line = format!("{:.2},{:.4}", sample.wavelength_nm, sample.frequency_thz);
        for id in &detectors {
            let reading = sample.per_detector_intensity.get(id).copied().unwrap_or(0.0);
            line.push_str(&format!(",{reading:.6e}"));
        }
        line.push_str(&format!(",{:.6e}", sample.total_intensity));
        writeln!(file, "{line}")?;
    }

    println!("Sweep written to: {}", path.display());
    Ok(())
}

/// Print the supported component kinds, required properties, and ports.
pub fn print_kinds() {
    let required: [(ComponentKind, &str); 5] = [
        (ComponentKind::Source, "wavelengthNm, power (optional beamAngle)"),
        (ComponentKind::Mirror, "reflectivity, radiusOfCurvature"),
        (ComponentKind::Beamsplitter, "reflectivity, transmissivity"),
        (ComponentKind::Lens, "focalLength"),
        (ComponentKind::Detector, "sensitivity"),
    ];

    println!("Supported component kinds:");
    println!();
    for (kind, properties) in required {
        println!("  {}", kind.label());
        println!("    properties: {properties}");
        for port in port_schema(kind) {
            let role = match port.role {
                PortRole::Input => "input",
                PortRole::Output => "output",
            };
            println!(
                "    port '{}' ({role}) at ({}, {})",
                port.id, port.offset[0], port.offset[1]
            );
        }
        println!();
    }
}
