//! Boundary operations exposed to external collaborators.
//!
//! The editor UI (or any HTTP layer wrapped around it) calls exactly two
//! operations: [`validate`] to report structural problems without tracing,
//! and [`simulate`] to run the full pipeline — validation, a trace at the
//! sources' native wavelengths, the spectral sweep, and aggregation into
//! the result document.

use log::info;

use crate::document::OpticalSetup;
use crate::graph::{Graph, ValidationError, ValidationReport};
use crate::stats::aggregate;
use crate::sweep::sweep;
use crate::tracer::trace;
use crate::types::{EngineConfig, SimulationResult};

/// Check a setup document without tracing.
///
/// Never fails: structural problems land in `issues`, non-fatal advice in
/// `recommendations`.
pub fn validate(setup: &OpticalSetup) -> ValidationReport {
    match Graph::build(setup) {
        Ok(graph) => ValidationReport {
            ok: true,
            issues: Vec::new(),
            recommendations: graph.advisories().to_vec(),
        },
        Err(error) => ValidationReport {
            ok: false,
            issues: error.issues,
            recommendations: Vec::new(),
        },
    }
}

/// Run the full simulation pipeline over a setup document.
///
/// Rejects invalid setups before any tracing. An empty graph (no
/// components, or no sources) produces a successful empty result with a
/// warning rather than an error. `rays` and `statistics` reflect the
/// native-wavelength trace; `frequency_sweep` carries the spectral
/// response.
pub fn simulate(
    setup: &OpticalSetup,
    config: &EngineConfig,
) -> Result<SimulationResult, ValidationError> {
    let graph = Graph::build(setup)?;
    let mut warnings = graph.advisories().to_vec();

    info!(
        "simulating {} component(s), {} connection(s)",
        graph.elements().len(),
        setup.connections.len()
    );

    let native = trace(&graph, None, config);
    warnings.extend(native.warnings.iter().cloned());

    let frequency_sweep = sweep(&graph, config);

    let (statistics, stat_warnings) = aggregate(&native.rays, &graph);
    warnings.extend(stat_warnings);

    Ok(SimulationResult {
        success: true,
        timestamp: chrono::Utc::now().to_rfc3339(),
        rays: native.rays,
        frequency_sweep,
        statistics,
        warnings,
    })
}
