//! Ray propagation over the validated graph.
//!
//! Propagation is breadth-first over an explicit FIFO work queue rather
//! than recursive, so memory is bounded by the bounce cap instead of call
//! depth and path accumulation stays deterministic. Each queued entry is a
//! ray waiting at an output port; dequeuing fans it out along every
//! connection departing that port.

use std::collections::{BTreeMap, VecDeque};

use beamtrace_geometry::path::unit;
use log::{debug, warn};

use crate::graph::{find_port, Graph};
use crate::interaction::{emission_specs, interact, Incoming, InteractionOutcome};
use crate::types::{ComponentId, EngineConfig, Ray, TerminationReason};

/// Everything one trace invocation produces.
#[derive(Debug, Default)]
pub struct TraceOutcome {
    /// All rays, each terminated with a recorded reason.
    pub rays: Vec<Ray>,
    /// Accumulated intensity per detector component id.
    pub detector_readings: BTreeMap<ComponentId, f64>,
    /// Anomalies recovered mid-trace (degenerate rays). Never aborts the
    /// trace.
    pub warnings: Vec<String>,
}

/// A ray waiting at an output port.
struct Pending {
    ray: Ray,
    component: ComponentId,
    port: &'static str,
    /// Unit propagation direction carried from the last interaction.
    direction: [f64; 2],
}

/// Trace every source's emissions through the graph until all rays
/// terminate.
///
/// `wavelength_override` replaces each source's configured wavelength;
/// the sweep orchestrator uses it to sample the spectrum.
pub fn trace(graph: &Graph, wavelength_override: Option<f64>, config: &EngineConfig) -> TraceOutcome {
    let mut outcome = TraceOutcome::default();
    let mut queue: VecDeque<Pending> = VecDeque::new();

    for source in graph.sources() {
        let Some(out_port) = find_port(source.kind, "out") else {
            continue;
        };
        let port_position = source.port_position(out_port);
        for seed in emission_specs(source, wavelength_override, config) {
            let ray = Ray {
                origin_component_id: source.id,
                wavelength_nm: seed.wavelength_nm,
                intensity: seed.intensity,
                path: vec![source.position, port_position],
                bounce_count: 0,
                terminated: false,
                termination_reason: None,
                interactions: Vec::new(),
            };
            match unit(seed.direction) {
                Some(direction) => queue.push_back(Pending {
                    ray,
                    component: source.id,
                    port: out_port.id,
                    direction,
                }),
                None => {
                    let detail =
                        format!("source {} emitted a degenerate direction", source.id);
                    warn!("{detail}");
                    outcome.warnings.push(detail);
                    outcome.rays.push(finish(ray, TerminationReason::Degenerate));
                }
            }
        }
    }

    debug!(
        "seeded {} ray(s) from {} source(s)",
        queue.len(),
        graph.sources().count()
    );

    while let Some(pending) = queue.pop_front() {
        let connections: Vec<_> = graph.outgoing(pending.component, pending.port).collect();
        if connections.is_empty() {
            // Nothing downstream of this output port.
            outcome.rays.push(finish(pending.ray, TerminationReason::OpenEnd));
            continue;
        }

        for connection in connections {
            let mut ray = pending.ray.clone();
            let destination = &graph.elements()[connection.to_index];
            let entry_point = destination.port_position(connection.to_port);

            if !entry_point.is_finite() {
                let detail = format!(
                    "connection {}: input port position on component {} is not finite",
                    connection.id, destination.id
                );
                warn!("{detail}");
                outcome.warnings.push(detail);
                outcome.rays.push(finish(ray, TerminationReason::Degenerate));
                continue;
            }

            ray.path.push(entry_point);
            if ray.bounce_count >= config.max_bounces {
                outcome.rays.push(finish(ray, TerminationReason::MaxBounces));
                continue;
            }
            ray.bounce_count += 1;

            let incoming = Incoming {
                direction: pending.direction,
                entry_point,
                wavelength_nm: ray.wavelength_nm,
                intensity: ray.intensity,
            };
            match interact(destination, &incoming, config) {
                InteractionOutcome::Continue(specs) if specs.is_empty() => {
                    outcome.rays.push(finish(ray, TerminationReason::OpenEnd));
                }
                InteractionOutcome::Continue(specs) => {
                    for spec in specs {
                        let Some(exit_port) = find_port(destination.kind, spec.exit_port)
                        else {
                            // schema and interaction law disagree; unreachable
                            // on a validated graph
                            continue;
                        };
                        let mut branch = ray.clone();
                        branch.intensity *= spec.intensity_factor;
                        branch.wavelength_nm = spec.wavelength_nm;
                        branch.interactions.push(spec.note);
                        branch.path.push(destination.port_position(exit_port));

                        if branch.intensity < config.intensity_epsilon {
                            outcome
                                .rays
                                .push(finish(branch, TerminationReason::Attenuated));
                            continue;
                        }
                        match unit(spec.direction) {
                            Some(direction) => queue.push_back(Pending {
                                ray: branch,
                                component: destination.id,
                                port: exit_port.id,
                                direction,
                            }),
                            None => {
                                let detail = format!(
                                    "component {} produced a degenerate outgoing direction",
                                    destination.id
                                );
                                warn!("{detail}");
                                outcome.warnings.push(detail);
                                outcome
                                    .rays
                                    .push(finish(branch, TerminationReason::Degenerate));
                            }
                        }
                    }
                }
                InteractionOutcome::Absorb { reading, note } => {
                    ray.interactions.push(note);
                    *outcome.detector_readings.entry(destination.id).or_insert(0.0) += reading;
                    outcome.rays.push(finish(ray, TerminationReason::Absorbed));
                }
                InteractionOutcome::Degenerate { detail } => {
                    warn!("{detail}");
                    outcome.warnings.push(detail);
                    outcome.rays.push(finish(ray, TerminationReason::Degenerate));
                }
            }
        }
    }

    debug!(
        "trace complete: {} ray(s), {} detector(s) hit, {} warning(s)",
        outcome.rays.len(),
        outcome.detector_readings.len(),
        outcome.warnings.len()
    );
    outcome
}

fn finish(mut ray: Ray, reason: TerminationReason) -> Ray {
    ray.terminated = true;
    ray.termination_reason = Some(reason);
    ray
}
