//! Reduction of traced rays into aggregate statistics.

use beamtrace_geometry::path::polyline_length;

use crate::graph::Graph;
use crate::types::{ComponentCount, ComponentKind, Ray, Statistics, TerminationReason};

/// Fold all rays from one trace into summary statistics.
///
/// `average_intensity` is the mean final intensity over absorbed rays
/// (detector hits) only; when nothing was absorbed it is reported as 0
/// together with a warning rather than dividing by zero.
pub fn aggregate(rays: &[Ray], graph: &Graph) -> (Statistics, Vec<String>) {
    let mut warnings = Vec::new();

    let total_path_length = rays
        .iter()
        .map(|ray| {
            let points: Vec<[f64; 2]> = ray.path.iter().map(|p| p.to_array()).collect();
            polyline_length(&points)
        })
        .sum();

    let absorbed: Vec<&Ray> = rays
        .iter()
        .filter(|r| r.termination_reason == Some(TerminationReason::Absorbed))
        .collect();
    let average_intensity = if absorbed.is_empty() {
        if !rays.is_empty() {
            warnings.push(
                "no rays reached a detector; averageIntensity reported as 0".to_string(),
            );
        }
        0.0
    } else {
        absorbed.iter().map(|r| r.intensity).sum::<f64>() / absorbed.len() as f64
    };

    let mut component_count = ComponentCount::default();
    for element in graph.elements() {
        match element.kind {
            ComponentKind::Source => component_count.sources += 1,
            ComponentKind::Mirror => component_count.mirrors += 1,
            ComponentKind::Beamsplitter => component_count.beamsplitters += 1,
            ComponentKind::Lens => component_count.lenses += 1,
            ComponentKind::Detector => component_count.detectors += 1,
        }
    }

    let statistics = Statistics {
        total_rays: rays.len(),
        total_path_length,
        average_intensity,
        total_interactions: rays.iter().map(|r| u64::from(r.bounce_count)).sum(),
        component_count,
    };
    (statistics, warnings)
}
