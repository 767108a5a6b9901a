//! Core types shared across the beamtrace engine.
//!
//! This module defines the fundamental data structures used throughout the
//! simulation pipeline: components and their kinds, ports, rays, sweep
//! samples, and result containers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a component in the setup document.
pub type ComponentId = u32;

/// A point on the canvas plane (canvas units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn from_array(a: [f64; 2]) -> Self {
        Self { x: a[0], y: a[1] }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// The closed set of optical component kinds.
///
/// Interaction behaviour dispatches on this enum with exhaustive matches,
/// so adding a kind is a compile error everywhere it matters rather than a
/// silent fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Source,
    Mirror,
    Beamsplitter,
    Lens,
    Detector,
}

impl ComponentKind {
    /// Lowercase label matching the wire format.
    pub fn label(self) -> &'static str {
        match self {
            ComponentKind::Source => "source",
            ComponentKind::Mirror => "mirror",
            ComponentKind::Beamsplitter => "beamsplitter",
            ComponentKind::Lens => "lens",
            ComponentKind::Detector => "detector",
        }
    }
}

/// Directional role of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    Input,
    Output,
}

/// A named attachment point in a component's local frame.
///
/// Port sets are fixed per kind (see [`crate::graph::port_schema`]); they
/// are never stored per instance.
#[derive(Debug, Clone, Copy)]
pub struct PortSpec {
    pub id: &'static str,
    pub role: PortRole,
    /// Local offset from the component position, before rotation.
    pub offset: [f64; 2],
}

/// Kind-specific physical properties, extracted and range-checked by the
/// validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KindProperties {
    Source {
        wavelength_nm: f64,
        power: f64,
        /// Half-angle of the emission cone in degrees. Zero disables the
        /// secondary rays; `None` defers to the engine default.
        beam_half_angle_deg: Option<f64>,
    },
    Mirror {
        reflectivity: f64,
        /// Zero denotes a flat mirror. The sign selects converging vs
        /// diverging curvature.
        radius_of_curvature: f64,
    },
    Beamsplitter {
        reflectivity: f64,
        transmissivity: f64,
    },
    Lens {
        focal_length: f64,
    },
    Detector {
        sensitivity: f64,
    },
}

impl KindProperties {
    pub fn kind(&self) -> ComponentKind {
        match self {
            KindProperties::Source { .. } => ComponentKind::Source,
            KindProperties::Mirror { .. } => ComponentKind::Mirror,
            KindProperties::Beamsplitter { .. } => ComponentKind::Beamsplitter,
            KindProperties::Lens { .. } => ComponentKind::Lens,
            KindProperties::Detector { .. } => ComponentKind::Detector,
        }
    }
}

/// Why a ray stopped propagating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TerminationReason {
    /// Bounce cap reached; guards cycles in the connection graph.
    MaxBounces,
    /// Intensity fell below the tracing epsilon.
    Attenuated,
    /// Absorbed by a detector.
    Absorbed,
    /// Left an output port with no outgoing connection.
    OpenEnd,
    /// Numeric degeneracy (zero-length direction, non-finite geometry).
    Degenerate,
}

/// A single traced light ray.
///
/// Rays are created, extended, and terminated entirely within one trace
/// invocation; they are never shared or mutated across traces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ray {
    pub origin_component_id: ComponentId,
    pub wavelength_nm: f64,
    /// Current intensity on the source-power scale; non-increasing along
    /// the ray's lineage.
    pub intensity: f64,
    pub path: Vec<Point>,
    pub bounce_count: u32,
    pub terminated: bool,
    pub termination_reason: Option<TerminationReason>,
    /// Human-readable interaction log, e.g. "mirror reflection at component 3".
    pub interactions: Vec<String>,
}

/// Detector readings at a single sampled wavelength.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSample {
    pub wavelength_nm: f64,
    /// Optical frequency corresponding to the wavelength (THz).
    pub frequency_thz: f64,
    /// Accumulated intensity per detector component id.
    pub per_detector_intensity: BTreeMap<ComponentId, f64>,
    /// Sum over all detectors at this wavelength.
    pub total_intensity: f64,
}

/// Component tally per kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComponentCount {
    pub sources: usize,
    pub mirrors: usize,
    pub beamsplitters: usize,
    pub lenses: usize,
    pub detectors: usize,
}

/// Aggregate statistics over one trace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_rays: usize,
    pub total_path_length: f64,
    /// Mean final intensity over absorbed rays; 0 when nothing reached a
    /// detector.
    pub average_intensity: f64,
    pub total_interactions: u64,
    pub component_count: ComponentCount,
}

/// Complete results from a simulation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub success: bool,
    pub timestamp: String,
    pub rays: Vec<Ray>,
    pub frequency_sweep: Vec<SweepSample>,
    pub statistics: Statistics,
    pub warnings: Vec<String>,
}

/// Tunable engine parameters.
///
/// Everything the tracer treats as a "documented default" lives here so
/// callers can adjust policy without patching constants.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum bounce count before a ray is cut off.
    pub max_bounces: u32,
    /// Intensity below which a ray is considered fully attenuated.
    pub intensity_epsilon: f64,
    /// Cone half-angle used when a source omits the `beamAngle` property.
    pub default_beam_half_angle_deg: f64,
    /// Intensity of each secondary cone ray relative to the primary.
    pub secondary_ray_weight: f64,
    /// Curvature perturbation: the reflected direction is rotated by
    /// `curvature_gain / radius_of_curvature` radians.
    pub curvature_gain: f64,
    /// Fixed transmission factor through a lens.
    pub lens_transmission: f64,
    /// Rescale beam-splitter factors proportionally when their sum
    /// exceeds one.
    pub renormalise_splitters: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_bounces: 50,
            intensity_epsilon: 1e-4,
            default_beam_half_angle_deg: 3.0,
            secondary_ray_weight: 0.5,
            curvature_gain: 1.0,
            lens_transmission: 0.98,
            renormalise_splitters: true,
        }
    }
}
