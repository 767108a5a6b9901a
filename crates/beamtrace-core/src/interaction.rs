//! Per-kind ray/component interaction laws.
//!
//! [`interact`] is a single closed match over [`KindProperties`]: what
//! happens when a ray strikes a component is decided here and nowhere
//! else, so adding a component kind is an exhaustive-match compile error
//! in this module rather than a silent fallthrough somewhere downstream.

use beamtrace_geometry::transform::rotate;

use crate::graph::Element;
use crate::optics;
use crate::types::{EngineConfig, KindProperties, Point};

/// A ray arriving at a component's input port.
#[derive(Debug, Clone)]
pub struct Incoming {
    /// Unit propagation direction, world space.
    pub direction: [f64; 2],
    /// World position of the struck input port.
    pub entry_point: Point,
    pub wavelength_nm: f64,
    pub intensity: f64,
}

/// One continuation ray leaving an interaction.
#[derive(Debug, Clone)]
pub struct OutgoingRaySpec {
    pub exit_port: &'static str,
    /// Unit direction, world space.
    pub direction: [f64; 2],
    /// Multiplicative attenuation applied to the incoming intensity.
    pub intensity_factor: f64,
    pub wavelength_nm: f64,
    /// Interaction log entry carried onto the continuation ray.
    pub note: String,
}

/// Result of a ray striking a component.
#[derive(Debug)]
pub enum InteractionOutcome {
    /// Zero or more continuation rays through output ports.
    Continue(Vec<OutgoingRaySpec>),
    /// Terminal absorption; `reading` is the detector contribution.
    Absorb { reading: f64, note: String },
    /// Numeric degeneracy; the ray cannot continue.
    Degenerate { detail: String },
}

/// Initial emission from a source component (before any interaction).
#[derive(Debug, Clone)]
pub struct SeedSpec {
    /// Unit direction, world space.
    pub direction: [f64; 2],
    pub intensity: f64,
    pub wavelength_nm: f64,
}

/// Rays a source emits: the primary beam plus a small symmetric cone of
/// two secondary rays around it.
///
/// The sweep orchestrator overrides the configured wavelength via
/// `wavelength_override`. Sources with a zero cone half-angle emit the
/// primary beam only.
pub fn emission_specs(
    source: &Element,
    wavelength_override: Option<f64>,
    config: &EngineConfig,
) -> Vec<SeedSpec> {
    let KindProperties::Source { wavelength_nm, power, beam_half_angle_deg } = source.props
    else {
        return Vec::new();
    };
    let wavelength = wavelength_override.unwrap_or(wavelength_nm);
    let primary = source.placement.world_direction([1.0, 0.0]);
    let half_angle = beam_half_angle_deg
        .unwrap_or(config.default_beam_half_angle_deg)
        .to_radians();

    let mut specs = vec![SeedSpec { direction: primary, intensity: power, wavelength_nm: wavelength }];
    if half_angle > 0.0 {
        for sign in [-1.0, 1.0] {
            specs.push(SeedSpec {
                direction: rotate(primary, sign * half_angle),
                intensity: power * config.secondary_ray_weight,
                wavelength_nm: wavelength,
            });
        }
    }
    specs
}

/// Apply a component's interaction law to an incoming ray.
///
/// Intensity factors are multiplicative and the summed output intensity
/// never exceeds the incoming intensity.
pub fn interact(element: &Element, incoming: &Incoming, config: &EngineConfig) -> InteractionOutcome {
    match element.props {
        // Sources expose no input ports, so a validated graph can never
        // route a ray here.
        KindProperties::Source { .. } => InteractionOutcome::Continue(Vec::new()),

        KindProperties::Mirror { reflectivity, radius_of_curvature } => {
            let normal = element.placement.world_direction([-1.0, 0.0]);
            let cos_theta = (incoming.direction[0] * normal[0]
                + incoming.direction[1] * normal[1])
                .abs();
            let mut direction = optics::reflect(incoming.direction, normal);
            if radius_of_curvature != 0.0 {
                direction = rotate(direction, config.curvature_gain / radius_of_curvature);
            }
            InteractionOutcome::Continue(vec![OutgoingRaySpec {
                exit_port: "out",
                direction,
                intensity_factor: optics::mirror_attenuation(cos_theta, reflectivity),
                wavelength_nm: incoming.wavelength_nm,
                note: format!("mirror reflection at component {}", element.id),
            }])
        }

        KindProperties::Beamsplitter { reflectivity, transmissivity } => {
            let sum = reflectivity + transmissivity;
            let scale = if config.renormalise_splitters && sum > 1.0 { 1.0 / sum } else { 1.0 };
            let normal = element.placement.world_direction([-1.0, 0.0]);
            InteractionOutcome::Continue(vec![
                OutgoingRaySpec {
                    exit_port: "reflect",
                    direction: optics::reflect(incoming.direction, normal),
                    intensity_factor: reflectivity * scale,
                    wavelength_nm: incoming.wavelength_nm,
                    note: format!("beamsplitter reflection at component {}", element.id),
                },
                OutgoingRaySpec {
                    exit_port: "transmit",
                    direction: incoming.direction,
                    intensity_factor: transmissivity * scale,
                    wavelength_nm: incoming.wavelength_nm,
                    note: format!("beamsplitter transmission at component {}", element.id),
                },
            ])
        }

        KindProperties::Lens { focal_length } => {
            let axis = element.placement.world_direction([1.0, 0.0]);
            let tangent = element.placement.world_direction([0.0, 1.0]);
            let Some(axis_distance) = optics::plane_axis_distance(
                incoming.entry_point.to_array(),
                incoming.direction,
                element.position.to_array(),
                axis,
                tangent,
            ) else {
                return InteractionOutcome::Degenerate {
                    detail: format!(
                        "ray parallel to the plane of lens {}; cannot refract",
                        element.id
                    ),
                };
            };
            let deflection = optics::thin_lens_deflection(axis_distance, focal_length);
            InteractionOutcome::Continue(vec![OutgoingRaySpec {
                exit_port: "out",
                direction: rotate(incoming.direction, deflection),
                intensity_factor: config.lens_transmission,
                wavelength_nm: incoming.wavelength_nm,
                note: format!("lens refraction at component {}", element.id),
            }])
        }

        KindProperties::Detector { sensitivity } => InteractionOutcome::Absorb {
            reading: incoming.intensity * sensitivity,
            note: format!("detector absorption at component {}", element.id),
        },
    }
}
