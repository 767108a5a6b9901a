//! End-to-end scenarios over JSON setup documents.

use approx::assert_relative_eq;
use beamtrace_core::types::TerminationReason;
use beamtrace_core::{parse_setup, simulate, validate, EngineConfig, OpticalSetup};

fn setup(json: &str) -> OpticalSetup {
    parse_setup(json).expect("fixture must parse")
}

/// Unpolarised Fresnel reflectance of an air/glass interface, written out
/// independently of the engine so expected values are not self-referential.
fn fresnel_air_glass(cos_i: f64) -> f64 {
    let (n1, n2) = (1.0, 1.5);
    let sin_t = n1 / n2 * (1.0 - cos_i * cos_i).sqrt();
    let cos_t = (1.0 - sin_t * sin_t).sqrt();
    let rs = ((n1 * cos_i - n2 * cos_t) / (n1 * cos_i + n2 * cos_t)).powi(2);
    let rp = ((n1 * cos_t - n2 * cos_i) / (n1 * cos_t + n2 * cos_i)).powi(2);
    0.5 * (rs + rp)
}

/// Expected attenuation of a coated mirror: reflectivity times the
/// double-pass overcoat transmittance at the given incidence cosine.
fn mirror_factor(reflectivity: f64, cos_i: f64) -> f64 {
    let t = 1.0 - fresnel_air_glass(cos_i);
    reflectivity * t * t
}

/// cos 45° — both fixture mirrors sit at 45° to the beam.
const COS_45: f64 = std::f64::consts::FRAC_1_SQRT_2;

#[test]
fn lone_source_terminates_open_end() {
    let doc = r#"{
        "components": [
            {"id": 1, "type": "source", "position": {"x": 100, "y": 300},
             "properties": {"wavelengthNm": 550, "power": 1.0, "beamAngle": 0}}
        ],
        "simulation": {"sweepConfig": {"startFreq": 500, "stopFreq": 600, "points": 3}}
    }"#;
    let result = simulate(&setup(doc), &EngineConfig::default()).unwrap();

    assert!(result.success);
    assert_eq!(result.rays.len(), 1);
    let ray = &result.rays[0];
    assert!(ray.terminated);
    assert_eq!(ray.termination_reason, Some(TerminationReason::OpenEnd));
    assert_eq!(ray.wavelength_nm, 550.0);
    // No detectors anywhere: every sweep sample is empty.
    assert!(result
        .frequency_sweep
        .iter()
        .all(|s| s.per_detector_intensity.is_empty()));
}

#[test]
fn default_cone_emits_three_rays() {
    let doc = r#"{
        "components": [
            {"id": 1, "type": "source", "position": {"x": 0, "y": 0},
             "properties": {"wavelengthNm": 550, "power": 1.0}}
        ],
        "simulation": {"sweepConfig": {"startFreq": 500, "stopFreq": 600, "points": 1}}
    }"#;
    let result = simulate(&setup(doc), &EngineConfig::default()).unwrap();
    assert_eq!(result.rays.len(), 3);
    assert!(result
        .rays
        .iter()
        .all(|r| r.termination_reason == Some(TerminationReason::OpenEnd)));
}

const MIRROR_CHAIN: &str = r#"{
    "components": [
        {"id": 1, "type": "source", "position": {"x": 100, "y": 300},
         "properties": {"wavelengthNm": 550, "power": 1.0, "beamAngle": 0}},
        {"id": 2, "type": "mirror", "position": {"x": 300, "y": 300}, "rotation": -45,
         "properties": {"reflectivity": 0.9, "radiusOfCurvature": 0}},
        {"id": 3, "type": "detector", "position": {"x": 300, "y": 450}, "rotation": 90,
         "properties": {"sensitivity": 1.0}}
    ],
    "connections": [
        {"id": 1, "from": {"componentId": 1, "port": "out"}, "to": {"componentId": 2, "port": "in"}},
        {"id": 2, "from": {"componentId": 2, "port": "out"}, "to": {"componentId": 3, "port": "in"}}
    ],
    "simulation": {"sweepConfig": {"startFreq": 500, "stopFreq": 600, "points": 5}}
}"#;

#[test]
fn mirror_chain_reaches_the_detector() {
    let result = simulate(&setup(MIRROR_CHAIN), &EngineConfig::default()).unwrap();

    assert_eq!(result.rays.len(), 1);
    let ray = &result.rays[0];
    assert_eq!(ray.termination_reason, Some(TerminationReason::Absorbed));
    assert_relative_eq!(ray.intensity, mirror_factor(0.9, COS_45), epsilon = 1e-9);
    assert!(ray
        .interactions
        .iter()
        .any(|note| note.contains("mirror reflection")));

    // The detector shows up in every sweep sample with the same reading
    // (the interaction model is wavelength-independent).
    assert_eq!(result.frequency_sweep.len(), 5);
    for sample in &result.frequency_sweep {
        let reading = sample.per_detector_intensity.get(&3).copied().unwrap_or(0.0);
        assert_relative_eq!(reading, mirror_factor(0.9, COS_45), epsilon = 1e-9);
    }

    assert_eq!(result.statistics.total_rays, result.rays.len());
    assert_relative_eq!(
        result.statistics.average_intensity,
        mirror_factor(0.9, COS_45),
        epsilon = 1e-9
    );
    assert!(result.statistics.total_path_length > 0.0);
    assert_eq!(result.statistics.component_count.sources, 1);
    assert_eq!(result.statistics.component_count.mirrors, 1);
    assert_eq!(result.statistics.component_count.detectors, 1);
}

#[test]
fn splitter_branches_sum_below_source_power() {
    let doc = r#"{
        "components": [
            {"id": 1, "type": "source", "position": {"x": 0, "y": 300},
             "properties": {"wavelengthNm": 550, "power": 1.0, "beamAngle": 0}},
            {"id": 2, "type": "beamsplitter", "position": {"x": 200, "y": 300},
             "properties": {"reflectivity": 0.5, "transmissivity": 0.5}},
            {"id": 3, "type": "mirror", "position": {"x": 200, "y": 450}, "rotation": 45,
             "properties": {"reflectivity": 0.9, "radiusOfCurvature": 0}},
            {"id": 4, "type": "detector", "position": {"x": 350, "y": 450},
             "properties": {"sensitivity": 1.0}},
            {"id": 5, "type": "detector", "position": {"x": 400, "y": 300},
             "properties": {"sensitivity": 1.0}}
        ],
        "connections": [
            {"id": 1, "from": {"componentId": 1, "port": "out"}, "to": {"componentId": 2, "port": "in"}},
            {"id": 2, "from": {"componentId": 2, "port": "reflect"}, "to": {"componentId": 3, "port": "in"}},
            {"id": 3, "from": {"componentId": 3, "port": "out"}, "to": {"componentId": 4, "port": "in"}},
            {"id": 4, "from": {"componentId": 2, "port": "transmit"}, "to": {"componentId": 5, "port": "in"}}
        ],
        "simulation": {"sweepConfig": {"startFreq": 500, "stopFreq": 600, "points": 1}}
    }"#;
    let result = simulate(&setup(doc), &EngineConfig::default()).unwrap();

    let absorbed: Vec<_> = result
        .rays
        .iter()
        .filter(|r| r.termination_reason == Some(TerminationReason::Absorbed))
        .collect();
    assert_eq!(absorbed.len(), 2);
    let total: f64 = absorbed.iter().map(|r| r.intensity).sum();
    assert!(total <= 1.0, "split branches must not exceed the source power");

    let sample = &result.frequency_sweep[0];
    assert!(sample.per_detector_intensity.contains_key(&4));
    assert!(sample.per_detector_intensity.contains_key(&5));
    assert_relative_eq!(
        sample.per_detector_intensity[&5],
        0.5,
        epsilon = 1e-9
    );
    assert_relative_eq!(
        sample.per_detector_intensity[&4],
        0.5 * mirror_factor(0.9, COS_45),
        epsilon = 1e-9
    );
}

#[test]
fn cyclic_graph_terminates_at_the_bounce_cap() {
    let doc = r#"{
        "components": [
            {"id": 1, "type": "source", "position": {"x": 0, "y": 0},
             "properties": {"wavelengthNm": 550, "power": 1.0, "beamAngle": 0}},
            {"id": 2, "type": "mirror", "position": {"x": 200, "y": 0},
             "properties": {"reflectivity": 1.0, "radiusOfCurvature": 0}},
            {"id": 3, "type": "mirror", "position": {"x": 400, "y": 0},
             "properties": {"reflectivity": 1.0, "radiusOfCurvature": 0}}
        ],
        "connections": [
            {"id": 1, "from": {"componentId": 1, "port": "out"}, "to": {"componentId": 2, "port": "in"}},
            {"id": 2, "from": {"componentId": 2, "port": "out"}, "to": {"componentId": 3, "port": "in"}},
            {"id": 3, "from": {"componentId": 3, "port": "out"}, "to": {"componentId": 2, "port": "in"}}
        ],
        "simulation": {"sweepConfig": {"startFreq": 500, "stopFreq": 600, "points": 1}}
    }"#;
    let config = EngineConfig::default();
    let result = simulate(&setup(doc), &config).unwrap();

    assert!(!result.rays.is_empty());
    for ray in &result.rays {
        assert!(ray.terminated, "every ray must terminate on a cyclic graph");
        assert!(ray.bounce_count <= config.max_bounces);
    }
    assert!(result
        .rays
        .iter()
        .any(|r| r.termination_reason == Some(TerminationReason::MaxBounces)));
}

#[test]
fn lossy_cycle_attenuates_before_the_cap() {
    let doc = r#"{
        "components": [
            {"id": 1, "type": "source", "position": {"x": 0, "y": 0},
             "properties": {"wavelengthNm": 550, "power": 1.0, "beamAngle": 0}},
            {"id": 2, "type": "mirror", "position": {"x": 200, "y": 0},
             "properties": {"reflectivity": 0.1, "radiusOfCurvature": 0}},
            {"id": 3, "type": "mirror", "position": {"x": 400, "y": 0},
             "properties": {"reflectivity": 0.1, "radiusOfCurvature": 0}}
        ],
        "connections": [
            {"id": 1, "from": {"componentId": 1, "port": "out"}, "to": {"componentId": 2, "port": "in"}},
            {"id": 2, "from": {"componentId": 2, "port": "out"}, "to": {"componentId": 3, "port": "in"}},
            {"id": 3, "from": {"componentId": 3, "port": "out"}, "to": {"componentId": 2, "port": "in"}}
        ],
        "simulation": {"sweepConfig": {"startFreq": 500, "stopFreq": 600, "points": 1}}
    }"#;
    let config = EngineConfig::default();
    let result = simulate(&setup(doc), &config).unwrap();

    assert_eq!(result.rays.len(), 1);
    let ray = &result.rays[0];
    assert_eq!(ray.termination_reason, Some(TerminationReason::Attenuated));
    assert!(ray.bounce_count < config.max_bounces);
    assert!(ray.intensity < config.intensity_epsilon);
}

#[test]
fn intensity_is_non_increasing_from_the_source() {
    let result = simulate(&setup(MIRROR_CHAIN), &EngineConfig::default()).unwrap();
    for ray in &result.rays {
        assert!(ray.intensity <= 1.0 + 1e-12);
    }
}

#[test]
fn sweep_covers_the_configured_range() {
    let result = simulate(&setup(MIRROR_CHAIN), &EngineConfig::default()).unwrap();
    let sweep = &result.frequency_sweep;
    assert_eq!(sweep.len(), 5);
    assert_relative_eq!(sweep[0].wavelength_nm, 500.0, epsilon = 1e-9);
    assert_relative_eq!(sweep[4].wavelength_nm, 600.0, epsilon = 1e-9);
    // Frequency falls as wavelength grows.
    assert!(sweep[0].frequency_thz > sweep[4].frequency_thz);
}

#[test]
fn malformed_setup_is_rejected_before_tracing() {
    let doc = r#"{
        "components": [
            {"id": 1, "type": "source", "position": {"x": 0, "y": 0},
             "properties": {"wavelengthNm": 550, "power": 1.0}}
        ],
        "connections": [
            {"id": 42, "from": {"componentId": 1, "port": "out"}, "to": {"componentId": 9, "port": "in"}}
        ],
        "simulation": {"sweepConfig": {"startFreq": 500, "stopFreq": 600, "points": 3}}
    }"#;
    let parsed = setup(doc);

    let report = validate(&parsed);
    assert!(!report.ok);
    assert!(report.issues.iter().any(|i| i.contains("connection 42")));

    assert!(simulate(&parsed, &EngineConfig::default()).is_err());
}

#[test]
fn empty_setup_yields_a_valid_empty_result() {
    let doc = r#"{
        "components": [],
        "simulation": {"sweepConfig": {"startFreq": 400, "stopFreq": 700, "points": 4}}
    }"#;
    let result = simulate(&setup(doc), &EngineConfig::default()).unwrap();

    assert!(result.success);
    assert!(result.rays.is_empty());
    assert_eq!(result.statistics.total_rays, 0);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("no light sources")));
}

#[test]
fn validation_report_carries_recommendations() {
    let doc = r#"{
        "components": [
            {"id": 1, "type": "beamsplitter", "position": {"x": 0, "y": 0},
             "properties": {"reflectivity": 0.8, "transmissivity": 0.8}}
        ],
        "simulation": {"sweepConfig": {"startFreq": 500, "stopFreq": 600, "points": 3}}
    }"#;
    let report = validate(&setup(doc));
    assert!(report.ok);
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("renormalised")));
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("no light sources")));
}
