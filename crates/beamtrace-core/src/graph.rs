//! Validated component/connection graph.
//!
//! [`Graph::build`] turns a raw setup document into the immutable structure
//! the tracer walks. Validation is exhaustive rather than fail-fast: every
//! offending element is reported in one [`ValidationError`] so the editor
//! can surface all problems at once.

use std::collections::BTreeMap;

use beamtrace_geometry::transform::Placement;
use thiserror::Error;

use crate::document::{OpticalSetup, SweepConfig};
use crate::types::{ComponentId, ComponentKind, KindProperties, Point, PortRole, PortSpec};

/// Structural problems in a setup document. Carries every issue found.
#[derive(Debug, Error)]
#[error("optical setup failed validation with {} issue(s): {}", .issues.len(), .issues.join("; "))]
pub struct ValidationError {
    pub issues: Vec<String>,
}

/// Outcome of the boundary `validate` operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub issues: Vec<String>,
    /// Non-fatal advice: the setup will simulate, but results may be
    /// degraded (e.g. no detectors, over-unity beam splitter).
    pub recommendations: Vec<String>,
}

/// Fixed port layout per component kind.
///
/// Represented as a lookup table rather than per-instance state: the port
/// set is determined entirely by the kind. Offsets are in the component's
/// local frame; output ports are physical exit points, input ports entry
/// points.
pub fn port_schema(kind: ComponentKind) -> &'static [PortSpec] {
    use PortRole::{Input, Output};

    static SOURCE: [PortSpec; 1] =
        [PortSpec { id: "out", role: Output, offset: [20.0, 0.0] }];
    static MIRROR: [PortSpec; 2] = [
        PortSpec { id: "in", role: Input, offset: [-14.0, 0.0] },
        PortSpec { id: "out", role: Output, offset: [0.0, 14.0] },
    ];
    static BEAMSPLITTER: [PortSpec; 3] = [
        PortSpec { id: "in", role: Input, offset: [-14.0, 0.0] },
        PortSpec { id: "reflect", role: Output, offset: [0.0, 14.0] },
        PortSpec { id: "transmit", role: Output, offset: [14.0, 0.0] },
    ];
    static LENS: [PortSpec; 2] = [
        PortSpec { id: "in", role: Input, offset: [-16.0, 0.0] },
        PortSpec { id: "out", role: Output, offset: [16.0, 0.0] },
    ];
    static DETECTOR: [PortSpec; 1] =
        [PortSpec { id: "in", role: Input, offset: [-12.0, 0.0] }];

    match kind {
        ComponentKind::Source => &SOURCE,
        ComponentKind::Mirror => &MIRROR,
        ComponentKind::Beamsplitter => &BEAMSPLITTER,
        ComponentKind::Lens => &LENS,
        ComponentKind::Detector => &DETECTOR,
    }
}

/// Look up a port by id on a kind's schema.
pub fn find_port(kind: ComponentKind, port_id: &str) -> Option<&'static PortSpec> {
    port_schema(kind).iter().find(|p| p.id == port_id)
}

/// A validated component with its resolved placement.
#[derive(Debug, Clone)]
pub struct Element {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub position: Point,
    pub rotation_deg: f64,
    pub props: KindProperties,
    pub placement: Placement,
}

impl Element {
    /// World position of one of this element's ports.
    pub fn port_position(&self, port: &PortSpec) -> Point {
        Point::from_array(self.placement.world_position(port.offset))
    }
}

/// A validated connection between two ports.
///
/// Endpoints are pre-resolved to element indices and schema port specs so
/// the tracer never performs a fallible lookup mid-trace.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: u32,
    pub from_component: ComponentId,
    pub to_component: ComponentId,
    pub from_index: usize,
    pub to_index: usize,
    pub from_port: &'static PortSpec,
    pub to_port: &'static PortSpec,
}

/// The immutable graph a single trace walks.
#[derive(Debug)]
pub struct Graph {
    elements: Vec<Element>,
    by_id: BTreeMap<ComponentId, usize>,
    connections: Vec<Connection>,
    /// Connection indices keyed by (component, output port).
    outgoing: BTreeMap<(ComponentId, &'static str), Vec<usize>>,
    sweep: SweepConfig,
    advisories: Vec<String>,
}

impl Graph {
    /// Validate a setup document and build the graph.
    ///
    /// Returns a [`ValidationError`] enumerating every offending element;
    /// advisory findings that do not block simulation are collected on the
    /// graph instead (see [`Graph::advisories`]).
    pub fn build(setup: &OpticalSetup) -> Result<Graph, ValidationError> {
        let mut issues = Vec::new();
        let mut advisories = Vec::new();

        let mut elements = Vec::with_capacity(setup.components.len());
        let mut by_id = BTreeMap::new();

        for spec in &setup.components {
            if by_id.contains_key(&spec.id) {
                issues.push(format!("duplicate component id {}", spec.id));
                continue;
            }
            if !spec.position.is_finite() || !spec.rotation.is_finite() {
                issues.push(format!("component {} has non-finite placement", spec.id));
                continue;
            }
            match extract_properties(spec.id, spec.kind, &spec.properties, &mut issues) {
                Some(props) => {
                    if let KindProperties::Beamsplitter { reflectivity, transmissivity } = props {
                        if reflectivity + transmissivity > 1.0 {
                            advisories.push(format!(
                                "beamsplitter {}: reflectivity + transmissivity = {:.3} exceeds 1; \
                                 the split will be renormalised",
                                spec.id,
                                reflectivity + transmissivity
                            ));
                        }
                    }
                    by_id.insert(spec.id, elements.len());
                    elements.push(Element {
                        id: spec.id,
                        kind: spec.kind,
                        position: spec.position,
                        rotation_deg: spec.rotation,
                        props,
                        placement: Placement::new(spec.position.to_array(), spec.rotation),
                    });
                }
                None => {} // issues already recorded
            }
        }

        let mut connections = Vec::with_capacity(setup.connections.len());
        let mut outgoing: BTreeMap<(ComponentId, &'static str), Vec<usize>> = BTreeMap::new();
        let mut seen_connection_ids = BTreeMap::new();

        for spec in &setup.connections {
            if let Some(prev) = seen_connection_ids.insert(spec.id, spec.id) {
                issues.push(format!("duplicate connection id {prev}"));
                continue;
            }
            let from = resolve_endpoint(
                spec.id, &spec.from.port, spec.from.component_id,
                PortRole::Output, &by_id, &elements, &mut issues,
            );
            let to = resolve_endpoint(
                spec.id, &spec.to.port, spec.to.component_id,
                PortRole::Input, &by_id, &elements, &mut issues,
            );
            if let (Some((from_index, from_port)), Some((to_index, to_port))) = (from, to) {
                let index = connections.len();
                connections.push(Connection {
                    id: spec.id,
                    from_component: spec.from.component_id,
                    to_component: spec.to.component_id,
                    from_index,
                    to_index,
                    from_port,
                    to_port,
                });
                outgoing
                    .entry((spec.from.component_id, from_port.id))
                    .or_default()
                    .push(index);
            }
        }

        let sweep = setup.simulation.sweep_config;
        validate_sweep(&sweep, &mut issues);

        if !elements.iter().any(|e| e.kind == ComponentKind::Source) {
            advisories.push("setup contains no light sources; nothing will be traced".into());
        }
        if !elements.iter().any(|e| e.kind == ComponentKind::Detector) {
            advisories.push("setup contains no detectors; the sweep will record no readings".into());
        }

        if issues.is_empty() {
            Ok(Graph { elements, by_id, connections, outgoing, sweep, advisories })
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ComponentId) -> Option<&Element> {
        self.by_id.get(&id).map(|&i| &self.elements[i])
    }

    pub fn sources(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.kind == ComponentKind::Source)
    }

    /// Connections departing a given output port, in document order.
    pub fn outgoing(&self, component: ComponentId, port: &str) -> impl Iterator<Item = &Connection> {
        self.outgoing
            .get(&(component, port_key(port)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|&i| &self.connections[i])
    }

    pub fn sweep_config(&self) -> &SweepConfig {
        &self.sweep
    }

    /// Non-fatal findings collected during the build.
    pub fn advisories(&self) -> &[String] {
        &self.advisories
    }
}

/// Interns a caller-supplied port name against the known schema ids so the
/// outgoing map can key on `&'static str`.
fn port_key(port: &str) -> &'static str {
    match port {
        "out" => "out",
        "in" => "in",
        "reflect" => "reflect",
        "transmit" => "transmit",
        _ => "",
    }
}

fn resolve_endpoint(
    connection_id: u32,
    port: &str,
    component: ComponentId,
    expected_role: PortRole,
    by_id: &BTreeMap<ComponentId, usize>,
    elements: &[Element],
    issues: &mut Vec<String>,
) -> Option<(usize, &'static PortSpec)> {
    let Some(&index) = by_id.get(&component) else {
        issues.push(format!(
            "connection {connection_id} references unknown component {component}"
        ));
        return None;
    };
    let kind = elements[index].kind;
    let Some(spec) = find_port(kind, port) else {
        issues.push(format!(
            "connection {connection_id}: {} {component} has no port named '{port}'",
            kind.label()
        ));
        return None;
    };
    if spec.role != expected_role {
        let wanted = match expected_role {
            PortRole::Output => "output",
            PortRole::Input => "input",
        };
        issues.push(format!(
            "connection {connection_id}: port '{port}' on {} {component} is not an {wanted} port",
            kind.label()
        ));
        return None;
    }
    Some((index, spec))
}

fn validate_sweep(sweep: &SweepConfig, issues: &mut Vec<String>) {
    if !(sweep.start_nm.is_finite() && sweep.stop_nm.is_finite()) {
        issues.push("sweep bounds must be finite".into());
        return;
    }
    if sweep.start_nm <= 0.0 || sweep.stop_nm <= 0.0 {
        issues.push("sweep wavelengths must be positive".into());
    }
    if sweep.start_nm > sweep.stop_nm {
        issues.push(format!(
            "sweep range is inverted: startFreq {} > stopFreq {}",
            sweep.start_nm, sweep.stop_nm
        ));
    }
    if sweep.points == 0 {
        issues.push("sweep must sample at least one point".into());
    }
}

/// Pull one named float out of the property map, accepting fallback keys
/// kept for compatibility with older documents.
fn required(
    id: ComponentId,
    kind: ComponentKind,
    map: &BTreeMap<String, f64>,
    keys: &[&str],
    range: Option<(f64, f64)>,
    issues: &mut Vec<String>,
) -> Option<f64> {
    let value = keys.iter().find_map(|k| map.get(*k).copied());
    let Some(value) = value else {
        issues.push(format!(
            "{} {id} is missing required property '{}'",
            kind.label(),
            keys[0]
        ));
        return None;
    };
    if !value.is_finite() {
        issues.push(format!(
            "{} {id}: property '{}' is not finite",
            kind.label(),
            keys[0]
        ));
        return None;
    }
    if let Some((lo, hi)) = range {
        if value < lo || value > hi {
            issues.push(format!(
                "{} {id}: property '{}' = {value} is outside [{lo}, {hi}]",
                kind.label(),
                keys[0]
            ));
            return None;
        }
    }
    Some(value)
}

fn extract_properties(
    id: ComponentId,
    kind: ComponentKind,
    map: &BTreeMap<String, f64>,
    issues: &mut Vec<String>,
) -> Option<KindProperties> {
    match kind {
        ComponentKind::Source => {
            let wavelength =
                required(id, kind, map, &["wavelengthNm", "wavelength"], None, issues);
            let power = required(id, kind, map, &["power"], Some((0.0, f64::INFINITY)), issues);
            let beam_angle = match map.get("beamAngle").copied() {
                Some(v) if !v.is_finite() || v < 0.0 => {
                    issues.push(format!("source {id}: property 'beamAngle' = {v} is invalid"));
                    return None;
                }
                other => other,
            };
            match (wavelength, power) {
                (Some(w), _) if w <= 0.0 => {
                    issues.push(format!("source {id}: wavelength must be positive, got {w}"));
                    None
                }
                (Some(wavelength_nm), Some(power)) => Some(KindProperties::Source {
                    wavelength_nm,
                    power,
                    beam_half_angle_deg: beam_angle,
                }),
                _ => None,
            }
        }
        ComponentKind::Mirror => {
            let reflectivity =
                required(id, kind, map, &["reflectivity"], Some((0.0, 1.0)), issues);
            let radius =
                required(id, kind, map, &["radiusOfCurvature"], None, issues);
            Some(KindProperties::Mirror {
                reflectivity: reflectivity?,
                radius_of_curvature: radius?,
            })
        }
        ComponentKind::Beamsplitter => {
            let reflectivity =
                required(id, kind, map, &["reflectivity"], Some((0.0, 1.0)), issues);
            let transmissivity =
                required(id, kind, map, &["transmissivity"], Some((0.0, 1.0)), issues);
            Some(KindProperties::Beamsplitter {
                reflectivity: reflectivity?,
                transmissivity: transmissivity?,
            })
        }
        ComponentKind::Lens => {
            let focal = required(id, kind, map, &["focalLength"], None, issues)?;
            if focal == 0.0 {
                issues.push(format!("lens {id}: focalLength must be non-zero"));
                return None;
            }
            Some(KindProperties::Lens { focal_length: focal })
        }
        ComponentKind::Detector => {
            let sensitivity =
                required(id, kind, map, &["sensitivity"], Some((0.0, 1.0)), issues)?;
            Some(KindProperties::Detector { sensitivity })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_setup;

    fn setup_json(components: &str, connections: &str) -> String {
        format!(
            r#"{{
                "components": [{components}],
                "connections": [{connections}],
                "simulation": {{"sweepConfig": {{"startFreq": 500, "stopFreq": 600, "points": 5}}}}
            }}"#
        )
    }

    const SOURCE: &str = r#"{"id": 1, "type": "source", "position": {"x": 0, "y": 0},
        "properties": {"wavelengthNm": 550, "power": 1.0}}"#;
    const DETECTOR: &str = r#"{"id": 2, "type": "detector", "position": {"x": 100, "y": 0},
        "properties": {"sensitivity": 1.0}}"#;

    #[test]
    fn test_valid_chain_builds() {
        let doc = setup_json(
            &format!("{SOURCE}, {DETECTOR}"),
            r#"{"id": 1, "from": {"componentId": 1, "port": "out"},
                 "to": {"componentId": 2, "port": "in"}}"#,
        );
        let graph = Graph::build(&parse_setup(&doc).unwrap()).unwrap();
        assert_eq!(graph.elements().len(), 2);
        assert_eq!(graph.outgoing(1, "out").count(), 1);
    }

    #[test]
    fn test_dangling_connection_names_the_connection() {
        let doc = setup_json(
            SOURCE,
            r#"{"id": 42, "from": {"componentId": 1, "port": "out"},
                 "to": {"componentId": 99, "port": "in"}}"#,
        );
        let err = Graph::build(&parse_setup(&doc).unwrap()).unwrap_err();
        assert!(err.issues.iter().any(|i| i.contains("connection 42")));
        assert!(err.issues.iter().any(|i| i.contains("99")));
    }

    #[test]
    fn test_role_mismatch_is_reported() {
        // Both endpoints point at input ports.
        let doc = setup_json(
            &format!(
                r#"{{"id": 1, "type": "mirror", "position": {{"x": 0, "y": 0}},
                    "properties": {{"reflectivity": 0.9, "radiusOfCurvature": 0}}}}, {DETECTOR}"#
            ),
            r#"{"id": 5, "from": {"componentId": 1, "port": "in"},
                 "to": {"componentId": 2, "port": "in"}}"#,
        );
        let err = Graph::build(&parse_setup(&doc).unwrap()).unwrap_err();
        assert!(err.issues.iter().any(|i| i.contains("not an output port")));
    }

    #[test]
    fn test_validation_is_exhaustive_not_fail_fast() {
        let doc = setup_json(
            r#"{"id": 1, "type": "mirror", "position": {"x": 0, "y": 0},
                "properties": {"reflectivity": 1.5, "radiusOfCurvature": 0}},
               {"id": 1, "type": "detector", "position": {"x": 1, "y": 0},
                "properties": {"sensitivity": 2.0}}"#,
            r#"{"id": 3, "from": {"componentId": 8, "port": "out"},
                 "to": {"componentId": 9, "port": "in"}}"#,
        );
        let err = Graph::build(&parse_setup(&doc).unwrap()).unwrap_err();
        // out-of-range reflectivity, duplicate id, two unknown components
        assert!(err.issues.len() >= 4, "issues: {:?}", err.issues);
    }

    #[test]
    fn test_inverted_sweep_is_an_issue() {
        let doc = r#"{
            "components": [],
            "simulation": {"sweepConfig": {"startFreq": 700, "stopFreq": 400, "points": 5}}
        }"#;
        let err = Graph::build(&parse_setup(doc).unwrap()).unwrap_err();
        assert!(err.issues.iter().any(|i| i.contains("inverted")));
    }

    #[test]
    fn test_over_unity_splitter_is_advisory_not_error() {
        let doc = setup_json(
            r#"{"id": 1, "type": "beamsplitter", "position": {"x": 0, "y": 0},
                "properties": {"reflectivity": 0.7, "transmissivity": 0.7}}"#,
            "",
        );
        let graph = Graph::build(&parse_setup(&doc).unwrap()).unwrap();
        assert!(graph.advisories().iter().any(|a| a.contains("renormalised")));
    }

    #[test]
    fn test_legacy_wavelength_key_accepted() {
        let doc = setup_json(
            r#"{"id": 1, "type": "source", "position": {"x": 0, "y": 0},
                "properties": {"wavelength": 632.8, "power": 0.5}}"#,
            "",
        );
        let graph = Graph::build(&parse_setup(&doc).unwrap()).unwrap();
        match graph.elements()[0].props {
            KindProperties::Source { wavelength_nm, .. } => {
                assert_eq!(wavelength_nm, 632.8)
            }
            _ => panic!("expected a source"),
        }
    }
}
