//! Setup-document deserialisation.
//!
//! The editor UI is the sole producer of [`OpticalSetup`] documents. The
//! JSON shape is inherited from the originating tool and preserved for
//! compatibility; in particular the sweep bounds are named `startFreq` /
//! `stopFreq` even though both are wavelengths in nanometres.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{ComponentId, ComponentKind, Point};

/// Top-level setup document.
#[derive(Debug, Clone, Deserialize)]
pub struct OpticalSetup {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub timestamp: String,
    pub components: Vec<ComponentSpec>,
    #[serde(default)]
    pub connections: Vec<ConnectionSpec>,
    pub simulation: SimulationSection,
}

/// One component as it appears in the document.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSpec {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub position: Point,
    /// Rotation about the component position, degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Kind-specific named floats; required keys are enforced by the
    /// validator, unknown keys are ignored.
    #[serde(default)]
    pub properties: BTreeMap<String, f64>,
}

/// A directed edge from an output port to an input port.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionSpec {
    pub id: u32,
    pub from: EndpointSpec,
    pub to: EndpointSpec,
}

/// One end of a connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSpec {
    pub component_id: ComponentId,
    pub port: String,
}

/// The `simulation` section of the document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSection {
    pub sweep_config: SweepConfig,
}

/// Spectral sweep bounds and resolution.
///
/// `start_nm`/`stop_nm` deserialise from the legacy `startFreq`/`stopFreq`
/// keys; both are wavelengths in nanometres.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SweepConfig {
    #[serde(rename = "startFreq")]
    pub start_nm: f64,
    #[serde(rename = "stopFreq")]
    pub stop_nm: f64,
    pub points: usize,
}

/// Parse a setup document from a JSON string.
pub fn parse_setup(json: &str) -> Result<OpticalSetup, serde_json::Error> {
    serde_json::from_str(json)
}
