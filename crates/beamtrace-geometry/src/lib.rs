//! # Beamtrace Geometry
//!
//! Planar geometry for the beamtrace optical engine. Components live on a
//! 2D canvas; each one carries a position and a rotation about that
//! position, and every port and beam direction is expressed in the
//! component's local frame until this crate maps it into world space.
//!
//! ## Modules
//!
//! - [`transform`] — Rigid 2D placements (rotation + translation) and
//!   direction rotation.
//! - [`path`] — Polyline measures and unit-vector helpers for ray paths.

pub mod path;
pub mod transform;
