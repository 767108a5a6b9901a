//! Closed-form optical interaction laws.
//!
//! Everything here is scalar-intensity and non-polarised except the
//! Fresnel coefficients, which average the s- and p-polarised
//! reflectances. Directions are unit vectors in world space.

use beamtrace_geometry::path::unit;

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Refractive index of the surrounding medium.
pub const N_AIR: f64 = 1.0;

/// Refractive index of the protective overcoat assumed on mirrors and
/// splitters.
pub const N_COATING: f64 = 1.5;

/// Optical frequency in THz for a wavelength in nanometres.
pub fn wavelength_to_frequency_thz(wavelength_nm: f64) -> f64 {
    SPEED_OF_LIGHT / (wavelength_nm * 1e-9) / 1e12
}

/// Specular reflection of a direction about a surface normal.
///
/// `reflected = d − 2 (d · n) n`. The normal need not face the ray.
pub fn reflect(direction: [f64; 2], normal: [f64; 2]) -> [f64; 2] {
    let dot = direction[0] * normal[0] + direction[1] * normal[1];
    [
        direction[0] - 2.0 * dot * normal[0],
        direction[1] - 2.0 * dot * normal[1],
    ]
}

/// Unpolarised Fresnel reflectance at a planar interface.
///
/// `cos_theta_i` is the cosine of the angle of incidence (≥ 0). Returns
/// the mean of the s- and p-polarised reflectances; past the critical
/// angle the interface is totally reflecting and the result is 1.
pub fn fresnel_reflectance(cos_theta_i: f64, n1: f64, n2: f64) -> f64 {
    let cos_i = cos_theta_i.clamp(0.0, 1.0);
    let sin_i = (1.0 - cos_i * cos_i).sqrt();
    let sin_t = n1 / n2 * sin_i;
    if sin_t >= 1.0 {
        return 1.0; // total internal reflection
    }
    let cos_t = (1.0 - sin_t * sin_t).sqrt();

    let rs = ((n1 * cos_i - n2 * cos_t) / (n1 * cos_i + n2 * cos_t)).powi(2);
    let rp = ((n1 * cos_t - n2 * cos_i) / (n1 * cos_t + n2 * cos_i)).powi(2);
    0.5 * (rs + rp)
}

/// Snell's law: refraction angle for an incidence angle in radians.
///
/// Returns `None` past the critical angle (total internal reflection).
pub fn snell_refraction(theta_i: f64, n1: f64, n2: f64) -> Option<f64> {
    let sin_t = n1 / n2 * theta_i.sin();
    if sin_t.abs() > 1.0 {
        None
    } else {
        Some(sin_t.asin())
    }
}

/// Angle-dependent attenuation of a coated mirror.
///
/// The beam crosses the protective overcoat twice, paying the Fresnel
/// transmittance each way, on top of the mirror's own reflectivity:
/// `reflectivity · (1 − R(θ))²`.
pub fn mirror_attenuation(cos_theta_i: f64, reflectivity: f64) -> f64 {
    let t = 1.0 - fresnel_reflectance(cos_theta_i, N_AIR, N_COATING);
    reflectivity * t * t
}

/// Thin-lens deflection angle in radians.
///
/// A ray crossing the lens plane at a signed distance `axis_distance`
/// from the optical axis is deflected towards (positive focal length) or
/// away from (negative) the axis: `−atan(d / f)`.
pub fn thin_lens_deflection(axis_distance: f64, focal_length: f64) -> f64 {
    -(axis_distance / focal_length).atan()
}

/// Intersection of a ray line with the plane of a component.
///
/// The plane passes through `plane_point` with normal `plane_normal` (both
/// world space). Returns the signed distance of the hit point from the
/// plane point along `plane_tangent`, or `None` when the ray runs parallel
/// to the plane.
pub fn plane_axis_distance(
    ray_point: [f64; 2],
    ray_direction: [f64; 2],
    plane_point: [f64; 2],
    plane_normal: [f64; 2],
    plane_tangent: [f64; 2],
) -> Option<f64> {
    let d = unit(ray_direction)?;
    let denom = d[0] * plane_normal[0] + d[1] * plane_normal[1];
    if denom.abs() < 1e-9 {
        return None;
    }
    let to_plane = [plane_point[0] - ray_point[0], plane_point[1] - ray_point[1]];
    let t = (to_plane[0] * plane_normal[0] + to_plane[1] * plane_normal[1]) / denom;
    let hit = [ray_point[0] + t * d[0], ray_point[1] + t * d[1]];
    let offset = [hit[0] - plane_point[0], hit[1] - plane_point[1]];
    Some(offset[0] * plane_tangent[0] + offset[1] * plane_tangent[1])
}
