//! # sim_math
//!
//! Math types for the sector simulation. Re-exports [`glam`] for in-sector
//! vector math and defines the hex grid used to address sectors on the
//! galaxy map.

pub mod hex;

// Re-export glam types for convenience.
pub use glam::Vec2;

pub use hex::HexCoord;

/// Moves `from` towards `to` by at most `step` world units.
///
/// Returns `to` exactly when the remaining distance is within `step`, so
/// callers can compare positions for arrival without accumulating drift.
#[must_use]
pub fn step_towards(from: Vec2, to: Vec2, step: f32) -> Vec2 {
    let delta = to - from;
    let distance = delta.length();
    if distance <= step || distance <= f32::EPSILON {
        return to;
    }
    from + delta / distance * step
}

/// Heading angle (radians, counter-clockwise from +X) of `to` seen from `from`.
#[must_use]
pub fn heading(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_towards_partial() {
        let p = step_towards(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.5);
        assert_eq!(p, Vec2::new(2.5, 0.0));
    }

    #[test]
    fn test_step_towards_snaps_on_arrival() {
        let target = Vec2::new(1.0, 1.0);
        assert_eq!(step_towards(Vec2::ZERO, target, 5.0), target);
    }

    #[test]
    fn test_heading() {
        let angle = heading(Vec2::ZERO, Vec2::new(0.0, 3.0));
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
