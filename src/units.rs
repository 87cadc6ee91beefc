//! Type-safe angle handling for profile geometry.
//!
//! Inclination angles are passed around as `uom` typed quantities so that
//! degree/radian confusion is caught at the call site rather than producing
//! a silently wrong disk geometry. This mirrors the length and temperature
//! extension traits used elsewhere in our simulation stack.

use uom::si::angle::{degree, radian};
use uom::si::f64::Angle;

/// Extension trait for angle conversions used in profile construction.
pub trait AngleExt {
    /// Create an angle from radians
    fn from_radians(rad: f64) -> Self;

    /// Get the angle in radians
    fn as_radians(&self) -> f64;

    /// Create an angle from degrees
    fn from_degrees(deg: f64) -> Self;

    /// Get the angle in degrees
    fn as_degrees(&self) -> f64;
}

impl AngleExt for Angle {
    fn from_radians(rad: f64) -> Self {
        Angle::new::<radian>(rad)
    }

    fn as_radians(&self) -> f64 {
        self.get::<radian>()
    }

    fn from_degrees(deg: f64) -> Self {
        Angle::new::<degree>(deg)
    }

    fn as_degrees(&self) -> f64 {
        self.get::<degree>()
    }
}
