//! # Unit Conversion
//!
//! The host works in centimeters and degrees, the native engine in meters
//! and radians. Every value crossing a barrier goes through one of these.

/// Host distance units per native meter
pub const HOST_UNITS_PER_METER: f64 = 100.0;

/// Default host-to-native distance factor (centimeters to meters)
pub const DEFAULT_DISTANCE_SCALE: f64 = 1.0 / HOST_UNITS_PER_METER;

/// Convert a host distance using a world-specific scale
pub fn distance_to_native_scaled(distance: f64, scale: f64) -> f64 {
    distance * scale
}

/// Convert a native distance back using a world-specific scale. `scale`
/// must be positive, which `NativeEnvironment::init` enforces.
pub fn distance_to_host_scaled(distance: f64, scale: f64) -> f64 {
    distance / scale
}

/// Convert a host angle (degrees) to native radians
pub fn angle_to_native(angle: f64) -> f64 {
    angle.to_radians()
}

/// Convert a native angle (radians) to host degrees
pub fn angle_to_host(angle: f64) -> f64 {
    angle.to_degrees()
}
