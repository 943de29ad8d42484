//! Steering barrier and steering parameter conversion.

use crate::barrier::NativeBarrier;
use crate::handle::{NativeHandle, NativeRef};
use crate::native::{NativeSteeringParameters, SteeringKind, SteeringNative};
use crate::registry::NativeRegistry;
use crate::units::{angle_to_host, angle_to_native, distance_to_host_scaled, distance_to_native_scaled};
use crate::vehicle::WheelJointBarrier;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Steering geometry in host units. Angles in degrees, lengths in host
/// distance units, `gear` and `side` unitless.
///
/// `side` crosses into the engine bit for bit, so a negative selector
/// reads back unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SteeringParametersData {
    pub phi0: f64,
    pub l: f64,
    pub alpha0: f64,
    pub lc: f64,
    pub lr: f64,
    pub gear: f64,
    pub side: i32,
}

impl SteeringParametersData {
    /// Convert with the environment's host-to-native distance factor
    pub fn to_native(&self, distance_scale: f64) -> NativeSteeringParameters {
        NativeSteeringParameters {
            phi0: angle_to_native(self.phi0),
            l: distance_to_native_scaled(self.l, distance_scale),
            alpha0: angle_to_native(self.alpha0),
            lc: distance_to_native_scaled(self.lc, distance_scale),
            lr: distance_to_native_scaled(self.lr, distance_scale),
            gear: self.gear,
            side: self.side as u32,
        }
    }

    pub fn from_native(native: &NativeSteeringParameters, distance_scale: f64) -> Self {
        Self {
            phi0: angle_to_host(native.phi0),
            l: distance_to_host_scaled(native.l, distance_scale),
            alpha0: angle_to_host(native.alpha0),
            lc: distance_to_host_scaled(native.lc, distance_scale),
            lr: distance_to_host_scaled(native.lr, distance_scale),
            gear: native.gear,
            side: native.side as i32,
        }
    }
}

/// Barrier for a steering mechanism. Shared ownership: clones alias the
/// same engine object.
#[derive(Clone, Debug, Default)]
pub struct SteeringBarrier {
    native: NativeRef<SteeringNative>,
}

impl NativeBarrier for SteeringBarrier {
    type Native = SteeringNative;
    const KIND: &'static str = "SteeringBarrier";

    fn native_ref(&self) -> &NativeRef<SteeringNative> {
        &self.native
    }

    fn native_ref_mut(&mut self) -> &mut NativeRef<SteeringNative> {
        &mut self.native
    }
}

impl SteeringBarrier {
    /// Adopt an existing engine steering
    pub fn from_native(native: NativeHandle<SteeringNative>) -> Self {
        Self {
            native: NativeRef::new(native),
        }
    }

    pub fn allocate_ackermann(
        &mut self,
        registry: &NativeRegistry,
        left: &WheelJointBarrier,
        right: &WheelJointBarrier,
        params: &SteeringParametersData,
        distance_scale: f64,
    ) {
        self.allocate(registry, SteeringKind::Ackermann, left, right, params, distance_scale);
    }

    pub fn allocate_bell_crank(
        &mut self,
        registry: &NativeRegistry,
        left: &WheelJointBarrier,
        right: &WheelJointBarrier,
        params: &SteeringParametersData,
        distance_scale: f64,
    ) {
        self.allocate(registry, SteeringKind::BellCrank, left, right, params, distance_scale);
    }

    pub fn allocate_rack_pinion(
        &mut self,
        registry: &NativeRegistry,
        left: &WheelJointBarrier,
        right: &WheelJointBarrier,
        params: &SteeringParametersData,
        distance_scale: f64,
    ) {
        self.allocate(registry, SteeringKind::RackPinion, left, right, params, distance_scale);
    }

    pub fn allocate_davis(
        &mut self,
        registry: &NativeRegistry,
        left: &WheelJointBarrier,
        right: &WheelJointBarrier,
        params: &SteeringParametersData,
        distance_scale: f64,
    ) {
        self.allocate(registry, SteeringKind::Davis, left, right, params, distance_scale);
    }

    /// Allocate a steering of the given kind. Lengths in `params` are
    /// converted with `distance_scale`.
    pub fn allocate(
        &mut self,
        registry: &NativeRegistry,
        kind: SteeringKind,
        left: &WheelJointBarrier,
        right: &WheelJointBarrier,
        params: &SteeringParametersData,
        distance_scale: f64,
    ) {
        assert!(
            !self.has_native(),
            "SteeringBarrier: AllocateNative called on a barrier that already has a native"
        );
        assert!(left.has_native(), "SteeringBarrier: left wheel joint has no native");
        assert!(right.has_native(), "SteeringBarrier: right wheel joint has no native");

        let native = SteeringNative {
            kind,
            left: left.native().clone(),
            right: right.native().clone(),
            parameters: params.to_native(distance_scale),
            enabled: true,
            steering_angle: 0.0,
            name: String::new(),
            uuid: Uuid::new_v4(),
        };
        self.store_native(registry, native);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.native().write().enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.native().read().enabled
    }

    /// Steering angle in degrees
    pub fn set_steering_angle(&mut self, angle: f64) {
        self.native().write().steering_angle = angle_to_native(angle);
    }

    pub fn steering_angle(&self) -> f64 {
        angle_to_host(self.native().read().steering_angle)
    }

    pub fn set_name(&mut self, name: &str) {
        self.native().write().name = name.to_string();
    }

    pub fn name(&self) -> String {
        self.native().read().name.clone()
    }

    pub fn guid(&self) -> Uuid {
        self.native().read().uuid
    }

    pub fn kind(&self) -> SteeringKind {
        self.native().read().kind
    }

    pub fn steering_parameters(&self, distance_scale: f64) -> SteeringParametersData {
        SteeringParametersData::from_native(&self.native().read().parameters, distance_scale)
    }
}
