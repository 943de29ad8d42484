//! # Steering Component
//!
//! Links two wheel joints through a steering mechanism. The component keeps
//! its own copy of every property so it can be configured before play; once
//! a native exists, setters forward to it and getters read from it.
//!
//! ## Table of Contents
//! 1. SteeringComponent - Properties, native creation, play lifecycle
//! 2. NativeOwner - Rebinding across host reconstruction

use crate::asset::Asset;
use crate::render_proxy::SteeringRenderData;
use crate::session::PlaySession;
use crate::steering_parameters::SteeringParameters;
use barrier_core::native::SteeringKind;
use barrier_core::{
    BarrierError, NativeAddress, NativeBarrier, NativeEnvironment, NativeOwner, PinnedInstanceData, Result,
    SteeringBarrier, WheelJointBarrier,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, warn};

/// A wheel joint owned elsewhere and referenced by steering components
pub type SharedWheelJoint = Arc<Mutex<WheelJointBarrier>>;

// ============================================================================
// 1. SteeringComponent
// ============================================================================

/// Steering mechanism between a left and a right wheel joint
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Component))]
pub struct SteeringComponent {
    pub name: String,
    /// Mechanism allocated by `create_native`
    pub steering_kind: SteeringKind,
    pub steering_parameters: Option<Asset<SteeringParameters>>,
    pub left_wheel_joint: Option<SharedWheelJoint>,
    pub right_wheel_joint: Option<SharedWheelJoint>,
    enabled: bool,
    /// Degrees
    steering_angle: f64,
    native_barrier: SteeringBarrier,
    environment: Option<Arc<NativeEnvironment>>,
}

impl Default for SteeringComponent {
    fn default() -> Self {
        Self {
            name: "Steering".to_string(),
            steering_kind: SteeringKind::Ackermann,
            steering_parameters: None,
            left_wheel_joint: None,
            right_wheel_joint: None,
            enabled: true,
            steering_angle: 0.0,
            native_barrier: SteeringBarrier::default(),
            environment: None,
        }
    }
}

impl SteeringComponent {
    /// Create a steering component between two wheel joints
    pub fn new(name: impl Into<String>, left: SharedWheelJoint, right: SharedWheelJoint) -> Self {
        Self {
            name: name.into(),
            left_wheel_joint: Some(left),
            right_wheel_joint: Some(right),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: SteeringKind) -> Self {
        self.steering_kind = kind;
        self
    }

    pub fn with_parameters(mut self, parameters: Asset<SteeringParameters>) -> Self {
        self.steering_parameters = Some(parameters);
        self
    }

    /// Use `environment` for rebinding when no native has been created yet
    pub fn bind_environment(&mut self, environment: Arc<NativeEnvironment>) {
        self.environment = Some(environment);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.has_native() {
            self.native_barrier.set_enabled(enabled);
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        if self.has_native() {
            return self.native_barrier.is_enabled();
        }
        self.enabled
    }

    /// Steering angle in degrees
    pub fn set_steering_angle(&mut self, angle: f64) {
        if self.has_native() {
            self.native_barrier.set_steering_angle(angle);
        }
        self.steering_angle = angle;
    }

    pub fn steering_angle(&self) -> f64 {
        if self.has_native() {
            return self.native_barrier.steering_angle();
        }
        self.steering_angle
    }

    /// The steering barrier, if a native has been created
    pub fn get_native(&self) -> Option<&SteeringBarrier> {
        self.has_native().then_some(&self.native_barrier)
    }

    /// Allocate the engine steering. Both wheel joints must already have
    /// their natives. Returns false, after logging why, if it could not.
    pub fn create_native(&mut self, session: &PlaySession) -> bool {
        session.environment().assert_owner_thread();
        if self.has_native() {
            warn!("Steering '{}' already has a native", self.name);
            return true;
        }

        let (Some(left), Some(right)) = (&self.left_wheel_joint, &self.right_wheel_joint) else {
            error!(
                "Steering '{}' cannot create its native: both wheel joints must be set",
                self.name
            );
            return false;
        };
        if Arc::ptr_eq(left, right) {
            error!(
                "Steering '{}' cannot create its native: left and right wheel joint are the same",
                self.name
            );
            return false;
        }

        let params = self
            .steering_parameters
            .as_ref()
            .and_then(|asset| asset.get_or_create_instance(Some(session)))
            .map(|instance| instance.read(|params| params.steering_data))
            .unwrap_or_else(|| {
                warn!(
                    "Steering '{}' has no steering parameters, using the {:?} preset",
                    self.name, self.steering_kind
                );
                SteeringParameters::preset(self.steering_kind).steering_data
            });

        {
            let left = left.lock();
            let right = right.lock();
            if !left.has_native() || !right.has_native() {
                error!(
                    "Steering '{}' cannot create its native: wheel joints have not been initialized",
                    self.name
                );
                return false;
            }

            self.native_barrier.allocate(
                session.registry(),
                self.steering_kind,
                &left,
                &right,
                &params,
                session.environment().distance_scale(),
            );
        }

        self.environment = Some(Arc::clone(session.environment()));
        self.update_native_properties();
        true
    }

    /// Push every component property into the native
    pub fn update_native_properties(&mut self) {
        if !self.has_native() {
            return;
        }
        self.native_barrier.set_name(&self.name);
        self.native_barrier.set_enabled(self.enabled);
        self.native_barrier.set_steering_angle(self.steering_angle);
    }

    /// Create the native at the start of play unless one was inherited
    pub fn begin_play(&mut self, session: &PlaySession) {
        if !self.has_native() {
            self.create_native(session);
        }
    }

    /// Release the native at the end of play. Set `reconstructing` when the
    /// host is rebuilding this component; the native is then kept alive for
    /// the rebuilt one, see [`SteeringComponent::capture_instance_data`].
    pub fn end_play(&mut self, reconstructing: bool) {
        if !self.has_native() {
            return;
        }
        if !reconstructing {
            self.enabled = self.native_barrier.is_enabled();
            self.steering_angle = self.native_barrier.steering_angle();
        }
        self.native_barrier.release_native();
    }

    /// Capture the native address before host reconstruction. The returned
    /// data pins the native until it is applied or dropped.
    pub fn capture_instance_data(&self) -> PinnedInstanceData {
        PinnedInstanceData::capture(self, self.environment.as_ref())
    }

    /// Rebind to the native captured from the component this one replaces.
    /// The pin is released whether or not the rebind succeeds.
    pub fn apply_instance_data(&mut self, data: &mut PinnedInstanceData) -> Result<()> {
        if let Err(e) = data.apply_to(self) {
            error!("Steering '{}' could not rebind to {}: {}", self.name, data.native_address(), e);
            return Err(e);
        }
        Ok(())
    }

    /// Copy what the renderer needs. Never carries a native handle.
    pub fn render_data(&self) -> SteeringRenderData {
        let wheel_angle = |wheel: &Option<SharedWheelJoint>| {
            wheel
                .as_ref()
                .map(|wheel| wheel.lock())
                .filter(|wheel| wheel.has_native())
                .map(|wheel| wheel.angle())
                .unwrap_or(0.0)
        };

        SteeringRenderData {
            name: self.name.clone(),
            enabled: self.is_enabled(),
            steering_angle: self.steering_angle(),
            left_wheel_angle: wheel_angle(&self.left_wheel_joint),
            right_wheel_angle: wheel_angle(&self.right_wheel_joint),
        }
    }
}

// ============================================================================
// 2. NativeOwner
// ============================================================================

impl NativeOwner for SteeringComponent {
    fn has_native(&self) -> bool {
        self.native_barrier.has_native()
    }

    fn native_address(&self) -> NativeAddress {
        self.native_barrier.native_address()
    }

    fn set_native_address(&mut self, address: NativeAddress) -> Result<()> {
        let environment = self.environment.clone().ok_or_else(|| {
            BarrierError::Environment(format!(
                "Steering '{}' has no native environment to bind {} in",
                self.name, address
            ))
        })?;
        environment.assert_owner_thread();
        self.native_barrier
            .set_native_address(environment.registry(), address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barrier_core::EnvironmentConfig;

    fn wheel(session: &PlaySession, name: &str) -> SharedWheelJoint {
        let mut barrier = WheelJointBarrier::default();
        barrier.allocate_native(session.registry(), name);
        Arc::new(Mutex::new(barrier))
    }

    #[test]
    fn test_create_native_with_parameters() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let parameters = SteeringParameters::create_asset("Davis", SteeringKind::Davis);
        let mut steering = SteeringComponent::new("FrontAxle", wheel(&session, "L"), wheel(&session, "R"))
            .with_kind(SteeringKind::Davis)
            .with_parameters(parameters.clone());
        steering.set_steering_angle(12.0);

        assert!(steering.create_native(&session));
        let native = steering.get_native().unwrap();
        assert_eq!(native.kind(), SteeringKind::Davis);
        assert_eq!(native.name(), "FrontAxle");
        assert!((native.steering_angle() - 12.0).abs() < 1e-9);
        assert!((native.steering_parameters(session.environment().distance_scale()).lc + 200.0).abs() < 1e-9);
        assert!(parameters.get_instance().is_some());
    }

    #[test]
    fn test_create_native_requires_live_wheels() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let unallocated = Arc::new(Mutex::new(WheelJointBarrier::default()));
        let mut steering = SteeringComponent::new("RearAxle", wheel(&session, "L"), unallocated);

        assert!(!steering.create_native(&session));
        assert!(!steering.has_native());
        assert!(steering.get_native().is_none());
    }

    #[test]
    fn test_create_native_rejects_missing_or_same_wheel() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let mut unset = SteeringComponent::default();
        assert!(!unset.create_native(&session));

        let shared = wheel(&session, "Both");
        let mut same = SteeringComponent::new("Broken", Arc::clone(&shared), shared);
        assert!(!same.create_native(&session));
    }

    #[test]
    fn test_setters_forward_to_native() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let mut steering = SteeringComponent::new("FrontAxle", wheel(&session, "L"), wheel(&session, "R"));
        steering.set_enabled(false);
        assert!(!steering.is_enabled());

        steering.begin_play(&session);
        assert!(steering.has_native());
        assert!(!steering.get_native().unwrap().is_enabled());

        steering.set_enabled(true);
        steering.set_steering_angle(-20.0);
        let native = steering.get_native().unwrap();
        assert!(native.is_enabled());
        assert!((native.steering_angle() + 20.0).abs() < 1e-9);

        steering.end_play(false);
        assert!(!steering.has_native());
        assert!((steering.steering_angle() + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_native_survives_reconstruction() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let left = wheel(&session, "L");
        let right = wheel(&session, "R");

        let mut old = SteeringComponent::new("FrontAxle", Arc::clone(&left), Arc::clone(&right));
        old.begin_play(&session);
        old.set_steering_angle(8.0);
        let address = old.native_address();

        let mut data = old.capture_instance_data();
        assert!(data.contains_data());
        old.end_play(true);
        drop(old);
        assert!(session.registry().is_live(address));

        let mut rebuilt = SteeringComponent::new("FrontAxle", left, right);
        rebuilt.bind_environment(Arc::clone(session.environment()));
        rebuilt.apply_instance_data(&mut data).unwrap();
        rebuilt.apply_instance_data(&mut data).unwrap();

        assert_eq!(rebuilt.native_address(), address);
        assert!((rebuilt.steering_angle() - 8.0).abs() < 1e-9);
        assert_eq!(session.registry().ref_count(address), 0);

        rebuilt.begin_play(&session);
        assert_eq!(rebuilt.native_address(), address);
    }

    #[test]
    fn test_render_data_copies_state() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let mut steering = SteeringComponent::new("FrontAxle", wheel(&session, "L"), wheel(&session, "R"));
        steering.begin_play(&session);
        steering.set_steering_angle(5.0);

        let frame = steering.render_data();
        assert_eq!(frame.name, "FrontAxle");
        assert!(frame.enabled);
        assert!((frame.steering_angle - 5.0).abs() < 1e-9);
        assert_eq!(frame.left_wheel_angle, 0.0);
    }

    #[test]
    fn test_create_native_uses_environment_distance_scale() {
        let env = NativeEnvironment::init(EnvironmentConfig::headless().with_distance_scale(0.001)).unwrap();
        let session = PlaySession::game(env);
        let parameters = SteeringParameters::create_asset("Davis", SteeringKind::Davis);
        let mut steering = SteeringComponent::new("FrontAxle", wheel(&session, "L"), wheel(&session, "R"))
            .with_kind(SteeringKind::Davis)
            .with_parameters(parameters);

        assert!(steering.create_native(&session));
        let native = steering.get_native().unwrap();
        assert!((native.native().read().parameters.l - 0.014).abs() < 1e-12);
        assert!((native.steering_parameters(0.001).l - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_capture_does_not_leak_pins() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let left = wheel(&session, "L");
        let right = wheel(&session, "R");

        let mut old = SteeringComponent::new("FrontAxle", Arc::clone(&left), Arc::clone(&right));
        old.begin_play(&session);
        let address = old.native_address();

        let first = old.capture_instance_data();
        let mut second = old.capture_instance_data();
        assert_eq!(session.registry().ref_count(address), 2);
        drop(first);
        old.end_play(true);
        drop(old);

        let mut rebuilt = SteeringComponent::new("FrontAxle", left, right);
        rebuilt.bind_environment(Arc::clone(session.environment()));
        rebuilt.apply_instance_data(&mut second).unwrap();
        assert_eq!(session.registry().ref_count(address), 0);

        rebuilt.end_play(false);
        drop(rebuilt);
        assert!(!session.registry().is_live(address));
    }

    #[test]
    fn test_failed_apply_releases_pin() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let left = wheel(&session, "L");
        let right = wheel(&session, "R");

        let mut old = SteeringComponent::new("FrontAxle", Arc::clone(&left), Arc::clone(&right));
        old.begin_play(&session);
        let address = old.native_address();
        let mut data = old.capture_instance_data();
        old.end_play(true);
        drop(old);

        // No environment bound, so the rebind cannot resolve the address
        let mut rebuilt = SteeringComponent::new("FrontAxle", left, right);
        assert!(matches!(
            rebuilt.apply_instance_data(&mut data),
            Err(BarrierError::Environment(_))
        ));
        assert!(!rebuilt.has_native());
        assert_eq!(session.registry().ref_count(address), 0);
        assert!(!session.registry().is_live(address));
    }
}
