//! Wheel joint barrier: a constraint with steering, wheel and suspension
//! secondary constraints.

use crate::barrier::NativeBarrier;
use crate::constraints::{apply_controller, read_controller, ControllerBarrier};
use crate::handle::{NativeHandle, NativeRef};
use crate::native::{ConstraintKind, ConstraintNative, ControllerKind, WheelJointSecondary};
use crate::registry::NativeRegistry;
use crate::units::angle_to_host;
use uuid::Uuid;

/// Barrier for a wheel joint. Unique ownership: not `Clone`.
#[derive(Debug, Default)]
pub struct WheelJointBarrier {
    native: NativeRef<ConstraintNative>,
}

impl NativeBarrier for WheelJointBarrier {
    type Native = ConstraintNative;
    const KIND: &'static str = "WheelJointBarrier";

    fn native_ref(&self) -> &NativeRef<ConstraintNative> {
        &self.native
    }

    fn native_ref_mut(&mut self) -> &mut NativeRef<ConstraintNative> {
        &mut self.native
    }
}

impl WheelJointBarrier {
    /// Adopt an existing engine wheel joint
    pub fn from_native(native: NativeHandle<ConstraintNative>) -> Self {
        Self {
            native: NativeRef::new(native),
        }
    }

    pub fn allocate_native(&mut self, registry: &NativeRegistry, name: &str) {
        self.store_native(registry, ConstraintNative::new(ConstraintKind::WheelJoint, name));
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.native().write().enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.native().read().enabled
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

    /// Steering angle of the joint in degrees
    pub fn angle(&self) -> f64 {
        angle_to_host(self.native().read().angle)
    }

    pub fn apply_controller(
        &mut self,
        secondary: WheelJointSecondary,
        controller: &ControllerBarrier,
        distance_scale: f64,
    ) -> bool {
        apply_controller(self.native(), Some(secondary), controller, distance_scale)
    }

    pub fn lock_controller(&self, secondary: WheelJointSecondary, distance_scale: f64) -> Option<ControllerBarrier> {
        read_controller(self.native(), Some(secondary), ControllerKind::Lock, distance_scale)
    }

    pub fn range_controller(&self, secondary: WheelJointSecondary, distance_scale: f64) -> Option<ControllerBarrier> {
        read_controller(self.native(), Some(secondary), ControllerKind::Range, distance_scale)
    }

    pub fn target_speed_controller(
        &self,
        secondary: WheelJointSecondary,
        distance_scale: f64,
    ) -> Option<ControllerBarrier> {
        read_controller(self.native(), Some(secondary), ControllerKind::TargetSpeed, distance_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeController;
    use crate::units::DEFAULT_DISTANCE_SCALE;

    #[test]
    fn test_allocate_and_accessors() {
        let registry = NativeRegistry::new();
        let mut wheel = WheelJointBarrier::default();
        assert!(!wheel.has_native());

        wheel.allocate_native(&registry, "FrontLeft");
        assert!(wheel.has_native());
        assert_eq!(wheel.name(), "FrontLeft");
        assert!(wheel.is_enabled());
        assert_eq!(wheel.angle(), 0.0);

        wheel.native().write().angle = std::f64::consts::FRAC_PI_4;
        assert!((wheel.angle() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_suspension_range_is_translational() {
        let registry = NativeRegistry::new();
        let mut wheel = WheelJointBarrier::default();
        wheel.allocate_native(&registry, "RearRight");

        assert!(wheel.apply_controller(
            WheelJointSecondary::Suspension,
            &ControllerBarrier::range(-10.0, 20.0),
            DEFAULT_DISTANCE_SCALE,
        ));
        assert!(wheel.apply_controller(
            WheelJointSecondary::Steering,
            &ControllerBarrier::range(-0.6, 0.6),
            DEFAULT_DISTANCE_SCALE,
        ));

        let native = wheel.native().read();
        let suspension = native
            .controller(Some(WheelJointSecondary::Suspension), ControllerKind::Range)
            .unwrap();
        match &suspension.controller {
            NativeController::Range { range, .. } => {
                assert!((range.0 + 0.1).abs() < 1e-12);
                assert!((range.1 - 0.2).abs() < 1e-12);
            }
            other => panic!("unexpected controller {:?}", other),
        }
        let steering = native
            .controller(Some(WheelJointSecondary::Steering), ControllerKind::Range)
            .unwrap();
        match &steering.controller {
            NativeController::Range { range, .. } => assert_eq!(*range, (-0.6, 0.6)),
            other => panic!("unexpected controller {:?}", other),
        }
    }

    #[test]
    fn test_read_back_controllers() {
        let registry = NativeRegistry::new();
        let mut wheel = WheelJointBarrier::default();
        wheel.allocate_native(&registry, "FrontRight");
        wheel.apply_controller(
            WheelJointSecondary::Wheel,
            &ControllerBarrier::target_speed(12.0),
            DEFAULT_DISTANCE_SCALE,
        );

        let speed = wheel
            .target_speed_controller(WheelJointSecondary::Wheel, DEFAULT_DISTANCE_SCALE)
            .unwrap();
        assert!(speed.is_enabled());
        assert!(!wheel
            .lock_controller(WheelJointSecondary::Wheel, DEFAULT_DISTANCE_SCALE)
            .unwrap()
            .is_enabled());
        assert!(wheel
            .range_controller(WheelJointSecondary::Suspension, DEFAULT_DISTANCE_SCALE)
            .is_some());
    }

    #[test]
    #[should_panic(expected = "WheelJointBarrier")]
    fn test_angle_without_native_panics() {
        let wheel = WheelJointBarrier::default();
        wheel.angle();
    }
}
