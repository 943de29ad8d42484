//! # Constraints
//!
//! Barrier for single-DOF constraints (hinge, prismatic) and the controller
//! plumbing shared with the wheel joint barrier.
//!
//! ## Table of Contents
//! 1. Controller access on engine constraints
//! 2. ConstraintBarrier

pub mod controllers;

pub use controllers::{ControllerBarrier, ControllerCommon};

use crate::barrier::NativeBarrier;
use crate::handle::{NativeHandle, NativeRef};
use crate::native::{ConstraintKind, ConstraintNative, ControllerDof, ControllerKind, WheelJointSecondary};
use crate::registry::NativeRegistry;
use uuid::Uuid;

// ============================================================================
// 1. Controller Access
// ============================================================================

/// Apply `controller` to the engine controller of the same kind on the
/// given secondary constraint. Returns false if there is no such controller.
pub(crate) fn apply_controller(
    native: &NativeHandle<ConstraintNative>,
    secondary: Option<WheelJointSecondary>,
    controller: &ControllerBarrier,
    distance_scale: f64,
) -> bool {
    let mut constraint = native.write();
    match constraint.controller_mut(secondary, controller.kind()) {
        Some(slot) => controller.to_native(&mut slot.controller, slot.dof, distance_scale),
        None => {
            tracing::warn!(
                "Constraint '{}' has no {:?} controller on {:?}",
                constraint.name,
                controller.kind(),
                secondary
            );
            false
        }
    }
}

/// Read the engine controller of `kind` on the given secondary constraint
pub(crate) fn read_controller(
    native: &NativeHandle<ConstraintNative>,
    secondary: Option<WheelJointSecondary>,
    kind: ControllerKind,
    distance_scale: f64,
) -> Option<ControllerBarrier> {
    let constraint = native.read();
    constraint
        .controller(secondary, kind)
        .map(|slot| ControllerBarrier::from_native(&slot.controller, slot.dof, distance_scale))
}

// ============================================================================
// 2. ConstraintBarrier
// ============================================================================

/// Barrier for a hinge or prismatic constraint. Unique ownership.
#[derive(Debug, Default)]
pub struct ConstraintBarrier {
    native: NativeRef<ConstraintNative>,
}

impl NativeBarrier for ConstraintBarrier {
    type Native = ConstraintNative;
    const KIND: &'static str = "ConstraintBarrier";

    fn native_ref(&self) -> &NativeRef<ConstraintNative> {
        &self.native
    }

    fn native_ref_mut(&mut self) -> &mut NativeRef<ConstraintNative> {
        &mut self.native
    }
}

impl ConstraintBarrier {
    /// Adopt an existing engine constraint
    pub fn from_native(native: NativeHandle<ConstraintNative>) -> Self {
        Self {
            native: NativeRef::new(native),
        }
    }

    pub fn allocate_hinge(&mut self, registry: &NativeRegistry, name: &str) {
        self.store_native(registry, ConstraintNative::new(ConstraintKind::Hinge, name));
    }

    pub fn allocate_prismatic(&mut self, registry: &NativeRegistry, name: &str) {
        self.store_native(registry, ConstraintNative::new(ConstraintKind::Prismatic, name));
    }

    pub fn constraint_kind(&self) -> ConstraintKind {
        self.native().read().kind
    }

    /// Degree of freedom the constraint's controllers act on
    pub fn dof(&self) -> ControllerDof {
        match self.constraint_kind() {
            ConstraintKind::Prismatic => ControllerDof::Translational,
            ConstraintKind::Hinge | ConstraintKind::WheelJoint => ControllerDof::Rotational,
        }
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

    /// Apply controller settings. Translational values are scaled by
    /// `distance_scale`.
    pub fn apply_controller(&mut self, controller: &ControllerBarrier, distance_scale: f64) -> bool {
        apply_controller(self.native(), None, controller, distance_scale)
    }

    pub fn controller(&self, kind: ControllerKind, distance_scale: f64) -> Option<ControllerBarrier> {
        read_controller(self.native(), None, kind, distance_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::DEFAULT_DISTANCE_SCALE;

    #[test]
    fn test_prismatic_controllers_are_translational() {
        let registry = NativeRegistry::new();
        let mut slider = ConstraintBarrier::default();
        slider.allocate_prismatic(&registry, "Slider");
        assert_eq!(slider.dof(), ControllerDof::Translational);

        assert!(slider.apply_controller(&ControllerBarrier::range(-50.0, 50.0), DEFAULT_DISTANCE_SCALE));

        let native_range = match &slider.native().read().controller(None, ControllerKind::Range).unwrap().controller {
            crate::native::NativeController::Range { range, .. } => *range,
            other => panic!("unexpected controller {:?}", other),
        };
        assert!((native_range.0 + 0.5).abs() < 1e-12);
        assert!((native_range.1 - 0.5).abs() < 1e-12);

        let read_back = slider.controller(ControllerKind::Range, DEFAULT_DISTANCE_SCALE).unwrap();
        assert_eq!(read_back.kind(), ControllerKind::Range);
        assert!(read_back.is_enabled());
    }

    #[test]
    fn test_hinge_accessors() {
        let registry = NativeRegistry::new();
        let mut hinge = ConstraintBarrier::default();
        hinge.allocate_hinge(&registry, "Door");

        assert_eq!(hinge.constraint_kind(), ConstraintKind::Hinge);
        assert_eq!(hinge.name(), "Door");
        hinge.set_name("Gate");
        hinge.set_enabled(false);
        assert_eq!(hinge.name(), "Gate");
        assert!(!hinge.is_enabled());

        assert!(hinge.apply_controller(&ControllerBarrier::target_speed(1.25), DEFAULT_DISTANCE_SCALE));
        match hinge.controller(ControllerKind::TargetSpeed, DEFAULT_DISTANCE_SCALE) {
            Some(ControllerBarrier::TargetSpeed { speed, .. }) => assert_eq!(speed, 1.25),
            other => panic!("unexpected controller {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "before AllocateNative")]
    fn test_controller_on_empty_barrier_panics() {
        let mut hinge = ConstraintBarrier::default();
        hinge.apply_controller(&ControllerBarrier::lock(0.0), DEFAULT_DISTANCE_SCALE);
    }
}
