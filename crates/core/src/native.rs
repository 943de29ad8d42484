//! # Engine-Side Objects
//!
//! The objects barriers allocate and forward to. They belong to the native
//! engine: values are stored in native units (meters, radians) and nothing
//! here knows about the host. The engine's solver is not part of this
//! crate, so these are plain state holders.
//!
//! ## Table of Contents
//! 1. Constraints and controllers
//! 2. Steering
//! 3. Terrain wheel material

use crate::handle::NativeHandle;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// 1. Constraints and Controllers
// ============================================================================

/// Kind of constraint an engine constraint object was created as
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    Hinge,
    Prismatic,
    WheelJoint,
}

/// Degree of freedom a controller acts on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerDof {
    Rotational,
    Translational,
}

/// Secondary constraints of a wheel joint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelJointSecondary {
    /// Rotation about the steering axis
    Steering,
    /// Rotation about the wheel axle
    Wheel,
    /// Translation along the suspension axis
    Suspension,
}

impl WheelJointSecondary {
    pub const ALL: [WheelJointSecondary; 3] = [
        WheelJointSecondary::Steering,
        WheelJointSecondary::Wheel,
        WheelJointSecondary::Suspension,
    ];

    pub fn dof(self) -> ControllerDof {
        match self {
            WheelJointSecondary::Steering | WheelJointSecondary::Wheel => ControllerDof::Rotational,
            WheelJointSecondary::Suspension => ControllerDof::Translational,
        }
    }
}

/// Kind of secondary constraint controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerKind {
    ElectricMotor,
    Friction,
    Lock,
    Range,
    TargetSpeed,
}

impl ControllerKind {
    pub const ALL: [ControllerKind; 5] = [
        ControllerKind::ElectricMotor,
        ControllerKind::Friction,
        ControllerKind::Lock,
        ControllerKind::Range,
        ControllerKind::TargetSpeed,
    ];
}

/// Settings every controller has
#[derive(Clone, Debug, PartialEq)]
pub struct NativeControllerCommon {
    pub enabled: bool,
    pub elasticity: f64,
    pub damping: f64,
    pub force_range: (f64, f64),
}

impl Default for NativeControllerCommon {
    fn default() -> Self {
        Self {
            enabled: false,
            elasticity: 1.0e8,
            damping: 0.0333,
            force_range: (f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}

/// An engine-side secondary constraint controller
#[derive(Clone, Debug, PartialEq)]
pub enum NativeController {
    ElectricMotor {
        common: NativeControllerCommon,
        voltage: f64,
        armature_resistance: f64,
        torque_constant: f64,
    },
    Friction {
        common: NativeControllerCommon,
        friction_coefficient: f64,
        non_linear_direct_solve: bool,
    },
    Lock {
        common: NativeControllerCommon,
        position: f64,
    },
    Range {
        common: NativeControllerCommon,
        range: (f64, f64),
    },
    TargetSpeed {
        common: NativeControllerCommon,
        speed: f64,
        locked_at_zero_speed: bool,
    },
}

impl NativeController {
    /// A disabled controller of the given kind with engine defaults
    pub fn new(kind: ControllerKind) -> Self {
        let common = NativeControllerCommon::default();
        match kind {
            ControllerKind::ElectricMotor => NativeController::ElectricMotor {
                common,
                voltage: 24.0,
                armature_resistance: 1.0,
                torque_constant: 1.0,
            },
            ControllerKind::Friction => NativeController::Friction {
                common,
                friction_coefficient: 0.4167,
                non_linear_direct_solve: false,
            },
            ControllerKind::Lock => NativeController::Lock {
                common,
                position: 0.0,
            },
            ControllerKind::Range => NativeController::Range {
                common,
                range: (f64::NEG_INFINITY, f64::INFINITY),
            },
            ControllerKind::TargetSpeed => NativeController::TargetSpeed {
                common,
                speed: 0.0,
                locked_at_zero_speed: false,
            },
        }
    }

    pub fn kind(&self) -> ControllerKind {
        match self {
            NativeController::ElectricMotor { .. } => ControllerKind::ElectricMotor,
            NativeController::Friction { .. } => ControllerKind::Friction,
            NativeController::Lock { .. } => ControllerKind::Lock,
            NativeController::Range { .. } => ControllerKind::Range,
            NativeController::TargetSpeed { .. } => ControllerKind::TargetSpeed,
        }
    }

    pub fn common(&self) -> &NativeControllerCommon {
        match self {
            NativeController::ElectricMotor { common, .. }
            | NativeController::Friction { common, .. }
            | NativeController::Lock { common, .. }
            | NativeController::Range { common, .. }
            | NativeController::TargetSpeed { common, .. } => common,
        }
    }

    pub fn common_mut(&mut self) -> &mut NativeControllerCommon {
        match self {
            NativeController::ElectricMotor { common, .. }
            | NativeController::Friction { common, .. }
            | NativeController::Lock { common, .. }
            | NativeController::Range { common, .. }
            | NativeController::TargetSpeed { common, .. } => common,
        }
    }
}

/// One controller attached to a constraint
#[derive(Clone, Debug)]
pub struct ControllerSlot {
    /// Wheel joint secondary constraint, `None` for single-DOF constraints
    pub secondary: Option<WheelJointSecondary>,
    pub dof: ControllerDof,
    pub controller: NativeController,
}

/// An engine-side constraint
#[derive(Clone, Debug)]
pub struct ConstraintNative {
    pub kind: ConstraintKind,
    pub name: String,
    pub uuid: Uuid,
    pub enabled: bool,
    /// Current angle or position along the primary DOF, native units
    pub angle: f64,
    pub controllers: Vec<ControllerSlot>,
}

impl ConstraintNative {
    /// A constraint with one controller of every kind on each of its DOFs
    pub fn new(kind: ConstraintKind, name: impl Into<String>) -> Self {
        let slots: Vec<(Option<WheelJointSecondary>, ControllerDof)> = match kind {
            ConstraintKind::Hinge => vec![(None, ControllerDof::Rotational)],
            ConstraintKind::Prismatic => vec![(None, ControllerDof::Translational)],
            ConstraintKind::WheelJoint => WheelJointSecondary::ALL
                .into_iter()
                .map(|secondary| (Some(secondary), secondary.dof()))
                .collect(),
        };

        let controllers = slots
            .into_iter()
            .flat_map(|(secondary, dof)| {
                ControllerKind::ALL.into_iter().map(move |kind| ControllerSlot {
                    secondary,
                    dof,
                    controller: NativeController::new(kind),
                })
            })
            .collect();

        Self {
            kind,
            name: name.into(),
            uuid: Uuid::new_v4(),
            enabled: true,
            angle: 0.0,
            controllers,
        }
    }

    /// Find the controller of `kind` on the given secondary constraint
    pub fn controller_mut(
        &mut self,
        secondary: Option<WheelJointSecondary>,
        kind: ControllerKind,
    ) -> Option<&mut ControllerSlot> {
        self.controllers
            .iter_mut()
            .find(|slot| slot.secondary == secondary && slot.controller.kind() == kind)
    }

    pub fn controller(
        &self,
        secondary: Option<WheelJointSecondary>,
        kind: ControllerKind,
    ) -> Option<&ControllerSlot> {
        self.controllers
            .iter()
            .find(|slot| slot.secondary == secondary && slot.controller.kind() == kind)
    }
}

// ============================================================================
// 2. Steering
// ============================================================================

/// Steering linkage mechanism
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SteeringKind {
    #[default]
    Ackermann,
    BellCrank,
    Davis,
    RackPinion,
}

/// Steering geometry in native units
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NativeSteeringParameters {
    pub phi0: f64,
    pub l: f64,
    pub alpha0: f64,
    pub lc: f64,
    pub lr: f64,
    pub gear: f64,
    pub side: u32,
}

/// An engine-side steering mechanism linking two wheel joints
#[derive(Debug)]
pub struct SteeringNative {
    pub kind: SteeringKind,
    pub left: NativeHandle<ConstraintNative>,
    pub right: NativeHandle<ConstraintNative>,
    pub parameters: NativeSteeringParameters,
    pub enabled: bool,
    pub steering_angle: f64,
    pub name: String,
    pub uuid: Uuid,
}

// ============================================================================
// 3. Terrain Wheel Material
// ============================================================================

/// Terramechanics parameters for wheel/terrain contacts, native units
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainWheelMaterialNative {
    pub sinkage_exponent_a: f64,
    pub sinkage_exponent_b: f64,
    pub cohesion: f64,
    /// Radians
    pub angle_of_internal_friction: f64,
    pub shear_modulus_x_a: f64,
    pub shear_modulus_x_b: f64,
    pub shear_modulus_y_a: f64,
    pub shear_modulus_y_b: f64,
    pub cohesive_modulus_bekker: f64,
    pub frictional_modulus_bekker: f64,
    pub cohesive_modulus_reece: f64,
    pub frictional_modulus_reece: f64,
    pub mass_density: f64,
    pub max_normal_stress_angle_a: f64,
    pub max_normal_stress_angle_b: f64,
    pub rear_angle_a: f64,
    pub rear_angle_b: f64,
}
