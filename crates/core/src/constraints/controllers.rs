//! # Secondary Constraint Controllers
//!
//! Host-side controller settings as one tagged type. Applying a controller
//! to a constraint picks the engine controller of the same kind, so there is
//! never a cast between controller types.
//!
//! Rotational values (positions, ranges, speeds) are in radians and cross
//! unchanged. Translational values are host distances and are scaled.

use crate::native::{ControllerDof, ControllerKind, NativeController, NativeControllerCommon};
use crate::units::{distance_to_host_scaled, distance_to_native_scaled};
use serde::{Deserialize, Serialize};

/// Settings shared by every controller kind
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerCommon {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_elasticity")]
    pub elasticity: f64,
    #[serde(default = "default_damping")]
    pub damping: f64,
    #[serde(default = "default_force_range_min")]
    pub force_range_min: f64,
    #[serde(default = "default_force_range_max")]
    pub force_range_max: f64,
}

fn default_elasticity() -> f64 { 1.0e8 }
fn default_damping() -> f64 { 0.0333 }
fn default_force_range_min() -> f64 { f64::NEG_INFINITY }
fn default_force_range_max() -> f64 { f64::INFINITY }

impl Default for ControllerCommon {
    fn default() -> Self {
        Self {
            enabled: false,
            elasticity: default_elasticity(),
            damping: default_damping(),
            force_range_min: default_force_range_min(),
            force_range_max: default_force_range_max(),
        }
    }
}

impl ControllerCommon {
    fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    fn to_native(&self, native: &mut NativeControllerCommon, with_compliance: bool) {
        native.enabled = self.enabled;
        if with_compliance {
            native.elasticity = self.elasticity;
            native.damping = self.damping;
        }
        native.force_range = (self.force_range_min, self.force_range_max);
    }

    fn from_native(native: &NativeControllerCommon) -> Self {
        Self {
            enabled: native.enabled,
            elasticity: native.elasticity,
            damping: native.damping,
            force_range_min: native.force_range.0,
            force_range_max: native.force_range.1,
        }
    }
}

/// Controller settings for one secondary constraint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControllerBarrier {
    ElectricMotor {
        common: ControllerCommon,
        voltage: f64,
        armature_resistance: f64,
        torque_constant: f64,
    },
    Friction {
        common: ControllerCommon,
        friction_coefficient: f64,
        non_linear_direct_solve: bool,
    },
    Lock {
        common: ControllerCommon,
        position: f64,
    },
    Range {
        common: ControllerCommon,
        range_min: f64,
        range_max: f64,
    },
    TargetSpeed {
        common: ControllerCommon,
        speed: f64,
        locked_at_zero_speed: bool,
    },
}

impl ControllerBarrier {
    /// Enabled lock controller holding `position`
    pub fn lock(position: f64) -> Self {
        ControllerBarrier::Lock {
            common: ControllerCommon::enabled(),
            position,
        }
    }

    /// Enabled range controller
    pub fn range(range_min: f64, range_max: f64) -> Self {
        ControllerBarrier::Range {
            common: ControllerCommon::enabled(),
            range_min,
            range_max,
        }
    }

    /// Enabled target speed controller
    pub fn target_speed(speed: f64) -> Self {
        ControllerBarrier::TargetSpeed {
            common: ControllerCommon::enabled(),
            speed,
            locked_at_zero_speed: false,
        }
    }

    /// Enabled friction controller
    pub fn friction(friction_coefficient: f64) -> Self {
        ControllerBarrier::Friction {
            common: ControllerCommon::enabled(),
            friction_coefficient,
            non_linear_direct_solve: false,
        }
    }

    /// Enabled electric motor
    pub fn electric_motor(voltage: f64, armature_resistance: f64, torque_constant: f64) -> Self {
        ControllerBarrier::ElectricMotor {
            common: ControllerCommon::enabled(),
            voltage,
            armature_resistance,
            torque_constant,
        }
    }

    pub fn kind(&self) -> ControllerKind {
        match self {
            ControllerBarrier::ElectricMotor { .. } => ControllerKind::ElectricMotor,
            ControllerBarrier::Friction { .. } => ControllerKind::Friction,
            ControllerBarrier::Lock { .. } => ControllerKind::Lock,
            ControllerBarrier::Range { .. } => ControllerKind::Range,
            ControllerBarrier::TargetSpeed { .. } => ControllerKind::TargetSpeed,
        }
    }

    pub fn common(&self) -> &ControllerCommon {
        match self {
            ControllerBarrier::ElectricMotor { common, .. }
            | ControllerBarrier::Friction { common, .. }
            | ControllerBarrier::Lock { common, .. }
            | ControllerBarrier::Range { common, .. }
            | ControllerBarrier::TargetSpeed { common, .. } => common,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.common().enabled
    }

    /// Write these settings into an engine controller of the same kind.
    /// Returns false, leaving `native` untouched, if the kinds differ.
    pub fn to_native(&self, native: &mut NativeController, dof: ControllerDof, distance_scale: f64) -> bool {
        let to_native = |value: f64| match dof {
            ControllerDof::Rotational => value,
            ControllerDof::Translational => distance_to_native_scaled(value, distance_scale),
        };

        match (self, native) {
            (
                ControllerBarrier::ElectricMotor {
                    common,
                    voltage,
                    armature_resistance,
                    torque_constant,
                },
                NativeController::ElectricMotor {
                    common: native_common,
                    voltage: native_voltage,
                    armature_resistance: native_resistance,
                    torque_constant: native_torque_constant,
                },
            ) => {
                // Electric motors have no compliance of their own.
                common.to_native(native_common, false);
                *native_voltage = *voltage;
                *native_resistance = *armature_resistance;
                *native_torque_constant = *torque_constant;
            }
            (
                ControllerBarrier::Friction {
                    common,
                    friction_coefficient,
                    non_linear_direct_solve,
                },
                NativeController::Friction {
                    common: native_common,
                    friction_coefficient: native_coefficient,
                    non_linear_direct_solve: native_direct_solve,
                },
            ) => {
                common.to_native(native_common, true);
                *native_coefficient = *friction_coefficient;
                *native_direct_solve = *non_linear_direct_solve;
            }
            (
                ControllerBarrier::Lock { common, position },
                NativeController::Lock {
                    common: native_common,
                    position: native_position,
                },
            ) => {
                common.to_native(native_common, true);
                *native_position = to_native(*position);
            }
            (
                ControllerBarrier::Range {
                    common,
                    range_min,
                    range_max,
                },
                NativeController::Range {
                    common: native_common,
                    range: native_range,
                },
            ) => {
                common.to_native(native_common, true);
                *native_range = (to_native(*range_min), to_native(*range_max));
            }
            (
                ControllerBarrier::TargetSpeed {
                    common,
                    speed,
                    locked_at_zero_speed,
                },
                NativeController::TargetSpeed {
                    common: native_common,
                    speed: native_speed,
                    locked_at_zero_speed: native_locked,
                },
            ) => {
                common.to_native(native_common, true);
                *native_speed = to_native(*speed);
                *native_locked = *locked_at_zero_speed;
            }
            (barrier, native) => {
                tracing::warn!(
                    "Cannot apply {:?} controller settings to a {:?} controller",
                    barrier.kind(),
                    native.kind()
                );
                return false;
            }
        }
        true
    }

    /// Read an engine controller back into host-side settings
    pub fn from_native(native: &NativeController, dof: ControllerDof, distance_scale: f64) -> Self {
        let to_host = |value: f64| match dof {
            ControllerDof::Rotational => value,
            ControllerDof::Translational => distance_to_host_scaled(value, distance_scale),
        };

        match native {
            NativeController::ElectricMotor {
                common,
                voltage,
                armature_resistance,
                torque_constant,
            } => ControllerBarrier::ElectricMotor {
                common: ControllerCommon::from_native(common),
                voltage: *voltage,
                armature_resistance: *armature_resistance,
                torque_constant: *torque_constant,
            },
            NativeController::Friction {
                common,
                friction_coefficient,
                non_linear_direct_solve,
            } => ControllerBarrier::Friction {
                common: ControllerCommon::from_native(common),
                friction_coefficient: *friction_coefficient,
                non_linear_direct_solve: *non_linear_direct_solve,
            },
            NativeController::Lock { common, position } => ControllerBarrier::Lock {
                common: ControllerCommon::from_native(common),
                position: to_host(*position),
            },
            NativeController::Range { common, range } => ControllerBarrier::Range {
                common: ControllerCommon::from_native(common),
                range_min: to_host(range.0),
                range_max: to_host(range.1),
            },
            NativeController::TargetSpeed {
                common,
                speed,
                locked_at_zero_speed,
            } => ControllerBarrier::TargetSpeed {
                common: ControllerCommon::from_native(common),
                speed: to_host(*speed),
                locked_at_zero_speed: *locked_at_zero_speed,
            },
        }
    }
}
