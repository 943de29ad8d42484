//! # barrier-core
//!
//! Ownership layer between a host engine's objects and the objects of a
//! native physics engine. Every engine object is reached through a barrier
//! holding exactly one handle to it.
//!
//! ## Features
//! - `NativeBarrier`: shared lifecycle (allocate, release, address rebind)
//! - `NativeRegistry`: engine-side object table with type-checked lookup
//! - `NativeEnvironment`: engine context with resource discovery
//! - Concrete barriers for wheel joints, steering, constraints and
//!   terrain wheel materials
//! - `NativeOwnerInstanceData`, `PinnedInstanceData`: native rebinding across host reconstruction
//!
//! ## Table of Contents
//! 1. Error types (`error`)
//! 2. Addresses and handles (`address`, `handle`)
//! 3. Registry (`registry`)
//! 4. Barrier contract (`barrier`)
//! 5. Environment and configuration (`environment`, `config`)
//! 6. Unit conversion (`units`)
//! 7. Engine objects (`native`)
//! 8. Concrete barriers (`constraints`, `vehicle`, `terrain`)
//! 9. Instance data (`instance_data`)

pub mod address;
pub mod barrier;
pub mod config;
pub mod constraints;
pub mod environment;
pub mod error;
pub mod handle;
pub mod instance_data;
pub mod native;
pub mod registry;
pub mod terrain;
pub mod units;
pub mod vehicle;

pub use address::NativeAddress;
pub use barrier::NativeBarrier;
pub use config::EnvironmentConfig;
pub use constraints::{ConstraintBarrier, ControllerBarrier, ControllerCommon};
pub use environment::NativeEnvironment;
pub use error::{BarrierError, Result};
pub use handle::{NativeHandle, NativeRef};
pub use instance_data::{NativeOwner, NativeOwnerInstanceData, NativePin, PinnedInstanceData};
pub use registry::NativeRegistry;
pub use terrain::TerrainWheelMaterialBarrier;
pub use vehicle::{SteeringBarrier, SteeringParametersData, WheelJointBarrier};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::address::NativeAddress;
    pub use crate::barrier::NativeBarrier;
    pub use crate::config::EnvironmentConfig;
    pub use crate::constraints::{ConstraintBarrier, ControllerBarrier, ControllerCommon};
    pub use crate::environment::NativeEnvironment;
    pub use crate::error::{BarrierError, Result};
    pub use crate::handle::{NativeHandle, NativeRef};
    pub use crate::instance_data::{NativeOwner, NativeOwnerInstanceData, PinnedInstanceData};
    pub use crate::native::{ControllerDof, ControllerKind, SteeringKind, WheelJointSecondary};
    pub use crate::registry::NativeRegistry;
    pub use crate::terrain::TerrainWheelMaterialBarrier;
    pub use crate::vehicle::{SteeringBarrier, SteeringParametersData, WheelJointBarrier};
}
