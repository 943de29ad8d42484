//! # Vehicle Barriers
//!
//! Wheel joints and the steering mechanisms that link a pair of them.

pub mod steering;
pub mod wheel_joint;

pub use steering::{SteeringBarrier, SteeringParametersData};
pub use wheel_joint::WheelJointBarrier;
