//! # barrier-runtime
//!
//! Host-side wrappers over `barrier-core`: the asset/instance duplication
//! protocol, play sessions, component wrappers and property-change dispatch.
//!
//! ## Features
//! - `Asset<T>`: design-time asset with a lazily created runtime instance
//! - `PlaySession`: runtime context owning the instances made for it
//! - `PropertyDispatcher`: per-type property-change propagation
//! - `SteeringComponent`, `SteeringParameters`, `TerrainWheelMaterial`
//! - Render-thread handoff through copied frames
//! - `bevy` feature: `NativeBarrierPlugin`
//!
//! ## Table of Contents
//! 1. Sessions (`session`)
//! 2. Asset protocol (`asset`)
//! 3. Property dispatch (`dispatch`)
//! 4. Wrappers (`steering_parameters`, `terrain_wheel_material`, `steering`)
//! 5. Render proxy (`render_proxy`)
//! 6. Plugin (`plugin`, feature `bevy`)

mod asset;
mod dispatch;
#[cfg(feature = "bevy")]
mod plugin;
mod render_proxy;
mod session;
mod steering;
mod steering_parameters;
mod terrain_wheel_material;

pub use asset::*;
pub use dispatch::*;
#[cfg(feature = "bevy")]
pub use plugin::*;
pub use render_proxy::*;
pub use session::*;
pub use steering::*;
pub use steering_parameters::*;
pub use terrain_wheel_material::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::asset::{Asset, AssetData, NoNative, Outer};
    pub use crate::dispatch::PropertyDispatcher;
    #[cfg(feature = "bevy")]
    pub use crate::plugin::{ActiveSession, NativeBarrierPlugin, NativeEnvironmentResource};
    pub use crate::render_proxy::{render_proxy_channel, RenderProxyReceiver, RenderProxySender, SteeringRenderData};
    pub use crate::session::{PlaySession, SessionKind};
    pub use crate::steering::{SharedWheelJoint, SteeringComponent};
    pub use crate::steering_parameters::SteeringParameters;
    pub use crate::terrain_wheel_material::TerrainWheelMaterial;
    pub use barrier_core::prelude::*;
}
