//! # Terrain Barriers

pub mod wheel_material;

pub use wheel_material::TerrainWheelMaterialBarrier;
