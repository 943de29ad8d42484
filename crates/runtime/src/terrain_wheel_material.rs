//! # Terrain Wheel Material Asset
//!
//! Terramechanics parameters for wheel/terrain contact. Runtime instances
//! own a shared [`TerrainWheelMaterialBarrier`].

use crate::asset::{Asset, AssetData};
use crate::dispatch::PropertyDispatcher;
use crate::dispatch_field;
use barrier_core::{NativeEnvironment, Result, TerrainWheelMaterialBarrier};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Terrain wheel material asset data. Values are in engine units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainWheelMaterial {
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

impl Default for TerrainWheelMaterial {
    fn default() -> Self {
        Self {
            sinkage_exponent_a: 1.0,
            sinkage_exponent_b: 0.0,
            cohesion: 800.0,
            angle_of_internal_friction: 0.611,
            shear_modulus_x_a: 0.036,
            shear_modulus_x_b: 0.043,
            shear_modulus_y_a: 0.013,
            shear_modulus_y_b: 0.020,
            cohesive_modulus_bekker: 1000.0,
            frictional_modulus_bekker: 800_000.0,
            cohesive_modulus_reece: 670.0,
            frictional_modulus_reece: 200.0,
            mass_density: 1500.0,
            max_normal_stress_angle_a: 0.4,
            max_normal_stress_angle_b: 0.15,
            rear_angle_a: -0.12,
            rear_angle_b: 0.0,
        }
    }
}

/// Invoke `$m!` with every (field, barrier setter) pair
macro_rules! for_each_property {
    ($m:ident) => {
        $m! {
            sinkage_exponent_a => set_sinkage_exponent_a,
            sinkage_exponent_b => set_sinkage_exponent_b,
            cohesion => set_cohesion,
            angle_of_internal_friction => set_angle_of_internal_friction,
            shear_modulus_x_a => set_shear_modulus_x_a,
            shear_modulus_x_b => set_shear_modulus_x_b,
            shear_modulus_y_a => set_shear_modulus_y_a,
            shear_modulus_y_b => set_shear_modulus_y_b,
            cohesive_modulus_bekker => set_cohesive_modulus_bekker,
            frictional_modulus_bekker => set_frictional_modulus_bekker,
            cohesive_modulus_reece => set_cohesive_modulus_reece,
            frictional_modulus_reece => set_frictional_modulus_reece,
            mass_density => set_mass_density,
            max_normal_stress_angle_a => set_max_normal_stress_angle_a,
            max_normal_stress_angle_b => set_max_normal_stress_angle_b,
            rear_angle_a => set_rear_angle_a,
            rear_angle_b => set_rear_angle_b
        }
    };
}

impl AssetData for TerrainWheelMaterial {
    type Barrier = TerrainWheelMaterialBarrier;
    const TYPE_NAME: &'static str = "TerrainWheelMaterial";

    fn allocate_native(&self, barrier: &mut TerrainWheelMaterialBarrier, environment: &NativeEnvironment) -> Result<()> {
        barrier.allocate_native(environment.registry());
        Ok(())
    }

    fn update_native_properties(&self, barrier: &mut TerrainWheelMaterialBarrier) {
        let data = self;
        macro_rules! push {
            ($($field:ident => $setter:ident),*) => {
                $(barrier.$setter(data.$field);)*
            };
        }
        for_each_property!(push);
    }

    fn copy_from_native(&mut self, barrier: &TerrainWheelMaterialBarrier) {
        let data = self;
        macro_rules! pull {
            ($($field:ident => $setter:ident),*) => {
                $(data.$field = barrier.$field();)*
            };
        }
        for_each_property!(pull);
    }

    fn dispatcher() -> Option<&'static PropertyDispatcher<Self>> {
        static DISPATCHER: OnceLock<PropertyDispatcher<TerrainWheelMaterial>> = OnceLock::new();
        Some(DISPATCHER.get_or_init(|| {
            let dispatcher: PropertyDispatcher<TerrainWheelMaterial> = PropertyDispatcher::new();
            macro_rules! register {
                ($($field:ident => $setter:ident),*) => {{
                    $(let dispatcher = dispatch_field!(dispatcher, $field => $setter);)*
                    dispatcher
                }};
            }
            for_each_property!(register)
        }))
    }
}

impl TerrainWheelMaterial {
    /// New asset with typical soil values
    pub fn create_asset(name: impl Into<String>) -> Asset<Self> {
        Asset::new(name, Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PlaySession;
    use barrier_core::NativeBarrier;

    #[test]
    fn test_native_receives_every_field() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let asset = TerrainWheelMaterial::create_asset("Sand");

        let barrier = asset.get_or_create_native(Some(&session)).unwrap();
        assert!(barrier.has_native());
        assert_eq!(barrier.cohesion(), 800.0);
        assert_eq!(barrier.frictional_modulus_bekker(), 800_000.0);
        assert_eq!(barrier.rear_angle_a(), -0.12);
        assert_eq!(barrier.angle_of_internal_friction(), 0.611);
    }

    #[test]
    fn test_commit_reads_back_native() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let asset = TerrainWheelMaterial::create_asset("Clay");

        let mut barrier = asset.get_or_create_native(Some(&session)).unwrap();
        barrier.set_mass_density(1800.0);
        barrier.set_cohesion(1200.0);

        asset.commit_to_asset();
        assert_eq!(asset.data().mass_density, 1800.0);
        assert_eq!(asset.data().cohesion, 1200.0);
        assert_eq!(asset.data().shear_modulus_x_a, 0.036);
    }

    #[test]
    fn test_post_edit_change_reaches_native() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let asset = TerrainWheelMaterial::create_asset("Gravel");
        let barrier = asset.get_or_create_native(Some(&session)).unwrap();

        asset.edit(|data| data.cohesion = 950.0);
        assert_eq!(barrier.cohesion(), 800.0);

        assert!(asset.post_edit_change("cohesion"));
        assert_eq!(barrier.cohesion(), 950.0);
        assert_eq!(asset.get_instance().unwrap().data().cohesion, 950.0);
        assert!(!asset.post_edit_change("not_a_property"));
    }

    #[test]
    fn test_post_edit_change_without_instance() {
        let asset = TerrainWheelMaterial::create_asset("Loam");
        asset.edit(|data| data.mass_density = 1300.0);
        assert!(asset.post_edit_change("mass_density"));
        assert_eq!(asset.data().mass_density, 1300.0);
    }

    #[test]
    fn test_dispatcher_covers_every_field() {
        let dispatcher = TerrainWheelMaterial::dispatcher().unwrap();
        assert_eq!(dispatcher.len(), 17);
        assert!(dispatcher.contains("mass_density"));
        assert!(dispatcher.contains("rear_angle_b"));
    }
}
