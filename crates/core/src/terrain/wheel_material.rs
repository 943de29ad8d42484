//! Terrain wheel material barrier.
//!
//! Terramechanics parameters are given in engine units on both sides, so
//! every accessor forwards the value unchanged.

use crate::barrier::NativeBarrier;
use crate::handle::{NativeHandle, NativeRef};
use crate::native::TerrainWheelMaterialNative;
use crate::registry::NativeRegistry;

/// Barrier for a terrain wheel material. Shared ownership.
#[derive(Clone, Debug, Default)]
pub struct TerrainWheelMaterialBarrier {
    native: NativeRef<TerrainWheelMaterialNative>,
}

impl NativeBarrier for TerrainWheelMaterialBarrier {
    type Native = TerrainWheelMaterialNative;
    const KIND: &'static str = "TerrainWheelMaterialBarrier";

    fn native_ref(&self) -> &NativeRef<TerrainWheelMaterialNative> {
        &self.native
    }

    fn native_ref_mut(&mut self) -> &mut NativeRef<TerrainWheelMaterialNative> {
        &mut self.native
    }
}

macro_rules! material_property {
    ($($field:ident => $setter:ident;)*) => {
        $(
            pub fn $setter(&mut self, value: f64) {
                self.native().write().$field = value;
            }

            pub fn $field(&self) -> f64 {
                self.native().read().$field
            }
        )*
    };
}

impl TerrainWheelMaterialBarrier {
    /// Adopt an existing engine material
    pub fn from_native(native: NativeHandle<TerrainWheelMaterialNative>) -> Self {
        Self {
            native: NativeRef::new(native),
        }
    }

    pub fn allocate_native(&mut self, registry: &NativeRegistry) {
        self.store_native(registry, TerrainWheelMaterialNative::default());
    }

    material_property! {
        sinkage_exponent_a => set_sinkage_exponent_a;
        sinkage_exponent_b => set_sinkage_exponent_b;
        cohesion => set_cohesion;
        angle_of_internal_friction => set_angle_of_internal_friction;
        shear_modulus_x_a => set_shear_modulus_x_a;
        shear_modulus_x_b => set_shear_modulus_x_b;
        shear_modulus_y_a => set_shear_modulus_y_a;
        shear_modulus_y_b => set_shear_modulus_y_b;
        cohesive_modulus_bekker => set_cohesive_modulus_bekker;
        frictional_modulus_bekker => set_frictional_modulus_bekker;
        cohesive_modulus_reece => set_cohesive_modulus_reece;
        frictional_modulus_reece => set_frictional_modulus_reece;
        mass_density => set_mass_density;
        max_normal_stress_angle_a => set_max_normal_stress_angle_a;
        max_normal_stress_angle_b => set_max_normal_stress_angle_b;
        rear_angle_a => set_rear_angle_a;
        rear_angle_b => set_rear_angle_b;
    }
}
