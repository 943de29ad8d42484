//! # Steering Parameters Asset
//!
//! Steering geometry shared by steering components. The asset has no
//! engine object of its own; the geometry is handed to the engine when a
//! steering component allocates its native.

use crate::asset::{Asset, AssetData, NoNative};
use barrier_core::native::SteeringKind;
use barrier_core::SteeringParametersData;
use serde::{Deserialize, Serialize};

/// Steering parameters asset data
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SteeringParameters {
    pub steering_data: SteeringParametersData,
}

impl AssetData for SteeringParameters {
    type Barrier = NoNative;
    const TYPE_NAME: &'static str = "SteeringParameters";
}

impl SteeringParameters {
    /// Factory preset for a steering mechanism
    pub fn preset(kind: SteeringKind) -> Self {
        let steering_data = match kind {
            SteeringKind::Ackermann => SteeringParametersData {
                phi0: -115.0,
                l: 0.16,
                alpha0: 0.0,
                lc: 0.0,
                lr: 0.0,
                gear: 1.0,
                side: 0,
            },
            SteeringKind::BellCrank => SteeringParametersData {
                phi0: -108.0,
                l: 0.14,
                alpha0: 0.0,
                lc: 1.0,
                lr: 0.0,
                gear: 1.0,
                side: 0,
            },
            SteeringKind::RackPinion => SteeringParametersData {
                phi0: -108.0,
                l: 0.14,
                alpha0: 0.0,
                lc: 1.0,
                lr: 0.25,
                gear: 1.0,
                side: 0,
            },
            SteeringKind::Davis => SteeringParametersData {
                phi0: 104.0,
                l: 14.0,
                alpha0: 76.0,
                lc: -200.0,
                lr: 75.0,
                gear: 1.0,
                side: 0,
            },
        };
        Self { steering_data }
    }

    /// New asset initialized with the preset for `kind`
    pub fn create_asset(name: impl Into<String>, kind: SteeringKind) -> Asset<Self> {
        Asset::new(name, Self::preset(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PlaySession;
    use barrier_core::NativeEnvironment;

    #[test]
    fn test_presets() {
        let davis = SteeringParameters::preset(SteeringKind::Davis).steering_data;
        assert_eq!(davis.phi0, 104.0);
        assert_eq!(davis.alpha0, 76.0);
        assert_eq!(davis.lc, -200.0);

        let rack = SteeringParameters::preset(SteeringKind::RackPinion).steering_data;
        assert_eq!(rack.lr, 0.25);

        for kind in [
            SteeringKind::Ackermann,
            SteeringKind::BellCrank,
            SteeringKind::RackPinion,
            SteeringKind::Davis,
        ] {
            let data = SteeringParameters::preset(kind).steering_data;
            assert_eq!(data.gear, 1.0);
            assert_eq!(data.side, 0);
        }
    }

    #[test]
    fn test_instance_round_trip_through_commit() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let asset = SteeringParameters::create_asset("FrontSteering", SteeringKind::Ackermann);

        let instance = asset.get_or_create_instance(Some(&session)).unwrap();
        assert_eq!(instance.name(), "FrontSteering_Instance");
        instance.modify(|params| params.steering_data.phi0 = -100.0);
        assert_eq!(asset.data().steering_data.phi0, -115.0);

        asset.commit_to_asset();
        assert_eq!(asset.data().steering_data.phi0, -100.0);
        assert!(asset.is_dirty());
    }

    #[test]
    fn test_no_native_for_parameters() {
        let session = PlaySession::game(NativeEnvironment::headless());
        let asset = SteeringParameters::create_asset("RearSteering", SteeringKind::Davis);

        assert!(asset.get_or_create_native(Some(&session)).is_none());
        assert!(asset.get_instance().is_some());
        assert!(!asset.has_native());
        assert!(!asset.post_edit_change("steering_data"));
    }
}
