//! Bevy plugin for the native barrier layer
//!
//! ## Table of Contents
//! 1. Resources - Environment and active session
//! 2. NativeBarrierPlugin
//! 3. Systems - Steering natives per session

use crate::session::PlaySession;
use crate::steering::SteeringComponent;
use barrier_core::{EnvironmentConfig, NativeEnvironment, NativeOwner};
use bevy::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// 1. Resources
// ============================================================================

/// The native environment, shared with everything that allocates natives
#[derive(Resource, Clone)]
pub struct NativeEnvironmentResource(pub Arc<NativeEnvironment>);

/// The running play session, if any
#[derive(Resource, Default)]
pub struct ActiveSession(pub Option<PlaySession>);

impl ActiveSession {
    /// Start a game session, ending the previous one
    pub fn start_game(&mut self, environment: &NativeEnvironmentResource) {
        if let Some(previous) = self.0.take() {
            previous.end();
        }
        self.0 = Some(PlaySession::game(Arc::clone(&environment.0)));
    }

    pub fn end(&mut self) {
        if let Some(session) = self.0.take() {
            session.end();
        }
    }
}

// ============================================================================
// 2. NativeBarrierPlugin
// ============================================================================

/// Sets up the native environment and creates component natives during play
#[derive(Default)]
pub struct NativeBarrierPlugin {
    pub config: EnvironmentConfig,
}

impl NativeBarrierPlugin {
    /// Create with custom configuration
    pub fn with_config(config: EnvironmentConfig) -> Self {
        Self { config }
    }
}

impl Plugin for NativeBarrierPlugin {
    fn build(&self, app: &mut App) {
        let environment = match NativeEnvironment::init(self.config.clone()) {
            Ok(environment) => environment,
            Err(e) => {
                tracing::error!("Native barrier plugin disabled: {}", e);
                return;
            }
        };

        app.insert_resource(NativeEnvironmentResource(environment))
            .init_resource::<ActiveSession>()
            .add_systems(PostUpdate, sync_steering_natives);
    }
}

// ============================================================================
// 3. Systems
// ============================================================================

/// Session the steering natives currently belong to
#[derive(Default)]
pub struct SteeringSessionState {
    session: Option<u64>,
    attempted: HashSet<Entity>,
}

/// Keep steering natives in step with the active session. When the game
/// session ends or is replaced, every steering native is released; while a
/// game session runs, each steering entity gets one attempt at creating
/// its native. Exclusive so that it runs on the thread owning the
/// environment.
pub fn sync_steering_natives(world: &mut World, mut state: Local<SteeringSessionState>) {
    if !world.contains_resource::<ActiveSession>() {
        return;
    }

    world.resource_scope(|world, session: Mut<ActiveSession>| {
        let current = session.0.as_ref().filter(|session| session.is_game_world());
        let current_id = current.map(PlaySession::id);

        if state.session.is_some() && state.session != current_id {
            let mut query = world.query::<&mut SteeringComponent>();
            let mut released = 0;
            for mut steering in query.iter_mut(world) {
                if steering.has_native() {
                    steering.end_play(false);
                    released += 1;
                }
            }
            debug!("Released {} steering natives at the end of session {:?}", released, state.session);
        }
        if state.session != current_id {
            state.attempted.clear();
            state.session = current_id;
        }

        let Some(session) = current else {
            return;
        };

        let mut query = world.query::<(Entity, &mut SteeringComponent)>();
        for (entity, mut steering) in query.iter_mut(world) {
            if steering.has_native() || !state.attempted.insert(entity) {
                continue;
            }
            steering.begin_play(session);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steering::SharedWheelJoint;
    use barrier_core::{NativeAddress, WheelJointBarrier};
    use parking_lot::Mutex;

    fn wheel(environment: &NativeEnvironmentResource, name: &str) -> SharedWheelJoint {
        let mut barrier = WheelJointBarrier::default();
        barrier.allocate_native(environment.0.registry(), name);
        Arc::new(Mutex::new(barrier))
    }

    fn app() -> (App, NativeEnvironmentResource) {
        let mut app = App::new();
        app.add_plugins(NativeBarrierPlugin::with_config(EnvironmentConfig::headless()));
        let environment = app.world().resource::<NativeEnvironmentResource>().clone();
        (app, environment)
    }

    fn steering_address(app: &App, entity: Entity) -> NativeAddress {
        app.world()
            .get::<SteeringComponent>(entity)
            .map(|steering| steering.native_address())
            .unwrap_or(NativeAddress::NULL)
    }

    fn steering_guid(app: &App, entity: Entity) -> Option<String> {
        app.world()
            .get::<SteeringComponent>(entity)
            .and_then(|steering| steering.get_native().map(|native| native.guid().to_string()))
    }

    #[test]
    fn test_natives_follow_the_session() {
        let (mut app, environment) = app();
        let entity = app
            .world_mut()
            .spawn(SteeringComponent::new(
                "FrontAxle",
                wheel(&environment, "L"),
                wheel(&environment, "R"),
            ))
            .id();

        app.update();
        assert!(steering_address(&app, entity).is_null());

        app.world_mut().resource_mut::<ActiveSession>().start_game(&environment);
        app.update();
        let address = steering_address(&app, entity);
        assert!(!address.is_null());
        assert!(environment.0.registry().is_live(address));

        app.world_mut().resource_mut::<ActiveSession>().end();
        app.update();
        assert!(steering_address(&app, entity).is_null());
        assert!(!environment.0.registry().is_live(address));
    }

    #[test]
    fn test_restarted_session_recreates_natives() {
        let (mut app, environment) = app();
        let entity = app
            .world_mut()
            .spawn(SteeringComponent::new(
                "FrontAxle",
                wheel(&environment, "L"),
                wheel(&environment, "R"),
            ))
            .id();

        app.world_mut().resource_mut::<ActiveSession>().start_game(&environment);
        app.update();
        let first = steering_guid(&app, entity).unwrap();

        // End and restart within one frame
        app.world_mut().resource_mut::<ActiveSession>().start_game(&environment);
        app.update();
        let second = steering_guid(&app, entity).unwrap();
        assert_ne!(first, second);
    }
}
