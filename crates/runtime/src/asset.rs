//! # Asset / Instance Duplication
//!
//! An asset is a design-time template and never owns a live native. When a
//! game session needs it, a runtime instance is made from it: a transient
//! copy, owned by the session, that does own a barrier. Edits made during
//! play land on the instance and are copied back to the asset explicitly
//! with [`Asset::commit_to_asset`].
//!
//! ```text
//!   Asset ──get_or_create_instance(session)──▶ Instance (session-owned)
//!     ▲  instance: Weak                           │ asset: Weak
//!     └──────────────commit_to_asset──────────────┘
//! ```
//!
//! ## Table of Contents
//! 1. AssetData - Per-type hooks, NoNative
//! 2. Asset - Shared handle to an asset or instance
//! 3. Duplication protocol
//! 4. Native access

use crate::dispatch::PropertyDispatcher;
use crate::session::PlaySession;
use barrier_core::{BarrierError, NativeAddress, NativeBarrier, NativeEnvironment, NativeRef, Result};
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, warn};

// ============================================================================
// 1. AssetData
// ============================================================================

/// Configuration carried by an asset, with the hooks that move it in and
/// out of the engine
pub trait AssetData: Clone + Send + Sync + 'static {
    /// Barrier owned by runtime instances
    type Barrier: NativeBarrier + Clone + Default + Send + Sync + 'static;

    /// Type name used in log messages
    const TYPE_NAME: &'static str;

    /// Create the engine object. Only called on an instance without a native.
    fn allocate_native(&self, _barrier: &mut Self::Barrier, _environment: &NativeEnvironment) -> Result<()> {
        Err(BarrierError::MissingNative(format!(
            "{} has no native representation",
            Self::TYPE_NAME
        )))
    }

    /// Push every field into a freshly allocated native
    fn update_native_properties(&self, _barrier: &mut Self::Barrier) {}

    /// Read every field back from a live native
    fn copy_from_native(&mut self, _barrier: &Self::Barrier) {}

    /// Property-change handlers for this type
    fn dispatcher() -> Option<&'static PropertyDispatcher<Self>> {
        None
    }
}

/// Barrier slot for asset types that have no engine object
#[derive(Clone, Debug, Default)]
pub struct NoNative {
    native: NativeRef<()>,
}

impl NativeBarrier for NoNative {
    type Native = ();
    const KIND: &'static str = "NoNative";

    fn native_ref(&self) -> &NativeRef<()> {
        &self.native
    }

    fn native_ref_mut(&mut self) -> &mut NativeRef<()> {
        &mut self.native
    }
}

// ============================================================================
// 2. Asset
// ============================================================================

/// Where an asset object lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outer {
    /// Saved content
    Package,
    /// Created at runtime outside any session, e.g. by an importer
    Transient,
    /// Created for the session with this id
    Session(u64),
}

struct AssetInner<T: AssetData> {
    name: String,
    outer: Outer,
    data: RwLock<T>,
    barrier: Mutex<T::Barrier>,
    /// Set on instances made from an asset
    asset: Option<Weak<AssetInner<T>>>,
    /// Set on assets once an instance has been made
    instance: Mutex<Weak<AssetInner<T>>>,
    /// Environment runtime instances allocate their natives in
    environment: Option<Arc<NativeEnvironment>>,
    dirty: AtomicBool,
}

/// Shared handle to an asset or runtime instance. Clones refer to the same
/// object.
pub struct Asset<T: AssetData> {
    inner: Arc<AssetInner<T>>,
}

impl<T: AssetData> Clone for Asset<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: AssetData + fmt::Debug> fmt::Debug for Asset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("name", &self.inner.name)
            .field("outer", &self.inner.outer)
            .field("is_instance", &self.is_instance())
            .field("data", &*self.inner.data.read())
            .finish()
    }
}

impl<T: AssetData> Asset<T> {
    /// A design-time asset
    pub fn new(name: impl Into<String>, data: T) -> Self {
        Self::with_outer(name.into(), Outer::Package, data, None, None)
    }

    /// A runtime object with no asset behind it
    pub fn transient(name: impl Into<String>, data: T, environment: Arc<NativeEnvironment>) -> Self {
        Self::with_outer(name.into(), Outer::Transient, data, None, Some(environment))
    }

    fn with_outer(
        name: String,
        outer: Outer,
        data: T,
        asset: Option<Weak<AssetInner<T>>>,
        environment: Option<Arc<NativeEnvironment>>,
    ) -> Self {
        Self {
            inner: Arc::new(AssetInner {
                name,
                outer,
                data: RwLock::new(data),
                barrier: Mutex::new(T::Barrier::default()),
                asset,
                instance: Mutex::new(Weak::new()),
                environment,
                dirty: AtomicBool::new(false),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn outer(&self) -> Outer {
        self.inner.outer
    }

    /// Check if two handles refer to the same object
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// This object's own configuration
    pub fn data(&self) -> RwLockReadGuard<'_, T> {
        self.inner.data.read()
    }

    /// Read the current configuration: an asset with a live instance
    /// reports the instance's values
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        if !self.is_instance() {
            if let Some(instance) = self.get_instance() {
                return instance.read(f);
            }
        }
        f(&self.inner.data.read())
    }

    /// Change the configuration. An asset with a live instance forwards the
    /// change to the instance, which pushes it into its native.
    pub fn modify(&self, f: impl FnOnce(&mut T)) {
        if !self.is_instance() {
            if let Some(instance) = self.get_instance() {
                instance.modify(f);
                return;
            }
        }

        let mut data = self.inner.data.write();
        f(&mut data);

        let mut barrier = self.inner.barrier.lock();
        if barrier.has_native() {
            data.update_native_properties(&mut barrier);
        }
    }

    /// Write this object's own fields without propagating anything, as an
    /// editor property panel does. Follow with [`Asset::post_edit_change`].
    pub fn edit(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.data.write());
    }

    /// Propagate an edit of the named property. Returns false if the type
    /// has no handler for it.
    pub fn post_edit_change(&self, name: &str) -> bool {
        let Some(dispatcher) = T::dispatcher() else {
            return false;
        };

        if self.is_instance() {
            let data = self.inner.data.read();
            let mut barrier = self.inner.barrier.lock();
            return dispatcher.push(name, &data, &mut barrier);
        }

        match self.get_instance() {
            Some(instance) => {
                let source = self.inner.data.read();
                let mut target = instance.inner.data.write();
                let mut barrier = instance.inner.barrier.lock();
                dispatcher.trigger(name, &source, &mut target, &mut barrier)
            }
            None => dispatcher.contains(name),
        }
    }

    /// True once an instance has been committed into this asset
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::Acquire)
    }

    pub fn clear_dirty(&self) {
        self.inner.dirty.store(false, Ordering::Release);
    }

    // ========================================================================
    // 3. Duplication Protocol
    // ========================================================================

    /// True for runtime objects: transient or session-owned, or made from
    /// an asset
    pub fn is_instance(&self) -> bool {
        matches!(self.inner.outer, Outer::Transient | Outer::Session(_)) || self.inner.asset.is_some()
    }

    /// The live instance made from this asset
    pub fn get_instance(&self) -> Option<Asset<T>> {
        self.inner
            .instance
            .lock()
            .upgrade()
            .map(|inner| Asset { inner })
    }

    /// The asset this instance was made from
    pub fn get_asset(&self) -> Option<Asset<T>> {
        self.inner
            .asset
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Asset { inner })
    }

    /// Get the runtime instance for this object, making one in `session`
    /// if needed. An instance returns itself.
    pub fn get_or_create_instance(&self, session: Option<&PlaySession>) -> Option<Asset<T>> {
        if self.is_instance() {
            return Some(self.clone());
        }

        if let Some(instance) = self.get_instance() {
            return Some(instance);
        }

        let session = match session {
            Some(session) if session.is_game_world() => session,
            _ => {
                warn!(
                    "Could not create runtime instance for {} asset '{}' because no game session to create it in was given",
                    T::TYPE_NAME,
                    self.inner.name
                );
                return None;
            }
        };

        session.environment().assert_owner_thread();
        let instance = Self::with_outer(
            format!("{}_Instance", self.inner.name),
            Outer::Session(session.id()),
            self.inner.data.read().clone(),
            Some(Arc::downgrade(&self.inner)),
            Some(Arc::clone(session.environment())),
        );

        *self.inner.instance.lock() = Arc::downgrade(&instance.inner);
        session.adopt(instance.inner.clone());

        debug!(
            "Created runtime instance '{}' of {} in session {}",
            instance.inner.name,
            T::TYPE_NAME,
            session.id()
        );
        Some(instance)
    }

    /// Copy an instance's configuration, including values changed inside
    /// the native, onto its asset and mark the asset dirty. Called on an
    /// asset, commits its instance.
    pub fn commit_to_asset(&self) {
        if self.is_instance() {
            let Some(asset) = self.get_asset() else {
                debug!(
                    "Runtime {} '{}' has no asset to commit to",
                    T::TYPE_NAME,
                    self.inner.name
                );
                return;
            };

            let committed = {
                let mut data = self.inner.data.write();
                let barrier = self.inner.barrier.lock();
                if barrier.has_native() {
                    data.copy_from_native(&barrier);
                }
                data.clone()
            };

            *asset.inner.data.write() = committed;
            asset.inner.dirty.store(true, Ordering::Release);
            debug!("Committed '{}' to asset '{}'", self.inner.name, asset.inner.name);
        } else if let Some(instance) = self.get_instance() {
            instance.commit_to_asset();
        }
    }

    // ========================================================================
    // 4. Native Access
    // ========================================================================

    /// Get the native of the runtime instance, allocating it if needed.
    /// On an asset the (possibly new) instance is used. An instance always
    /// allocates in the environment it was created with; `session` only
    /// matters for creating the instance.
    pub fn get_or_create_native(&self, session: Option<&PlaySession>) -> Option<T::Barrier> {
        if !self.is_instance() {
            let instance = self.get_or_create_instance(session)?;
            return instance.get_or_create_native(session);
        }

        // Lock order everywhere: data, then barrier
        let data = self.inner.data.read();
        let mut barrier = self.inner.barrier.lock();
        if !barrier.has_native() {
            let environment = match self.inner.environment.as_ref() {
                Some(environment) if environment.is_active() => environment,
                _ => {
                    warn!(
                        "Cannot allocate native for {} '{}' without an active native environment",
                        T::TYPE_NAME,
                        self.inner.name
                    );
                    return None;
                }
            };
            environment.assert_owner_thread();

            if let Err(e) = data.allocate_native(&mut barrier, environment) {
                error!("Failed to allocate native for {} '{}': {}", T::TYPE_NAME, self.inner.name, e);
                return None;
            }
            data.update_native_properties(&mut barrier);

            if environment.config().log_allocations {
                debug!(
                    "Allocated native for {} '{}' at {}",
                    T::TYPE_NAME,
                    self.inner.name,
                    barrier.native_address()
                );
            }
        }

        Some(barrier.clone())
    }

    /// A copy of the barrier if a native is allocated. Copies of shared
    /// barriers alias the same engine object.
    pub fn get_native(&self) -> Option<T::Barrier> {
        if !self.is_instance() {
            return self.get_instance().and_then(|instance| instance.get_native());
        }

        let barrier = self.inner.barrier.lock();
        barrier.has_native().then(|| barrier.clone())
    }

    pub fn has_native(&self) -> bool {
        if !self.is_instance() {
            return self.get_instance().is_some_and(|instance| instance.has_native());
        }
        self.inner.barrier.lock().has_native()
    }

    /// Release the instance's native. Does nothing if there is none.
    pub fn release_native(&self) {
        if !self.is_instance() {
            if let Some(instance) = self.get_instance() {
                instance.release_native();
            }
            return;
        }

        let mut barrier = self.inner.barrier.lock();
        if barrier.has_native() {
            barrier.release_native();
        }
    }

    pub fn native_address(&self) -> NativeAddress {
        if !self.is_instance() {
            return self
                .get_instance()
                .map(|instance| instance.native_address())
                .unwrap_or(NativeAddress::NULL);
        }
        self.inner.barrier.lock().native_address()
    }

    /// Rebind the instance's barrier to the engine object at `address`
    pub fn set_native_address(&self, address: NativeAddress) -> Result<()> {
        if !self.is_instance() {
            return match self.get_instance() {
                Some(instance) => instance.set_native_address(address),
                None => Err(BarrierError::Environment(format!(
                    "{} asset '{}' has no runtime instance to bind a native to",
                    T::TYPE_NAME,
                    self.inner.name
                ))),
            };
        }

        let environment = self.inner.environment.as_ref().ok_or_else(|| {
            BarrierError::Environment(format!(
                "{} '{}' has no native environment",
                T::TYPE_NAME,
                self.inner.name
            ))
        })?;
        environment.assert_owner_thread();
        self.inner
            .barrier
            .lock()
            .set_native_address(environment.registry(), address)
    }
}
