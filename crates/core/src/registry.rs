//! # Native Registry
//!
//! Engine-side table of every native object allocated through a barrier,
//! keyed by address. Rebinding a barrier to an address goes through this
//! table, so an address only resolves while the object it names is alive
//! and only to the type it was created as.
//!
//! The registry also carries the engine's own reference counts. Pinning an
//! object (`increment_ref_count`) keeps it alive after every barrier has
//! released it, which is what lets a host-side wrapper be destroyed and
//! re-created while the native object persists.
//!
//! Entries are keyed by address alone, without a generation. Once an object
//! dies its address may be handed to a newer object, and a stale address of
//! the same type then resolves to that object. Callers that keep only an
//! address across a gap hold a pin for the whole gap, as
//! `PinnedInstanceData` does.
//!
//! ## Table of Contents
//! 1. RegistryEntry - Weak entry with optional pin
//! 2. NativeRegistry - Registration, resolution and ref counting

use crate::address::NativeAddress;
use crate::error::{BarrierError, Result};
use crate::handle::NativeHandle;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Registrations between sweeps of dead entries
const PRUNE_INTERVAL: usize = 256;

// ============================================================================
// 1. Registry Entry
// ============================================================================

struct RegistryEntry {
    /// The engine object, type-erased. Weak so that barriers own lifetime.
    object: Weak<dyn Any + Send + Sync>,
    /// Type name recorded at registration, for diagnostics
    type_name: &'static str,
    /// Strong reference held while the engine ref count is non-zero
    pin: Option<Arc<dyn Any + Send + Sync>>,
    /// Engine-side reference count
    pin_count: usize,
}

impl RegistryEntry {
    fn is_alive(&self) -> bool {
        self.object.strong_count() > 0
    }
}

// ============================================================================
// 2. Native Registry
// ============================================================================

/// Engine-side registry of native objects
#[derive(Default)]
pub struct NativeRegistry {
    entries: DashMap<u64, RegistryEntry>,
    registrations: AtomicUsize,
}

impl NativeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand a newly created engine object to the registry and get the
    /// first handle to it
    pub fn register<N: Send + Sync + 'static>(&self, native: N) -> NativeHandle<N> {
        let handle = NativeHandle::new(native);
        let erased: Arc<dyn Any + Send + Sync> = handle.cell().clone();
        let address = handle.address();

        self.entries.insert(
            address.raw(),
            RegistryEntry {
                object: Arc::downgrade(&erased),
                type_name: std::any::type_name::<N>(),
                pin: None,
                pin_count: 0,
            },
        );

        if self.registrations.fetch_add(1, Ordering::Relaxed) % PRUNE_INTERVAL == PRUNE_INTERVAL - 1 {
            self.prune();
        }

        tracing::trace!("Registered native {} at {}", std::any::type_name::<N>(), address);
        handle
    }

    /// Resolve an address to a handle of the expected type
    pub fn resolve<N: Send + Sync + 'static>(&self, address: NativeAddress) -> Result<NativeHandle<N>> {
        let object = {
            let entry = self
                .entries
                .get(&address.raw())
                .ok_or(BarrierError::UnknownAddress(address))?;
            entry
                .object
                .upgrade()
                .ok_or(BarrierError::UnknownAddress(address))?
        };

        let cell = object
            .downcast::<RwLock<N>>()
            .map_err(|_| BarrierError::TypeMismatch {
                address,
                expected: std::any::type_name::<N>(),
            })?;

        Ok(NativeHandle::from_cell(cell))
    }

    /// Check if an address names a live engine object
    pub fn is_live(&self, address: NativeAddress) -> bool {
        self.entries
            .get(&address.raw())
            .map(|entry| entry.is_alive())
            .unwrap_or(false)
    }

    /// Type name the object at `address` was registered with
    pub fn type_name(&self, address: NativeAddress) -> Option<&'static str> {
        self.entries
            .get(&address.raw())
            .filter(|entry| entry.is_alive())
            .map(|entry| entry.type_name)
    }

    /// Take an engine-side reference to the object at `address`.
    /// Returns the new engine reference count.
    pub fn increment_ref_count(&self, address: NativeAddress) -> Result<usize> {
        let mut entry = self
            .entries
            .get_mut(&address.raw())
            .ok_or(BarrierError::UnknownAddress(address))?;

        if entry.pin.is_none() {
            let object = entry
                .object
                .upgrade()
                .ok_or(BarrierError::UnknownAddress(address))?;
            entry.pin = Some(object);
        }

        entry.pin_count += 1;
        Ok(entry.pin_count)
    }

    /// Drop an engine-side reference to the object at `address`. When the
    /// count reaches zero the object lives only as long as its barriers.
    /// Returns the new engine reference count.
    pub fn decrement_ref_count(&self, address: NativeAddress) -> Result<usize> {
        let mut entry = self
            .entries
            .get_mut(&address.raw())
            .ok_or(BarrierError::UnknownAddress(address))?;

        if entry.pin_count == 0 {
            tracing::warn!(
                "Decrement of engine ref count for {} at {} which holds no references",
                entry.type_name,
                address
            );
            return Ok(0);
        }

        entry.pin_count -= 1;
        if entry.pin_count == 0 {
            entry.pin = None;
        }
        Ok(entry.pin_count)
    }

    /// Engine-side reference count of the object at `address`
    pub fn ref_count(&self, address: NativeAddress) -> usize {
        self.entries
            .get(&address.raw())
            .map(|entry| entry.pin_count)
            .unwrap_or(0)
    }

    /// Number of live engine objects
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_alive()).count()
    }

    /// Number of engine objects with a non-zero engine ref count
    pub fn pinned_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.pin_count > 0).count()
    }

    /// Drop every engine-side reference. Objects still held by barriers
    /// stay alive.
    pub fn clear_pins(&self) -> usize {
        let mut cleared = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.pin_count > 0 {
                entry.pin = None;
                entry.pin_count = 0;
                cleared += 1;
            }
        }
        cleared
    }

    /// Remove entries whose engine object is gone
    pub fn prune(&self) {
        self.entries.retain(|_, entry| entry.is_alive());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Body {
        mass: f64,
    }

    #[test]
    fn test_resolve_registered_object() {
        let registry = NativeRegistry::new();
        let handle = registry.register(Body { mass: 2.0 });

        let resolved = registry.resolve::<Body>(handle.address()).unwrap();
        assert!(resolved.ptr_eq(&handle));
        assert!(registry.is_live(handle.address()));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_resolve_wrong_type_fails() {
        let registry = NativeRegistry::new();
        let handle = registry.register(Body { mass: 2.0 });

        let result = registry.resolve::<String>(handle.address());
        assert!(matches!(result, Err(BarrierError::TypeMismatch { .. })));
    }

    #[test]
    fn test_dropped_object_no_longer_resolves() {
        let registry = NativeRegistry::new();
        let handle = registry.register(Body { mass: 2.0 });
        let address = handle.address();
        drop(handle);

        assert!(!registry.is_live(address));
        assert!(matches!(
            registry.resolve::<Body>(address),
            Err(BarrierError::UnknownAddress(_))
        ));
        assert!(matches!(
            registry.resolve::<Body>(NativeAddress::from_raw(8)),
            Err(BarrierError::UnknownAddress(_))
        ));
    }

    #[test]
    fn test_pin_keeps_object_alive() {
        let registry = NativeRegistry::new();
        let handle = registry.register(Body { mass: 3.0 });
        let address = handle.address();

        assert_eq!(registry.increment_ref_count(address).unwrap(), 1);
        assert_eq!(registry.increment_ref_count(address).unwrap(), 2);
        drop(handle);

        let resolved = registry.resolve::<Body>(address).unwrap();
        assert_eq!(resolved.read().mass, 3.0);
        drop(resolved);

        assert_eq!(registry.decrement_ref_count(address).unwrap(), 1);
        assert!(registry.is_live(address));
        assert_eq!(registry.decrement_ref_count(address).unwrap(), 0);
        assert!(!registry.is_live(address));
    }

    #[test]
    fn test_decrement_without_pin_is_harmless() {
        let registry = NativeRegistry::new();
        let handle = registry.register(Body { mass: 1.0 });

        assert_eq!(registry.decrement_ref_count(handle.address()).unwrap(), 0);
        assert!(registry.is_live(handle.address()));
    }

    #[test]
    fn test_clear_pins_and_prune() {
        let registry = NativeRegistry::new();
        let address = {
            let handle = registry.register(Body { mass: 1.0 });
            registry.increment_ref_count(handle.address()).unwrap();
            handle.address()
        };

        assert_eq!(registry.pinned_count(), 1);
        assert_eq!(registry.clear_pins(), 1);
        assert!(!registry.is_live(address));

        registry.prune();
        assert_eq!(registry.type_name(address), None);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_pinned_address_is_not_reused() {
        let registry = NativeRegistry::new();
        let handle = registry.register(Body { mass: 1.0 });
        let address = handle.address();
        registry.increment_ref_count(address).unwrap();
        drop(handle);

        let others: Vec<_> = (0..64).map(|i| registry.register(Body { mass: i as f64 })).collect();
        assert!(others.iter().all(|other| other.address() != address));
        assert_eq!(registry.resolve::<Body>(address).unwrap().read().mass, 1.0);
    }
}
