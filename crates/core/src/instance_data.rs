//! # Native Owner Instance Data
//!
//! When the host framework destroys and rebuilds an object (undo/redo,
//! script recompile) the rebuilt object must keep using the engine object
//! of the old one. The old owner's address is captured before the rebuild
//! and applied to the new owner afterwards.
//!
//! The engine object must survive the gap between the two, so
//! [`PinnedInstanceData`] holds an engine-side pin
//! (`NativeRegistry::increment_ref_count`) from capture until it has been
//! applied or dropped.
//!
//! Addresses are not generation-tagged. Once the engine object behind a
//! captured address dies, the allocator may hand the same address to a new
//! object of the same type and a stale [`NativeOwnerInstanceData`] would
//! rebind to it. Keep the pin alive across the rebuild to rule this out.
//!
//! ## Table of Contents
//! 1. NativeOwner / NativeOwnerInstanceData
//! 2. NativePin / PinnedInstanceData

use crate::address::NativeAddress;
use crate::environment::NativeEnvironment;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// 1. NativeOwner / NativeOwnerInstanceData
// ============================================================================

/// Host object that owns a native through a barrier
pub trait NativeOwner {
    fn has_native(&self) -> bool;

    fn native_address(&self) -> NativeAddress;

    /// Rebind to the engine object at `address`
    fn set_native_address(&mut self, address: NativeAddress) -> Result<()>;
}

/// Address of a native owner, carried across host object reconstruction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeOwnerInstanceData {
    native_address: NativeAddress,
}

impl NativeOwnerInstanceData {
    /// Record the owner's current address
    pub fn capture<O: NativeOwner + ?Sized>(owner: &O) -> Self {
        Self {
            native_address: owner.native_address(),
        }
    }

    pub fn native_address(&self) -> NativeAddress {
        self.native_address
    }

    /// True iff there is an address to restore
    pub fn contains_data(&self) -> bool {
        !self.native_address.is_null()
    }

    /// Rebind `owner` to the captured address. The host may apply the same
    /// data more than once; an owner already at the address is left alone.
    pub fn apply_to<O: NativeOwner + ?Sized>(&self, owner: &mut O) -> Result<()> {
        if owner.native_address() == self.native_address {
            return Ok(());
        }
        owner.set_native_address(self.native_address)
    }
}

// ============================================================================
// 2. NativePin / PinnedInstanceData
// ============================================================================

/// One engine-side reference to a native, released on drop
pub struct NativePin {
    environment: Arc<NativeEnvironment>,
    address: NativeAddress,
}

impl NativePin {
    /// Take an engine-side reference to the object at `address`
    pub fn new(environment: &Arc<NativeEnvironment>, address: NativeAddress) -> Result<Self> {
        environment.registry().increment_ref_count(address)?;
        Ok(Self {
            environment: Arc::clone(environment),
            address,
        })
    }

    pub fn address(&self) -> NativeAddress {
        self.address
    }
}

impl fmt::Debug for NativePin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativePin").field("address", &self.address).finish()
    }
}

impl Drop for NativePin {
    fn drop(&mut self) {
        // shutdown already cleared every pin
        if !self.environment.is_active() {
            return;
        }
        if let Err(e) = self.environment.registry().decrement_ref_count(self.address) {
            tracing::warn!("Could not unpin native at {}: {}", self.address, e);
        }
    }
}

/// Instance data that keeps the captured native pinned until it has been
/// applied, whether or not the apply succeeds, or until it is dropped
#[derive(Debug, Default)]
pub struct PinnedInstanceData {
    data: NativeOwnerInstanceData,
    pin: Option<NativePin>,
}

impl PinnedInstanceData {
    /// Record the owner's address and pin its native in `environment`.
    /// Without an environment, or if pinning fails, the data is kept
    /// unpinned.
    pub fn capture<O: NativeOwner + ?Sized>(owner: &O, environment: Option<&Arc<NativeEnvironment>>) -> Self {
        let data = NativeOwnerInstanceData::capture(owner);
        let pin = match environment {
            Some(environment) if data.contains_data() => match NativePin::new(environment, data.native_address()) {
                Ok(pin) => Some(pin),
                Err(e) => {
                    tracing::error!("Could not pin native at {}: {}", data.native_address(), e);
                    None
                }
            },
            _ => None,
        };
        Self { data, pin }
    }

    pub fn data(&self) -> NativeOwnerInstanceData {
        self.data
    }

    pub fn native_address(&self) -> NativeAddress {
        self.data.native_address()
    }

    pub fn contains_data(&self) -> bool {
        self.data.contains_data()
    }

    /// True while the captured native is still pinned
    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    /// Rebind `owner` and release the pin. The pin is released on failure
    /// too; the error is returned.
    pub fn apply_to<O: NativeOwner + ?Sized>(&mut self, owner: &mut O) -> Result<()> {
        let result = self.data.apply_to(owner);
        self.pin = None;
        result
    }
}
