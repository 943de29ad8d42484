//! # Barrier Contract
//!
//! Every barrier owns exactly one `NativeRef` slot. The lifecycle rules are
//! implemented once here as provided methods; a concrete barrier only says
//! where its slot is and adds allocation plus typed accessors.
//!
//! ```text
//!   Empty --store_native--> Live --release_native--> Empty
//!   Empty --set_native_address(addr)--> Live
//!   Live  --set_native_address(NULL)--> Empty
//!   Live  --set_native_address(same)--> Live
//! ```
//!
//! Allocating into a live slot, releasing an empty one, or reading a
//! property without a native are programmer errors and panic.

use crate::address::NativeAddress;
use crate::error::Result;
use crate::handle::{NativeHandle, NativeRef};
use crate::registry::NativeRegistry;

/// Shared lifecycle of all barriers
pub trait NativeBarrier {
    /// Engine object type behind this barrier
    type Native: Send + Sync + 'static;

    /// Name used in assertion and log messages
    const KIND: &'static str;

    fn native_ref(&self) -> &NativeRef<Self::Native>;

    fn native_ref_mut(&mut self) -> &mut NativeRef<Self::Native>;

    /// True iff a native object is held
    fn has_native(&self) -> bool {
        self.native_ref().native.is_some()
    }

    /// The held handle, if any
    fn get_native(&self) -> Option<&NativeHandle<Self::Native>> {
        self.native_ref().native.as_ref()
    }

    /// The held handle. Panics when empty.
    fn native(&self) -> &NativeHandle<Self::Native> {
        match self.native_ref().native.as_ref() {
            Some(native) => native,
            None => panic!("{}: native accessed before AllocateNative", Self::KIND),
        }
    }

    /// Register a freshly created engine object and store its handle.
    /// Panics if a native is already held.
    fn store_native(&mut self, registry: &NativeRegistry, native: Self::Native) {
        assert!(
            !self.has_native(),
            "{}: AllocateNative called on a barrier that already has a native",
            Self::KIND
        );
        let handle = registry.register(native);
        tracing::trace!("{} allocated native at {}", Self::KIND, handle.address());
        self.native_ref_mut().native = Some(handle);
    }

    /// Drop this barrier's reference. Aliases and engine pins keep the
    /// object alive. Panics when empty.
    fn release_native(&mut self) {
        assert!(
            self.has_native(),
            "{}: ReleaseNative called on a barrier without a native",
            Self::KIND
        );
        if let Some(native) = self.native_ref_mut().native.take() {
            tracing::trace!("{} released native at {}", Self::KIND, native.address());
        }
    }

    /// Numeric identity of the held native, `NULL` when empty
    fn native_address(&self) -> NativeAddress {
        self.get_native()
            .map(NativeHandle::address)
            .unwrap_or(NativeAddress::NULL)
    }

    /// Rebind to the engine object at `address`.
    ///
    /// The current native is released first. An address that does not
    /// name a live object of the right type leaves the barrier empty and
    /// returns the error.
    fn set_native_address(&mut self, registry: &NativeRegistry, address: NativeAddress) -> Result<()> {
        if address == self.native_address() {
            return Ok(());
        }

        if self.has_native() {
            self.release_native();
        }

        if address.is_null() {
            return Ok(());
        }

        let handle = registry.resolve::<Self::Native>(address)?;
        self.native_ref_mut().native = Some(handle);
        Ok(())
    }
}
