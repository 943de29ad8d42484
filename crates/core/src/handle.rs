//! # Native Handles
//!
//! `NativeHandle<N>` is a reference-counted pointer to an engine object.
//! Cloning it aliases the engine object, it never duplicates it.
//!
//! `NativeRef<N>` is the slot a barrier owns: exactly one optional handle,
//! accessed directly through its `native` field.

use crate::address::NativeAddress;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

/// Reference-counted handle to a native engine object
pub struct NativeHandle<N> {
    cell: Arc<RwLock<N>>,
}

impl<N> NativeHandle<N> {
    /// Wrap a freshly created engine object
    pub fn new(native: N) -> Self {
        Self {
            cell: Arc::new(RwLock::new(native)),
        }
    }

    pub(crate) fn from_cell(cell: Arc<RwLock<N>>) -> Self {
        Self { cell }
    }

    pub(crate) fn cell(&self) -> &Arc<RwLock<N>> {
        &self.cell
    }

    /// Numeric identity of the engine object
    pub fn address(&self) -> NativeAddress {
        NativeAddress::from_raw(Arc::as_ptr(&self.cell) as *const () as usize as u64)
    }

    /// Read access to the engine object
    pub fn read(&self) -> RwLockReadGuard<'_, N> {
        self.cell.read()
    }

    /// Write access to the engine object
    pub fn write(&self) -> RwLockWriteGuard<'_, N> {
        self.cell.write()
    }

    /// Number of strong references held to the engine object,
    /// including engine-side pins
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.cell)
    }

    /// Check if two handles refer to the same engine object
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<N> Clone for NativeHandle<N> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<N> fmt::Debug for NativeHandle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("address", &self.address())
            .field("type", &std::any::type_name::<N>())
            .finish()
    }
}

/// The handle slot owned by a barrier
pub struct NativeRef<N> {
    pub native: Option<NativeHandle<N>>,
}

impl<N> NativeRef<N> {
    /// An empty slot
    pub fn empty() -> Self {
        Self { native: None }
    }

    /// Adopt an existing engine object without duplicating it
    pub fn new(native: NativeHandle<N>) -> Self {
        Self {
            native: Some(native),
        }
    }
}

impl<N> Default for NativeRef<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<N> Clone for NativeRef<N> {
    fn clone(&self) -> Self {
        Self {
            native: self.native.clone(),
        }
    }
}

impl<N> fmt::Debug for NativeRef<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRef")
            .field("native", &self.native)
            .finish()
    }
}
