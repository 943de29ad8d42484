//! # Native Address
//!
//! Numeric identity of an engine object. This is what the host framework
//! persists across object reconstruction (undo/redo, blueprint recompile)
//! to know which native object to re-bind to.
//!
//! Addresses are process-local and ephemeral. They are never valid across
//! process restarts and must not be written to disk.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque numeric identity of a native object. `0` means "no native".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeAddress(u64);

impl NativeAddress {
    /// The null address
    pub const NULL: NativeAddress = NativeAddress(0);

    /// Wrap a raw address value
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw address value
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Check if this is the null address
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for NativeAddress {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<NativeAddress> for u64 {
    fn from(address: NativeAddress) -> Self {
        address.0
    }
}

impl fmt::Display for NativeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
