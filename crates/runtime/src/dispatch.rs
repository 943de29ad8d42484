//! # Property-Change Dispatch
//!
//! Maps a property name to the code that propagates an edit of that
//! property: copy the field from the asset to its runtime instance, then
//! push it into the instance's native if one is allocated.
//!
//! One dispatcher exists per asset type, built lazily behind a `OnceLock`
//! and returned from [`AssetData::dispatcher`](crate::asset::AssetData::dispatcher).

use crate::asset::AssetData;
use barrier_core::NativeBarrier;
use std::collections::HashMap;

type CopyFn<T> = Box<dyn Fn(&T, &mut T) + Send + Sync>;
type PushFn<T> = Box<dyn Fn(&T, &mut <T as AssetData>::Barrier) + Send + Sync>;

struct PropertyHandler<T: AssetData> {
    copy: CopyFn<T>,
    push: PushFn<T>,
}

/// Per-type table of property-change handlers
pub struct PropertyDispatcher<T: AssetData> {
    handlers: HashMap<&'static str, PropertyHandler<T>>,
}

impl<T: AssetData> Default for PropertyDispatcher<T> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<T: AssetData> PropertyDispatcher<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `name`
    pub fn add(
        mut self,
        name: &'static str,
        copy: impl Fn(&T, &mut T) + Send + Sync + 'static,
        push: impl Fn(&T, &mut T::Barrier) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(
            name,
            PropertyHandler {
                copy: Box::new(copy),
                push: Box::new(push),
            },
        );
        self
    }

    /// Check if a handler exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Propagate an edit of `name` from `source` to `target` and, if
    /// allocated, to `barrier`. Returns false for unknown names.
    pub fn trigger(&self, name: &str, source: &T, target: &mut T, barrier: &mut T::Barrier) -> bool {
        let Some(handler) = self.handlers.get(name) else {
            return false;
        };

        (handler.copy)(source, target);
        if barrier.has_native() {
            (handler.push)(target, barrier);
        }
        true
    }

    /// Push an edit of `name` on `data` into `barrier`, if allocated.
    /// Returns false for unknown names.
    pub fn push(&self, name: &str, data: &T, barrier: &mut T::Barrier) -> bool {
        let Some(handler) = self.handlers.get(name) else {
            return false;
        };

        if barrier.has_native() {
            (handler.push)(data, barrier);
        }
        true
    }
}

/// Register a plain field that is forwarded to a barrier setter of the
/// same value
#[macro_export]
macro_rules! dispatch_field {
    ($dispatcher:expr, $field:ident => $setter:ident) => {
        $dispatcher.add(
            stringify!($field),
            |source, target| target.$field = source.$field.clone(),
            |data, barrier| barrier.$setter(data.$field.clone()),
        )
    };
}
