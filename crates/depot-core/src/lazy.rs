//! Per-engine lazily constructed collaborators.

use std::fmt;
use std::sync::{Arc, Mutex};

type Init<T> = Box<dyn Fn() -> anyhow::Result<Arc<T>> + Send + Sync>;

/// A value built on first use, at most once per owner.
///
/// The constructor runs under the lock, so concurrent first callers wait for
/// one construction instead of racing. A failed construction leaves the slot
/// empty and the next call tries again.
pub struct Lazy<T: ?Sized> {
    slot: Mutex<Option<Arc<T>>>,
    init: Option<Init<T>>,
}

impl<T: ?Sized> Lazy<T> {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> anyhow::Result<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            slot: Mutex::new(None),
            init: Some(Box::new(init)),
        }
    }

    /// Already constructed, no initializer needed.
    pub fn ready(value: Arc<T>) -> Self {
        Self {
            slot: Mutex::new(Some(value)),
            init: None,
        }
    }

    /// Nothing configured; [`Lazy::get`] returns `Ok(None)`.
    pub fn unset() -> Self {
        Self {
            slot: Mutex::new(None),
            init: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.init.is_some() || self.is_initialized()
    }

    pub fn is_initialized(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// Returns the value, constructing it on the first call.
    pub fn get(&self) -> anyhow::Result<Option<Arc<T>>> {
        let mut slot = self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(value) = slot.as_ref() {
            return Ok(Some(Arc::clone(value)));
        }
        let Some(init) = &self.init else {
            return Ok(None);
        };
        let value = init()?;
        *slot = Some(Arc::clone(&value));
        Ok(Some(value))
    }
}

impl<T: ?Sized> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("configured", &self.init.is_some())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
