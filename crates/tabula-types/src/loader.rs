//! Deferred value loading
//!
//! A loader stands in for a payload that lives elsewhere (a file, a blob
//! column, a remote document). The reference itself can be checked for null
//! without loading anything.

use crate::{LoadError, RawValue, Scalar, ValueResult, ValueType};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Loads a value payload from its reference
pub trait ValueLoader: Send + Sync {
    /// Whether the reference is null, without loading the payload
    fn is_null(&self) -> bool;

    /// Load the payload from its reference
    fn load(&self) -> Result<RawValue, LoadError>;
}

/// A loader plus the memoized, coerced result of its first successful load
pub(crate) struct DeferredValue {
    loader: Arc<dyn ValueLoader>,
    loaded: OnceCell<Option<Scalar>>,
}

impl DeferredValue {
    pub(crate) fn new(loader: Arc<dyn ValueLoader>) -> Self {
        Self {
            loader,
            loaded: OnceCell::new(),
        }
    }

    pub(crate) fn is_null(&self) -> bool {
        match self.loaded.get() {
            Some(loaded) => loaded.is_none(),
            None => self.loader.is_null(),
        }
    }

    /// Load and coerce once; a failed load is not memoized
    pub(crate) fn materialize(&self, value_type: ValueType) -> ValueResult<Option<&Scalar>> {
        self.loaded
            .get_or_try_init(|| {
                if self.loader.is_null() {
                    return Ok(None);
                }
                let raw = self.loader.load()?;
                value_type.coerce(raw)
            })
            .map(Option::as_ref)
    }
}

impl fmt::Debug for DeferredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredValue")
            .field("loaded", &self.loaded.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        reference: Option<String>,
        loads: AtomicUsize,
    }

    impl ValueLoader for CountingLoader {
        fn is_null(&self) -> bool {
            self.reference.is_none()
        }

        fn load(&self) -> Result<RawValue, LoadError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            match &self.reference {
                Some(r) if r == "broken" => Err(LoadError::new("unreadable blob")),
                Some(r) => Ok(RawValue::Text(r.clone())),
                None => Ok(RawValue::Null),
            }
        }
    }

    fn loader(reference: Option<&str>) -> Arc<CountingLoader> {
        Arc::new(CountingLoader {
            reference: reference.map(str::to_string),
            loads: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_is_null_does_not_load() {
        let l = loader(None);
        let deferred = DeferredValue::new(l.clone());
        assert!(deferred.is_null());
        assert_eq!(l.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_materializes_once() {
        let l = loader(Some("payload"));
        let deferred = DeferredValue::new(l.clone());
        assert!(!deferred.is_null());
        assert_eq!(l.loads.load(Ordering::SeqCst), 0);

        let first = deferred.materialize(ValueType::Text).unwrap().cloned();
        let second = deferred.materialize(ValueType::Text).unwrap().cloned();
        assert_eq!(first, Some(Scalar::Text("payload".to_string())));
        assert_eq!(first, second);
        assert_eq!(l.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_error_surfaces_on_materialize() {
        let deferred = DeferredValue::new(loader(Some("broken")));
        assert!(!deferred.is_null());
        assert!(deferred.materialize(ValueType::Text).is_err());
    }
}
