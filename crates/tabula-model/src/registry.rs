//! Datasource registry
//!
//! Named references with an explicit datasource are resolved through the
//! process-wide registry returned by [`DatasourceRegistry::global`].

use crate::{Datasource, ModelError, ModelResult};
use indexmap::IndexMap;
use log::{info, warn};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

static GLOBAL: Lazy<DatasourceRegistry> = Lazy::new(DatasourceRegistry::new);

/// Registered datasources, by name, in registration order
#[derive(Default)]
pub struct DatasourceRegistry {
    datasources: RwLock<IndexMap<String, Arc<dyn Datasource>>>,
}

impl DatasourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static DatasourceRegistry {
        &GLOBAL
    }

    /// Initialise and register a datasource; names are unique
    ///
    /// The registry is not locked while the datasource initialises, so
    /// `initialise` may look up other datasources. When another datasource
    /// of the same name is registered meanwhile, this one is disposed again.
    pub fn register(&self, datasource: Arc<dyn Datasource>) -> ModelResult<()> {
        let name = datasource.name().to_string();
        if self.has_datasource(&name) {
            return Err(ModelError::DuplicateDatasource { name });
        }
        datasource.initialise()?;

        let mut datasources = self.datasources.write();
        if datasources.contains_key(&name) {
            drop(datasources);
            if let Err(e) = datasource.dispose() {
                warn!("Failed to dispose datasource {}: {}", name, e);
            }
            return Err(ModelError::DuplicateDatasource { name });
        }
        datasources.insert(name.clone(), datasource);
        drop(datasources);
        info!("Registered datasource {}", name);
        Ok(())
    }

    pub fn datasource(&self, name: &str) -> ModelResult<Arc<dyn Datasource>> {
        self.datasources
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::NoSuchDatasource {
                name: name.to_string(),
            })
    }

    pub fn has_datasource(&self, name: &str) -> bool {
        self.datasources.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.datasources.read().keys().cloned().collect()
    }

    /// Remove and dispose a datasource
    pub fn unregister(&self, name: &str) -> ModelResult<()> {
        let datasource = self
            .datasources
            .write()
            .shift_remove(name)
            .ok_or_else(|| ModelError::NoSuchDatasource {
                name: name.to_string(),
            })?;
        datasource.dispose()?;
        info!("Unregistered datasource {}", name);
        Ok(())
    }

    /// Dispose every datasource, most recently registered first
    ///
    /// Disposal keeps going after a failure; failures are logged.
    pub fn shutdown(&self) {
        let drained: Vec<_> = self.datasources.write().drain(..).collect();
        for (name, datasource) in drained.into_iter().rev() {
            match datasource.dispose() {
                Ok(()) => info!("Disposed datasource {}", name),
                Err(e) => warn!("Failed to dispose datasource {}: {}", name, e),
            }
        }
    }
}
