//! Lazily opened, resettable access to the configured store.
//!
//! The handle owns two injected pieces: a configuration loader and a factory
//! turning a configuration into a [`CollectionAccessor`]. Nothing is opened
//! until the first [`ConnectionHandle::accessor`] call; [`ConnectionHandle::reset`]
//! reloads the configuration and reopens.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::StoreConfig;
use crate::error::DbResult;
use crate::storage::CollectionAccessor;

type ConfigLoader = Box<dyn Fn() -> DbResult<StoreConfig> + Send + Sync>;
type AccessorFactory =
    Box<dyn Fn(&StoreConfig) -> DbResult<Arc<dyn CollectionAccessor>> + Send + Sync>;

struct Connected {
    config: StoreConfig,
    accessor: Arc<dyn CollectionAccessor>,
}

pub struct ConnectionHandle {
    load_config: ConfigLoader,
    factory: AccessorFactory,
    state: RwLock<Option<Connected>>,
}

impl ConnectionHandle {
    pub fn new<L, F>(load_config: L, factory: F) -> Self
    where
        L: Fn() -> DbResult<StoreConfig> + Send + Sync + 'static,
        F: Fn(&StoreConfig) -> DbResult<Arc<dyn CollectionAccessor>> + Send + Sync + 'static,
    {
        Self {
            load_config: Box::new(load_config),
            factory: Box::new(factory),
            state: RwLock::new(None),
        }
    }

    /// Configuration read from the environment on each (re)connect.
    pub fn from_env<F>(factory: F) -> Self
    where
        F: Fn(&StoreConfig) -> DbResult<Arc<dyn CollectionAccessor>> + Send + Sync + 'static,
    {
        Self::new(StoreConfig::from_env, factory)
    }

    /// Fixed configuration.
    pub fn with_config<F>(config: StoreConfig, factory: F) -> Self
    where
        F: Fn(&StoreConfig) -> DbResult<Arc<dyn CollectionAccessor>> + Send + Sync + 'static,
    {
        Self::new(move || Ok(config.clone()), factory)
    }

    /// The open accessor, connecting first if needed.
    pub fn accessor(&self) -> DbResult<Arc<dyn CollectionAccessor>> {
        if let Some(connected) = self.state.read().as_ref() {
            return Ok(connected.accessor.clone());
        }

        let mut state = self.state.write();
        // another caller may have connected while we waited
        if let Some(connected) = state.as_ref() {
            return Ok(connected.accessor.clone());
        }
        let connected = self.connect()?;
        let accessor = connected.accessor.clone();
        *state = Some(connected);
        Ok(accessor)
    }

    /// Configuration of the open connection, if any.
    pub fn config(&self) -> Option<StoreConfig> {
        self.state.read().as_ref().map(|c| c.config.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().is_some()
    }

    /// Drop the current accessor, reload the configuration and reconnect.
    pub fn reset(&self) -> DbResult<()> {
        let mut state = self.state.write();
        if state.take().is_some() {
            tracing::info!("Closed store connection");
        }
        *state = Some(self.connect()?);
        Ok(())
    }

    fn connect(&self) -> DbResult<Connected> {
        let config = (self.load_config)()?;
        tracing::info!(
            "Opening store connection to {} (application '{}')",
            config.redacted_uri(),
            config.application_name
        );
        let accessor = (self.factory)(&config)?;
        Ok(Connected { config, accessor })
    }
}
