//! Processor registry
//!
//! Named factory map resolving the configured processor at process start.
//! Populated once during wiring and read-only afterwards; a duplicate name
//! is a configuration error at registration time, never at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::{Result, SeulaError};
use crate::processor::RequestProcessor;
use crate::processors::{
    DedupProcessor, DigestProcessor, EchoProcessor, NoOpProcessor, TimerProcessor,
    TrivialProcessor,
};

type ProcessorFactory = Box<dyn Fn(&Config) -> Arc<dyn RequestProcessor> + Send + Sync>;

/// Registry of named processor factories
pub struct ProcessorRegistry {
    factories: HashMap<String, ProcessorFactory>,
}

impl ProcessorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry preloaded with the builtin processors
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        registry.register("noop", |_| Arc::new(NoOpProcessor))?;
        registry.register("trivial", |_| Arc::new(TrivialProcessor))?;
        registry.register("echo", |_| Arc::new(EchoProcessor))?;
        registry.register("timer", |_| Arc::new(TimerProcessor))?;
        registry.register("digest", |_| Arc::new(DigestProcessor::new()))?;
        registry.register("dedup", |_| Arc::new(DedupProcessor::new()))?;
        Ok(registry)
    }

    /// Register a factory under a unique name
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn(&Config) -> Arc<dyn RequestProcessor> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(SeulaError::Config(format!(
                "processor '{name}' is already registered"
            )));
        }
        info!(processor = %name, "registering processor factory");
        self.factories.insert(name, Box::new(factory));
        Ok(())
    }

    /// Build the processor registered under `name`
    pub fn resolve(&self, name: &str, config: &Config) -> Result<Arc<dyn RequestProcessor>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            SeulaError::Config(format!("no processor registered under '{name}'"))
        })?;
        Ok(factory(config))
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_duplicate_name_is_config_error() {
        let mut registry = ProcessorRegistry::new();
        registry.register("noop", |_| Arc::new(NoOpProcessor)).unwrap();
        let err = registry
            .register("noop", |_| Arc::new(NoOpProcessor))
            .unwrap_err();
        assert!(matches!(err, SeulaError::Config(_)));
    }

    #[test]
    fn test_resolve_unknown_name() {
        let registry = ProcessorRegistry::new();
        assert!(matches!(
            registry.resolve("ghost", &Config::default()),
            Err(SeulaError::Config(_))
        ));
    }

    #[test]
    fn test_builtins_resolve() {
        let registry = ProcessorRegistry::with_builtins().unwrap();
        assert_eq!(registry.len(), 6);
        for name in ["noop", "trivial", "echo", "timer", "digest", "dedup"] {
            let processor = registry.resolve(name, &Config::default()).unwrap();
            assert_eq!(processor.name(), name);
        }
    }
}
