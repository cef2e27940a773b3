//! Filter registry: id-keyed construction of filters from persisted records.

use std::collections::HashMap;

use serde_json::Value;
use tracing::info;

use super::{ColorCorrection, CompositeFilter, DropShadow, Filter, OuterGlow, Record};
use super::{color_correction, composite, drop_shadow, outer_glow};
use crate::error::FilterError;

/// Builds a filter from a record whose `id` matched the registration.
pub type FilterParser = fn(&Record<'_>) -> Filter;

/// Maps persisted filter ids to the parsers that rebuild them.
pub struct FilterRegistry {
    parsers: HashMap<String, FilterParser>,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl FilterRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { parsers: HashMap::new() }
    }

    /// A registry with every built-in filter registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ColorCorrection::ID, color_correction::parse);
        registry.register(DropShadow::ID, drop_shadow::parse);
        registry.register(OuterGlow::ID, outer_glow::parse);
        registry.register(CompositeFilter::ID, composite::parse);
        info!(count = registry.len(), "filter registry built");
        registry
    }

    /// Register `parser` under `id`, replacing any existing entry.
    pub fn register(&mut self, id: &str, parser: FilterParser) {
        self.parsers.insert(id.to_owned(), parser);
    }

    /// Register `parser` under `id`, failing if the id is taken.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::AlreadyRegistered`] when `id` already has a parser.
    pub fn try_register(&mut self, id: &str, parser: FilterParser) -> Result<(), FilterError> {
        if self.parsers.contains_key(id) {
            return Err(FilterError::AlreadyRegistered(id.to_owned()));
        }
        self.parsers.insert(id.to_owned(), parser);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.parsers.contains_key(id)
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Rebuild a filter from its persisted flat map.
    ///
    /// # Errors
    ///
    /// [`FilterError::InvalidRecord`] when `record` is not an object or has no
    /// string `id`; [`FilterError::UnknownId`] when no parser is registered.
    pub fn resolve(&self, record: &Value) -> Result<Filter, FilterError> {
        let map = record
            .as_object()
            .ok_or_else(|| FilterError::InvalidRecord("expected an object".into()))?;
        let record = Record::new(map);
        let id = record
            .id()
            .ok_or_else(|| FilterError::InvalidRecord("missing string id".into()))?;
        let parser = self
            .parsers
            .get(id)
            .ok_or_else(|| FilterError::UnknownId(id.to_owned()))?;
        Ok(parser(&record))
    }
}
