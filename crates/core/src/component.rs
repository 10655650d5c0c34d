//! Component prop validation — the seam to the host's UI component library.
//!
//! When a tool emits a `component` content item, the dispatcher asks the
//! catalog whether that component exists and whether the item's props satisfy
//! the component's own schema. The catalog is an external collaborator: the
//! host typically lazy-loads component definitions, so the lookup is async.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::ContentError;
use crate::tool::validate_params;

/// Resolves component names to prop validators.
#[async_trait]
pub trait ComponentCatalog: Send + Sync {
    /// Ensure `name` is a known, loadable component and check `props`
    /// against its prop schema.
    async fn validate_props(
        &self,
        name: &str,
        props: &serde_json::Value,
    ) -> std::result::Result<(), ContentError>;
}

/// A catalog backed by a static name → prop-schema map.
///
/// Suitable for hosts with a fixed component set, and for tests. Schemas use
/// the same JSON Schema object shape as tool parameter schemas.
pub struct StaticCatalog {
    schemas: HashMap<String, serde_json::Value>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Register a component's prop schema. Replaces any existing entry.
    pub fn register(&mut self, name: impl Into<String>, schema: serde_json::Value) {
        self.schemas.insert(name.into(), schema);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComponentCatalog for StaticCatalog {
    async fn validate_props(
        &self,
        name: &str,
        props: &serde_json::Value,
    ) -> std::result::Result<(), ContentError> {
        let schema = self
            .schemas
            .get(name)
            .ok_or_else(|| ContentError::UnknownComponent(name.to_string()))?;

        validate_params(schema, props).map_err(|e| ContentError::InvalidProps {
            component: name.to_string(),
            reason: e.to_string(),
        })
    }
}
