//! Built-in tool implementations for skein.
//!
//! These are deterministic stubs: they return plausible mock data so the
//! reasoning loop can be exercised end-to-end without network access. A
//! host embedding the runtime registers its own real tools alongside or
//! instead of these.

pub mod page_inspect;
pub mod weather_lookup;
pub mod web_search;

use skein_core::component::StaticCatalog;
use skein_core::tool::ToolRegistry;

/// Create a registry with all built-in tools.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(weather_lookup::WeatherLookupTool));
    registry.register(Box::new(web_search::WebSearchTool));
    registry.register(Box::new(page_inspect::PageInspectTool));
    registry
}

/// Create a catalog with the prop schemas for the built-in components.
pub fn default_catalog() -> StaticCatalog {
    let mut catalog = StaticCatalog::new();
    catalog.register(
        "WeatherCard",
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": { "type": "string" },
                "temperature": { "type": "number" },
                "units": { "type": "string" },
                "conditions": { "type": "string" }
            },
            "required": ["location", "temperature"]
        }),
    );
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_builtins() {
        let registry = default_registry();
        assert_eq!(
            registry.names(),
            vec!["page_inspect", "weather_lookup", "web_search"]
        );
    }

    #[test]
    fn default_catalog_knows_weather_card() {
        assert!(default_catalog().contains("WeatherCard"));
    }
}
