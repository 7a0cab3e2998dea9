//! Catalog snapshot — immutable point-in-time view of the tool catalog
//!
//! A [`CatalogSnapshot`] is built by a catalog refresh and then never
//! mutated. Each chat turn takes the current snapshot at turn start and
//! keeps it for the whole turn, so a concurrent refresh cannot change tool
//! semantics mid-turn (snapshot isolation).

use std::collections::HashMap;
use std::sync::Arc;

use super::entities::ToolDescriptor;
use super::provider::ToolProvider;

/// One named tool in a snapshot: its descriptor plus the provider handle
/// that executes it.
#[derive(Clone)]
pub struct CatalogEntry {
    pub descriptor: ToolDescriptor,
    pub provider: Arc<dyn ToolProvider>,
}

/// Immutable mapping from tool name to catalog entry.
///
/// The `generation` counter increments on every successful refresh, which
/// makes it trivial to observe in tests (and logs) that an in-flight turn
/// kept its original view.
#[derive(Clone)]
pub struct CatalogSnapshot {
    generation: u64,
    entries: HashMap<String, CatalogEntry>,
}

impl CatalogSnapshot {
    /// An empty snapshot (generation 0), used before the first refresh.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            entries: HashMap::new(),
        }
    }

    pub fn new(generation: u64, entries: HashMap<String, CatalogEntry>) -> Self {
        Self { generation, entries }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.entries.get(name).map(|e| &e.descriptor)
    }

    pub fn provider_for(&self, name: &str) -> Option<Arc<dyn ToolProvider>> {
        self.entries.get(name).map(|e| e.provider.clone())
    }

    /// All descriptors, sorted by name for deterministic ordering.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut descriptors: Vec<ToolDescriptor> =
            self.entries.values().map(|e| e.descriptor.clone()).collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Ordered `(name, description)` pairs for the catalog query interface.
    pub fn listing(&self) -> Vec<(String, String)> {
        let mut listing: Vec<(String, String)> = self
            .entries
            .values()
            .map(|e| (e.descriptor.name.clone(), e.descriptor.description.clone()))
            .collect();
        listing.sort_by(|a, b| a.0.cmp(&b.0));
        listing
    }
}

impl std::fmt::Debug for CatalogSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSnapshot")
            .field("generation", &self.generation)
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolCall;
    use crate::tool::provider::ProviderError;
    use async_trait::async_trait;

    struct NullProvider;

    #[async_trait]
    impl ToolProvider for NullProvider {
        fn id(&self) -> &str {
            "null"
        }

        fn display_name(&self) -> &str {
            "Null"
        }

        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
            Ok(vec![])
        }

        async fn invoke(&self, call: &ToolCall) -> Result<serde_json::Value, ProviderError> {
            Err(ProviderError::ToolNotFound(call.tool_name.clone()))
        }
    }

    fn snapshot_with(names: &[&str]) -> CatalogSnapshot {
        let provider: Arc<dyn ToolProvider> = Arc::new(NullProvider);
        let entries = names
            .iter()
            .map(|n| {
                (
                    n.to_string(),
                    CatalogEntry {
                        descriptor: ToolDescriptor::new(*n, format!("tool {}", n)),
                        provider: provider.clone(),
                    },
                )
            })
            .collect();
        CatalogSnapshot::new(1, entries)
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CatalogSnapshot::empty();
        assert_eq!(snapshot.generation(), 0);
        assert!(snapshot.is_empty());
        assert!(snapshot.listing().is_empty());
    }

    #[test]
    fn test_lookup() {
        let snapshot = snapshot_with(&["local_weather", "secret_message"]);

        assert!(snapshot.contains("local_weather"));
        assert!(!snapshot.contains("Local_Weather")); // case-sensitive
        assert!(snapshot.descriptor("secret_message").is_some());
        assert!(snapshot.provider_for("local_weather").is_some());
        assert!(snapshot.provider_for("unknown").is_none());
    }

    #[test]
    fn test_listing_is_ordered() {
        let snapshot = snapshot_with(&["zeta", "alpha", "mid"]);
        let names: Vec<String> = snapshot.listing().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_descriptors_ordered() {
        let snapshot = snapshot_with(&["b", "a"]);
        let descriptors = snapshot.descriptors();
        assert_eq!(descriptors[0].name, "a");
        assert_eq!(descriptors[1].name, "b");
    }
}
