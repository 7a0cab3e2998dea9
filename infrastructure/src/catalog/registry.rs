//! Tool Catalog
//!
//! The [`ToolCatalog`] aggregates tool providers and publishes immutable
//! [`CatalogSnapshot`]s. It is the read-mostly structure shared by all
//! turns; the snapshot pointer is the only mutable shared cell and is
//! swapped atomically when a refresh completes, so readers never block
//! writers and vice versa.
//!
//! # Merge rules
//!
//! Providers are kept in registration order. On a name collision across
//! providers, the later provider in registration order wins and the
//! collision is logged as a conflict — never silently duplicated.
//!
//! # Failure semantics
//!
//! A provider whose `list_tools()` fails is skipped for that refresh
//! cycle; its last successful listing is reused (stale-but-available), and
//! the failure is a soft fault reported through `tracing`, never to the
//! end user. A refresh running concurrently with turns never affects the
//! snapshots those turns already hold.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, warn};

use toolgate_domain::tool::{
    entities::ToolDescriptor,
    provider::ToolProvider,
    snapshot::{CatalogEntry, CatalogSnapshot},
};

/// Outcome of one refresh cycle, for diagnostics and the CLI.
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    /// Tools in the new snapshot
    pub total_tools: usize,
    /// Providers whose listing failed this cycle (stale listings reused)
    pub failed_providers: Vec<String>,
    /// Name collisions resolved in favor of the later provider
    pub conflicts: usize,
}

/// Aggregates tool providers into refreshable immutable snapshots.
pub struct ToolCatalog {
    /// Registered providers, in registration order
    providers: Vec<Arc<dyn ToolProvider>>,
    /// Provider ID -> last successful listing
    last_listed: Mutex<HashMap<String, Vec<ToolDescriptor>>>,
    /// Current snapshot, swapped wholesale on refresh completion
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    /// Monotonic refresh counter
    generation: AtomicU64,
}

impl ToolCatalog {
    /// Create a new empty catalog (snapshot generation 0).
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            last_listed: Mutex::new(HashMap::new()),
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::empty())),
            generation: AtomicU64::new(0),
        }
    }

    /// Register a tool provider (builder form, registration order matters).
    pub fn register<P: ToolProvider + 'static>(self, provider: P) -> Self {
        self.register_arc(Arc::new(provider))
    }

    /// Register a tool provider (Arc version).
    pub fn register_arc(mut self, provider: Arc<dyn ToolProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Query every provider and swap in a new snapshot.
    ///
    /// Safe to call concurrently with running turns; they keep the
    /// snapshot they took at turn start.
    pub async fn refresh(&self) -> RefreshReport {
        let mut report = RefreshReport::default();
        let mut entries: HashMap<String, CatalogEntry> = HashMap::new();

        for provider in &self.providers {
            let listing = match provider.list_tools().await {
                Ok(tools) => {
                    self.remember_listing(provider.id(), tools.clone());
                    tools
                }
                Err(e) => {
                    warn!(
                        provider = provider.id(),
                        error = %e,
                        "Provider listing failed, reusing last known tools"
                    );
                    report.failed_providers.push(provider.id().to_string());
                    self.recall_listing(provider.id())
                }
            };

            for tool in listing {
                let name = tool.name.clone();
                let entry = CatalogEntry {
                    descriptor: tool,
                    provider: provider.clone(),
                };
                if let Some(previous) = entries.insert(name.clone(), entry) {
                    report.conflicts += 1;
                    warn!(
                        tool = %name,
                        replaced = previous.provider.id(),
                        winner = provider.id(),
                        "Tool name conflict, later registration wins"
                    );
                } else {
                    debug!(tool = %name, provider = provider.id(), "Registered tool");
                }
            }
        }

        report.total_tools = entries.len();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let next = Arc::new(CatalogSnapshot::new(generation, entries));

        match self.snapshot.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }

        debug!(
            generation,
            tools = report.total_tools,
            failed = report.failed_providers.len(),
            "Catalog refreshed"
        );
        report
    }

    /// Current immutable snapshot. Never blocks on providers: this is a
    /// pointer read of the last completed refresh.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Registered provider IDs, in registration order.
    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    fn remember_listing(&self, provider_id: &str, tools: Vec<ToolDescriptor>) {
        let mut guard = match self.last_listed.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.insert(provider_id.to_string(), tools);
    }

    fn recall_listing(&self, provider_id: &str) -> Vec<ToolDescriptor> {
        let guard = match self.last_listed.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.get(provider_id).cloned().unwrap_or_default()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}
