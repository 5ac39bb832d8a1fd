//! Backend registry abstract Trait

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use zonedesk_backend::ZoneBackend;

/// Backend Registry Trait
///
/// Holds every configured backend instance, indexed by sysname.
/// Populated once at start-up and only read afterwards.
#[async_trait]
pub trait BackendRegistry: Send + Sync {
    /// Register a backend instance
    ///
    /// # Arguments
    /// * `sysname` - Configuration key of the backend
    /// * `backend` - Backend instance
    async fn register(&self, sysname: String, backend: Arc<dyn ZoneBackend>);

    /// Get backend instance
    async fn get(&self, sysname: &str) -> Option<Arc<dyn ZoneBackend>>;

    /// List all registered backends, sorted by sysname
    async fn list(&self) -> Vec<Arc<dyn ZoneBackend>>;
}

/// In-memory backend registry
#[derive(Clone)]
pub struct InMemoryBackendRegistry {
    backends: Arc<RwLock<BTreeMap<String, Arc<dyn ZoneBackend>>>>,
}

impl InMemoryBackendRegistry {
    /// Create a new memory registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            backends: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl Default for InMemoryBackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendRegistry for InMemoryBackendRegistry {
    async fn register(&self, sysname: String, backend: Arc<dyn ZoneBackend>) {
        self.backends.write().await.insert(sysname, backend);
    }

    async fn get(&self, sysname: &str) -> Option<Arc<dyn ZoneBackend>> {
        self.backends.read().await.get(sysname).cloned()
    }

    async fn list(&self) -> Vec<Arc<dyn ZoneBackend>> {
        self.backends.read().await.values().cloned().collect()
    }
}
