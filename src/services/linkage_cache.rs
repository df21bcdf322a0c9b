//! Read-through cache of the resolved template linkage index.
//!
//! The index is loaded from the repository on first access and shared as an
//! `Arc` until `invalidate` drops it. Every linkage mutation must invalidate.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::LinkageIndex;
use crate::domain::ports::TemplateLinkageRepository;

pub struct LinkageCache<R: TemplateLinkageRepository> {
    repo: Arc<R>,
    cached: RwLock<Option<Arc<LinkageIndex>>>,
}

impl<R: TemplateLinkageRepository> LinkageCache<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            cached: RwLock::new(None),
        }
    }

    /// Return the cached index, loading it on first use.
    pub async fn get(&self) -> DomainResult<Arc<LinkageIndex>> {
        if let Some(index) = self.cached.read().await.as_ref() {
            return Ok(Arc::clone(index));
        }

        let mut slot = self.cached.write().await;
        if let Some(index) = slot.as_ref() {
            return Ok(Arc::clone(index));
        }

        let hosts = self.repo.list_hosts().await?;
        let index = Arc::new(LinkageIndex::resolve(&hosts));
        debug!(entities = index.len(), "linkage index loaded");
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Drop the cached index; the next `get` reloads it.
    pub async fn invalidate(&self) {
        if self.cached.write().await.take().is_some() {
            debug!("linkage index invalidated");
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.cached.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteTemplateLinkageRepository};
    use crate::domain::models::Host;

    async fn setup() -> (Arc<SqliteTemplateLinkageRepository>, LinkageCache<SqliteTemplateLinkageRepository>) {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = Arc::new(SqliteTemplateLinkageRepository::new(pool));
        let cache = LinkageCache::new(Arc::clone(&repo));
        (repo, cache)
    }

    #[tokio::test]
    async fn test_loads_on_first_access() {
        let (repo, cache) = setup().await;
        let template = Host::template("Apache by HTTP");
        let host = Host::new("Test host").with_template(template.id);
        repo.create_host(&template).await.unwrap();
        repo.create_host(&host).await.unwrap();

        assert!(!cache.is_loaded().await);
        let index = cache.get().await.unwrap();

        assert!(cache.is_loaded().await);
        assert!(index.is_linked(host.id, template.id));
    }

    #[tokio::test]
    async fn test_serves_stale_index_until_invalidated() {
        let (repo, cache) = setup().await;
        let template = Host::template("FreeBSD by Zabbix agent");
        let host = Host::new("Test host");
        repo.create_host(&template).await.unwrap();
        repo.create_host(&host).await.unwrap();

        let before = cache.get().await.unwrap();
        assert!(!before.is_linked(host.id, template.id));

        repo.link_template(host.id, template.id).await.unwrap();
        assert!(!cache.get().await.unwrap().is_linked(host.id, template.id));

        cache.invalidate().await;
        assert!(!cache.is_loaded().await);
        assert!(cache.get().await.unwrap().is_linked(host.id, template.id));
    }
}
