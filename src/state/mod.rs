pub mod settlement;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::RwLock;

use crate::{
    dao::pool_store::PoolStore, error::ServiceError, services::authorization::Authorizer,
};

pub type SharedState = Arc<AppState>;

/// Central application state storing the storage handle and the authorization policy.
pub struct AppState {
    pool_store: RwLock<Option<Arc<dyn PoolStore>>>,
    authorizer: Arc<dyn Authorizer>,
    degraded: AtomicBool,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(authorizer: Arc<dyn Authorizer>) -> SharedState {
        Arc::new(Self {
            pool_store: RwLock::new(None),
            authorizer,
            degraded: AtomicBool::new(true),
        })
    }

    /// Obtain a handle to the current pool store, if one is installed.
    pub async fn pool_store(&self) -> Option<Arc<dyn PoolStore>> {
        let guard = self.pool_store.read().await;
        guard.as_ref().cloned()
    }

    /// Return the installed store, failing with [`ServiceError::Degraded`] while storage is unusable.
    pub async fn require_pool_store(&self) -> Result<Arc<dyn PoolStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.pool_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new pool store implementation and leave degraded mode.
    pub async fn set_pool_store(&self, store: Arc<dyn PoolStore>) {
        {
            let mut guard = self.pool_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    /// Flip the degraded flag.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.store(value, Ordering::Release);
    }

    /// Policy deciding which callers may run administrative actions.
    pub fn authorizer(&self) -> &dyn Authorizer {
        self.authorizer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::pool_store::memory::{MemoryPoolStore, PoolData},
        services::authorization::StaticTokenAuthorizer,
    };

    #[tokio::test]
    async fn starts_degraded_until_store_installed() {
        let state = AppState::new(Arc::new(StaticTokenAuthorizer::new(None)));
        assert!(state.is_degraded());
        assert!(matches!(
            state.require_pool_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .set_pool_store(Arc::new(MemoryPoolStore::new(PoolData::default())))
            .await;
        assert!(!state.is_degraded());
        assert!(state.require_pool_store().await.is_ok());

        state.update_degraded(true);
        assert!(state.require_pool_store().await.is_err());
    }
}
