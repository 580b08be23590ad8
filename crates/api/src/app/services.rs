//! Service wiring: storage adapters, policy store, engine, directory.

use std::sync::Arc;

use sqlx::PgPool;

use warden_authz::{AuthorizationEngine, PolicyAdapter, PolicyAdmin, PolicyStore};
use warden_directory::{DepartmentRepository, DepartmentService};
use warden_infra::{
    ensure_schema, InMemoryDepartmentRepository, InMemoryPolicyAdapter, PostgresPolicyAdapter,
    PostgresDepartmentRepository,
};

/// Long-lived services shared by all handlers.
pub struct AppServices {
    pub engine: AuthorizationEngine,
    pub admin: PolicyAdmin,
    pub departments: DepartmentService,
}

/// Wire up storage and services.
///
/// `DATABASE_URL` selects the Postgres adapters; without it the process
/// runs on in-memory storage (dev mode — nothing survives restart).
pub async fn build_services() -> anyhow::Result<AppServices> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = PgPool::connect(&url).await?;
            ensure_schema(&pool).await?;
            build(
                Arc::new(PostgresPolicyAdapter::new(pool.clone())),
                Arc::new(PostgresDepartmentRepository::new(pool)),
            )
            .await
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory storage");
            build(
                Arc::new(InMemoryPolicyAdapter::new()),
                Arc::new(InMemoryDepartmentRepository::new()),
            )
            .await
        }
    }
}

async fn build(
    adapter: Arc<dyn PolicyAdapter>,
    repo: Arc<dyn DepartmentRepository>,
) -> anyhow::Result<AppServices> {
    let store = Arc::new(PolicyStore::new(adapter));

    // The store must be loaded before the first enforce call.
    store.load().await?;

    Ok(AppServices {
        engine: AuthorizationEngine::new(store.clone()),
        admin: PolicyAdmin::new(store),
        departments: DepartmentService::new(repo),
    })
}
