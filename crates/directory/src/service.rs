//! Department lifecycle: create/update/delete with relational invariants.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use warden_core::{AccessError, AccessResult, DepartmentId};

use crate::department::{Department, DepartmentDraft};
use crate::tree::{build_tree, DepartmentNode};

/// Durable storage for department records.
///
/// All operations address live rows only; soft-deleted departments are
/// invisible through this trait.
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn find(&self, id: DepartmentId) -> AccessResult<Option<Department>>;
    async fn find_by_name(&self, name: &str) -> AccessResult<Option<Department>>;
    async fn list(&self) -> AccessResult<Vec<Department>>;
    async fn insert(&self, department: &Department) -> AccessResult<()>;
    async fn update(&self, department: &Department) -> AccessResult<()>;
    async fn soft_delete(&self, id: DepartmentId) -> AccessResult<()>;
    async fn child_count(&self, id: DepartmentId) -> AccessResult<u64>;
}

/// Department administration service.
///
/// Enforces the relational invariants the entity cannot check for itself:
/// name uniqueness, parent existence, self-parent rejection, and
/// delete-blocked-by-children.
pub struct DepartmentService {
    repo: Arc<dyn DepartmentRepository>,
}

impl DepartmentService {
    pub fn new(repo: Arc<dyn DepartmentRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, draft: DepartmentDraft) -> AccessResult<Department> {
        if self.repo.find_by_name(&draft.name).await?.is_some() {
            return Err(AccessError::conflict(format!(
                "department '{}' already exists",
                draft.name
            )));
        }
        if let Some(parent_id) = draft.parent_id {
            self.require_parent(parent_id).await?;
        }

        let department = draft.create();
        self.repo.insert(&department).await?;
        tracing::info!(id = %department.id, name = %department.name, "department created");
        Ok(department)
    }

    pub async fn get(&self, id: DepartmentId) -> AccessResult<Department> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AccessError::not_found(format!("department {id} does not exist")))
    }

    pub async fn list(&self) -> AccessResult<Vec<Department>> {
        self.repo.list().await
    }

    /// The department forest, derived on demand from the live records.
    pub async fn tree(&self) -> AccessResult<Vec<DepartmentNode>> {
        let departments = self.repo.list().await?;
        Ok(build_tree(&departments))
    }

    pub async fn update(
        &self,
        id: DepartmentId,
        draft: DepartmentDraft,
    ) -> AccessResult<Department> {
        let mut department = self.get(id).await?;

        if let Some(existing) = self.repo.find_by_name(&draft.name).await? {
            if existing.id != id {
                return Err(AccessError::conflict(format!(
                    "department '{}' already exists",
                    draft.name
                )));
            }
        }
        if let Some(parent_id) = draft.parent_id {
            if parent_id == id {
                return Err(AccessError::conflict(
                    "a department may not be its own parent",
                ));
            }
            self.require_parent(parent_id).await?;
        }

        department.name = draft.name;
        department.description = draft.description;
        department.parent_id = draft.parent_id;
        department.updated_at = Utc::now();
        self.repo.update(&department).await?;
        Ok(department)
    }

    /// Soft-delete a department. Blocked, not cascaded, while children
    /// exist.
    pub async fn delete(&self, id: DepartmentId) -> AccessResult<()> {
        self.get(id).await?;
        let children = self.repo.child_count(id).await?;
        if children > 0 {
            return Err(AccessError::conflict(format!(
                "department has {children} child department(s) and cannot be deleted"
            )));
        }
        self.repo.soft_delete(id).await?;
        tracing::info!(%id, "department deleted");
        Ok(())
    }

    async fn require_parent(&self, parent_id: DepartmentId) -> AccessResult<()> {
        if self.repo.find(parent_id).await?.is_none() {
            return Err(AccessError::not_found(format!(
                "parent department {parent_id} does not exist"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// HashMap-backed repository; mirrors the infra in-memory
    /// implementation.
    #[derive(Default)]
    struct MemRepo {
        rows: Mutex<HashMap<DepartmentId, Department>>,
    }

    #[async_trait]
    impl DepartmentRepository for MemRepo {
        async fn find(&self, id: DepartmentId) -> AccessResult<Option<Department>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .get(&id)
                .filter(|d| d.deleted_at.is_none())
                .cloned())
        }

        async fn find_by_name(&self, name: &str) -> AccessResult<Option<Department>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .find(|d| d.name == name && d.deleted_at.is_none())
                .cloned())
        }

        async fn list(&self) -> AccessResult<Vec<Department>> {
            let mut rows: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|d| d.deleted_at.is_none())
                .cloned()
                .collect();
            rows.sort_by_key(|d| d.created_at);
            Ok(rows)
        }

        async fn insert(&self, department: &Department) -> AccessResult<()> {
            self.rows
                .lock()
                .unwrap()
                .insert(department.id, department.clone());
            Ok(())
        }

        async fn update(&self, department: &Department) -> AccessResult<()> {
            self.rows
                .lock()
                .unwrap()
                .insert(department.id, department.clone());
            Ok(())
        }

        async fn soft_delete(&self, id: DepartmentId) -> AccessResult<()> {
            if let Some(row) = self.rows.lock().unwrap().get_mut(&id) {
                row.deleted_at = Some(Utc::now());
            }
            Ok(())
        }

        async fn child_count(&self, id: DepartmentId) -> AccessResult<u64> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|d| d.parent_id == Some(id) && d.deleted_at.is_none())
                .count() as u64)
        }
    }

    fn service() -> DepartmentService {
        DepartmentService::new(Arc::new(MemRepo::default()))
    }

    fn draft(name: &str, parent_id: Option<DepartmentId>) -> DepartmentDraft {
        DepartmentDraft::new(name, "", parent_id).unwrap()
    }

    #[tokio::test]
    async fn create_rejects_duplicate_names() {
        let service = service();
        service.create(draft("IT", None)).await.unwrap();
        let err = service.create(draft("IT", None)).await.unwrap_err();
        assert!(matches!(err, AccessError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_requires_an_existing_parent() {
        let service = service();
        let err = service
            .create(draft("Orphan", Some(DepartmentId::new())))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_rejects_self_parenting() {
        let service = service();
        let dept = service.create(draft("IT", None)).await.unwrap();
        let err = service
            .update(dept.id, draft("IT", Some(dept.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_allows_keeping_your_own_name() {
        let service = service();
        let dept = service.create(draft("IT", None)).await.unwrap();
        let updated = service
            .update(
                dept.id,
                DepartmentDraft::new("IT", "updated description", None).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(updated.description, "updated description");
    }

    #[tokio::test]
    async fn delete_is_blocked_while_children_exist() {
        let service = service();
        let root = service.create(draft("Company", None)).await.unwrap();
        let child = service
            .create(draft("Engineering", Some(root.id)))
            .await
            .unwrap();

        let err = service.delete(root.id).await.unwrap_err();
        assert!(matches!(err, AccessError::Conflict(_)));

        // Childless departments delete fine; the parent follows once empty.
        service.delete(child.id).await.unwrap();
        service.delete(root.id).await.unwrap();
        assert!(matches!(
            service.get(root.id).await.unwrap_err(),
            AccessError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn tree_reflects_the_live_records() {
        let service = service();
        let root = service.create(draft("Company", None)).await.unwrap();
        let eng = service
            .create(draft("Engineering", Some(root.id)))
            .await
            .unwrap();
        service
            .create(draft("Sales", Some(root.id)))
            .await
            .unwrap();
        service
            .create(draft("Platform", Some(eng.id)))
            .await
            .unwrap();

        let forest = service.tree().await.unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.len(), 2);
        assert_eq!(forest[0].children[0].children.len(), 1);
        assert_eq!(
            forest[0].children[0].children[0].department.name,
            "Platform"
        );
    }
}
