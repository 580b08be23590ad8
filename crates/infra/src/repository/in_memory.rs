//! In-memory department repository.
//!
//! Intended for tests/dev. Rows are kept in insertion order so listings
//! (and the tree derived from them) are deterministic.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use warden_core::{AccessError, AccessResult, DepartmentId};
use warden_directory::{Department, DepartmentRepository};

#[derive(Debug, Default)]
pub struct InMemoryDepartmentRepository {
    rows: RwLock<Vec<Department>>,
}

impl InMemoryDepartmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AccessResult<std::sync::RwLockReadGuard<'_, Vec<Department>>> {
        self.rows
            .read()
            .map_err(|_| AccessError::storage("department rows lock poisoned"))
    }

    fn write(&self) -> AccessResult<std::sync::RwLockWriteGuard<'_, Vec<Department>>> {
        self.rows
            .write()
            .map_err(|_| AccessError::storage("department rows lock poisoned"))
    }
}

#[async_trait]
impl DepartmentRepository for InMemoryDepartmentRepository {
    async fn find(&self, id: DepartmentId) -> AccessResult<Option<Department>> {
        Ok(self
            .read()?
            .iter()
            .find(|d| d.id == id && d.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> AccessResult<Option<Department>> {
        Ok(self
            .read()?
            .iter()
            .find(|d| d.name == name && d.deleted_at.is_none())
            .cloned())
    }

    async fn list(&self) -> AccessResult<Vec<Department>> {
        Ok(self
            .read()?
            .iter()
            .filter(|d| d.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn insert(&self, department: &Department) -> AccessResult<()> {
        self.write()?.push(department.clone());
        Ok(())
    }

    async fn update(&self, department: &Department) -> AccessResult<()> {
        let mut rows = self.write()?;
        match rows.iter_mut().find(|d| d.id == department.id) {
            Some(row) => {
                *row = department.clone();
                Ok(())
            }
            None => Err(AccessError::not_found(format!(
                "department {} does not exist",
                department.id
            ))),
        }
    }

    async fn soft_delete(&self, id: DepartmentId) -> AccessResult<()> {
        let mut rows = self.write()?;
        match rows.iter_mut().find(|d| d.id == id && d.deleted_at.is_none()) {
            Some(row) => {
                row.deleted_at = Some(Utc::now());
                Ok(())
            }
            None => Err(AccessError::not_found(format!(
                "department {id} does not exist"
            ))),
        }
    }

    async fn child_count(&self, id: DepartmentId) -> AccessResult<u64> {
        Ok(self
            .read()?
            .iter()
            .filter(|d| d.parent_id == Some(id) && d.deleted_at.is_none())
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use warden_directory::{DepartmentDraft, DepartmentService};

    use super::*;

    #[tokio::test]
    async fn soft_deleted_rows_disappear_from_every_read_path() {
        let repo = Arc::new(InMemoryDepartmentRepository::new());
        let service = DepartmentService::new(repo.clone());

        let dept = service
            .create(DepartmentDraft::new("IT", "", None).unwrap())
            .await
            .unwrap();
        service.delete(dept.id).await.unwrap();

        assert!(repo.find(dept.id).await.unwrap().is_none());
        assert!(repo.find_by_name("IT").await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());

        // The name is free again once the previous holder is soft-deleted.
        service
            .create(DepartmentDraft::new("IT", "", None).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn listing_preserves_insertion_order() {
        let repo = Arc::new(InMemoryDepartmentRepository::new());
        let service = DepartmentService::new(repo);

        for name in ["Company", "Engineering", "Sales"] {
            service
                .create(DepartmentDraft::new(name, "", None).unwrap())
                .await
                .unwrap();
        }

        let names: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Company", "Engineering", "Sales"]);
    }
}
