use chrono::Utc;
use tracing::debug;

use crate::api::{EmployeeDto, ShortListDto};
use crate::database::{DatabaseError, UnitOfWork};
use crate::database::models::Employee;
use crate::filter::Filter;
use crate::services::CurrentUser;

/// Employee business rules: audit stamping, active-only listings, DTO mapping.
///
/// Absent rows come back as `Ok(None)` or `Ok(false)`. Storage failures
/// propagate unchanged.
pub struct EmployeeService<'a> {
    uow: &'a UnitOfWork,
    current_user: CurrentUser,
}

impl<'a> EmployeeService<'a> {
    pub fn new(uow: &'a UnitOfWork, current_user: CurrentUser) -> Self {
        Self { uow, current_user }
    }

    pub async fn add(&self, dto: Option<EmployeeDto>) -> Result<Option<EmployeeDto>, DatabaseError> {
        let Some(dto) = dto else {
            return Ok(None);
        };

        let mut employee = Employee::from(dto);
        employee.audit.stamp_created(Some(self.current_user.id), Utc::now());
        let saved = self.uow.employees().add(employee).await?;
        debug!(id = saved.id, created_by = self.current_user.id, "employee added");
        Ok(Some(saved.into()))
    }

    /// Overwrite the name fields of an existing employee
    pub async fn update(&self, dto: EmployeeDto) -> Result<Option<EmployeeDto>, DatabaseError> {
        if dto.id <= 0 {
            return Ok(None);
        }

        let repo = self.uow.employees();
        let Some(mut employee) = repo.get_by_id(dto.id).await? else {
            return Ok(None);
        };

        employee.first_name = dto.first_name;
        employee.last_name = dto.last_name;
        employee.middle_name = dto.middle_name;
        employee.audit.stamp_updated(self.current_user.id, Utc::now());

        let saved = repo.update(employee).await?;
        Ok(Some(saved.into()))
    }

    /// Soft delete. `false` when the id is unknown or already deleted.
    pub async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let repo = self.uow.employees();
        match repo.get_by_id(id).await? {
            Some(employee) if employee.audit.is_active() => {
                repo.soft_delete(employee, self.current_user.id).await?;
                debug!(id, deleted_by = self.current_user.id, "employee deleted");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Includes soft-deleted rows
    pub async fn get_by_id(&self, id: i32) -> Result<Option<EmployeeDto>, DatabaseError> {
        Ok(self.uow.employees().get_by_id(id).await?.map(EmployeeDto::from))
    }

    pub async fn list(&self) -> Result<Vec<EmployeeDto>, DatabaseError> {
        let employees = self.uow.employees().get_all(Some(Filter::active())).await?;
        Ok(employees.into_iter().map(EmployeeDto::from).collect())
    }

    pub async fn short_list(&self) -> Result<Vec<ShortListDto>, DatabaseError> {
        let employees = self.uow.employees().get_all(Some(Filter::active())).await?;
        Ok(employees.iter().map(ShortListDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::manager::Connection;
    use crate::database::{MemoryDatabase, Session};

    const ACTOR: CurrentUser = CurrentUser { id: 5 };

    fn dto(first: &str, last: &str) -> EmployeeDto {
        EmployeeDto {
            first_name: first.into(),
            last_name: last.into(),
            ..Default::default()
        }
    }

    fn unit_of_work(memory: &MemoryDatabase) -> UnitOfWork {
        UnitOfWork::new(Session::new(Connection::Memory(memory.clone())))
    }

    #[tokio::test]
    async fn add_stamps_created_fields() {
        let uow = unit_of_work(&MemoryDatabase::new());
        let service = EmployeeService::new(&uow, ACTOR);

        assert!(service.add(None).await.unwrap().is_none());

        let mut input = dto("Ann", "Lee");
        input.middle_name = Some("Marie".into());
        input.is_deleted = Some(true);
        input.created_by = Some(99);
        let added = service.add(Some(input)).await.unwrap().unwrap();

        assert_eq!(added.id, 1);
        assert_eq!(added.created_by, Some(5));
        assert!(added.created_on.is_some());
        assert_eq!(added.is_deleted, Some(false));

        let loaded = service.get_by_id(1).await.unwrap().unwrap();
        assert_eq!((loaded.first_name.as_str(), loaded.last_name.as_str()), ("Ann", "Lee"));
        assert_eq!(loaded.middle_name.as_deref(), Some("Marie"));
    }

    #[tokio::test]
    async fn update_with_bad_id_writes_nothing() {
        let memory = MemoryDatabase::new();
        let uow = unit_of_work(&memory);
        let service = EmployeeService::new(&uow, ACTOR);
        service.add(Some(dto("Ann", "Lee"))).await.unwrap();

        for id in [0, -1, 42] {
            let result = service.update(EmployeeDto { id, ..dto("X", "Y") }).await.unwrap();
            assert!(result.is_none());
        }
        let stored = service.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Ann");
        assert!(stored.updated_on.is_none());
        assert_eq!(memory.count("employees").await, 1);
    }

    #[tokio::test]
    async fn update_changes_names_only() {
        let uow = unit_of_work(&MemoryDatabase::new());
        let service = EmployeeService::new(&uow, ACTOR);
        let added = service.add(Some(dto("Ann", "Lee"))).await.unwrap().unwrap();

        let mut change = dto("Anne", "Lee");
        change.id = added.id;
        change.middle_name = Some("M".into());
        change.is_deleted = Some(true);
        let updated = service.update(change).await.unwrap().unwrap();

        assert_eq!(updated.first_name, "Anne");
        assert_eq!(updated.middle_name.as_deref(), Some("M"));
        assert_eq!(updated.updated_by, Some(5));
        assert!(updated.updated_on.is_some());
        assert_eq!(updated.is_deleted, Some(false));
        assert_eq!(updated.created_on, added.created_on);

        // Omitting middleName clears it
        let mut change = dto("Anne", "Lee");
        change.id = added.id;
        let cleared = service.update(change).await.unwrap().unwrap();
        assert!(cleared.middle_name.is_none());
        assert!(service.get_by_id(added.id).await.unwrap().unwrap().middle_name.is_none());
    }

    #[tokio::test]
    async fn delete_is_soft_and_only_once() {
        let memory = MemoryDatabase::new();
        let uow = unit_of_work(&memory);
        let service = EmployeeService::new(&uow, ACTOR);
        service.add(Some(dto("Ann", "Lee"))).await.unwrap();
        service.add(Some(dto("Bo", "Kim"))).await.unwrap();

        assert!(!service.delete(77).await.unwrap());
        assert!(service.delete(1).await.unwrap());
        assert!(!service.delete(1).await.unwrap());

        let listed: Vec<i32> = service.list().await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(listed, vec![2]);

        let deleted = service.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(deleted.is_deleted, Some(true));
        assert_eq!(deleted.deleted_by, Some(5));
        assert!(deleted.deleted_on.is_some());
        assert_eq!(memory.count("employees").await, 2);
    }

    #[tokio::test]
    async fn short_list_projects_last_name() {
        let uow = unit_of_work(&MemoryDatabase::new());
        let service = EmployeeService::new(&uow, ACTOR);
        service.add(Some(dto("Ann", "Lee"))).await.unwrap();
        service.add(Some(dto("Bo", "Kim"))).await.unwrap();
        service.delete(2).await.unwrap();

        let short = service.short_list().await.unwrap();
        assert_eq!(short, vec![ShortListDto { id: 1, title: "Lee".into() }]);
    }

    #[tokio::test]
    async fn add_update_delete_scenario() {
        let uow = unit_of_work(&MemoryDatabase::new());
        let service = EmployeeService::new(&uow, ACTOR);

        let added = service.add(Some(dto("Ann", "Lee"))).await.unwrap().unwrap();
        assert_eq!(added.id, 1);
        assert!(added.created_on.is_some());
        assert_eq!(added.is_deleted, Some(false));

        let mut change = dto("Anne", "Lee");
        change.id = 1;
        service.update(change).await.unwrap().unwrap();
        let loaded = service.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(loaded.first_name, "Anne");
        assert!(loaded.updated_on.is_some());

        assert!(service.delete(1).await.unwrap());
        assert!(service.list().await.unwrap().is_empty());
        assert_eq!(service.get_by_id(1).await.unwrap().unwrap().is_deleted, Some(true));
    }

    #[tokio::test]
    async fn storage_errors_propagate() {
        let mut uow = unit_of_work(&MemoryDatabase::new());
        uow.dispose().await;
        let service = EmployeeService::new(&uow, ACTOR);
        assert!(matches!(service.list().await, Err(DatabaseError::SessionClosed)));
        assert!(matches!(service.delete(1).await, Err(DatabaseError::SessionClosed)));
    }
}
