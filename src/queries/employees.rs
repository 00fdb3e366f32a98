//! Employee queries

use crate::{
    cache::{fields_of, MutationSpec, QueryClient, ASSET_KEYS, EMPLOYEE_KEYS},
    error::AppResult,
    models::{Asset, CreateEmployee, Employee, EmployeeQuery, PaginatedResponse, UpdateEmployee},
    services::{employees::EmployeesService, Services},
};

#[derive(Clone)]
pub struct EmployeeQueries {
    client: QueryClient,
    employees: EmployeesService,
}

impl EmployeeQueries {
    pub fn new(client: QueryClient, services: &Services) -> Self {
        Self {
            client,
            employees: services.employees.clone(),
        }
    }

    pub async fn list(&self, query: &EmployeeQuery) -> AppResult<PaginatedResponse<Employee>> {
        self.client
            .fetch_query(EMPLOYEE_KEYS.list(query), || self.employees.list(query))
            .await
    }

    pub async fn detail(&self, id: &str) -> AppResult<Employee> {
        self.client
            .fetch_query(EMPLOYEE_KEYS.detail(id), || self.employees.get(id))
            .await
    }

    /// Assets held by the employee; refreshed whenever an asset mutation settles
    pub async fn assets(&self, id: &str) -> AppResult<Vec<Asset>> {
        self.client
            .fetch_query(EMPLOYEE_KEYS.detail(id).child("assets"), || self.employees.assets_of(id))
            .await
    }

    pub async fn create(&self, data: CreateEmployee) -> AppResult<Employee> {
        let spec = MutationSpec::new("add employee", EMPLOYEE_KEYS.all()).on_success("Employee added");
        self.client.mutate(spec, self.employees.create(data)).await
    }

    pub async fn update(&self, id: &str, data: UpdateEmployee) -> AppResult<Employee> {
        let spec = MutationSpec::new("update employee", EMPLOYEE_KEYS.all())
            .merging(id, fields_of(&data))
            .invalidating(ASSET_KEYS.all())
            .on_success("Employee updated");
        self.client.mutate(spec, self.employees.update(id, data)).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let spec = MutationSpec::new("delete employee", EMPLOYEE_KEYS.all())
            .removing(id)
            .on_success("Employee deleted");
        self.client.mutate(spec, self.employees.delete(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEvent, NotificationLevel};
    use crate::repository::{fixture::FixtureSource, Repository};
    use std::sync::Arc;

    fn queries() -> EmployeeQueries {
        let source = FixtureSource::in_memory().unwrap();
        let services = Services::new(Repository::new(Arc::new(source)));
        EmployeeQueries::new(QueryClient::new(), &services)
    }

    #[tokio::test]
    async fn test_update_patches_cached_detail() {
        let q = queries();
        q.detail("EMP-007").await.unwrap();

        let data = UpdateEmployee {
            department: Some("Research".into()),
            ..Default::default()
        };
        let updated = q.update("EMP-007", data).await.unwrap();
        assert_eq!(updated.department, "Research");

        let cached: Employee = q.client.get_query_data(&EMPLOYEE_KEYS.detail("EMP-007")).unwrap();
        assert_eq!(cached.department, "Research");
        assert!(q.client.is_stale(&EMPLOYEE_KEYS.detail("EMP-007")));
    }

    #[tokio::test]
    async fn test_duplicate_email_keeps_cache_and_notifies() {
        let q = queries();
        let before = q.list(&EmployeeQuery::default()).await.unwrap();
        let jane = before.data.iter().find(|e| e.id == "EMP-007").unwrap().clone();
        let mut events = q.client.subscribe();

        let data = CreateEmployee {
            full_name: "Jane Twin".into(),
            email: jane.email.clone(),
            department: "IT".into(),
            position: "Tech".into(),
            is_active: None,
        };
        assert!(q.create(data).await.is_err());

        let cached: PaginatedResponse<Employee> = q.client.get_query_data(&EMPLOYEE_KEYS.list(&EmployeeQuery::default())).unwrap();
        assert_eq!(cached, before);

        let mut saw_error = false;
        while let Ok(event) = events.try_recv() {
            if let CacheEvent::Notify(n) = event {
                saw_error |= n.level == NotificationLevel::Error;
            }
        }
        assert!(saw_error);
    }
}
