//! Employee directory service

use std::collections::HashSet;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    export,
    import,
    models::{
        fetch_all, Asset, AssetQuery, CreateEmployee, Employee, EmployeeQuery, ImportResult,
        PaginatedResponse, UpdateEmployee,
    },
    repository::{filters::normalize, Repository},
};

#[derive(Clone)]
pub struct EmployeesService {
    repository: Repository,
}

impl EmployeesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &EmployeeQuery) -> AppResult<PaginatedResponse<Employee>> {
        self.repository.employees_list(query).await
    }

    /// Every employee matching `query`, unpaginated
    pub async fn all(&self, query: &EmployeeQuery) -> AppResult<Vec<Employee>> {
        fetch_all(|page| {
            let query = query.at_page(page);
            async move { self.repository.employees_list(&query).await }
        })
        .await
    }

    pub async fn get(&self, id: &str) -> AppResult<Employee> {
        self.repository.employees_get(id).await
    }

    /// Lookup by exact full name (case- and accent-insensitive)
    pub async fn get_by_name(&self, name: &str) -> AppResult<Employee> {
        let wanted = normalize(name.trim());
        let query = EmployeeQuery {
            search: Some(name.trim().to_string()),
            ..Default::default()
        };
        self.all(&query)
            .await?
            .into_iter()
            .find(|e| normalize(&e.full_name) == wanted)
            .ok_or_else(|| AppError::NotFound(format!("Employee '{}' not found", name)))
    }

    /// Resolve an employee id or exact full name
    pub async fn resolve(&self, reference: &str) -> AppResult<Employee> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(AppError::Validation("Employee reference is required".to_string()));
        }
        match self.repository.employees_get(reference).await {
            Ok(employee) => return Ok(employee),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        self.get_by_name(reference).await
    }

    pub async fn create(&self, data: CreateEmployee) -> AppResult<Employee> {
        data.validate()?;
        self.ensure_email_free(&data.email, None).await?;
        let employee = self.repository.employees_create(data).await?;
        tracing::info!(id = %employee.id, "employee created");
        Ok(employee)
    }

    pub async fn update(&self, id: &str, data: UpdateEmployee) -> AppResult<Employee> {
        data.validate()?;
        if let Some(email) = &data.email {
            self.ensure_email_free(email, Some(id)).await?;
        }
        self.repository.employees_update(id, data).await
    }

    /// Remove an employee; assets pointing at them are left as they are
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.employees_delete(id).await
    }

    /// Assets currently held by the employee
    pub async fn assets_of(&self, id: &str) -> AppResult<Vec<Asset>> {
        let employee = self.get(id).await?;
        let query = AssetQuery {
            employee: Some(employee.id.clone()),
            ..Default::default()
        };
        let assets = fetch_all(|page| {
            let query = query.at_page(page);
            async move { self.repository.assets_list(&query).await }
        })
        .await?;
        Ok(assets
            .into_iter()
            .filter(|a| a.employee.reference() == Some(employee.id.as_str()))
            .collect())
    }

    async fn ensure_email_free(&self, email: &str, except: Option<&str>) -> AppResult<()> {
        let taken = self
            .all(&EmployeeQuery::default())
            .await?
            .iter()
            .any(|e| e.email.eq_ignore_ascii_case(email.trim()) && Some(e.id.as_str()) != except);
        if taken {
            return Err(AppError::Conflict(format!(
                "An employee with email {} already exists",
                email
            )));
        }
        Ok(())
    }

    /// Create one employee per valid CSV row; duplicate emails are rejected
    pub async fn import_csv(&self, text: &str) -> AppResult<ImportResult> {
        let parsed = import::parse_employees_csv(text)?;
        let mut result = ImportResult::default();
        for rejected in parsed.rejected {
            result.record_failure(rejected.row, rejected.message);
        }

        let mut emails: HashSet<String> = self
            .all(&EmployeeQuery::default())
            .await?
            .into_iter()
            .map(|e| e.email.to_lowercase())
            .collect();

        for (row, data) in parsed.records {
            if let Err(e) = data.validate() {
                result.record_failure(row, AppError::from(e).user_message());
                continue;
            }
            if !emails.insert(data.email.to_lowercase()) {
                result.record_failure(row, format!("Duplicate email {}", data.email));
                continue;
            }
            match self.repository.employees_create(data).await {
                Ok(_) => result.record_success(),
                Err(e) => result.record_failure(row, e.user_message()),
            }
        }

        let result = result.finish();
        tracing::info!(imported = result.imported, failed = result.failed, "employee import done");
        Ok(result)
    }

    pub async fn export_csv(&self, query: &EmployeeQuery) -> AppResult<String> {
        export::employees_to_csv(&self.all(query).await?)
    }
}
