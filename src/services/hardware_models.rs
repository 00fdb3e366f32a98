//! Hardware model catalog service

use std::collections::HashSet;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    export, import,
    models::{
        fetch_all, CreateHardwareModel, HardwareModel, ImportResult, ModelQuery, PaginatedResponse,
        UpdateHardwareModel,
    },
    repository::Repository,
};

fn identity(make: &str, name: &str) -> String {
    format!("{}\u{1f}{}", make.trim().to_lowercase(), name.trim().to_lowercase())
}

#[derive(Clone)]
pub struct HardwareModelsService {
    repository: Repository,
}

impl HardwareModelsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &ModelQuery) -> AppResult<PaginatedResponse<HardwareModel>> {
        self.repository.models_list(query).await
    }

    pub async fn all(&self, query: &ModelQuery) -> AppResult<Vec<HardwareModel>> {
        fetch_all(|page| {
            let query = query.at_page(page);
            async move { self.repository.models_list(&query).await }
        })
        .await
    }

    pub async fn get(&self, id: i64) -> AppResult<HardwareModel> {
        self.repository.models_get(id).await
    }

    /// Make + name identify a model; a second one with the same pair is refused.
    pub async fn create(&self, data: CreateHardwareModel) -> AppResult<HardwareModel> {
        data.validate()?;
        let wanted = identity(&data.make, &data.name);
        let exists = self
            .all(&ModelQuery::default())
            .await?
            .iter()
            .any(|m| identity(&m.make, &m.name) == wanted);
        if exists {
            return Err(AppError::Conflict(format!(
                "Model {} {} already exists",
                data.make.trim(),
                data.name.trim()
            )));
        }
        self.repository.models_create(data).await
    }

    pub async fn update(&self, id: i64, data: UpdateHardwareModel) -> AppResult<HardwareModel> {
        if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::Validation("Name cannot be empty".to_string()));
        }
        self.repository.models_update(id, data).await
    }

    /// Assets and invoice lines keep their `modelId`; nothing cascades.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.models_delete(id).await
    }

    pub async fn import_csv(&self, text: &str) -> AppResult<ImportResult> {
        let parsed = import::parse_models_csv(text)?;
        let mut result = ImportResult::default();
        for rejected in parsed.rejected {
            result.record_failure(rejected.row, rejected.message);
        }

        let mut known: HashSet<String> = self
            .all(&ModelQuery::default())
            .await?
            .iter()
            .map(|m| identity(&m.make, &m.name))
            .collect();

        for (row, data) in parsed.records {
            if !known.insert(identity(&data.make, &data.name)) {
                result.record_failure(row, format!("Model {} {} already exists", data.make, data.name));
                continue;
            }
            match self.repository.models_create(data).await {
                Ok(_) => result.record_success(),
                Err(e) => result.record_failure(row, e.user_message()),
            }
        }
        Ok(result.finish())
    }

    pub async fn export_csv(&self, query: &ModelQuery) -> AppResult<String> {
        export::models_to_csv(&self.all(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::paginate;
    use crate::repository::MockDataSource;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn latitude() -> HardwareModel {
        HardwareModel {
            id: 1,
            name: "Latitude 5440".into(),
            make: "Dell".into(),
            category: "Laptop".into(),
            specs: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_make_and_name_is_refused() {
        let mut mock = MockDataSource::new();
        mock.expect_models_list()
            .returning(|_| Ok(paginate(vec![latitude()], None, None)));
        mock.expect_models_create().never();

        let service = HardwareModelsService::new(Repository::new(Arc::new(mock)));
        let err = service
            .create(CreateHardwareModel {
                name: "latitude 5440 ".into(),
                make: "DELL".into(),
                category: "Laptop".into(),
                specs: BTreeMap::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_import_skips_known_models() {
        let mut mock = MockDataSource::new();
        mock.expect_models_list()
            .returning(|_| Ok(paginate(vec![latitude()], None, None)));
        mock.expect_models_create()
            .times(1)
            .returning(|data| Ok(data.into_model(2)));

        let service = HardwareModelsService::new(Repository::new(Arc::new(mock)));
        let csv = "Name,Make,Category,RAM\nLatitude 5440,Dell,Laptop,16GB\nThinkPad T14,Lenovo,Laptop,32GB\n";
        let result = service.import_csv(csv).await.unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors[0].row, 2);
    }
}
