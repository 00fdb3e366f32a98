//! Purchase invoice service

use std::collections::BTreeSet;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    export,
    models::{
        fetch_all, CreateInvoice, Invoice, InvoiceQuery, LineItemInput, PaginatedResponse, UpdateInvoice,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct InvoicesService {
    repository: Repository,
}

impl InvoicesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &InvoiceQuery) -> AppResult<PaginatedResponse<Invoice>> {
        self.repository.invoices_list(query).await
    }

    pub async fn all(&self, query: &InvoiceQuery) -> AppResult<Vec<Invoice>> {
        fetch_all(|page| {
            let query = query.at_page(page);
            async move { self.repository.invoices_list(&query).await }
        })
        .await
    }

    pub async fn get(&self, id: i64) -> AppResult<Invoice> {
        self.repository.invoices_get(id).await
    }

    /// Every line must point at a known hardware model.
    async fn check_models(&self, lines: &[LineItemInput]) -> AppResult<()> {
        let ids: BTreeSet<i64> = lines.iter().map(|l| l.model_id).collect();
        for id in ids {
            match self.repository.models_get(id).await {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {
                    return Err(AppError::BusinessRule(format!("Unknown hardware model {}", id)));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn ensure_number_free(&self, number: &str, except: Option<i64>) -> AppResult<()> {
        let taken = self
            .all(&InvoiceQuery::default())
            .await?
            .iter()
            .any(|i| i.invoice_number.eq_ignore_ascii_case(number.trim()) && Some(i.id) != except);
        if taken {
            return Err(AppError::Conflict(format!("Invoice {} already exists", number.trim())));
        }
        Ok(())
    }

    pub async fn create(&self, data: CreateInvoice) -> AppResult<Invoice> {
        data.validate()?;
        self.ensure_number_free(&data.invoice_number, None).await?;
        self.check_models(&data.line_items).await?;
        let invoice = self.repository.invoices_create(data).await?;
        tracing::info!(id = invoice.id, number = %invoice.invoice_number, total = %invoice.total(), "invoice recorded");
        Ok(invoice)
    }

    pub async fn update(&self, id: i64, data: UpdateInvoice) -> AppResult<Invoice> {
        data.validate()?;
        if let Some(number) = &data.invoice_number {
            self.ensure_number_free(number, Some(id)).await?;
        }
        if let Some(lines) = &data.line_items {
            self.check_models(lines).await?;
        }
        self.repository.invoices_update(id, data).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.invoices_delete(id).await
    }

    pub async fn export_csv(&self, query: &InvoiceQuery) -> AppResult<String> {
        export::invoices_to_csv(&self.all(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::paginate;
    use crate::repository::MockDataSource;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn order(model_id: i64, quantity: u32) -> CreateInvoice {
        CreateInvoice {
            invoice_number: "INV-2026-010".into(),
            vendor: "Dell Technologies".into(),
            purchase_date: Utc::now(),
            line_items: vec![LineItemInput {
                model_id,
                description: "Latitude 5440".into(),
                quantity,
                unit_price: Decimal::new(120000, 2),
                tax_amount: Decimal::ZERO,
            }],
        }
    }

    #[tokio::test]
    async fn test_zero_quantity_is_invalid() {
        let mut mock = MockDataSource::new();
        mock.expect_invoices_create().never();
        let service = InvoicesService::new(Repository::new(Arc::new(mock)));

        let err = service.create(order(1, 0)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_model_breaks_rule() {
        let mut mock = MockDataSource::new();
        mock.expect_invoices_list()
            .returning(|_| Ok(paginate(Vec::new(), None, None)));
        mock.expect_models_get()
            .returning(|id| Err(AppError::NotFound(format!("Model with ID {} not found", id))));
        mock.expect_invoices_create().never();
        let service = InvoicesService::new(Repository::new(Arc::new(mock)));

        let err = service.create(order(99, 2)).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref msg) if msg == "Unknown hardware model 99"));
    }

    #[tokio::test]
    async fn test_duplicate_number_conflicts() {
        let mut mock = MockDataSource::new();
        mock.expect_invoices_list()
            .returning(|_| Ok(paginate(vec![order(1, 1).into_invoice(1)], None, None)));
        mock.expect_invoices_create().never();
        let service = InvoicesService::new(Repository::new(Arc::new(mock)));

        let err = service.create(order(1, 3)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
