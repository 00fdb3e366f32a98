//! Invoice queries

use crate::{
    cache::{fields_of, MutationSpec, QueryClient, INVOICE_KEYS},
    error::AppResult,
    models::{CreateInvoice, Invoice, InvoiceQuery, PaginatedResponse, UpdateInvoice},
    services::{invoices::InvoicesService, Services},
};

#[derive(Clone)]
pub struct InvoiceQueries {
    client: QueryClient,
    invoices: InvoicesService,
}

impl InvoiceQueries {
    pub fn new(client: QueryClient, services: &Services) -> Self {
        Self {
            client,
            invoices: services.invoices.clone(),
        }
    }

    pub async fn list(&self, query: &InvoiceQuery) -> AppResult<PaginatedResponse<Invoice>> {
        self.client
            .fetch_query(INVOICE_KEYS.list(query), || self.invoices.list(query))
            .await
    }

    pub async fn detail(&self, id: i64) -> AppResult<Invoice> {
        self.client
            .fetch_query(INVOICE_KEYS.detail(id), || self.invoices.get(id))
            .await
    }

    pub async fn create(&self, data: CreateInvoice) -> AppResult<Invoice> {
        let spec = MutationSpec::new("record invoice", INVOICE_KEYS.all()).on_success("Invoice recorded");
        self.client.mutate(spec, self.invoices.create(data)).await
    }

    pub async fn update(&self, id: i64, data: UpdateInvoice) -> AppResult<Invoice> {
        // line items only get ids once stored
        let mut fields = fields_of(&data);
        fields.remove("lineItems");
        let spec = MutationSpec::new("update invoice", INVOICE_KEYS.all())
            .merging(id, fields)
            .on_success("Invoice updated");
        self.client.mutate(spec, self.invoices.update(id, data)).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let spec = MutationSpec::new("delete invoice", INVOICE_KEYS.all())
            .removing(id)
            .on_success("Invoice deleted");
        self.client.mutate(spec, self.invoices.delete(id)).await
    }
}
