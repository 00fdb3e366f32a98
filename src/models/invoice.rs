//! Invoice and invoice line item models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Vendor purchase record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub vendor: String,
    pub purchase_date: DateTime<Utc>,
    #[serde(default)]
    pub line_items: Vec<InvoiceLineItem>,
}

impl Invoice {
    /// Sum of every line (`quantity * unit price + tax`)
    pub fn total(&self) -> Decimal {
        self.line_items.iter().map(InvoiceLineItem::total).sum()
    }
}

/// One purchased model on an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineItem {
    pub id: i64,
    pub invoice_id: i64,
    pub model_id: i64,
    pub description: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub tax_amount: Decimal,
}

impl InvoiceLineItem {
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity) + self.tax_amount
    }
}

/// Line item as submitted with a create/update request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub model_id: i64,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub tax_amount: Decimal,
}

impl LineItemInput {
    pub fn into_line_item(self, id: i64, invoice_id: i64) -> InvoiceLineItem {
        InvoiceLineItem {
            id,
            invoice_id,
            model_id: self.model_id,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax_amount: self.tax_amount,
        }
    }
}

/// Create invoice request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoice {
    #[validate(length(min = 1, message = "Invoice number is required"))]
    pub invoice_number: String,
    #[validate(length(min = 1, message = "Vendor is required"))]
    pub vendor: String,
    pub purchase_date: DateTime<Utc>,
    #[serde(default)]
    #[validate(nested)]
    pub line_items: Vec<LineItemInput>,
}

impl CreateInvoice {
    pub fn into_invoice(self, id: i64) -> Invoice {
        let line_items = number_lines(id, self.line_items);
        Invoice {
            id,
            invoice_number: self.invoice_number.trim().to_string(),
            vendor: self.vendor.trim().to_string(),
            purchase_date: self.purchase_date,
            line_items,
        }
    }
}

/// Update invoice request; `lineItems`, when present, replaces every line
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub line_items: Option<Vec<LineItemInput>>,
}

impl UpdateInvoice {
    pub fn apply(self, invoice: &mut Invoice) {
        if let Some(v) = self.invoice_number {
            invoice.invoice_number = v;
        }
        if let Some(v) = self.vendor {
            invoice.vendor = v;
        }
        if let Some(v) = self.purchase_date {
            invoice.purchase_date = v;
        }
        if let Some(lines) = self.line_items {
            invoice.line_items = number_lines(invoice.id, lines);
        }
    }
}

/// Line ids are `invoice_id * 1000 + position`, unique across invoices.
fn number_lines(invoice_id: i64, lines: Vec<LineItemInput>) -> Vec<InvoiceLineItem> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| line.into_line_item(invoice_id * 1000 + i as i64 + 1, invoice_id))
        .collect()
}

/// Invoice list filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl InvoiceQuery {
    /// Same filters, one page of a bulk walk
    pub fn at_page(&self, page: usize) -> Self {
        Self {
            page: Some(page),
            page_size: Some(super::pagination::BULK_PAGE_SIZE),
            ..self.clone()
        }
    }
}
