//! CSV export
//!
//! Every export renders a header row followed by one row per record. Quoting is
//! left to [`csv::Writer`].

use csv::Writer;

use crate::{
    error::{AppError, AppResult},
    models::{Asset, Employee, HardwareModel, Invoice, MaintenanceRecord},
};

fn render<R>(headers: &[&str], records: impl IntoIterator<Item = R>) -> AppResult<String>
where
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for record in records {
        writer.write_record(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Csv(e.to_string()))
}

/// Assets with the holder's name instead of the raw reference
pub fn assets_to_csv(assets: &[Asset], employees: &[Employee]) -> AppResult<String> {
    let holder = |asset: &Asset| match asset.employee.reference() {
        None => "Unassigned".to_string(),
        Some(reference) => employees
            .iter()
            .find(|e| e.id == reference)
            .map_or_else(|| reference.to_string(), |e| e.full_name.clone()),
    };

    render(
        &[
            "ID", "Category", "Make", "Model", "Service Tag", "State", "Employee",
            "Location", "Warranty Expiry", "Notes",
        ],
        assets.iter().map(|a| {
            vec![
                a.id.to_string(),
                a.category.clone(),
                a.make.clone(),
                a.model.clone(),
                a.service_tag.clone(),
                a.state.as_str().to_string(),
                holder(a),
                a.location.clone(),
                a.warranty_expiry.map(|d| d.to_string()).unwrap_or_default(),
                a.notes.clone().unwrap_or_default(),
            ]
        }),
    )
}

pub fn employees_to_csv(employees: &[Employee]) -> AppResult<String> {
    render(
        &["ID", "Full Name", "Email", "Department", "Position", "Status"],
        employees.iter().map(|e| {
            [
                e.id.as_str(),
                e.full_name.as_str(),
                e.email.as_str(),
                e.department.as_str(),
                e.position.as_str(),
                if e.is_active { "Active" } else { "Inactive" },
            ]
        }),
    )
}

pub fn models_to_csv(models: &[HardwareModel]) -> AppResult<String> {
    render(
        &["ID", "Name", "Make", "Category", "CPU", "RAM", "Storage"],
        models.iter().map(|m| {
            vec![
                m.id.to_string(),
                m.name.clone(),
                m.make.clone(),
                m.category.clone(),
                m.spec("cpu").to_string(),
                m.spec("ram").to_string(),
                m.spec("storage").to_string(),
            ]
        }),
    )
}

pub fn invoices_to_csv(invoices: &[Invoice]) -> AppResult<String> {
    render(
        &["ID", "Invoice Number", "Vendor", "Purchase Date", "Line Items", "Total"],
        invoices.iter().map(|i| {
            vec![
                i.id.to_string(),
                i.invoice_number.clone(),
                i.vendor.clone(),
                i.purchase_date.date_naive().to_string(),
                i.line_items.len().to_string(),
                i.total().round_dp(2).to_string(),
            ]
        }),
    )
}

/// Maintenance report; missing values render as `Unassigned` / `N/A`
pub fn maintenance_to_csv(records: &[MaintenanceRecord]) -> AppResult<String> {
    render(
        &[
            "ID", "Asset Tag", "Category", "Issue", "Status", "Priority", "Technician",
            "Reported By", "Reported Date", "Completed Date", "Actual Cost",
        ],
        records.iter().map(|r| {
            vec![
                r.id.clone(),
                r.asset_tag.clone(),
                r.asset_category.clone(),
                r.issue.clone(),
                r.status.as_str().to_string(),
                r.priority.to_string(),
                r.technician.clone().unwrap_or_else(|| "Unassigned".to_string()),
                r.reported_by.clone(),
                r.reported_date.to_string(),
                r.completed_date.map_or_else(|| "N/A".to_string(), |d| d.to_string()),
                r.actual_cost.map_or_else(|| "N/A".to_string(), |c| c.to_string()),
            ]
        }),
    )
}
