//! CSV row parsing for employees, inventory and hardware models
//!
//! Parsing never touches storage: rows come back as create requests tagged with their
//! line number, and rows missing required fields come back as [`RowError`]s. Rows
//! whose field count differs from the header are skipped.

use csv::{ReaderBuilder, StringRecord, Trim};
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

use super::headers::{canonical_header, EMPLOYEE_HEADERS, INVENTORY_HEADERS, MODEL_HEADERS, SPEC_FIELDS};
use crate::{
    error::{AppError, AppResult},
    models::{
        legacy::parse_date, AssetState, Assignment, CreateAsset, CreateEmployee,
        CreateHardwareModel, RowError,
    },
};

/// Parsed rows plus the ones rejected on the way
#[derive(Debug, Clone)]
pub struct ParsedCsv<T> {
    /// `(line, record)` pairs; the header is line 1
    pub records: Vec<(usize, T)>,
    pub rejected: Vec<RowError>,
    /// Rows dropped for having the wrong number of fields
    pub skipped: usize,
}

impl<T> Default for ParsedCsv<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
            skipped: 0,
        }
    }
}

/// One data row keyed by canonical field name
struct Row {
    line: usize,
    fields: HashMap<String, String>,
}

impl Row {
    fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn get_or(&self, field: &str, default: &str) -> String {
        self.get(field).unwrap_or(default).to_string()
    }

    fn specs(&self) -> BTreeMap<String, String> {
        SPEC_FIELDS
            .iter()
            .filter_map(|key| self.get(key).map(|v| (key.to_string(), v.to_string())))
            .collect()
    }
}

/// Split `text` into header-keyed rows.
///
/// Returns `Ok(None)` for blank input.
fn read_rows(text: &str, table: &[(&str, &str)]) -> AppResult<Option<(Vec<Row>, usize)>> {
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Ok(None);
    }
    if text.lines().filter(|l| !l.trim().is_empty()).count() < 2 {
        return Err(AppError::Csv("CSV file is empty or missing headers".to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| canonical_header(h, table))
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0;
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line() as usize);
        if record.len() != headers.len() {
            tracing::debug!(line, fields = record.len(), expected = headers.len(), "skipping CSV row");
            skipped += 1;
            continue;
        }
        let fields = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(Row { line, fields });
    }

    Ok(Some((rows, skipped)))
}

fn parse_with<T>(
    text: &str,
    table: &[(&str, &str)],
    convert: impl Fn(&Row) -> Result<T, String>,
) -> AppResult<ParsedCsv<T>> {
    let Some((rows, skipped)) = read_rows(text, table)? else {
        return Ok(ParsedCsv::default());
    };

    let mut parsed = ParsedCsv {
        skipped,
        ..ParsedCsv::default()
    };
    for row in &rows {
        match convert(row) {
            Ok(record) => parsed.records.push((row.line, record)),
            Err(message) => parsed.rejected.push(RowError {
                row: row.line,
                message,
            }),
        }
    }
    Ok(parsed)
}

/// Employees need both a name and an email.
pub fn parse_employees_csv(text: &str) -> AppResult<ParsedCsv<CreateEmployee>> {
    parse_with(text, EMPLOYEE_HEADERS, |row| {
        let (Some(full_name), Some(email)) = (row.get("fullName"), row.get("email")) else {
            return Err("Missing required fields: full name and email".to_string());
        };
        Ok(CreateEmployee {
            full_name: full_name.to_string(),
            email: email.to_string(),
            department: row.get_or("department", ""),
            position: row.get_or("position", ""),
            is_active: None,
        })
    })
}

fn random_tag() -> String {
    format!("TAG-{:04}", rand::thread_rng().gen_range(0..10_000))
}

/// Inventory rows need at least one of make, model or service tag.
///
/// The employee column is kept as written; resolving it against the employee list is
/// up to the caller.
pub fn parse_inventory_csv(text: &str) -> AppResult<ParsedCsv<CreateAsset>> {
    parse_with(text, INVENTORY_HEADERS, |row| {
        if row.get("make").is_none() && row.get("model").is_none() && row.get("serviceTag").is_none() {
            return Err("Missing required fields: make, model or service tag".to_string());
        }

        let warranty_expiry = match row.get("warrantyExpiry") {
            None => None,
            Some(raw) => match parse_date(raw) {
                Some(date) => Some(date),
                None if raw.eq_ignore_ascii_case("n/a") => None,
                None => return Err(format!("Invalid warranty date '{}'", raw)),
            },
        };

        Ok(CreateAsset {
            category: row.get_or("category", "Laptop"),
            make: row.get_or("make", "Unknown"),
            model: row.get_or("model", "Unknown"),
            model_id: None,
            service_tag: row.get("serviceTag").map_or_else(random_tag, str::to_string),
            state: Some(row.get("state").map_or(AssetState::Good, AssetState::from)),
            employee: Some(row.get("employee").map_or(Assignment::Unassigned, Assignment::employee)),
            location: Some(row.get_or("location", "Office")),
            notes: row.get("notes").map(str::to_string),
            warranty_expiry,
            specs: row.specs(),
            invoice_line_item_id: None,
        })
    })
}

/// Models need a name or a make.
pub fn parse_models_csv(text: &str) -> AppResult<ParsedCsv<CreateHardwareModel>> {
    parse_with(text, MODEL_HEADERS, |row| {
        if row.get("name").is_none() && row.get("make").is_none() {
            return Err("Missing required fields: name or make".to_string());
        }
        Ok(CreateHardwareModel {
            name: row.get_or("name", "Unknown Model"),
            make: row.get_or("make", "Unknown"),
            category: row.get_or("category", "Laptop"),
            specs: row.specs(),
        })
    })
}
