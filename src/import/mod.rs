//! CSV import: header normalization and per-entity row parsing

pub mod headers;
pub mod parser;

pub use parser::{parse_employees_csv, parse_inventory_csv, parse_models_csv, ParsedCsv};
