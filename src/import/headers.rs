//! Header synonym tables
//!
//! Headers are trimmed, whitespace-collapsed and lowercased before lookup. A header
//! that is not in the table falls back to its lowercase form with spaces removed.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub const EMPLOYEE_HEADERS: &[(&str, &str)] = &[
    ("fullname", "fullName"),
    ("full name", "fullName"),
    ("name", "fullName"),
    ("employee name", "fullName"),
    ("email", "email"),
    ("e-mail", "email"),
    ("email address", "email"),
    ("department", "department"),
    ("dept", "department"),
    ("position", "position"),
    ("role", "position"),
    ("job title", "position"),
    ("title", "position"),
];

pub const INVENTORY_HEADERS: &[(&str, &str)] = &[
    ("category", "category"),
    ("type", "category"),
    ("make", "make"),
    ("brand", "make"),
    ("manufacturer", "make"),
    ("model", "model"),
    ("service tag", "serviceTag"),
    ("servicetag", "serviceTag"),
    ("tag", "serviceTag"),
    ("serial number", "serviceTag"),
    ("serial", "serviceTag"),
    ("sn", "serviceTag"),
    ("employee", "employee"),
    ("assigned to", "employee"),
    ("user", "employee"),
    ("owner", "employee"),
    ("state", "state"),
    ("status", "state"),
    ("condition", "state"),
    ("location", "location"),
    ("warranty", "warrantyExpiry"),
    ("warranty expiry", "warrantyExpiry"),
    ("warrantyexpiry", "warrantyExpiry"),
    ("comments", "notes"),
    ("additional comments", "notes"),
    ("additionalcomments", "notes"),
    ("notes", "notes"),
    ("cpu", "cpu"),
    ("processor", "cpu"),
    ("ram", "ram"),
    ("memory", "ram"),
    ("storage", "storage"),
    ("disk", "storage"),
    ("dedicated gpu", "dedicatedgpu"),
    ("gpu", "dedicatedgpu"),
    ("usb-a ports", "usb-aports"),
    ("usb-c ports", "usb-cports"),
    ("refresh rate", "refreshhertz"),
];

pub const MODEL_HEADERS: &[(&str, &str)] = &[
    ("name", "name"),
    ("model name", "name"),
    ("model", "name"),
    ("category", "category"),
    ("type", "category"),
    ("make", "make"),
    ("brand", "make"),
    ("manufacturer", "make"),
    ("cpu", "cpu"),
    ("processor", "cpu"),
    ("ram", "ram"),
    ("memory", "ram"),
    ("storage", "storage"),
    ("disk", "storage"),
    ("ssd", "storage"),
    ("hdd", "storage"),
    ("dedicated gpu", "dedicatedgpu"),
    ("dedicatedgpu", "dedicatedgpu"),
    ("gpu", "dedicatedgpu"),
    ("graphics", "dedicatedgpu"),
    ("usb-a ports", "usb-aports"),
    ("usb-aports", "usb-aports"),
    ("usb a", "usb-aports"),
    ("usb-c ports", "usb-cports"),
    ("usb-cports", "usb-cports"),
    ("usb c", "usb-cports"),
    ("dimensions", "dimensions"),
    ("size", "dimensions"),
    ("resolution", "resolution"),
    ("display", "resolution"),
    ("refresh rate", "refreshhertz"),
    ("refreshhertz", "refreshhertz"),
    ("hz", "refreshhertz"),
];

/// Spec keys carried by inventory rows and models
pub const SPEC_FIELDS: &[&str] = &[
    "cpu",
    "ram",
    "storage",
    "dedicatedgpu",
    "usb-aports",
    "usb-cports",
    "dimensions",
    "resolution",
    "refreshhertz",
];

/// Map a raw header onto its canonical field name.
pub fn canonical_header(raw: &str, table: &[(&str, &str)]) -> String {
    let cleaned = WHITESPACE
        .replace_all(raw.trim_start_matches('\u{feff}').trim(), " ")
        .to_lowercase();
    table
        .iter()
        .find(|(synonym, _)| *synonym == cleaned)
        .map(|(_, field)| field.to_string())
        .unwrap_or_else(|| cleaned.replace(' ', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms_are_case_insensitive() {
        assert_eq!(canonical_header("Assigned To", INVENTORY_HEADERS), "employee");
        assert_eq!(canonical_header("employee", INVENTORY_HEADERS), "employee");
        assert_eq!(canonical_header("  assigned \t TO ", INVENTORY_HEADERS), "employee");
        assert_eq!(canonical_header("Serial Number", INVENTORY_HEADERS), "serviceTag");
        assert_eq!(canonical_header("SN", INVENTORY_HEADERS), "serviceTag");
        assert_eq!(canonical_header("Job Title", EMPLOYEE_HEADERS), "position");
    }

    #[test]
    fn test_unknown_header_fallback() {
        assert_eq!(canonical_header("Purchase Order", INVENTORY_HEADERS), "purchaseorder");
        assert_eq!(canonical_header("\u{feff}Name", EMPLOYEE_HEADERS), "fullName");
    }
}
