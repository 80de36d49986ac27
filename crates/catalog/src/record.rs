//! Raw record normalization
//!
//! CSV ingestion left the catalog with inconsistent headers: the first
//! column of an exported sheet carries a UTF-8 byte order mark, so
//! "Organization" sometimes arrives as "\u{feff}Organization". Alias
//! resolution is done here, once, first-match-wins, so the formatter never
//! has to know about header variants.

use std::collections::BTreeMap;

use referral_agent_core::RawRecord;
use serde_json::Value;

const ORGANIZATION_ALIASES: &[&str] = &[
    "\u{feff}Organization",
    "Organization",
    "\u{feff}Agency",
    "Agency",
];

const CATEGORY_ALIASES: &[&str] = &[
    "\u{feff}Service Category Type",
    "Service Category Type",
    "Service Category",
];

const POSTAL_ALIASES: &[&str] = &[
    "\u{feff}Service Area Zip Code",
    "Service Area Zip Code",
    "Zip Code",
    "Zipcode",
];

/// Fallback organization name when every alias is missing
const UNNAMED: &str = "Unnamed Service";

/// Normalize a postal code to the canonical zero-padded 5-character form
///
/// Accepts string or numeric input. Values that are not 1-5 digits after
/// trimming are rejected (treated as absent) rather than guessed at.
pub fn normalize_postal_code(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() || text.len() > 5 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{text:0>5}"))
}

fn take_first(fields: &mut BTreeMap<String, Value>, aliases: &[&str]) -> Option<Value> {
    for alias in aliases {
        if let Some(value) = fields.remove(*alias) {
            return Some(value);
        }
    }
    None
}

/// Resolve one raw row into a normalized [`RawRecord`]
///
/// Returns `None` when the row has no usable category or postal code; such
/// rows can never match a search and are dropped at ingest.
pub fn resolve_record(mut fields: BTreeMap<String, Value>) -> Option<RawRecord> {
    let organization = take_first(&mut fields, ORGANIZATION_ALIASES)
        .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNNAMED.to_string());

    let category = take_first(&mut fields, CATEGORY_ALIASES)
        .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())?;

    let postal_value = take_first(&mut fields, POSTAL_ALIASES)?;
    let postal_code = normalize_postal_code(&postal_value)?;

    Some(RawRecord {
        organization,
        category,
        postal_code,
        extra: fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_normalize_postal_code() {
        assert_eq!(normalize_postal_code(&json!("60605")), Some("60605".to_string()));
        assert_eq!(normalize_postal_code(&json!(" 60605 ")), Some("60605".to_string()));
        assert_eq!(normalize_postal_code(&json!(605)), Some("00605".to_string()));
        assert_eq!(normalize_postal_code(&json!("605")), Some("00605".to_string()));
        assert_eq!(normalize_postal_code(&json!("606051")), None);
        assert_eq!(normalize_postal_code(&json!("6060a")), None);
        assert_eq!(normalize_postal_code(&json!("")), None);
        assert_eq!(normalize_postal_code(&json!(null)), None);
    }

    #[test]
    fn test_resolve_bom_prefixed_headers() {
        let record = resolve_record(row(&[
            ("\u{feff}Organization", json!("Helping Hands")),
            ("\u{feff}Service Category Type", json!("Food Pantry")),
            ("Service Area Zip Code", json!(60605)),
            ("Hours", json!("Mon-Fri 9-5")),
        ]))
        .unwrap();

        assert_eq!(record.organization, "Helping Hands");
        assert_eq!(record.category, "Food Pantry");
        assert_eq!(record.postal_code, "60605");
        // Consumed aliases do not leak into extra
        assert!(!record.extra.contains_key("\u{feff}Organization"));
        assert_eq!(record.extra_str("Hours"), Some("Mon-Fri 9-5"));
    }

    #[test]
    fn test_plain_header_takes_over_when_bom_absent() {
        let record = resolve_record(row(&[
            ("Organization", json!("Food Bank")),
            ("Service Category Type", json!("Food Pantry")),
            ("Zipcode", json!("00605")),
        ]))
        .unwrap();
        assert_eq!(record.organization, "Food Bank");
        assert_eq!(record.postal_code, "00605");
    }

    #[test]
    fn test_missing_organization_defaults() {
        let record = resolve_record(row(&[
            ("Service Category Type", json!("Housing")),
            ("Service Area Zip Code", json!("60606")),
        ]))
        .unwrap();
        assert_eq!(record.organization, "Unnamed Service");
    }

    #[test]
    fn test_unusable_rows_are_dropped() {
        // No category
        assert!(resolve_record(row(&[
            ("Organization", json!("X")),
            ("Service Area Zip Code", json!("60605")),
        ]))
        .is_none());
        // Bad postal code
        assert!(resolve_record(row(&[
            ("Organization", json!("X")),
            ("Service Category Type", json!("Housing")),
            ("Service Area Zip Code", json!("downtown")),
        ]))
        .is_none());
    }
}
