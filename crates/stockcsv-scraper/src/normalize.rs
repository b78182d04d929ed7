//! Mapping from raw provider records onto the canonical row schema.
//!
//! Every canonical field tries an ordered list of known alias keys and
//! takes the first present non-empty value. Nothing here can fail: missing
//! keys become empty strings, malformed coordinates become `None`.

use serde_json::Value;
use stockcsv_core::NormalizedRow;

use crate::types::RawRecord;

const NAME_ALIASES: [&str; 5] = ["name", "title", "store_name", "company", "company_name"];
const ADDRESS1_ALIASES: [&str; 6] = [
    "address1",
    "address_line_1",
    "address_line1",
    "address",
    "street",
    "addr1",
];
const ADDRESS2_ALIASES: [&str; 5] = [
    "address2",
    "address_line_2",
    "address_line2",
    "addr2",
    "suite",
];
const CITY_ALIASES: [&str; 3] = ["city", "town", "locality"];
const REGION_ALIASES: [&str; 4] = ["state", "region", "province", "county"];
const POSTAL_ALIASES: [&str; 5] = ["postal_code", "zip", "zipcode", "zip_code", "postcode"];
const COUNTRY_ALIASES: [&str; 2] = ["country", "country_code"];
const PHONE_ALIASES: [&str; 3] = ["phone", "telephone", "phone_number"];
const WEBSITE_ALIASES: [&str; 4] = ["website", "url", "web", "site_url"];
const LAT_ALIASES: [&str; 2] = ["latitude", "lat"];
const LNG_ALIASES: [&str; 4] = ["longitude", "lng", "lon", "long"];

/// Normalizes one raw provider record. Never panics and never drops a
/// field: absent values default to empty strings.
#[must_use]
pub fn normalize_record(raw: &RawRecord) -> NormalizedRow {
    let mut row = NormalizedRow {
        external_id: raw.get("id").and_then(id_string),
        name: first_string(raw, &NAME_ALIASES),
        address1: first_string(raw, &ADDRESS1_ALIASES),
        address2: first_string(raw, &ADDRESS2_ALIASES),
        city: first_string(raw, &CITY_ALIASES),
        region: first_string(raw, &REGION_ALIASES),
        postal_code: first_string(raw, &POSTAL_ALIASES),
        country: first_string(raw, &COUNTRY_ALIASES),
        phone: first_string(raw, &PHONE_ALIASES),
        website: first_string(raw, &WEBSITE_ALIASES),
        lat: first_f64(raw, &LAT_ALIASES),
        lng: first_f64(raw, &LNG_ALIASES),
        address_full: String::new(),
    };
    row.address_full = row.build_address_full();
    row
}

/// First non-empty string value among the alias keys.
fn first_string(raw: &RawRecord, aliases: &[&str]) -> String {
    aliases
        .iter()
        .filter_map(|key| raw.get(*key))
        .find_map(value_to_string)
        .unwrap_or_default()
}

/// First parseable number among the alias keys. Accepts JSON numbers and
/// numeric strings; anything else is silently skipped.
fn first_f64(raw: &RawRecord, aliases: &[&str]) -> Option<f64> {
    aliases.iter().filter_map(|key| raw.get(*key)).find_map(|v| {
        v.as_f64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
    })
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Provider IDs show up as numbers or strings depending on the account.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
