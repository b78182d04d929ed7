//! Last-resort extraction of locations from the rendered widget markup.
//!
//! When every API endpoint candidate comes back empty, the listing the
//! widget already painted into the page is still there. This module reads
//! `.st-list__item` style entries out of the rendered HTML and converts
//! them into raw records the normalizer understands. Address text is a
//! single blob in the DOM, so it gets split heuristically into street,
//! city, postal code, and country.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::types::RawRecord;

/// Containers that scope the listing; the first match wins, falling back
/// to the whole document.
const LIST_SELECTORS: [&str; 3] = [".st-list", ".stockist-list", "[class*='st-list__container']"];

/// Entry selectors tried in order; the first selector with any match is
/// used exclusively, since the looser patterns also match the stricter
/// ones.
const ITEM_SELECTORS: [&str; 4] = [
    ".st-list__item",
    ".stockist-location",
    "[class*='st-list__item']",
    "[data-testid='location-list-item']",
];

const NAME_SELECTORS: [&str; 3] = [
    ".st-list__name",
    ".stockist-location__name",
    "[class*='name']",
];
const NAME_FALLBACK_SELECTOR: &str = "h3, h2, strong";

const ADDR_SELECTORS: [&str; 4] = [
    ".st-list__address",
    ".stockist-location__address",
    "address",
    "[class*='address']",
];

const LINK_SELECTOR: &str = "a[href^='http']";

/// Parses location entries out of rendered widget HTML. Returns an empty
/// vec when the page carries no recognizable listing.
#[must_use]
pub fn extract_dom_locations(html: &str) -> Vec<RawRecord> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let scope = LIST_SELECTORS
        .iter()
        .find_map(|sel| {
            let selector = Selector::parse(sel).expect("valid selector");
            root.select(&selector).next()
        })
        .unwrap_or(root);

    let mut records = Vec::new();
    for item_sel in ITEM_SELECTORS {
        let selector = Selector::parse(item_sel).expect("valid selector");
        for item in scope.select(&selector) {
            if let Some(record) = parse_item(item) {
                records.push(record);
            }
        }
        if !records.is_empty() {
            break;
        }
    }
    records
}

/// Reads one listing entry. Entries with no name, address, or link are
/// skipped as layout noise.
fn parse_item(item: ElementRef<'_>) -> Option<RawRecord> {
    let name = first_text(item, &NAME_SELECTORS)
        .or_else(|| first_text(item, &[NAME_FALLBACK_SELECTOR]))
        .unwrap_or_default();
    let address_text = first_text(item, &ADDR_SELECTORS).unwrap_or_default();
    let website = first_link(item).unwrap_or_default();

    if name.is_empty() && address_text.is_empty() && website.is_empty() {
        return None;
    }

    let address = split_address(&address_text);
    let mut record = RawRecord::new();
    record.insert("name".to_string(), Value::String(name));
    record.insert("street".to_string(), Value::String(address.street));
    record.insert("city".to_string(), Value::String(address.city));
    record.insert(
        "postal_code".to_string(),
        Value::String(address.postal_code),
    );
    record.insert("country".to_string(), Value::String(address.country));
    record.insert("website".to_string(), Value::String(website));
    Some(record)
}

fn first_text(item: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for sel in selectors {
        let selector = Selector::parse(sel).expect("valid selector");
        for el in item.select(&selector) {
            let text = collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "));
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn first_link(item: ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse(LINK_SELECTOR).expect("valid selector");
    item.select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .find(|href| !href.contains("google"))
        .map(str::to_string)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct AddressParts {
    street: String,
    city: String,
    postal_code: String,
    country: String,
}

/// Known trailing country names; the widget lists addresses free-form and
/// mostly serves European merchants.
const COUNTRY_KEYWORDS: [&str; 15] = [
    "france",
    "belgique",
    "suisse",
    "italie",
    "spain",
    "espagne",
    "portugal",
    "germany",
    "allemagne",
    "uk",
    "united kingdom",
    "ireland",
    "pays-bas",
    "netherlands",
    "luxembourg",
];

/// Splits a free-form address blob: first segment is the street, a 4-5
/// digit token is the postal code, the segment carrying it (minus the
/// code) is the city, and a recognized trailing segment is the country.
fn split_address(text: &str) -> AddressParts {
    let collapsed = collapse_whitespace(text);
    let trimmed = collapsed.trim_matches(|c: char| matches!(c, ' ' | ',' | ';'));
    if trimmed.is_empty() {
        return AddressParts::default();
    }

    let postal_re = Regex::new(r"\b(\d{4,5})\b").expect("valid regex");
    let postal_code = postal_re
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let split_re = Regex::new(r"[,.;]\s*").expect("valid regex");
    let mut parts: Vec<String> = split_re
        .split(trimmed)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    let mut country = String::new();
    if let Some(last) = parts.last() {
        let lowered = last.to_lowercase();
        if COUNTRY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            country = parts.pop().unwrap_or_default();
        }
    }

    let mut city = String::new();
    if !postal_code.is_empty() {
        if let Some(part) = parts.iter().rev().find(|p| p.contains(&postal_code)) {
            city = part
                .replace(&postal_code, "")
                .trim_matches(|c: char| matches!(c, ' ' | ','))
                .to_string();
        }
    }
    if city.is_empty() && parts.len() >= 2 {
        city.clone_from(&parts[parts.len() - 1]);
    }

    let street = parts.first().cloned().unwrap_or_default();

    AddressParts {
        street,
        city,
        postal_code,
        country,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "dom_test.rs"]
mod tests;
