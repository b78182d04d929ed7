//! Canonical location row shape shared by the scraper and the web layer.
//!
//! Stockist integrations disagree wildly on field names (`name` vs `title`
//! vs `store_name`, `address1` vs `address_line_1` vs `street`, ...). The
//! scraper flattens everything into this fixed schema so CSV writing can
//! never fail on a missing key: every textual field defaults to an empty
//! string, and coordinates are `None` when absent or unparseable.

use serde::{Deserialize, Serialize};

/// Column order of the exported CSV, header included.
pub const CSV_COLUMNS: [&str; 12] = [
    "name",
    "address1",
    "address2",
    "city",
    "region",
    "postal_code",
    "country",
    "phone",
    "website",
    "lat",
    "lng",
    "address_full",
];

/// A single normalized store location.
///
/// `external_id` is the provider-assigned record ID when one was present in
/// the raw payload. It is used as the deduplication key and is not a CSV
/// column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub name: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub website: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Comma-joined non-empty address parts, derived by
    /// [`NormalizedRow::build_address_full`].
    pub address_full: String,
}

impl NormalizedRow {
    /// Derives `address_full` from the individual address fields.
    ///
    /// Joins the non-empty parts of address1, address2, city, region,
    /// postal code, and country with `", "`. An all-empty row yields an
    /// empty string.
    #[must_use]
    pub fn build_address_full(&self) -> String {
        [
            &self.address1,
            &self.address2,
            &self.city,
            &self.region,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim())
        .collect::<Vec<_>>()
        .join(", ")
    }
}
