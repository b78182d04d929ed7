//! Duplicate suppression across pages and fallback strategies.
//!
//! Overlapping pagination and multiple retrieval strategies can hand back
//! the same store more than once. Identity is the provider-assigned record
//! ID when present, otherwise the lowercased `(name, address_full)` pair.

use std::collections::HashSet;

use stockcsv_core::NormalizedRow;

/// Removes duplicate rows, preserving first-seen order. Idempotent.
#[must_use]
pub fn dedupe_rows(rows: Vec<NormalizedRow>) -> Vec<NormalizedRow> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(dedup_key(row)))
        .collect()
}

/// Stable identity key for one row. Keys are prefixed so a provider ID can
/// never collide with a name/address pair.
fn dedup_key(row: &NormalizedRow) -> String {
    match &row.external_id {
        Some(id) => format!("id:{id}"),
        None => format!(
            "addr:{}|{}",
            row.name.to_lowercase(),
            row.address_full.to_lowercase()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, address_full: &str, external_id: Option<&str>) -> NormalizedRow {
        NormalizedRow {
            external_id: external_id.map(str::to_string),
            name: name.to_string(),
            address_full: address_full.to_string(),
            ..NormalizedRow::default()
        }
    }

    #[test]
    fn removes_case_insensitive_name_address_duplicates() {
        let rows = vec![
            row("Whole Foods", "123 Main St, Austin", None),
            row("WHOLE FOODS", "123 MAIN ST, AUSTIN", None),
            row("Whole Foods", "9 Oak Ave, Dallas", None),
        ];
        let deduped = dedupe_rows(rows);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].address_full, "123 Main St, Austin");
        assert_eq!(deduped[1].address_full, "9 Oak Ave, Dallas");
    }

    #[test]
    fn provider_id_wins_over_differing_names() {
        // Same store exposed twice with cosmetic name changes but a stable ID.
        let rows = vec![
            row("Shop (Downtown)", "1 Rue A", Some("77")),
            row("Shop Downtown", "1 Rue A.", Some("77")),
        ];
        assert_eq!(dedupe_rows(rows).len(), 1);
    }

    #[test]
    fn distinct_provider_ids_are_kept_even_when_rows_look_identical() {
        let rows = vec![
            row("Franchise", "2 Av. B", Some("1")),
            row("Franchise", "2 Av. B", Some("2")),
        ];
        assert_eq!(dedupe_rows(rows).len(), 2);
    }

    #[test]
    fn preserves_first_seen_order() {
        let rows = vec![
            row("C", "3", None),
            row("A", "1", None),
            row("C", "3", None),
            row("B", "2", None),
        ];
        let deduped = dedupe_rows(rows);
        let names: Vec<_> = deduped.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn is_idempotent() {
        let rows = vec![
            row("A", "1", None),
            row("A", "1", None),
            row("B", "2", Some("9")),
            row("B", "2", Some("9")),
        ];
        let once = dedupe_rows(rows);
        let twice = dedupe_rows(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(dedupe_rows(vec![]).is_empty());
    }
}
