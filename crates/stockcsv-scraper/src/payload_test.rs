use super::*;

fn names(page: &ParsedPage) -> Vec<&str> {
    page.records
        .iter()
        .filter_map(|r| r.get("name").and_then(Value::as_str))
        .collect()
}

#[test]
fn parses_bare_json_array() {
    let body = r#"[{"name":"A"},{"name":"B"}]"#;
    let page = parse_payload(body, "application/json", "https://stockist.co/x");
    assert_eq!(names(&page), vec!["A", "B"]);
    assert!(!page.exhausted);
}

#[test]
fn parses_object_with_locations_container() {
    let body = r#"{"locations":[{"name":"A"}]}"#;
    let page = parse_payload(body, "application/json", "https://stockist.co/x");
    assert_eq!(names(&page), vec!["A"]);
}

#[test]
fn probes_container_keys_two_levels_deep() {
    let body = r#"{"data":{"stores":[{"name":"Nested"}]}}"#;
    let page = parse_payload(body, "application/json", "");
    assert_eq!(names(&page), vec!["Nested"]);
}

#[test]
fn unwraps_jsonp_envelope() {
    let body = r#"callback({"data":[{"name":"B"}]});"#;
    let page = parse_payload(body, "text/javascript", "");
    assert_eq!(names(&page), vec!["B"]);
}

#[test]
fn unwraps_jsonp_with_dotted_callback() {
    let body = r#"_stockistConfigCallback_u23010({"locations":[{"name":"C"}]})"#;
    let page = parse_payload(body, "text/javascript", "");
    assert_eq!(names(&page), vec!["C"]);
}

#[test]
fn extracts_array_from_overview_script() {
    let body = r#"
        var stockistOverview = {};
        stockistOverview.locations = [
            {"name": "Hemp House", "city": "Austin", "lat": 30.26},
            {"name": "CBD Depot", "city": "Dallas", "lat": 32.77}
        ];
        stockistOverview.render();
    "#;
    let page = parse_payload(body, "application/javascript", "https://stockist.co/overview.js");
    assert_eq!(names(&page), vec!["Hemp House", "CBD Depot"]);
}

#[test]
fn script_scan_prefers_location_like_array_over_noise() {
    // The first array literal is not location-like and must be skipped.
    let body = r#"
        var palette = [{"r": 1, "g": 2, "b": 3}];
        var stores = [{"name": "Shop", "address": "1 Main St", "city": "Lyon"}];
    "#;
    let page = parse_payload(body, "application/javascript", "");
    assert_eq!(names(&page), vec!["Shop"]);
}

#[test]
fn script_without_location_arrays_yields_empty() {
    let body = "window.analytics = [1, 2, 3]; console.log('hi');";
    let page = parse_payload(body, "application/javascript", "");
    assert!(page.records.is_empty());
}

#[test]
fn garbage_yields_empty() {
    let page = parse_payload("<html><body>nope</body></html>", "text/html", "");
    assert!(page.records.is_empty());
    assert!(!page.exhausted);
}

#[test]
fn empty_body_yields_empty() {
    let page = parse_payload("   ", "application/json", "");
    assert!(page.records.is_empty());
}

#[test]
fn total_pages_reached_reports_exhaustion() {
    let body = r#"{"current_page":3,"total_pages":3,"locations":[{"name":"Last"}]}"#;
    let page = parse_payload(body, "application/json", "");
    assert_eq!(names(&page), vec!["Last"]);
    assert!(page.exhausted);
}

#[test]
fn total_pages_remaining_is_not_exhaustion() {
    let body = r#"{"page":1,"total_pages":3,"locations":[{"name":"First"}]}"#;
    let page = parse_payload(body, "application/json", "");
    assert!(!page.exhausted);
}

#[test]
fn null_next_page_reports_exhaustion() {
    let body = r#"{"next_page":null,"locations":[{"name":"A"}]}"#;
    let page = parse_payload(body, "application/json", "");
    assert!(page.exhausted);
}

#[test]
fn meta_block_exhaustion_is_honored() {
    let body = r#"{"meta":{"has_more":false},"results":[{"name":"A"}]}"#;
    let page = parse_payload(body, "application/json", "");
    assert!(page.exhausted);
}

#[test]
fn numeric_string_page_counters_are_accepted() {
    let body = r#"{"current_page":"2","total_pages":"2","locations":[]}"#;
    let page = parse_payload(body, "application/json", "");
    assert!(page.exhausted);
}

#[test]
fn non_object_array_entries_are_dropped() {
    let body = r#"{"locations":[{"name":"A"}, 42, "noise", null]}"#;
    let page = parse_payload(body, "application/json", "");
    assert_eq!(page.records.len(), 1);
}

#[test]
fn balanced_array_rejects_mismatched_closer() {
    assert_eq!(balanced_array_prefix("[42}"), None);
}

#[test]
fn balanced_array_handles_nested_objects_and_trailing_code() {
    let s = r#"[{"a": [1, 2]}, {"b": "br]ace"}];run();"#;
    assert_eq!(
        balanced_array_prefix(s),
        Some(r#"[{"a": [1, 2]}, {"b": "br]ace"}]"#)
    );
}

#[test]
fn jsonp_unwrap_requires_callback_shape() {
    assert!(unwrap_jsonp("not a callback at all").is_none());
    assert!(unwrap_jsonp("f()").is_none());
    assert_eq!(unwrap_jsonp(r#"cb({"a":1});"#), Some(r#"{"a":1}"#));
}
