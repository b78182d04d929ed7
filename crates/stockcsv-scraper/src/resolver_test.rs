use async_trait::async_trait;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::render::{PageRenderer, RenderedPage};

use super::*;

// ---------------------------------------------------------------------------
// scan_html
// ---------------------------------------------------------------------------

#[test]
fn scans_widget_tag_data_attribute() {
    let html = r#"<div data-stockist-widget-tag="u23010"></div>"#;
    assert_eq!(
        scan_html(html),
        Some(Identifier::AccountTag("u23010".to_string()))
    );
}

#[test]
fn scans_numeric_store_id_attribute() {
    let html = r#"<div class="locator" data-store-id="98765"></div>"#;
    assert_eq!(
        scan_html(html),
        Some(Identifier::StoreId("98765".to_string()))
    );
}

#[test]
fn scans_api_url_in_script_src() {
    let html = r#"<script src="https://stockist.co/api/v1/u12345/widget.js"></script>"#;
    assert_eq!(
        scan_html(html),
        Some(Identifier::AccountTag("u12345".to_string()))
    );
}

#[test]
fn scans_alternate_host_api_url() {
    let html = r#"<script src="https://stocki.st/api/v1/u777/widget.js"></script>"#;
    assert_eq!(
        scan_html(html),
        Some(Identifier::AccountTag("u777".to_string()))
    );
}

#[test]
fn scans_config_callback_global() {
    let html = "<script>window._stockistConfigCallback_u4242({});</script>";
    assert_eq!(
        scan_html(html),
        Some(Identifier::AccountTag("u4242".to_string()))
    );
}

#[test]
fn scans_inline_store_id_assignment() {
    let html = "<script>var stockistStoreId = 31337;</script>";
    assert_eq!(
        scan_html(html),
        Some(Identifier::StoreId("31337".to_string()))
    );
}

#[test]
fn scans_iframe_embed_query_parameter() {
    let html = r#"<iframe src="https://stockist.co/widget?store=555"></iframe>"#;
    assert_eq!(scan_html(html), Some(Identifier::StoreId("555".to_string())));
}

#[test]
fn plain_page_yields_nothing() {
    let html = "<html><body><p>Just a blog post about stores.</p></body></html>";
    assert_eq!(scan_html(html), None);
}

#[test]
fn unrelated_query_parameters_do_not_match() {
    let html = r#"<iframe src="https://maps.example.com/widget?store=999"></iframe>"#;
    assert_eq!(scan_html(html), None);
}

#[test]
fn host_merely_containing_the_prefix_does_not_match() {
    let html = r#"<iframe src="https://stockings.example.com/widget?store=999"></iframe>"#;
    assert_eq!(scan_html(html), None);
}

#[test]
fn alternate_host_embed_query_still_matches() {
    let html = r#"<iframe src="https://stocki.st/widget?tag=u321"></iframe>"#;
    assert_eq!(
        scan_html(html),
        Some(Identifier::AccountTag("u321".to_string()))
    );
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

struct CannedRenderer {
    page: RenderedPage,
}

#[async_trait]
impl PageRenderer for CannedRenderer {
    async fn render_and_sniff(&self, _url: &str) -> Result<RenderedPage, ScrapeError> {
        Ok(self.page.clone())
    }
}

struct FailingRenderer;

#[async_trait]
impl PageRenderer for FailingRenderer {
    async fn render_and_sniff(&self, _url: &str) -> Result<RenderedPage, ScrapeError> {
        Err(ScrapeError::Render("browser exploded".to_string()))
    }
}

fn test_config() -> ScrapeConfig {
    ScrapeConfig::default()
}

#[tokio::test]
async fn bare_numeric_input_resolves_without_network() {
    let config = test_config();
    let client = crate::fetch::build_client(&config).expect("client builds");
    let resolved = resolve(" 98765 ", &config, &client, None)
        .await
        .expect("fast path resolves");
    assert_eq!(resolved.identifier, Identifier::StoreId("98765".to_string()));
    assert!(resolved.referer.is_none());
}

#[tokio::test]
async fn account_override_bypasses_resolution() {
    let config = ScrapeConfig {
        account_override: Some("u23010".to_string()),
        ..test_config()
    };
    let client = crate::fetch::build_client(&config).expect("client builds");
    let resolved = resolve("https://unreachable.invalid/", &config, &client, None)
        .await
        .expect("override resolves");
    assert_eq!(
        resolved.identifier,
        Identifier::AccountTag("u23010".to_string())
    );
}

#[tokio::test]
async fn static_scan_finds_identifier_and_sets_referer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pages/stores"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><div data-stockist-widget-tag="u88"></div></body></html>"#,
        ))
        .mount(&server)
        .await;

    let config = test_config();
    let client = crate::fetch::build_client(&config).expect("client builds");
    let page_url = format!("{}/pages/stores", server.uri());
    let resolved = resolve(&page_url, &config, &client, None)
        .await
        .expect("static scan resolves");
    assert_eq!(resolved.identifier, Identifier::AccountTag("u88".to_string()));
    assert_eq!(resolved.referer.as_deref(), Some(page_url.as_str()));
}

#[tokio::test]
async fn sniffed_network_request_wins_over_rendered_dom() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no identifier</html>"))
        .mount(&server)
        .await;

    let renderer = CannedRenderer {
        page: RenderedPage {
            html: r#"<div data-stockist-widget-tag="u_from_dom"></div>"#.to_string(),
            observed_requests: vec![
                "https://cdn.example.com/app.js".to_string(),
                "https://stockist.co/api/v1/u55/locations/search?page=1".to_string(),
            ],
        },
    };

    let config = test_config();
    let client = crate::fetch::build_client(&config).expect("client builds");
    let resolved = resolve(&server.uri(), &config, &client, Some(&renderer))
        .await
        .expect("rendered fallback resolves");
    assert_eq!(
        resolved.identifier,
        Identifier::EndpointUrl(
            "https://stockist.co/api/v1/u55/locations/search?page=1".to_string()
        )
    );
}

#[tokio::test]
async fn rendered_dom_is_used_when_no_request_was_sniffed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nothing here</html>"))
        .mount(&server)
        .await;

    let renderer = CannedRenderer {
        page: RenderedPage {
            html: r#"<div data-stockist-widget-tag="u_rendered"></div>"#.to_string(),
            observed_requests: vec!["https://fonts.example.com/a.woff2".to_string()],
        },
    };

    let config = test_config();
    let client = crate::fetch::build_client(&config).expect("client builds");
    let resolved = resolve(&server.uri(), &config, &client, Some(&renderer))
        .await
        .expect("DOM scan resolves");
    assert_eq!(
        resolved.identifier,
        Identifier::AccountTag("u_rendered".to_string())
    );
}

#[tokio::test]
async fn resolution_failure_has_user_facing_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no locator</html>"))
        .mount(&server)
        .await;

    let config = test_config();
    let client = crate::fetch::build_client(&config).expect("client builds");
    let err = resolve(&server.uri(), &config, &client, None)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ScrapeError::Resolution { .. }));
    assert!(!err.to_string().is_empty());
    assert!(err.to_string().contains("store identifier"));
}

#[tokio::test]
async fn renderer_failure_still_ends_in_resolution_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nothing</html>"))
        .mount(&server)
        .await;

    let config = test_config();
    let client = crate::fetch::build_client(&config).expect("client builds");
    let err = resolve(&server.uri(), &config, &client, Some(&FailingRenderer))
        .await
        .expect_err("must fail");
    assert!(matches!(err, ScrapeError::Resolution { .. }));
}
