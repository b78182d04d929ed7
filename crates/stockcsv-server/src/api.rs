//! Web surface: a single form page plus the scrape endpoint that streams
//! back a CSV attachment (or JSON, on request).

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Form, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use stockcsv_core::AppConfig;
use stockcsv_scraper::{scrape_store_locations, PageRenderer, ScrapeConfig, ScrapeError};

use crate::csv_export;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

/// Accepted from the query string on GET and the form body on POST. Both
/// fields optional so a bare request still renders a useful error page.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeParams {
    pub url: Option<String>,
    pub format: Option<String>,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scrape", get(scrape).post(scrape))
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(render_form(None))
}

async fn scrape(
    State(state): State<AppState>,
    Query(query): Query<ScrapeParams>,
    form: Result<Form<ScrapeParams>, FormRejection>,
) -> Response {
    let form = form.map(|Form(params)| params).unwrap_or_default();
    let url = form
        .url
        .or(query.url)
        .map(|u| u.trim().to_string())
        .unwrap_or_default();
    let format = form.format.or(query.format);

    if url.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Html(render_form(Some(
                "Please enter a store locator page URL or a store ID.",
            ))),
        )
            .into_response();
    }

    let config = ScrapeConfig::from_app_config(&state.config);
    let renderer = build_renderer(&state.config);

    match scrape_store_locations(&url, &config, renderer.as_deref()).await {
        Ok(rows) => {
            if format.as_deref() == Some("json") {
                return Json(rows).into_response();
            }
            match csv_export::rows_to_csv(&rows) {
                Ok(bytes) => {
                    let filename =
                        format!("stores_{}.csv", chrono::Utc::now().format("%Y%m%d_%H%M%S"));
                    (
                        StatusCode::OK,
                        [
                            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                            (
                                header::CONTENT_DISPOSITION,
                                format!("attachment; filename=\"{filename}\""),
                            ),
                        ],
                        bytes,
                    )
                        .into_response()
                }
                Err(err) => {
                    tracing::error!(error = %err, "CSV serialization failed");
                    internal_error()
                }
            }
        }
        Err(err @ (ScrapeError::Resolution { .. } | ScrapeError::Retrieval { .. })) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(render_form(Some(&err.to_string()))),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(url, error = %err, "scrape failed");
            internal_error()
        }
    }
}

#[cfg(feature = "headless")]
fn build_renderer(config: &AppConfig) -> Option<Box<dyn PageRenderer>> {
    config.headless_enabled.then(|| {
        Box::new(stockcsv_scraper::ChromiumRenderer::new(
            config.render_timeout_secs,
        )) as Box<dyn PageRenderer>
    })
}

#[cfg(not(feature = "headless"))]
fn build_renderer(_config: &AppConfig) -> Option<Box<dyn PageRenderer>> {
    None
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render_form(Some(
            "Something went wrong while scraping. Please try again.",
        ))),
    )
        .into_response()
}

fn render_form(error: Option<&str>) -> String {
    let notice = error.map_or(String::new(), |msg| {
        format!(r#"<p class="error">{}</p>"#, escape_html(msg))
    });
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Store Locator CSV Export</title>
<style>
body {{ font-family: sans-serif; max-width: 40rem; margin: 4rem auto; padding: 0 1rem; }}
input[type=text] {{ width: 100%; padding: 0.5rem; }}
button {{ margin-top: 0.75rem; padding: 0.5rem 1.5rem; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<h1>Store Locator CSV Export</h1>
<p>Paste the URL of a page with an embedded Stockist store locator, or a bare store ID.</p>
{notice}
<form method="post" action="/scrape">
<input type="text" name="url" placeholder="https://example.com/pages/find-us" required>
<button type="submit">Download CSV</button>
</form>
</body>
</html>
"#
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
