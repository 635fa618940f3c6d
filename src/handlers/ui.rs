//! Interactive page: transaction form plus live dashboard
//!
//! The page itself polls `/dashboard`; form posts are scored server-side
//! through the same path as `/predict` and answered with a re-rendered page.
//! `OPTIONS /` is answered by the CORS layer.

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Form,
};

use super::predict::score_and_record;
use crate::models::{Category, PredictRequest, PredictResponse};
use crate::{AppError, AppState};

const PAGE_TEMPLATE: &str = include_str!("../../assets/index.html");

/// Banner shown above the form after a submission
#[derive(Debug, Clone, PartialEq)]
pub enum Banner {
    Normal(f64),
    Fraud(f64),
    Error(String),
}

impl Banner {
    fn from_response(response: &PredictResponse) -> Self {
        if response.alert {
            Banner::Fraud(response.probability)
        } else {
            Banner::Normal(response.probability)
        }
    }

    fn to_html(&self) -> String {
        match self {
            Banner::Fraud(p) => format!(
                r#"<div class="banner alert">🚨 Fraud Detected! (Confidence: {})</div>"#,
                format_confidence(*p)
            ),
            Banner::Normal(p) => format!(
                r#"<div class="banner success">✅ Transaction Normal (Confidence: {})</div>"#,
                format_confidence(*p)
            ),
            Banner::Error(msg) => format!(
                r#"<div class="banner alert">Could not score transaction: {}</div>"#,
                escape_html(msg)
            ),
        }
    }
}

/// Anomaly score shown as a percentage with two decimals
pub fn format_confidence(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state, None))
}

pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<PredictRequest>, FormRejection>,
) -> impl IntoResponse {
    let result = match form {
        Ok(Form(req)) => score_and_record(&state, req).await,
        Err(rejection) => Err(AppError::from(rejection)),
    };

    match result {
        Ok(response) => {
            let banner = Banner::from_response(&response);
            (StatusCode::OK, Html(render_page(&state, Some(&banner))))
        }
        Err(e) => {
            tracing::warn!("Form submission rejected: {}", e);
            let banner = Banner::Error(e.to_string());
            (e.status(), Html(render_page(&state, Some(&banner))))
        }
    }
}

fn render_page(state: &AppState, banner: Option<&Banner>) -> String {
    let category_options: String = Category::ALL
        .iter()
        .map(|c| format!(r#"<option value="{0}">{0}</option>"#, c))
        .collect();
    let refresh_ms = state.config.dashboard_refresh_secs.saturating_mul(1000);

    PAGE_TEMPLATE
        .replace("{{BANNER}}", &banner.map(Banner::to_html).unwrap_or_default())
        .replace("{{CATEGORY_OPTIONS}}", &category_options)
        .replace("{{REFRESH_MS}}", &refresh_ms.to_string())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_format() {
        assert_eq!(format_confidence(-0.123456), "-12.35%");
        assert_eq!(format_confidence(0.05), "5.00%");
    }

    #[test]
    fn test_banner_html() {
        assert!(Banner::Fraud(-0.2).to_html().contains("Fraud Detected!"));
        assert!(Banner::Normal(0.1).to_html().contains("Transaction Normal (Confidence: 10.00%)"));
        let err = Banner::Error("<script>".to_string()).to_html();
        assert!(err.contains("&lt;script&gt;"));
        assert!(!err.contains("<script>"));
    }

    #[test]
    fn test_template_placeholders_present() {
        for placeholder in ["{{BANNER}}", "{{CATEGORY_OPTIONS}}", "{{REFRESH_MS}}"] {
            assert!(PAGE_TEMPLATE.contains(placeholder), "missing {}", placeholder);
        }
    }
}
