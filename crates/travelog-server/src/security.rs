use axum::http::{HeaderName, HeaderValue, header};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Environment;

const CSP_DEVELOPMENT: &str =
    "default-src 'self'; script-src 'self' https://vercel.live; object-src 'none'";
const CSP_PRODUCTION: &str = "default-src 'self'; object-src 'none'; frame-ancestors 'self'";

/// Security headers applied to every response. The CSP is relaxed in
/// development so the preview toolbar can load.
pub fn headers(env: Environment) -> Vec<(HeaderName, HeaderValue)> {
    let csp = match env {
        Environment::Development => CSP_DEVELOPMENT,
        Environment::Production => CSP_PRODUCTION,
    };

    vec![
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(csp)),
    ]
}

pub fn layers(env: Environment) -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    headers(env)
        .into_iter()
        .map(|(name, value)| SetResponseHeaderLayer::if_not_present(name, value))
        .collect()
}
