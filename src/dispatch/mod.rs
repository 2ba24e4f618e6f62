//! Request dispatcher
//!
//! Issues one authenticated call against the CRM and hands back the raw
//! response. Interpretation of the body is left to the caller.

pub mod request;
pub mod response;

use crate::error::{HarnessError, HarnessResult};
use crate::session::Session;
use reqwest::header::ACCEPT;
use std::collections::HashMap;
use std::time::Instant;

pub use request::{Request, Target};
pub use response::RawResponse;

/// Header carrying the anti-forgery token on every call
pub const CSRF_HEADER: &str = "X-Frappe-CSRF-Token";

/// Dispatch a single call within `session`
pub async fn call(session: &Session, request: Request) -> HarnessResult<RawResponse> {
    let url = session.url_for(&request.target);
    let label = request.target.label().to_string();

    let mut builder = session
        .client()
        .request(request.method.clone(), &url)
        .header(ACCEPT, "application/json");

    if let Some(token) = session.csrf_token() {
        builder = builder.header(CSRF_HEADER, token);
    }

    if !request.query.is_empty() {
        builder = builder.query(&request.query);
    }

    if let Some(ref form) = request.form {
        builder = builder.form(form);
    } else if let Some(ref payload) = request.payload {
        if request.carries_body() {
            builder = builder.json(payload);
        }
    }

    let started = Instant::now();
    let response = builder
        .send()
        .await
        .map_err(|e| classify(session, &label, e))?;

    let status = response.status().as_u16();
    let headers: HashMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
        .collect();

    let body = response
        .text()
        .await
        .map_err(|e| classify(session, &label, e))?;

    log::debug!(
        "{} {} -> {} ({} bytes, {:?})",
        request.method,
        url,
        status,
        body.len(),
        started.elapsed()
    );

    Ok(RawResponse {
        target: label,
        status,
        body,
        headers,
    })
}

/// Dispatch and require a 2xx answer
pub async fn call_ok(session: &Session, request: Request) -> HarnessResult<RawResponse> {
    call(session, request).await?.ensure_success()
}

fn classify(session: &Session, target: &str, err: reqwest::Error) -> HarnessError {
    if err.is_timeout() {
        HarnessError::Timeout {
            target: target.to_string(),
            after: session.config().timeout,
        }
    } else {
        HarnessError::Transport {
            target: target.to_string(),
            reason: err.to_string(),
        }
    }
}
