//! In-process fake Frappe CRM for end-to-end suite tests.
//!
//! Enforces the session cookie on remote methods and the anti-forgery header
//! on state-changing calls, and records every call it receives.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

pub const USERNAME: &str = "Administrator";
pub const PASSWORD: &str = "admin";
const SID: &str = "fake-session-id";
const CSRF_TOKEN: &str = "fake-csrf-token";

#[derive(Clone, Default)]
struct CrmState {
    calls: Arc<Mutex<Vec<String>>>,
    failing: Arc<HashSet<String>>,
    slow: Arc<HashMap<String, Duration>>,
    empty_listings: bool,
    unmarked_login: bool,
    counter: Arc<AtomicUsize>,
}

impl CrmState {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_name(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{:04}", prefix, n)
    }
}

/// Builder for a fake CRM
#[derive(Default)]
pub struct FakeCrm {
    failing: HashSet<String>,
    slow: HashMap<String, Duration>,
    empty_listings: bool,
    unmarked_login: bool,
}

impl FakeCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a remote method answer 500
    pub fn failing(mut self, method: &str) -> Self {
        self.failing.insert(method.to_string());
        self
    }

    /// Hold a remote method's answer back for `delay`
    pub fn slow(mut self, method: &str, delay: Duration) -> Self {
        self.slow.insert(method.to_string(), delay);
        self
    }

    pub fn with_empty_listings(mut self) -> Self {
        self.empty_listings = true;
        self
    }

    /// Accept the login with a 2xx whose body does not say "Logged In"
    pub fn with_unmarked_login(mut self) -> Self {
        self.unmarked_login = true;
        self
    }

    pub async fn start(self) -> FakeCrmHandle {
        let state = CrmState {
            failing: Arc::new(self.failing),
            slow: Arc::new(self.slow),
            empty_listings: self.empty_listings,
            unmarked_login: self.unmarked_login,
            ..CrmState::default()
        };
        let calls = state.calls.clone();

        let app = Router::new()
            .route("/login", get(login_page))
            .route("/", get(home_page).post(login))
            .route("/crm", get(crm_page))
            .route("/api/method/:name", any(remote_method))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("fake CRM bind failed");
        let addr = listener.local_addr().expect("fake CRM has no address");
        let join = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        FakeCrmHandle {
            base_url: format!("http://{}", addr),
            calls,
            join,
        }
    }
}

pub struct FakeCrmHandle {
    pub base_url: String,
    calls: Arc<Mutex<Vec<String>>>,
    join: JoinHandle<()>,
}

impl FakeCrmHandle {
    /// Calls received so far, as `"<METHOD> <path or method name>"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, name: &str) -> bool {
        self.calls().iter().any(|c| c.ends_with(name))
    }
}

impl Drop for FakeCrmHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}

async fn login_page(State(state): State<CrmState>) -> Html<&'static str> {
    state.record("GET /login".to_string());
    Html("<html><body><form><input name=\"usr\"><input name=\"pwd\"></form></body></html>")
}

async fn home_page(State(state): State<CrmState>) -> Html<&'static str> {
    state.record("GET /".to_string());
    Html("<html><body>Frappe</body></html>")
}

async fn crm_page(State(state): State<CrmState>) -> Html<&'static str> {
    state.record("GET /crm".to_string());
    Html("<html><head><title>Frappe CRM</title></head><body></body></html>")
}

async fn login(
    State(state): State<CrmState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.record("POST /".to_string());

    let accepted = form.get("cmd").map(String::as_str) == Some("login")
        && form.get("usr").map(String::as_str) == Some(USERNAME)
        && form.get("pwd").map(String::as_str) == Some(PASSWORD);
    if !accepted {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid login credentials" })),
        )
            .into_response();
    }

    let body = if state.unmarked_login {
        json!({ "message": "No App", "home_page": "/app" })
    } else {
        json!({ "message": "Logged In", "home_page": "/app" })
    };
    (
        StatusCode::OK,
        [(SET_COOKIE, format!("sid={}; Path=/", SID))],
        Json(body),
    )
        .into_response()
}

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(';').any(|c| c.trim() == format!("sid={}", SID)))
}

fn has_csrf(headers: &HeaderMap) -> bool {
    headers
        .get("X-Frappe-CSRF-Token")
        .and_then(|v| v.to_str().ok())
        == Some(CSRF_TOKEN)
}

fn message(value: Value) -> Response {
    (StatusCode::OK, Json(json!({ "message": value }))).into_response()
}

async fn remote_method(
    State(state): State<CrmState>,
    Path(name): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record(format!("{} {}", method, name));

    if !has_session(&headers) {
        return (StatusCode::FORBIDDEN, "not logged in").into_response();
    }
    if method != Method::GET && !has_csrf(&headers) {
        return (StatusCode::BAD_REQUEST, "CSRF token missing").into_response();
    }
    if state.failing.contains(&name) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "exc_type": "ValidationError" })),
        )
            .into_response();
    }
    if let Some(delay) = state.slow.get(&name) {
        tokio::time::sleep(*delay).await;
    }

    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    match name.as_str() {
        "frappe.auth.get_logged_user" => (
            StatusCode::OK,
            [(SET_COOKIE, format!("csrf_token={}; Path=/", CSRF_TOKEN))],
            Json(json!({ "message": USERNAME })),
        )
            .into_response(),
        "frappe.client.insert" => {
            let doctype = payload["doc"]["doctype"].as_str().unwrap_or("DOC");
            let prefix = doctype.to_uppercase().replace(' ', "-");
            let mut doc = payload["doc"].clone();
            doc["name"] = json!(state.next_name(&prefix));
            message(doc)
        }
        "frappe.client.get" => message(json!({ "name": "fetched", "status": "Open" })),
        "frappe.client.set_value" => message(json!({ "name": payload["name"] })),
        "frappe.client.get_list" => message(json!([])),
        "crm.fcrm.doctype.crm_lead.crm_lead.convert_to_deal" => {
            message(json!(state.next_name("CRM-DEAL")))
        }
        "crm.fcrm.doctype.crm_deal.crm_deal.create_deal" => {
            message(json!(state.next_name("CRM-DEAL")))
        }
        "crm.api.contact.search_emails" => message(json!([])),
        "crm.api.views.get_views" => message(json!([])),
        "crm.api.notifications.get_notifications" => message(json!([])),
        "crm.api.get_posthog_settings" => message(json!({ "enable_telemetry": false })),
        "crm.api.whatsapp.is_whatsapp_enabled" => message(json!(false)),
        "crm.integrations.api.is_call_integration_enabled" => {
            message(json!({ "twilio_enabled": false, "exotel_enabled": true }))
        }
        "crm.api.doc.get_data" => {
            let rows = if state.empty_listings {
                json!([])
            } else {
                json!([{ "name": "CRM-LEAD-0001" }])
            };
            message(json!({ "data": rows, "total_count": 1 }))
        }
        "crm.api.get_file_uploader_defaults" => message(json!({
            "max_file_size": 10485760,
            "allowed_file_types": [".pdf", ".png"],
        })),
        "crm.api.check_app_permission" => message(json!(true)),
        _ => (StatusCode::NOT_FOUND, "unknown method").into_response(),
    }
}
