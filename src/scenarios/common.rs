//! Remote operations and checks shared by the HTTP suites

use crate::dispatch::{call_ok, response::describe, Request};
use crate::error::HarnessResult;
use crate::runner::console;
use crate::runner::state::{ProbeSet, ScenarioReport};
use crate::session::{Session, LOGGED_USER_METHOD};
use serde_json::{json, Value};

pub const LEAD_DOCTYPE: &str = "CRM Lead";
pub const DEAL_DOCTYPE: &str = "CRM Deal";
pub const CONTACT_DOCTYPE: &str = "Contact";
pub const ORGANIZATION_DOCTYPE: &str = "CRM Organization";

pub const INSERT_METHOD: &str = "frappe.client.insert";
pub const GET_METHOD: &str = "frappe.client.get";
pub const SET_VALUE_METHOD: &str = "frappe.client.set_value";
pub const GET_LIST_METHOD: &str = "frappe.client.get_list";

pub const POSTHOG_SETTINGS_METHOD: &str = "crm.api.get_posthog_settings";
pub const WHATSAPP_ENABLED_METHOD: &str = "crm.api.whatsapp.is_whatsapp_enabled";
pub const CALL_INTEGRATION_METHOD: &str = "crm.integrations.api.is_call_integration_enabled";
pub const APP_PERMISSION_METHOD: &str = "crm.api.check_app_permission";

/// Create a document, returning the name the CRM assigned to it
pub async fn insert_doc(session: &Session, doc: Value) -> HarnessResult<String> {
    call_ok(session, Request::post(INSERT_METHOD, json!({ "doc": doc })))
        .await?
        .require_str("/name")
}

/// Read a document back by doctype and name
pub async fn get_doc(session: &Session, doctype: &str, name: &str) -> HarnessResult<Value> {
    call_ok(
        session,
        Request::get(GET_METHOD)
            .query("doctype", doctype)
            .query("name", name),
    )
    .await?
    .message()
}

/// Set a single field of a document
pub async fn set_value(
    session: &Session,
    doctype: &str,
    name: &str,
    field: &str,
    value: Value,
) -> HarnessResult<()> {
    call_ok(
        session,
        Request::post(
            SET_VALUE_METHOD,
            json!({
                "doctype": doctype,
                "name": name,
                "fieldname": field,
                "value": value,
            }),
        ),
    )
    .await?;
    Ok(())
}

/// `message` of a GET status endpoint
pub async fn status_of(session: &Session, method: &str) -> HarnessResult<Value> {
    call_ok(session, Request::get(method)).await?.message()
}

/// Truthiness of a flag-like answer; objects count when any member is set
pub fn is_enabled(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => map.values().any(is_enabled),
        Value::Null => false,
    }
}

pub fn enabled_label(value: &Value) -> &'static str {
    if is_enabled(value) {
        "Enabled"
    } else {
        "Disabled"
    }
}

/// App permission and current user probes
pub async fn user_permissions(session: &Session) -> ScenarioReport {
    let mut probes = ProbeSet::new("user_permissions");

    let permission = status_of(session, APP_PERMISSION_METHOD).await;
    if let Some(granted) = probes.record("app permission check", permission) {
        let label = if is_enabled(&granted) {
            "Granted"
        } else {
            "Denied"
        };
        console::note(&format!("CRM app permission: {}", label));
        probes.detail("app_permission", label);
    }

    let user = status_of(session, LOGGED_USER_METHOD).await;
    if let Some(user) = probes.record("current user", user) {
        console::note(&format!("Current user: {}", describe(&user)));
        probes.detail("current_user", describe(&user));
    }

    probes.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_enabled() {
        assert!(is_enabled(&json!(true)));
        assert!(!is_enabled(&json!(false)));
        assert!(is_enabled(&json!(1)));
        assert!(!is_enabled(&json!(0)));
        assert!(!is_enabled(&Value::Null));
        assert!(!is_enabled(
            &json!({"twilio_enabled": false, "exotel_enabled": false})
        ));
        assert!(is_enabled(
            &json!({"twilio_enabled": false, "exotel_enabled": true})
        ));
    }
}
