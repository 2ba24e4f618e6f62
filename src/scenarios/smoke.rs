//! Quick smoke suite: reachability, a single document round trip and the
//! status endpoints.

use crate::dispatch::{call_ok, Request};
use crate::runner::console;
use crate::runner::state::{Chain, ProbeSet, ScenarioReport};
use crate::session::{Session, LOGGED_USER_METHOD};
use crate::utils::data::{random_suffix, SUFFIX_LEN};
use serde_json::json;

use super::common::{
    self, enabled_label, get_doc, insert_doc, status_of, CALL_INTEGRATION_METHOD, DEAL_DOCTYPE,
    GET_LIST_METHOD, LEAD_DOCTYPE, POSTHOG_SETTINGS_METHOD, WHATSAPP_ENABLED_METHOD,
};

const PAGE_LENGTH: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokeCheck {
    Connectivity,
    ApiEndpoints,
    DocumentCreation,
    DataListing,
    IntegrationStatus,
    UserPermissions,
}

impl SmokeCheck {
    /// Execution order
    pub const ALL: [SmokeCheck; 6] = [
        SmokeCheck::Connectivity,
        SmokeCheck::ApiEndpoints,
        SmokeCheck::DocumentCreation,
        SmokeCheck::DataListing,
        SmokeCheck::IntegrationStatus,
        SmokeCheck::UserPermissions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SmokeCheck::Connectivity => "connectivity",
            SmokeCheck::ApiEndpoints => "api_endpoints",
            SmokeCheck::DocumentCreation => "document_creation",
            SmokeCheck::DataListing => "data_listing",
            SmokeCheck::IntegrationStatus => "integration_status",
            SmokeCheck::UserPermissions => "user_permissions",
        }
    }

    pub async fn run(self, session: &Session) -> ScenarioReport {
        console::scenario_started(self.name());
        match self {
            SmokeCheck::Connectivity => connectivity(session).await,
            SmokeCheck::ApiEndpoints => api_endpoints(session).await,
            SmokeCheck::DocumentCreation => document_creation(session).await,
            SmokeCheck::DataListing => data_listing(session).await,
            SmokeCheck::IntegrationStatus => integration_status(session).await,
            SmokeCheck::UserPermissions => common::user_permissions(session).await,
        }
    }
}

async fn connectivity(session: &Session) -> ScenarioReport {
    let mut chain = Chain::new("connectivity", &["site root", "CRM application"]);

    if chain
        .step(call_ok(session, Request::page("/")))
        .await
        .is_none()
    {
        return chain.finish();
    }
    chain.step(call_ok(session, Request::page("/crm"))).await;

    chain.finish()
}

async fn api_endpoints(session: &Session) -> ScenarioReport {
    let mut probes = ProbeSet::new("api_endpoints");

    let methods = [
        LOGGED_USER_METHOD,
        POSTHOG_SETTINGS_METHOD,
        WHATSAPP_ENABLED_METHOD,
        CALL_INTEGRATION_METHOD,
    ];
    for method in methods {
        let result = call_ok(session, Request::get(method)).await;
        probes.record(method, result);
    }

    let passed = probes.passed();
    probes.detail("passed", passed);
    probes.detail("total", methods.len());
    probes.finish()
}

async fn document_creation(session: &Session) -> ScenarioReport {
    let suffix = random_suffix(SUFFIX_LEN);
    let mut chain = Chain::new("document_creation", &["create lead", "read lead"]);

    let lead = json!({
        "doctype": LEAD_DOCTYPE,
        "first_name": format!("Test{}", suffix),
        "last_name": "Lead",
        "email": format!("test{}@example.com", suffix),
        "status": "Open",
    });
    let Some(lead_name) = chain.step(insert_doc(session, lead)).await else {
        return chain.finish();
    };
    console::note(&format!("Created lead: {}", lead_name));
    chain.detail("lead_created", &lead_name);

    chain.step(get_doc(session, LEAD_DOCTYPE, &lead_name)).await;

    chain.finish()
}

async fn data_listing(session: &Session) -> ScenarioReport {
    let mut chain = Chain::new("data_listing", &["list leads", "list deals"]);

    let listings = [
        (LEAD_DOCTYPE, json!(["name", "first_name", "last_name", "status"]), "lead_count"),
        (DEAL_DOCTYPE, json!(["name", "organization", "status"]), "deal_count"),
    ];
    for (doctype, fields, detail) in listings {
        let rows = chain
            .step(async {
                call_ok(
                    session,
                    Request::post(
                        GET_LIST_METHOD,
                        json!({
                            "doctype": doctype,
                            "fields": fields,
                            "limit_page_length": PAGE_LENGTH,
                        }),
                    ),
                )
                .await?
                .require_array("")
            })
            .await;
        let Some(rows) = rows else {
            break;
        };
        console::note(&format!("{} listing: {} records", doctype, rows.len()));
        chain.detail(detail, rows.len());
    }

    chain.finish()
}

async fn integration_status(session: &Session) -> ScenarioReport {
    let mut probes = ProbeSet::new("integration_status");

    let flags = [
        ("whatsapp", WHATSAPP_ENABLED_METHOD),
        ("call_integration", CALL_INTEGRATION_METHOD),
    ];
    for (label, method) in flags {
        let status = status_of(session, method).await;
        if let Some(flag) = probes.record(method, status) {
            let state = enabled_label(&flag);
            console::note(&format!("{}: {}", label, state));
            probes.detail(label, state);
        }
    }

    probes.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke_order() {
        let names: Vec<&str> = SmokeCheck::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "connectivity",
                "api_endpoints",
                "document_creation",
                "data_listing",
                "integration_status",
                "user_permissions",
            ]
        );
    }
}
