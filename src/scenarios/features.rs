//! Comprehensive feature suite: CRUD chains over leads, deals, contacts and
//! organizations, plus endpoint, integration and permission probes.

use crate::dispatch::{call_ok, response::describe, Request};
use crate::runner::console;
use crate::runner::state::{Chain, ProbeSet, ScenarioReport};
use crate::session::Session;
use crate::utils::data::TestRecord;
use serde_json::json;

use super::common::{
    self, get_doc, insert_doc, set_value, status_of, CALL_INTEGRATION_METHOD, CONTACT_DOCTYPE,
    DEAL_DOCTYPE, LEAD_DOCTYPE, ORGANIZATION_DOCTYPE, POSTHOG_SETTINGS_METHOD,
    WHATSAPP_ENABLED_METHOD,
};

pub const CONVERT_TO_DEAL_METHOD: &str = "crm.fcrm.doctype.crm_lead.crm_lead.convert_to_deal";
pub const CREATE_DEAL_METHOD: &str = "crm.fcrm.doctype.crm_deal.crm_deal.create_deal";
pub const SEARCH_EMAILS_METHOD: &str = "crm.api.contact.search_emails";
pub const GET_VIEWS_METHOD: &str = "crm.api.views.get_views";
pub const NOTIFICATIONS_METHOD: &str = "crm.api.notifications.get_notifications";
pub const GET_DATA_METHOD: &str = "crm.api.doc.get_data";
pub const FILE_UPLOADER_DEFAULTS_METHOD: &str = "crm.api.get_file_uploader_defaults";

const PAGE_LENGTH: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureCheck {
    LeadManagement,
    DealManagement,
    ContactManagement,
    OrganizationManagement,
    ApiEndpoints,
    Integrations,
    DataOperations,
    FileOperations,
    UserPermissions,
}

impl FeatureCheck {
    /// Execution order
    pub const ALL: [FeatureCheck; 9] = [
        FeatureCheck::LeadManagement,
        FeatureCheck::DealManagement,
        FeatureCheck::ContactManagement,
        FeatureCheck::OrganizationManagement,
        FeatureCheck::ApiEndpoints,
        FeatureCheck::Integrations,
        FeatureCheck::DataOperations,
        FeatureCheck::FileOperations,
        FeatureCheck::UserPermissions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FeatureCheck::LeadManagement => "lead_management",
            FeatureCheck::DealManagement => "deal_management",
            FeatureCheck::ContactManagement => "contact_management",
            FeatureCheck::OrganizationManagement => "organization_management",
            FeatureCheck::ApiEndpoints => "api_endpoints",
            FeatureCheck::Integrations => "integrations",
            FeatureCheck::DataOperations => "data_operations",
            FeatureCheck::FileOperations => "file_operations",
            FeatureCheck::UserPermissions => "user_permissions",
        }
    }

    pub async fn run(self, session: &Session) -> ScenarioReport {
        console::scenario_started(self.name());
        match self {
            FeatureCheck::LeadManagement => lead_management(session).await,
            FeatureCheck::DealManagement => deal_management(session).await,
            FeatureCheck::ContactManagement => contact_management(session).await,
            FeatureCheck::OrganizationManagement => organization_management(session).await,
            FeatureCheck::ApiEndpoints => api_endpoints(session).await,
            FeatureCheck::Integrations => integrations(session).await,
            FeatureCheck::DataOperations => data_operations(session).await,
            FeatureCheck::FileOperations => file_operations(session).await,
            FeatureCheck::UserPermissions => common::user_permissions(session).await,
        }
    }
}

/// create -> read -> update status -> convert to deal
async fn lead_management(session: &Session) -> ScenarioReport {
    let record = TestRecord::generate("Lead");
    let mut chain = Chain::new(
        "lead_management",
        &["create lead", "read lead", "update lead", "convert lead to deal"],
    );

    let lead = json!({
        "doctype": LEAD_DOCTYPE,
        "first_name": record.first_name,
        "last_name": record.last_name,
        "email": record.email,
        "mobile_no": record.mobile_no,
        "organization": record.organization_name,
        "status": "Open",
    });
    let Some(lead_name) = chain.step(insert_doc(session, lead)).await else {
        return chain.finish();
    };
    console::note(&format!("Created lead: {}", lead_name));
    chain.detail("lead_created", &lead_name);

    if chain
        .step(get_doc(session, LEAD_DOCTYPE, &lead_name))
        .await
        .is_none()
    {
        return chain.finish();
    }

    if chain
        .step(set_value(
            session,
            LEAD_DOCTYPE,
            &lead_name,
            "status",
            json!("Interested"),
        ))
        .await
        .is_none()
    {
        return chain.finish();
    }

    let deal = chain
        .step(async {
            call_ok(
                session,
                Request::post(CONVERT_TO_DEAL_METHOD, json!({ "lead": &lead_name })),
            )
            .await?
            .require_str("")
        })
        .await;
    if let Some(deal_name) = deal {
        console::note(&format!("Lead converted to deal: {}", deal_name));
        chain.detail("deal_created", deal_name);
    }

    chain.finish()
}

/// create -> read -> update probability
async fn deal_management(session: &Session) -> ScenarioReport {
    let record = TestRecord::generate("Deal");
    let mut chain = Chain::new(
        "deal_management",
        &["create deal", "read deal", "update deal"],
    );

    let deal = json!({
        "first_name": record.first_name,
        "last_name": record.last_name,
        "email": record.email,
        "mobile_no": record.mobile_no,
        "organization_name": record.organization_name,
        "deal_value": 50000,
        "probability": 50,
        "status": "Qualification",
    });
    let created = chain
        .step(async {
            call_ok(session, Request::post(CREATE_DEAL_METHOD, deal))
                .await?
                .require_str("")
        })
        .await;
    let Some(deal_name) = created else {
        return chain.finish();
    };
    console::note(&format!("Created deal: {}", deal_name));
    chain.detail("deal_created", &deal_name);

    if chain
        .step(get_doc(session, DEAL_DOCTYPE, &deal_name))
        .await
        .is_none()
    {
        return chain.finish();
    }

    chain
        .step(set_value(
            session,
            DEAL_DOCTYPE,
            &deal_name,
            "probability",
            json!(75),
        ))
        .await;

    chain.finish()
}

/// create -> search by email prefix
async fn contact_management(session: &Session) -> ScenarioReport {
    let record = TestRecord::generate("Contact");
    let mut chain = Chain::new(
        "contact_management",
        &["create contact", "search contacts by email"],
    );

    let contact = json!({
        "doctype": CONTACT_DOCTYPE,
        "first_name": record.first_name,
        "last_name": record.last_name,
        "email_ids": [{ "email_id": record.email, "is_primary": 1 }],
        "phone_nos": [{ "phone": record.mobile_no, "is_primary_mobile_no": 1 }],
    });
    let Some(contact_name) = chain.step(insert_doc(session, contact)).await else {
        return chain.finish();
    };
    console::note(&format!("Created contact: {}", contact_name));
    chain.detail("contact_created", &contact_name);

    let prefix: String = record.email.chars().take(5).collect();
    chain
        .step(async {
            call_ok(
                session,
                Request::post(SEARCH_EMAILS_METHOD, json!({ "txt": prefix })),
            )
            .await
        })
        .await;

    chain.finish()
}

/// create -> update annual revenue
async fn organization_management(session: &Session) -> ScenarioReport {
    let record = TestRecord::generate("Org");
    let mut chain = Chain::new(
        "organization_management",
        &["create organization", "update organization"],
    );

    let organization = json!({
        "doctype": ORGANIZATION_DOCTYPE,
        "organization_name": record.organization_name,
        "website": record.website,
        "industry": record.industry,
        "annual_revenue": 1_000_000,
    });
    let Some(org_name) = chain.step(insert_doc(session, organization)).await else {
        return chain.finish();
    };
    console::note(&format!("Created organization: {}", org_name));
    chain.detail("organization_created", &org_name);

    chain
        .step(set_value(
            session,
            ORGANIZATION_DOCTYPE,
            &org_name,
            "annual_revenue",
            json!(1_500_000),
        ))
        .await;

    chain.finish()
}

async fn api_endpoints(session: &Session) -> ScenarioReport {
    let mut probes = ProbeSet::new("api_endpoints");

    let requests = [
        Request::get(POSTHOG_SETTINGS_METHOD),
        Request::post(GET_VIEWS_METHOD, json!({ "doctype": LEAD_DOCTYPE })),
        Request::get(NOTIFICATIONS_METHOD),
        Request::get(WHATSAPP_ENABLED_METHOD),
        Request::get(CALL_INTEGRATION_METHOD),
    ];
    let total = requests.len();

    for request in requests {
        let label = request.target.label().to_string();
        let result = call_ok(session, request).await;
        probes.record(&label, result);
    }

    let passed = probes.passed();
    probes.detail("passed", passed);
    probes.detail("total", total);
    probes.finish()
}

async fn integrations(session: &Session) -> ScenarioReport {
    let mut probes = ProbeSet::new("integrations");

    let calls = status_of(session, CALL_INTEGRATION_METHOD).await;
    if let Some(status) = probes.record("call integration status", calls) {
        for provider in ["twilio_enabled", "exotel_enabled"] {
            let enabled = status.get(provider).map(common::is_enabled).unwrap_or(false);
            console::note(&format!("Call integration - {}: {}", provider, enabled));
            probes.detail(provider, enabled);
        }
    }

    let whatsapp = status_of(session, WHATSAPP_ENABLED_METHOD).await;
    if let Some(flag) = probes.record("whatsapp integration status", whatsapp) {
        console::note(&format!("WhatsApp integration: {}", describe(&flag)));
        probes.detail("whatsapp_enabled", common::is_enabled(&flag));
    }

    probes.finish()
}

/// Filtered, sorted, paginated listing of leads then deals
async fn data_operations(session: &Session) -> ScenarioReport {
    let mut chain = Chain::new(
        "data_operations",
        &["list open leads", "list deals without filter"],
    );

    let leads = chain
        .step(async {
            call_ok(
                session,
                Request::post(
                    GET_DATA_METHOD,
                    json!({
                        "doctype": LEAD_DOCTYPE,
                        "filters": { "status": "Open" },
                        "order_by": "creation desc",
                        "page_length": PAGE_LENGTH,
                    }),
                ),
            )
            .await?
            .require_array("/data")
        })
        .await;
    let Some(leads) = leads else {
        return chain.finish();
    };
    console::note(&format!("Lead data retrieved: {} records", leads.len()));
    chain.detail("lead_records", leads.len());

    let deals = chain
        .step(async {
            call_ok(
                session,
                Request::post(
                    GET_DATA_METHOD,
                    json!({
                        "doctype": DEAL_DOCTYPE,
                        "filters": {},
                        "order_by": "creation desc",
                        "page_length": PAGE_LENGTH,
                    }),
                ),
            )
            .await?
            .require_array("/data")
        })
        .await;
    if let Some(deals) = deals {
        console::note(&format!("Deal data retrieved: {} records", deals.len()));
        chain.detail("deal_records", deals.len());
    }

    chain.finish()
}

async fn file_operations(session: &Session) -> ScenarioReport {
    let mut chain = Chain::new("file_operations", &["file uploader settings"]);

    let settings = chain
        .step(async {
            call_ok(
                session,
                Request::post(
                    FILE_UPLOADER_DEFAULTS_METHOD,
                    json!({ "doctype": LEAD_DOCTYPE }),
                ),
            )
            .await?
            .message()
        })
        .await;

    if let Some(settings) = settings {
        for key in ["max_file_size", "allowed_file_types"] {
            let value = settings
                .get(key)
                .map(describe)
                .unwrap_or_else(|| "unknown".to_string());
            console::note(&format!("{}: {}", key, value));
            chain.detail(key, value);
        }
    }

    chain.finish()
}
